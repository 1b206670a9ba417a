mod calculator;
mod listing;

pub use calculator::{
    amounts_for_target, apply_slippage, tick_range_around, PositionAmounts, PositionCalculator,
};
pub use listing::list_positions;
