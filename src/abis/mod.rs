pub mod erc20;
pub mod periphery;
pub mod v3;

pub use erc20::IERC20;
pub use periphery::{INonfungiblePositionManager, IQuoter, ISwapRouter};
pub use v3::{IUniswapV3Factory, IUniswapV3Pool};
