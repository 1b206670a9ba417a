mod config;

pub use self::config::{
    ContractSettings, DefaultSettings, NetworkSettings, PoolTask, PositionAction, PositionTask,
    Settings, SwapTask,
};
