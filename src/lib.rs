pub mod abis;
pub mod chain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod models;
pub mod pool;
pub mod position;
pub mod swap;
pub mod utils;

pub use self::config::Settings;
pub use chain::{ChainClient, RpcClient};
pub use deploy::{Deployer, DeploymentReport};
pub use error::{Error, Result};
pub use pool::PoolResolver;
pub use position::PositionCalculator;
pub use swap::quote_and_bound;
