mod resolver;
mod state;

pub use resolver::PoolResolver;
pub use state::{describe_pool, fetch_pool_immutables, fetch_pool_state};
