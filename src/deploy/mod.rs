mod deployer;

pub use deployer::{deadline_after, pool_env_key, Deployer, Deployment, DeploymentReport};
