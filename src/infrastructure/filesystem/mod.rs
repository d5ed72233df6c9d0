pub mod config_store;
pub mod discovery;

pub use config_store::{ConfigStore, ConfigStoreError};
pub use discovery::{DiscoveryError, RepositoryDiscoverer};
