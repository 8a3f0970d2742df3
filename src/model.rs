mod app_config;
mod proxy;

pub use app_config::{AppConfig, CacheConfig, LoggingConfig, SourcesConfig};
pub use proxy::{Anonymity, Protocol, ProxyAddress, Speed};
