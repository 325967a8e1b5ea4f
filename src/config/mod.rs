pub mod env;
mod loader;

pub use env::{
    AppConfig, ClassifierConfig, ConfigError, DirectoryConfig, LogFormat, TransportConfig,
    TriageConfig,
};
pub use loader::load_config;
