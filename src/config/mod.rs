pub mod core;
pub mod loader;

pub use self::core::{AppConfig, ConfigError, ContextConfig, LoggingConfig, Overrides, WindowConfig};
pub use self::loader::{
    default_config_path, load_from_path, load_or_create_at, load_or_create_default,
};
