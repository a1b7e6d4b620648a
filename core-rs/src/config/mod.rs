//! Configuration module
//!
//! Loads and validates the saurus.yaml bootstrap file: local token,
//! remote store coordinates, bot runtime and loader settings.

pub mod settings;

pub use settings::{BootConfig, Metadata, PluginsConfig, RolesConfig, Spec, StoreConfig, TelegramConfig};
