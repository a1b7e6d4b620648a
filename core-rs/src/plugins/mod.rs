//! Plugin and role loading
//!
//! Plugins are slash-command manifests loaded from a directory; roles
//! restrict which users may run a plugin's command.

pub mod loader;
pub mod roles;

pub use loader::{command_of, normalize_command, PluginManifest, PluginRegistry};
pub use roles::{Role, RoleBook, RoleMember};
