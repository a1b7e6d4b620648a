//! Plugin loader - slash-command manifests from a directory
//!
//! Each `*.yaml` / `*.yml` file in the plugin directory is one manifest:
//!
//! ```yaml
//! name: ping
//! command: /ping
//! description: Health check
//! reply: pong
//! role: owner        # optional, restricts the command to a role
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::{BootError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl PluginManifest {
    fn validate(&self, origin: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BootError::Plugin(format!("{}: name cannot be empty", origin)));
        }
        let command = self.command.trim_start_matches('/');
        if command.is_empty() || command.chars().any(char::is_whitespace) {
            return Err(BootError::Plugin(format!(
                "{}: invalid command '{}'",
                origin, self.command
            )));
        }
        if self.reply.trim().is_empty() {
            return Err(BootError::Plugin(format!("{}: reply cannot be empty", origin)));
        }
        Ok(())
    }
}

/// Loaded plugins, keyed by normalized command
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginManifest>,
}

impl PluginRegistry {
    /// Build a registry from manifests, normalizing commands and rejecting duplicates
    pub fn from_manifests(manifests: Vec<PluginManifest>) -> Result<Self> {
        let mut registry = PluginRegistry::default();
        for manifest in manifests {
            registry.register(manifest, "inline")?;
        }
        Ok(registry)
    }

    /// Load every manifest in `dir`, in file-name order.
    ///
    /// A missing directory yields an empty registry.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut registry = PluginRegistry::default();

        if !dir.exists() {
            warn!(dir = %dir.display(), "plugin directory not found, no plugins loaded");
            return Ok(registry);
        }

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| BootError::Plugin(format!("cannot read plugin directory: {}", e)))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_manifest(path) {
                continue;
            }

            let origin = path.display().to_string();
            let content = fs::read_to_string(path)?;
            let manifest: PluginManifest = serde_yaml::from_str(&content)
                .map_err(|e| BootError::Plugin(format!("{}: {}", origin, e)))?;
            registry.register(manifest, &origin)?;
            debug!(plugin = %origin, "plugin loaded");
        }

        info!(count = registry.len(), "plugins loaded");
        Ok(registry)
    }

    fn register(&mut self, mut manifest: PluginManifest, origin: &str) -> Result<()> {
        manifest.validate(origin)?;
        manifest.command = normalize_command(&manifest.command);
        if self.find(&manifest.command).is_some() {
            return Err(BootError::Plugin(format!(
                "{}: command {} is already registered",
                origin, manifest.command
            )));
        }
        self.plugins.push(manifest);
        Ok(())
    }

    pub fn find(&self, command: &str) -> Option<&PluginManifest> {
        let command = normalize_command(command);
        self.plugins.iter().find(|plugin| plugin.command == command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginManifest> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

fn is_manifest(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// `/Ping`, `ping` and `/ping` all normalize to `/ping`
pub fn normalize_command(command: &str) -> String {
    format!("/{}", command.trim().trim_start_matches('/').to_lowercase())
}

/// Extract the command from a chat message.
///
/// Only messages starting with `/` carry a command. A `@botname` suffix is
/// stripped when it names this bot (or when the bot name is unknown) and
/// the message is ignored when it addresses another bot.
pub fn command_of(text: &str, bot_username: Option<&str>) -> Option<String> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') || first.len() < 2 {
        return None;
    }

    let (command, addressee) = match first.split_once('@') {
        Some((command, addressee)) => (command, Some(addressee)),
        None => (first, None),
    };

    if let (Some(addressee), Some(bot)) = (addressee, bot_username) {
        if !addressee.eq_ignore_ascii_case(bot) {
            return None;
        }
    }

    if command.len() < 2 {
        return None;
    }
    Some(normalize_command(command))
}
