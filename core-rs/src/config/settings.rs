/**
 * settings.rs
 * Parser for saurus.yaml bootstrap files (YAML format)
 *
 * Format:
 * ```yaml
 * apiVersion: saurus/v1
 * kind: Bootstrap
 * metadata:
 *   name: saurus-bot
 *   owner: "@lordsaurus"
 * spec:
 *   token: "123456:ABC-DEF"
 *   store:
 *     owner: saurusrawr
 *     repo: dbsaurus
 * ```
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::BootError;
use crate::store::StoreLocator;

pub const API_VERSION: &str = "saurus/v1";
pub const KIND: &str = "Bootstrap";

pub const DEFAULT_STORE_HOST: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_STORE_OWNER: &str = "saurusrawr";
pub const DEFAULT_STORE_REPO: &str = "dbsaurus";
pub const DEFAULT_STORE_BRANCH: &str = "main";
pub const DEFAULT_AUTH_RESOURCE: &str = "password.json";
pub const DEFAULT_TOKEN_RESOURCE: &str = "database.json";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TYPING_DELAY_MS: u64 = 50;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// saurus.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BootConfig {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: Spec,
}

/// Bot metadata shown in the bot info panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub name: String,
    #[serde(default = "default_owner")]
    pub owner: String,
}

/// Remote store coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default = "default_store_host")]
    pub host: String,
    #[serde(default = "default_store_owner")]
    pub owner: String,
    #[serde(default = "default_store_repo")]
    pub repo: String,
    #[serde(default = "default_store_branch")]
    pub branch: String,
    #[serde(default = "default_auth_resource")]
    pub auth_resource: String,
    #[serde(default = "default_token_resource")]
    pub token_resource: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            host: default_store_host(),
            owner: default_store_owner(),
            repo: default_store_repo(),
            branch: default_store_branch(),
            auth_resource: default_auth_resource(),
            token_resource: default_token_resource(),
        }
    }
}

/// Telegram Bot API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
    /// Long-poll timeout passed to getUpdates
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        TelegramConfig {
            api_base: default_telegram_api(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginsConfig {
    #[serde(default = "default_plugins_dir")]
    pub dir: PathBuf,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        PluginsConfig { dir: default_plugins_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RolesConfig {
    #[serde(default = "default_roles_file")]
    pub file: PathBuf,
}

impl Default for RolesConfig {
    fn default() -> Self {
        RolesConfig { file: default_roles_file() }
    }
}

/// Bootstrap specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    /// Local token checked against the remote allow-list (also the bot token)
    pub token: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Per-character delay of the startup banner, 0 disables the effect
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub roles: RolesConfig,
}

fn default_owner() -> String {
    "@lordsaurus".to_string()
}

fn default_store_host() -> String {
    DEFAULT_STORE_HOST.to_string()
}

fn default_store_owner() -> String {
    DEFAULT_STORE_OWNER.to_string()
}

fn default_store_repo() -> String {
    DEFAULT_STORE_REPO.to_string()
}

fn default_store_branch() -> String {
    DEFAULT_STORE_BRANCH.to_string()
}

fn default_auth_resource() -> String {
    DEFAULT_AUTH_RESOURCE.to_string()
}

fn default_token_resource() -> String {
    DEFAULT_TOKEN_RESOURCE.to_string()
}

fn default_telegram_api() -> String {
    DEFAULT_TELEGRAM_API.to_string()
}

fn default_poll_timeout_secs() -> u64 {
    DEFAULT_POLL_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_typing_delay_ms() -> u64 {
    DEFAULT_TYPING_DELAY_MS
}

fn default_plugins_dir() -> PathBuf {
    PathBuf::from("plugins")
}

fn default_roles_file() -> PathBuf {
    PathBuf::from("roles.yaml")
}

impl BootConfig {
    /// Load saurus.yaml from specified path
    ///
    /// Relative plugin and role paths are resolved against the directory
    /// containing the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BootError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BootError::FileNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let content = fs::read_to_string(path)?;

        let mut config = Self::parse(&content)?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        Ok(config)
    }

    /// Parse and validate YAML content
    pub fn parse(content: &str) -> Result<Self, BootError> {
        let config: BootConfig = serde_yaml::from_str(content).map_err(|e| {
            BootError::ParseError(format!("Invalid saurus.yaml: {}", e))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate saurus.yaml structure
    ///
    /// Ensures:
    /// - apiVersion is "saurus/v1"
    /// - kind is "Bootstrap"
    /// - metadata.name and spec.token are present and non-empty
    /// - store coordinates are non-empty
    pub fn validate(&self) -> Result<(), BootError> {
        if self.api_version != API_VERSION {
            return Err(BootError::ValidationError(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                API_VERSION, self.api_version
            )));
        }

        if self.kind != KIND {
            return Err(BootError::ValidationError(format!(
                "Invalid kind: expected '{}', got '{}'",
                KIND, self.kind
            )));
        }

        if self.metadata.name.trim().is_empty() {
            return Err(BootError::ValidationError(
                "metadata.name cannot be empty".to_string(),
            ));
        }

        if self.spec.token.trim().is_empty() {
            return Err(BootError::ValidationError(
                "spec.token cannot be empty".to_string(),
            ));
        }

        if self.spec.request_timeout_secs == 0 {
            return Err(BootError::ValidationError(
                "spec.requestTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        let store = &self.spec.store;
        let store_fields = [
            ("host", &store.host),
            ("owner", &store.owner),
            ("repo", &store.repo),
            ("branch", &store.branch),
            ("authResource", &store.auth_resource),
            ("tokenResource", &store.token_resource),
        ];
        for (field, value) in store_fields {
            if value.trim().is_empty() {
                return Err(BootError::ValidationError(format!(
                    "spec.store.{} cannot be empty",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Save saurus.yaml to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BootError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    /// Create a config with defaults for everything but the bot name and token
    pub fn new(name: String, token: String) -> Self {
        BootConfig {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: Metadata {
                name,
                owner: default_owner(),
            },
            spec: Spec {
                token,
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
                store: StoreConfig::default(),
                telegram: TelegramConfig::default(),
                plugins: PluginsConfig::default(),
                roles: RolesConfig::default(),
            },
        }
    }

    /// Store coordinates as a locator for the remote store client
    pub fn store_locator(&self) -> StoreLocator {
        let store = &self.spec.store;
        StoreLocator::new(&store.host, &store.owner, &store.repo, &store.branch)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.spec.request_timeout_secs)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.spec.typing_delay_ms)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.spec.plugins.dir.is_relative() {
            self.spec.plugins.dir = base.join(&self.spec.plugins.dir);
        }
        if self.spec.roles.file.is_relative() {
            self.spec.roles.file = base.join(&self.spec.roles.file);
        }
    }
}
