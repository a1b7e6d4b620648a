//! # Saurus Core - bot bootstrap
//!
//! Console bootstrap for the Saurus chat bot. Before the bot is allowed to
//! run, the operator must pass a password challenge and the local bot token
//! must appear in a remotely published allow-list.
//!
//! ## Boot sequence
//!
//! ```text
//!  remote store (password.json) ──► access gate (2 attempts)
//!                                        │
//!  remote store (database.json) ──► token allow-list ──► local token check
//!                                        │
//!                  bot runtime (getMe) ──► plugins ──► roles
//! ```
//!
//! Every failure surfaces as a [`BootError`]; only the `saurus` binary
//! turns it into a process exit.

pub mod errors;
pub mod config;
pub mod store;
pub mod tokens;
pub mod gate;
pub mod runtime;
pub mod plugins;
pub mod boot;

pub use errors::{BootError, EXIT_FAILURE};
pub use config::BootConfig;
pub use store::{CredentialRecord, RemoteStoreClient, StoreLocator, TokenDbDescriptor};
pub use tokens::{is_authorized, mask_token, TokenValidator};
pub use gate::{AccessGate, ConsolePort, GateOutcome, ScriptedConsole, TerminalConsole, MAX_ATTEMPTS};
pub use runtime::{BotIdentity, BotRuntime, TelegramRuntime};
pub use plugins::{PluginManifest, PluginRegistry, Role, RoleBook};
pub use boot::{BootContext, BootOrchestrator, BootReport, BootedSystem};

/// Version of the saurus bootstrap
pub const VERSION: &str = "0.4.2";

/// Default bootstrap config file name
pub const DEFAULT_CONFIG_FILE: &str = "saurus.yaml";
