//! Bot runtime module
//!
//! The boot orchestrator hands control to a `BotRuntime` once access and
//! token checks pass. `TelegramRuntime` is the production implementation.

pub mod telegram;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use telegram::{TelegramChat, TelegramMessage, TelegramRuntime, TelegramUpdate, TelegramUser};

/// Identity reported by the bot platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
}

impl BotIdentity {
    /// `@username` form shown in the bot info panel
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

/// Bot runtime started at the end of the boot sequence
#[async_trait]
pub trait BotRuntime: Send {
    /// Start the runtime and return the bot's identity
    async fn start(&mut self) -> Result<BotIdentity>;
}
