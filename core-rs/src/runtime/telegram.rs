//! Telegram Bot API runtime
//!
//! `start` resolves the bot identity through `getMe`. `serve` long-polls
//! `getUpdates` and answers slash commands from the loaded plugins, subject
//! to the role book. Transport failures end the loop; nothing is retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::errors::{BootError, Result};
use crate::plugins::{command_of, PluginRegistry, RoleBook};
use crate::runtime::{BotIdentity, BotRuntime};

#[derive(Debug, Deserialize)]
struct TelegramEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

/// Bot runtime backed by the Telegram Bot API
#[derive(Debug, Clone)]
pub struct TelegramRuntime {
    http: reqwest::Client,
    api_base: String,
    token: String,
    request_timeout: Duration,
    poll_timeout_secs: u64,
    identity: Option<BotIdentity>,
}

impl TelegramRuntime {
    pub fn new(
        api_base: &str,
        token: &str,
        request_timeout: Duration,
        poll_timeout_secs: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            request_timeout,
            poll_timeout_secs,
            identity: None,
        })
    }

    /// Identity resolved by `start`, if it ran
    pub fn identity(&self) -> Option<&BotIdentity> {
        self.identity.as_ref()
    }

    // The token is part of the path; never log this URL.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, request: reqwest::RequestBuilder) -> Result<T> {
        debug!(method, "telegram request");
        let response = request.send().await?;
        let status = response.status();
        let envelope: TelegramEnvelope<T> = response.json().await.map_err(|e| {
            BootError::Runtime(format!("telegram {} returned an unreadable body ({}): {}", method, status, e))
        })?;

        if !envelope.ok {
            return Err(BootError::Runtime(format!(
                "telegram {} failed: {}",
                method,
                envelope
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            )));
        }

        envelope
            .result
            .ok_or_else(|| BootError::Runtime(format!("telegram {} returned no result", method)))
    }

    pub async fn get_me(&self) -> Result<BotIdentity> {
        self.call("getMe", self.http.get(self.method_url("getMe"))).await
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<TelegramUpdate>> {
        let request = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout_secs.to_string()),
            ])
            .timeout(self.request_timeout + Duration::from_secs(self.poll_timeout_secs));
        self.call("getUpdates", request).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(message_id) = reply_to {
            body["reply_to_message_id"] = json!(message_id);
        }
        let _: serde_json::Value = self
            .call("sendMessage", self.http.post(self.method_url("sendMessage")).json(&body))
            .await?;
        Ok(())
    }

    /// Answer one update. Returns true when a reply was sent.
    pub async fn handle_update(
        &self,
        update: &TelegramUpdate,
        plugins: &PluginRegistry,
        roles: &RoleBook,
    ) -> Result<bool> {
        let Some(message) = &update.message else {
            return Ok(false);
        };
        let Some(text) = message.text.as_deref() else {
            return Ok(false);
        };
        let bot_username = self.identity.as_ref().map(|identity| identity.username.as_str());
        let Some(command) = command_of(text, bot_username) else {
            return Ok(false);
        };
        let Some(plugin) = plugins.find(&command) else {
            debug!(command = %command, "no plugin for command");
            return Ok(false);
        };

        let user_id = message.from.as_ref().map(|user| user.id);
        let username = message.from.as_ref().and_then(|user| user.username.as_deref());
        let reply = if roles.allows(user_id, username, plugin) {
            plugin.reply.clone()
        } else {
            info!(command = %command, "command refused by role book");
            format!("⛔ {} is restricted.", plugin.command)
        };

        self.send_message(message.chat.id, &reply, Some(message.message_id)).await?;
        Ok(true)
    }

    /// Fetch and answer one batch of updates; returns the next offset.
    ///
    /// Only `getUpdates` failures are returned. A reply that fails for one
    /// update is logged and the update is still acknowledged, so a chat the
    /// bot cannot write to is never redelivered.
    pub async fn poll_once(&self, offset: i64, plugins: &PluginRegistry, roles: &RoleBook) -> Result<i64> {
        let updates = self.get_updates(offset).await?;
        let mut next_offset = offset;
        for update in &updates {
            next_offset = next_offset.max(update.update_id + 1);
            if let Err(err) = self.handle_update(update, plugins, roles).await {
                warn!(update_id = update.update_id, error = %err, "failed to answer update");
            }
        }
        Ok(next_offset)
    }

    /// Poll until `shutdown` is set
    pub async fn serve(&self, plugins: &PluginRegistry, roles: &RoleBook, shutdown: Arc<AtomicBool>) -> Result<()> {
        info!(plugins = plugins.len(), roles = roles.len(), "bot runtime serving");
        let mut offset = 0;
        while !shutdown.load(Ordering::SeqCst) {
            offset = self.poll_once(offset, plugins, roles).await.map_err(|err| {
                warn!(error = %err, "bot runtime stopped");
                err
            })?;
        }
        info!("bot runtime shut down");
        Ok(())
    }
}

#[async_trait]
impl BotRuntime for TelegramRuntime {
    async fn start(&mut self) -> Result<BotIdentity> {
        let identity = self.get_me().await?;
        info!(username = %identity.username, "bot runtime started");
        self.identity = Some(identity.clone());
        Ok(identity)
    }
}
