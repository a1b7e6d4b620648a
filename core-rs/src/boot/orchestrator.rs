//! Boot Orchestrator
//!
//! Strict sequence, no step skipped:
//!
//! 1. fetch the auth record, run the access gate
//! 2. fetch the token-db descriptor
//! 3. fetch the token allow-list
//! 4. check the local token against it
//! 5. start the bot runtime
//! 6. load plugins, then roles
//!
//! Every failure comes back as a `BootError`; only the binary decides to
//! terminate the process.

use std::time::Duration;

use chrono::{DateTime, Utc};
use colored::Colorize;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::info;

use crate::boot::banner;
use crate::config::BootConfig;
use crate::errors::{BootError, Result};
use crate::gate::{AccessGate, ConsolePort};
use crate::plugins::{PluginRegistry, RoleBook};
use crate::runtime::{BotIdentity, BotRuntime};
use crate::store::RemoteStoreClient;
use crate::tokens::{describe_token_count, is_authorized, mask_token, TokenValidator};

const BOOT_PAUSE: Duration = Duration::from_millis(500);

// The gate blocks on console input. On a multi-thread runtime the read is
// moved off the async worker; a current-thread runtime has nothing else to run.
fn read_blocking<T>(read: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(read),
        _ => read(),
    }
}

/// Everything the boot sequence needs, built once from the config
#[derive(Debug, Clone)]
pub struct BootContext {
    pub config: BootConfig,
    pub store: RemoteStoreClient,
    pub validator: TokenValidator,
    pub gate: AccessGate,
}

impl BootContext {
    pub fn from_config(config: BootConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        Ok(Self {
            store: RemoteStoreClient::new(config.store_locator(), timeout)?,
            validator: TokenValidator::new(timeout)?,
            gate: AccessGate::new(),
            config,
        })
    }
}

/// Summary of a completed boot
#[derive(Debug, Clone, PartialEq)]
pub struct BootReport {
    pub bot: BotIdentity,
    pub attempts: u32,
    pub token_count: usize,
    pub plugin_count: usize,
    pub role_count: usize,
    pub booted_at: DateTime<Utc>,
}

/// A started runtime with its loaded plugins and roles
pub struct BootedSystem<R> {
    pub runtime: R,
    pub plugins: PluginRegistry,
    pub roles: RoleBook,
    pub report: BootReport,
}

pub struct BootOrchestrator<'c, C: ConsolePort + ?Sized> {
    ctx: BootContext,
    console: &'c mut C,
}

impl<'c, C: ConsolePort + ?Sized> BootOrchestrator<'c, C> {
    pub fn new(ctx: BootContext, console: &'c mut C) -> Self {
        Self { ctx, console }
    }

    /// Run the full boot sequence and hand back the started runtime
    pub async fn run<R: BotRuntime>(mut self, mut runtime: R) -> Result<BootedSystem<R>> {
        self.console.clear()?;
        self.console.write_line(&"System startup in progress".blue().to_string())?;

        banner::step(&mut *self.console, "Step 1: Authentication")?;
        let attempts = self.authenticate().await?;
        self.console.write_line(&"✅  Authorization successful".green().to_string())?;

        self.console.write_line(&"Checking access token...".dimmed().to_string())?;
        let tokens = self.validate_token().await?;

        let bot = self.start_runtime(&mut runtime).await?;

        banner::step(&mut *self.console, "Step 2: Load all Plugins")?;
        let plugins = self.load_plugins()?;

        banner::step(&mut *self.console, "Step 3: Load all Roles")?;
        let roles = self.load_roles()?;

        self.console.write_line(&"🎉 Bot started successfully!".green().to_string())?;

        let report = BootReport {
            bot,
            attempts,
            token_count: tokens.len(),
            plugin_count: plugins.len(),
            role_count: roles.len(),
            booted_at: Utc::now(),
        };
        info!(
            bot = %report.bot.username,
            tokens = report.token_count,
            plugins = report.plugin_count,
            roles = report.role_count,
            "boot complete"
        );

        Ok(BootedSystem {
            runtime,
            plugins,
            roles,
            report,
        })
    }

    /// Fetch the auth record and run the gate. Returns the attempts used.
    pub async fn authenticate(&mut self) -> Result<u32> {
        let resource = self.ctx.config.spec.store.auth_resource.clone();
        self.console.write_line(&"◈ Connecting to database...".cyan().to_string())?;

        let Some(credential) = self.ctx.store.fetch_credential(&resource).await else {
            self.console.write_line(&"✖ Failed to access database".red().to_string())?;
            self.console.write_line(&"🚫 System blocked! Access denied.".red().to_string())?;
            return Err(BootError::MissingCredential);
        };
        self.console.write_line(&"✔ Database accessed successfully!".green().to_string())?;

        let gate = &self.ctx.gate;
        let console = &mut *self.console;
        let outcome = read_blocking(|| gate.verify(console, &credential.password))?;
        if !outcome.is_granted() {
            self.console.write_line(&"❌  Authentication failed!".red().to_string())?;
        }
        outcome.into_result()
    }

    /// Fetch the allow-list and check the local token against it.
    /// Returns the valid token set.
    pub async fn validate_token(&mut self) -> Result<Vec<String>> {
        self.console.clear()?;
        banner::typing_message(&mut *self.console, "Starting system...", self.ctx.config.typing_delay()).await?;
        if !self.ctx.config.typing_delay().is_zero() {
            tokio::time::sleep(BOOT_PAUSE).await;
        }

        let resource = self.ctx.config.spec.store.token_resource.clone();
        self.console.write_line(&"◈ Connecting to database...".cyan().to_string())?;
        let Some(descriptor) = self.ctx.store.fetch_token_db(&resource).await else {
            self.console.write_line(&"❌ Core database not found!".red().to_string())?;
            return Err(BootError::MissingTokenDatabase);
        };

        self.console.write_line(&"🔄 Loading token data...".cyan().to_string())?;
        self.console.write_line(&"The system is reading the database. Please wait.".dimmed().to_string())?;
        let tokens = self.ctx.validator.fetch_tokens(&descriptor.database_link).await;
        if tokens.is_empty() {
            self.console.write_line(&"⚠️ No active tokens!".yellow().to_string())?;
            return Err(BootError::NoActiveTokens);
        }
        self.console.write_line(&"🧬 TOKEN DETECTED".bright_green().to_string())?;
        self.console.write_line(&describe_token_count(tokens.len()).bright_green().to_string())?;

        let local_token = &self.ctx.config.spec.token;
        if !is_authorized(local_token, &tokens) {
            banner::unauthorized_token(&mut *self.console, local_token, &tokens)?;
            return Err(BootError::UnauthorizedToken {
                masked: mask_token(local_token),
            });
        }

        self.console.write_line("✅ Token valid! System ready ⚡")?;
        self.console.write_line("─────────────────────────────")?;
        Ok(tokens)
    }

    async fn start_runtime<R: BotRuntime>(&mut self, runtime: &mut R) -> Result<BotIdentity> {
        let identity = runtime.start().await?;
        self.console.clear()?;
        banner::bot_panel(&mut *self.console, &identity, &self.ctx.config.metadata.owner)?;
        Ok(identity)
    }

    fn load_plugins(&mut self) -> Result<PluginRegistry> {
        let plugins = PluginRegistry::load_dir(&self.ctx.config.spec.plugins.dir)?;
        self.console.write_line(&format!("🎉 {} plugin(s) loaded", plugins.len()))?;
        Ok(plugins)
    }

    fn load_roles(&mut self) -> Result<RoleBook> {
        let roles = RoleBook::load(&self.ctx.config.spec.roles.file)?;
        self.console.write_line(&format!("🎉 {} role(s) loaded", roles.len()))?;
        Ok(roles)
    }
}
