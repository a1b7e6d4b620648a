//! Operator-facing console output for the boot sequence

use std::time::Duration;

use colored::Colorize;

use crate::errors::Result;
use crate::gate::ConsolePort;
use crate::runtime::BotIdentity;
use crate::tokens::mask_token;

/// Write `text` one character at a time, then a newline.
/// A zero delay writes it in one go.
pub async fn typing_message<C: ConsolePort + ?Sized>(console: &mut C, text: &str, delay: Duration) -> Result<()> {
    if delay.is_zero() {
        return console.write_line(text);
    }

    let mut buf = [0u8; 4];
    for ch in text.chars() {
        console.write(ch.encode_utf8(&mut buf))?;
        tokio::time::sleep(delay).await;
    }
    console.write("\n")
}

pub fn step<C: ConsolePort + ?Sized>(console: &mut C, title: &str) -> Result<()> {
    console.write_line(&format!("┌─ {}", title).dimmed().to_string())
}

/// Bot info panel shown once the runtime is up
pub fn bot_panel<C: ConsolePort + ?Sized>(console: &mut C, identity: &BotIdentity, owner: &str) -> Result<()> {
    console.write_line(&"◈ ───── Bot Info ───── ◈".magenta().to_string())?;
    console.write_line(&format!("{} {}", "◈ Bot    :".white(), identity.handle().cyan()))?;
    console.write_line(&format!("{} {}", "◈ Owner  :".white(), owner.yellow()))?;
    console.write_line(&format!("{} {}", "◈ Status :".white(), "RUNNING".green()))?;
    console.write_line(&"◈ ─────────────────── ◈".magenta().to_string())?;
    console.write_line(&"◈ Type a Command...".white().to_string())
}

/// Masked diagnostic for a local token missing from the allow-list
pub fn unauthorized_token<C: ConsolePort + ?Sized>(console: &mut C, local_token: &str, valid_tokens: &[String]) -> Result<()> {
    console.write_line(&"🚫 Invalid token!".red().to_string())?;
    console.write_line(&format!("🔑 Your token: {}", mask_token(local_token)))?;
    console.write_line("📄 Registered tokens:")?;
    for (index, token) in valid_tokens.iter().enumerate() {
        console.write_line(&format!("   • {}. {}", index + 1, mask_token(token)))?;
    }
    Ok(())
}
