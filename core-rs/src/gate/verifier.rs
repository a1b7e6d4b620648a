//! Access Verification Gate
//!
//! Attempt-limited password challenge. Operator input and the reference
//! password are both reduced to SHA-256 digests and compared in constant
//! time; the secrets themselves are never compared.
//!
//! Outcomes:
//! - match on any attempt: `Granted`, no further prompt
//! - mismatch with attempts left: "attempts remaining" notice, prompt again
//! - mismatch on the last attempt: lockout notice, `Denied`
//! - end of input: `InputClosed`

use colored::Colorize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use crate::errors::{BootError, Result};
use crate::gate::console::ConsolePort;

/// Total password attempts per gate invocation
pub const MAX_ATTEMPTS: u32 = 2;

pub const PROMPT: &str = "💬 ";

const FINGERPRINT_LEN: usize = 12;

/// Terminal state of one gate invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Granted { attempts: u32 },
    Denied { attempts: u32 },
    InputClosed { attempts: u32 },
}

impl GateOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateOutcome::Granted { .. })
    }

    /// Attempts consumed before the gate resolved
    pub fn attempts(&self) -> u32 {
        match self {
            GateOutcome::Granted { attempts }
            | GateOutcome::Denied { attempts }
            | GateOutcome::InputClosed { attempts } => *attempts,
        }
    }

    /// Convert a non-granted outcome into the matching fatal error
    pub fn into_result(self) -> Result<u32> {
        match self {
            GateOutcome::Granted { attempts } => Ok(attempts),
            GateOutcome::Denied { attempts } => Err(BootError::AccessDenied { attempts }),
            GateOutcome::InputClosed { .. } => Err(BootError::InputClosed),
        }
    }
}

/// Password challenge with a fixed attempt budget
#[derive(Debug, Clone)]
pub struct AccessGate {
    max_attempts: u32,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessGate {
    pub fn new() -> Self {
        Self { max_attempts: MAX_ATTEMPTS }
    }

    /// Gate with a different attempt budget (at least one attempt)
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run the challenge against `reference_password`.
    ///
    /// An empty reference fails closed with `MissingCredential` before any
    /// prompt is shown.
    pub fn verify<C: ConsolePort + ?Sized>(
        &self,
        console: &mut C,
        reference_password: &str,
    ) -> Result<GateOutcome> {
        if reference_password.is_empty() {
            return Err(BootError::MissingCredential);
        }

        let reference_digest = digest(reference_password);
        debug!(fingerprint = %fingerprint(reference_password), "reference credential loaded");
        let mut attempt: u32 = 1;

        loop {
            self.print_prompt(console, attempt)?;

            let input = match console.read_line()? {
                Some(input) => input,
                None => {
                    warn!(attempt, "operator input closed during verification");
                    return Ok(GateOutcome::InputClosed { attempts: attempt - 1 });
                }
            };

            if digests_match(&digest(&input), &reference_digest) {
                info!(attempt, "password accepted");
                console.write_line(&format!(
                    "\n{}\nPassword accepted.\nSystem access granted.\n",
                    "🟢 AUTH SUCCESS".bright_green().bold()
                ))?;
                return Ok(GateOutcome::Granted { attempts: attempt });
            }

            warn!(attempt, "password rejected");
            if attempt < self.max_attempts {
                let remaining = self.max_attempts - attempt;
                console.write_line(&format!(
                    "\n{}\nPassword does not match.\n{} attempt(s) remaining. Use them carefully.\n",
                    "⚠️ VERIFICATION REJECTED".bright_red().bold(),
                    remaining
                ))?;
                attempt += 1;
                continue;
            }

            console.write_line(&format!(
                "\n{}\nInvalid password detected.\nNo attempts remaining. Access has been locked.\n",
                "🚨 ACCESS LOCKED".bright_red().bold()
            ))?;
            return Ok(GateOutcome::Denied { attempts: attempt });
        }
    }

    fn print_prompt<C: ConsolePort + ?Sized>(&self, console: &mut C, attempt: u32) -> Result<()> {
        console.write_line(&"🔐 Security Verification".bright_blue().to_string())?;
        console.write_line(&"Please enter the password.".yellow().to_string())?;
        console.write_line(
            &format!(
                "You have {} chance(s) left before access is locked.",
                self.max_attempts - attempt
            )
            .dimmed()
            .to_string(),
        )?;
        console.write(PROMPT)
    }
}

/// SHA-256 of a secret
pub fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Hex form of a secret's digest, for logs that must never carry the secret
pub fn digest_hex(secret: &str) -> String {
    hex::encode(digest(secret))
}

/// Short digest prefix identifying which reference password is deployed
pub fn fingerprint(secret: &str) -> String {
    let mut hex = digest_hex(secret);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Constant-time digest equality
pub fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    bool::from(a[..].ct_eq(&b[..]))
}
