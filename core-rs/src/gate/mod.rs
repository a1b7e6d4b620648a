//! Access gate module
//!
//! Interactive password challenge with an attempt-limited lockout, and the
//! console port it talks through.

pub mod console;
pub mod verifier;

pub use console::{ConsolePort, ScriptedConsole, TerminalConsole};
pub use verifier::{digest, digest_hex, digests_match, fingerprint, AccessGate, GateOutcome, MAX_ATTEMPTS};
