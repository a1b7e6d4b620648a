//! Console port - line input and text output for the operator
//!
//! The gate and the boot orchestrator only talk to the operator through
//! `ConsolePort`, so they run the same against a terminal or a script.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::errors::Result;

/// Read-line / write-line capability
pub trait ConsolePort {
    /// Read one line without its trailing newline. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Write text without a newline
    fn write(&mut self, text: &str) -> Result<()>;

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.write(line)?;
        self.write("\n")
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Process stdin/stdout
pub struct TerminalConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePort for TerminalConsole {
    fn read_line(&mut self) -> Result<Option<String>> {
        self.stdout.flush()?;
        let mut line = String::new();
        let read = self.stdin.lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(line)))
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.stdout.write_all(text.as_bytes())?;
        self.stdout.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.write("\x1B[2J\x1B[1;1H")
    }
}

/// In-memory console: replays queued input lines and records all output.
///
/// Used for non-interactive runs and tests.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    output: String,
    reads: usize,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: String::new(),
            reads: 0,
        }
    }

    /// Everything written so far
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Number of read_line calls, including the one that hit end of input
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl ConsolePort for ScriptedConsole {
    fn read_line(&mut self) -> Result<Option<String>> {
        self.reads += 1;
        Ok(self.inputs.pop_front())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.output.push_str(text);
        Ok(())
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
