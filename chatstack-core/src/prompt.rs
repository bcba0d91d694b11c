//! Operator confirmation prompts.
//!
//! Destructive operations are gated on the operator typing an exact literal.
//! Non-interactive input has one behavior only: the confirmation is declined.

use async_trait::async_trait;
use std::io::{BufRead, IsTerminal, Write};
use tracing::warn;

/// Blocking confirmation prompt.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// Ask the operator to type `required` exactly (case-sensitive).
    /// Returns false on any other input or when input is non-interactive.
    async fn confirm(&self, prompt: &str, required: &str) -> bool;
}

/// Prompt reading from the invoking terminal.
pub struct TerminalPrompt;

#[async_trait]
impl OperatorPrompt for TerminalPrompt {
    async fn confirm(&self, prompt: &str, required: &str) -> bool {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            warn!("stdin is not a terminal, treating confirmation as declined");
            return false;
        }

        print!("{} [type {} to confirm]: ", prompt, required);
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() {
            return false;
        }

        line.trim() == required
    }
}
