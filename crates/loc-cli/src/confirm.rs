//! Interactive confirmation prompt.

use dialoguer::Confirm;
use loc_core::{ConfirmationRequest, Confirmer, Error, Result};
use std::io;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

/// Asks on the terminal, defaulting to "no".
///
/// Without a terminal on stderr the prompt cannot be shown and the
/// invocation fails; pass `--force` in scripts. Interrupting the prompt
/// with Ctrl-C declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, request: &ConfirmationRequest) -> Result<bool> {
        if !console::user_attended_stderr() {
            return Err(Error::ConfirmationFailed {
                message: format!(
                    "{} ({} impact) needs confirmation but no terminal is attached; use --force",
                    request.cmdlet, request.impact
                ),
                source: None,
            });
        }

        let prompt = || {
            Confirm::new()
                .with_prompt(request.prompt())
                .default(false)
                .interact()
        };
        let answer = interpret(blocking(prompt))?;

        debug!(cmdlet = %request.cmdlet, answer, "confirmation answered");
        Ok(answer)
    }
}

/// Runs a blocking terminal read without stalling other tasks on a
/// multi-threaded runtime.
fn blocking<T>(read: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

fn interpret(answer: dialoguer::Result<bool>) -> Result<bool> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
            debug!("confirmation prompt interrupted");
            Ok(false)
        }
        Err(e) => Err(Error::ConfirmationFailed {
            message: "failed to read confirmation".to_string(),
            source: Some(Box::new(e)),
        }),
    }
}
