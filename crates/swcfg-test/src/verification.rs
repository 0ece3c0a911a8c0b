//! Verification helpers for device command sequences.

use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected command '{expected}' (step {step}) was not sent in order")]
    MissingCommand { step: usize, expected: String },

    #[error("Command '{command}' was sent but must not be")]
    UnexpectedCommand { command: String },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Asserts that `expected` appears in `sent` as an ordered subsequence.
pub fn assert_sent_in_order(sent: &[String], expected: &[&str]) -> VerifyResult<()> {
    let mut remaining = sent.iter();
    for (step, want) in expected.iter().enumerate() {
        if !remaining.any(|c| c == want) {
            return Err(VerificationError::MissingCommand {
                step,
                expected: want.to_string(),
            });
        }
    }
    Ok(())
}

/// Asserts that no sent command starts with `prefix` as a whole word.
pub fn assert_never_sent(sent: &[String], prefix: &str) -> VerifyResult<()> {
    let hit = sent.iter().find(|c| {
        c.as_str() == prefix
            || c
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with(' '))
    });
    match hit {
        Some(command) => Err(VerificationError::UnexpectedCommand {
            command: command.clone(),
        }),
        None => Ok(()),
    }
}
