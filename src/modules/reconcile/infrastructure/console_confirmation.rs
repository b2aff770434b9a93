use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::modules::reconcile::application::ports::confirmation::ConfirmationPort;
use crate::shared::errors::{AppError, AppResult};

/// Interactive confirmation over stdin.
///
/// Prints the question and waits for a line; "yes" (any casing) affirms,
/// everything else declines. There is no timeout: an unanswered prompt holds
/// the import until the operator responds.
pub struct ConsoleConfirmation;

#[async_trait]
impl ConfirmationPort for ConsoleConfirmation {
    async fn confirm(&self, question: &str) -> AppResult<bool> {
        use std::io::Write;

        print!("{}", question);
        std::io::stdout().flush()?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(AppError::IoError(
                "stdin closed while waiting for confirmation".to_string(),
            ));
        }

        Ok(line.trim().eq_ignore_ascii_case("yes"))
    }
}
