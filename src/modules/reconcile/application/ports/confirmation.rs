use async_trait::async_trait;

use crate::shared::errors::AppResult;

/// Port for the human yes/no channel used on ambiguous matches.
///
/// The contract is deliberately fail-safe: only an explicit affirmative
/// answer returns true. Channel errors are surfaced so the runner can fall
/// back to skipping rather than inserting a possible duplicate.
#[async_trait]
pub trait ConfirmationPort: Send + Sync {
    async fn confirm(&self, question: &str) -> AppResult<bool>;
}

/// Headless mode that accepts every ambiguous record.
pub struct AlwaysApprove;

#[async_trait]
impl ConfirmationPort for AlwaysApprove {
    async fn confirm(&self, _question: &str) -> AppResult<bool> {
        Ok(true)
    }
}

/// Headless mode that declines every ambiguous record.
pub struct AlwaysDeny;

#[async_trait]
impl ConfirmationPort for AlwaysDeny {
    async fn confirm(&self, _question: &str) -> AppResult<bool> {
        Ok(false)
    }
}
