use async_trait::async_trait;

use crate::shared::errors::AppResult;

/// Port for the external text-completion service.
///
/// The service is opaque to this crate: a prompt goes in, text comes out.
/// Callers that need structure ask for JSON in the prompt and parse the
/// reply themselves.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}
