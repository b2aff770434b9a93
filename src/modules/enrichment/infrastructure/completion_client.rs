use async_trait::async_trait;
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::time::sleep;

use super::retry_policy::{is_retryable_error, retry_after, RetryPolicy};
use crate::log_warn;
use crate::modules::enrichment::application::ports::text_generator::TextGenerator;
use crate::shared::config::CompletionConfig;
use crate::shared::errors::{AppError, AppResult};

type DirectRateLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

/// HTTP client for the completion service, with rate limiting and retries.
///
/// Speaks the messages-style API: a single user message in, the first text
/// block of the reply out. The reply content is opaque here; prompt authors
/// decide whether it is markdown or JSON.
pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
    rate_limiter: DirectRateLimiter,
    retry_policy: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_policy(config, RetryPolicy::default())
    }

    pub fn with_policy(config: CompletionConfig, retry_policy: RetryPolicy) -> Self {
        // Batch enrichment holds well under one request per second
        let quota = Quota::with_period(Duration::from_millis(1200))
            .unwrap()
            .allow_burst(NonZeroU32::new(2).unwrap());

        Self {
            client: Client::new(),
            config,
            rate_limiter: GovernorRateLimiter::direct(quota),
            retry_policy,
        }
    }

    async fn send_once(&self, prompt: &str) -> Result<reqwest::Response, reqwest::Error> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        self.client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
    }

    async fn request_with_retries(&self, prompt: &str) -> AppResult<String> {
        let mut last_error = AppError::ApiError("completion request never attempted".to_string());

        for attempt in 0..=self.retry_policy.max_retries {
            self.rate_limiter.until_ready().await;

            match self.send_once(prompt).await {
                Ok(response) => {
                    let status = response.status();

                    if status == 429 || status.is_server_error() {
                        let delay = self
                            .retry_policy
                            .calculate_delay(attempt, retry_after(response.headers()));
                        last_error =
                            AppError::ApiError(format!("Completion service returned {}", status));
                        if attempt < self.retry_policy.max_retries {
                            log_warn!(
                                "Completion service returned {} (attempt {}/{}). Retrying in {:?}",
                                status,
                                attempt + 1,
                                self.retry_policy.max_retries + 1,
                                delay
                            );
                            sleep(delay).await;
                            continue;
                        }
                        break;
                    }

                    if !status.is_success() {
                        // Client errors are not retryable
                        let detail = response.text().await.unwrap_or_default();
                        return Err(AppError::ApiError(format!(
                            "Completion service returned {}: {}",
                            status,
                            detail.trim()
                        )));
                    }

                    let parsed: MessageResponse = response.json().await?;
                    return parsed
                        .content
                        .into_iter()
                        .map(|block| block.text)
                        .find(|text| !text.is_empty())
                        .ok_or_else(|| {
                            AppError::ApiError("Completion reply carried no text".to_string())
                        });
                }
                Err(e) => {
                    let retryable = is_retryable_error(&e);
                    last_error = AppError::from(e);
                    if retryable && attempt < self.retry_policy.max_retries {
                        let delay = self.retry_policy.calculate_delay(attempt, None);
                        log_warn!(
                            "Completion request failed (attempt {}/{}): {}. Retrying in {:?}",
                            attempt + 1,
                            self.retry_policy.max_retries + 1,
                            last_error,
                            delay
                        );
                        sleep(delay).await;
                        continue;
                    }
                    break;
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl TextGenerator for CompletionClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.request_with_retries(prompt).await
    }
}
