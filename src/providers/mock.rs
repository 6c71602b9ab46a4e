/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a deterministic translation
    Working,
    /// Succeeds but wraps the translation in double quotes
    Quoted,
    /// Fails intermittently (every Nth request)
    Intermittent {
        /// Every Nth request fails
        fail_every: usize
    },
    /// Always fails with an error
    Failing,
    /// Returns empty responses
    Empty,
    /// Simulates slow responses (for timeout testing)
    Slow {
        /// Response delay in milliseconds
        delay_ms: u64
    },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Texts received, in call order
    calls: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock whose translations arrive wrapped in quotes
    pub fn quoted() -> Self {
        Self::new(MockBehavior::Quoted)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that responds after the given delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Deterministic translation used by the working behaviors
    pub fn translate_text(request: &MockRequest) -> String {
        format!("[{}] {}", request.target_language, request.text)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the requests received, in call order
    pub fn calls(&self) -> Vec<MockRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: MockRequest) -> Result<MockResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(MockResponse {
                text: Self::translate_text(&request),
            }),
            MockBehavior::Quoted => Ok(MockResponse {
                text: format!("\"{}\"", Self::translate_text(&request)),
            }),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    Err(ProviderError::RequestFailed(format!(
                        "Simulated failure on request {}",
                        count
                    )))
                } else {
                    Ok(MockResponse {
                        text: Self::translate_text(&request),
                    })
                }
            }
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "Simulated provider failure".to_string(),
            )),
            MockBehavior::Empty => Ok(MockResponse {
                text: String::new(),
            }),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                Ok(MockResponse {
                    text: Self::translate_text(&request),
                })
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &MockResponse) -> String {
        response.text.clone()
    }
}
