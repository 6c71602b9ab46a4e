/*!
 * Core translation client implementation.
 *
 * This module contains the TranslationClient, which wraps a concrete LLM
 * provider behind the one-method `Translator` trait the processing loop
 * depends on. The loop never sees provider types; tests substitute a
 * deterministic fake.
 */

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::app_config::{ProviderConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::Provider;
use crate::translation::prompts::{build_user_prompt, PromptTemplate};

/// A single translation request
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,

    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Optional free-form context for the model
    pub context: Option<String>,
}

impl TranslationRequest {
    /// Create a request without context
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            context: None,
        }
    }

    /// Attach context to the request
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// The translation capability the processing loop depends on
///
/// One method, object-safe, substitutable by an in-memory fake in tests.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single piece of text
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError>;
}

/// Translation provider implementation variants
enum TranslationProviderImpl {
    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },

    /// Deterministic in-memory provider
    Mock {
        /// Client instance
        client: MockProvider,
    },
}

/// Translation client for document text
///
/// Builds the translation prompt, invokes the configured provider with
/// deterministic sampling settings, and post-processes the raw response.
pub struct TranslationClient {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Model identifier passed to the provider
    model: String,

    /// Output token ceiling per request
    max_tokens: u32,

    /// Deadline for a single remote call
    timeout: Duration,
}

impl TranslationClient {
    /// Create a new translation client from provider configuration
    pub fn new(config: &ProviderConfig) -> Self {
        let provider = match config.provider_type {
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.api_key.clone(), config.endpoint.clone()),
            },
            ConfigTranslationProvider::Mock => TranslationProviderImpl::Mock {
                client: MockProvider::working(),
            },
        };

        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Create a client around an existing mock provider (testing)
    pub fn with_mock(provider: MockProvider, timeout: Duration) -> Self {
        Self {
            provider: TranslationProviderImpl::Mock { client: provider },
            model: "mock".to_string(),
            max_tokens: 4096,
            timeout,
        }
    }

    /// The table of officially supported languages
    pub fn supported_languages() -> &'static BTreeMap<&'static str, &'static str> {
        language_utils::supported_languages()
    }

    /// Validate a language pair as a caller-side precondition
    pub fn validate_pair(source: &str, target: &str) -> bool {
        language_utils::validate_pair(source, target)
    }

    /// Strip surrounding whitespace and one layer of enclosing quotes.
    ///
    /// Models occasionally echo the quoting used in the prompt; a single
    /// layer is removed, anything further is treated as content.
    fn post_process(raw: &str) -> String {
        let trimmed = raw.trim();

        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            trimmed[1..trimmed.len() - 1].to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Dispatch the request to the configured provider
    async fn request_translation(
        &self,
        request: &TranslationRequest,
    ) -> Result<String, TranslationError> {
        let source_name = language_utils::display_name(&request.source_language);
        let target_name = language_utils::display_name(&request.target_language);

        match &self.provider {
            TranslationProviderImpl::Anthropic { client } => {
                let system = PromptTemplate::document_translator().render(&source_name, &target_name);
                let user = build_user_prompt(
                    &request.text,
                    &source_name,
                    &target_name,
                    request.context.as_deref(),
                );

                let api_request = AnthropicRequest::new(&self.model, self.max_tokens)
                    .system(system)
                    .add_message("user", user)
                    .temperature(0.1)
                    .top_p(0.9)
                    .stop_sequence("\n\n");

                let response = client.complete(api_request).await?;
                Ok(Anthropic::extract_text(&response))
            }
            TranslationProviderImpl::Mock { client } => {
                let api_request = MockRequest {
                    text: request.text.clone(),
                    source_language: request.source_language.clone(),
                    target_language: request.target_language.clone(),
                };

                let response = client.complete(api_request).await?;
                Ok(MockProvider::extract_text(&response))
            }
        }
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslationError> {
        debug!(
            "Translating {} chars: {} -> {}",
            request.text.len(),
            request.source_language,
            request.target_language
        );

        let raw = tokio::time::timeout(self.timeout, self.request_translation(request))
            .await
            .map_err(|_| TranslationError::Timeout {
                seconds: self.timeout.as_secs(),
            })??;

        let translated = Self::post_process(&raw);
        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(translated)
    }
}
