//! Language-model completion
//!
//! [`CompletionProvider`] is the transport seam (one chat round trip,
//! optionally advertising tools). [`CompletionClient`] wraps a provider with
//! the fixed system instruction and exposes the single-prompt `complete`
//! operation used by the dispatcher.

pub mod openrouter;
pub mod types;

pub use openrouter::OpenRouterProvider;
pub use types::*;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::config::CompletionConfig;
use crate::error::{ClientError, ClientResult};

/// Trait for chat-completion providers
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Send one chat completion request
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> ClientResult<LlmResponse>;
}

/// Single-prompt completion with a fixed system instruction
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn CompletionProvider>, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build the OpenRouter-backed client, or `None` when no key is configured
    pub fn from_config(config: &CompletionConfig) -> Result<Option<Self>> {
        let Some(provider) = OpenRouterProvider::from_config(config)? else {
            return Ok(None);
        };
        Ok(Some(Self::new(
            Arc::new(provider),
            config.system_prompt.clone(),
        )))
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Send `prompt` as the only user turn and return the generated text.
    ///
    /// A response without text counts as a shape failure.
    #[instrument(skip(self, prompt), fields(provider = self.provider.name(), prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> ClientResult<String> {
        let messages = [Message::system(&self.system_prompt), Message::user(prompt)];

        let response = self
            .provider
            .chat(&messages, None)
            .await
            .inspect_err(|e| warn!(kind = e.kind(), "Completion failed: {}", e))?;

        match response.text().map(str::trim) {
            Some(text) if !text.is_empty() => {
                debug!("Completion returned {} chars", text.len());
                Ok(text.to_string())
            }
            _ => {
                warn!("Completion returned no text");
                Err(ClientError::Shape("completion has no text content".to_string()))
            }
        }
    }
}
