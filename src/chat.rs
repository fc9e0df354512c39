//! Interactive chat session with a generative model.
//!
//! A [`ChatSession`] keeps the conversation history and replays it on every
//! turn. The model sits behind [`ChatBackend`]; [`LlmBackend`] wires it to
//! any `edgequake_llm` provider (Gemini by default).

use crate::error::DocAiError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_CHAT_PROVIDER: &str = "gemini";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-pro";
/// First message the CLI sends when a chat starts.
pub const INITIAL_PROMPT: &str = "What is the future of AI?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Produces the next model reply for a conversation ending in a user turn.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn reply(&self, history: &[ChatTurn]) -> Result<String, DocAiError>;
}

/// [`ChatBackend`] over an `edgequake_llm` provider.
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmBackend {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            options: CompletionOptions::default(),
        }
    }

    /// Build a provider by name (`gemini`, `openai`, ...) and model.
    pub fn from_provider_name(provider: &str, model: &str) -> Result<Self, DocAiError> {
        let llm = ProviderFactory::create_llm_provider(provider, model).map_err(|e| {
            DocAiError::ProviderNotConfigured {
                provider: provider.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(llm))
    }
}

#[async_trait]
impl ChatBackend for LlmBackend {
    async fn reply(&self, history: &[ChatTurn]) -> Result<String, DocAiError> {
        let messages: Vec<ChatMessage> = history
            .iter()
            .map(|turn| match turn.role {
                Role::User => ChatMessage::user(&turn.text),
                Role::Model => ChatMessage::assistant(&turn.text),
            })
            .collect();

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| DocAiError::ChatFailed { message: e.to_string() })?;
        debug!(
            "Chat reply: {} prompt tokens, {} completion tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// A running conversation.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            history: Vec::new(),
        }
    }

    pub fn from_provider_name(provider: &str, model: &str) -> Result<Self, DocAiError> {
        Ok(Self::new(Arc::new(LlmBackend::from_provider_name(provider, model)?)))
    }

    /// Send a user message and return the reply.
    ///
    /// On failure the history is left as it was before the call.
    pub async fn send(&mut self, message: &str) -> Result<String, DocAiError> {
        self.history.push(ChatTurn {
            role: Role::User,
            text: message.to_string(),
        });
        match self.backend.reply(&self.history).await {
            Ok(reply) => {
                self.history.push(ChatTurn {
                    role: Role::Model,
                    text: reply.clone(),
                });
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// `q` (any case, surrounding whitespace ignored) ends an interactive chat.
pub fn is_quit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("q")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replies with the number of turns it was given and the last message.
    struct Parrot;

    #[async_trait]
    impl ChatBackend for Parrot {
        async fn reply(&self, history: &[ChatTurn]) -> Result<String, DocAiError> {
            let last = history.last().map(|t| t.text.as_str()).unwrap_or_default();
            if last == "fail" {
                return Err(DocAiError::ChatFailed { message: "quota exceeded".into() });
            }
            Ok(format!("{}:{}", history.len(), last))
        }
    }

    #[tokio::test]
    async fn history_is_replayed() {
        let mut chat = ChatSession::new(Arc::new(Parrot));
        assert_eq!(chat.send(INITIAL_PROMPT).await.unwrap(), "1:What is the future of AI?");
        assert_eq!(chat.send("and then?").await.unwrap(), "3:and then?");
        let roles: Vec<Role> = chat.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::User, Role::Model]);
    }

    #[tokio::test]
    async fn failed_turn_is_not_recorded() {
        let mut chat = ChatSession::new(Arc::new(Parrot));
        chat.send("hi").await.unwrap();
        let err = chat.send("fail").await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(chat.history().len(), 2);

        chat.reset();
        assert!(chat.history().is_empty());
    }

    #[test]
    fn quit_detection() {
        assert!(is_quit("q"));
        assert!(is_quit(" Q \n"));
        assert!(!is_quit("quit"));
        assert!(!is_quit(""));
    }
}
