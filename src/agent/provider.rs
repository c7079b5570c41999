//! Model provider seam.
//!
//! The loop only ever asks for the next completion given the conversation
//! so far. Transport, authentication, streaming, and retries all live
//! behind this trait in provider implementations.

use crate::error::{AgentError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// System instructions.
    System,
    /// User input (queries, observations, repair requests).
    User,
    /// Model output.
    Assistant,
}

impl ChatRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One conversation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Who said it.
    pub role: ChatRole,
    /// What was said.
    pub content: String,
}

impl Message {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Abstract completion capability: conversation in, next reply out.
///
/// Implementations must be `Send + Sync`. The loop never retries a
/// `complete` call; if the transport retries internally, that is opaque
/// here.
pub trait ModelProvider: Send + Sync {
    /// Produces the model's next reply for the given conversation.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Provider`] on any transport or decoding
    /// failure.
    fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Deterministic provider that replays canned replies in order.
///
/// The offline workhorse for tests and demos: each `complete` call pops
/// the next scripted reply, failing once the script runs dry.
///
/// # Examples
///
/// ```
/// use dexa_rs::agent::{Message, ModelProvider, ScriptedProvider};
///
/// let provider = ScriptedProvider::new(vec!["first".to_string(), "second".to_string()]);
/// assert_eq!(provider.complete(&[Message::user("hi")]).unwrap(), "first");
/// assert_eq!(provider.complete(&[]).unwrap(), "second");
/// assert!(provider.complete(&[]).is_err());
/// ```
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedProvider {
    /// Creates a provider that replays the given replies in order.
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    /// Creates a provider from string slices.
    #[must_use]
    pub fn from_slices(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(ToString::to_string).collect())
    }

    /// Returns how many scripted replies remain.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().map_or(0, |q| q.len())
    }
}

impl ModelProvider for ScriptedProvider {
    fn complete(&self, _messages: &[Message]) -> Result<String> {
        let mut queue = self
            .responses
            .lock()
            .map_err(|_| AgentError::Provider("scripted provider poisoned".to_string()))?;

        queue
            .pop_front()
            .ok_or_else(|| AgentError::Provider("scripted provider exhausted".to_string()).into())
    }
}
