//! Wire types for the chat-completion API.
//!
//! Requests are built locally and serialized as-is. Responses come from a
//! third party and are treated as untrusted: every field is optional or
//! defaulted so an unexpected shape surfaces as a typed error, not a
//! deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub stop: Vec<String>,
}

/// Parsed completion response. Only `choices[0].message.content` is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Message content as returned upstream.
///
/// Providers normally return a plain string; anything else is kept verbatim
/// so the cleaner can fall back instead of failing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Other(Value),
}

impl CompletionResponse {
    /// Content of the first choice, if any.
    pub fn first_content(&self) -> Option<&MessageContent> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_ref())
    }
}
