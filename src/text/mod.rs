//! Answer post-processing.
//!
//! Raw model output is normalized into a period-separated sentence sequence
//! with collapsed whitespace and a bounded word count.

use crate::config::AnswerConfig;
use crate::upstream::MessageContent;

/// Appended to answers cut at `truncate_words`.
pub const ELLIPSIS: &str = "...";

/// Normalizes raw completion text.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    max_words: usize,
    truncate_words: usize,
    fallback_chars: usize,
}

impl TextCleaner {
    pub fn new(config: &AnswerConfig) -> Self {
        Self {
            max_words: config.max_words,
            truncate_words: config.truncate_words.min(config.max_words),
            fallback_chars: config.fallback_chars,
        }
    }

    /// Split on '.', trim and drop empty sentences, rejoin with ". ",
    /// terminate with '.', collapse whitespace, then bound the word count.
    pub fn process(&self, raw: &str) -> String {
        let joined = raw
            .split('.')
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .collect::<Vec<_>>()
            .join(". ");

        let words: Vec<&str> = joined.split_whitespace().collect();
        // The terminating period attaches to the last word.
        let mut text = words.join(" ");
        text.push('.');

        if words.len() < self.max_words {
            return text;
        }

        let mut truncated = text
            .split_whitespace()
            .take(self.truncate_words)
            .collect::<Vec<_>>()
            .join(" ");
        truncated.push_str(ELLIPSIS);
        truncated
    }

    /// First `fallback_chars` characters of `raw` with a trailing period.
    pub fn fallback(&self, raw: &str) -> String {
        let mut text: String = raw.chars().take(self.fallback_chars).collect();
        text.push('.');
        text
    }

    /// Clean whatever content shape the upstream returned.
    ///
    /// Non-text content cannot be split into sentences; it is rendered as
    /// JSON and passed through `fallback`.
    pub fn process_content(&self, content: &MessageContent) -> String {
        match content {
            MessageContent::Text(text) => self.process(text),
            MessageContent::Other(value) => {
                tracing::error!(kind = json_kind(value), "Unexpected answer content shape, using fallback");
                self.fallback(&value.to_string())
            }
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(&AnswerConfig::default())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
