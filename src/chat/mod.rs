//! Chat endpoint: question in, cleaned answer out.

pub mod handler;
pub mod prompt;

pub use handler::{is_json_content_type, tarot_chat, ChatService};
pub use prompt::PromptBuilder;
