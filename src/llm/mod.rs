//! Natural language front end
//!
//! utterance -> prompt -> CompletionBackend -> reply -> ActionDescriptor

pub mod client;
pub mod parser;
pub mod prompt;

pub use client::{CompletionBackend, LlmClient};
pub use parser::CommandParser;
