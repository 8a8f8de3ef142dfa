//! OS Agent - natural language control of the local machine
//!
//! utterance -> CommandParser -> ActionDescriptor -> ActionDispatcher ->
//! ResultEnvelope -> console

pub mod actions;
pub mod command;
pub mod core;
pub mod llm;
pub mod session;
