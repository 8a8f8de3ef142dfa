//! Command execution pipeline
//!
//! Validates ActionDescriptors and runs them against the operating system:
//! ActionDescriptor -> ActionDispatcher -> handler -> ResultEnvelope

pub mod desktop;
pub mod dispatcher;
pub mod handlers;
pub mod resolver;

pub use desktop::{Desktop, SystemDesktop};
pub use dispatcher::{ActionDispatcher, DispatchSettings};
pub use resolver::PathResolver;
