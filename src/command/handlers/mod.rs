//! One handler per action, grouped by side-effect class.
//!
//! Handlers return `HandlerResult`; the dispatcher folds both arms into a
//! `ResultEnvelope`.

pub mod browser;
pub mod capture;
pub mod filesystem;
pub mod process;
pub mod shell;
pub mod system;
