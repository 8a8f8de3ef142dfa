//! Action catalog, per-turn descriptors and typed parameters
//!
//! ActionDescriptor (untyped, from the parser) -> ActionCatalog lookup ->
//! Action (typed) -> handler -> ResultEnvelope

pub mod catalog;
pub mod descriptor;
pub mod params;

pub use catalog::{ActionCatalog, ActionKind, ActionSpec, SideEffectClass};
pub use descriptor::{is_confirmed, ActionDescriptor, Params, ResultEnvelope};
pub use params::Action;
