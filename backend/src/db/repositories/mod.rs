//! Dataset store implementations.
//!
//! - `local`: in-memory store over the flat files loaded at startup
pub mod local;

pub use local::LocalRepository;
