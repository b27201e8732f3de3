//! Dataset store for the chart history.
//!
//! The store follows the repository pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Bindings / HTTP handlers                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │ DatasetSnapshot (explicit context)
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  ChartRepository trait (repository/mod.rs)              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  LocalRepository: immutable base + playlist overlay     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │ loaded once at startup
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  DatasetLoader: chart CSV, genre CSV, boundary, overview│
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Use [`RepositoryFactory::from_settings`] to build the store from the
//! `[data]` configuration section.

pub mod checksum;
pub mod factory;
pub mod loader;
pub mod repositories;
pub mod repository;

pub use checksum::{calculate_checksum, checksum_parts};
pub use factory::RepositoryFactory;
pub use loader::DatasetLoader;
pub use repositories::LocalRepository;
pub use repository::{
    ChartRepository, DatasetSnapshot, DatasetSummary, ErrorContext, RepositoryError,
    RepositoryResult,
};
