//! # Top-50 Dashboard Backend
//!
//! Analytics over daily Spotify Top-50 charts, served as a multi-page
//! reactive dashboard.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Chart rows, audio features and the genre-space reference data
//! - [`db`]: Dataset loading and the process-wide dataset store
//! - [`services`]: Pure filter and aggregation recipes
//! - [`charts`]: Declarative figure model and per-page chart builders
//! - [`playlist`]: External playlist resolution
//! - [`bindings`]: Control events, output bindings and per-page handlers
//! - [`routes`]: Page registry, navigation shell and page layouts
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod bindings;
pub mod charts;
pub mod config;
pub mod db;
pub mod models;
pub mod playlist;
pub mod routes;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
