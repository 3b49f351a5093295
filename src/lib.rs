//! Core library surface for the Library Manager TUI.
//!
//! The binary wires these pieces together; the integration tests drive the
//! store and catalog parsing directly.
pub mod catalog;
pub mod config;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

/// Catalog lookup against Open Library.
pub use catalog::{parse_search_response, CatalogBook, CatalogLookup, OpenLibraryClient};

pub use config::AppConfig;

/// The domain types every layer passes around.
pub use models::{Book, Statistics};

/// Flat-file persistence.
pub use store::{LibraryStore, StoreError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
