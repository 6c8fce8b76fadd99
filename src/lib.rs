//! Library crate for customer-manager.
//!
//! This crate exposes the building blocks of the TUI:
//! - REST client, wire types and request dispatcher (`api`)
//! - Application state, operations and the update loop (`app`)
//! - Command-line flags (`cli`)
//! - Error and result types (`error`)
//! - Log file setup (`logging`)
//! - Client-side search (`search`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `customer-manager` binary and by tests.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod cli;
pub mod error;
pub mod logging;
pub mod search;
pub mod ui;

/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
