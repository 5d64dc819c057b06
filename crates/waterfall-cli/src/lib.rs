//! # waterfall-cli
//!
//! The `waterfall` binary: render task CSV files to Gantt charts from the
//! command line, or run the upload/download/chart HTTP service.

pub mod config;
pub mod server;
pub mod store;

pub use config::ServiceConfig;
pub use server::{router, serve, AppState};
pub use store::{FileStore, StoreError};
