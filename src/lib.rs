//! Core library for the attendance-report command line application.
//!
//! The library reconciles a meeting roster with a platform poll export and
//! produces a dated attendance spreadsheet. Responsibilities are kept narrow
//! and composable: IO adapters live under [`io`], the column offsets of both
//! inputs under [`schema`], data representations inside [`model`], the
//! matching logic in [`reconcile`], report assembly in [`report`], and the
//! end-to-end orchestration under [`pipeline`].

pub mod error;
pub mod io;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod schema;

pub use error::{ReportError, Result};
