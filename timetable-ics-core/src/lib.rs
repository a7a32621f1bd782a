//! Timetable ICS Core Library
//!
//! This library turns a weekly class-timetable spreadsheet into an ICS
//! calendar file: it loads the grid, extracts class blocks and writes
//! one event per class per target week.

pub mod config;
pub mod error;
pub mod extractor;
pub mod grid;
pub mod ics;
pub mod pipeline;
pub mod types;
pub mod week;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        config::*, extractor::*, grid::*, ics::*, pipeline::*, types::*, week::*,
    };
}
