//! PDF Directory Library
//!
//! Turns a spreadsheet export into a paginated, print-ready PDF and wraps it
//! in a supplied cover document. This library provides functionality to:
//! - Read a CSV sheet into typed blocks (group headers, table headers, rows)
//! - Paginate blocks into fixed-capacity pages with continuation notes
//! - Render pages to PDF
//! - Merge the result between the pages of an attachment PDF
//!
//! # Example
//!
//! ```no_run
//! use pdf_directory::pipeline::{build_directory, BuildOptions};
//! use std::path::Path;
//!
//! let report = build_directory(
//!     Path::new("directory.csv"),
//!     Path::new("cover.pdf"),
//!     Path::new("directory.pdf"),
//!     &BuildOptions::default(),
//! ).expect("Failed to build directory");
//!
//! println!("{} pages", report.output_pages);
//! ```

pub mod assemble;
pub mod block;
pub mod error;
pub mod paginate;
pub mod pdf;
pub mod pipeline;
pub mod sheet;

// Re-export commonly used items
pub use assemble::{assemble, AssemblyPolicy};
pub use block::{Block, BlockKind, PaginationConfig};
pub use error::{Error, Result};
pub use paginate::{paginate, Page};
