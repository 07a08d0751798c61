//! Core export abstractions for PDF generation.
//!
//! This crate provides the types that cross the boundary between the
//! conversion orchestrator and a PDF backend:
//! - `Rasterizer` trait implemented by backends
//! - `ExportRequest`, `HtmlFragment`, `PdfOptions` and `PdfFile` value types
//! - Error types for rendering operations

mod error;
mod traits;
mod types;
pub mod utils;

pub use error::RenderError;
pub use traits::Rasterizer;
pub use types::{ExportRequest, HtmlFragment, PdfFile, PdfOptions, DEFAULT_RASTER_SCALE};
