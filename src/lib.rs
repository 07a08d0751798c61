//! Markdown to PDF conversion.
//!
//! The user's Markdown is rendered to a sanitized HTML preview as it is
//! edited, and the last applied preview can be exported as a paginated PDF
//! named after the document's first heading.

pub mod error;
pub mod filename;
pub mod markdown;
pub mod pipeline;

pub use error::{ConvertError, ExportError};
pub use filename::{DEFAULT_FILENAME, MAX_FILENAME_LEN, derive_filename, display_filename};
pub use markdown::{
    AmmoniaSanitizer, DEFAULT_SAMPLE_DOCUMENT, MarkdownOptions, MarkdownRenderer, PulldownLoader,
    PulldownTransform, SanitizedHtml,
};
pub use pipeline::{
    Converter, ConverterBuilder, ConverterConfig, DirectorySink, DownloadSink, LopdfLoader, MemorySink,
    RenderHandle, RenderOutcome, RenderState, SavedPdf,
};

// Collaborator traits and value types, so embedders need only this crate.
pub use mdpress_render_core::{ExportRequest, HtmlFragment, PdfFile, PdfOptions, Rasterizer, RenderError};
pub use mdpress_style::{LengthUnit, Margins, Orientation, PageFormat};
pub use mdpress_traits::{HtmlSanitizer, LoadError, MarkdownTransform, ModuleLoader, ReadyModule, TransformError};
