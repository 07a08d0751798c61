//! Conversion pipeline orchestration.
//!
//! - [`ConverterBuilder`]: fluent builder wiring the collaborators together
//! - [`Converter`]: session state, versioned preview renders and PDF export
//! - [`DownloadSink`]: where finished files are delivered
//!
//! # Example
//!
//! ```ignore
//! use mdpress::ConverterBuilder;
//!
//! let converter = ConverterBuilder::new().with_output_dir("out").build()?;
//! converter.render_now("# Quarterly Report\n\nNumbers go here.").await?;
//! let saved = converter.export_pdf().await?; // out/quarterly-report.pdf
//! ```

mod backend;
mod builder;
pub mod config;
pub mod download;
mod orchestrator;
pub mod surface;

pub use backend::LopdfLoader;
pub use builder::ConverterBuilder;
pub use config::{ConverterConfig, EXPORT_CONTAINER_CLASS, RenderState};
pub use download::{DirectorySink, DownloadSink, MemorySink, SavedPdf};
pub use orchestrator::{Converter, RenderHandle, RenderOutcome};
pub use surface::{OffscreenSurface, SurfaceHost};
