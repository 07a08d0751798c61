#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use mdpress::{Converter, ConverterBuilder, MemorySink, PdfFile, PdfOptions};
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_file(file: PdfFile) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&file.bytes)?;
        Ok(Self {
            filename: file.filename,
            bytes: file.bytes,
            doc,
        })
    }

    /// Get the number of pages in the PDF
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// A converter with default collaborators that delivers into memory.
pub fn memory_converter(options: PdfOptions) -> Result<(Converter, Arc<MemorySink>), mdpress::ConvertError> {
    let sink = Arc::new(MemorySink::new());
    let converter = ConverterBuilder::new()
        .with_pdf_options(options)
        .with_download_sink(sink.clone())
        .build()?;
    Ok((converter, sink))
}

/// Renders `markdown` with default collaborators, exports it and loads
/// the resulting file.
pub async fn export_markdown(markdown: &str, options: PdfOptions) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    let (converter, sink) = memory_converter(options)?;
    converter.render_now(markdown).await?;
    converter.export_pdf().await?;
    let file = sink.take().pop().ok_or("no file was delivered")?;
    GeneratedPdf::from_file(file)
}
