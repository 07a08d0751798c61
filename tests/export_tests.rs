mod common;

use common::fakes::{FailingRasterizer, FlakyRasterizerLoader, GatedTransform, RecordingRasterizer};
use common::fixtures::kitchen_sink;
use common::{GeneratedPdf, TestResult, init_logging, memory_converter};
use mdpress::{
    ConvertError, ConverterBuilder, ExportError, MarkdownTransform, MemorySink, ModuleLoader, PdfOptions,
    Rasterizer, ReadyModule, RenderError, RenderState,
};
use std::sync::Arc;

fn ready_rasterizer(rasterizer: Arc<dyn Rasterizer>) -> Arc<dyn ModuleLoader<dyn Rasterizer>> {
    Arc::new(ReadyModule::new(rasterizer))
}

#[tokio::test]
async fn exports_the_preview_into_the_sink() -> TestResult {
    init_logging();
    let (converter, sink) = memory_converter(PdfOptions::default())?;
    converter.render_now(kitchen_sink()).await?;

    assert!(!converter.is_rasterizer_loaded());
    let saved = converter.export_pdf().await?;
    assert!(converter.is_rasterizer_loaded());

    assert_eq!(saved.filename, "kitchen-sink.pdf");
    assert_eq!(saved.path, None);
    assert_eq!(sink.len(), 1);

    let pdf = GeneratedPdf::from_file(sink.take().remove(0))?;
    assert_eq!(pdf.filename, "kitchen-sink.pdf");
    assert_eq!(pdf.bytes.len(), saved.size);
    assert_pdf_min_pages!(pdf, 1);
    assert_pdf_contains_text!(pdf, "Kitchen Sink");
    assert_pdf_contains_text!(pdf, "Closing words.");
    Ok(())
}

#[tokio::test]
async fn empty_document_cannot_be_exported() -> TestResult {
    init_logging();
    let (converter, sink) = memory_converter(PdfOptions::default())?;

    converter.render_now("").await?;
    let err = converter.export_pdf().await.unwrap_err();
    assert!(matches!(err, ConvertError::Export(ExportError::EmptyFragment)), "{:?}", err);

    converter.render_now("   \n\t\n").await?;
    assert!(matches!(
        converter.export_pdf().await,
        Err(ConvertError::Export(ExportError::EmptyFragment))
    ));
    assert!(sink.is_empty());
    assert!(!converter.is_rasterizer_loaded());
    assert_eq!(converter.surfaces().total_attached(), 0);

    // The session is still usable afterwards.
    converter.render_now("# Back Again").await?;
    let saved = converter.export_pdf().await?;
    assert_eq!(saved.filename, "back-again.pdf");
    Ok(())
}

#[tokio::test]
async fn nothing_rendered_yet_is_an_empty_export() -> TestResult {
    let (converter, sink) = memory_converter(PdfOptions::default())?;
    assert_eq!(converter.render_state(), RenderState::Dirty);
    assert!(matches!(
        converter.export_pdf().await,
        Err(ConvertError::Export(ExportError::EmptyFragment))
    ));
    assert!(sink.is_empty());
    Ok(())
}

#[tokio::test]
async fn backend_failure_is_reported_and_surface_released() -> TestResult {
    init_logging();
    let sink = Arc::new(MemorySink::new());
    let converter = ConverterBuilder::new()
        .with_rasterizer_loader(ready_rasterizer(Arc::new(FailingRasterizer)))
        .with_download_sink(sink.clone())
        .build()?;
    converter.render_now("# Doomed").await?;

    let err = converter.export_pdf().await.unwrap_err();
    match err {
        ConvertError::Export(ExportError::Backend(RenderError::Pdf(msg))) => assert_eq!(msg, "boom"),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(sink.is_empty());
    assert_eq!(converter.surfaces().attached(), 0);
    assert_eq!(converter.surfaces().total_attached(), 1);

    // Rendering keeps working after a failed export.
    converter.render_now("# Still Here").await?;
    assert!(converter.rendered_html().as_str().contains("Still Here"));
    Ok(())
}

#[tokio::test]
async fn backend_load_failure_is_retried_on_next_export() -> TestResult {
    init_logging();
    let loader = Arc::new(FlakyRasterizerLoader::new(1));
    let sink = Arc::new(MemorySink::new());
    let converter = ConverterBuilder::new()
        .with_rasterizer_loader(loader.clone())
        .with_download_sink(sink.clone())
        .build()?;
    converter.render_now("# Retry Me").await?;

    let err = converter.export_pdf().await.unwrap_err();
    assert!(
        matches!(err, ConvertError::Export(ExportError::BackendUnavailable(_))),
        "{:?}",
        err
    );
    assert!(!converter.is_rasterizer_loaded());
    assert_eq!(converter.surfaces().total_attached(), 0);

    converter.export_pdf().await?;
    converter.export_pdf().await?;
    assert_eq!(loader.attempts(), 2);
    assert_eq!(converter.rasterizer_load_attempts(), 2);
    assert_eq!(sink.len(), 2);
    Ok(())
}

#[tokio::test]
async fn every_export_attaches_and_releases_a_surface() -> TestResult {
    let (converter, _sink) = memory_converter(PdfOptions::default())?;
    converter.render_now("# Surfaces").await?;

    for _ in 0..3 {
        converter.export_pdf().await?;
        assert_eq!(converter.surfaces().attached(), 0);
    }
    assert_eq!(converter.surfaces().total_attached(), 3);
    Ok(())
}

#[tokio::test]
async fn backend_sees_a_sanitized_container() -> TestResult {
    let recorder = Arc::new(RecordingRasterizer::new());
    let converter = ConverterBuilder::new()
        .with_rasterizer_loader(ready_rasterizer(recorder.clone()))
        .with_download_sink(Arc::new(MemorySink::new()))
        .build()?;
    converter
        .render_now("# Clean\n\n<script>alert(1)</script>\n\ntext")
        .await?;
    converter.export_pdf().await?;

    let request = recorder.last_request().ok_or("backend was never called")?;
    assert_eq!(request.fragment.class(), "markdown-body");
    assert!(request.fragment.to_html().starts_with("<div class=\"markdown-body\">"));
    assert!(!request.fragment.inner_html().contains("script"));
    assert!(request.fragment.inner_html().contains("<h1>Clean</h1>"));
    assert_eq!(request.filename, "clean");
    assert_eq!(request.options.filename, "clean.pdf");
    Ok(())
}

#[tokio::test]
async fn export_while_dirty_uses_last_preview_and_live_filename() -> TestResult {
    init_logging();
    let transform = Arc::new(GatedTransform::new());
    let module: Arc<dyn MarkdownTransform> = transform.clone();
    let recorder = Arc::new(RecordingRasterizer::new());
    let sink = Arc::new(MemorySink::new());
    let converter = ConverterBuilder::new()
        .with_transform_loader(Arc::new(ReadyModule::new(module)))
        .with_rasterizer_loader(ready_rasterizer(recorder.clone()))
        .with_download_sink(sink.clone())
        .build()?;

    converter.render_now("# First Draft\n\nold body").await?;
    let gate = transform.gate("# Second Draft\n\nnew body");
    let pending = converter.set_document("# Second Draft\n\nnew body");
    assert_eq!(converter.render_state(), RenderState::Dirty);

    let saved = converter.export_pdf().await?;
    assert_eq!(saved.filename, "second-draft.pdf");
    let request = recorder.last_request().ok_or("backend was never called")?;
    assert!(request.fragment.inner_html().contains("old body"));
    assert!(!request.fragment.inner_html().contains("new body"));

    gate.notify_one();
    pending.wait().await?;
    converter.export_pdf().await?;
    let request = recorder.last_request().ok_or("backend was never called")?;
    assert!(request.fragment.inner_html().contains("new body"));
    assert_eq!(recorder.requests().len(), 2);
    assert_eq!(sink.len(), 2);
    Ok(())
}

#[tokio::test]
async fn output_dir_receives_the_file() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("exports");
    let converter = ConverterBuilder::new().with_output_dir(&out).build()?;
    converter.render_now("# Quarterly Numbers\n\n| a | b |\n|---|---|\n| 1 | 2 |").await?;

    let saved = converter.export_pdf().await?;
    let path = saved.path.ok_or("directory sink should report a path")?;
    assert_eq!(path, out.join("quarterly-numbers.pdf"));

    let bytes = std::fs::read(&path)?;
    assert_eq!(bytes.len(), saved.size);
    assert!(bytes.starts_with(b"%PDF-"));

    // A second export of the same document replaces the file.
    converter.export_pdf().await?;
    assert_eq!(std::fs::read_dir(&out)?.count(), 1);
    Ok(())
}

#[tokio::test]
async fn download_sink_takes_precedence_over_output_dir() -> TestResult {
    let dir = tempfile::tempdir()?;
    let sink = Arc::new(MemorySink::new());
    let converter = ConverterBuilder::new()
        .with_output_dir(dir.path())
        .with_download_sink(sink.clone())
        .build()?;
    converter.render_now("# Where").await?;
    converter.export_pdf().await?;

    assert_eq!(sink.len(), 1);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}
