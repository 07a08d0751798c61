//! Test doubles for the pluggable collaborators.

use async_trait::async_trait;
use mdpress::{
    ExportRequest, LoadError, MarkdownTransform, ModuleLoader, PdfFile, PulldownTransform, Rasterizer,
    RenderError, TransformError,
};
use mdpress_render_lopdf::LopdfRasterizer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A Markdown transform that holds selected documents until released.
///
/// Inputs without a gate are transformed immediately.
#[derive(Default)]
pub struct GatedTransform {
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    inner: PulldownTransform,
}

impl GatedTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks transforms of `text` until the returned gate is notified.
    pub fn gate(&self, text: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(text.to_string(), notify.clone());
        notify
    }
}

#[async_trait]
impl MarkdownTransform for GatedTransform {
    async fn to_html(&self, markdown: &str) -> Result<String, TransformError> {
        let gate = self.gates.lock().unwrap().get(markdown).cloned();
        if let Some(gate) = gate {
            // notify_one stores a permit, so releasing before we get here is fine.
            gate.notified().await;
        }
        Ok(self.inner.to_html_sync(markdown))
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// A Markdown transform that rejects any input containing `marker`.
pub struct FailingTransform {
    marker: &'static str,
    inner: PulldownTransform,
}

impl FailingTransform {
    pub fn new(marker: &'static str) -> Self {
        Self {
            marker,
            inner: PulldownTransform::default(),
        }
    }
}

#[async_trait]
impl MarkdownTransform for FailingTransform {
    async fn to_html(&self, markdown: &str) -> Result<String, TransformError> {
        if markdown.contains(self.marker) {
            return Err(TransformError::Transform(format!("cannot parse '{}'", self.marker)));
        }
        Ok(self.inner.to_html_sync(markdown))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Wraps a loader and counts how often it is asked to load.
pub struct CountingLoader<T: ?Sized> {
    module: Arc<T>,
    pub loads: AtomicUsize,
}

impl<T: ?Sized> CountingLoader<T> {
    pub fn new(module: Arc<T>) -> Self {
        Self {
            module,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: ?Sized + Send + Sync> ModuleLoader<T> for CountingLoader<T> {
    async fn load(&self) -> Result<Arc<T>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.module))
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// A loader that never succeeds.
pub struct UnavailableLoader;

#[async_trait]
impl<T: ?Sized + Send + Sync> ModuleLoader<T> for UnavailableLoader {
    async fn load(&self) -> Result<Arc<T>, LoadError> {
        Err(LoadError::Unavailable("module failed to download".into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// Fails the first `failures` loads, then hands out the lopdf backend.
pub struct FlakyRasterizerLoader {
    failures: usize,
    attempts: AtomicUsize,
}

impl FlakyRasterizerLoader {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleLoader<dyn Rasterizer> for FlakyRasterizerLoader {
    async fn load(&self) -> Result<Arc<dyn Rasterizer>, LoadError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(LoadError::Failed {
                module: "rasterizer".into(),
                message: format!("attempt {} timed out", attempt + 1),
            });
        }
        Ok(Arc::new(LopdfRasterizer::new()))
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// A backend whose every render fails.
pub struct FailingRasterizer;

#[async_trait]
impl Rasterizer for FailingRasterizer {
    async fn render(&self, _request: &ExportRequest) -> Result<PdfFile, RenderError> {
        Err(RenderError::Pdf("boom".into()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Delegates to lopdf and keeps a copy of every request it receives.
#[derive(Default)]
pub struct RecordingRasterizer {
    requests: Mutex<Vec<ExportRequest>>,
    inner: LopdfRasterizer,
}

impl RecordingRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<ExportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ExportRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Rasterizer for RecordingRasterizer {
    async fn render(&self, request: &ExportRequest) -> Result<PdfFile, RenderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.inner.render(request).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
