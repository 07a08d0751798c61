//! ModuleLoader trait and the once-per-session module cache.
//!
//! The Markdown transform and the PDF backend are loaded lazily: nothing is
//! constructed until the first render or export asks for it, and a module
//! that loaded successfully is reused for the rest of the session.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::OnceCell;

/// Error type for module loading operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Module not available: {0}")]
    Unavailable(String),

    #[error("Failed to load module '{module}': {message}")]
    Failed { module: String, message: String },
}

/// A trait for asynchronously producing a collaborator.
///
/// This abstraction allows the pipeline to work with collaborators that are:
/// - Constructed in-process on first use
/// - Pre-built and injected (see [`ReadyModule`])
/// - Substituted by fakes in tests
///
/// # Example
///
/// ```ignore
/// let loader: Arc<dyn ModuleLoader<dyn MarkdownTransform>> =
///     Arc::new(ReadyModule::new(Arc::new(PulldownTransform::default()) as Arc<dyn MarkdownTransform>));
/// let transform = LazyModule::new(loader).get().await?;
/// ```
#[async_trait]
pub trait ModuleLoader<T: ?Sized + Send + Sync>: Send + Sync {
    /// Load the module. Called at most once per successful load.
    async fn load(&self) -> Result<Arc<T>, LoadError>;

    /// Returns a human-readable name for this loader (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A loader that hands out a module that already exists.
pub struct ReadyModule<T: ?Sized> {
    module: Arc<T>,
    name: &'static str,
}

impl<T: ?Sized> ReadyModule<T> {
    pub fn new(module: Arc<T>) -> Self {
        Self {
            module,
            name: "ready",
        }
    }

    pub fn named(module: Arc<T>, name: &'static str) -> Self {
        Self { module, name }
    }
}

#[async_trait]
impl<T: ?Sized + Send + Sync> ModuleLoader<T> for ReadyModule<T> {
    async fn load(&self) -> Result<Arc<T>, LoadError> {
        Ok(Arc::clone(&self.module))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Session-lifetime cache around a [`ModuleLoader`].
///
/// Concurrent callers share one in-flight load. A failed load is not cached,
/// so the next caller retries; a successful one is kept with no eviction.
pub struct LazyModule<T: ?Sized + Send + Sync> {
    loader: Arc<dyn ModuleLoader<T>>,
    cell: OnceCell<Arc<T>>,
    attempts: AtomicUsize,
}

impl<T: ?Sized + Send + Sync> LazyModule<T> {
    pub fn new(loader: Arc<dyn ModuleLoader<T>>) -> Self {
        Self {
            loader,
            cell: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Returns the cached module, loading it first if needed.
    pub async fn get(&self) -> Result<Arc<T>, LoadError> {
        let module = self
            .cell
            .get_or_try_init(|| async {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                log::debug!("Loading module via '{}' loader.", self.loader.name());
                self.loader.load().await.inspect_err(|e| {
                    log::warn!("Module loader '{}' failed: {}", self.loader.name(), e);
                })
            })
            .await?;
        Ok(Arc::clone(module))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// How many times the underlying loader has been invoked.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn loader_name(&self) -> &'static str {
        self.loader.name()
    }
}

impl<T: ?Sized + Send + Sync> fmt::Debug for LazyModule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyModule")
            .field("loader", &self.loader.name())
            .field("loaded", &self.is_loaded())
            .field("attempts", &self.load_attempts())
            .finish()
    }
}
