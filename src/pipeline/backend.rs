use async_trait::async_trait;
use mdpress_render_core::Rasterizer;
use mdpress_render_lopdf::LopdfRasterizer;
use mdpress_traits::{LoadError, ModuleLoader};
use std::sync::Arc;

/// Loads the default `lopdf` backend on the first export.
#[derive(Debug, Clone, Default)]
pub struct LopdfLoader {
    producer: Option<String>,
}

impl LopdfLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the `/Producer` entry written into every file.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }
}

#[async_trait]
impl ModuleLoader<dyn Rasterizer> for LopdfLoader {
    async fn load(&self) -> Result<Arc<dyn Rasterizer>, LoadError> {
        let mut rasterizer = LopdfRasterizer::new();
        if let Some(producer) = &self.producer {
            rasterizer = rasterizer.with_producer(producer.clone());
        }
        log::debug!("Initialized lopdf rasterizer.");
        Ok(Arc::new(rasterizer))
    }

    fn name(&self) -> &'static str {
        "lopdf"
    }
}
