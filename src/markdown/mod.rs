//! Markdown to sanitized HTML.
//!
//! [`MarkdownRenderer`] pairs a lazily loaded [`MarkdownTransform`] with an
//! [`HtmlSanitizer`]. Everything it hands out is a [`SanitizedHtml`], which
//! can only be built on that path.

mod pulldown;
mod sanitize;

pub use pulldown::{MarkdownOptions, PulldownLoader, PulldownTransform};
pub use sanitize::AmmoniaSanitizer;

use crate::error::ConvertError;
use mdpress_traits::{HtmlSanitizer, LazyModule, MarkdownTransform, ModuleLoader};
use std::fmt;
use std::sync::Arc;

/// The document a new session starts with.
pub const DEFAULT_SAMPLE_DOCUMENT: &str = "# My Awesome Document\n\nWelcome to the **Markdown to PDF** converter!\n\n## Features\n- Live preview\n- Easy editing\n- Beautiful PDFs\n\nStart typing your markdown here...";

/// HTML that has been through an [`HtmlSanitizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub(crate) fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when there is nothing but whitespace to show.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct MarkdownRenderer {
    transform: LazyModule<dyn MarkdownTransform>,
    sanitizer: Arc<dyn HtmlSanitizer>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(Arc::new(PulldownLoader::default()), Arc::new(AmmoniaSanitizer))
    }
}

impl MarkdownRenderer {
    pub fn new(
        loader: Arc<dyn ModuleLoader<dyn MarkdownTransform>>,
        sanitizer: Arc<dyn HtmlSanitizer>,
    ) -> Self {
        Self {
            transform: LazyModule::new(loader),
            sanitizer,
        }
    }

    /// Renders and sanitizes `markdown`, reporting the first stage that failed.
    pub async fn try_render(&self, markdown: &str) -> Result<SanitizedHtml, ConvertError> {
        let transform = self.transform.get().await?;
        let raw = transform.to_html(markdown).await?;
        let clean = self.sanitizer.sanitize(&raw)?;
        Ok(SanitizedHtml::new(clean))
    }

    /// Like [`try_render`](Self::try_render) but never fails: any error is
    /// logged and yields an empty preview.
    pub async fn render(&self, markdown: &str) -> SanitizedHtml {
        match self.try_render(markdown).await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Markdown render failed, preview left empty: {}", e);
                SanitizedHtml::default()
            }
        }
    }

    pub fn is_transform_loaded(&self) -> bool {
        self.transform.is_loaded()
    }

    pub fn transform_load_attempts(&self) -> usize {
        self.transform.load_attempts()
    }

    pub fn sanitizer_name(&self) -> &'static str {
        self.sanitizer.name()
    }
}

impl fmt::Debug for MarkdownRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownRenderer")
            .field("transform", &self.transform)
            .field("sanitizer", &self.sanitizer.name())
            .finish()
    }
}
