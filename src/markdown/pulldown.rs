use async_trait::async_trait;
use mdpress_traits::{LoadError, MarkdownTransform, ModuleLoader, TransformError};
use pulldown_cmark::{Options, Parser, html};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Markdown extensions enabled on top of CommonMark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub footnotes: bool,
    pub task_lists: bool,
    pub smart_punctuation: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            footnotes: true,
            task_lists: true,
            smart_punctuation: false,
        }
    }
}

impl MarkdownOptions {
    pub fn to_pulldown(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_TASKLISTS, self.task_lists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        options
    }
}

/// CommonMark transform backed by `pulldown-cmark`. Output is raw HTML and
/// must be sanitized before display.
#[derive(Debug, Clone, Default)]
pub struct PulldownTransform {
    options: MarkdownOptions,
}

impl PulldownTransform {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    pub fn to_html_sync(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options.to_pulldown());
        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, parser);
        html_output
    }
}

#[async_trait]
impl MarkdownTransform for PulldownTransform {
    async fn to_html(&self, markdown: &str) -> Result<String, TransformError> {
        Ok(self.to_html_sync(markdown))
    }

    fn name(&self) -> &'static str {
        "pulldown-cmark"
    }
}

/// Builds a [`PulldownTransform`] the first time the preview needs one.
#[derive(Debug, Clone, Default)]
pub struct PulldownLoader {
    options: MarkdownOptions,
}

impl PulldownLoader {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ModuleLoader<dyn MarkdownTransform> for PulldownLoader {
    async fn load(&self) -> Result<Arc<dyn MarkdownTransform>, LoadError> {
        log::debug!("Initializing pulldown-cmark transform: {:?}", self.options);
        Ok(Arc::new(PulldownTransform::new(self.options.clone())))
    }

    fn name(&self) -> &'static str {
        "pulldown-cmark"
    }
}
