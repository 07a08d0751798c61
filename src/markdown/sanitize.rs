use ammonia::Builder;
use mdpress_traits::{HtmlSanitizer, TransformError};

/// HTML sanitizer backed by `ammonia`.
///
/// Uses ammonia's default allow-list, which drops `<script>`, event handler
/// attributes and `javascript:` URLs and marks links `noopener noreferrer`.
/// On top of that it keeps `class` on `<code>` for language hints and the
/// disabled checkboxes that task lists render to.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaSanitizer;

impl AmmoniaSanitizer {
    fn builder(&self) -> Builder<'static> {
        let mut builder = Builder::default();
        builder
            .add_tags(&["input"])
            .add_tag_attributes("code", &["class"])
            .add_tag_attributes("input", &["type", "checked", "disabled"]);
        builder
    }
}

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, TransformError> {
        Ok(self.builder().clean(html).to_string())
    }

    fn name(&self) -> &'static str {
        "ammonia"
    }
}
