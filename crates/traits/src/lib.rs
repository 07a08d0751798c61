pub mod markdown;
pub mod module;

pub use markdown::{HtmlSanitizer, MarkdownTransform, TransformError};
pub use module::{LazyModule, LoadError, ModuleLoader, ReadyModule};
