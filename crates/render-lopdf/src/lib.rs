//! Default PDF backend for mdpress.
//!
//! Lays a sanitized HTML fragment out on fixed-size pages and writes it
//! with the PDF standard 14 fonts, so no font files are needed at runtime.

mod layout;
mod markup;
mod renderer;
mod writer;

pub use layout::{Decoration, Fragment, LayoutSettings, PX_TO_PT, PageLayout, layout_blocks};
pub use markup::{Block, BlockKind, Run, parse_blocks};
pub use renderer::LopdfRasterizer;
pub use writer::{DocumentInfo, encode_win_ansi, write_document};
