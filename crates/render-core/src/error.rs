use mdpress_style::GeometryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to render: the fragment is empty")]
    EmptyFragment,
    #[error("Malformed markup in fragment: {0}")]
    Markup(String),
    #[error("Invalid page geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}
