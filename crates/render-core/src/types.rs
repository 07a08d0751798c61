use crate::error::RenderError;
use crate::utils::ensure_pdf_extension;
use mdpress_style::{LengthUnit, Margins, Orientation, PageFormat, PageGeometry};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RASTER_SCALE: f32 = 2.0;

/// A detached HTML fragment: a single container element built off the
/// visible page and used only as layout input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFragment {
    class: String,
    inner_html: String,
}

impl HtmlFragment {
    /// Wraps already-sanitized markup in a `<div>` carrying `class`.
    pub fn container(class: impl Into<String>, inner_html: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            inner_html: inner_html.into(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn is_empty(&self) -> bool {
        self.inner_html.trim().is_empty()
    }

    /// The fragment serialized as a single element.
    pub fn to_html(&self) -> String {
        format!("<div class=\"{}\">{}</div>", self.class, self.inner_html)
    }
}

/// Layout options understood by PDF backends.
///
/// `margin` and custom `page_format` sizes are expressed in `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfOptions {
    pub margin: Margins,
    pub filename: String,
    /// Pixel density multiplier; positions are snapped to a grid of
    /// `1 / raster_scale` CSS pixels.
    pub raster_scale: f32,
    pub page_format: PageFormat,
    #[serde(alias = "orientation")]
    pub page_orientation: Orientation,
    pub unit: LengthUnit,
    pub enable_links: bool,
    pub title: Option<String>,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            margin: Margins::all(0.5),
            filename: "document.pdf".to_string(),
            raster_scale: DEFAULT_RASTER_SCALE,
            page_format: PageFormat::A4,
            page_orientation: Orientation::Portrait,
            unit: LengthUnit::In,
            enable_links: true,
            title: None,
        }
    }
}

impl PdfOptions {
    pub fn geometry(&self) -> Result<PageGeometry, RenderError> {
        Ok(PageGeometry::resolve(
            self.page_format,
            self.page_orientation,
            self.margin,
            self.unit,
        )?)
    }

    /// Checks every option without rendering anything.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.raster_scale.is_finite() || self.raster_scale <= 0.0 {
            return Err(RenderError::InvalidOption(format!(
                "rasterScale must be a positive number, got {}",
                self.raster_scale
            )));
        }
        self.geometry().map(|_| ())
    }

    /// Parses options from a JSON object; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The output filename with a `.pdf` extension.
    pub fn output_filename(&self) -> String {
        ensure_pdf_extension(&self.filename)
    }
}

/// Everything a backend needs for one export. Built at export time and
/// dropped once the backend has consumed it.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub fragment: HtmlFragment,
    pub filename: String,
    pub options: PdfOptions,
}

impl ExportRequest {
    /// Creates a request; `options.filename` is overwritten with `filename`
    /// so backends see a single output name.
    pub fn new(fragment: HtmlFragment, filename: impl Into<String>, mut options: PdfOptions) -> Self {
        let filename = filename.into();
        options.filename = ensure_pdf_extension(&filename);
        Self {
            fragment,
            filename,
            options,
        }
    }
}

/// A rendered PDF ready to be handed to the host's file-save mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}
