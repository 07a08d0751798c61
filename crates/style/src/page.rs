//! Page formats, orientation and the resolved page box.
use crate::dimension::{GeometryError, LengthUnit, Margins};
use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageFormat {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    /// Width and height in the options' unit.
    Custom { width: f32, height: f32 },
}

impl PageFormat {
    /// Portrait dimensions in points.
    pub fn dimensions_pt(&self, unit: LengthUnit) -> (f32, f32) {
        match self {
            PageFormat::A3 => (841.89, 1190.55),
            PageFormat::A4 => (595.28, 841.89),
            PageFormat::A5 => (419.53, 595.28),
            PageFormat::Letter => (612.0, 792.0),
            PageFormat::Legal => (612.0, 1008.0),
            PageFormat::Custom { width, height } => (unit.to_pt(*width), unit.to_pt(*height)),
        }
    }

    /// Parse a page format name (e.g. "a4", "Letter").
    pub fn parse(s: &str) -> Result<Self, GeometryError> {
        match s.trim().to_lowercase().as_str() {
            "a3" => Ok(PageFormat::A3),
            "a4" => Ok(PageFormat::A4),
            "a5" => Ok(PageFormat::A5),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            other => Err(GeometryError::UnknownFormat(other.to_string())),
        }
    }
}

impl Serialize for PageFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PageFormat::A3 => serializer.serialize_str("a3"),
            PageFormat::A4 => serializer.serialize_str("a4"),
            PageFormat::A5 => serializer.serialize_str("a5"),
            PageFormat::Letter => serializer.serialize_str("letter"),
            PageFormat::Legal => serializer.serialize_str("legal"),
            PageFormat::Custom { width, height } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(width)?;
                seq.serialize_element(height)?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PageFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PageFormatDef {
            Str(String),
            Pair([f32; 2]),
            Map { width: f32, height: f32 },
        }

        match PageFormatDef::deserialize(deserializer)? {
            PageFormatDef::Str(s) => Self::parse(&s).map_err(de::Error::custom),
            PageFormatDef::Pair([width, height]) | PageFormatDef::Map { width, height } => {
                Ok(PageFormat::Custom { width, height })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn parse(s: &str) -> Result<Self, GeometryError> {
        match s.trim().to_lowercase().as_str() {
            "portrait" | "p" => Ok(Orientation::Portrait),
            "landscape" | "l" => Ok(Orientation::Landscape),
            other => Err(GeometryError::UnknownOrientation(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// A fully resolved page box in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    /// Resolves format, orientation and margins into points, rejecting
    /// non-finite or empty page sizes and margins that consume the whole page.
    pub fn resolve(
        format: PageFormat,
        orientation: Orientation,
        margins: Margins,
        unit: LengthUnit,
    ) -> Result<Self, GeometryError> {
        let (w, h) = format.dimensions_pt(unit);
        let (width, height) = match orientation {
            Orientation::Portrait if w > h => (h, w),
            Orientation::Landscape if h > w => (h, w),
            _ => (w, h),
        };
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GeometryError::InvalidPageSize { width, height });
        }
        let margins = margins.to_pt(unit).validate()?;

        if margins.horizontal() >= width || margins.vertical() >= height {
            return Err(GeometryError::NoPrintableArea { width, height });
        }

        Ok(Self { width, height, margins })
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margins.horizontal()
    }

    pub fn content_height(&self) -> f32 {
        self.height - self.margins.vertical()
    }
}
