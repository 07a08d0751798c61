//! Defines length units and margin insets.
use serde::{de, Deserialize, Deserializer, Serialize};
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors raised while resolving page geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Unknown length unit: '{0}'")]
    UnknownUnit(String),

    #[error("Unknown page format: '{0}'")]
    UnknownFormat(String),

    #[error("Unknown page orientation: '{0}'")]
    UnknownOrientation(String),

    #[error("Invalid margin: {0}")]
    InvalidMargin(String),

    #[error("Invalid page size: {width}x{height}pt")]
    InvalidPageSize { width: f32, height: f32 },

    #[error("Margins leave no printable area on a {width}x{height}pt page")]
    NoPrintableArea { width: f32, height: f32 },
}

/// The unit in which margins and custom page sizes are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Pt,
    Mm,
    Cm,
    #[default]
    In,
    Px,
}

impl LengthUnit {
    /// How many PDF points one unit spans. Pixels are CSS pixels (96 per inch).
    pub fn points_per_unit(self) -> f32 {
        match self {
            LengthUnit::Pt => 1.0,
            LengthUnit::Mm => 72.0 / 25.4,
            LengthUnit::Cm => 72.0 / 2.54,
            LengthUnit::In => 72.0,
            LengthUnit::Px => 0.75,
        }
    }

    pub fn to_pt(self, value: f32) -> f32 {
        value * self.points_per_unit()
    }

    pub fn parse(s: &str) -> Result<Self, GeometryError> {
        match s.trim().to_lowercase().as_str() {
            "pt" => Ok(LengthUnit::Pt),
            "mm" => Ok(LengthUnit::Mm),
            "cm" => Ok(LengthUnit::Cm),
            "in" => Ok(LengthUnit::In),
            "px" => Ok(LengthUnit::Px),
            other => Err(GeometryError::UnknownUnit(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for LengthUnit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Per-side insets. The unit is carried separately (see [`LengthUnit`]).
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Hash for Margins {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.top.to_bits().hash(state);
        self.right.to_bits().hash(state);
        self.bottom.to_bits().hash(state);
        self.left.to_bits().hash(state);
    }
}

impl Eq for Margins {}

impl Margins {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Builds margins from the array forms accepted by the export options:
    /// `[all]`, `[vertical, horizontal]` or `[top, left, bottom, right]`.
    pub fn from_slice(values: &[f32]) -> Result<Self, GeometryError> {
        let margins = match values {
            [all] => Margins::all(*all),
            [vertical, horizontal] => Margins {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            },
            [top, left, bottom, right] => Margins {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            },
            _ => {
                return Err(GeometryError::InvalidMargin(format!(
                    "expected 1, 2, or 4 values, got {}",
                    values.len()
                )));
            }
        };
        margins.validate()
    }

    /// Parses a whitespace-separated shorthand of 1, 2 or 4 unit-less
    /// numbers, e.g. `"0.5 1"`. Values are read in the same order as
    /// [`from_slice`](Self::from_slice).
    pub fn parse_shorthand(input: &str) -> Result<Self, GeometryError> {
        let values = input
            .split_whitespace()
            .map(|part| {
                part.parse::<f32>()
                    .map_err(|e| GeometryError::InvalidMargin(format!("'{}': {}", part, e)))
            })
            .collect::<Result<Vec<f32>, _>>()?;
        Self::from_slice(&values)
    }

    /// Converts every side from `unit` into points.
    pub fn to_pt(self, unit: LengthUnit) -> Margins {
        Margins {
            top: unit.to_pt(self.top),
            right: unit.to_pt(self.right),
            bottom: unit.to_pt(self.bottom),
            left: unit.to_pt(self.left),
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Rejects sides that are negative or not finite.
    pub fn validate(self) -> Result<Self, GeometryError> {
        let sides = [self.top, self.right, self.bottom, self.left];
        if sides.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(GeometryError::InvalidMargin(format!(
                "sides must be finite and non-negative, got {:?}",
                sides
            )));
        }
        Ok(self)
    }
}

impl<'de> Deserialize<'de> for Margins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MarginsVisitor;
        impl<'de> de::Visitor<'de> for MarginsVisitor {
            type Value = Margins;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number, an array of 1, 2 or 4 numbers, a string, or a map")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Margins::from_slice(&[value as f32]).map_err(E::custom)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                self.visit_f64(value as f64)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                self.visit_f64(value as f64)
            }

            fn visit_str<E>(self, value: &str) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Margins::parse_shorthand(value).map_err(E::custom)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Margins, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<f32>()? {
                    values.push(value);
                }
                Margins::from_slice(&values).map_err(de::Error::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Margins, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut margins = Margins::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "top" => margins.top = map.next_value()?,
                        "right" => margins.right = map.next_value()?,
                        "bottom" => margins.bottom = map.next_value()?,
                        "left" => margins.left = map.next_value()?,
                        _ => {
                            let _ = map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }
                margins.validate().map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_any(MarginsVisitor)
    }
}
