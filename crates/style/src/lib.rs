//! Page geometry and font primitives shared by the export pipeline.
//!
//! Values in [`Margins`] and [`PageFormat::Custom`] are expressed in the
//! options' [`LengthUnit`]; [`PageGeometry`] is always in PDF points.

pub mod dimension;
pub mod font;
pub mod page;

pub use dimension::{GeometryError, LengthUnit, Margins};
pub use font::{FontFamily, FontStyle, FontWeight, TextStyle};
pub use page::{Orientation, PageFormat, PageGeometry};
