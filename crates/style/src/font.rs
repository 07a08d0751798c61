//! Font selection over the PDF standard 14 fonts.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Mono,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// The resolved font of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextStyle {
    pub family: FontFamily,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl TextStyle {
    pub const ALL: [TextStyle; 8] = {
        use FontFamily::*;
        use FontStyle::*;
        use FontWeight::*;
        [
            TextStyle { family: Sans, weight: Regular, style: Normal },
            TextStyle { family: Sans, weight: Bold, style: Normal },
            TextStyle { family: Sans, weight: Regular, style: Italic },
            TextStyle { family: Sans, weight: Bold, style: Italic },
            TextStyle { family: Mono, weight: Regular, style: Normal },
            TextStyle { family: Mono, weight: Bold, style: Normal },
            TextStyle { family: Mono, weight: Regular, style: Italic },
            TextStyle { family: Mono, weight: Bold, style: Italic },
        ]
    };

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }

    pub fn mono(mut self) -> Self {
        self.family = FontFamily::Mono;
        self
    }

    /// Base font name with style suffix, e.g. `Helvetica-BoldOblique`.
    pub fn postscript_name(&self) -> String {
        let mut name = match self.family {
            FontFamily::Sans => "Helvetica",
            FontFamily::Mono => "Courier",
        }
        .to_string();
        let bold = self.weight == FontWeight::Bold;
        let italic = self.style == FontStyle::Italic;
        if bold || italic {
            name.push('-');
            if bold {
                name.push_str("Bold");
            }
            if italic {
                name.push_str("Oblique");
            }
        }
        name
    }

    /// Resource name used inside page content streams (`F1`..`F8`).
    pub fn resource_name(&self) -> String {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        format!("F{}", index + 1)
    }

    /// Approximate advance width of one character, in ems.
    pub fn average_advance(&self) -> f32 {
        match (self.family, self.weight) {
            (FontFamily::Mono, _) => 0.6,
            (FontFamily::Sans, FontWeight::Bold) => 0.58,
            (FontFamily::Sans, FontWeight::Regular) => 0.53,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postscript_names() {
        assert_eq!(TextStyle::default().postscript_name(), "Helvetica");
        assert_eq!(TextStyle::default().bold().italic().postscript_name(), "Helvetica-BoldOblique");
        assert_eq!(TextStyle::default().mono().italic().postscript_name(), "Courier-Oblique");
    }

    #[test]
    fn resource_names_are_stable() {
        assert_eq!(TextStyle::default().resource_name(), "F1");
        assert_eq!(TextStyle::default().mono().bold().resource_name(), "F6");
    }
}
