use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_FONT_FAMILY: &str = "Helvetica Neue";
pub const DEFAULT_FONT_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// A single-line equation that sits inside a paragraph.
    #[default]
    Inline,
    /// A standalone block, possibly spanning several `\\`-separated lines.
    Display,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Display => "display",
        }
    }

    /// Class placed on the root `<svg>` of an extracted result.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Inline => "svgmath-inline",
            Self::Display => "svgmath-display",
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "mode-inline" => Ok(Self::Inline),
            "display" | "block" | "mode-display" => Ok(Self::Display),
            _ => Err(Error::UnknownMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Everything needed to synthesize one typesettable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub equation: String,
    pub mode: DisplayMode,
    pub font_family: String,
    /// Document class font size in points.
    pub font_size: u32,
    /// Extra preamble lines, inserted verbatim after the package list.
    pub preamble: Vec<String>,
}

impl RenderRequest {
    pub fn new(equation: impl Into<String>, mode: DisplayMode) -> Self {
        Self {
            equation: equation.into(),
            mode,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            preamble: Vec::new(),
        }
    }

    pub fn inline(equation: impl Into<String>) -> Self {
        Self::new(equation, DisplayMode::Inline)
    }

    pub fn display(equation: impl Into<String>) -> Self {
        Self::new(equation, DisplayMode::Display)
    }

    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_preamble<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preamble = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preamble_line(mut self, line: impl Into<String>) -> Self {
        self.preamble.push(line.into());
        self
    }
}
