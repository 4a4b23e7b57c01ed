use crate::{Error, Result, Tool};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the pipeline finds its binaries and how it runs them.
///
/// Loaded from JSON; every field is optional:
///
/// ```json
/// { "xelatex": "/usr/local/texlive/bin/xelatex", "crop_margin": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub xelatex: String,
    pub pdfcrop: String,
    pub pdf2svg: String,
    /// `pdfcrop -margins` value (pt) used for display equations.
    pub crop_margin: f64,
    /// Parent directory for per-render scratch directories. Defaults to the system temp dir.
    pub workdir_root: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            xelatex: "xelatex".to_string(),
            pdfcrop: "pdfcrop".to_string(),
            pdf2svg: "pdf2svg".to_string(),
            crop_margin: 1.0,
            workdir_root: None,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_json_str(&text)
    }

    /// The program name or path configured for `tool`.
    pub fn program(&self, tool: Tool) -> &str {
        match tool {
            Tool::Xelatex => &self.xelatex,
            Tool::Pdfcrop => &self.pdfcrop,
            Tool::Pdf2svg => &self.pdf2svg,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.crop_margin.is_finite() && self.crop_margin >= 0.0) {
            return Err(Error::Config {
                message: format!(
                    "crop_margin must be a non-negative number (got {})",
                    self.crop_margin
                ),
            });
        }
        for tool in Tool::ALL {
            if self.program(tool).trim().is_empty() {
                return Err(Error::Config {
                    message: format!("`{}` must not be empty", tool.name()),
                });
            }
        }
        Ok(())
    }
}
