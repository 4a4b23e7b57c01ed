//! Marker geometry: x-height, baselines and the root inline style.

use crate::svgdom::fmt_number;
use crate::{DisplayMode, GeometryError};
use serde::{Deserialize, Serialize};

/// Empirical correction applied to display-mode margins so the cropped frame carries the same
/// visual weight as the surrounding text. Changing it changes every display output.
pub const DISPLAY_CROP_FACTOR: f64 = 0.666;

/// One `\markers` invocation as seen in the SVG: the dot on the baseline and the dot raised by
/// `1ex`, both as device `y` coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLine {
    pub baseline: f64,
    pub raised: f64,
}

impl MarkerLine {
    /// Device height of `1ex` measured on this line.
    pub fn delta(&self) -> f64 {
        self.baseline - self.raised
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Device units per `ex`.
    pub x_height: f64,
    /// One entry per text line, in `ex` from the top of the frame.
    pub baselines: Vec<f64>,
}

/// Pairs marker `y` positions consecutively, in the order the document lists them.
pub fn pair_markers(ys: &[f64]) -> Result<Vec<MarkerLine>, GeometryError> {
    if ys.is_empty() {
        return Err(GeometryError::NoMarkers);
    }
    if ys.len() % 2 != 0 {
        return Err(GeometryError::OddMarkerCount { count: ys.len() });
    }
    Ok(ys
        .chunks_exact(2)
        .map(|pair| MarkerLine {
            baseline: pair[0],
            raised: pair[1],
        })
        .collect())
}

/// `2 × Σdelta / marker_count`, i.e. the mean per-line delta.
///
/// Every line is weighted equally; there is no outlier rejection.
pub fn estimate_x_height(lines: &[MarkerLine]) -> f64 {
    let sum: f64 = lines.iter().map(MarkerLine::delta).sum();
    let markers = (lines.len() * 2) as f64;
    sum * 2.0 / markers
}

pub fn measure(
    lines: &[MarkerLine],
    mode: DisplayMode,
    x_height_override: Option<f64>,
) -> Result<Metrics, GeometryError> {
    let x_height = x_height_override.unwrap_or_else(|| estimate_x_height(lines));
    if !(x_height.is_finite() && x_height > 0.0) {
        return Err(GeometryError::InvalidXHeight { x_height });
    }

    let raw: Vec<f64> = match mode {
        // The trailing `\markers` of an inline equation sits on the same line; only the leading
        // pair defines the baseline.
        DisplayMode::Inline => lines.iter().take(1).map(|l| l.baseline).collect(),
        DisplayMode::Display => lines.iter().map(|l| l.baseline).collect(),
    };

    Ok(Metrics {
        x_height,
        baselines: raw.into_iter().map(|b| b / x_height).collect(),
    })
}

/// Inline CSS for the root `<svg>` so it composes with the surrounding text baseline.
///
/// `height` is the frame height in `ex`.
pub fn root_style(mode: DisplayMode, metrics: &Metrics, height: f64) -> String {
    let first = metrics.baselines.first().copied().unwrap_or(0.0);
    let last = metrics.baselines.last().copied().unwrap_or(first);
    match mode {
        DisplayMode::Display => {
            let top = (1.0 - first) * DISPLAY_CROP_FACTOR;
            let bottom = (last - height) * DISPLAY_CROP_FACTOR;
            format!(
                "display:inline-block;margin-top:{}ex;margin-bottom:{}ex;",
                fmt_number(top),
                fmt_number(bottom)
            )
        }
        DisplayMode::Inline => {
            let below = height - first;
            // standalone's `border=1pt` frame is one device unit (pt) on each side.
            let side = -1.0 / metrics.x_height;
            format!(
                "display:inline-block;margin-bottom:{}ex;margin-left:{}ex;margin-right:{}ex;",
                fmt_number(-below),
                fmt_number(side),
                fmt_number(side)
            )
        }
    }
}
