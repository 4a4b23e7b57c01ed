#![forbid(unsafe_code)]

//! LaTeX math → baseline-aligned SVG (pure core).
//!
//! The crate has two halves that sit on either side of an external typesetting pipeline:
//! - [`synthesize`] turns a [`RenderRequest`] into a XeLaTeX document with invisible marker glyphs
//! - [`extract`] reads the SVG that pipeline produced, recovers the markers, and returns a cleaned
//!   SVG fragment sized in `ex` units together with its baselines ([`RenderResult`])
//!
//! Nothing here performs I/O; running `xelatex`/`pdfcrop`/`pdf2svg` lives in `svgmath-render`.

pub mod error;
pub mod extract;
pub mod ident;
pub mod metrics;
pub mod request;
pub mod svgdom;
pub mod synthesize;

pub use error::{Error, GeometryError, Result};
pub use extract::{RenderResult, extract, extract_with_prefix, extract_with_rng};
pub use metrics::{MarkerLine, Metrics};
pub use request::{DisplayMode, RenderRequest};
pub use synthesize::synthesize;

/// Fill style cairo emits for glyphs painted in the `bada55` marker color.
///
/// Marker detection is an exact string comparison, so the conversion step must preserve it
/// verbatim.
pub const MARKER_STYLE: &str = "fill:rgb(72.898865%,85.499573%,33.299255%);fill-opacity:1;";

/// Class attached to every rewritten glyph reference.
pub const SYMBOL_CLASS: &str = "svgmath-symbol";

#[cfg(test)]
mod tests;
