#![forbid(unsafe_code)]

//! `svgmath` turns LaTeX equations into SVG fragments that sit on the text baseline of the HTML
//! around them.
//!
//! The core (re-exported at the crate root) is pure: it writes the XeLaTeX document and post
//! processes the SVG that comes back. Running the TeX toolchain lives behind a feature.
//!
//! # Features
//!
//! - `render`: run `xelatex`/`pdfcrop`/`pdf2svg` end to end (`svgmath::render`)

pub use svgmath_core::*;

pub mod preview;

#[cfg(feature = "render")]
pub mod render {
    pub use svgmath_render::{
        Error, Invocation, ProcessRunner, RenderConfig, Renderer, Result, SearchPath, Tool,
        ToolFailure, ToolProbe, ToolRunner, Toolchain,
    };

    use svgmath_core::{RenderRequest, RenderResult};

    /// Renders a batch of equations on one common scale.
    ///
    /// The first request is measured; every later one reuses that x-height, so equations from
    /// the same document line up even when their own markers would disagree slightly. An
    /// explicit `x_height` skips the measurement.
    pub fn render_shared(
        renderer: &Renderer,
        requests: &[RenderRequest],
        x_height: Option<f64>,
    ) -> Result<Vec<RenderResult>> {
        let mut shared = x_height;
        let mut out = Vec::with_capacity(requests.len());
        for request in requests {
            let result = renderer.render_with_x_height(request, shared)?;
            shared.get_or_insert(result.x_height);
            out.push(result);
        }
        Ok(out)
    }
}
