#![forbid(unsafe_code)]

//! External rendering pipeline for `svgmath`.
//!
//! `xelatex` typesets the synthesized document, `pdfcrop` trims display equations, `pdf2svg`
//! converts the page, and the core extractor turns that SVG into a [`RenderResult`]. Binaries are
//! located once, up front, by [`Toolchain::resolve`]; a missing binary is a configuration error
//! returned from [`Renderer::new`], not a failure in the middle of a request.

pub mod config;
pub mod pipeline;
pub mod runner;
pub mod toolchain;

pub use config::RenderConfig;
pub use pipeline::Renderer;
pub use runner::{Invocation, ProcessRunner, ToolFailure, ToolRunner};
pub use svgmath_core::{DisplayMode, RenderRequest, RenderResult};
pub use toolchain::{SearchPath, Tool, ToolProbe, Toolchain};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{tool} not found (looked for `{program}`). {hint}")]
    Configuration {
        tool: Tool,
        program: String,
        hint: &'static str,
    },
    #[error("{tool} failed: {source}")]
    RenderFailed {
        tool: Tool,
        #[source]
        source: ToolFailure,
    },
    #[error("{tool} reported success but wrote no output at {}", .path.display())]
    MissingOutput { tool: Tool, path: PathBuf },
    #[error("invalid render configuration: {message}")]
    Config { message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Core(#[from] svgmath_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
