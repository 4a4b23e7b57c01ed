pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown display mode: {mode} (expected `inline` or `display`)")]
    UnknownMode { mode: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// The rendered SVG does not honor the marker-injection contract.
///
/// None of these are recoverable: without trustworthy markers there is no trustworthy baseline,
/// and returning an SVG without one would silently misalign the host document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("SVG parse error: {message}")]
    SvgParse { message: String },

    #[error("SVG document has no <svg> root element")]
    MissingRoot,

    #[error("SVG document has no drawing surface")]
    MissingSurface,

    #[error("no marker found in the drawing surface")]
    NoMarkers,

    #[error("there should be an even number of markers (found {count})")]
    OddMarkerCount { count: usize },

    #[error("marker #{index} has no positioned <use> element")]
    MissingMarkerPosition { index: usize },

    #[error("root <svg> element has no `{attribute}` attribute")]
    MissingDimension { attribute: &'static str },

    #[error("root <svg> `{attribute}` is not a number: {value:?}")]
    InvalidDimension {
        attribute: &'static str,
        value: String,
    },

    #[error("x-height must be a positive finite number (got {x_height})")]
    InvalidXHeight { x_height: f64 },
}
