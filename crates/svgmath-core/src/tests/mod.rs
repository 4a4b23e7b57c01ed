mod extract;

use crate::MARKER_STYLE;

/// Builds a document shaped like pdf2svg/cairo output: glyph symbols under `<defs>`, one
/// `surface1` group whose top-level children are styled `<g>` groups of `<use>` references.
pub(crate) fn pdf2svg_doc(width: &str, height: &str, surface_body: &str) -> String {
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {w} {h}" version="1.1">
<defs>
<g>
<symbol overflow="visible" id="glyph0-0">
<path style="stroke:none;" d=""/>
</symbol>
<symbol overflow="visible" id="glyph0-1">
<path style="stroke:none;" d="M 0.5 0 L 2.5 -4.5 L 4.5 0 Z "/>
</symbol>
</g>
</defs>
<g id="surface1">
{surface_body}
</g>
</svg>
"##,
        w = width.trim_end_matches("pt"),
        h = height.trim_end_matches("pt"),
    )
}

pub(crate) fn marker(x: f64, y: f64) -> String {
    format!(
        r##"<g style="{MARKER_STYLE}">
  <use xlink:href="#glyph0-0" x="{x}" y="{y}"/>
</g>"##
    )
}

pub(crate) fn glyphs(x: f64, y: f64) -> String {
    format!(
        r##"<g style="fill:rgb(0%,0%,0%);fill-opacity:1;">
  <use xlink:href="#glyph0-1" x="{x}" y="{y}"/>
  <use xlink:href="#glyph0-1" x="{}" y="{y}"/>
</g>"##,
        x + 5.0
    )
}

/// `\markers` pair: baseline dot, then the dot raised by `delta`.
pub(crate) fn marker_pair(x: f64, baseline: f64, delta: f64) -> String {
    format!(
        "{}\n{}",
        marker(x, baseline),
        marker(x + 0.01, baseline - delta)
    )
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
