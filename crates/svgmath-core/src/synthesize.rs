//! Document Synthesizer: request → XeLaTeX source with marker glyphs.

use crate::{DisplayMode, RenderRequest};

/// LaTeX line-break token separating the lines of a display equation.
pub const LINE_BREAK: &str = r"\\";

const PACKAGES: &[&str] = &[
    r"\usepackage{amsmath}",
    r"\usepackage{amssymb}",
    r"\usepackage{mathspec}",
    r"\usepackage{xunicode}",
    r"\usepackage{xltxtra}",
    r"\usepackage{xcolor}",
    r"\usepackage{color}",
];

// `bada55` is painted by cairo as `MARKER_STYLE`. The second dot sits exactly 1ex above the
// first, which is what the extractor measures.
const MARKER_MACRO: &[&str] = &[
    r"\definecolor{bada55}{RGB}{186,218,85}",
    r"\newcommand{\markers}{\scalebox{0.01}{\color{bada55}.}\raisebox{1ex}{\scalebox{0.01}{\color{bada55}.}}}",
];

pub fn synthesize(request: &RenderRequest) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(32);

    lines.push(document_class(request.mode, request.font_size));
    lines.extend(PACKAGES.iter().map(|s| s.to_string()));
    lines.extend(request.preamble.iter().cloned());
    lines.extend(font_settings(&request.font_family));
    lines.extend(MARKER_MACRO.iter().map(|s| s.to_string()));

    lines.push(r"\begin{document}".to_string());
    match request.mode {
        DisplayMode::Inline => lines.push(format!(r"\markers${}$\markers", request.equation)),
        DisplayMode::Display => {
            lines.push(r"\begin{align*}".to_string());
            lines.push(display_body(&request.equation));
            lines.push(r"\end{align*}".to_string());
        }
    }
    lines.push(r"\end{document}".to_string());

    lines.join("\n")
}

fn document_class(mode: DisplayMode, font_size: u32) -> String {
    match mode {
        DisplayMode::Inline => format!(r"\documentclass[{font_size}pt, border=1pt]{{standalone}}"),
        DisplayMode::Display => format!(r"\documentclass[{font_size}pt, preview]{{standalone}}"),
    }
}

fn font_settings(font_family: &str) -> [String; 3] {
    [
        format!(r"\setmainfont{{{font_family}}}"),
        format!(r"\setmathsfont(Greek,Latin,Digits)[Scale=MatchLowercase]{{{font_family}}}"),
        format!(r"\setmathrm[Scale=MatchLowercase]{{{font_family}}}"),
    ]
}

/// Splits a display equation on `\\`, trimming each piece.
///
/// Empty pieces are kept: every piece becomes an aligned line with its own marker pair.
pub fn split_display_lines(equation: &str) -> Vec<&str> {
    equation.split(LINE_BREAK).map(str::trim).collect()
}

fn display_body(equation: &str) -> String {
    split_display_lines(equation)
        .into_iter()
        .map(|line| format!(r"\markers {line}"))
        .collect::<Vec<_>>()
        .join("\\\\\n")
}
