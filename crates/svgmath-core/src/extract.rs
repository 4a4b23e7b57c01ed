//! Geometry Extractor: rendered SVG → cleaned, `ex`-sized fragment + baselines.

use crate::ident::{is_glyph_id, prefix_glyph_ref, prefix_id, random_prefix};
use crate::metrics::{self, Metrics};
use crate::svgdom::{self, SvgElement, SvgNode, fmt_number};
use crate::{DisplayMode, GeometryError, MARKER_STYLE, Result, SYMBOL_CLASS};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Id cairo gives the page-level drawing group.
pub const SURFACE_ID: &str = "surface1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Root `<svg>` element, markers removed, ready to inline into HTML.
    #[serde(rename = "svg")]
    pub svg_markup: String,
    /// Baselines in `ex` from the top of the frame; exactly one for inline equations.
    pub baselines: Vec<f64>,
    pub width: f64,
    pub height: f64,
    /// Device units per `ex` used for every conversion above.
    pub x_height: f64,
}

impl RenderResult {
    pub fn metrics(&self) -> Metrics {
        Metrics {
            x_height: self.x_height,
            baselines: self.baselines.clone(),
        }
    }
}

/// Extracts with a prefix drawn from the thread-local generator.
pub fn extract(svg: &str, mode: DisplayMode, x_height: Option<f64>) -> Result<RenderResult> {
    extract_with_rng(svg, mode, x_height, &mut rand::thread_rng())
}

pub fn extract_with_rng<R: Rng + ?Sized>(
    svg: &str,
    mode: DisplayMode,
    x_height: Option<f64>,
    rng: &mut R,
) -> Result<RenderResult> {
    let prefix = random_prefix(rng);
    extract_with_prefix(svg, mode, x_height, &prefix)
}

/// Deterministic core of [`extract`]: every glyph id is prefixed with `prefix`.
///
/// When `x_height` is `Some`, it replaces the value estimated from the markers. Callers use this
/// to give several independently rendered equations one shared scale.
pub fn extract_with_prefix(
    svg: &str,
    mode: DisplayMode,
    x_height: Option<f64>,
    prefix: &str,
) -> Result<RenderResult> {
    let mut root = svgdom::parse_svg(svg)?;

    prefix_definition_ids(&mut root, prefix);

    let surface = locate_surface(&mut root)?;
    tag_glyph_refs(surface, prefix);
    let markers = take_markers(surface);
    let ys = marker_positions(&markers)?;

    let lines = metrics::pair_markers(&ys)?;
    let metrics = metrics::measure(&lines, mode, x_height)?;
    tracing::debug!(
        mode = %mode,
        markers = ys.len(),
        x_height = metrics.x_height,
        estimated = x_height.is_none(),
        "measured marker geometry"
    );

    let height = read_dimension(&root, "height")? / metrics.x_height;
    let width = read_dimension(&root, "width")? / metrics.x_height;

    root.set_attr("height", format!("{}ex", fmt_number(height)));
    root.set_attr("width", format!("{}ex", fmt_number(width)));
    root.set_attr("style", metrics::root_style(mode, &metrics, height));
    root.set_attr("class", mode.css_class());

    Ok(RenderResult {
        svg_markup: root.to_markup(),
        baselines: metrics.baselines,
        width,
        height,
        x_height: metrics.x_height,
    })
}

/// Renames every `<symbol>` and every glyph definition, whatever its tag, so each rewritten
/// `#glyph…` reference still resolves.
fn prefix_definition_ids(root: &mut SvgElement, prefix: &str) {
    root.walk_mut(&mut |el| {
        let Some(id) = el.attr("id") else {
            return;
        };
        if el.local_name() == "symbol" || is_glyph_id(id) {
            let id = prefix_id(id, prefix);
            el.set_attr("id", id);
        }
    });
}

fn tag_glyph_refs(surface: &mut SvgElement, prefix: &str) {
    surface.walk_mut(&mut |el| {
        if el.local_name() != "use" {
            return;
        }
        let Some(href) = el.href().and_then(|h| prefix_glyph_ref(h, prefix)) else {
            return;
        };
        el.set_attr("class", SYMBOL_CLASS);
        el.set_href(href);
    });
}

fn is_surface(el: &SvgElement) -> bool {
    el.attr("id") == Some(SURFACE_ID)
}

fn locate_surface(root: &mut SvgElement) -> std::result::Result<&mut SvgElement, GeometryError> {
    if root.find(&is_surface).is_some() {
        return root
            .find_mut(&is_surface)
            .ok_or(GeometryError::MissingSurface);
    }
    tracing::warn!("no `{SURFACE_ID}` group; using the first top-level <g> as drawing surface");
    root.elements_mut()
        .find(|e| e.local_name() == "g")
        .ok_or(GeometryError::MissingSurface)
}

fn is_marker(el: &SvgElement) -> bool {
    el.local_name() == "g" && el.attr("style") == Some(MARKER_STYLE)
}

/// Detaches the surface's top-level marker groups, keeping their document order. Nested groups
/// are never markers.
fn take_markers(surface: &mut SvgElement) -> Vec<SvgElement> {
    let mut markers = Vec::new();
    let mut kept = Vec::with_capacity(surface.children.len());
    for child in std::mem::take(&mut surface.children) {
        match child {
            SvgNode::Element(el) if is_marker(&el) => markers.push(el),
            other => kept.push(other),
        }
    }
    surface.children = kept;
    markers
}

fn marker_positions(markers: &[SvgElement]) -> std::result::Result<Vec<f64>, GeometryError> {
    markers
        .iter()
        .enumerate()
        .map(|(index, marker)| {
            marker
                .find(&|e| e.local_name() == "use")
                .and_then(|u| u.attr("y"))
                .and_then(|y| y.trim().parse::<f64>().ok())
                .ok_or(GeometryError::MissingMarkerPosition { index })
        })
        .collect()
}

fn non_numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\d.]").expect("valid regex"))
}

/// Reads a root dimension in device units, dropping any unit suffix (`62.5pt` → `62.5`).
fn read_dimension(
    root: &SvgElement,
    attribute: &'static str,
) -> std::result::Result<f64, GeometryError> {
    let raw = root
        .attr(attribute)
        .ok_or(GeometryError::MissingDimension { attribute })?;
    non_numeric_re()
        .replace_all(raw, "")
        .parse::<f64>()
        .map_err(|_| GeometryError::InvalidDimension {
            attribute,
            value: raw.to_string(),
        })
}
