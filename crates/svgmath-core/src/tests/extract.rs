use super::{approx, glyphs, marker, marker_pair, pdf2svg_doc};
use crate::svgdom::parse_svg;
use crate::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn style_ex(style: &str, key: &str) -> f64 {
    style
        .split(';')
        .find_map(|decl| decl.trim().strip_prefix(&format!("{key}:")))
        .and_then(|v| v.strip_suffix("ex"))
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or_else(|| panic!("missing `{key}` in style {style:?}"))
}

fn root_of(result: &RenderResult) -> svgdom::SvgElement {
    parse_svg(&result.svg_markup).expect("extracted markup parses")
}

/// `x^2+6x+8=0` as xelatex+pdf2svg lay it out: a marker pair on each side of the glyphs.
fn inline_quadratic() -> String {
    let body = [
        marker_pair(1.0, 10.5, 6.25),
        glyphs(3.0, 10.5),
        glyphs(20.0, 10.5),
        marker_pair(60.0, 10.5, 6.25),
    ]
    .join("\n");
    pdf2svg_doc("62.5pt", "14pt", &body)
}

fn display_two_lines() -> String {
    let body = [
        marker_pair(1.0, 20.0, 6.25),
        glyphs(10.0, 20.0),
        marker_pair(1.0, 40.0, 6.25),
        glyphs(10.0, 40.0),
    ]
    .join("\n");
    pdf2svg_doc("125pt", "50pt", &body)
}

#[test]
fn extract_inline_quadratic() {
    let res = extract_with_prefix(&inline_quadratic(), DisplayMode::Inline, None, "abc").unwrap();

    assert!(approx(res.x_height, 6.25));
    assert_eq!(res.baselines.len(), 1);
    assert!(approx(res.baselines[0], 10.5 / 6.25));
    assert!(approx(res.width, 10.0));
    assert!(approx(res.height, 14.0 / 6.25));
    assert!(!res.svg_markup.contains(MARKER_STYLE));

    let root = root_of(&res);
    assert_eq!(root.attr("class"), Some("svgmath-inline"));
    let style = root.attr("style").unwrap();
    assert!(style.starts_with("display:inline-block;"));

    let bottom = style_ex(style, "margin-bottom");
    assert!(bottom < 0.0);
    assert!((bottom + (res.height - res.baselines[0])).abs() < 1e-9);

    let left = style_ex(style, "margin-left");
    let right = style_ex(style, "margin-right");
    assert!(left < 0.0);
    assert_eq!(left, right);
    assert!(approx(left, -1.0 / 6.25));
}

#[test]
fn extract_display_two_lines() {
    let svg = display_two_lines();
    assert_eq!(svg.matches(MARKER_STYLE).count(), 4);

    let res = extract_with_prefix(&svg, DisplayMode::Display, None, "abc").unwrap();
    assert_eq!(res.baselines.len(), 2);
    assert!(res.baselines[0] < res.baselines[1]);
    assert!(approx(res.baselines[0], 3.2));
    assert!(approx(res.baselines[1], 6.4));
    assert!(approx(res.height, 8.0));
    assert!(!res.svg_markup.contains(MARKER_STYLE));

    let root = root_of(&res);
    assert_eq!(root.attr("class"), Some("svgmath-display"));
    let style = root.attr("style").unwrap();
    assert!(approx(style_ex(style, "margin-top"), (1.0 - 3.2) * 0.666));
    assert!(approx(style_ex(style, "margin-bottom"), (6.4 - 8.0) * 0.666));
}

#[test]
fn display_line_count_matches_marker_pairs() {
    for k in 1..=4usize {
        let body = (0..k)
            .map(|i| marker_pair(1.0, 20.0 * (i as f64 + 1.0), 6.0))
            .collect::<Vec<_>>()
            .join("\n");
        let svg = pdf2svg_doc("100pt", "100pt", &body);
        assert_eq!(svg.matches(MARKER_STYLE).count(), 2 * k);

        let res = extract_with_prefix(&svg, DisplayMode::Display, None, "p").unwrap();
        assert_eq!(res.baselines.len(), k);
    }
}

#[test]
fn x_height_override_scales_every_output() {
    let svg = display_two_lines();
    let measured = extract_with_prefix(&svg, DisplayMode::Display, None, "abc").unwrap();
    let forced = extract_with_prefix(&svg, DisplayMode::Display, Some(12.5), "abc").unwrap();

    assert_eq!(forced.x_height, 12.5);
    let ratio = measured.x_height / forced.x_height;
    assert!(approx(forced.width, measured.width * ratio));
    assert!(approx(forced.height, measured.height * ratio));
    for (f, m) in forced.baselines.iter().zip(&measured.baselines) {
        assert!(approx(*f, m * ratio));
    }
    assert_eq!(root_of(&forced).attr("width"), Some("10ex"));
}

#[test]
fn width_and_height_are_rewritten_in_ex() {
    let svg = pdf2svg_doc("300.5pt", "40pt", &marker_pair(1.0, 30.0, 10.0));
    let res = extract_with_prefix(&svg, DisplayMode::Inline, None, "abc").unwrap();

    assert!(approx(res.x_height, 10.0));
    let root = root_of(&res);
    assert_eq!(root.attr("width"), Some("30.05ex"));
    assert_eq!(root.attr("height"), Some("4ex"));
}

#[test]
fn zero_markers_is_a_geometry_error() {
    let svg = pdf2svg_doc("10pt", "10pt", &glyphs(1.0, 5.0));
    let err = extract_with_prefix(&svg, DisplayMode::Inline, None, "abc").unwrap_err();
    assert!(matches!(err, Error::Geometry(GeometryError::NoMarkers)));
}

#[test]
fn odd_marker_count_is_a_geometry_error() {
    let body = [marker_pair(1.0, 10.0, 5.0), marker(9.0, 10.0)].join("\n");
    let svg = pdf2svg_doc("10pt", "10pt", &body);
    let err = extract_with_prefix(&svg, DisplayMode::Display, None, "abc").unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(GeometryError::OddMarkerCount { count: 3 })
    ));
}

#[test]
fn re_extracting_cleaned_output_fails() {
    let first = extract_with_prefix(&inline_quadratic(), DisplayMode::Inline, None, "abc").unwrap();
    let err = extract_with_prefix(&first.svg_markup, DisplayMode::Inline, None, "def").unwrap_err();
    assert!(matches!(err, Error::Geometry(GeometryError::NoMarkers)));
}

#[test]
fn glyph_ids_and_references_are_prefixed() {
    let res = extract_with_prefix(&inline_quadratic(), DisplayMode::Inline, None, "Qx").unwrap();
    let root = root_of(&res);

    let symbol = root
        .find(&|e| e.name == "symbol" && e.attr("id") == Some("Qxglyph0-1"))
        .expect("prefixed symbol id");
    assert_eq!(symbol.attr("overflow"), Some("visible"));
    assert!(root.find(&|e| e.attr("id") == Some("glyph0-1")).is_none());

    let uses: Vec<_> = {
        let surface = root.find(&|e| e.attr("id") == Some("surface1")).unwrap();
        let mut out = Vec::new();
        collect_uses(surface, &mut out);
        out
    };
    assert_eq!(uses.len(), 4);
    for (href, class) in uses {
        assert_eq!(href, "#Qxglyph0-1");
        assert_eq!(class.as_deref(), Some(SYMBOL_CLASS));
    }
}

#[test]
fn glyph_definitions_written_as_groups_are_prefixed() {
    let svg = inline_quadratic().replace(
        "<symbol overflow=\"visible\" id=\"glyph0-1\">\n<path style=\"stroke:none;\" d=\"M 0.5 0 L 2.5 -4.5 L 4.5 0 Z \"/>\n</symbol>",
        "<g id=\"glyph0-1\">\n<path style=\"stroke:none;\" d=\"M 0.5 0 L 2.5 -4.5 L 4.5 0 Z \"/>\n</g>",
    );
    assert!(svg.contains("<g id=\"glyph0-1\">"));

    let res = extract_with_prefix(&svg, DisplayMode::Inline, None, "P").unwrap();
    let root = root_of(&res);

    let mut ids = Vec::new();
    collect_ids(&root, &mut ids);
    assert!(ids.contains(&"Pglyph0-0".to_string()));
    assert!(ids.contains(&"Pglyph0-1".to_string()));
    assert!(!ids.contains(&"glyph0-1".to_string()));

    let surface = root.find(&|e| e.attr("id") == Some("surface1")).unwrap();
    let mut uses = Vec::new();
    collect_uses(surface, &mut uses);
    assert_eq!(uses.len(), 4);
    for (href, _) in &uses {
        let target = href.strip_prefix('#').unwrap();
        assert!(ids.iter().any(|id| id == target), "dangling reference {href}");
    }
}

fn collect_ids(el: &svgdom::SvgElement, out: &mut Vec<String>) {
    if let Some(id) = el.attr("id") {
        out.push(id.to_string());
    }
    for c in el.elements() {
        collect_ids(c, out);
    }
}

fn collect_uses(el: &svgdom::SvgElement, out: &mut Vec<(String, Option<String>)>) {
    if el.name == "use" {
        out.push((
            el.attr("xlink:href").unwrap_or_default().to_string(),
            el.attr("class").map(str::to_string),
        ));
    }
    for c in el.elements() {
        collect_uses(c, out);
    }
}

#[test]
fn seeded_rng_gives_reproducible_ids() {
    let svg = inline_quadratic();
    let a = extract_with_rng(&svg, DisplayMode::Inline, None, &mut StdRng::seed_from_u64(1)).unwrap();
    let b = extract_with_rng(&svg, DisplayMode::Inline, None, &mut StdRng::seed_from_u64(1)).unwrap();
    let c = extract_with_rng(&svg, DisplayMode::Inline, None, &mut StdRng::seed_from_u64(2)).unwrap();

    assert_eq!(a.svg_markup, b.svg_markup);
    assert_ne!(a.svg_markup, c.svg_markup);
    assert_eq!(a.baselines, c.baselines);
}

#[test]
fn thread_rng_extraction_prefixes_are_unique_per_call() {
    let svg = inline_quadratic();
    let a = extract(&svg, DisplayMode::Inline, None).unwrap();
    let b = extract(&svg, DisplayMode::Inline, None).unwrap();
    assert_ne!(a.svg_markup, b.svg_markup);
}

#[test]
fn nested_marker_styled_groups_are_not_markers() {
    let nested = format!(
        "<g style=\"fill:rgb(0%,0%,0%);fill-opacity:1;\">\n{}\n</g>",
        marker(30.0, 2.0)
    );
    let body = [marker_pair(1.0, 10.0, 5.0), nested].join("\n");
    let svg = pdf2svg_doc("40pt", "12pt", &body);

    let res = extract_with_prefix(&svg, DisplayMode::Inline, None, "abc").unwrap();
    assert!(approx(res.x_height, 5.0));
    assert_eq!(res.svg_markup.matches(MARKER_STYLE).count(), 1);
}

#[test]
fn surface_falls_back_to_first_top_level_group() {
    let svg = pdf2svg_doc("20pt", "10pt", &marker_pair(1.0, 8.0, 4.0))
        .replace("id=\"surface1\"", "id=\"page1\"");
    let res = extract_with_prefix(&svg, DisplayMode::Inline, None, "abc").unwrap();
    assert!(approx(res.x_height, 4.0));
}

#[test]
fn missing_dimension_is_reported() {
    let svg = pdf2svg_doc("20pt", "10pt", &marker_pair(1.0, 8.0, 4.0))
        .replace(" height=\"10pt\"", "");
    let err = extract_with_prefix(&svg, DisplayMode::Inline, None, "abc").unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(GeometryError::MissingDimension {
            attribute: "height"
        })
    ));
}

#[test]
fn result_serializes_with_original_keys() {
    let res = extract_with_prefix(&inline_quadratic(), DisplayMode::Inline, None, "abc").unwrap();
    let v = serde_json::to_value(&res).unwrap();
    for key in ["svg", "baselines", "width", "height", "x_height"] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    assert_eq!(res.metrics().baselines, res.baselines);
}
