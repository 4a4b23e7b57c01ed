//! Minimal owned SVG DOM.
//!
//! `roxmltree` gives a read-only view; the extractor needs to rewrite attributes and drop nodes,
//! so the document is copied once into [`SvgElement`]s that the extraction consumes. Names are
//! kept qualified (`xlink:href`) exactly as the source spelled them and namespace declarations
//! are ordinary attributes. Serialization re-indents element-only content and writes text content
//! verbatim, so the output matches the input apart from layout whitespace.

use crate::GeometryError;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgAttr {
    pub name: String,
    pub value: String,
}

impl SvgAttr {
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SvgNode {
    Element(SvgElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgElement {
    pub name: String,
    pub attrs: Vec<SvgAttr>,
    pub children: Vec<SvgNode>,
}

impl SvgElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Replaces the value in place, or appends the attribute when absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value,
            None => self.attrs.push(SvgAttr {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// `href` or `xlink:href`, whichever prefix the document used.
    pub fn href(&self) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.local_name() == "href")
            .map(|a| a.value.as_str())
    }

    pub fn set_href(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.local_name() == "href") {
            Some(a) => a.value = value,
            None => self.attrs.push(SvgAttr {
                name: "xlink:href".to_string(),
                value,
            }),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|c| match c {
            SvgNode::Element(e) => Some(e),
            SvgNode::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut SvgElement> {
        self.children.iter_mut().filter_map(|c| match c {
            SvgNode::Element(e) => Some(e),
            SvgNode::Text(_) => None,
        })
    }

    /// Depth-first, document order, including `self`.
    pub fn find(&self, pred: &dyn Fn(&SvgElement) -> bool) -> Option<&SvgElement> {
        if pred(self) {
            return Some(self);
        }
        self.elements().find_map(|c| c.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&SvgElement) -> bool) -> Option<&mut SvgElement> {
        if pred(self) {
            return Some(self);
        }
        self.elements_mut().find_map(|c| c.find_mut(pred))
    }

    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut SvgElement)) {
        f(self);
        for c in self.elements_mut() {
            c.walk_mut(f);
        }
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self, Some(0));
        out
    }
}

pub fn parse_svg(svg: &str) -> Result<SvgElement, GeometryError> {
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc =
        roxmltree::Document::parse_with_options(svg, opts).map_err(|e| GeometryError::SvgParse {
            message: e.to_string(),
        })?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(GeometryError::MissingRoot);
    }
    Ok(build_element(root, None, false))
}

fn qualified_name(node: roxmltree::Node<'_, '_>, ns: Option<&str>, local: &str) -> String {
    if ns == Some(roxmltree::NS_XML_URI) {
        return format!("xml:{local}");
    }
    match ns.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn preserves_space(node: roxmltree::Node<'_, '_>, inherited: bool) -> bool {
    match node
        .attributes()
        .find(|a| a.namespace() == Some(roxmltree::NS_XML_URI) && a.name() == "space")
    {
        Some(a) => a.value() == "preserve",
        None => inherited,
    }
}

fn build_element(
    node: roxmltree::Node<'_, '_>,
    parent: Option<roxmltree::Node<'_, '_>>,
    preserve: bool,
) -> SvgElement {
    let tag = node.tag_name();
    let mut el = SvgElement::new(qualified_name(node, tag.namespace(), tag.name()));

    // roxmltree reports in-scope namespaces; only the ones introduced here are declared here.
    for ns in node.namespaces() {
        let inherited = parent.is_some_and(|p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if inherited || ns.name() == Some("xml") {
            continue;
        }
        el.attrs.push(SvgAttr {
            name: match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            },
            value: ns.uri().to_string(),
        });
    }

    for a in node.attributes() {
        el.attrs.push(SvgAttr {
            name: qualified_name(node, a.namespace(), a.name()),
            value: a.value().to_string(),
        });
    }

    // Whitespace-only text is layout unless the element has real text content or asks for
    // `xml:space="preserve"`; other text is kept verbatim.
    let preserve = preserves_space(node, preserve);
    let mixed = preserve
        || node
            .children()
            .any(|c| c.is_text() && !c.text().unwrap_or_default().trim().is_empty());
    for c in node.children() {
        if c.is_element() {
            el.children
                .push(SvgNode::Element(build_element(c, Some(node), preserve)));
        } else if c.is_text() {
            let text = c.text().unwrap_or_default();
            if mixed && !text.is_empty() {
                el.children.push(SvgNode::Text(text.to_string()));
            }
        }
    }

    el
}

/// `depth` is `None` inside text content, where added whitespace would change the text.
fn write_element(out: &mut String, el: &SvgElement, depth: Option<usize>) {
    if let Some(depth) = depth {
        indent(out, depth);
    }
    out.push('<');
    out.push_str(&el.name);
    for a in &el.attrs {
        out.push(' ');
        out.push_str(&a.name);
        out.push_str("=\"");
        escape_xml_into(out, &a.value);
        out.push('"');
    }
    if el.children.is_empty() {
        out.push_str("/>");
        if depth.is_some() {
            out.push('\n');
        }
        return;
    }

    let has_text = el.children.iter().any(|c| matches!(c, SvgNode::Text(_)));
    let child_depth = depth.filter(|_| !has_text).map(|d| d + 1);
    out.push('>');
    if child_depth.is_some() {
        out.push('\n');
    }
    for c in &el.children {
        match c {
            SvgNode::Element(e) => write_element(out, e, child_depth),
            SvgNode::Text(t) => escape_xml_into(out, t),
        }
    }
    if let Some(depth) = child_depth.and(depth) {
        indent(out, depth);
    }
    let _ = write!(out, "</{}>", el.name);
    if depth.is_some() {
        out.push('\n');
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push(' ');
    }
}

pub fn escape_xml_into(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'>' => Some("&gt;"),
            b'"' => Some("&quot;"),
            b'\'' => Some("&#39;"),
            _ => None,
        };
        let Some(esc) = esc else {
            continue;
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

/// Shortest round-trip decimal, without `-0` or sub-1e-9 float noise.
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    if v == -0.0 {
        v = 0.0;
    }
    format!("{v}")
}
