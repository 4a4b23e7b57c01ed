//! Standalone HTML page for eyeballing rendered equations in a browser.
//!
//! Inline results go inside paragraphs of running text, display results get a centered block of
//! their own. Because every result is sized in `ex`, changing the page font size is enough to
//! check that equations scale and align with the text.

use svgmath_core::RenderResult;
use svgmath_core::request::DEFAULT_FONT_FAMILY;
use svgmath_core::svgdom::escape_xml_into;

pub const DEFAULT_FONT_SIZE_PX: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    /// Cleaned SVG markup, embedded as is.
    Math(String),
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn math(result: &RenderResult) -> Self {
        Self::Math(result.svg_markup.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Paragraph(Vec<Fragment>),
    Display(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPage {
    title: String,
    font_family: String,
    font_size_px: u32,
    display_background: Option<String>,
    blocks: Vec<Block>,
}

impl Default for PreviewPage {
    fn default() -> Self {
        Self {
            title: "svgmath preview".to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size_px: DEFAULT_FONT_SIZE_PX,
            display_background: None,
            blocks: Vec::new(),
        }
    }
}

impl PreviewPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    pub fn with_font_size_px(mut self, px: u32) -> Self {
        self.font_size_px = px;
        self
    }

    /// Background color for display blocks; makes the cropped frame visible.
    pub fn with_display_background(mut self, color: impl Into<String>) -> Self {
        self.display_background = Some(color.into());
        self
    }

    pub fn push_paragraph(&mut self, fragments: impl IntoIterator<Item = Fragment>) -> &mut Self {
        self.blocks
            .push(Block::Paragraph(fragments.into_iter().collect()));
        self
    }

    pub fn push_display(&mut self, result: &RenderResult) -> &mut Self {
        self.blocks.push(Block::Display(result.svg_markup.clone()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n<title>");
        escape_xml_into(&mut out, &self.title);
        out.push_str("</title>\n<style>body { font-size:");
        out.push_str(&self.font_size_px.to_string());
        out.push_str("px; font-family: ");
        out.push_str(&css_font_family(&self.font_family));
        out.push_str("; }</style>\n</head>\n<body>\n");

        for block in &self.blocks {
            match block {
                Block::Paragraph(fragments) => {
                    out.push_str("<p>");
                    for fragment in fragments {
                        match fragment {
                            Fragment::Text(text) => escape_xml_into(&mut out, text),
                            Fragment::Math(svg) => out.push_str(svg),
                        }
                    }
                    out.push_str("</p>\n");
                }
                Block::Display(svg) => {
                    out.push_str("<div style=\"");
                    if let Some(bg) = &self.display_background {
                        out.push_str("background-color:");
                        escape_xml_into(&mut out, bg);
                        out.push(';');
                    }
                    out.push_str("padding:1.5ex 0;text-align:center;\">");
                    out.push_str(svg);
                    out.push_str("</div>\n");
                }
            }
        }

        out.push_str("</body>\n</html>\n");
        out
    }
}

/// Quotes family names that contain spaces (`Helvetica Neue` -> `"Helvetica Neue"`).
///
/// `<style>` content is raw text, so angle brackets are dropped instead of escaped.
fn css_font_family(family: &str) -> String {
    let family: String = family.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let family = family.trim();
    if family.contains(char::is_whitespace) && !family.starts_with(['"', '\'']) {
        format!("\"{family}\"")
    } else {
        family.to_string()
    }
}
