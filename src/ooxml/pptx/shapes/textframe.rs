/// Text frames (`p:txBody` on shapes, `a:txBody` in table cells).
use crate::common::unit::pt_to_centipoints;
use crate::common::xml::Element;
use crate::ooxml::pptx::format::TextFormat;

/// Line break inside a paragraph (`a:br`) in text get/set.
pub const LINE_BREAK: char = '\u{b}';

/// A read-only view of a text body.
///
/// # Examples
///
/// ```
/// use litchi_pptx::common::xml::Element;
/// use litchi_pptx::ooxml::pptx::shapes::textframe::{TextFrame, new_tx_body};
///
/// let body = new_tx_body("p:txBody", "Hello\nWorld", None);
/// let frame = TextFrame::new(&body);
/// assert_eq!(frame.paragraphs().len(), 2);
/// assert_eq!(frame.text(), "Hello\nWorld");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TextFrame<'a> {
    tx_body: &'a Element,
}

impl<'a> TextFrame<'a> {
    pub fn new(tx_body: &'a Element) -> Self {
        Self { tx_body }
    }

    /// Text frame of a shape element, if it has one.
    pub fn of_shape(shape: &'a Element) -> Option<Self> {
        shape.child("txBody").map(Self::new)
    }

    pub fn paragraphs(&self) -> Vec<Paragraph<'a>> {
        self.tx_body.children_named("p").map(Paragraph::new).collect()
    }

    /// All text, one line per paragraph.
    pub fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Default size of first-level text in points, from `a:lstStyle`.
    pub fn level1_font_size(&self) -> Option<f64> {
        font_size_of(self.tx_body.child_path(&["lstStyle", "lvl1pPr", "defRPr"])?)
    }
}

/// A paragraph (`a:p`).
#[derive(Debug, Clone, Copy)]
pub struct Paragraph<'a> {
    p: &'a Element,
}

impl<'a> Paragraph<'a> {
    pub fn new(p: &'a Element) -> Self {
        Self { p }
    }

    /// Text of runs and fields; line breaks come back as [`LINE_BREAK`].
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in self.p.elements() {
            match child.local_name() {
                "r" | "fld" => {
                    if let Some(t) = child.child("t") {
                        out.push_str(&t.text());
                    }
                },
                "br" => out.push(LINE_BREAK),
                _ => {},
            }
        }
        out
    }

    /// Indentation level (`a:pPr/@lvl`), 0 when absent.
    pub fn level(&self) -> u32 {
        self.p
            .child("pPr")
            .and_then(|ppr| ppr.attr("lvl"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

/// Font size in points of an `a:rPr` / `a:defRPr` element.
pub fn font_size_of(rpr: &Element) -> Option<f64> {
    rpr.attr("sz")
        .and_then(|v| v.parse::<i32>().ok())
        .map(crate::common::unit::centipoints_to_pt)
}

/// Build `a:rPr` for a run. Returns `None` for an empty format.
pub fn run_properties(format: &TextFormat) -> Option<Element> {
    if format.is_empty() {
        return None;
    }
    let mut rpr = Element::new("a:rPr").with_attr("lang", "en-US").with_attr("dirty", "0");
    if let Some(size) = format.size {
        rpr.set_attr("sz", pt_to_centipoints(size).to_string());
    }
    if let Some(bold) = format.bold {
        rpr.set_attr("b", if bold { "1" } else { "0" });
    }
    if let Some(italic) = format.italic {
        rpr.set_attr("i", if italic { "1" } else { "0" });
    }
    if let Some(underline) = format.underline {
        rpr.set_attr("u", if underline { "sng" } else { "none" });
    }
    if let Some(color) = format.color {
        rpr.push(
            Element::new("a:solidFill")
                .with_child(Element::new("a:srgbClr").with_attr("val", color.to_hex())),
        );
    }
    if let Some(font) = &format.font {
        rpr.push(Element::new("a:latin").with_attr("typeface", font.as_str()));
    }
    Some(rpr)
}

/// Create a text body named `name` (`p:txBody` or `a:txBody`) holding `text`.
pub fn new_tx_body(name: &str, text: &str, format: Option<&TextFormat>) -> Element {
    let mut body = Element::new(name)
        .with_child(Element::new("a:bodyPr"))
        .with_child(Element::new("a:lstStyle"));
    let rpr = format.and_then(run_properties);
    append_paragraphs(&mut body, text, rpr.as_ref());
    body
}

/// Replace the paragraphs of a text body with `text`, one paragraph per
/// line. Body and list properties are kept, as is the run formatting of the
/// first existing run.
pub fn set_text(tx_body: &mut Element, text: &str) {
    let template = tx_body
        .children_named("p")
        .flat_map(|p| p.children_named("r"))
        .find_map(|r| r.child("rPr"))
        .cloned();
    tx_body.remove_elements(|e| e.local_name() == "p");
    append_paragraphs(tx_body, text, template.as_ref());
}

fn append_paragraphs(tx_body: &mut Element, text: &str, rpr: Option<&Element>) {
    for line in text.split('\n') {
        let mut p = Element::new("a:p");
        for (i, segment) in line.split(LINE_BREAK).enumerate() {
            if i > 0 {
                p.push(Element::new("a:br"));
            }
            if segment.is_empty() {
                continue;
            }
            let mut r = Element::new("a:r");
            if let Some(rpr) = rpr {
                r.push(rpr.clone());
            }
            r.push(Element::new("a:t").with_text(segment));
            p.push(r);
        }
        tx_body.push(p);
    }
}
