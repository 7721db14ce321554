//! Placeholder property inheritance.
//!
//! A placeholder on a slide takes any property it does not set itself from
//! the matching placeholder on its layout, and then from the matching
//! placeholder on the layout's master. Matching against the layout uses the
//! placeholder index first and falls back to the type; matching against the
//! master uses the base type only (a centered title inherits from the
//! master title, content placeholders from the master body).
//!
//! Resolution is computed on demand from the element trees and never cached.
//!
//! # Examples
//!
//! ```
//! use litchi_pptx::ooxml::pptx::inherit::Inherited;
//!
//! let size: Inherited<f64> = Inherited::Master(44.0);
//! assert_eq!(size.value(), Some(&44.0));
//! assert!(Inherited::<f64>::Unset.value().is_none());
//! ```
use crate::common::RGBColor;
use crate::common::xml::Element;
use crate::ooxml::pptx::shapes::base::{Geometry, shape_xfrm};
use crate::ooxml::pptx::shapes::placeholder::{PlaceholderInfo, PlaceholderType};
use crate::ooxml::pptx::shapes::textframe::{TextFrame, font_size_of};
use crate::ooxml::pptx::shapes::tree::{ShapeTree, sp_tree_of};

/// A resolved property together with the level that supplied it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inherited<T> {
    /// Set on the shape itself
    Local(T),
    /// Taken from the layout placeholder
    Layout(T),
    /// Taken from the master placeholder or the master text styles
    Master(T),
    /// Not set anywhere along the chain
    Unset,
}

impl<T> Inherited<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Local(v) | Self::Layout(v) | Self::Master(v) => Some(v),
            Self::Unset => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Local(v) | Self::Layout(v) | Self::Master(v) => Some(v),
            Self::Unset => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Inherited<U> {
        match self {
            Self::Local(v) => Inherited::Local(f(v)),
            Self::Layout(v) => Inherited::Layout(f(v)),
            Self::Master(v) => Inherited::Master(f(v)),
            Self::Unset => Inherited::Unset,
        }
    }
}

/// Every property the resolver can answer for one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlaceholder {
    pub geometry: Inherited<Geometry>,
    pub ph_type: Inherited<PlaceholderType>,
    pub fill: Inherited<RGBColor>,
    /// Default first-level font size in points
    pub font_size: Inherited<f64>,
}

/// The placeholder elements a shape inherits from.
#[derive(Debug, Clone, Copy)]
pub struct InheritanceChain<'a> {
    shape: &'a Element,
    layout: Option<&'a Element>,
    master: Option<&'a Element>,
    master_root: Option<&'a Element>,
}

impl<'a> InheritanceChain<'a> {
    /// Chain of a placeholder on a slide. `None` when `shape` is not a
    /// placeholder.
    pub fn for_slide_shape(
        shape: &'a Element,
        layout_root: Option<&'a Element>,
        master_root: Option<&'a Element>,
    ) -> Option<Self> {
        let info = PlaceholderInfo::from_shape(shape)?;
        let layout = layout_root.and_then(|root| layout_placeholder(root, info));
        // The layout's declaration decides which master placeholder applies.
        let master_type = layout
            .and_then(PlaceholderInfo::from_shape)
            .unwrap_or(info)
            .ph_type;
        let master = master_root.and_then(|root| master_placeholder(root, master_type));
        Some(Self {
            shape,
            layout,
            master,
            master_root,
        })
    }

    /// Chain of a placeholder on a layout: the layout shape is the local
    /// level and the master follows directly.
    pub fn for_layout_shape(shape: &'a Element, master_root: Option<&'a Element>) -> Option<Self> {
        let info = PlaceholderInfo::from_shape(shape)?;
        let master = master_root.and_then(|root| master_placeholder(root, info.ph_type));
        Some(Self {
            shape,
            layout: None,
            master,
            master_root,
        })
    }

    /// Matched layout placeholder, if any.
    pub fn layout(&self) -> Option<&'a Element> {
        self.layout
    }

    /// Matched master placeholder, if any.
    pub fn master(&self) -> Option<&'a Element> {
        self.master
    }

    /// Walk the chain and return the first level where `get` yields a value.
    pub fn resolve<T, F>(&self, get: F) -> Inherited<T>
    where
        F: Fn(&'a Element) -> Option<T>,
    {
        if let Some(v) = get(self.shape) {
            return Inherited::Local(v);
        }
        if let Some(v) = self.layout.and_then(&get) {
            return Inherited::Layout(v);
        }
        if let Some(v) = self.master.and_then(&get) {
            return Inherited::Master(v);
        }
        Inherited::Unset
    }

    /// Offset and extents (`a:xfrm`).
    pub fn geometry(&self) -> Inherited<Geometry> {
        self.resolve(|el| shape_xfrm(el).and_then(Geometry::from_xfrm))
    }

    /// Placeholder type. Only an explicit `type` counts on the shape itself;
    /// a matched layout or master placeholder declares its type, defaulted or
    /// not.
    pub fn placeholder_type(&self) -> Inherited<PlaceholderType> {
        if let Some(ph) = ph_element(self.shape)
            && let Some(value) = ph.attr("type")
        {
            return Inherited::Local(PlaceholderType::from_xml_value(value));
        }
        if let Some(info) = self.layout.and_then(PlaceholderInfo::from_shape) {
            return Inherited::Layout(info.ph_type);
        }
        if let Some(info) = self.master.and_then(PlaceholderInfo::from_shape) {
            return Inherited::Master(info.ph_type);
        }
        Inherited::Unset
    }

    /// Solid fill colour of the shape (`spPr/a:solidFill/a:srgbClr`).
    pub fn fill(&self) -> Inherited<RGBColor> {
        self.resolve(solid_fill)
    }

    /// Default first-level font size in points. After the master placeholder,
    /// the master text styles for the placeholder's base type are consulted.
    pub fn font_size(&self) -> Inherited<f64> {
        let size = self.resolve(|el| TextFrame::of_shape(el)?.level1_font_size());
        if size.is_set() {
            return size;
        }
        let base = self
            .placeholder_type()
            .into_value()
            .unwrap_or(PlaceholderType::Object)
            .base_type();
        self.master_root
            .and_then(|root| text_style_font_size(root, base))
            .map_or(Inherited::Unset, Inherited::Master)
    }

    pub fn resolve_all(&self) -> ResolvedPlaceholder {
        ResolvedPlaceholder {
            geometry: self.geometry(),
            ph_type: self.placeholder_type(),
            fill: self.fill(),
            font_size: self.font_size(),
        }
    }
}

fn ph_element(shape: &Element) -> Option<&Element> {
    shape
        .elements()
        .find(|e| e.local_name().starts_with("nv"))?
        .child_path(&["nvPr", "ph"])
}

/// Layout placeholder for `info`: same idx, else same type.
fn layout_placeholder(layout_root: &Element, info: PlaceholderInfo) -> Option<&Element> {
    let tree = ShapeTree::new(sp_tree_of(layout_root)?);
    tree.placeholder_by_idx(info.idx)
        .or_else(|| tree.placeholder_by_type(info.ph_type))
}

/// Master placeholder with the same base type as `ph_type`.
fn master_placeholder(master_root: &Element, ph_type: PlaceholderType) -> Option<&Element> {
    let base = ph_type.base_type();
    let tree = ShapeTree::new(sp_tree_of(master_root)?);
    tree.placeholders()
        .into_iter()
        .find(|(ph, _)| ph.ph_type.base_type() == base)
        .map(|(_, el)| el)
}

fn solid_fill(shape: &Element) -> Option<RGBColor> {
    let fill = shape.child_path(&["spPr", "solidFill", "srgbClr"])?;
    RGBColor::from_hex(fill.attr("val")?)
}

/// `p:txStyles` first-level size for a base placeholder type.
fn text_style_font_size(master_root: &Element, base: PlaceholderType) -> Option<f64> {
    let style = match base {
        PlaceholderType::Title => "titleStyle",
        PlaceholderType::Body => "bodyStyle",
        _ => "otherStyle",
    };
    font_size_of(master_root.child_path(&["txStyles", style, "lvl1pPr", "defRPr"])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::tree::new_sp_tree;

    fn placeholder(id: u32, ph: PlaceholderInfo) -> Element {
        Element::new("p:sp")
            .with_child(
                Element::new("p:nvSpPr")
                    .with_child(
                        Element::new("p:cNvPr")
                            .with_attr("id", id.to_string())
                            .with_attr("name", format!("Placeholder {}", id)),
                    )
                    .with_child(Element::new("p:cNvSpPr"))
                    .with_child(Element::new("p:nvPr").with_child(ph.to_element())),
            )
            .with_child(Element::new("p:spPr"))
    }

    fn with_xfrm(mut shape: Element, geometry: Geometry) -> Element {
        if let Some(sp_pr) = shape.child_mut("spPr") {
            sp_pr.push(geometry.to_xfrm("a:xfrm"));
        }
        shape
    }

    fn with_fill(mut shape: Element, hex: &str) -> Element {
        if let Some(sp_pr) = shape.child_mut("spPr") {
            sp_pr.push(
                Element::new("a:solidFill").with_child(Element::new("a:srgbClr").with_attr("val", hex)),
            );
        }
        shape
    }

    fn with_size(shape: Element, sz: &str) -> Element {
        shape.with_child(
            Element::new("p:txBody")
                .with_child(Element::new("a:bodyPr"))
                .with_child(
                    Element::new("a:lstStyle").with_child(
                        Element::new("a:lvl1pPr")
                            .with_child(Element::new("a:defRPr").with_attr("sz", sz)),
                    ),
                )
                .with_child(Element::new("a:p")),
        )
    }

    fn root(name: &str, shapes: Vec<Element>) -> Element {
        let mut tree = new_sp_tree();
        for shape in shapes {
            tree.push(shape);
        }
        Element::new(name).with_child(Element::new("p:cSld").with_child(tree))
    }

    const MASTER_TITLE: Geometry = Geometry::new(1, 2, 3, 4);
    const LAYOUT_TITLE: Geometry = Geometry::new(10, 20, 30, 40);

    fn master() -> Element {
        let mut master = root(
            "p:sldMaster",
            vec![
                with_size(
                    with_fill(
                        with_xfrm(placeholder(2, PlaceholderInfo::new(PlaceholderType::Title, 0)), MASTER_TITLE),
                        "112233",
                    ),
                    "4400",
                ),
                with_xfrm(
                    placeholder(3, PlaceholderInfo::new(PlaceholderType::Body, 1)),
                    Geometry::new(5, 6, 7, 8),
                ),
            ],
        );
        master.push(
            Element::new("p:txStyles").with_child(
                Element::new("p:bodyStyle").with_child(
                    Element::new("a:lvl1pPr").with_child(Element::new("a:defRPr").with_attr("sz", "2800")),
                ),
            ),
        );
        master
    }

    fn layout() -> Element {
        root(
            "p:sldLayout",
            vec![
                with_xfrm(
                    placeholder(2, PlaceholderInfo::new(PlaceholderType::CenterTitle, 0)),
                    LAYOUT_TITLE,
                ),
                placeholder(3, PlaceholderInfo::new(PlaceholderType::SubTitle, 1)),
            ],
        )
    }

    #[test]
    fn test_layout_wins_over_master() {
        let (master, layout) = (master(), layout());
        let shape = placeholder(5, PlaceholderInfo::new(PlaceholderType::CenterTitle, 0));
        let chain = InheritanceChain::for_slide_shape(&shape, Some(&layout), Some(&master)).unwrap();

        assert_eq!(chain.geometry(), Inherited::Layout(LAYOUT_TITLE));
        assert_eq!(chain.fill(), Inherited::Master(RGBColor::new(0x11, 0x22, 0x33)));
        assert_eq!(chain.font_size(), Inherited::Master(44.0));
        assert_eq!(chain.placeholder_type(), Inherited::Local(PlaceholderType::CenterTitle));
    }

    #[test]
    fn test_local_values_win() {
        let (master, layout) = (master(), layout());
        let local = Geometry::new(100, 100, 100, 100);
        let shape = with_size(
            with_xfrm(placeholder(5, PlaceholderInfo::new(PlaceholderType::CenterTitle, 0)), local),
            "3200",
        );
        let chain = InheritanceChain::for_slide_shape(&shape, Some(&layout), Some(&master)).unwrap();
        let resolved = chain.resolve_all();
        assert_eq!(resolved.geometry, Inherited::Local(local));
        assert_eq!(resolved.font_size, Inherited::Local(32.0));
    }

    #[test]
    fn test_idx_match_then_base_type() {
        let (master, layout) = (master(), layout());
        // No type on the slide: idx 1 finds the layout subtitle, whose base
        // type selects the master body.
        let shape = placeholder(6, PlaceholderInfo::new(PlaceholderType::Object, 1));
        let chain = InheritanceChain::for_slide_shape(&shape, Some(&layout), Some(&master)).unwrap();

        assert_eq!(chain.placeholder_type(), Inherited::Layout(PlaceholderType::SubTitle));
        assert_eq!(chain.geometry(), Inherited::Master(Geometry::new(5, 6, 7, 8)));
        assert_eq!(chain.fill(), Inherited::Unset);
        assert_eq!(chain.font_size(), Inherited::Master(28.0));
    }

    #[test]
    fn test_unmatched_is_unset() {
        let (master, layout) = (master(), layout());
        let shape = placeholder(7, PlaceholderInfo::new(PlaceholderType::Footer, 11));
        let chain = InheritanceChain::for_slide_shape(&shape, Some(&layout), Some(&master)).unwrap();
        assert!(chain.layout().is_none());
        assert!(chain.master().is_none());
        assert_eq!(chain.geometry(), Inherited::Unset);
        assert_eq!(chain.font_size(), Inherited::Unset);
    }

    #[test]
    fn test_layout_shape_starts_at_master() {
        let master = master();
        let shape = placeholder(3, PlaceholderInfo::new(PlaceholderType::SubTitle, 1));
        let chain = InheritanceChain::for_layout_shape(&shape, Some(&master)).unwrap();
        assert_eq!(chain.geometry(), Inherited::Master(Geometry::new(5, 6, 7, 8)));
    }

    #[test]
    fn test_non_placeholder_has_no_chain() {
        let shape = Element::new("p:sp").with_child(
            Element::new("p:nvSpPr").with_child(Element::new("p:cNvPr").with_attr("id", "9")),
        );
        assert!(InheritanceChain::for_slide_shape(&shape, None, None).is_none());
    }

    #[test]
    fn test_inherited_map() {
        assert_eq!(Inherited::Layout(2).map(|v| v * 10), Inherited::Layout(20));
        assert_eq!(Inherited::<i32>::Unset.map(|v| v * 10), Inherited::Unset);
    }
}
