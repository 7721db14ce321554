/// Shape trees (`p:cSld/p:spTree`).
use crate::common::xml::Element;
use crate::ooxml::pptx::shapes::base::{Shape, c_nv_pr, shape_id};
use crate::ooxml::pptx::shapes::placeholder::{PlaceholderInfo, PlaceholderType};
use std::collections::BTreeSet;

/// Children of a tree that are properties rather than shapes.
fn is_tree_property(el: &Element) -> bool {
    matches!(el.local_name(), "nvGrpSpPr" | "grpSpPr" | "extLst")
}

/// The shape tree of a slide, layout or master root element.
pub fn sp_tree_of(root: &Element) -> Option<&Element> {
    root.child_path(&["cSld", "spTree"])
}

pub fn sp_tree_of_mut(root: &mut Element) -> Option<&mut Element> {
    root.child_path_mut(&["cSld", "spTree"])
}

/// Read access to a shape tree.
#[derive(Debug, Clone, Copy)]
pub struct ShapeTree<'a> {
    sp_tree: &'a Element,
}

impl<'a> ShapeTree<'a> {
    pub fn new(sp_tree: &'a Element) -> Self {
        Self { sp_tree }
    }

    /// Top-level shape elements in z-order.
    pub fn shape_elements(&self) -> impl Iterator<Item = &'a Element> + 'a {
        self.sp_tree.elements().filter(|e| !is_tree_property(e))
    }

    /// Top-level shapes in z-order.
    pub fn shapes(&self) -> Vec<Shape> {
        self.shape_elements().filter_map(Shape::from_element).collect()
    }

    /// Shape element with `id`, searching inside groups too.
    pub fn element(&self, id: u32) -> Option<&'a Element> {
        find_by_id(self.sp_tree, id)
    }

    pub fn find(&self, id: u32) -> Option<Shape> {
        self.element(id).and_then(Shape::from_element)
    }

    /// Top-level placeholder elements with their identity.
    pub fn placeholders(&self) -> Vec<(PlaceholderInfo, &'a Element)> {
        self.shape_elements()
            .filter_map(|el| PlaceholderInfo::from_shape(el).map(|ph| (ph, el)))
            .collect()
    }

    pub fn placeholder_by_idx(&self, idx: u32) -> Option<&'a Element> {
        self.placeholders()
            .into_iter()
            .find(|(ph, _)| ph.idx == idx)
            .map(|(_, el)| el)
    }

    pub fn placeholder_by_type(&self, ph_type: PlaceholderType) -> Option<&'a Element> {
        self.placeholders()
            .into_iter()
            .find(|(ph, _)| ph.ph_type == ph_type)
            .map(|(_, el)| el)
    }

    /// Highest `cNvPr/@id` anywhere in the tree, the tree's own included.
    pub fn max_shape_id(&self) -> u32 {
        self.used_shape_ids().last().copied().unwrap_or(0)
    }

    /// Id for a new shape: one past the highest id in use, or the lowest
    /// unused id once the highest is `u32::MAX`.
    pub fn next_shape_id(&self) -> u32 {
        let used = self.used_shape_ids();
        match used.last() {
            None => 1,
            Some(&max) => max
                .checked_add(1)
                .or_else(|| (1..=u32::MAX).find(|id| !used.contains(id)))
                .unwrap_or(1),
        }
    }

    fn used_shape_ids(&self) -> BTreeSet<u32> {
        let mut ids = BTreeSet::new();
        self.sp_tree.walk(&mut |el| {
            if el.local_name() == "cNvPr"
                && let Some(id) = el.attr("id").and_then(|v| v.parse::<u32>().ok())
            {
                ids.insert(id);
            }
        });
        ids
    }
}

fn find_by_id(parent: &Element, id: u32) -> Option<&Element> {
    for el in parent.elements().filter(|e| !is_tree_property(e)) {
        if shape_id(el) == Some(id) {
            return Some(el);
        }
        if el.local_name() == "grpSp"
            && let Some(found) = find_by_id(el, id)
        {
            return Some(found);
        }
    }
    None
}

/// Write access to a shape tree.
#[derive(Debug)]
pub struct ShapeTreeMut<'a> {
    sp_tree: &'a mut Element,
}

impl<'a> ShapeTreeMut<'a> {
    pub fn new(sp_tree: &'a mut Element) -> Self {
        Self { sp_tree }
    }

    pub fn view(&self) -> ShapeTree<'_> {
        ShapeTree::new(self.sp_tree)
    }

    /// Append a shape on top of the z-order, ahead of any `p:extLst`.
    pub fn append(&mut self, shape: Element) {
        let position = self
            .sp_tree
            .elements()
            .position(|e| e.local_name() == "extLst")
            .unwrap_or_else(|| self.sp_tree.elements().count());
        self.sp_tree.insert_element(position, shape);
    }

    /// Shape element with `id`, searching inside groups too.
    pub fn element_mut(&mut self, id: u32) -> Option<&mut Element> {
        find_by_id_mut(self.sp_tree, id)
    }

    /// Detach the shape with `id` and return it.
    pub fn remove(&mut self, id: u32) -> Option<Element> {
        remove_by_id(self.sp_tree, id)
    }

    /// Rename a shape, keeping its id.
    pub fn rename(&mut self, id: u32, name: &str) -> bool {
        let Some(shape) = self.element_mut(id) else {
            return false;
        };
        match shape
            .elements_mut()
            .find(|e| e.local_name().starts_with("nv"))
            .and_then(|nv| nv.child_mut("cNvPr"))
        {
            Some(c_nv_pr) => {
                c_nv_pr.set_attr("name", name);
                true
            },
            None => false,
        }
    }
}

fn find_by_id_mut(parent: &mut Element, id: u32) -> Option<&mut Element> {
    for el in parent.elements_mut() {
        if is_tree_property(el) {
            continue;
        }
        if shape_id(el) == Some(id) {
            return Some(el);
        }
        if el.local_name() == "grpSp"
            && let Some(found) = find_by_id_mut(el, id)
        {
            return Some(found);
        }
    }
    None
}

fn remove_by_id(parent: &mut Element, id: u32) -> Option<Element> {
    let mut removed = parent.remove_elements(|e| !is_tree_property(e) && shape_id(e) == Some(id));
    if let Some(shape) = removed.pop() {
        return Some(shape);
    }
    parent
        .elements_mut()
        .filter(|e| e.local_name() == "grpSp")
        .find_map(|group| remove_by_id(group, id))
}

/// Shape name from its `cNvPr`, for diagnostics.
pub fn shape_name(shape: &Element) -> &str {
    c_nv_pr(shape).and_then(|c| c.attr("name")).unwrap_or_default()
}

/// An empty shape tree with its mandatory group properties.
pub fn new_sp_tree() -> Element {
    let xfrm = Element::new("a:xfrm")
        .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
        .with_child(Element::new("a:ext").with_attr("cx", "0").with_attr("cy", "0"))
        .with_child(Element::new("a:chOff").with_attr("x", "0").with_attr("y", "0"))
        .with_child(Element::new("a:chExt").with_attr("cx", "0").with_attr("cy", "0"));
    Element::new("p:spTree")
        .with_child(
            Element::new("p:nvGrpSpPr")
                .with_child(Element::new("p:cNvPr").with_attr("id", "1").with_attr("name", ""))
                .with_child(Element::new("p:cNvGrpSpPr"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(Element::new("p:grpSpPr").with_child(xfrm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::base::Geometry;
    use crate::ooxml::pptx::shapes::picture::new_picture;

    fn placeholder(id: u32, ph: PlaceholderInfo) -> Element {
        Element::new("p:sp").with_child(
            Element::new("p:nvSpPr")
                .with_child(
                    Element::new("p:cNvPr")
                        .with_attr("id", id.to_string())
                        .with_attr("name", format!("Placeholder {}", id)),
                )
                .with_child(Element::new("p:cNvSpPr"))
                .with_child(Element::new("p:nvPr").with_child(ph.to_element())),
        )
    }

    #[test]
    fn test_empty_tree() {
        let tree = new_sp_tree();
        let view = ShapeTree::new(&tree);
        assert!(view.shapes().is_empty());
        assert_eq!(view.next_shape_id(), 2);
    }

    #[test]
    fn test_append_and_find() {
        let mut tree = new_sp_tree();
        tree.push(Element::new("p:extLst"));
        let mut tree_mut = ShapeTreeMut::new(&mut tree);
        let id = tree_mut.view().next_shape_id();
        tree_mut.append(new_picture(id, "Picture 1", "", "rId2", Geometry::default()));

        assert_eq!(tree.elements().last().unwrap().local_name(), "extLst");
        let view = ShapeTree::new(&tree);
        assert_eq!(view.shapes().len(), 1);
        assert!(matches!(view.find(2), Some(Shape::Picture(_))));
        assert_eq!(view.next_shape_id(), 3);
    }

    #[test]
    fn test_next_id_after_max_reuses_lowest_free() {
        let mut tree = new_sp_tree();
        tree.push(placeholder(3, PlaceholderInfo::new(PlaceholderType::Body, 1)));
        tree.push(placeholder(u32::MAX, PlaceholderInfo::new(PlaceholderType::Title, 0)));
        let view = ShapeTree::new(&tree);
        assert_eq!(view.max_shape_id(), u32::MAX);
        // the tree's own cNvPr holds id 1
        assert_eq!(view.next_shape_id(), 2);
    }

    #[test]
    fn test_placeholder_lookup() {
        let mut tree = new_sp_tree();
        tree.push(placeholder(2, PlaceholderInfo::new(PlaceholderType::Title, 0)));
        tree.push(placeholder(3, PlaceholderInfo::new(PlaceholderType::Body, 1)));
        let view = ShapeTree::new(&tree);

        assert_eq!(view.placeholders().len(), 2);
        assert_eq!(view.placeholder_by_idx(1).and_then(shape_id), Some(3));
        assert_eq!(
            view.placeholder_by_type(PlaceholderType::Title).and_then(shape_id),
            Some(2)
        );
        assert!(view.placeholder_by_type(PlaceholderType::Footer).is_none());
    }

    #[test]
    fn test_remove_inside_group() {
        let mut tree = new_sp_tree();
        let group = Element::new("p:grpSp")
            .with_child(
                Element::new("p:nvGrpSpPr")
                    .with_child(Element::new("p:cNvPr").with_attr("id", "10").with_attr("name", "G")),
            )
            .with_child(new_picture(11, "Inner", "", "rId1", Geometry::default()));
        tree.push(group);

        let mut tree_mut = ShapeTreeMut::new(&mut tree);
        assert!(tree_mut.rename(11, "Renamed"));
        let removed = tree_mut.remove(11).unwrap();
        assert_eq!(shape_name(&removed), "Renamed");
        assert!(tree_mut.remove(11).is_none());

        let view = ShapeTree::new(&tree);
        assert!(view.element(10).is_some());
        assert!(view.element(11).is_none());
    }
}
