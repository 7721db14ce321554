/// Picture shapes (`p:pic`).
use crate::common::xml::Element;
use crate::ooxml::pptx::shapes::base::{Geometry, ShapeBase};

/// A picture referencing an image part through `a:blip/@r:embed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub base: ShapeBase,
    /// Relationship id of the embedded image
    pub r_embed: Option<String>,
    /// Alternative text
    pub description: Option<String>,
}

impl Picture {
    pub fn from_element(pic: &Element) -> Option<Self> {
        let base = ShapeBase::from_element(pic)?;
        let r_embed = pic
            .child_path(&["blipFill", "blip"])
            .and_then(|blip| blip.attr("r:embed"))
            .map(str::to_string);
        let description = pic
            .child_path(&["nvPicPr", "cNvPr"])
            .and_then(|c| c.attr("descr"))
            .map(str::to_string);
        Some(Self {
            base,
            r_embed,
            description,
        })
    }

    /// Relationship id of the image, if the picture embeds one.
    pub fn image_r_id(&self) -> Option<&str> {
        self.r_embed.as_deref()
    }
}

/// Build a `p:pic` element stretching the image `r_id` over `geometry`.
pub fn new_picture(id: u32, name: &str, description: &str, r_id: &str, geometry: Geometry) -> Element {
    let nv_pic_pr = Element::new("p:nvPicPr")
        .with_child(
            Element::new("p:cNvPr")
                .with_attr("id", id.to_string())
                .with_attr("name", name)
                .with_attr("descr", description),
        )
        .with_child(
            Element::new("p:cNvPicPr").with_child(
                Element::new("a:picLocks").with_attr("noChangeAspect", "1"),
            ),
        )
        .with_child(Element::new("p:nvPr"));

    let blip_fill = Element::new("p:blipFill")
        .with_child(Element::new("a:blip").with_attr("r:embed", r_id))
        .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect")));

    let sp_pr = Element::new("p:spPr")
        .with_child(geometry.to_xfrm("a:xfrm"))
        .with_child(
            Element::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(Element::new("a:avLst")),
        );

    Element::new("p:pic")
        .with_child(nv_pic_pr)
        .with_child(blip_fill)
        .with_child(sp_pr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_picture_parses_back() {
        let geometry = Geometry::new(100, 200, 300, 400);
        let el = new_picture(7, "Picture 6", "logo.png", "rId3", geometry);
        let pic = Picture::from_element(&el).unwrap();
        assert_eq!(pic.base.id, 7);
        assert_eq!(pic.base.name, "Picture 6");
        assert_eq!(pic.base.geometry, Some(geometry));
        assert_eq!(pic.image_r_id(), Some("rId3"));
        assert_eq!(pic.description.as_deref(), Some("logo.png"));
    }

    #[test]
    fn test_picture_without_blip() {
        let el = Element::new("p:pic").with_child(
            Element::new("p:nvPicPr").with_child(
                Element::new("p:cNvPr").with_attr("id", "4").with_attr("name", "Empty"),
            ),
        );
        let pic = Picture::from_element(&el).unwrap();
        assert_eq!(pic.image_r_id(), None);
        assert_eq!(pic.base.geometry, None);
    }
}
