/// Package implementation for PowerPoint presentations.
use crate::common::xml::Element;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::{OpcPackage, PackURI, Part, PartContent, RelTarget, SaveOptions};
use crate::ooxml::pptx::format::TextFormat;
use crate::ooxml::pptx::image::{ImageInfo, probe, sha1_hex};
use crate::ooxml::pptx::inherit::{InheritanceChain, ResolvedPlaceholder};
use crate::ooxml::pptx::parts::chart::{ChartData, ChartPart, chart_xml};
use crate::ooxml::pptx::parts::presentation::{
    PresentationPart, add_slide_id, move_slide_id, remove_slide_id,
};
use crate::ooxml::pptx::parts::slide::{
    BaseSlidePart, SlideLayoutPart, SlideMasterPart, SlidePart, new_slide_xml,
};
use crate::ooxml::pptx::shapes::base::{Geometry, Shape, new_placeholder, new_text_box};
use crate::ooxml::pptx::shapes::graphicframe::{ChartFrame, new_chart_frame};
use crate::ooxml::pptx::shapes::picture::{Picture, new_picture};
use crate::ooxml::pptx::shapes::placeholder::PlaceholderInfo;
use crate::ooxml::pptx::shapes::table::{Table, new_table, set_cell_text, table_of};
use crate::ooxml::pptx::shapes::textframe::{new_tx_body, set_text};
use crate::ooxml::pptx::shapes::tree::{ShapeTree, ShapeTreeMut, shape_name, sp_tree_of, sp_tree_of_mut};
use crate::ooxml::pptx::template;
use crate::ooxml::pptx::writer::excel_embed::generate_chart_excel_data;
use std::io::Read;
use std::path::Path;

const PRESENTATION_URI: &str = "/ppt/presentation.xml";
const SLIDE_TEMPLATE: &str = "/ppt/slides/slide%d.xml";
const CHART_TEMPLATE: &str = "/ppt/charts/chart%d.xml";
const WORKBOOK_TEMPLATE: &str = "/ppt/embeddings/Microsoft_Excel_Sheet%d.xlsx";

/// A PowerPoint (.pptx) package.
///
/// This is the main entry point for working with PowerPoint presentations.
/// It wraps an OPC package and keeps the presentation's parts, their
/// relationships and the content-type declarations consistent through every
/// edit. Slides, layouts and masters are addressed by partname; shapes by
/// their id within a part.
///
/// # Examples
///
/// ```rust
/// use litchi_pptx::ooxml::pptx::Package;
///
/// let mut pkg = Package::new()?;
/// let layout = pkg.layout_by_name("Title and Content")?.expect("built-in layout");
/// let slide = pkg.add_slide(&layout)?;
/// pkg.clone_layout_placeholders(&slide)?;
/// assert_eq!(pkg.slides()?, vec![slide]);
///
/// let bytes = pkg.to_bytes()?;
/// let reopened = Package::from_bytes(bytes)?;
/// assert_eq!(reopened.slides()?.len(), 1);
/// # Ok::<(), litchi_pptx::ooxml::OoxmlError>(())
/// ```
#[derive(Debug)]
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
    /// Reuse an embedded image with identical bytes instead of adding a part
    image_dedup: bool,
}

impl Package {
    /// Create an empty presentation from the built-in template: one master
    /// with four layouts, a theme, the presentation property parts and the
    /// document properties.
    pub fn new() -> Result<Self> {
        let mut opc = OpcPackage::new();
        let package = PackURI::package();

        let presentation = PackURI::new(PRESENTATION_URI)?;
        let master = PackURI::new("/ppt/slideMasters/slideMaster1.xml")?;
        let theme = PackURI::new("/ppt/theme/theme1.xml")?;
        let pres_props = PackURI::new("/ppt/presProps.xml")?;
        let view_props = PackURI::new("/ppt/viewProps.xml")?;
        let table_styles = PackURI::new("/ppt/tableStyles.xml")?;
        let core_props = PackURI::new("/docProps/core.xml")?;
        let app_props = PackURI::new("/docProps/app.xml")?;

        opc.add_part(Part::new_xml(
            presentation.clone(),
            ct::PML_PRESENTATION_MAIN,
            template::default_presentation()?,
        ))?;
        opc.add_part(Part::new_xml(
            master.clone(),
            ct::PML_SLIDE_MASTER,
            template::default_slide_master()?,
        ))?;
        opc.add_part(Part::new_xml(theme.clone(), ct::OFC_THEME, template::default_theme()?))?;
        opc.add_part(Part::new_xml(
            pres_props.clone(),
            ct::PML_PRES_PROPS,
            template::default_pres_props()?,
        ))?;
        opc.add_part(Part::new_xml(
            view_props.clone(),
            ct::PML_VIEW_PROPS,
            template::default_view_props()?,
        ))?;
        opc.add_part(Part::new_xml(
            table_styles.clone(),
            ct::PML_TABLE_STYLES,
            template::default_table_styles()?,
        ))?;
        opc.add_part(Part::new_xml(
            core_props.clone(),
            ct::OPC_CORE_PROPERTIES,
            template::core_props(chrono::Utc::now()),
        ))?;
        opc.add_part(Part::new_xml(
            app_props.clone(),
            ct::OFC_EXTENDED_PROPERTIES,
            template::default_app_props()?,
        ))?;

        // The template roots refer to these relationships by id, so the
        // order of creation matters: the master is rId1 of the presentation
        // and the layouts are rId1..rId4 of the master.
        opc.relate_to(&package, &presentation, rt::OFFICE_DOCUMENT)?;
        opc.relate_to(&package, &core_props, rt::CORE_PROPERTIES)?;
        opc.relate_to(&package, &app_props, rt::EXTENDED_PROPERTIES)?;

        opc.relate_to(&presentation, &master, rt::SLIDE_MASTER)?;
        opc.relate_to(&presentation, &theme, rt::THEME)?;
        opc.relate_to(&presentation, &pres_props, rt::PRES_PROPS)?;
        opc.relate_to(&presentation, &view_props, rt::VIEW_PROPS)?;
        opc.relate_to(&presentation, &table_styles, rt::TABLE_STYLES)?;

        for (n, layout_xml) in (1u32..).zip(template::default_slide_layouts()?) {
            let layout = PackURI::from_template("/ppt/slideLayouts/slideLayout%d.xml", n)?;
            opc.add_part(Part::new_xml(layout.clone(), ct::PML_SLIDE_LAYOUT, layout_xml))?;
            opc.add_relationship(&master, &layout, rt::SLIDE_LAYOUT)?;
            opc.relate_to(&layout, &master, rt::SLIDE_MASTER)?;
        }
        opc.relate_to(&master, &theme, rt::THEME)?;

        log::debug!("Created presentation from template with {} parts", opc.part_count());
        Ok(Self {
            opc,
            image_dedup: true,
        })
    }

    /// Open a .pptx package from a file path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use litchi_pptx::ooxml::pptx::Package;
    ///
    /// let pkg = Package::open("presentation.pptx")?;
    /// println!("{} slides", pkg.slides()?.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Create a .pptx package from its bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    /// Create a .pptx package from a reader.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use litchi_pptx::ooxml::pptx::Package;
    /// use std::io::Cursor;
    ///
    /// let data = std::fs::read("presentation.pptx")?;
    /// let pkg = Package::from_reader(Cursor::new(data))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    /// Wrap an OPC package whose main part is a presentation (regular,
    /// macro-enabled, template or slideshow).
    pub fn from_opc(opc: OpcPackage) -> Result<Self> {
        PresentationPart::from_part(opc.main_document_part()?)?;
        log::debug!("Opened presentation with {} parts", opc.part_count());
        Ok(Self {
            opc,
            image_dedup: true,
        })
    }

    /// Save atomically to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.opc.save(path)?)
    }

    pub fn save_with<P: AsRef<Path>>(&self, path: P, options: &SaveOptions) -> Result<()> {
        Ok(self.opc.save_with(path, options)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    pub fn to_bytes_with(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes_with(options)?)
    }

    /// Enable or disable reuse of identical embedded images (on by default).
    pub fn with_image_dedup(mut self, enabled: bool) -> Self {
        self.image_dedup = enabled;
        self
    }

    pub fn set_image_dedup(&mut self, enabled: bool) {
        self.image_dedup = enabled;
    }

    pub fn image_dedup(&self) -> bool {
        self.image_dedup
    }

    /// Get the underlying OPC package.
    ///
    /// This provides access to lower-level package operations.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }

    #[inline]
    pub fn opc_package_mut(&mut self) -> &mut OpcPackage {
        &mut self.opc
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// The main presentation part.
    pub fn presentation(&self) -> Result<PresentationPart<'_>> {
        PresentationPart::from_part(self.opc.main_document_part()?)
    }

    fn presentation_partname(&self) -> Result<PackURI> {
        Ok(self.opc.main_document_part()?.partname().clone())
    }

    /// Slide partnames in presentation order.
    pub fn slides(&self) -> Result<Vec<PackURI>> {
        Ok(self.presentation()?.slide_partnames())
    }

    pub fn slide_masters(&self) -> Result<Vec<PackURI>> {
        Ok(self.presentation()?.slide_master_partnames())
    }

    /// Layouts of every master, in master then list order.
    pub fn slide_layouts(&self) -> Result<Vec<PackURI>> {
        let mut layouts = Vec::new();
        for master in self.slide_masters()? {
            layouts.extend(self.slide_master(&master)?.slide_layout_partnames().into_iter().cloned());
        }
        Ok(layouts)
    }

    /// First layout whose `p:cSld/@name` is `name`.
    pub fn layout_by_name(&self, name: &str) -> Result<Option<PackURI>> {
        for layout in self.slide_layouts()? {
            if self.slide_layout(&layout)?.name() == Some(name) {
                return Ok(Some(layout));
            }
        }
        Ok(None)
    }

    pub fn slide(&self, partname: &PackURI) -> Result<SlidePart<'_>> {
        SlidePart::from_part(self.opc.get_part(partname)?)
    }

    pub fn slide_layout(&self, partname: &PackURI) -> Result<SlideLayoutPart<'_>> {
        SlideLayoutPart::from_part(self.opc.get_part(partname)?)
    }

    pub fn slide_master(&self, partname: &PackURI) -> Result<SlideMasterPart<'_>> {
        SlideMasterPart::from_part(self.opc.get_part(partname)?)
    }

    /// The layout a slide is based on.
    pub fn slide_layout_of(&self, slide: &PackURI) -> Result<PackURI> {
        Ok(self.opc.part_related_by(slide, rt::SLIDE_LAYOUT)?.partname().clone())
    }

    /// The master a layout inherits from.
    pub fn slide_master_of(&self, layout: &PackURI) -> Result<PackURI> {
        Ok(self.opc.part_related_by(layout, rt::SLIDE_MASTER)?.partname().clone())
    }

    /// Chart part view of a chart graphic frame on `slide`.
    pub fn chart_part_of(&self, slide: &PackURI, frame: &ChartFrame) -> Result<ChartPart<'_>> {
        let r_id = frame.r_id.as_deref().ok_or_else(|| {
            OoxmlError::InvalidFormat(format!("chart frame {} has no chart reference", frame.base.id))
        })?;
        ChartPart::from_part(self.opc.related_part(slide, r_id)?)
    }

    /// Image part embedded by `picture` on `slide`.
    pub fn image_part_of(&self, slide: &PackURI, picture: &Picture) -> Result<&Part> {
        let r_id = picture.image_r_id().ok_or_else(|| {
            OoxmlError::InvalidFormat(format!("picture {} embeds no image", picture.base.id))
        })?;
        Ok(self.opc.related_part(slide, r_id)?)
    }

    // ---------------------------------------------------------------------
    // Slides
    // ---------------------------------------------------------------------

    /// Append a new, empty slide based on `layout`.
    pub fn add_slide(&mut self, layout: &PackURI) -> Result<PackURI> {
        self.slide_layout(layout)?;
        let presentation = self.presentation_partname()?;

        let slide = self.opc.next_partname(SLIDE_TEMPLATE)?;
        self.opc
            .add_part(Part::new_xml(slide.clone(), ct::PML_SLIDE, new_slide_xml()))?;
        self.opc.relate_to(&slide, layout, rt::SLIDE_LAYOUT)?;
        let r_id = self.opc.add_relationship(&presentation, &slide, rt::SLIDE)?;
        let id = add_slide_id(xml_root_mut(self.opc.get_part_mut(&presentation)?)?, &r_id);

        log::debug!("Added slide {} (id {}, {}) on {}", slide, id, r_id, layout);
        Ok(slide)
    }

    /// Give `slide` empty copies of its layout's placeholders, slide
    /// furniture (date, footer, slide number) excepted. Returns the new
    /// shape ids.
    pub fn clone_layout_placeholders(&mut self, slide: &PackURI) -> Result<Vec<u32>> {
        let layout = self.slide_layout_of(slide)?;
        let sources: Vec<(PlaceholderInfo, String)> = self
            .shape_tree(&layout)?
            .placeholders()
            .into_iter()
            .filter(|(ph, _)| !ph.ph_type.is_slide_furniture())
            .map(|(ph, el)| (ph, shape_name(el).to_string()))
            .collect();

        let mut tree = self.shape_tree_mut(slide)?;
        let mut ids = Vec::with_capacity(sources.len());
        for (ph, name) in sources {
            let id = tree.view().next_shape_id();
            tree.append(new_placeholder(id, &name, ph));
            ids.push(id);
        }
        Ok(ids)
    }

    /// Move `slide` to position `new_index` of the slide list.
    pub fn move_slide(&mut self, slide: &PackURI, new_index: usize) -> Result<()> {
        let presentation = self.presentation_partname()?;
        let r_id = self.slide_r_id(&presentation, slide)?;
        let ids = self.presentation()?.slide_ids();
        let count = ids.len();
        if new_index >= count {
            return Err(OoxmlError::SlideIndexOutOfRange {
                index: new_index,
                count,
            });
        }
        let from = ids
            .iter()
            .position(|s| s.r_id == r_id)
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("{} is not in the slide list", slide)))?;

        move_slide_id(xml_root_mut(self.opc.get_part_mut(&presentation)?)?, from, new_index);
        Ok(())
    }

    /// Remove a slide from the presentation, together with every part only
    /// it used (notes, images, charts, workbooks). Returns the removed
    /// partnames.
    pub fn remove_slide(&mut self, slide: &PackURI) -> Result<Vec<PackURI>> {
        let presentation = self.presentation_partname()?;
        let r_id = self.slide_r_id(&presentation, slide)?;

        remove_slide_id(xml_root_mut(self.opc.get_part_mut(&presentation)?)?, &r_id);
        self.opc.drop_rel(&presentation, &r_id)?;
        let purged = self.opc.purge_unreachable();

        log::debug!("Removed slide {}, purged {} parts", slide, purged.len());
        Ok(purged)
    }

    fn slide_r_id(&self, presentation: &PackURI, slide: &PackURI) -> Result<String> {
        self.opc
            .rels_of(presentation)?
            .targeting(slide)
            .find(|rel| rel.reltype() == rt::SLIDE)
            .map(|rel| rel.r_id().to_string())
            .ok_or_else(|| {
                OoxmlError::Opc(OpcError::RelationshipNotFound(format!(
                    "no slide relationship from {} to {}",
                    presentation, slide
                )))
            })
    }

    // ---------------------------------------------------------------------
    // Shapes
    // ---------------------------------------------------------------------

    fn shape_tree(&self, partname: &PackURI) -> Result<ShapeTree<'_>> {
        let root = xml_root(self.opc.get_part(partname)?)?;
        sp_tree_of(root)
            .map(ShapeTree::new)
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("{} has no shape tree", partname)))
    }

    fn shape_tree_mut(&mut self, partname: &PackURI) -> Result<ShapeTreeMut<'_>> {
        let root = xml_root_mut(self.opc.get_part_mut(partname)?)?;
        sp_tree_of_mut(root)
            .map(ShapeTreeMut::new)
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("{} has no shape tree", partname)))
    }

    /// Shapes of a slide, layout or master, in z-order.
    pub fn shapes(&self, partname: &PackURI) -> Result<Vec<Shape>> {
        Ok(self.shape_tree(partname)?.shapes())
    }

    /// Shape with `shape_id`, searching inside groups too.
    pub fn shape(&self, partname: &PackURI, shape_id: u32) -> Result<Shape> {
        self.shape_tree(partname)?
            .find(shape_id)
            .ok_or_else(|| shape_not_found(partname, shape_id))
    }

    /// Add a text box. Returns its shape id.
    pub fn add_text_box(
        &mut self,
        slide: &PackURI,
        geometry: Geometry,
        text: &str,
        format: Option<&TextFormat>,
    ) -> Result<u32> {
        let mut tree = self.shape_tree_mut(slide)?;
        let id = tree.view().next_shape_id();
        tree.append(new_text_box(id, &format!("TextBox {}", id - 1), geometry, text, format));
        Ok(id)
    }

    /// Add a picture at `position`. Without a `size` the image keeps its
    /// native size at 72 dpi.
    ///
    /// The image is measured before anything changes; bytes the codec cannot
    /// read fail with [`OoxmlError::UnsupportedFormat`].
    pub fn add_picture(
        &mut self,
        slide: &PackURI,
        image: &[u8],
        position: (i64, i64),
        size: Option<(i64, i64)>,
    ) -> Result<Picture> {
        let info = probe(image)?;
        self.shape_tree(slide)?;

        let image_part = self.image_part_for(image, &info)?;
        let r_id = self.opc.relate_to(slide, &image_part, rt::IMAGE)?;
        let (cx, cy) = size.unwrap_or_else(|| info.native_size());

        let mut tree = self.shape_tree_mut(slide)?;
        let id = tree.view().next_shape_id();
        let pic = new_picture(
            id,
            &format!("Picture {}", id - 1),
            "",
            &r_id,
            Geometry::new(position.0, position.1, cx, cy),
        );
        let snapshot = Picture::from_element(&pic);
        tree.append(pic);

        log::debug!("Added picture {} on {} embedding {}", id, slide, image_part);
        snapshot.ok_or_else(|| OoxmlError::InvalidFormat(format!("picture {} is malformed", id)))
    }

    /// Image part holding `bytes`: an identical existing one when
    /// de-duplication is on, otherwise a new `/ppt/media/imageN.ext`.
    fn image_part_for(&mut self, bytes: &[u8], info: &ImageInfo) -> Result<PackURI> {
        if self.image_dedup {
            let hash = sha1_hex(bytes);
            if let Some(existing) = self
                .opc
                .iter_parts()
                .filter(|part| part.content_type().starts_with("image/"))
                .find(|part| sha1_hex(&part.blob()) == hash)
            {
                log::debug!("Reusing {} for identical image", existing.partname());
                return Ok(existing.partname().clone());
            }
        }

        let partname = self
            .opc
            .next_partname(&format!("/ppt/media/image%d.{}", info.format.extension()))?;
        self.opc.add_part(Part::new_blob(
            partname.clone(),
            info.format.content_type(),
            bytes.to_vec(),
        ))?;
        Ok(partname)
    }

    /// Add an empty `rows` × `cols` table.
    ///
    /// Fails with [`OoxmlError::InvalidDimensions`] when either count is
    /// zero, before anything changes.
    pub fn add_table(&mut self, slide: &PackURI, rows: usize, cols: usize, geometry: Geometry) -> Result<Table> {
        let mut tree = self.shape_tree_mut(slide)?;
        let id = tree.view().next_shape_id();
        let frame = new_table(id, &format!("Table {}", id - 1), rows, cols, geometry)?;
        let snapshot = Table::from_element(&frame);
        tree.append(frame);
        snapshot.ok_or_else(|| OoxmlError::InvalidFormat(format!("table {} is malformed", id)))
    }

    /// Add a chart of `data`: a chart part, the workbook holding its data
    /// and a graphic frame showing it.
    pub fn add_chart(&mut self, slide: &PackURI, data: &ChartData, geometry: Geometry) -> Result<ChartFrame> {
        self.shape_tree(slide)?;
        let workbook = generate_chart_excel_data(data)?;

        let workbook_part = self.opc.next_partname(WORKBOOK_TEMPLATE)?;
        let chart_partname = self.opc.next_partname(CHART_TEMPLATE)?;

        let mut chart_part = Part::new_xml(chart_partname.clone(), ct::DML_CHART, Element::new("c:chartSpace"));
        let workbook_r_id = chart_part
            .rels_mut()
            .add(rt::PACKAGE, RelTarget::Part(workbook_part.clone()));
        chart_part.set_content(PartContent::Xml(Element::parse(&chart_xml(data, &workbook_r_id)?)?));

        self.opc
            .add_part(Part::new_blob(workbook_part, ct::SML_SHEET, workbook))?;
        self.opc.add_part(chart_part)?;
        let r_id = self.opc.relate_to(slide, &chart_partname, rt::CHART)?;

        let mut tree = self.shape_tree_mut(slide)?;
        let id = tree.view().next_shape_id();
        let frame = new_chart_frame(id, &format!("Chart {}", id - 1), &r_id, geometry);
        let snapshot = ChartFrame::from_element(&frame);
        tree.append(frame);

        log::debug!("Added {:?} chart {} on {}", data.chart_type, chart_partname, slide);
        snapshot.ok_or_else(|| OoxmlError::InvalidFormat(format!("chart frame {} is malformed", id)))
    }

    /// Delete a shape. Relationships only it referenced are dropped and the
    /// parts that became unreachable are removed; their names are returned.
    pub fn remove_shape(&mut self, partname: &PackURI, shape_id: u32) -> Result<Vec<PackURI>> {
        let removed = self
            .shape_tree_mut(partname)?
            .remove(shape_id)
            .ok_or_else(|| shape_not_found(partname, shape_id))?;

        let mut r_ids: Vec<String> = Vec::new();
        removed.walk(&mut |el: &Element| {
            for (name, value) in el.attrs() {
                if name.starts_with("r:") && !r_ids.contains(value) {
                    r_ids.push(value.clone());
                }
            }
        });
        for r_id in &r_ids {
            if self.opc.get_part(partname)?.rel_ref_count(r_id) == 0 {
                self.opc.drop_rel(partname, r_id)?;
            }
        }
        let purged = self.opc.purge_unreachable();

        log::debug!(
            "Removed shape {} from {}, purged {} parts",
            shape_id,
            partname,
            purged.len()
        );
        Ok(purged)
    }

    /// Replace the text of a text-bearing shape, one paragraph per line.
    pub fn set_shape_text(&mut self, partname: &PackURI, shape_id: u32, text: &str) -> Result<()> {
        let mut tree = self.shape_tree_mut(partname)?;
        let shape = tree
            .element_mut(shape_id)
            .ok_or_else(|| shape_not_found(partname, shape_id))?;
        if shape.local_name() != "sp" {
            return Err(OoxmlError::NoTextFrame(shape_id));
        }
        if shape.child("txBody").is_none() {
            let position = shape
                .elements()
                .position(|e| e.local_name() == "extLst")
                .unwrap_or_else(|| shape.elements().count());
            shape.insert_element(position, new_tx_body("p:txBody", text, None));
            return Ok(());
        }
        if let Some(tx_body) = shape.child_mut("txBody") {
            set_text(tx_body, text);
        }
        Ok(())
    }

    pub fn set_table_cell_text(
        &mut self,
        partname: &PackURI,
        shape_id: u32,
        row: usize,
        col: usize,
        text: &str,
    ) -> Result<()> {
        let mut tree = self.shape_tree_mut(partname)?;
        let frame = tree
            .element_mut(shape_id)
            .ok_or_else(|| shape_not_found(partname, shape_id))?;
        if table_of(frame).is_none() {
            return Err(OoxmlError::InvalidFormat(format!("shape {} is not a table", shape_id)));
        }
        if !set_cell_text(frame, row, col, text) {
            return Err(OoxmlError::CellOutOfRange { shape_id, row, col });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Inheritance
    // ---------------------------------------------------------------------

    /// Resolve the inherited properties of a placeholder on a slide, layout
    /// or master.
    pub fn resolve_placeholder(&self, partname: &PackURI, shape_id: u32) -> Result<ResolvedPlaceholder> {
        let part = self.opc.get_part(partname)?;
        let shape = sp_tree_of(xml_root(part)?)
            .and_then(|tree| ShapeTree::new(tree).element(shape_id))
            .ok_or_else(|| shape_not_found(partname, shape_id))?;

        let chain = match part.content_type() {
            ct::PML_SLIDE => {
                let layout = self.related_if_any(partname, rt::SLIDE_LAYOUT)?;
                let master = match layout {
                    Some(l) => self.related_if_any(l.partname(), rt::SLIDE_MASTER)?,
                    None => None,
                };
                InheritanceChain::for_slide_shape(
                    shape,
                    layout.and_then(Part::xml),
                    master.and_then(Part::xml),
                )
            },
            ct::PML_SLIDE_LAYOUT => {
                let master = self.related_if_any(partname, rt::SLIDE_MASTER)?;
                InheritanceChain::for_layout_shape(shape, master.and_then(Part::xml))
            },
            _ => InheritanceChain::for_layout_shape(shape, None),
        };
        chain
            .map(|chain| chain.resolve_all())
            .ok_or(OoxmlError::NotAPlaceholder(shape_id))
    }

    /// The part `source` relates to by `reltype`, or `None` when it has no
    /// such relationship. Several matches or a broken target are errors.
    fn related_if_any(&self, source: &PackURI, reltype: &str) -> Result<Option<&Part>> {
        match self.opc.part_related_by(source, reltype) {
            Ok(part) => Ok(Some(part)),
            Err(OpcError::RelationshipNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn shape_not_found(partname: &PackURI, shape_id: u32) -> OoxmlError {
    OoxmlError::ShapeNotFound {
        partname: partname.to_string(),
        shape_id,
    }
}

fn xml_root(part: &Part) -> Result<&Element> {
    part.xml()
        .ok_or_else(|| OoxmlError::InvalidFormat(format!("{} is not XML", part.partname())))
}

fn xml_root_mut(part: &mut Part) -> Result<&mut Element> {
    let partname = part.partname().to_string();
    part.xml_mut()
        .ok_or_else(|| OoxmlError::InvalidFormat(format!("{} is not XML", partname)))
}
