//! Output page writing
//!
//! [`PdfPageSink`] assembles the rescaled document. Each output page holds
//! its source page as a Form XObject, drawn with a single `cm` transform.

use crate::constants::OUTPUT_PDF_VERSION;
use crate::rewrite::PageSink;
use crate::scale::Placement;
use crate::types::{Dimensions, RescaleError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::xobject::{PageContent, copy_object_deep, create_page_xobject};

/// A page that has been started but not yet written
struct PendingPage {
    size: Dimensions,
    content_ops: Vec<String>,
    xobjects: Dictionary,
}

/// Writes rescaled pages into a new lopdf document
pub struct PdfPageSink<'a> {
    source: &'a Document,
    output: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    page_size: Dimensions,
    current: Option<PendingPage>,
    xobject_cache: HashMap<ObjectId, ObjectId>,
}

impl<'a> PdfPageSink<'a> {
    /// Create a sink copying resources out of `source`.
    pub fn new(source: &'a Document, page_size: Dimensions) -> Self {
        let mut output = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_tree_id = output.new_object_id();

        Self {
            source,
            output,
            pages_tree_id,
            page_refs: Vec::new(),
            page_size,
            current: None,
            xobject_cache: HashMap::new(),
        }
    }

    /// Write the last page, the page tree and the catalog.
    pub fn finish(mut self) -> Result<Document> {
        self.flush_page();

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        if let Ok(info) = self.source.trailer.get(b"Info") {
            let info = copy_object_deep(
                &mut self.output,
                self.source,
                info,
                &mut self.xobject_cache,
            )?;
            self.output.trailer.set("Info", info);
        }

        Ok(self.output)
    }

    fn flush_page(&mut self) {
        let Some(page) = self.current.take() else {
            return;
        };

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(page.xobjects));

        let content = page.content_ops.join("");
        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_tree_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.size.width),
                    Object::Real(page.size.height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);

        let page_id = self.output.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
    }
}

impl PageSink for PdfPageSink<'_> {
    type Content = PageContent;

    fn set_page_size(&mut self, size: Dimensions) -> Result<()> {
        if !size.is_positive() {
            return Err(RescaleError::PageWriteFailed(format!(
                "invalid page size {} x {}",
                size.width, size.height
            )));
        }
        self.page_size = size;
        Ok(())
    }

    fn begin_new_page(&mut self) -> Result<()> {
        self.flush_page();
        self.current = Some(PendingPage {
            size: self.page_size,
            content_ops: Vec::new(),
            xobjects: Dictionary::new(),
        });
        Ok(())
    }

    fn place_content(&mut self, content: PageContent, placement: &Placement) -> Result<()> {
        let page = self.current.as_mut().ok_or_else(|| {
            RescaleError::PageWriteFailed("content placed before a page was started".to_string())
        })?;

        let xobject_id = create_page_xobject(
            &mut self.output,
            self.source,
            &content,
            &mut self.xobject_cache,
        )?;
        let xobject_name = format!("P{}", page.xobjects.len());
        page.xobjects
            .set(xobject_name.as_bytes(), Object::Reference(xobject_id));
        page.content_ops.push(generate_placement_command(
            &xobject_name,
            &content,
            placement,
        ));

        Ok(())
    }
}

/// Generate the content stream command that draws a placed page.
///
/// The XObject keeps the source coordinate space, so the box origin is
/// shifted onto the placement corner after scaling.
fn generate_placement_command(
    xobject_name: &str,
    content: &PageContent,
    placement: &Placement,
) -> String {
    let tx = placement.x - content.bbox[0] * placement.scale_x;
    let ty = placement.y - content.bbox[1] * placement.scale_y;
    format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        placement.scale_x, placement.scale_y, tx, ty, xobject_name
    )
}
