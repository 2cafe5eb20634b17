//! Reading source pages and turning them into Form XObjects
//!
//! Source pages are read into [`PageContent`] values by [`PdfPageSource`].
//! The sink then copies each one into the output document as a Form
//! XObject that can be placed with a transformation.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::rewrite::PageSource;
use crate::types::{Dimensions, RescaleError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Guards against cycles in malformed page trees
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Stream filters lopdf can decode
const DECODABLE_FILTERS: [&[u8]; 3] = [b"FlateDecode", b"LZWDecode", b"ASCII85Decode"];

/// One source page, read but not yet copied into the output document
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Object ID of the page in the source document
    pub page_id: ObjectId,
    /// Visible box of the page as [llx, lly, urx, ury]
    pub bbox: [f32; 4],
    /// Decompressed, concatenated content streams
    pub data: Vec<u8>,
    /// Page resources, still referring to source objects
    pub resources: Option<Object>,
}

impl PageContent {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.bbox[2] - self.bbox[0], self.bbox[3] - self.bbox[1])
    }
}

/// Pages of a loaded lopdf document, in page-tree order
pub struct PdfPageSource<'a> {
    document: &'a Document,
    page_ids: Vec<ObjectId>,
}

impl<'a> PdfPageSource<'a> {
    pub fn new(document: &'a Document) -> Self {
        let page_ids = document.get_pages().values().copied().collect();
        Self { document, page_ids }
    }
}

impl PageSource for PdfPageSource<'_> {
    type Content = PageContent;

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn import_page(&mut self, index: usize) -> Result<(PageContent, Dimensions)> {
        let page_id = *self
            .page_ids
            .get(index)
            .ok_or_else(|| RescaleError::PageImportFailed {
                index,
                cause: format!("document has only {} pages", self.page_ids.len()),
            })?;

        let content = read_page(self.document, page_id).map_err(|e| {
            RescaleError::PageImportFailed {
                index,
                cause: e.to_string(),
            }
        })?;
        let size = content.dimensions();
        Ok((content, size))
    }
}

/// Read a source page's box, content and resources
pub fn read_page(doc: &Document, page_id: ObjectId) -> Result<PageContent> {
    let page_dict = doc.get_dictionary(page_id)?;

    Ok(PageContent {
        page_id,
        bbox: get_page_box(doc, page_id),
        data: get_page_content(doc, page_dict)?,
        resources: find_inherited(doc, page_id, b"Resources").cloned(),
    })
}

/// Create a Form XObject in `output` from a source page.
///
/// Resources are deep copied; `cache` maps source object IDs to their
/// copies so objects shared between pages are only copied once.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page: &PageContent,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set(
        "BBox",
        Object::Array(page.bbox.iter().map(|&v| Object::Real(v)).collect()),
    );
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = &page.resources {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, page.data.clone())))
}

// =============================================================================
// Page Geometry
// =============================================================================

/// Get source page dimensions in points
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Dimensions {
    let [llx, lly, urx, ury] = get_page_box(doc, page_id);
    Dimensions::new(urx - llx, ury - lly)
}

/// Visible box of a page: CropBox, then MediaBox, then US Letter
fn get_page_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .into_iter()
        .find_map(|key| find_inherited(doc, page_id, key).and_then(|obj| parse_box(doc, obj)))
        .unwrap_or_else(default_page_box)
}

fn default_page_box() -> [f32; 4] {
    [0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1]
}

/// Parse a rectangle array, normalizing it so that llx <= urx and lly <= ury
fn parse_box(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let array = resolve(doc, obj).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let mut values = [0.0; 4];
    for (value, item) in values.iter_mut().zip(array) {
        *value = extract_number(resolve(doc, item))?;
    }

    let [x0, y0, x1, y1] = values;
    Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

/// Look up a page attribute, walking up the page tree for inheritable keys
fn find_inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node_id = page_id;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Follow a reference, leaving direct objects as they are
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            Object::Stream(stream) => stream_data(doc, stream),
            _ => Ok(Vec::new()),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            if let Ok(stream) = doc.get_object(*id)?.as_stream() {
                result.extend_from_slice(&stream_data(doc, stream)?);
                result.push(b'\n');
            }
        }
    }

    Ok(result)
}

/// Decoded bytes of a content stream.
///
/// Unfiltered streams are returned as they are. A filter lopdf cannot
/// decode is an error; the encoded bytes are never passed on as content.
fn stream_data(doc: &Document, stream: &Stream) -> Result<Vec<u8>> {
    let filters = match stream.dict.get(b"Filter") {
        Ok(filter) => filter_names(doc, filter)?,
        Err(_) => return Ok(stream.content.clone()),
    };

    if let Some(name) = filters
        .iter()
        .copied()
        .find(|name| !DECODABLE_FILTERS.contains(name))
    {
        return Err(RescaleError::UnsupportedFilter(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }

    Ok(stream.decompressed_content()?)
}

/// Names in a `/Filter` entry, which is either one name or an array of them
fn filter_names<'a>(doc: &'a Document, filter: &'a Object) -> Result<Vec<&'a [u8]>> {
    match resolve(doc, filter) {
        Object::Name(name) => Ok(vec![name.as_slice()]),
        Object::Array(items) => items
            .iter()
            .map(|item| match resolve(doc, item) {
                Object::Name(name) => Ok(name.as_slice()),
                other => Err(RescaleError::UnsupportedFilter(format!("{:?}", other))),
            })
            .collect(),
        other => Err(RescaleError::UnsupportedFilter(format!("{:?}", other))),
    }
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the ID first so self-referencing objects terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        // Parent links lead back into the page tree
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}
