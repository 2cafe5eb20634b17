//! PDF reading and writing for rescaling
//!
//! This module handles all lopdf-specific operations:
//! - Reading source pages (box, content, resources)
//! - Creating Form XObjects from source pages
//! - Building the rescaled output pages
//! - Deep copying PDF objects

mod page;
mod xobject;

pub use page::PdfPageSink;
pub use xobject::{
    PageContent, PdfPageSource, copy_object_deep, create_page_xobject, get_page_dimensions,
    read_page,
};
