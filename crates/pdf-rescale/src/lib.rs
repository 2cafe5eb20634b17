pub mod constants;
mod options;
pub mod render;
pub mod rescale;
pub mod rewrite;
mod scale;
mod stats;
mod types;

pub use options::*;
pub use rescale::{
    load_pdf, rescale, rescale_bytes, rescale_document, rescale_documents, rescale_file, save_pdf,
};
pub use rewrite::{PageSink, PageSource, ScaledPage, rewrite_pages};
pub use scale::{Placement, ScaledTransform, scale_page};
pub use stats::{RescaleStatistics, calculate_statistics, plan_pages};
pub use types::*;
