use crate::constants::OVERFLOW_TOLERANCE_PT;
use crate::options::RescaleOptions;
use crate::render::get_page_dimensions;
use crate::scale::{ScaledTransform, scale_page};
use crate::types::*;
use lopdf::Document;

/// Summary of what rescaling would do to a document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RescaleStatistics {
    /// Total number of source pages
    pub source_pages: usize,
    /// Pages whose content is scaled
    pub scaled_pages: usize,
    /// Pages emitted at native size
    pub unscaled_pages: usize,
    /// Pages turned to landscape
    pub rotated_pages: usize,
    /// Pages whose content still extends past the usable area
    pub overflowing_pages: usize,
}

/// Compute the transform of every page without writing anything
pub fn plan_pages(document: &Document, options: &RescaleOptions) -> Result<Vec<ScaledTransform>> {
    options.validate()?;

    document
        .get_pages()
        .values()
        .enumerate()
        .map(|(index, &page_id)| {
            let size = get_page_dimensions(document, page_id);
            scale_page(size, &options.target, &options.scaling).map_err(|e| {
                RescaleError::RewriteAborted {
                    index,
                    source: Box::new(e),
                }
            })
        })
        .collect()
}

/// Calculate statistics for rescaling a document
pub fn calculate_statistics(
    document: &Document,
    options: &RescaleOptions,
) -> Result<RescaleStatistics> {
    let transforms = plan_pages(document, options)?;
    if transforms.is_empty() {
        return Err(RescaleError::NullOrMissingInput(
            "document has no pages".to_string(),
        ));
    }

    let mut stats = RescaleStatistics {
        source_pages: transforms.len(),
        ..Default::default()
    };
    for transform in &transforms {
        if transform.is_scaled() {
            stats.scaled_pages += 1;
        } else {
            stats.unscaled_pages += 1;
        }
        if transform.orientation == Orientation::Landscape {
            stats.rotated_pages += 1;
        }
        if transform.overflows(OVERFLOW_TOLERANCE_PT) {
            stats.overflowing_pages += 1;
        }
    }

    Ok(stats)
}
