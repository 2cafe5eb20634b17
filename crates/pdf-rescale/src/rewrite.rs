//! Page-by-page document rewriting
//!
//! The rewriter walks a [`PageSource`] in order, asks [`scale_page`] for the
//! geometry of every page and drives a [`PageSink`] to emit it. All mutable
//! state lives in the sink; each page's decision only depends on that page
//! and the nominal target.

use crate::constants::OVERFLOW_TOLERANCE_PT;
use crate::options::ScalingConfig;
use crate::scale::{Placement, ScaledTransform, scale_page};
use crate::types::*;
use log::{debug, info, warn};

/// Supplies source pages in index order.
pub trait PageSource {
    /// Renderable payload of a page
    type Content;

    fn page_count(&self) -> usize;

    /// Materialize page `index` together with its intrinsic size.
    fn import_page(&mut self, index: usize) -> Result<(Self::Content, Dimensions)>;
}

/// Receives output pages. Calls arrive strictly in page order.
pub trait PageSink {
    type Content;

    fn set_page_size(&mut self, size: Dimensions) -> Result<()>;

    /// Start a new page using the current page size.
    fn begin_new_page(&mut self) -> Result<()>;

    fn place_content(&mut self, content: Self::Content, placement: &Placement) -> Result<()>;
}

/// One rewritten page, handed to the sink and then dropped
#[derive(Debug)]
pub struct ScaledPage<C> {
    pub content: C,
    pub transform: ScaledTransform,
}

/// Rewrite every page of `source` onto `sink`.
///
/// The first failure aborts the whole run and is returned wrapped in
/// `RewriteAborted` with the index of the page that failed.
pub fn rewrite_pages<S, K>(
    source: &mut S,
    target: &TargetPageSpec,
    config: &ScalingConfig,
    sink: &mut K,
) -> Result<()>
where
    S: PageSource,
    K: PageSink<Content = S::Content>,
{
    target.validate()?;

    let page_count = source.page_count();
    info!(
        "Rewriting {} pages onto {} x {} pt ({:?})",
        page_count, target.page_size.width, target.page_size.height, config.mode
    );

    for index in 0..page_count {
        let page = scale_source_page(source, index, target, config).map_err(|e| abort(index, e))?;
        emit_page(sink, page, target).map_err(|e| abort(index, e))?;
    }

    Ok(())
}

fn scale_source_page<S: PageSource>(
    source: &mut S,
    index: usize,
    target: &TargetPageSpec,
    config: &ScalingConfig,
) -> Result<ScaledPage<S::Content>> {
    let (content, content_size) = source.import_page(index)?;
    let transform = scale_page(content_size, target, config)?;

    debug!(
        "Page {}: {} x {} -> scale ({}, {}), offset ({}, {}), {:?}",
        index,
        content_size.width,
        content_size.height,
        transform.scale_x,
        transform.scale_y,
        transform.offset_x,
        transform.offset_y,
        transform.orientation
    );
    if transform.overflows(OVERFLOW_TOLERANCE_PT) {
        warn!(
            "Page {} overflows the usable area ({} x {})",
            index, transform.usable.width, transform.usable.height
        );
    }

    Ok(ScaledPage { content, transform })
}

fn emit_page<K: PageSink>(
    sink: &mut K,
    page: ScaledPage<K::Content>,
    target: &TargetPageSpec,
) -> Result<()> {
    let placement = page.transform.placement(&target.margins);

    sink.set_page_size(page.transform.page_size)?;
    sink.begin_new_page()?;
    sink.place_content(page.content, &placement)?;

    // Next page decides its own orientation from the nominal size
    sink.set_page_size(target.page_size)
}

fn abort(index: usize, error: RescaleError) -> RescaleError {
    RescaleError::RewriteAborted {
        index,
        source: Box::new(error),
    }
}
