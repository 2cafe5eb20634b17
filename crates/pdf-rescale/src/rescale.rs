//! PDF page rescaling
//!
//! This module wires the lopdf reader and writer to the page rewriter:
//! 1. Load the source document
//! 2. Decide scale, orientation and placement for each page
//! 3. Write every page onto a fresh page of the target size
//! 4. Serialize the output document

mod io;

pub use io::{load_pdf, save_pdf};

use crate::options::{RescaleOptions, ScalingConfig};
use crate::render::{PdfPageSink, PdfPageSource};
use crate::rewrite::{PageSource, rewrite_pages};
use crate::types::*;
use io::to_bytes;
use log::info;
use lopdf::Document;
use std::path::Path;

/// Rescale PDF bytes onto `target` pages.
///
/// `None` for `config` means [`ScalingConfig::DEFAULT`].
pub async fn rescale(
    bytes: Vec<u8>,
    target: TargetPageSpec,
    config: Option<ScalingConfig>,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || rescale_bytes(&bytes, &target, config.as_ref())).await?
}

/// Blocking version of [`rescale`].
pub fn rescale_bytes(
    bytes: &[u8],
    target: &TargetPageSpec,
    config: Option<&ScalingConfig>,
) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(RescaleError::NullOrMissingInput(
            "input document is empty".to_string(),
        ));
    }

    let options = RescaleOptions::new(*target, config.copied().unwrap_or(ScalingConfig::DEFAULT));
    let source = Document::load_mem(bytes)?;
    to_bytes(rescale_document(&source, &options)?)
}

/// Rescale a loaded document into a new one. The source is left untouched.
pub fn rescale_document(source: &Document, options: &RescaleOptions) -> Result<Document> {
    options.validate()?;

    let mut pages = PdfPageSource::new(source);
    if pages.page_count() == 0 {
        return Err(RescaleError::NullOrMissingInput(
            "document has no pages".to_string(),
        ));
    }

    let mut sink = PdfPageSink::new(source, options.target.page_size);
    rewrite_pages(&mut pages, &options.target, &options.scaling, &mut sink)?;
    sink.finish()
}

/// Rescale several independent documents in parallel.
///
/// Each document runs on its own blocking task; results keep input order.
/// Every task is awaited before returning, and the first failure (in input
/// order) is the one reported.
pub async fn rescale_documents(
    documents: Vec<Document>,
    options: &RescaleOptions,
) -> Result<Vec<Document>> {
    options.validate()?;

    let tasks: Vec<_> = documents
        .into_iter()
        .map(|doc| {
            let options = *options;
            tokio::task::spawn_blocking(move || rescale_document(&doc, &options))
        })
        .collect();

    let mut rescaled = Vec::with_capacity(tasks.len());
    let mut first_error = None;
    for task in tasks {
        match task.await {
            Ok(Ok(doc)) => rescaled.push(doc),
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(RescaleError::from(e));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(rescaled),
    }
}

/// Load, rescale and save a PDF file
pub async fn rescale_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &RescaleOptions,
) -> Result<()> {
    options.validate()?;

    let source = load_pdf(&input).await?;
    let options = *options;
    let rescaled = tokio::task::spawn_blocking(move || rescale_document(&source, &options)).await??;
    save_pdf(rescaled, &output).await?;

    info!(
        "Rescaled {} -> {}",
        input.as_ref().display(),
        output.as_ref().display()
    );
    Ok(())
}
