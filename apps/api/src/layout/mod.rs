// Layout adapter: composed document -> paginated PDF.
// Two passes: pagination with unresolved page fields, then serialisation with
// every field resolved against the final page count.
// CPU-bound; callers on the async runtime must use tokio::task::spawn_blocking.

pub mod flow;
pub mod font_metrics;
pub mod paginate;
pub mod pdf;

use tracing::debug;

use crate::compose::document::ComposedDocument;

pub use font_metrics::{page_config, PageConfig, PaperSize};
#[cfg(test)]
pub use font_metrics::default_page_config;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("page geometry: {0}")]
    Geometry(String),

    #[error("table layout: {0}")]
    Table(String),
}

#[derive(Debug, Clone)]
pub struct PdfOutput {
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

/// Paginates and serialises a composed document.
pub fn render_pdf(doc: &ComposedDocument, config: &PageConfig) -> Result<PdfOutput, LayoutError> {
    let pages = paginate::paginate(doc, config)?;
    let bytes = pdf::write_pdf(&pages, config, &doc.title);
    debug!(pages = pages.len(), bytes = bytes.len(), "pdf written");
    Ok(PdfOutput {
        bytes,
        page_count: pages.len() as u32,
    })
}
