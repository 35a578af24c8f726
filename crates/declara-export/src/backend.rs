use tracing::{debug, warn};

use crate::compose::Document;
use crate::docx::DocxBackend;
use crate::error::ExportError;
use crate::print::PrintBackend;
use crate::styles::DocumentStyles;

/// Rendering strategy for finalized declaration documents.
///
/// Every backend renders the same logical [`Document`], so swapping backends
/// changes fidelity but never content.
pub trait DocumentBackend {
    fn id(&self) -> &'static str;

    /// File extension (no dot) for artifacts produced by this backend.
    fn extension(&self) -> &'static str;

    fn render(&self, document: &Document, styles: &DocumentStyles)
    -> Result<Vec<u8>, ExportError>;
}

/// Pick the richest backend that actually works in this environment.
///
/// Probed exactly once, at composer construction; the choice is logged so
/// degraded output is visible in operation.
pub fn select_backend() -> Box<dyn DocumentBackend> {
    match DocxBackend::probe() {
        Ok(backend) => {
            debug!(backend = backend.id(), "document backend selected");
            Box::new(backend)
        }
        Err(e) => {
            warn!(error = %e, "DOCX backend unavailable, using plain-text fallback");
            Box::new(PrintBackend)
        }
    }
}
