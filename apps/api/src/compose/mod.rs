// Quotation composition engine.
// Pure phases (calculation, hoisting, sections, table plan, headers) build an immutable
// ResolvedQuotation; the assembler turns it into a document and hands it to the PDF adapter.
// Rendering is CPU-bound: callers on the async runtime use tokio::task::spawn_blocking.

pub mod assembler;
pub mod boilerplate;
pub mod document;
pub mod error;
pub mod header;
pub mod labels;
pub mod resolved;
pub mod sections;
pub mod spec_calc;
pub mod table;

pub use assembler::{render_quotation, RenderedQuotation};
pub use error::CompositionError;
pub use resolved::{resolve, ResolvedQuotation};
