//! declara-export
//!
//! Document composition for finalized health declarations: one logical
//! document structure, rendered by either a DOCX backend or a plain print
//! backend, selected once by capability probing.

pub mod backend;
pub mod compose;
pub mod composer;
pub mod docx;
pub mod error;
pub mod print;
pub mod render;
pub mod styles;

pub use backend::{DocumentBackend, select_backend};
pub use composer::{ComposerConfig, DocumentComposer};
pub use error::ExportError;
