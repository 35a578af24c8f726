//! declara-gate
//!
//! Treatment lifecycle gating: tracks whether a patient holds a current
//! health declaration, forces collection of a new one when they do not, and
//! persists finalized declaration artifacts with their metadata sidecars.

pub mod error;
pub mod gate;
pub mod store;

pub use error::GateError;
pub use gate::{
    DeclarationLifecycleGate, DeclarationRequest, DeclarationStatusReport, GateOutcome,
    PatientIdentity, SubmissionOutcome,
};
pub use store::{ArtifactMetadata, DeclarationStore};
