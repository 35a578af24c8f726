use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use declara_core::models::answer::{AnswerSet, SubmissionMetadata};
use declara_core::models::declaration::DeclarationStatus;
use declara_core::models::spec::FormSpecification;
use declara_core::models::validation::ValidationReport;
use declara_export::DocumentComposer;
use declara_signature::capture::Stroke;
use declara_validate::FormValidator;
use tracing::{error, info, warn};

use crate::store::{ArtifactMetadata, DeclarationStore};

type ReadyHandler = Box<dyn FnOnce()>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientIdentity {
    pub id: String,
    pub display_name: String,
}

impl PatientIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into() }
    }
}

/// Snapshot of a patient's declaration standing, with a user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationStatusReport {
    pub status: DeclarationStatus,
    pub message: String,
    pub can_proceed: bool,
    pub age_days: Option<i64>,
    pub latest_artifact: Option<PathBuf>,
}

/// Result of asking the gate to proceed with treatment.
pub enum GateOutcome<'a> {
    /// A current declaration exists; the ready handler already ran.
    Ready,
    /// A new declaration must be collected first.
    DeclarationRequired(DeclarationRequest<'a>),
}

/// Outcome of submitting answers for a pending declaration request.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Declaration finalized and persisted; the ready handler ran.
    Completed { artifact_path: PathBuf },
    /// Fixable findings; correct the answers and submit again.
    Invalid(ValidationReport),
    /// Absolute contraindication. Permanent for this patient: later
    /// submissions are refused even with changed answers.
    Blocked(ValidationReport),
    /// Rendering or persistence failed; nothing was recorded.
    ExportFailed,
    /// This request already produced a declaration.
    AlreadyCompleted,
}

/// Gates treatment on a current (non-expired) health declaration.
///
/// Single-threaded like the rest of the pipeline; a pending
/// [`DeclarationRequest`] holds the gate exclusively, so two collection
/// flows for the same gate cannot overlap.
pub struct DeclarationLifecycleGate {
    spec: FormSpecification,
    composer: DocumentComposer,
    store: DeclarationStore,
    blocked: HashSet<String>,
}

impl DeclarationLifecycleGate {
    pub fn new(spec: FormSpecification, composer: DocumentComposer, store: DeclarationStore) -> Self {
        Self { spec, composer, store, blocked: HashSet::new() }
    }

    pub fn spec(&self) -> &FormSpecification {
        &self.spec
    }

    pub fn store(&self) -> &DeclarationStore {
        &self.store
    }

    /// Look up the patient's standing. Store failures are logged and
    /// reported as missing, so an unreadable store can never wave a
    /// patient through.
    pub fn status(&self, patient_id: &str, now: jiff::Timestamp) -> DeclarationStatusReport {
        let record = match self.store.latest_record(patient_id) {
            Ok(record) => record,
            Err(e) => {
                warn!(patient_id, error = %e, "declaration lookup failed, treating as missing");
                None
            }
        };

        let Some(record) = record else {
            return DeclarationStatusReport {
                status: DeclarationStatus::Missing,
                message: "Sem declaração de saúde registada.".to_string(),
                can_proceed: false,
                age_days: None,
                latest_artifact: None,
            };
        };

        let age = record.age_days(now);
        let status = record.status(now);
        let (message, can_proceed) = match status {
            DeclarationStatus::Valid => {
                (format!("Declaração de saúde válida (emitida há {age} dias)."), true)
            }
            _ => (
                format!(
                    "Declaração de saúde expirada (emitida há {age} dias). É necessária uma nova declaração."
                ),
                false,
            ),
        };

        DeclarationStatusReport {
            status,
            message,
            can_proceed,
            age_days: Some(age),
            latest_artifact: Some(record.artifact_path),
        }
    }

    pub fn can_proceed(&self, patient_id: &str, now: jiff::Timestamp) -> bool {
        self.status(patient_id, now).can_proceed
    }

    /// Proceed with treatment, collecting a fresh declaration first if the
    /// patient has none (or an expired one). `on_ready` runs exactly once:
    /// immediately when a current declaration exists, or on the request's
    /// first successful submission otherwise.
    pub fn require_declaration(
        &mut self,
        patient: PatientIdentity,
        now: jiff::Timestamp,
        on_ready: impl FnOnce() + 'static,
    ) -> GateOutcome<'_> {
        if self.can_proceed(&patient.id, now) {
            on_ready();
            return GateOutcome::Ready;
        }

        info!(patient_id = %patient.id, "health declaration required before treatment");
        GateOutcome::DeclarationRequired(DeclarationRequest {
            gate: self,
            patient,
            on_ready: Some(Box::new(on_ready)),
            blocked: false,
            completed: false,
        })
    }
}

/// A pending declaration collection flow for one patient.
pub struct DeclarationRequest<'a> {
    gate: &'a mut DeclarationLifecycleGate,
    patient: PatientIdentity,
    on_ready: Option<ReadyHandler>,
    blocked: bool,
    completed: bool,
}

impl DeclarationRequest<'_> {
    pub fn patient(&self) -> &PatientIdentity {
        &self.patient
    }

    /// Submit answers for this request.
    ///
    /// Contraindications are checked before ordinary findings and block the
    /// patient permanently; validation failures leave the request open for
    /// corrected answers; a successful submission exports the artifact,
    /// writes its sidecar, and fires the ready handler.
    pub fn submit(
        &mut self,
        answers: &AnswerSet,
        signature: &[Stroke],
        now: jiff::Timestamp,
    ) -> SubmissionOutcome {
        if self.completed {
            return SubmissionOutcome::AlreadyCompleted;
        }

        let validator = FormValidator::new(&self.gate.spec);
        let report = validator.validate(answers);

        if self.blocked
            || self.gate.blocked.contains(&self.patient.id)
            || validator.has_critical_contraindications(answers)
        {
            self.blocked = true;
            self.gate.blocked.insert(self.patient.id.clone());
            warn!(patient_id = %self.patient.id, "treatment blocked by absolute contraindication");
            return SubmissionOutcome::Blocked(report);
        }

        if !report.is_empty() {
            return SubmissionOutcome::Invalid(report);
        }

        let mut finalized = answers.clone();
        finalized.set_metadata(SubmissionMetadata {
            submission_time: now,
            form_version: self.gate.spec.version.clone(),
            validation_passed: true,
        });

        let artifact_path = match self.gate.store.next_artifact_path(
            &self.patient.id,
            now,
            self.gate.composer.extension(),
        ) {
            Ok(path) => path,
            Err(e) => {
                error!(patient_id = %self.patient.id, error = %e, "could not reserve artifact path");
                return SubmissionOutcome::ExportFailed;
            }
        };

        let exported = self.gate.composer.export_declaration(
            &self.gate.spec,
            &finalized,
            signature,
            &self.patient.display_name,
            now,
            &artifact_path,
        );
        if !exported {
            return SubmissionOutcome::ExportFailed;
        }

        let metadata = ArtifactMetadata {
            patient_id: self.patient.id.clone(),
            form_version: self.gate.spec.version.clone(),
            submitted_at: now,
            validation_passed: true,
        };
        if let Err(e) = self.gate.store.write_sidecar(&artifact_path, &metadata) {
            // Without a sidecar the artifact is invisible to lookups, so
            // remove it rather than leave a half-recorded declaration.
            error!(artifact = %artifact_path.display(), error = %e, "sidecar write failed");
            let _ = fs::remove_file(&artifact_path);
            return SubmissionOutcome::ExportFailed;
        }

        self.completed = true;
        info!(patient_id = %self.patient.id, artifact = %artifact_path.display(), "declaration recorded");
        if let Some(on_ready) = self.on_ready.take() {
            on_ready();
        }
        SubmissionOutcome::Completed { artifact_path }
    }
}
