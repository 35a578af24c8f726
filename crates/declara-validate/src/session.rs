use declara_core::models::answer::{AnswerSet, AnswerValue, SubmissionMetadata};
use declara_core::models::spec::FormSpecification;
use declara_core::models::validation::ValidationReport;
use tracing::info;

use crate::validator::FormValidator;

type SubmitHandler = Box<dyn Fn(&AnswerSet)>;
type ValidationHandler = Box<dyn Fn(bool)>;

/// Outcome of a submission attempt. A contraindicated submission is a
/// distinct "cannot proceed" state, not a fixable validation failure.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation passed; metadata was attached and `on_submit` handlers ran.
    Accepted(AnswerSet),
    /// Fixable per-field findings; nothing was finalized.
    Invalid(ValidationReport),
    /// An absolute contraindication was detected.
    Contraindicated(ValidationReport),
}

/// One live editing session over a loaded specification.
///
/// Event-driven and single-threaded: answer changes, revalidation, and
/// handler invocation all happen synchronously on the caller's thread. The
/// session owns the specification it was loaded with.
pub struct FormSession {
    spec: FormSpecification,
    answers: AnswerSet,
    submit_handlers: Vec<SubmitHandler>,
    validation_handlers: Vec<ValidationHandler>,
    was_valid: Option<bool>,
}

impl FormSession {
    pub fn new(spec: FormSpecification) -> Self {
        Self {
            spec,
            answers: AnswerSet::new(),
            submit_handlers: Vec::new(),
            validation_handlers: Vec::new(),
            was_valid: None,
        }
    }

    pub fn spec(&self) -> &FormSpecification {
        &self.spec
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// Register a handler invoked synchronously on every accepted submission.
    pub fn on_submit(&mut self, handler: impl Fn(&AnswerSet) + 'static) {
        self.submit_handlers.push(Box::new(handler));
    }

    /// Register a handler invoked whenever overall validity flips.
    pub fn on_validation_changed(&mut self, handler: impl Fn(bool) + 'static) {
        self.validation_handlers.push(Box::new(handler));
    }

    /// Record a user edit and revalidate.
    pub fn set_answer(&mut self, field_id: &str, value: impl Into<AnswerValue>) {
        self.answers.insert(field_id, value);
        self.notify_validity();
    }

    pub fn clear_answer(&mut self, field_id: &str) {
        self.answers.remove(field_id);
        self.notify_validity();
    }

    /// Attempt to finalize the current answers.
    ///
    /// Contraindications take precedence over ordinary findings so the
    /// caller always sees the unambiguous hard-stop state.
    pub fn submit(&mut self, now: jiff::Timestamp) -> SubmitOutcome {
        let validator = FormValidator::new(&self.spec);
        let report = validator.validate(&self.answers);

        if validator.has_critical_contraindications(&self.answers) {
            return SubmitOutcome::Contraindicated(report);
        }
        if !report.is_empty() {
            return SubmitOutcome::Invalid(report);
        }

        let mut finalized = self.answers.clone();
        finalized.set_metadata(SubmissionMetadata {
            submission_time: now,
            form_version: self.spec.version.clone(),
            validation_passed: true,
        });

        info!(form_version = %self.spec.version, "declaration submission accepted");
        for handler in &self.submit_handlers {
            handler(&finalized);
        }
        SubmitOutcome::Accepted(finalized)
    }

    fn notify_validity(&mut self) {
        let valid = FormValidator::new(&self.spec).validate(&self.answers).is_empty();
        if self.was_valid != Some(valid) {
            self.was_valid = Some(valid);
            for handler in &self.validation_handlers {
                handler(valid);
            }
        }
    }
}
