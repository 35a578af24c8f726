use declara_core::models::answer::{AnswerSet, AnswerValue};
use declara_core::models::spec::FormSpecification;
use declara_core::models::validation::{ValidationError, ValidationErrorKind, ValidationReport};

use crate::visibility::is_visible;

const MSG_REQUIRED: &str = "Campo obrigatório";
const MSG_CONTRAINDICATION: &str =
    "CONTRAINDICAÇÃO ABSOLUTA: Este tratamento não é seguro para o seu caso";
const MSG_CONSENT: &str =
    "CONSENTIMENTO OBRIGATÓRIO: Deve aceitar todos os termos para prosseguir";

/// Evaluates the three specification rule families against an answer set.
/// Findings are returned as data; nothing here ever aborts.
pub struct FormValidator<'a> {
    spec: &'a FormSpecification,
}

impl<'a> FormValidator<'a> {
    pub fn new(spec: &'a FormSpecification) -> Self {
        Self { spec }
    }

    /// Run all three checks unconditionally and union their findings per
    /// field. No short-circuiting: a field can carry several errors at once.
    pub fn validate(&self, answers: &AnswerSet) -> ValidationReport {
        let mut report = ValidationReport::new();
        self.check_required(answers, &mut report);
        self.check_contraindications(answers, &mut report);
        self.check_final_consent(answers, &mut report);
        report
    }

    /// The single authoritative safety gate: true iff a contraindication
    /// finding landed on a field listed in `critical_contraindications.fields`.
    pub fn has_critical_contraindications(&self, answers: &AnswerSet) -> bool {
        let report = self.validate(answers);
        self.spec
            .rules()
            .critical_contraindications
            .fields
            .iter()
            .any(|field_id| {
                report.get(field_id).is_some_and(|errors| {
                    errors
                        .iter()
                        .any(|e| e.kind == ValidationErrorKind::Contraindication)
                })
            })
    }

    /// Required fields are enforced only while visible.
    fn check_required(&self, answers: &AnswerSet, report: &mut ValidationReport) {
        for field in self.spec.fields() {
            if !field.required || !is_visible(field, answers) {
                continue;
            }
            let missing = match answers.get(&field.id) {
                None => true,
                Some(value) => value.is_blank(),
            };
            if missing {
                push(report, &field.id, ValidationErrorKind::MissingRequired, MSG_REQUIRED);
            }
        }
    }

    /// Visibility is deliberately not consulted here: a contraindicating
    /// answer on a currently-hidden field still blocks. Skipping a section
    /// must not neutralize a prior answer.
    fn check_contraindications(&self, answers: &AnswerSet, report: &mut ValidationReport) {
        let blocking = &self.spec.rules().critical_contraindications.blocking_values;
        for (field_id, blocking_set) in blocking {
            let Some(answer) = answers.get(field_id) else {
                continue;
            };
            let blocked = match answer {
                AnswerValue::List(items) => items
                    .iter()
                    .any(|item| blocking_set.contains(&AnswerValue::Text(item.clone()))),
                scalar => blocking_set.contains(scalar),
            };
            if blocked {
                push(report, field_id, ValidationErrorKind::Contraindication, MSG_CONTRAINDICATION);
            }
        }
    }

    /// Consent must be affirmative: unanswered, blank, `false`, and zero all
    /// count as not consented.
    fn check_final_consent(&self, answers: &AnswerSet, report: &mut ValidationReport) {
        for field_id in &self.spec.rules().required_final_consent {
            let consented = answers.get(field_id).is_some_and(|value| !is_falsy(value));
            if !consented {
                push(report, field_id, ValidationErrorKind::ConsentRequired, MSG_CONSENT);
            }
        }
    }
}

/// Stricter than blankness: a numeric zero is an answer, but not consent.
fn is_falsy(value: &AnswerValue) -> bool {
    value.is_blank() || *value == AnswerValue::Integer(0)
}

fn push(report: &mut ValidationReport, field_id: &str, kind: ValidationErrorKind, message: &str) {
    report
        .entry(field_id.to_string())
        .or_default()
        .push(ValidationError::new(field_id, kind, message));
}
