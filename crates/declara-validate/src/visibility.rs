use declara_core::models::answer::AnswerSet;
use declara_core::models::spec::FieldSpec;

/// Whether a field is currently shown (and therefore enforced by the
/// required-field check).
///
/// Semantics are deliberately narrow: a single `show_if` condition compared
/// by scalar value equality. There is no list containment, no AND/OR
/// combination, and no transitive resolution — the controlling field's own
/// visibility is ignored, only its literal current answer counts. An
/// unanswered controller means hidden.
pub fn is_visible(field: &FieldSpec, answers: &AnswerSet) -> bool {
    let Some(show_if) = &field.show_if else {
        return true;
    };
    match answers.get(&show_if.field) {
        Some(answer) => *answer == show_if.value,
        None => false,
    }
}
