use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SpecLoadError;
use crate::models::answer::AnswerValue;

/// The closed set of field types a specification may declare.
///
/// Adding a type here is a compile-time exhaustiveness requirement for every
/// consumer that dispatches on it (renderer factory, answer formatting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Date,
    Number,
    Checkbox,
    CheckboxGroup,
    Radio,
    Select,
    Multiselect,
    Signature,
    File,
    Rating,
}

/// An option offered by a choice-type field. The specification source writes
/// either a bare string or a `{label, value}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldOption {
    Simple(String),
    Labeled { label: String, value: String },
}

impl FieldOption {
    pub fn value(&self) -> &str {
        match self {
            FieldOption::Simple(value) => value,
            FieldOption::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldOption::Simple(value) => value,
            FieldOption::Labeled { label, .. } => label,
        }
    }
}

/// Conditional visibility: the field is shown iff the referenced field's
/// current answer equals `value` (scalar equality only — no list containment,
/// no boolean combinations, no transitive resolution through hidden
/// controllers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowIf {
    pub field: String,
    pub value: AnswerValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStyle {
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub show_if: Option<ShowIf>,
    #[serde(default)]
    pub style: Option<FieldStyle>,
    /// Upper bound for rating fields. Renders as `value/max`.
    #[serde(default)]
    pub max: Option<i64>,
}

impl FieldSpec {
    pub fn is_critical(&self) -> bool {
        self.style == Some(FieldStyle::Critical)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalText {
    pub disclaimer: String,
    #[serde(default)]
    pub consent_terms: Vec<String>,
}

/// Absolute medical contraindications: `fields` lists the field ids whose
/// contraindication errors block the dependent workflow; `blocking_values`
/// maps a field id to the answer values that constitute a contraindication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalContraindications {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub blocking_values: BTreeMap<String, BTreeSet<AnswerValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default)]
    pub critical_contraindications: CriticalContraindications,
    #[serde(default)]
    pub required_final_consent: Vec<String>,
}

/// A loaded form specification. Immutable once loaded; owned by the session
/// that loaded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSpecification {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    pub legal_text: LegalText,
    pub sections: Vec<Section>,
    pub validation_rules: ValidationRules,
}

const REQUIRED_KEYS: [&str; 3] = ["sections", "validation_rules", "legal_text"];

impl FormSpecification {
    /// Load a specification from its JSON source, failing fast on missing
    /// required keys, unrecognized field types, duplicate field ids, and
    /// dangling `show_if` references.
    pub fn from_json_str(source: &str) -> Result<Self, SpecLoadError> {
        let raw: serde_json::Value = serde_json::from_str(source)?;

        // The original exporter wraps everything in a `form_spec` envelope;
        // accept both shapes.
        let root = raw.get("form_spec").unwrap_or(&raw);

        for key in REQUIRED_KEYS {
            if root.get(key).is_none() {
                return Err(SpecLoadError::MissingKey(key));
            }
        }

        check_field_types(root)?;

        let spec: FormSpecification = serde_json::from_value(root.clone())?;
        spec.check_structure()?;
        Ok(spec)
    }

    /// All fields flattened across sections, in specification order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn find_field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.id == id)
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.validation_rules
    }

    fn check_structure(&self) -> Result<(), SpecLoadError> {
        let mut seen = BTreeSet::new();
        for field in self.fields() {
            if !seen.insert(field.id.as_str()) {
                return Err(SpecLoadError::DuplicateFieldId(field.id.clone()));
            }
        }

        for field in self.fields() {
            if let Some(show_if) = &field.show_if
                && !seen.contains(show_if.field.as_str())
            {
                return Err(SpecLoadError::UnknownShowIfReference {
                    field_id: field.id.clone(),
                    reference: show_if.field.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Reject unrecognized field types before the full deserialization so the
/// failure names the offending field. Silently defaulting here would hide a
/// validation gap.
fn check_field_types(root: &serde_json::Value) -> Result<(), SpecLoadError> {
    let Some(sections) = root.get("sections").and_then(|v| v.as_array()) else {
        return Ok(());
    };

    for section in sections {
        let Some(fields) = section.get("fields").and_then(|v| v.as_array()) else {
            continue;
        };
        for field in fields {
            let Some(type_name) = field.get("type").and_then(|v| v.as_str()) else {
                continue;
            };
            if serde_json::from_value::<FieldType>(serde_json::Value::from(type_name)).is_err() {
                let field_id = field
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<missing id>")
                    .to_string();
                warn!(field_id, field_type = type_name, "unrecognized field type in specification");
                return Err(SpecLoadError::UnknownFieldType {
                    field_id,
                    field_type: type_name.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec_json() -> serde_json::Value {
        serde_json::json!({
            "title": "Declaração de Estado de Saúde",
            "description": "Declaração obrigatória antes do início da terapia",
            "version": "1.0",
            "legal_text": {
                "disclaimer": "Este documento não substitui aconselhamento médico.",
                "consent_terms": ["Li e compreendo todas as informações fornecidas"]
            },
            "sections": [
                {
                    "id": "historico",
                    "title": "Histórico de Saúde",
                    "fields": [
                        {
                            "id": "doencas_cronicas",
                            "label": "Doenças crónicas",
                            "type": "checkbox_group",
                            "required": true,
                            "options": ["nenhuma", "Epilepsia", "Diabetes tipo 2"]
                        },
                        {
                            "id": "outra_doenca",
                            "label": "Qual?",
                            "type": "text",
                            "show_if": { "field": "doencas_cronicas", "value": "outra" }
                        }
                    ]
                }
            ],
            "validation_rules": {
                "critical_contraindications": {
                    "fields": ["doencas_cronicas"],
                    "blocking_values": { "doencas_cronicas": ["Epilepsia"] }
                },
                "required_final_consent": []
            }
        })
    }

    #[test]
    fn loads_minimal_spec() {
        let spec = FormSpecification::from_json_str(&minimal_spec_json().to_string()).unwrap();
        assert_eq!(spec.version, "1.0");
        assert_eq!(spec.fields().count(), 2);
        assert_eq!(
            spec.find_field("doencas_cronicas").unwrap().field_type,
            FieldType::CheckboxGroup
        );
        assert!(spec.find_field("inexistente").is_none());
    }

    #[test]
    fn accepts_form_spec_envelope() {
        let wrapped = serde_json::json!({ "form_spec": minimal_spec_json() });
        let spec = FormSpecification::from_json_str(&wrapped.to_string()).unwrap();
        assert_eq!(spec.sections.len(), 1);
    }

    #[test]
    fn missing_required_key_fails_fast() {
        let mut json = minimal_spec_json();
        json.as_object_mut().unwrap().remove("legal_text");
        let err = FormSpecification::from_json_str(&json.to_string()).unwrap_err();
        assert!(matches!(err, SpecLoadError::MissingKey("legal_text")));
    }

    #[test]
    fn unknown_field_type_is_rejected_not_defaulted() {
        let mut json = minimal_spec_json();
        json["sections"][0]["fields"][0]["type"] = "hologram".into();
        let err = FormSpecification::from_json_str(&json.to_string()).unwrap_err();
        match err {
            SpecLoadError::UnknownFieldType { field_id, field_type } => {
                assert_eq!(field_id, "doencas_cronicas");
                assert_eq!(field_type, "hologram");
            }
            other => panic!("expected UnknownFieldType, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_field_id_is_rejected() {
        let mut json = minimal_spec_json();
        json["sections"][0]["fields"][1]["id"] = "doencas_cronicas".into();
        json["sections"][0]["fields"][1]
            .as_object_mut()
            .unwrap()
            .remove("show_if");
        let err = FormSpecification::from_json_str(&json.to_string()).unwrap_err();
        assert!(matches!(err, SpecLoadError::DuplicateFieldId(id) if id == "doencas_cronicas"));
    }

    #[test]
    fn dangling_show_if_reference_is_rejected() {
        let mut json = minimal_spec_json();
        json["sections"][0]["fields"][1]["show_if"]["field"] = "fantasma".into();
        let err = FormSpecification::from_json_str(&json.to_string()).unwrap_err();
        assert!(matches!(err, SpecLoadError::UnknownShowIfReference { reference, .. } if reference == "fantasma"));
    }

    #[test]
    fn fields_preserve_section_order() {
        let spec = FormSpecification::from_json_str(&minimal_spec_json().to_string()).unwrap();
        let ids: Vec<_> = spec.fields().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["doencas_cronicas", "outra_doenca"]);
    }
}
