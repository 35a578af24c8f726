use declara_core::models::answer::{AnswerSet, AnswerValue};
use declara_core::models::spec::{FieldSpec, FieldType, FormSpecification};
use declara_signature::capture::Stroke;
use declara_signature::raster::{RasterImage, rasterize};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::composer::ComposerConfig;
use crate::error::ExportError;
use crate::render::render_prose;

/// Answer field carrying the patient's name in the production specification.
pub const PATIENT_NAME_FIELD: &str = "nome_completo";

/// Label prefix for fields marked critical in the specification.
const CRITICAL_MARKER: &str = "⚠️ ";

/// Fixed declaration prose rendered on the signature page.
const DECLARATION_PROSE: &str = "\
Eu, abaixo assinado(a), declaro que:

- Todas as informações fornecidas neste documento são verdadeiras e completas;
- Compreendo os riscos e benefícios do tratamento proposto;
- Fui informado(a) sobre possíveis contraindicações e efeitos secundários;
- Autorizo o início do tratamento conforme protocolo estabelecido em {{ clinic_name }};
- Comprometo-me a informar imediatamente qualquer alteração no meu estado de saúde.";

/// One row of a per-section answer table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub label: String,
    pub value: String,
    pub critical: bool,
}

/// The logical document structure. Both backends render exactly this block
/// sequence, so their outputs are structurally equivalent.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    /// Legal/critical callout text.
    Warning(String),
    Bullet(String),
    AnswerTable(Vec<AnswerRow>),
    PageBreak,
    /// Rasterized signature, present only when the patient actually signed.
    SignatureImage(RasterImage),
    /// Blank rule for a manual signature when no strokes were captured.
    SignatureRule,
    FooterLine(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Serialize)]
struct ProseContext<'a> {
    patient_name: &'a str,
    clinic_name: &'a str,
}

/// Merge specification, answers, and signature strokes into the finalized
/// logical document: header, per-section answer tables, signature page,
/// legal footer.
pub fn compose(
    spec: &FormSpecification,
    answers: &AnswerSet,
    signature: &[Stroke],
    patient_name: &str,
    now: jiff::Timestamp,
    config: &ComposerConfig,
) -> Result<Document, ExportError> {
    let mut blocks = Vec::new();

    // Header
    blocks.push(Block::Heading { level: 1, text: config.clinic_name.clone() });
    blocks.push(Block::Heading { level: 1, text: spec.title.clone() });
    blocks.push(Block::Paragraph(format!(
        "Documento gerado em: {}",
        now.strftime("%d/%m/%Y às %H:%M")
    )));

    // Per-section answer tables
    for section in &spec.sections {
        blocks.push(Block::Heading { level: 2, text: section.title.clone() });

        let rows: Vec<AnswerRow> = section
            .fields
            .iter()
            .filter_map(|field| answer_row(field, answers))
            .collect();

        if rows.is_empty() {
            blocks.push(Block::Paragraph(
                "Nenhuma informação fornecida nesta secção.".to_string(),
            ));
        } else {
            blocks.push(Block::AnswerTable(rows));
        }
    }

    // Signature page
    blocks.push(Block::PageBreak);
    blocks.push(Block::Heading { level: 2, text: "ASSINATURA E DECLARAÇÃO".to_string() });
    let prose = render_prose(
        DECLARATION_PROSE,
        &ProseContext { patient_name, clinic_name: &config.clinic_name },
    )?;
    blocks.extend(blocks_from_rendered(&prose));

    blocks.push(Block::AnswerTable(vec![
        identity_row("Nome", display_name(answers, patient_name)),
        identity_row("Data", now.strftime("%d/%m/%Y").to_string()),
        identity_row("Local", config.clinic_name.clone()),
    ]));

    blocks.push(Block::Paragraph("Assinatura do Paciente:".to_string()));
    if signature.is_empty() {
        blocks.push(Block::SignatureRule);
    } else {
        blocks.push(Block::SignatureImage(rasterize(
            signature,
            config.signature_width,
            config.signature_height,
        )));
    }

    // Legal footer
    blocks.push(Block::Heading { level: 2, text: "TERMOS LEGAIS E CONDIÇÕES".to_string() });
    blocks.push(Block::Warning(format!(
        "Aviso Legal: {}",
        spec.legal_text.disclaimer
    )));
    for term in &spec.legal_text.consent_terms {
        blocks.push(Block::Bullet(term.clone()));
    }

    let form_version = answers
        .metadata()
        .map(|m| m.form_version.clone())
        .unwrap_or_else(|| spec.version.clone());
    blocks.push(Block::FooterLine(
        [
            format!("Documento ID: {}", document_id(answers)?),
            format!("Versão do Formulário: {form_version}"),
            format!("Sistema: {}", config.generator_name),
            format!("Gerado em: {}", now.strftime("%d/%m/%Y %H:%M:%S")),
        ]
        .join(" | "),
    ));

    Ok(Document { title: spec.title.clone(), blocks })
}

/// Content-derived document identifier: truncated SHA-256 of the serialized
/// answer set. Stable for identical inputs, changes on any answer edit.
pub fn document_id(answers: &AnswerSet) -> Result<String, ExportError> {
    let serialized = serde_json::to_vec(answers)?;
    let digest = Sha256::digest(&serialized);
    let mut id = String::with_capacity(8);
    for byte in &digest[..4] {
        id.push_str(&format!("{byte:02x}"));
    }
    Ok(id)
}

fn identity_row(label: &str, value: String) -> AnswerRow {
    AnswerRow { label: label.to_string(), value, critical: false }
}

fn display_name(answers: &AnswerSet, fallback: &str) -> String {
    match answers.get(PATIENT_NAME_FIELD) {
        Some(AnswerValue::Text(name)) if !name.is_empty() => name.clone(),
        _ => fallback.to_string(),
    }
}

/// Fields with no answer (or a blank one) are skipped entirely.
fn answer_row(field: &FieldSpec, answers: &AnswerSet) -> Option<AnswerRow> {
    let value = answers.get(&field.id).filter(|v| !v.is_blank())?;
    let label = if field.is_critical() {
        format!("{CRITICAL_MARKER}{}", field.label)
    } else {
        field.label.clone()
    };
    Some(AnswerRow {
        label,
        value: format_answer(field, value),
        critical: field.is_critical(),
    })
}

/// Type-directed answer formatting for the document tables.
fn format_answer(field: &FieldSpec, value: &AnswerValue) -> String {
    match (field.field_type, value) {
        (FieldType::Checkbox, AnswerValue::Flag(ticked)) => {
            if *ticked { "Sim" } else { "Não" }.to_string()
        }
        (FieldType::CheckboxGroup | FieldType::Multiselect, AnswerValue::List(items)) => {
            if items.len() == 1 && matches!(items[0].as_str(), "nenhum" | "nenhuma") {
                "Nenhuma seleção".to_string()
            } else {
                items.join(", ")
            }
        }
        (FieldType::Date, AnswerValue::Text(raw)) => {
            match jiff::civil::Date::strptime("%Y-%m-%d", raw) {
                Ok(date) => date.strftime("%d/%m/%Y").to_string(),
                Err(_) => raw.clone(),
            }
        }
        (FieldType::Rating, AnswerValue::Integer(rating)) => {
            format!("{rating}/{}", field.max.unwrap_or(10))
        }
        (_, AnswerValue::Text(text)) => text.clone(),
        (_, AnswerValue::Integer(number)) => number.to_string(),
        (_, AnswerValue::Flag(flag)) => if *flag { "Sim" } else { "Não" }.to_string(),
        (_, AnswerValue::List(items)) => items.join(", "),
    }
}

/// Split rendered prose into paragraph and bullet blocks, in the same
/// markdown-ish subset the DOCX backend understands.
fn blocks_from_rendered(rendered: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for line in rendered.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("- ") {
            blocks.push(Block::Bullet(text.to_string()));
        } else {
            blocks.push(Block::Paragraph(trimmed.to_string()));
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use declara_core::models::spec::FormSpecification;
    use declara_signature::capture::{Point, SignatureCapture};

    fn spec() -> FormSpecification {
        let json = serde_json::json!({
            "title": "Declaração de Estado de Saúde",
            "version": "1.0",
            "legal_text": {
                "disclaimer": "Este documento não substitui aconselhamento médico.",
                "consent_terms": ["Aceito os riscos e benefícios do tratamento"]
            },
            "sections": [
                {
                    "id": "identificacao", "title": "Identificação",
                    "fields": [
                        { "id": "nome_completo", "label": "Nome completo", "type": "text" },
                        { "id": "data_nascimento", "label": "Data de nascimento", "type": "date" },
                        { "id": "nivel_dor", "label": "Nível de dor", "type": "rating" }
                    ]
                },
                {
                    "id": "historico", "title": "Histórico de Saúde",
                    "fields": [
                        { "id": "dispositivos_implantados", "label": "Dispositivos implantados",
                          "type": "checkbox_group", "style": "critical",
                          "options": ["nenhum", "Pacemaker"] },
                        { "id": "decl_confirmo", "label": "Confirmo", "type": "checkbox" }
                    ]
                },
                {
                    "id": "vazia", "title": "Observações",
                    "fields": [
                        { "id": "observacoes", "label": "Observações", "type": "textarea" }
                    ]
                }
            ],
            "validation_rules": {}
        });
        FormSpecification::from_json_str(&json.to_string()).unwrap()
    }

    fn answers() -> AnswerSet {
        let mut answers = AnswerSet::new();
        answers.insert("nome_completo", "João Silva Santos");
        answers.insert("data_nascimento", "1980-01-31");
        answers.insert("nivel_dor", 3i64);
        answers.insert("dispositivos_implantados", vec!["nenhum"]);
        answers.insert("decl_confirmo", true);
        answers
    }

    fn now() -> jiff::Timestamp {
        "2025-01-07T14:30:00Z".parse().unwrap()
    }

    fn table_rows(document: &Document) -> Vec<&AnswerRow> {
        document
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::AnswerTable(rows) => Some(rows.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn header_leads_the_document() {
        let config = ComposerConfig::default();
        let document = compose(&spec(), &answers(), &[], "João Silva Santos", now(), &config).unwrap();
        assert_eq!(
            document.blocks[0],
            Block::Heading { level: 1, text: config.clinic_name.clone() }
        );
        assert!(matches!(
            &document.blocks[2],
            Block::Paragraph(text) if text.contains("07/01/2025")
        ));
    }

    #[test]
    fn answers_are_formatted_by_type() {
        let config = ComposerConfig::default();
        let document = compose(&spec(), &answers(), &[], "João", now(), &config).unwrap();
        let rows = table_rows(&document);

        let find = |label: &str| {
            rows.iter()
                .find(|r| r.label.contains(label))
                .unwrap_or_else(|| panic!("row '{label}' missing"))
        };
        assert_eq!(find("Data de nascimento").value, "31/01/1980");
        assert_eq!(find("Nível de dor").value, "3/10");
        assert_eq!(find("Dispositivos implantados").value, "Nenhuma seleção");
        assert_eq!(find("Confirmo").value, "Sim");
    }

    #[test]
    fn critical_fields_carry_warning_marker() {
        let config = ComposerConfig::default();
        let document = compose(&spec(), &answers(), &[], "João", now(), &config).unwrap();
        let rows = table_rows(&document);
        let critical = rows.iter().find(|r| r.critical).unwrap();
        assert!(critical.label.starts_with("⚠️ "));
    }

    #[test]
    fn unanswered_section_renders_placeholder_paragraph() {
        let config = ComposerConfig::default();
        let document = compose(&spec(), &answers(), &[], "João", now(), &config).unwrap();
        assert!(document.blocks.iter().any(|b| matches!(
            b,
            Block::Paragraph(text) if text == "Nenhuma informação fornecida nesta secção."
        )));
    }

    #[test]
    fn missing_signature_renders_blank_rule() {
        let config = ComposerConfig::default();
        let document = compose(&spec(), &answers(), &[], "João", now(), &config).unwrap();
        assert!(document.blocks.contains(&Block::SignatureRule));
        assert!(!document
            .blocks
            .iter()
            .any(|b| matches!(b, Block::SignatureImage(_))));
    }

    #[test]
    fn captured_signature_is_rasterized() {
        let mut capture = SignatureCapture::new();
        capture.press(Point::new(10.0, 10.0));
        capture.drag_to(Point::new(50.0, 30.0));
        capture.release();

        let config = ComposerConfig::default();
        let document =
            compose(&spec(), &answers(), capture.strokes(), "João", now(), &config).unwrap();
        let image = document
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::SignatureImage(image) => Some(image),
                _ => None,
            })
            .unwrap();
        assert_eq!(image.width, config.signature_width);
        assert!(image.pixels.iter().any(|&p| p != 0xFF));
    }

    #[test]
    fn document_id_is_stable_and_content_derived() {
        let base = answers();
        let id_a = document_id(&base).unwrap();
        let id_b = document_id(&base.clone()).unwrap();
        assert_eq!(id_a, id_b);
        assert_eq!(id_a.len(), 8);

        let mut edited = base;
        edited.insert("nivel_dor", 4i64);
        assert_ne!(document_id(&edited).unwrap(), id_a);
    }

    #[test]
    fn footer_carries_document_metadata() {
        let config = ComposerConfig::default();
        let document = compose(&spec(), &answers(), &[], "João", now(), &config).unwrap();
        let footer = document
            .blocks
            .iter()
            .rev()
            .find_map(|b| match b {
                Block::FooterLine(text) => Some(text),
                _ => None,
            })
            .unwrap();
        assert!(footer.contains("Documento ID: "));
        assert!(footer.contains("Versão do Formulário: 1.0"));
        assert!(footer.contains(&config.generator_name));
    }
}
