use std::fs;
use std::path::Path;

use declara_core::models::answer::AnswerSet;
use declara_core::models::spec::FormSpecification;
use declara_signature::capture::Stroke;
use tracing::{error, info};

use crate::backend::{DocumentBackend, select_backend};
use crate::compose::compose;
use crate::error::ExportError;
use crate::styles::DocumentStyles;

/// Composer-wide settings: branding plus signature raster dimensions.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub clinic_name: String,
    pub generator_name: String,
    pub styles: DocumentStyles,
    pub signature_width: u32,
    pub signature_height: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            clinic_name: "Clínica de Terapias Integrativas".to_string(),
            generator_name: "Declara".to_string(),
            styles: DocumentStyles::default(),
            signature_width: 400,
            signature_height: 150,
        }
    }
}

/// Merges a specification, finalized answers, and a signature into one
/// document artifact on disk.
pub struct DocumentComposer {
    backend: Box<dyn DocumentBackend>,
    config: ComposerConfig,
}

impl DocumentComposer {
    /// Build a composer with the richest available backend.
    pub fn new(config: ComposerConfig) -> Self {
        Self { backend: select_backend(), config }
    }

    /// Build a composer with an explicit backend.
    pub fn with_backend(backend: Box<dyn DocumentBackend>, config: ComposerConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend_id(&self) -> &'static str {
        self.backend.id()
    }

    /// File extension the composer's artifacts will carry.
    pub fn extension(&self) -> &'static str {
        self.backend.extension()
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Export a finalized declaration to `path`. Returns whether the artifact
    /// was written; failures are logged with their cause, never raised, so a
    /// failed export cannot take the submission flow down with it.
    pub fn export_declaration(
        &self,
        spec: &FormSpecification,
        answers: &AnswerSet,
        signature: &[Stroke],
        patient_name: &str,
        now: jiff::Timestamp,
        path: &Path,
    ) -> bool {
        match self.try_export(spec, answers, signature, patient_name, now, path) {
            Ok(()) => {
                info!(path = %path.display(), backend = self.backend.id(), "declaration exported");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "declaration export failed");
                false
            }
        }
    }

    /// Render and write atomically: the bytes land in a sibling temp file
    /// first, then rename into place. A failure at any step leaves no partial
    /// artifact at `path`.
    fn try_export(
        &self,
        spec: &FormSpecification,
        answers: &AnswerSet,
        signature: &[Stroke],
        patient_name: &str,
        now: jiff::Timestamp,
        path: &Path,
    ) -> Result<(), ExportError> {
        let document = compose(spec, answers, signature, patient_name, now, &self.config)?;
        let bytes = self.backend.render(&document, &self.config.styles)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = Path::new(&tmp);

        fs::write(tmp, &bytes)?;
        if let Err(e) = fs::rename(tmp, path) {
            let _ = fs::remove_file(tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::PrintBackend;
    use declara_core::models::answer::AnswerSet;

    fn spec() -> FormSpecification {
        let json = serde_json::json!({
            "title": "Declaração de Estado de Saúde",
            "version": "1.0",
            "legal_text": { "disclaimer": "Aviso.", "consent_terms": ["Termo um"] },
            "sections": [{
                "id": "identificacao", "title": "Identificação",
                "fields": [{ "id": "nome_completo", "label": "Nome completo", "type": "text" }]
            }],
            "validation_rules": {}
        });
        FormSpecification::from_json_str(&json.to_string()).unwrap()
    }

    fn answers() -> AnswerSet {
        let mut answers = AnswerSet::new();
        answers.insert("nome_completo", "Ana Costa");
        answers
    }

    fn now() -> jiff::Timestamp {
        "2025-01-07T14:30:00Z".parse().unwrap()
    }

    fn print_composer() -> DocumentComposer {
        DocumentComposer::with_backend(Box::new(PrintBackend), ComposerConfig::default())
    }

    #[test]
    fn export_writes_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let composer = print_composer();
        let path = dir.path().join(format!("declaracao.{}", composer.extension()));

        assert!(composer.export_declaration(&spec(), &answers(), &[], "Ana Costa", now(), &path));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Nome completo: Ana Costa"));
        assert!(text.contains("Documento ID: "));
    }

    #[test]
    fn export_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let composer = print_composer();
        let path = dir.path().join("declaracao.txt");

        assert!(composer.export_declaration(&spec(), &answers(), &[], "Ana", now(), &path));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("declaracao.txt")]);
    }

    #[test]
    fn failed_export_reports_false_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let composer = print_composer();
        let path = dir.path().join("missing").join("declaracao.txt");

        assert!(!composer.export_declaration(&spec(), &answers(), &[], "Ana", now(), &path));
        assert!(!path.exists());
    }

    #[test]
    fn default_selection_prefers_docx() {
        let composer = DocumentComposer::new(ComposerConfig::default());
        assert_eq!(composer.backend_id(), "docx");
        assert_eq!(composer.extension(), "docx");
    }
}
