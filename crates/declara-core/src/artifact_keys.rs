//! Filesystem layout for declaration artifacts.
//!
//! Artifacts live under one subdirectory per patient:
//!
//! ```text
//! <root>/declaracoes_saude/<patient_id>/declaracao_20250107_143000.docx
//! <root>/declaracoes_saude/<patient_id>/declaracao_20250107_143000.docx.meta
//! ```

use std::path::{Path, PathBuf};

/// Directory under the store root holding all patients' declarations.
pub const DECLARATIONS_DIR: &str = "declaracoes_saude";

/// Artifact file name prefix.
pub const ARTIFACT_PREFIX: &str = "declaracao_";

/// Extension appended to an artifact path for its metadata sidecar.
pub const SIDECAR_EXTENSION: &str = "meta";

/// Directory holding one patient's declarations.
pub fn patient_dir(root: &Path, patient_id: &str) -> PathBuf {
    root.join(DECLARATIONS_DIR).join(patient_id)
}

/// Timestamp-derived artifact file name, e.g. `declaracao_20250107_143000.docx`.
pub fn artifact_name(created_at: jiff::Timestamp, extension: &str) -> String {
    format!(
        "{ARTIFACT_PREFIX}{}.{extension}",
        created_at.strftime("%Y%m%d_%H%M%S")
    )
}

/// Sidecar path for an artifact: the artifact path with `.meta` appended.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Whether a path looks like a declaration artifact (and not a sidecar).
pub fn is_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(ARTIFACT_PREFIX) && !name.ends_with(&format!(".{SIDECAR_EXTENSION}"))
}
