use std::fs;
use std::path::{Path, PathBuf};

use declara_core::artifact_keys::{self, ARTIFACT_PREFIX};
use declara_core::models::declaration::DeclarationRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GateError;

/// Metadata sidecar written next to every declaration artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub patient_id: String,
    pub form_version: String,
    pub submitted_at: jiff::Timestamp,
    pub validation_passed: bool,
}

/// Filesystem store for declaration artifacts, one directory per patient.
///
/// The sidecar is the source of truth for an artifact's submission time; an
/// artifact without a readable sidecar is treated as if it did not exist.
pub struct DeclarationStore {
    root: PathBuf,
}

impl DeclarationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The patient's most recent declaration, by sidecar submission time.
    ///
    /// Corrupt or missing sidecars are logged and skipped rather than
    /// failing the whole lookup: one damaged file must not hide a newer
    /// intact declaration.
    pub fn latest_record(&self, patient_id: &str) -> Result<Option<DeclarationRecord>, GateError> {
        let dir = artifact_keys::patient_dir(&self.root, patient_id);
        if !dir.is_dir() {
            return Ok(None);
        }

        let mut latest: Option<DeclarationRecord> = None;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !artifact_keys::is_artifact(&path) {
                continue;
            }
            let metadata = match self.read_sidecar(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping artifact with unreadable sidecar");
                    continue;
                }
            };
            let record = DeclarationRecord {
                patient_id: patient_id.to_string(),
                artifact_path: path,
                created_at: metadata.submitted_at,
            };
            if latest
                .as_ref()
                .is_none_or(|current| supersedes(&record, current))
            {
                latest = Some(record);
            }
        }
        Ok(latest)
    }

    /// Reserve a path for a new artifact. Creates the patient directory and
    /// disambiguates same-second submissions with a numeric suffix.
    pub fn next_artifact_path(
        &self,
        patient_id: &str,
        now: jiff::Timestamp,
        extension: &str,
    ) -> Result<PathBuf, GateError> {
        let dir = artifact_keys::patient_dir(&self.root, patient_id);
        fs::create_dir_all(&dir)?;

        let candidate = dir.join(artifact_keys::artifact_name(now, extension));
        if !candidate.exists() {
            return Ok(candidate);
        }

        let stamp = now.strftime("%Y%m%d_%H%M%S");
        let mut n = 2u32;
        loop {
            let candidate = dir.join(format!("{ARTIFACT_PREFIX}{stamp}_{n}.{extension}"));
            if !candidate.exists() {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    pub fn write_sidecar(
        &self,
        artifact: &Path,
        metadata: &ArtifactMetadata,
    ) -> Result<(), GateError> {
        let bytes = serde_json::to_vec_pretty(metadata)?;
        fs::write(artifact_keys::sidecar_path(artifact), bytes)?;
        Ok(())
    }

    pub fn read_sidecar(&self, artifact: &Path) -> Result<ArtifactMetadata, GateError> {
        let bytes = fs::read(artifact_keys::sidecar_path(artifact))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Newest record wins. Records sharing a submission second fall back to the
/// artifact file name: a retry suffix makes the name longer and lexically
/// later, so a superseding same-second write is always selected.
fn supersedes(candidate: &DeclarationRecord, current: &DeclarationRecord) -> bool {
    let key = |record: &DeclarationRecord| {
        let name = record
            .artifact_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        (record.created_at, name.len(), name)
    };
    key(candidate) > key(current)
}
