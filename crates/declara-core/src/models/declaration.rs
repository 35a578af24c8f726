use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Declarations go stale after this many days and must be renewed.
pub const DECLARATION_TTL_DAYS: i64 = 90;

const SECONDS_PER_DAY: i64 = 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationStatus {
    Missing,
    Valid,
    Expired,
}

/// One finalized declaration artifact. Created on successful export and
/// never mutated afterwards — a new declaration supersedes, never
/// overwrites, an old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    pub patient_id: String,
    pub artifact_path: PathBuf,
    pub created_at: jiff::Timestamp,
}

impl DeclarationRecord {
    /// Whole days elapsed since the declaration was created.
    pub fn age_days(&self, now: jiff::Timestamp) -> i64 {
        (now.as_second() - self.created_at.as_second()) / SECONDS_PER_DAY
    }

    /// Expired strictly after the TTL: day 90 is still valid, day 91 is not.
    pub fn status(&self, now: jiff::Timestamp) -> DeclarationStatus {
        if self.age_days(now) > DECLARATION_TTL_DAYS {
            DeclarationStatus::Expired
        } else {
            DeclarationStatus::Valid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_aged(days: i64, now: jiff::Timestamp) -> DeclarationRecord {
        DeclarationRecord {
            patient_id: "p-1".into(),
            artifact_path: PathBuf::from("declaracao_20250101_120000.docx"),
            created_at: now - jiff::SignedDuration::from_hours(days * 24),
        }
    }

    #[test]
    fn ttl_boundaries() {
        let now = jiff::Timestamp::UNIX_EPOCH + jiff::SignedDuration::from_hours(24 * 400);
        assert_eq!(record_aged(89, now).status(now), DeclarationStatus::Valid);
        assert_eq!(record_aged(90, now).status(now), DeclarationStatus::Valid);
        assert_eq!(record_aged(91, now).status(now), DeclarationStatus::Expired);
    }

    #[test]
    fn age_days_truncates_partial_days() {
        let now = jiff::Timestamp::UNIX_EPOCH + jiff::SignedDuration::from_hours(100);
        let record = DeclarationRecord {
            patient_id: "p-1".into(),
            artifact_path: PathBuf::from("x"),
            created_at: jiff::Timestamp::UNIX_EPOCH + jiff::SignedDuration::from_hours(60),
        };
        assert_eq!(record.age_days(now), 1);
    }
}
