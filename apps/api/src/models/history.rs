use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EntryId = u64;
pub type UserId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Uploaded,
    Analyzed,
    Shortlisted,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Uploaded => "uploaded",
            Status::Analyzed => "analyzed",
            Status::Shortlisted => "shortlisted",
            Status::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded résumé, tracked through upload, analysis and HR decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub filename: String,
    pub role: Option<String>,
    pub score: Option<u32>,
    pub status: Status,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jd_match: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_action_at: Option<DateTime<Utc>>,
}

/// A history record before the store has assigned it an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub user_id: UserId,
    pub filename: String,
    pub role: Option<String>,
    pub score: Option<u32>,
    pub status: Status,
    pub uploaded_at: DateTime<Utc>,
}

impl NewHistoryEntry {
    pub fn uploaded(user_id: UserId, filename: impl Into<String>) -> Self {
        Self {
            user_id,
            filename: filename.into(),
            role: None,
            score: None,
            status: Status::Uploaded,
            uploaded_at: Utc::now(),
        }
    }
}

/// Fields merged into an entry alongside a status change.
///
/// Only fields that are `Some` overwrite the entry. Identity fields (`id`,
/// `user_id`, `filename`, `uploaded_at`) are not representable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntryFields {
    pub role: Option<String>,
    pub score: Option<u32>,
    pub jd_match: Option<u32>,
    pub confidence: Option<f64>,
    pub matched_skills: Option<Vec<String>>,
    pub missing_skills: Option<Vec<String>>,
    pub reasoning: Option<Vec<String>>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub hr_action_at: Option<DateTime<Utc>>,
}

impl EntryFields {
    pub fn hr_action(at: DateTime<Utc>) -> Self {
        Self {
            hr_action_at: Some(at),
            ..Self::default()
        }
    }
}

impl HistoryEntry {
    pub fn from_new(id: EntryId, new: NewHistoryEntry) -> Self {
        Self {
            id,
            user_id: new.user_id,
            filename: new.filename,
            role: new.role,
            score: new.score,
            status: new.status,
            uploaded_at: new.uploaded_at,
            jd_match: None,
            confidence: None,
            matched_skills: None,
            missing_skills: None,
            reasoning: None,
            analyzed_at: None,
            hr_action_at: None,
        }
    }

    /// Overwrites every field present in `fields`; absent fields are left as-is.
    pub fn merge(&mut self, fields: EntryFields) {
        let EntryFields {
            role,
            score,
            jd_match,
            confidence,
            matched_skills,
            missing_skills,
            reasoning,
            analyzed_at,
            hr_action_at,
        } = fields;

        if role.is_some() {
            self.role = role;
        }
        if score.is_some() {
            self.score = score;
        }
        if jd_match.is_some() {
            self.jd_match = jd_match;
        }
        if confidence.is_some() {
            self.confidence = confidence;
        }
        if matched_skills.is_some() {
            self.matched_skills = matched_skills;
        }
        if missing_skills.is_some() {
            self.missing_skills = missing_skills;
        }
        if reasoning.is_some() {
            self.reasoning = reasoning;
        }
        if analyzed_at.is_some() {
            self.analyzed_at = analyzed_at;
        }
        if hr_action_at.is_some() {
            self.hr_action_at = hr_action_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> HistoryEntry {
        HistoryEntry::from_new(1, NewHistoryEntry::uploaded(7, "resume.pdf"))
    }

    #[test]
    fn test_new_entry_has_no_analysis_fields() {
        let e = entry();
        assert_eq!(e.status, Status::Uploaded);
        assert!(e.role.is_none());
        assert!(e.score.is_none());
        assert!(e.analyzed_at.is_none());
    }

    #[test]
    fn test_merge_only_overwrites_present_fields() {
        let mut e = entry();
        e.merge(EntryFields {
            role: Some("Full Stack Developer".to_string()),
            ..EntryFields::default()
        });
        e.merge(EntryFields {
            score: Some(87),
            ..EntryFields::default()
        });
        assert_eq!(e.role.as_deref(), Some("Full Stack Developer"));
        assert_eq!(e.score, Some(87));
        assert!(e.jd_match.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::Shortlisted).unwrap();
        assert_eq!(json, "\"shortlisted\"");
        let parsed: Status = serde_json::from_str("\"analyzed\"").unwrap();
        assert_eq!(parsed, Status::Analyzed);
    }

    #[test]
    fn test_entry_fields_accept_partial_json() {
        let fields: EntryFields = serde_json::from_str(r#"{"score": 40}"#).unwrap();
        assert_eq!(fields.score, Some(40));
        assert!(fields.role.is_none());
    }
}
