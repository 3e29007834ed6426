//! Candidate upload workflow: select a file, upload it once, analyze it.
//!
//! `UploadSession` holds the per-user state and enforces the guards:
//! upload needs a selected, not-yet-uploaded file; analysis needs an upload
//! and no analysis in flight. `SessionRegistry` owns every user's session and
//! drives the store and analyzer without holding its lock across the delay.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::analysis::{AnalysisResult, ResumeAnalyzer};
use crate::errors::AppError;
use crate::history::HistoryStore;
use crate::models::history::{EntryId, NewHistoryEntry, Status, UserId};

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

pub fn is_accepted_filename(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Default)]
pub struct UploadSession {
    selected_file: Option<String>,
    uploaded_id: Option<EntryId>,
    analyzing: bool,
    analysis: Option<AnalysisResult>,
    /// Bumped on every selection so a late analysis can tell it is stale.
    selection: u64,
}

/// An analysis that has been started but not yet written back.
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub entry_id: EntryId,
    pub filename: String,
    selection: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub selected_file: Option<String>,
    pub uploaded_id: Option<EntryId>,
    pub analyzing: bool,
    pub analysis: Option<AnalysisResult>,
    pub confidence_pct: Option<u32>,
    pub can_upload: bool,
    pub can_analyze: bool,
}

impl UploadSession {
    /// Selecting a file discards any previous upload id and analysis.
    pub fn select_file(&mut self, filename: &str) -> Result<(), AppError> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(AppError::Validation("filename cannot be empty".to_string()));
        }
        if !is_accepted_filename(filename) {
            return Err(AppError::Validation(format!(
                "Unsupported file type for '{filename}'. Supports PDF, DOC, DOCX"
            )));
        }
        self.selected_file = Some(filename.to_string());
        self.uploaded_id = None;
        self.analysis = None;
        self.selection += 1;
        Ok(())
    }

    pub fn can_upload(&self) -> bool {
        self.selected_file.is_some() && self.uploaded_id.is_none()
    }

    pub fn can_analyze(&self) -> bool {
        self.uploaded_id.is_some() && !self.analyzing
    }

    /// Filename to upload, if the guard allows it.
    pub fn upload_target(&self) -> Result<&str, AppError> {
        match (&self.selected_file, self.uploaded_id) {
            (None, _) => Err(AppError::Validation("No file selected".to_string())),
            (Some(_), Some(id)) => Err(AppError::Conflict(format!(
                "Selected file is already uploaded as entry {id}"
            ))),
            (Some(name), None) => Ok(name),
        }
    }

    pub fn mark_uploaded(&mut self, id: EntryId) {
        self.uploaded_id = Some(id);
    }

    pub fn begin_analysis(&mut self) -> Result<PendingAnalysis, AppError> {
        if self.analyzing {
            return Err(AppError::Conflict("Analysis already in progress".to_string()));
        }
        let (Some(entry_id), Some(filename)) = (self.uploaded_id, self.selected_file.clone())
        else {
            return Err(AppError::Validation(
                "Upload the selected file before analyzing".to_string(),
            ));
        };
        self.analyzing = true;
        Ok(PendingAnalysis {
            entry_id,
            filename,
            selection: self.selection,
        })
    }

    /// Clears the in-flight flag. The result is only shown if the selection
    /// has not changed since the analysis started.
    pub fn finish_analysis(&mut self, pending: &PendingAnalysis, result: Option<AnalysisResult>) {
        self.analyzing = false;
        if pending.selection == self.selection {
            if let Some(result) = result {
                self.analysis = Some(result);
            }
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            selected_file: self.selected_file.clone(),
            uploaded_id: self.uploaded_id,
            analyzing: self.analyzing,
            confidence_pct: self.analysis.as_ref().map(AnalysisResult::confidence_pct),
            analysis: self.analysis.clone(),
            can_upload: self.can_upload(),
            can_analyze: self.can_analyze(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<UserId, UploadSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn view(&self, user_id: UserId) -> SessionView {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&user_id)
            .map(UploadSession::view)
            .unwrap_or_else(|| UploadSession::default().view())
    }

    pub async fn select_file(&self, user_id: UserId, filename: &str) -> Result<SessionView, AppError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(user_id).or_default();
        session.select_file(filename)?;
        info!("User {user_id} selected {filename}");
        Ok(session.view())
    }

    /// Creates the history entry for the selected file.
    pub async fn upload(&self, user_id: UserId, store: &HistoryStore) -> Result<EntryId, AppError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(user_id).or_default();
        let filename = session.upload_target()?.to_string();
        let id = store
            .create(NewHistoryEntry::uploaded(user_id, filename))
            .await;
        session.mark_uploaded(id);
        Ok(id)
    }

    /// Runs the analyzer for the uploaded entry and writes the result back.
    /// Returns the analyzed entry's id with the report.
    pub async fn analyze(
        &self,
        user_id: UserId,
        store: &HistoryStore,
        analyzer: &dyn ResumeAnalyzer,
    ) -> Result<(EntryId, AnalysisResult), AppError> {
        let pending = {
            let mut sessions = self.sessions.lock().await;
            sessions.entry(user_id).or_default().begin_analysis()?
        };

        let outcome = analyzer.analyze(&pending.filename).await;

        if let Ok(result) = &outcome {
            store
                .update_status(
                    pending.entry_id,
                    Status::Analyzed,
                    result.to_entry_fields(Utc::now()),
                )
                .await;
        }

        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(user_id).or_default();
        session.finish_analysis(&pending, outcome.as_ref().ok().cloned());
        outcome.map(|result| (pending.entry_id, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::simulated_result;
    use crate::analysis::SimulatedAnalyzer;
    use std::time::Duration;

    #[test]
    fn test_accepted_extensions() {
        assert!(is_accepted_filename("resume.pdf"));
        assert!(is_accepted_filename("Resume.DOCX"));
        assert!(is_accepted_filename("cv.final.doc"));
        assert!(!is_accepted_filename("resume.txt"));
        assert!(!is_accepted_filename("pdf"));
    }

    #[test]
    fn test_upload_disabled_without_file() {
        let session = UploadSession::default();
        assert!(!session.can_upload());
        assert!(matches!(session.upload_target(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_upload_disabled_after_upload() {
        let mut session = UploadSession::default();
        session.select_file("resume.pdf").unwrap();
        assert!(session.can_upload());
        session.mark_uploaded(1);
        assert!(!session.can_upload());
        assert!(matches!(session.upload_target(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_reselect_resets_upload_and_analysis() {
        let mut session = UploadSession::default();
        session.select_file("resume.pdf").unwrap();
        session.mark_uploaded(1);
        let pending = session.begin_analysis().unwrap();
        session.finish_analysis(&pending, Some(simulated_result()));
        assert!(session.view().analysis.is_some());

        session.select_file("other.docx").unwrap();
        let view = session.view();
        assert_eq!(view.selected_file.as_deref(), Some("other.docx"));
        assert!(view.uploaded_id.is_none());
        assert!(view.analysis.is_none());
        assert!(view.can_upload);
    }

    #[test]
    fn test_rejected_file_keeps_previous_selection() {
        let mut session = UploadSession::default();
        session.select_file("resume.pdf").unwrap();
        assert!(session.select_file("notes.txt").is_err());
        assert_eq!(session.view().selected_file.as_deref(), Some("resume.pdf"));
    }

    #[test]
    fn test_analyze_requires_upload() {
        let mut session = UploadSession::default();
        session.select_file("resume.pdf").unwrap();
        assert!(!session.can_analyze());
        assert!(matches!(session.begin_analysis(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_second_analysis_refused_while_in_flight() {
        let mut session = UploadSession::default();
        session.select_file("resume.pdf").unwrap();
        session.mark_uploaded(1);
        session.begin_analysis().unwrap();
        assert!(!session.can_analyze());
        assert!(matches!(session.begin_analysis(), Err(AppError::Conflict(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_candidate_flow_updates_store() {
        let registry = SessionRegistry::new();
        let store = HistoryStore::new();
        let analyzer = SimulatedAnalyzer::default();

        registry.select_file(5, "resume.pdf").await.unwrap();
        let id = registry.upload(5, &store).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.get(id).await.unwrap().status, Status::Uploaded);

        let (analyzed_id, result) = registry.analyze(5, &store, &analyzer).await.unwrap();
        assert_eq!(analyzed_id, id);
        assert_eq!(result.score, 87);

        let entry = store.get(id).await.unwrap();
        assert_eq!(entry.status, Status::Analyzed);
        assert_eq!(entry.role.as_deref(), Some("Full Stack Developer"));
        assert_eq!(entry.jd_match, Some(85));
        assert!(entry.analyzed_at.is_some());
        assert_eq!(entry.filename, "resume.pdf");

        let view = registry.view(5).await;
        assert!(!view.analyzing);
        assert_eq!(view.confidence_pct, Some(92));
        assert!(view.can_analyze);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselect_during_analysis_keeps_result_off_session() {
        let registry = SessionRegistry::new();
        let store = HistoryStore::new();
        let analyzer = Arc::new(SimulatedAnalyzer {
            delay: Duration::from_millis(1500),
        });

        registry.select_file(1, "first.pdf").await.unwrap();
        let id = registry.upload(1, &store).await.unwrap();

        let task = {
            let registry = registry.clone();
            let store = store.clone();
            let analyzer = analyzer.clone();
            tokio::spawn(async move { registry.analyze(1, &store, analyzer.as_ref()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(registry.view(1).await.analyzing);

        registry.select_file(1, "second.pdf").await.unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(store.get(id).await.unwrap().status, Status::Analyzed);
        let view = registry.view(1).await;
        assert!(view.analysis.is_none());
        assert_eq!(view.selected_file.as_deref(), Some("second.pdf"));
        assert!(!view.analyzing);
    }

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let registry = SessionRegistry::new();
        let store = HistoryStore::new();
        registry.select_file(1, "a.pdf").await.unwrap();
        assert!(registry.upload(2, &store).await.is_err());
        assert!(registry.upload(1, &store).await.is_ok());
        assert!(registry.view(2).await.selected_file.is_none());
    }
}
