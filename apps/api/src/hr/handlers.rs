//! Axum route handlers for HR review.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::history::stats::{build_dashboard, Dashboard};
use crate::history::TransitionError;
use crate::models::history::{EntryFields, EntryId, HistoryEntry, Status};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Status,
    #[serde(default)]
    pub fields: EntryFields,
}

/// GET /api/v1/hr/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Dashboard>, AppError> {
    user.require_hr()?;
    let entries = state.history.entries().await;
    Ok(Json(build_dashboard(&entries)))
}

/// POST /api/v1/hr/candidates/:id/shortlist
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<EntryId>,
) -> Result<Json<HistoryEntry>, AppError> {
    user.require_hr()?;
    decide(&state, id, Status::Shortlisted).await.map(Json)
}

/// POST /api/v1/hr/candidates/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<EntryId>,
) -> Result<Json<HistoryEntry>, AppError> {
    user.require_hr()?;
    decide(&state, id, Status::Rejected).await.map(Json)
}

/// Applies an HR decision to an entry in the review list. The status check
/// and the write are one store operation, so competing decisions cannot both
/// succeed.
async fn decide(state: &AppState, id: EntryId, decision: Status) -> Result<HistoryEntry, AppError> {
    let entry = state
        .history
        .update_status_if(
            id,
            Status::Analyzed,
            decision,
            EntryFields::hr_action(Utc::now()),
        )
        .await
        .map_err(|e| match e {
            TransitionError::NotFound(_) => AppError::NotFound(format!("Candidate {id} not found")),
            TransitionError::Mismatch { actual, .. } => AppError::Conflict(format!(
                "Candidate {id} is {actual} and not awaiting review"
            )),
        })?;
    info!("HR decision for candidate {id}: {decision}");
    Ok(entry)
}

/// GET /api/v1/history
pub async fn handle_list_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    user.require_hr()?;
    Ok(Json(state.history.entries().await))
}

/// PATCH /api/v1/history/:id/status
///
/// Raw status update: merges `fields` and overwrites the status without any
/// transition checks.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<EntryId>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<HistoryEntry>, AppError> {
    user.require_hr()?;
    if !state.history.update_status(id, req.status, req.fields).await {
        return Err(AppError::NotFound(format!("History entry {id} not found")));
    }
    state
        .history
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("History entry {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::history::NewHistoryEntry;

    fn test_state() -> AppState {
        AppState::new(Config::default())
    }

    async fn analyzed_entry(state: &AppState, filename: &str) -> EntryId {
        let id = state
            .history
            .create(NewHistoryEntry::uploaded(1, filename))
            .await;
        state
            .history
            .update_status(id, Status::Analyzed, EntryFields::default())
            .await;
        id
    }

    #[tokio::test]
    async fn test_decide_sets_status_and_action_time() {
        let state = test_state();
        let id = analyzed_entry(&state, "resume.pdf").await;
        let entry = decide(&state, id, Status::Rejected).await.unwrap();
        assert_eq!(entry.status, Status::Rejected);
        assert!(entry.hr_action_at.is_some());
    }

    #[tokio::test]
    async fn test_decide_outside_review_list_conflicts() {
        let state = test_state();
        let id = state
            .history
            .create(NewHistoryEntry::uploaded(1, "resume.pdf"))
            .await;
        assert!(matches!(
            decide(&state, id, Status::Shortlisted).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            decide(&state, 77, Status::Shortlisted).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decisions_accept_exactly_one() {
        let state = test_state();
        for round in 0..1000 {
            let id = analyzed_entry(&state, &format!("cv-{round}.pdf")).await;

            let shortlist = {
                let state = state.clone();
                tokio::spawn(async move { decide(&state, id, Status::Shortlisted).await })
            };
            let reject = {
                let state = state.clone();
                tokio::spawn(async move { decide(&state, id, Status::Rejected).await })
            };
            let outcomes = [shortlist.await.unwrap(), reject.await.unwrap()];

            let accepted: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
            assert_eq!(accepted.len(), 1, "round {round}: both decisions were accepted");
            assert!(outcomes
                .iter()
                .any(|o| matches!(o, Err(AppError::Conflict(_)))));

            let stored = state.history.get(id).await.unwrap();
            assert_eq!(stored.status, accepted[0].status);
            assert_eq!(stored.hr_action_at, accepted[0].hr_action_at);
        }
    }
}
