//! Résumé analysis: pluggable, trait-based analyzer producing a match report
//! for an uploaded résumé.
//!
//! Default: `SimulatedAnalyzer` waits a fixed delay and returns a canned
//! report. Nothing reads the file contents; only the filename is known.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`, chosen at startup.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::models::history::EntryFields;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub role: String,
    pub score: u32,          // 0 – 100
    pub confidence: f64,     // 0.0 – 1.0
    pub jd_match: u32,       // 0 – 100
    pub tech_match: u32,     // 0 – 100
    pub soft_skills: u32,    // 0 – 100
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub reasoning: Vec<String>,
}

impl AnalysisResult {
    pub fn confidence_pct(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }

    /// Fields written back to the history entry once analysis completes.
    /// `tech_match` and `soft_skills` are display-only and not persisted.
    pub fn to_entry_fields(&self, analyzed_at: DateTime<Utc>) -> EntryFields {
        EntryFields {
            role: Some(self.role.clone()),
            score: Some(self.score),
            jd_match: Some(self.jd_match),
            confidence: Some(self.confidence),
            matched_skills: Some(self.matched_skills.clone()),
            missing_skills: Some(self.missing_skills.clone()),
            reasoning: Some(self.reasoning.clone()),
            analyzed_at: Some(analyzed_at),
            hr_action_at: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, filename: &str) -> Result<AnalysisResult, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// SimulatedAnalyzer
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(1500);

/// Returns the same report for every résumé after `delay`. Never fails.
pub struct SimulatedAnalyzer {
    pub delay: Duration,
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self {
            delay: DEFAULT_ANALYSIS_DELAY,
        }
    }
}

#[async_trait]
impl ResumeAnalyzer for SimulatedAnalyzer {
    async fn analyze(&self, filename: &str) -> Result<AnalysisResult, AppError> {
        debug!("Simulating analysis of {filename} ({:?})", self.delay);
        tokio::time::sleep(self.delay).await;
        Ok(simulated_result())
    }
}

/// The canned report every simulated analysis returns.
pub(crate) fn simulated_result() -> AnalysisResult {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    AnalysisResult {
        role: "Full Stack Developer".to_string(),
        score: 87,
        confidence: 0.92,
        jd_match: 85,
        tech_match: 92,
        soft_skills: 75,
        matched_skills: strings(&["React", "Node.js", "TypeScript", "AWS", "PostgreSQL"]),
        missing_skills: strings(&["Docker", "Kubernetes", "GraphQL"]),
        reasoning: strings(&[
            "Strong React and frontend experience (4+ years)",
            "Solid backend skills with Node.js ecosystem",
            "Education aligns with role requirements",
            "Previous experience at similar scale companies",
        ]),
    }
}
