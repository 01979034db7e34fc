use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Interviewing,
    Offered,
    Rejected,
}

impl ApplicationStatus {
    /// Stand-in score for applications recorded without a match score.
    pub fn proxy_score(self) -> f64 {
        match self {
            ApplicationStatus::Offered => 95.0,
            ApplicationStatus::Interviewing => 75.0,
            ApplicationStatus::Applied => 60.0,
            ApplicationStatus::Rejected => 30.0,
        }
    }
}

/// A tracked application. `resume_id` / `job_id` may dangle after deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub date_applied: DateTime<Utc>,
    /// Aggregate match score (0–100) captured when the application was created.
    pub match_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
