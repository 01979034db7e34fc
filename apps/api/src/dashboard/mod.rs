//! Aggregate views over the stored resumes, jobs and applications.

pub mod handlers;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::job::JobRecord;
use crate::models::resume::StoredResume;

pub const ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_resumes: usize,
    pub total_jobs: usize,
    pub total_applications: usize,
    /// 0–100, one decimal. Status proxy stands in for missing match scores.
    pub average_match_score: f64,
    pub applications_by_status: BTreeMap<ApplicationStatus, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ResumeUploaded,
    JobAnalyzed,
    ApplicationCreated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub id: Uuid,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

pub fn compute_stats(
    resumes: &[StoredResume],
    jobs: &[JobRecord],
    applications: &[ApplicationRecord],
) -> DashboardStats {
    let mut applications_by_status = BTreeMap::new();
    for app in applications {
        *applications_by_status.entry(app.status).or_insert(0) += 1;
    }

    let average_match_score = if applications.is_empty() {
        0.0
    } else {
        let total: f64 = applications
            .iter()
            .map(|a| a.match_score.unwrap_or_else(|| a.status.proxy_score()))
            .sum();
        (total / applications.len() as f64 * 10.0).round() / 10.0
    };

    DashboardStats {
        total_resumes: resumes.len(),
        total_jobs: jobs.len(),
        total_applications: applications.len(),
        average_match_score,
        applications_by_status,
    }
}

/// Uploads, analyses and applications merged newest first, capped at `limit`.
pub fn recent_activity(
    resumes: &[StoredResume],
    jobs: &[JobRecord],
    applications: &[ApplicationRecord],
    limit: usize,
) -> Vec<ActivityEvent> {
    let job_titles: HashMap<Uuid, &str> = jobs.iter().map(|j| (j.id, j.title.as_str())).collect();

    let mut events: Vec<ActivityEvent> = resumes
        .iter()
        .map(|r| ActivityEvent {
            kind: ActivityKind::ResumeUploaded,
            id: r.id,
            description: format!("Uploaded resume {}", r.filename),
            timestamp: r.uploaded_at,
        })
        .chain(jobs.iter().map(|j| ActivityEvent {
            kind: ActivityKind::JobAnalyzed,
            id: j.id,
            description: format!("Analyzed job {}", j.title),
            timestamp: j.analyzed_at,
        }))
        .chain(applications.iter().map(|a| ActivityEvent {
            kind: ActivityKind::ApplicationCreated,
            id: a.id,
            description: match job_titles.get(&a.job_id) {
                Some(title) => format!("Applied to {title}"),
                None => "Applied to a deleted job".to_string(),
            },
            timestamp: a.created_at,
        }))
        .collect();

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
    events.truncate(limit);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobRequirements;
    use crate::models::resume::ResumeRecord;
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn resume(minutes: i64) -> StoredResume {
        StoredResume {
            id: Uuid::new_v4(),
            filename: format!("cv-{minutes}.pdf"),
            size_bytes: 1,
            uploaded_at: at(minutes),
            record: ResumeRecord::default(),
        }
    }

    fn job(minutes: i64) -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: None,
            location: None,
            description: String::new(),
            analyzed_at: at(minutes),
            requirements: JobRequirements::default(),
        }
    }

    fn application(job_id: Uuid, status: ApplicationStatus, score: Option<f64>, minutes: i64) -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            job_id,
            status,
            notes: None,
            date_applied: at(minutes),
            match_score: score,
            created_at: at(minutes),
            updated_at: at(minutes),
        }
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_stats(&[], &[], &[]);
        assert_eq!(stats.total_applications, 0);
        assert_eq!(stats.average_match_score, 0.0);
        assert!(stats.applications_by_status.is_empty());
    }

    #[test]
    fn test_average_uses_status_proxy_for_missing_scores() {
        let j = job(0);
        let apps = vec![
            application(j.id, ApplicationStatus::Applied, Some(80.0), 1),
            application(j.id, ApplicationStatus::Offered, None, 2),
            application(j.id, ApplicationStatus::Rejected, None, 3),
        ];
        let stats = compute_stats(&[resume(0)], &[j], &apps);
        // (80 + 95 + 30) / 3 = 68.333…
        assert_eq!(stats.average_match_score, 68.3);
        assert_eq!(stats.total_resumes, 1);
        assert_eq!(stats.applications_by_status[&ApplicationStatus::Applied], 1);
    }

    #[test]
    fn test_activity_newest_first_and_capped() {
        let j = job(5);
        let mut resumes: Vec<StoredResume> = (0..12).map(resume).collect();
        resumes.push(resume(100));
        let apps = vec![application(j.id, ApplicationStatus::Applied, None, 50)];

        let events = recent_activity(&resumes, &[j], &apps, ACTIVITY_LIMIT);
        assert_eq!(events.len(), ACTIVITY_LIMIT);
        assert_eq!(events[0].kind, ActivityKind::ResumeUploaded);
        assert_eq!(events[0].timestamp, at(100));
        assert_eq!(events[1].description, "Applied to Backend Engineer");
        assert!(events.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }
}
