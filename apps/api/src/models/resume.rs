use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured output of resume extraction. Absent fields stay `None` or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub raw_text: String,
    pub name: Option<String>,
    pub contact: ContactInfo,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<String>,
    pub summary: Option<String>,
    pub languages: Vec<String>,
    pub awards: Vec<String>,
    pub hobbies: Vec<String>,
    pub personal_details: PersonalDetails,
    /// Extraction ambiguities left unresolved, for human review.
    pub review_flags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Pursuing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: Option<String>,
    pub year: Option<String>,
    pub gpa: Option<String>,
    pub percentage: Option<String>,
    pub status: CompletionStatus,
}

/// A matched date range. `end` of a current role is the extraction date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub text: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub is_current: bool,
}

impl DateRange {
    /// Whole months covered, when both ends parsed and are ordered.
    pub fn months(&self) -> Option<i32> {
        let (start, end) = (self.start?, self.end?);
        let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
        (months >= 0).then_some(months)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: Option<String>,
    pub dates: Option<DateRange>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub title: String,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub duration: Option<DateRange>,
    pub accuracy: Option<String>,
    pub link: Option<String>,
}

/// A persisted resume: upload metadata plus the extracted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResume {
    pub id: Uuid,
    pub filename: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ResumeRecord,
}

impl ResumeRecord {
    /// Years covered by the experience entries, overlapping ranges counted once.
    pub fn experience_years(&self) -> f64 {
        let mut spans: Vec<(NaiveDate, NaiveDate)> = self
            .experience
            .iter()
            .filter_map(|e| e.dates.as_ref())
            .filter(|d| d.months().is_some())
            .filter_map(|d| Some((d.start?, d.end?)))
            .collect();
        spans.sort();

        let mut total_months = 0_i32;
        let mut current: Option<(NaiveDate, NaiveDate)> = None;
        for (start, end) in spans {
            current = match current {
                Some((cs, ce)) if start <= ce => Some((cs, ce.max(end))),
                Some(done) => {
                    total_months += months_between(done.0, done.1);
                    Some((start, end))
                }
                None => Some((start, end)),
            };
        }
        if let Some(done) = current {
            total_months += months_between(done.0, done.1);
        }
        total_months as f64 / 12.0
    }
}

fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    ((end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (i32, u32), end: (i32, u32)) -> DateRange {
        DateRange {
            text: String::new(),
            start: NaiveDate::from_ymd_opt(start.0, start.1, 1),
            end: NaiveDate::from_ymd_opt(end.0, end.1, 1),
            is_current: false,
        }
    }

    fn job(dates: Option<DateRange>) -> ExperienceEntry {
        ExperienceEntry {
            title: "Engineer".to_string(),
            company: None,
            dates,
            description: None,
        }
    }

    #[test]
    fn test_no_experience_is_zero_years() {
        assert_eq!(ResumeRecord::default().experience_years(), 0.0);
    }

    #[test]
    fn test_sequential_ranges_add_up() {
        let record = ResumeRecord {
            experience: vec![
                job(Some(range((2018, 1), (2020, 1)))),
                job(Some(range((2020, 6), (2021, 6)))),
            ],
            ..Default::default()
        };
        assert!((record.experience_years() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlapping_ranges_count_once() {
        let record = ResumeRecord {
            experience: vec![
                job(Some(range((2018, 1), (2021, 1)))),
                job(Some(range((2019, 1), (2020, 1)))),
                job(None),
            ],
            ..Default::default()
        };
        assert!((record.experience_years() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_range_is_ignored() {
        assert_eq!(range((2022, 1), (2020, 1)).months(), None);
    }

    #[test]
    fn test_stored_resume_flattens_record() {
        let stored = StoredResume {
            id: Uuid::nil(),
            filename: "cv.pdf".to_string(),
            size_bytes: 10,
            uploaded_at: Utc::now(),
            record: ResumeRecord {
                name: Some("Jane Doe".to_string()),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["name"], "Jane Doe");
        let back: StoredResume = serde_json::from_value(value).unwrap();
        assert_eq!(back, stored);
    }
}
