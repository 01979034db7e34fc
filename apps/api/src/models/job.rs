use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seniority classification shared by job analysis and resume scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    EntryLevel,
    MidLevel,
    SeniorLevel,
    Executive,
}

impl ExperienceLevel {
    pub fn rank(self) -> i32 {
        match self {
            ExperienceLevel::EntryLevel => 0,
            ExperienceLevel::MidLevel => 1,
            ExperienceLevel::SeniorLevel => 2,
            ExperienceLevel::Executive => 3,
        }
    }

    /// <2 years entry, <5 mid, <10 senior, else executive.
    pub fn from_years(years: f64) -> Self {
        if years < 2.0 {
            ExperienceLevel::EntryLevel
        } else if years < 5.0 {
            ExperienceLevel::MidLevel
        } else if years < 10.0 {
            ExperienceLevel::SeniorLevel
        } else {
            ExperienceLevel::Executive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::EntryLevel => "entry level",
            ExperienceLevel::MidLevel => "mid level",
            ExperienceLevel::SeniorLevel => "senior level",
            ExperienceLevel::Executive => "executive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    Remote,
    Hybrid,
    OnSite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: String,
    pub max: String,
}

/// Structured requirements extracted from a job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub raw_text: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub education_requirements: Vec<String>,
    pub location_type: Option<LocationType>,
    pub responsibilities: Vec<String>,
    pub benefits: Vec<String>,
    pub salary_range: Option<SalaryRange>,
}

/// A persisted job analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: String,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub requirements: JobRequirements,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_level_serde_names() {
        let json = serde_json::to_string(&ExperienceLevel::SeniorLevel).unwrap();
        assert_eq!(json, r#""senior_level""#);
        let level: ExperienceLevel = serde_json::from_str(r#""entry_level""#).unwrap();
        assert_eq!(level, ExperienceLevel::EntryLevel);
    }

    #[test]
    fn test_location_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&LocationType::OnSite).unwrap(),
            r#""on-site""#
        );
    }

    #[test]
    fn test_level_from_years_thresholds() {
        assert_eq!(ExperienceLevel::from_years(0.0), ExperienceLevel::EntryLevel);
        assert_eq!(ExperienceLevel::from_years(1.9), ExperienceLevel::EntryLevel);
        assert_eq!(ExperienceLevel::from_years(2.0), ExperienceLevel::MidLevel);
        assert_eq!(ExperienceLevel::from_years(5.0), ExperienceLevel::SeniorLevel);
        assert_eq!(ExperienceLevel::from_years(12.0), ExperienceLevel::Executive);
    }
}
