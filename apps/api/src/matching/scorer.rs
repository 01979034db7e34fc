//! Resume ↔ job scoring.
//!
//! Default: `KeywordMatchScorer` (pure, deterministic, no I/O). `AppState`
//! holds an `Arc<dyn MatchScorer>` so another backend can be swapped in at
//! startup without touching handlers.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text::{tfidf_cosine, token_set, tokenize};
use crate::extraction::Dictionary;
use crate::models::job::{ExperienceLevel, JobRecord};
use crate::models::resume::StoredResume;

const STRENGTH_THRESHOLD: f64 = 0.75;
const WEAKNESS_THRESHOLD: f64 = 0.5;
const MAX_LISTED_SKILLS: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub keyword: f64,
    pub text_similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub scores: SubScores,
    pub overall_score: f64, // 0.0 – 1.0
    pub resume_seniority: ExperienceLevel,
    pub experience_years: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub matching_keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Aggregate weights. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchWeights {
    pub skills: f64,
    pub text_similarity: f64,
    pub experience: f64,
    pub keyword: f64,
    pub education: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skills: 0.35,
            text_similarity: 0.25,
            experience: 0.20,
            keyword: 0.15,
            education: 0.05,
        }
    }
}

impl MatchWeights {
    pub fn total(&self) -> f64 {
        self.skills + self.text_similarity + self.experience + self.keyword + self.education
    }
}

/// Weighted aggregate of the sub-scores, clamped to [0, 1].
pub fn compute_weighted_score(scores: &SubScores, weights: &MatchWeights) -> f64 {
    (weights.skills * scores.skills
        + weights.text_similarity * scores.text_similarity
        + weights.experience * scores.experience
        + weights.keyword * scores.keyword
        + weights.education * scores.education)
        .clamp(0.0, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Carried in `AppState` as `Arc<dyn MatchScorer>`. Scoring never fails:
/// missing data lowers sub-scores instead.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, resume: &StoredResume, job: &JobRecord) -> MatchResult;
}

/// Dictionary-driven scorer: set overlap, seniority bands, degree ranks and
/// TF-IDF cosine.
pub struct KeywordMatchScorer {
    dictionary: Arc<Dictionary>,
    weights: MatchWeights,
}

impl KeywordMatchScorer {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            weights: MatchWeights::default(),
        }
    }
}

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    async fn score(&self, resume: &StoredResume, job: &JobRecord) -> MatchResult {
        compute_match(resume, job, &self.dictionary, &self.weights)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core scoring algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_match(
    resume: &StoredResume,
    job: &JobRecord,
    dictionary: &Dictionary,
    weights: &MatchWeights,
) -> MatchResult {
    debug_assert!((weights.total() - 1.0).abs() < 1e-9, "match weights must sum to 1.0");
    let record = &resume.record;
    let reqs = &job.requirements;

    // Skills
    let resume_skills: BTreeSet<String> =
        record.skills.iter().map(|s| s.to_lowercase()).collect();
    let (matched_skills, missing_skills): (Vec<String>, Vec<String>) = reqs
        .required_skills
        .iter()
        .cloned()
        .partition(|s| resume_skills.contains(&s.to_lowercase()));
    let skills = if reqs.required_skills.is_empty() {
        1.0
    } else {
        (matched_skills.len() as f64 / reqs.required_skills.len() as f64).clamp(0.0, 1.0)
    };

    // Keywords
    let job_text = if reqs.raw_text.is_empty() {
        job.description.as_str()
    } else {
        reqs.raw_text.as_str()
    };
    let resume_text = resume_document(resume);
    let job_tokens = token_set(job_text, dictionary);
    let resume_tokens = token_set(&resume_text, dictionary);
    let matching_keywords: Vec<String> = job_tokens.intersection(&resume_tokens).cloned().collect();
    let keyword = if job_tokens.is_empty() {
        0.0
    } else {
        matching_keywords.len() as f64 / job_tokens.len() as f64
    };

    // Experience
    let experience_years = record.experience_years();
    let resume_seniority = ExperienceLevel::from_years(experience_years);
    let experience = match reqs.experience_level {
        None => 1.0,
        Some(required) => match (resume_seniority.rank() - required.rank()).abs() {
            0 => 1.0,
            1 => 0.5,
            _ => 0.0,
        },
    };

    // Education
    let required_rank = reqs
        .education_requirements
        .iter()
        .filter_map(|r| dictionary.degree_rank_of_canonical(r))
        .min();
    let resume_rank = record
        .education
        .iter()
        .filter_map(|e| dictionary.degree_rank(&e.degree))
        .max();
    let education = match (required_rank, resume_rank) {
        (None, _) => 1.0,
        (Some(required), Some(held)) if held >= required => 1.0,
        _ => 0.0,
    };

    let text_similarity = tfidf_cosine(
        &tokenize(&resume_text, dictionary),
        &tokenize(job_text, dictionary),
    );

    let scores = SubScores {
        skills,
        experience,
        education,
        keyword,
        text_similarity,
    };
    let overall_score = compute_weighted_score(&scores, weights);
    let has_education_reqs = required_rank.is_some();

    MatchResult {
        resume_id: resume.id,
        job_id: job.id,
        strengths: build_strengths(&scores, job, &matched_skills, resume_seniority, has_education_reqs),
        weaknesses: build_weaknesses(&scores, job, &missing_skills, resume_seniority, has_education_reqs),
        recommendations: build_recommendations(&scores, &missing_skills),
        scores,
        overall_score,
        resume_seniority,
        experience_years,
        matched_skills,
        missing_skills,
        matching_keywords,
    }
}

/// Resume text used for similarity: raw text plus the structured fields.
fn resume_document(resume: &StoredResume) -> String {
    let record = &resume.record;
    let mut parts: Vec<String> = vec![record.raw_text.clone(), record.skills.join(" ")];
    for exp in &record.experience {
        parts.push(exp.title.clone());
        parts.extend(exp.company.clone());
        parts.extend(exp.description.clone());
    }
    for edu in &record.education {
        parts.push(edu.degree.clone());
        parts.extend(edu.institution.clone());
    }
    parts.join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Annotations
// ────────────────────────────────────────────────────────────────────────────

fn build_strengths(
    scores: &SubScores,
    job: &JobRecord,
    matched: &[String],
    seniority: ExperienceLevel,
    has_education_reqs: bool,
) -> Vec<String> {
    let reqs = &job.requirements;
    let mut out = Vec::new();
    if !reqs.required_skills.is_empty() && scores.skills >= STRENGTH_THRESHOLD {
        out.push(format!(
            "Covers {}/{} required skills",
            matched.len(),
            reqs.required_skills.len()
        ));
    }
    if let Some(required) = reqs.experience_level {
        if scores.experience >= STRENGTH_THRESHOLD {
            out.push(format!(
                "Experience level well matched ({} vs {})",
                seniority.label(),
                required.label()
            ));
        }
    }
    if has_education_reqs && scores.education >= STRENGTH_THRESHOLD {
        out.push("Meets the education requirements".to_string());
    }
    if scores.keyword >= STRENGTH_THRESHOLD {
        out.push("Strong keyword overlap with the job description".to_string());
    }
    if scores.text_similarity >= STRENGTH_THRESHOLD {
        out.push("Resume closely mirrors the job description".to_string());
    }
    out
}

fn build_weaknesses(
    scores: &SubScores,
    job: &JobRecord,
    missing: &[String],
    seniority: ExperienceLevel,
    has_education_reqs: bool,
) -> Vec<String> {
    let reqs = &job.requirements;
    let mut out = Vec::new();
    if scores.skills < WEAKNESS_THRESHOLD {
        out.push(format!(
            "Missing {} of {} required skills",
            missing.len(),
            reqs.required_skills.len()
        ));
    }
    if let Some(required) = reqs.experience_level {
        if scores.experience < WEAKNESS_THRESHOLD {
            out.push(format!(
                "Experience level may not match requirements ({} vs {})",
                seniority.label(),
                required.label()
            ));
        }
    }
    if has_education_reqs && scores.education < WEAKNESS_THRESHOLD {
        out.push(format!(
            "Education below the stated requirement ({})",
            reqs.education_requirements.join(", ")
        ));
    }
    if scores.keyword < WEAKNESS_THRESHOLD {
        out.push("Low keyword overlap with the job description".to_string());
    }
    if scores.text_similarity < WEAKNESS_THRESHOLD {
        out.push("Resume wording differs from the job description".to_string());
    }
    out
}

fn build_recommendations(scores: &SubScores, missing: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    if !missing.is_empty() {
        let listed: Vec<&str> = missing
            .iter()
            .take(MAX_LISTED_SKILLS)
            .map(String::as_str)
            .collect();
        out.push(format!(
            "Consider adding these required skills: {}",
            listed.join(", ")
        ));
    }
    if scores.experience < 0.6 {
        out.push(
            "Consider highlighting relevant experience or projects that match the role level"
                .to_string(),
        );
    }
    if scores.text_similarity < 0.3 {
        out.push(
            "Consider tailoring your resume wording to the job description".to_string(),
        );
    }
    if out.is_empty() {
        out.push("Your resume aligns well with this job, consider applying".to_string());
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
