//! Job description analysis.

use std::sync::Arc;

use tracing::debug;

use super::dictionary::{contains_any, terms_in, Dictionary};
use super::patterns::Patterns;
use crate::models::job::{ExperienceLevel, JobRequirements, LocationType, SalaryRange};

const MIN_RESPONSIBILITY_CHARS: usize = 15;

pub struct JobAnalyzer {
    dictionary: Arc<Dictionary>,
    patterns: Patterns,
}

impl JobAnalyzer {
    pub fn new(dictionary: Arc<Dictionary>) -> Result<Self, regex::Error> {
        Ok(Self {
            dictionary,
            patterns: Patterns::new()?,
        })
    }

    pub fn analyze(&self, title: &str, description: &str) -> JobRequirements {
        let raw_text = description.split_whitespace().collect::<Vec<_>>().join(" ");
        let sentences: Vec<&str> = self
            .patterns
            .sentence_break
            .split(description)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let (required_skills, preferred_skills) = self.skills(&raw_text, &sentences);
        let requirements = JobRequirements {
            required_skills,
            preferred_skills,
            experience_level: self.experience_level(title, &raw_text),
            education_requirements: self.dictionary.degree_requirements_in(&raw_text),
            location_type: self.location_type(&format!("{title} {raw_text}")),
            responsibilities: self.responsibilities(&sentences),
            benefits: terms_in(&raw_text.to_lowercase(), &self.dictionary.benefits),
            salary_range: self.salary_range(&raw_text),
            raw_text,
        };

        debug!(
            title,
            required = requirements.required_skills.len(),
            preferred = requirements.preferred_skills.len(),
            level = ?requirements.experience_level,
            "job analyzed"
        );
        requirements
    }

    /// Skills in sentences with a "preferred" cue are preferred unless some
    /// other sentence requires them. Both lists keep first-occurrence order.
    fn skills(&self, raw_text: &str, sentences: &[&str]) -> (Vec<String>, Vec<String>) {
        let mut required: Vec<String> = Vec::new();
        let mut preferred: Vec<String> = Vec::new();
        for sentence in sentences {
            let preferred_cue =
                contains_any(&sentence.to_lowercase(), &self.dictionary.preferred_indicators);
            let bucket = if preferred_cue {
                &mut preferred
            } else {
                &mut required
            };
            bucket.extend(self.dictionary.skills_in(sentence));
        }

        let all = self.dictionary.skills_in(raw_text);
        let required_skills: Vec<String> = all
            .iter()
            .filter(|s| required.contains(s))
            .cloned()
            .collect();
        let preferred_skills = all
            .into_iter()
            .filter(|s| preferred.contains(s) && !required_skills.contains(s))
            .collect();
        (required_skills, preferred_skills)
    }

    /// Title keywords first, then an explicit "N+ years", then description keywords.
    fn experience_level(&self, title: &str, raw_text: &str) -> Option<ExperienceLevel> {
        self.level_from_keywords(&title.to_lowercase())
            .or_else(|| {
                self.patterns
                    .years_required
                    .captures(raw_text)
                    .and_then(|c| c.get(1)?.as_str().parse::<f64>().ok())
                    .map(ExperienceLevel::from_years)
            })
            .or_else(|| self.level_from_keywords(&raw_text.to_lowercase()))
    }

    fn level_from_keywords(&self, lower: &str) -> Option<ExperienceLevel> {
        self.dictionary
            .experience_levels
            .iter()
            .find(|(_, terms)| contains_any(lower, terms))
            .map(|(level, _)| *level)
    }

    fn location_type(&self, text: &str) -> Option<LocationType> {
        let lower = text.to_lowercase();
        self.dictionary
            .location_types
            .iter()
            .find(|(_, terms)| contains_any(&lower, terms))
            .map(|(kind, _)| *kind)
    }

    fn responsibilities(&self, sentences: &[&str]) -> Vec<String> {
        sentences
            .iter()
            .filter(|s| s.chars().count() >= MIN_RESPONSIBILITY_CHARS)
            .filter(|s| contains_any(&s.to_lowercase(), &self.dictionary.responsibility_indicators))
            .map(|s| s.to_string())
            .collect()
    }

    fn salary_range(&self, raw_text: &str) -> Option<SalaryRange> {
        self.patterns.salary.iter().find_map(|pattern| {
            let caps = pattern.captures(raw_text)?;
            Some(SalaryRange {
                min: caps.get(1)?.as_str().to_string(),
                max: caps.get(2)?.as_str().to_string(),
            })
        })
    }
}
