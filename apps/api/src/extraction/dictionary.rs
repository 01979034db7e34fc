//! Keyword tables driving extraction and scoring.
//!
//! Everything heuristic lives here as data: skill names, section-header
//! synonyms, degree ranks, title/project keywords, stopwords. A single
//! immutable `Dictionary` is built at startup and shared via `Arc`, so the
//! extractor, job analyzer and scorer never touch module-level state.
//! Deployments extend it with a JSON overrides file instead of code edits.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::job::{ExperienceLevel, LocationType};

/// Resume sections recognized by the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Contact,
    Education,
    Experience,
    Skills,
    Projects,
    Certifications,
    Languages,
    Awards,
    Hobbies,
    PersonalDetails,
    /// Recognized headers whose content nothing extracts (references, strengths...).
    Other,
}

/// One row of the degree table. `generic` terms ("degree") only count when
/// no specific degree term matched the same text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeRule {
    pub term: String,
    pub canonical: String,
    pub rank: u8,
    #[serde(default)]
    pub generic: bool,
}

const SKILLS: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "PHP", "Ruby", "Rust",
    "Swift", "Kotlin", "Scala", "MATLAB", "Golang", "HTML", "CSS", "SQL", "MySQL",
    "PostgreSQL", "MongoDB", "Redis", "Oracle", "SQLite", "MariaDB", "Cassandra",
    "DynamoDB", "React", "Angular", "Vue", "Node.js", "Django", "Flask", "FastAPI",
    "Spring Boot", "Express.js", "Laravel", "Ruby on Rails", "ASP.NET", "jQuery",
    "TensorFlow", "PyTorch", "scikit-learn", "Pandas", "NumPy", "Keras", "OpenCV",
    "AWS", "Azure", "GCP", "Google Cloud", "Heroku", "Docker", "Kubernetes", "Git",
    "Jenkins", "Jira", "Confluence", "Figma", "JUnit", "pytest", "Selenium", "CI/CD",
    "Agile", "Scrum", "Kanban", "DevOps", "TDD", "Linux", "RESTful", "REST API",
    "GraphQL", "Kafka", "Apache Spark", "PySpark", "Hadoop", "Tableau", "Power BI",
    "Machine Learning", "Deep Learning", "NLP", "Computer Vision", "Data Analysis",
    "JDBC", "Verilog", "VLSI", "Embedded C", "Microcontroller", "PCB", "Terraform",
    "Ansible",
];

const SECTION_HEADERS: &[(Section, &[&str])] = &[
    (
        Section::Summary,
        &[
            "summary",
            "professional summary",
            "career summary",
            "career objective",
            "objective",
            "profile",
            "professional profile",
            "about me",
        ],
    ),
    (
        Section::Contact,
        &["contact", "contact information", "contact details"],
    ),
    (
        Section::Education,
        &[
            "education",
            "academic background",
            "academic qualifications",
            "educational qualifications",
            "educational background",
            "qualifications",
            "academics",
        ],
    ),
    (
        Section::Experience,
        &[
            "experience",
            "work experience",
            "professional experience",
            "work history",
            "employment history",
            "employment",
            "internships",
        ],
    ),
    (
        Section::Skills,
        &[
            "skills",
            "technical skills",
            "key skills",
            "skill set",
            "core competencies",
            "competencies",
            "technologies",
            "programming languages",
        ],
    ),
    (
        Section::Projects,
        &["projects", "academic projects", "personal projects", "key projects"],
    ),
    (
        Section::Certifications,
        &[
            "certifications",
            "certification",
            "certificates",
            "licenses",
            "courses",
            "workshops",
        ],
    ),
    (
        Section::Languages,
        &["languages", "languages known", "language proficiency"],
    ),
    (
        Section::Awards,
        &[
            "awards",
            "achievements",
            "honors",
            "honours",
            "accomplishments",
            "recognition",
        ],
    ),
    (
        Section::Hobbies,
        &["hobbies", "interests", "hobbies and interests"],
    ),
    (
        Section::PersonalDetails,
        &[
            "personal details",
            "personal information",
            "personal data",
            "personal profile",
        ],
    ),
    (
        Section::Other,
        &[
            "activities",
            "extracurricular activities",
            "extra curricular activities",
            "strengths",
            "references",
            "declaration",
        ],
    ),
];

// (term, canonical, rank, generic)
const DEGREES: &[(&str, &str, u8, bool)] = &[
    ("high school", "high school", 0, false),
    ("secondary school", "high school", 0, false),
    ("higher secondary", "high school", 0, false),
    ("schooling", "high school", 0, false),
    ("diploma", "diploma", 1, false),
    ("polytechnic", "diploma", 1, false),
    ("associate", "associate", 1, false),
    ("associates", "associate", 1, false),
    ("certificate", "certificate", 1, false),
    ("bachelor", "bachelor", 2, false),
    ("bachelors", "bachelor", 2, false),
    ("b.tech", "bachelor", 2, false),
    ("btech", "bachelor", 2, false),
    ("b.e", "bachelor", 2, false),
    ("b.sc", "bachelor", 2, false),
    ("bsc", "bachelor", 2, false),
    ("b.s", "bachelor", 2, false),
    ("b.a", "bachelor", 2, false),
    ("bba", "bachelor", 2, false),
    ("bca", "bachelor", 2, false),
    ("undergraduate", "bachelor", 2, false),
    ("degree", "degree", 2, true),
    ("master", "master", 3, false),
    ("masters", "master", 3, false),
    ("m.tech", "master", 3, false),
    ("mtech", "master", 3, false),
    ("m.sc", "master", 3, false),
    ("msc", "master", 3, false),
    ("m.s", "master", 3, false),
    ("mba", "master", 3, false),
    ("mca", "master", 3, false),
    ("postgraduate", "master", 3, false),
    ("ph.d", "doctorate", 4, false),
    ("phd", "doctorate", 4, false),
    ("doctorate", "doctorate", 4, false),
    ("doctoral", "doctorate", 4, false),
];

const INSTITUTION_KEYWORDS: &[&str] = &[
    "university", "college", "institute", "school", "academy", "polytechnic", "campus",
    "iit", "nit", "mit",
];

const JOB_TITLES: &[&str] = &[
    "software engineer", "engineer", "developer", "programmer", "data scientist",
    "scientist", "analyst", "manager", "director", "lead", "architect", "consultant",
    "intern", "internship", "associate", "specialist", "coordinator", "assistant",
    "administrator", "designer", "tester", "qa", "devops", "officer", "trainee",
    "founder", "co-founder", "researcher", "technician", "lecturer", "professor",
    "teacher", "cto", "ceo", "vp",
];

const PROJECT_KEYWORDS: &[&str] = &[
    "project", "system", "application", "website", "app", "platform", "tool",
    "detection", "analysis", "generator", "identification", "classifier", "prediction",
    "chatbot", "dashboard", "recognition",
];

const SPOKEN_LANGUAGES: &[&str] = &[
    "English", "Hindi", "Telugu", "Tamil", "Kannada", "Malayalam", "Marathi",
    "Gujarati", "Bengali", "Punjabi", "Urdu", "French", "Spanish", "German",
    "Chinese", "Mandarin", "Japanese", "Korean", "Arabic", "Portuguese", "Italian",
    "Russian",
];

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "could", "did", "do", "does",
    "doing", "down", "during", "each", "etc", "few", "for", "from", "further", "get",
    "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "i", "if", "in", "into", "is", "it", "its", "itself", "just", "may", "me", "more",
    "most", "must", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "out", "over", "own", "per", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "us", "very", "via", "was", "we", "well", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "within", "would", "you", "your",
    "yours",
];

const PREFERRED_INDICATORS: &[&str] = &[
    "preferred", "nice to have", "nice-to-have", "bonus", "plus", "advantage",
    "advantageous", "ideally", "optional", "would be great", "desirable",
];

const RESPONSIBILITY_INDICATORS: &[&str] = &[
    "responsible for", "duties include", "will be responsible", "key responsibilities",
    "primary duties", "job duties", "responsibilities include", "will be expected to",
    "you will",
];

const BENEFITS: &[&str] = &[
    "health insurance", "dental insurance", "vision insurance", "401k", "retirement",
    "paid time off", "pto", "vacation", "sick leave", "remote work", "flexible hours",
    "stock options", "equity", "professional development", "tuition reimbursement",
    "gym membership", "free lunch", "parental leave",
];

// Checked in order; the first level with a hit wins.
const EXPERIENCE_LEVELS: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Executive,
        &["chief", "vp", "vice president", "head of", "director", "cto", "ceo"],
    ),
    (
        ExperienceLevel::SeniorLevel,
        &["senior", "sr", "lead", "principal", "staff engineer"],
    ),
    (
        ExperienceLevel::MidLevel,
        &["mid level", "mid-level", "intermediate"],
    ),
    (
        ExperienceLevel::EntryLevel,
        &["entry level", "entry-level", "junior", "jr", "graduate", "intern", "trainee"],
    ),
];

const LOCATION_TYPES: &[(LocationType, &[&str])] = &[
    (LocationType::Hybrid, &["hybrid"]),
    (LocationType::Remote, &["remote", "work from home", "wfh"]),
    (
        LocationType::OnSite,
        &["on-site", "onsite", "on site", "in-office", "in office"],
    ),
];

/// Immutable keyword tables shared by the extraction and matching pipeline.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub skills: Vec<String>,
    pub section_headers: Vec<(Section, Vec<String>)>,
    pub degrees: Vec<DegreeRule>,
    pub institution_keywords: Vec<String>,
    pub job_titles: Vec<String>,
    pub project_keywords: Vec<String>,
    pub spoken_languages: Vec<String>,
    pub stopwords: HashSet<String>,
    pub preferred_indicators: Vec<String>,
    pub responsibility_indicators: Vec<String>,
    pub benefits: Vec<String>,
    pub experience_levels: Vec<(ExperienceLevel, Vec<String>)>,
    pub location_types: Vec<(LocationType, Vec<String>)>,
}

/// Additions read from `DICTIONARY_PATH`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DictionaryOverrides {
    pub skills: Vec<String>,
    pub section_headers: BTreeMap<Section, Vec<String>>,
    pub degrees: Vec<DegreeRule>,
    pub job_titles: Vec<String>,
    pub project_keywords: Vec<String>,
    pub spoken_languages: Vec<String>,
    pub stopwords: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Dictionary {
    fn default() -> Self {
        Self {
            skills: owned(SKILLS),
            section_headers: SECTION_HEADERS
                .iter()
                .map(|(section, synonyms)| (*section, owned(synonyms)))
                .collect(),
            degrees: DEGREES
                .iter()
                .map(|(term, canonical, rank, generic)| DegreeRule {
                    term: term.to_string(),
                    canonical: canonical.to_string(),
                    rank: *rank,
                    generic: *generic,
                })
                .collect(),
            institution_keywords: owned(INSTITUTION_KEYWORDS),
            job_titles: owned(JOB_TITLES),
            project_keywords: owned(PROJECT_KEYWORDS),
            spoken_languages: owned(SPOKEN_LANGUAGES),
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
            preferred_indicators: owned(PREFERRED_INDICATORS),
            responsibility_indicators: owned(RESPONSIBILITY_INDICATORS),
            benefits: owned(BENEFITS),
            experience_levels: EXPERIENCE_LEVELS
                .iter()
                .map(|(level, terms)| (*level, owned(terms)))
                .collect(),
            location_types: LOCATION_TYPES
                .iter()
                .map(|(kind, terms)| (*kind, owned(terms)))
                .collect(),
        }
    }
}

impl Dictionary {
    /// Built-in tables, extended by the overrides file when a path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut dictionary = Dictionary::default();
        if let Some(path) = path {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading dictionary overrides {}", path.display()))?;
            let overrides: DictionaryOverrides = serde_json::from_str(&raw)
                .with_context(|| format!("parsing dictionary overrides {}", path.display()))?;
            dictionary.apply(overrides);
        }
        Ok(dictionary)
    }

    pub fn apply(&mut self, overrides: DictionaryOverrides) {
        extend_unique(&mut self.skills, overrides.skills);
        extend_unique(&mut self.job_titles, overrides.job_titles);
        extend_unique(&mut self.project_keywords, overrides.project_keywords);
        extend_unique(&mut self.spoken_languages, overrides.spoken_languages);
        self.stopwords
            .extend(overrides.stopwords.into_iter().map(|s| s.to_lowercase()));
        self.degrees.extend(overrides.degrees);

        for (section, synonyms) in overrides.section_headers {
            let synonyms: Vec<String> = synonyms.into_iter().map(|s| s.to_lowercase()).collect();
            match self.section_headers.iter_mut().find(|(s, _)| *s == section) {
                Some((_, existing)) => extend_unique(existing, synonyms),
                None => self.section_headers.push((section, synonyms)),
            }
        }
    }

    /// Dictionary skills present in `text`, ordered by first occurrence.
    pub fn skills_in(&self, text: &str) -> Vec<String> {
        terms_in(&text.to_lowercase(), &self.skills)
    }

    pub fn spoken_languages_in(&self, text: &str) -> Vec<String> {
        terms_in(&text.to_lowercase(), &self.spoken_languages)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Degree rules matching `text`; generic rules only when nothing specific matched.
    fn degree_rules_in(&self, text: &str) -> Vec<&DegreeRule> {
        let lower = text.to_lowercase();
        let matched: Vec<&DegreeRule> = self
            .degrees
            .iter()
            .filter(|rule| contains_term(&lower, &rule.term))
            .collect();
        if matched.iter().any(|r| !r.generic) {
            matched.into_iter().filter(|r| !r.generic).collect()
        } else {
            matched
        }
    }

    pub fn has_degree(&self, text: &str) -> bool {
        !self.degree_rules_in(text).is_empty()
    }

    /// Highest degree rank mentioned in `text`.
    pub fn degree_rank(&self, text: &str) -> Option<u8> {
        self.degree_rules_in(text).iter().map(|r| r.rank).max()
    }

    pub fn degree_rank_of_canonical(&self, canonical: &str) -> Option<u8> {
        self.degrees
            .iter()
            .filter(|r| r.canonical.eq_ignore_ascii_case(canonical))
            .map(|r| r.rank)
            .max()
    }

    /// Canonical degree names mentioned in `text`, lowest rank first.
    pub fn degree_requirements_in(&self, text: &str) -> Vec<String> {
        let mut rules = self.degree_rules_in(text);
        rules.sort_by_key(|r| r.rank);
        let mut out: Vec<String> = Vec::new();
        for rule in rules {
            if !out.contains(&rule.canonical) {
                out.push(rule.canonical.clone());
            }
        }
        out
    }

    pub fn is_job_title(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.job_titles)
    }

    pub fn is_project_line(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.project_keywords)
    }

    pub fn has_institution_keyword(&self, text_lower: &str) -> bool {
        contains_any(text_lower, &self.institution_keywords)
    }
}

fn extend_unique(target: &mut Vec<String>, additions: Vec<String>) {
    for item in additions {
        if !target.iter().any(|t| t.eq_ignore_ascii_case(&item)) {
            target.push(item);
        }
    }
}

/// Word-boundary containment: `term` must not be glued to letters or digits.
/// Both arguments are expected lowercase.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    find_term(haystack, term).is_some()
}

/// Byte offset of the first word-boundary occurrence of `term`.
pub fn find_term(haystack: &str, term: &str) -> Option<usize> {
    let term = term.to_lowercase();
    if term.is_empty() {
        return None;
    }
    haystack.match_indices(term.as_str()).find_map(|(idx, _)| {
        let before_ok = haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[idx + term.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        (before_ok && after_ok).then_some(idx)
    })
}

pub fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| contains_term(haystack, t))
}

/// Terms from `table` present in `haystack_lower`, by first occurrence, table casing kept.
pub fn terms_in(haystack_lower: &str, table: &[String]) -> Vec<String> {
    let mut hits: Vec<(usize, usize)> = table
        .iter()
        .enumerate()
        .filter_map(|(i, term)| find_term(haystack_lower, term).map(|pos| (pos, i)))
        .collect();
    hits.sort();
    hits.into_iter().map(|(_, i)| table[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        assert!(contains_term("java and sql", "java"));
        assert!(!contains_term("javascript only", "java"));
        assert!(contains_term("modern c++ code", "c++"));
        assert!(!contains_term("restful services", "rest"));
        assert!(contains_term("node.js, react", "node.js"));
    }

    #[test]
    fn test_skills_in_orders_by_first_occurrence() {
        let dict = Dictionary::default();
        let skills = dict.skills_in("Built with Docker and Python; deployed on AWS with Docker");
        assert_eq!(skills, vec!["Docker", "Python", "AWS"]);
    }

    #[test]
    fn test_degree_rank_ordering() {
        let dict = Dictionary::default();
        assert_eq!(dict.degree_rank("Diploma in Electronics"), Some(1));
        assert_eq!(dict.degree_rank("Bachelor of Science"), Some(2));
        assert_eq!(dict.degree_rank("M.Tech in VLSI"), Some(3));
        assert_eq!(dict.degree_rank("Ph.D. Computer Science"), Some(4));
        assert_eq!(dict.degree_rank("Worked at Acme"), None);
    }

    #[test]
    fn test_generic_degree_only_without_specific_match() {
        let dict = Dictionary::default();
        assert_eq!(dict.degree_rank("Associate Degree in Nursing"), Some(1));
        assert_eq!(dict.degree_rank("degree in a related field"), Some(2));
    }

    #[test]
    fn test_degree_requirements_are_canonical_and_ranked() {
        let dict = Dictionary::default();
        let reqs = dict.degree_requirements_in("Master's preferred, Bachelor's degree required");
        assert_eq!(reqs, vec!["bachelor", "master"]);
    }

    #[test]
    fn test_overrides_extend_tables() {
        let mut dict = Dictionary::default();
        let overrides: DictionaryOverrides = serde_json::from_str(
            r#"{
                "skills": ["Elixir", "python"],
                "section_headers": {"skills": ["toolbox"]},
                "stopwords": ["Synergy"]
            }"#,
        )
        .unwrap();
        let skills_before = dict.skills.len();
        dict.apply(overrides);

        assert_eq!(dict.skills.len(), skills_before + 1);
        assert_eq!(dict.skills_in("Elixir daily"), vec!["Elixir"]);
        assert!(dict.is_stopword("synergy"));
        let skills_synonyms = &dict
            .section_headers
            .iter()
            .find(|(s, _)| *s == Section::Skills)
            .unwrap()
            .1;
        assert!(skills_synonyms.contains(&"toolbox".to_string()));
    }

    #[test]
    fn test_load_without_path_is_default() {
        let dict = Dictionary::load(None).unwrap();
        assert_eq!(dict.skills.len(), SKILLS.len());
    }
}
