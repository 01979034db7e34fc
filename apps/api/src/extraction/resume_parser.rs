//! Heuristic resume extraction: raw document text in, `ResumeRecord` out.
//!
//! Extraction never fails. Anything that cannot be located is left empty,
//! and header ambiguities are surfaced through `review_flags`.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::debug;

use super::dictionary::{contains_term, Dictionary, Section};
use super::patterns::Patterns;
use super::sections::{classify_header, is_bullet, segment, strip_bullet, HeaderMatch, SectionedText};
use crate::models::resume::{
    CompletionStatus, ContactInfo, DateRange, EducationEntry, ExperienceEntry, PersonalDetails,
    ProjectEntry, ResumeRecord,
};

const NAME_SCAN_LINES: usize = 10;
const MAX_NAME_WORDS: usize = 6;
const MAX_ADDRESS_WORDS: usize = 12;
const MAX_SKILL_WORDS: usize = 4;
const MAX_SKILL_CHARS: usize = 40;
const MAX_PROJECT_TITLE_WORDS: usize = 12;

const PURSUING_MARKERS: &[&str] = &[
    "pursuing", "expected", "ongoing", "in progress", "present", "current", "till date",
];

const TECH_LABELS: &[&str] = &[
    "technologies", "technologies used", "technology", "tech stack", "stack", "tools",
    "tools used", "built with",
];

const MINOR_WORDS: &[&str] = &["of", "and", "the", "for", "in", "at", "&", "de"];

pub struct ResumeExtractor {
    dictionary: Arc<Dictionary>,
    patterns: Patterns,
}

impl ResumeExtractor {
    pub fn new(dictionary: Arc<Dictionary>) -> Result<Self, regex::Error> {
        Ok(Self {
            dictionary,
            patterns: Patterns::new()?,
        })
    }

    pub fn extract(&self, text: &str) -> ResumeRecord {
        self.extract_as_of(text, Utc::now().date_naive())
    }

    /// Extraction with "present" date ranges resolved against `today`.
    pub fn extract_as_of(&self, text: &str, today: NaiveDate) -> ResumeRecord {
        let lines = clean_lines(text);
        if lines.is_empty() {
            return ResumeRecord::default();
        }

        let sectioned = segment(&lines, &self.dictionary);
        let raw_text = lines.join("\n");
        let name = self.name(&sectioned);

        let record = ResumeRecord {
            contact: self.contact(&sectioned, &raw_text, name.as_deref()),
            skills: self.skills(&sectioned, &raw_text),
            education: self.education(sectioned.lines(Section::Education), today),
            experience: self.experience(sectioned.lines(Section::Experience), today),
            projects: self.projects(sectioned.lines(Section::Projects), today),
            certifications: certifications(sectioned.lines(Section::Certifications)),
            summary: joined(sectioned.lines(Section::Summary)),
            languages: self.languages(&sectioned, &raw_text),
            awards: listed_lines(sectioned.lines(Section::Awards)),
            hobbies: list_items(sectioned.lines(Section::Hobbies))
                .into_iter()
                .filter(|item| !self.patterns.email.is_match(item))
                .collect(),
            personal_details: self.personal_details(&sectioned, &lines),
            review_flags: sectioned.flags.clone(),
            name,
            raw_text,
        };

        debug!(
            name = ?record.name,
            skills = record.skills.len(),
            education = record.education.len(),
            experience = record.experience.len(),
            projects = record.projects.len(),
            flags = record.review_flags.len(),
            "resume extracted"
        );
        record
    }

    // ---------------------------------------------------------------------------
    // Identity and contact
    // ---------------------------------------------------------------------------

    /// First preamble line that reads as a person's name.
    fn name(&self, sectioned: &SectionedText) -> Option<String> {
        sectioned
            .preamble
            .iter()
            .take(NAME_SCAN_LINES)
            .filter_map(|line| line.split(['|', '•']).next())
            .map(|candidate| candidate.trim().trim_end_matches(['.', ',']))
            .find(|candidate| self.looks_like_name(candidate))
            .map(str::to_string)
    }

    fn looks_like_name(&self, candidate: &str) -> bool {
        let words: Vec<&str> = candidate.split_whitespace().collect();
        if words.is_empty() || words.len() > MAX_NAME_WORDS {
            return false;
        }
        if candidate
            .chars()
            .any(|c| c.is_ascii_digit() || matches!(c, '@' | ',' | ':' | '/'))
        {
            return false;
        }
        if !words
            .iter()
            .all(|w| w.chars().next().map_or(false, char::is_alphabetic))
        {
            return false;
        }
        let lower = candidate.to_lowercase();
        if lower == "cv" || lower.contains("resume") || lower.contains("curriculum vitae") {
            return false;
        }
        !self.patterns.url.is_match(candidate)
            && !self.dictionary.is_job_title(&lower)
            && classify_header(candidate, &self.dictionary) == HeaderMatch::None
    }

    fn contact(&self, sectioned: &SectionedText, raw_text: &str, name: Option<&str>) -> ContactInfo {
        let header_lines: Vec<&String> = sectioned
            .preamble
            .iter()
            .chain(sectioned.lines(Section::Contact))
            .collect();
        let header_text = header_lines
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let email = self
            .patterns
            .email
            .find(raw_text)
            .map(|m| m.as_str().to_string());
        let phone = self
            .patterns
            .find_phone(&header_text)
            .or_else(|| self.patterns.find_phone(raw_text));

        let labelled_address = raw_text.lines().find_map(|line| {
            let caps = self.patterns.labelled_value.captures(line)?;
            caps.get(1)?
                .as_str()
                .eq_ignore_ascii_case("address")
                .then(|| caps.get(2).map(|m| m.as_str().trim().to_string()))
                .flatten()
        });
        let address = labelled_address.or_else(|| {
            header_lines
                .iter()
                .flat_map(|line| line.split(['|', '•']))
                .map(str::trim)
                .find(|segment| Some(*segment) != name && self.looks_like_address(segment))
                .map(str::to_string)
        });

        ContactInfo {
            email,
            phone,
            address,
        }
    }

    /// `Boston, MA` / `12 Main St, Springfield`: comma-separated capitalized parts.
    fn looks_like_address(&self, segment: &str) -> bool {
        if !segment.contains(',')
            || segment.split_whitespace().count() > MAX_ADDRESS_WORDS
            || segment.contains(':')
            || self.patterns.email.is_match(segment)
            || self.patterns.url.is_match(segment)
            || self.patterns.has_phone(segment)
        {
            return false;
        }
        segment.split(',').map(str::trim).all(|part| {
            part.chars()
                .next()
                .map_or(false, |c| c.is_uppercase() || c.is_ascii_digit())
        })
    }

    // ---------------------------------------------------------------------------
    // Skills and languages
    // ---------------------------------------------------------------------------

    /// Skills-section fragments first, then dictionary hits from the whole text.
    fn skills(&self, sectioned: &SectionedText, raw_text: &str) -> Vec<String> {
        let mut skills = Vec::new();
        for line in sectioned.lines(Section::Skills) {
            let content = strip_bullet(line);
            let content = match content.split_once(':') {
                Some((label, rest)) if label.split_whitespace().count() <= MAX_SKILL_WORDS => rest,
                _ => content,
            };
            for fragment in split_list(content) {
                if fragment.chars().count() <= MAX_SKILL_CHARS
                    && fragment.split_whitespace().count() <= MAX_SKILL_WORDS
                {
                    push_unique(&mut skills, fragment);
                }
            }
        }
        for skill in self.dictionary.skills_in(raw_text) {
            push_unique(&mut skills, skill);
        }
        skills
    }

    fn languages(&self, sectioned: &SectionedText, raw_text: &str) -> Vec<String> {
        if sectioned.has(Section::Languages) {
            self.dictionary
                .spoken_languages_in(&sectioned.text(Section::Languages))
        } else {
            self.dictionary.spoken_languages_in(raw_text)
        }
    }

    fn personal_details(&self, sectioned: &SectionedText, lines: &[String]) -> PersonalDetails {
        let scope = if sectioned.has(Section::PersonalDetails) {
            sectioned.lines(Section::PersonalDetails)
        } else {
            lines
        };

        let mut details = PersonalDetails::default();
        for line in scope {
            let Some(caps) = self.patterns.labelled_value.captures(line) else {
                continue;
            };
            let (Some(label), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let value = value.as_str().split('|').next().unwrap_or("").trim();
            if value.is_empty() {
                continue;
            }
            let slot = match label.as_str().to_lowercase().as_str() {
                "date of birth" | "dob" => &mut details.date_of_birth,
                "gender" | "sex" => &mut details.gender,
                "marital status" => &mut details.marital_status,
                "nationality" => &mut details.nationality,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
        details
    }

    // ---------------------------------------------------------------------------
    // Education
    // ---------------------------------------------------------------------------

    /// One entry per degree line; surrounding lines fill institution, year and grades.
    fn education(&self, lines: &[String], today: NaiveDate) -> Vec<EducationEntry> {
        let mut entries = Vec::new();
        let mut current: Option<EducationDraft> = None;
        let mut pending_institution: Option<String> = None;

        for line in lines {
            let content = strip_bullet(line);
            if self.dictionary.has_degree(content) {
                if let Some(done) = current.take() {
                    entries.push(done.finish(today));
                }
                let mut draft = self.degree_line(content, today);
                if draft.institution.is_none() {
                    draft.institution = pending_institution.take();
                }
                current = Some(draft);
                continue;
            }

            let candidate = self.institution_candidate(content);
            match current.as_mut() {
                Some(draft) => {
                    match candidate {
                        Some(name) if draft.institution.is_none() => draft.institution = Some(name),
                        Some(name) => pending_institution = Some(name),
                        None => {}
                    }
                    draft.absorb(content, &self.patterns, today);
                }
                None => {
                    if candidate.is_some() {
                        pending_institution = candidate;
                    }
                }
            }
        }
        if let Some(done) = current {
            entries.push(done.finish(today));
        }
        entries
    }

    fn degree_line(&self, content: &str, today: NaiveDate) -> EducationDraft {
        let segments = split_segments(content);
        let degree_index = segments
            .iter()
            .position(|s| self.dictionary.has_degree(s))
            .unwrap_or(0);
        let degree_segment = segments
            .get(degree_index)
            .map(String::as_str)
            .unwrap_or(content);

        let (degree_part, inline_institution) = split_keyword(degree_segment, &[" at ", " from "])
            .map(|(d, i)| (d, Some(i)))
            .unwrap_or((degree_segment, None));
        let degree = clean_fragment(&self.patterns.year.replace_all(degree_part, ""));

        let others = segments
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != degree_index)
            .map(|(_, s)| s.as_str());
        let institution = inline_institution
            .map(clean_fragment)
            .filter(|i| !i.is_empty())
            .or_else(|| self.pick_institution(others));

        let mut draft = EducationDraft {
            degree: if degree.is_empty() {
                degree_segment.to_string()
            } else {
                degree
            },
            institution,
            ..Default::default()
        };
        draft.absorb(content, &self.patterns, today);
        draft
    }

    /// Keyword-bearing segments beat plain proper nouns.
    fn pick_institution<'a>(&self, segments: impl Iterator<Item = &'a str>) -> Option<String> {
        let cleaned: Vec<String> = segments
            .map(|s| clean_fragment(&self.patterns.year.replace_all(s, "")))
            .filter(|s| !s.is_empty() && !is_pursuing(s))
            .collect();
        cleaned
            .iter()
            .find(|s| self.dictionary.has_institution_keyword(&s.to_lowercase()))
            .or_else(|| cleaned.iter().find(|s| looks_like_proper_noun(s)))
            .cloned()
    }

    fn institution_candidate(&self, content: &str) -> Option<String> {
        if content.contains(':')
            || self.patterns.gpa(content).is_some()
            || self.patterns.percentage(content).is_some()
        {
            return None;
        }
        let segments = split_segments(content);
        self.pick_institution(segments.iter().map(String::as_str))
    }

    // ---------------------------------------------------------------------------
    // Experience
    // ---------------------------------------------------------------------------

    /// Role lines start entries; following lines add company, dates and description.
    fn experience(&self, lines: &[String], today: NaiveDate) -> Vec<ExperienceEntry> {
        let mut entries = Vec::new();
        let mut current: Option<ExperienceDraft> = None;
        let mut pending_company: Option<String> = None;
        let mut pending_dates: Option<DateRange> = None;

        for line in lines {
            let bullet = is_bullet(line);
            let content = strip_bullet(line);
            let dates = self.patterns.date_range(content, today);
            let rest = clean_fragment(&self.patterns.strip_date_range(content));

            if !bullet && self.is_role_line(&rest, dates.is_some()) {
                if let Some(done) = current.take() {
                    entries.push(done.finish());
                }
                let (title, company) = split_title_company(&rest, &self.dictionary);
                current = Some(ExperienceDraft {
                    title,
                    company: company.or_else(|| pending_company.take()),
                    dates: dates.or_else(|| pending_dates.take()),
                    description: Vec::new(),
                });
                continue;
            }

            let Some(draft) = current.as_mut() else {
                // Company-first layouts: remember the employer for the next role line.
                if !bullet && looks_like_proper_noun(&rest) {
                    pending_company = Some(rest);
                    pending_dates = dates;
                }
                continue;
            };

            match dates {
                Some(range) if draft.dates.is_none() => {
                    draft.dates = Some(range);
                    if draft.company.is_none() && looks_like_proper_noun(&rest) {
                        draft.company = Some(rest);
                    } else if !rest.is_empty() {
                        draft.description.push(rest);
                    }
                }
                Some(range) if !bullet && looks_like_proper_noun(&rest) => {
                    if let Some(done) = current.take() {
                        entries.push(done.finish());
                    }
                    pending_company = Some(rest);
                    pending_dates = Some(range);
                }
                _ if !bullet
                    && draft.company.is_none()
                    && draft.description.is_empty()
                    && looks_like_proper_noun(&rest) =>
                {
                    draft.company = Some(rest);
                }
                _ => draft.description.push(content.to_string()),
            }
        }
        if let Some(done) = current {
            entries.push(done.finish());
        }
        entries
    }

    fn is_role_line(&self, rest: &str, has_dates: bool) -> bool {
        if rest.is_empty() || rest.ends_with('.') {
            return false;
        }
        let words = rest.split_whitespace().count();
        let lower = rest.to_lowercase();
        if let Some((title, _)) = split_keyword(rest, &[" at ", " @ "]) {
            if words <= 14 && self.dictionary.is_job_title(&title.to_lowercase()) {
                return true;
            }
        }
        self.dictionary.is_job_title(&lower) && (words <= 8 || (has_dates && words <= 14))
    }

    // ---------------------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------------------

    fn projects(&self, lines: &[String], today: NaiveDate) -> Vec<ProjectEntry> {
        let mut entries = Vec::new();
        let mut current: Option<ProjectDraft> = None;

        for line in lines {
            let bullet = is_bullet(line);
            let content = strip_bullet(line);
            let lower = content.to_lowercase();
            let link = self.patterns.url.find(content).map(|m| m.as_str().to_string());
            let dates = self.patterns.date_range(content, today);
            let tech_list = content.split_once(':').and_then(|(label, rest)| {
                TECH_LABELS
                    .contains(&label.trim().to_lowercase().as_str())
                    .then_some(rest)
            });

            let without_noise = self.patterns.url.replace_all(content, "");
            let without_noise = self.patterns.strip_date_range(&without_noise).into_owned();
            let title = clean_fragment(without_noise.split('|').next().unwrap_or(""));
            let title_like = !bullet
                && tech_list.is_none()
                && !title.is_empty()
                && title.split_whitespace().count() <= MAX_PROJECT_TITLE_WORDS
                && !title.ends_with('.');

            let starts_new = title_like
                && current.as_ref().map_or(true, |p| {
                    !p.description.is_empty()
                        || self.dictionary.is_project_line(&lower)
                        || dates.is_some()
                        || content.contains('|')
                });

            if starts_new {
                if let Some(done) = current.take() {
                    entries.push(done.finish());
                }
                current = Some(ProjectDraft {
                    title,
                    ..Default::default()
                });
            }
            let Some(draft) = current.as_mut() else {
                continue;
            };

            if !starts_new {
                match tech_list {
                    Some(list) => {
                        for tech in split_list(list) {
                            push_unique(&mut draft.technologies, tech);
                        }
                    }
                    None if !clean_fragment(&without_noise).is_empty() => {
                        draft.description.push(content.to_string())
                    }
                    None => {}
                }
            }
            for tech in self.dictionary.skills_in(content) {
                push_unique(&mut draft.technologies, tech);
            }
            if draft.duration.is_none() {
                draft.duration = dates;
            }
            if draft.link.is_none() {
                draft.link = link;
            }
            if draft.accuracy.is_none() && lower.contains("accura") {
                draft.accuracy = self.patterns.percentage(content);
            }
        }
        if let Some(done) = current {
            entries.push(done.finish());
        }
        entries
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[derive(Default)]
struct EducationDraft {
    degree: String,
    institution: Option<String>,
    year: Option<String>,
    gpa: Option<String>,
    percentage: Option<String>,
    pursuing: bool,
}

impl EducationDraft {
    fn absorb(&mut self, content: &str, patterns: &Patterns, today: NaiveDate) {
        if self.year.is_none() {
            self.year = patterns.last_year(content, today);
        }
        if self.gpa.is_none() {
            self.gpa = patterns.gpa(content);
        }
        if self.percentage.is_none() {
            self.percentage = patterns.percentage(content);
        }
        self.pursuing |= is_pursuing(content);
    }

    fn finish(self, today: NaiveDate) -> EducationEntry {
        let future_year = self
            .year
            .as_deref()
            .and_then(|y| y.parse::<i32>().ok())
            .map_or(false, |y| y > today.year());
        EducationEntry {
            status: if self.pursuing || future_year {
                CompletionStatus::Pursuing
            } else {
                CompletionStatus::Completed
            },
            degree: self.degree,
            institution: self.institution,
            year: self.year,
            gpa: self.gpa,
            percentage: self.percentage,
        }
    }
}

struct ExperienceDraft {
    title: String,
    company: Option<String>,
    dates: Option<DateRange>,
    description: Vec<String>,
}

impl ExperienceDraft {
    fn finish(self) -> ExperienceEntry {
        ExperienceEntry {
            title: self.title,
            company: self.company,
            dates: self.dates,
            description: joined(&self.description),
        }
    }
}

#[derive(Default)]
struct ProjectDraft {
    title: String,
    description: Vec<String>,
    technologies: Vec<String>,
    duration: Option<DateRange>,
    accuracy: Option<String>,
    link: Option<String>,
}

impl ProjectDraft {
    fn finish(self) -> ProjectEntry {
        ProjectEntry {
            title: self.title,
            description: joined(&self.description),
            technologies: self.technologies,
            duration: self.duration,
            accuracy: self.accuracy,
            link: self.link,
        }
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Non-empty lines with control characters dropped and whitespace collapsed.
pub fn clean_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.chars()
                .map(|c| if c == '\u{a0}' || c == '\t' { ' ' } else { c })
                .filter(|c| !c.is_control())
                .collect::<String>()
        })
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn is_pursuing(text: &str) -> bool {
    let lower = text.to_lowercase();
    PURSUING_MARKERS.iter().any(|m| contains_term(&lower, m))
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.iter().any(|existing| existing.eq_ignore_ascii_case(&item)) {
        list.push(item);
    }
}

fn joined(lines: &[String]) -> Option<String> {
    let text = lines.join(" ");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn listed_lines(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        let item = strip_bullet(line);
        if item.chars().count() >= 3 {
            push_unique(&mut out, item.to_string());
        }
    }
    out
}

/// Certification lines with a leading "Certified for" / "Certified" dropped.
fn certifications(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for item in listed_lines(lines) {
        let lower = item.to_ascii_lowercase();
        let stripped = ["certified for ", "certified "]
            .iter()
            .find(|prefix| lower.starts_with(*prefix))
            .map_or(item.as_str(), |prefix| item[prefix.len()..].trim());
        if !stripped.is_empty() {
            push_unique(&mut out, stripped.to_string());
        }
    }
    out
}

fn list_items(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        for item in split_list(strip_bullet(line)) {
            if item.chars().count() <= MAX_SKILL_CHARS {
                push_unique(&mut out, item);
            }
        }
    }
    out
}

/// Comma/semicolon/pipe separated items, trimmed, leading "and" dropped.
fn split_list(text: &str) -> Vec<String> {
    text.replace(" / ", ",")
        .split([',', ';', '|', '•', '·', '▪', '●'])
        .map(|item| item.trim().trim_matches(|c: char| matches!(c, '.' | '*' | '-')).trim())
        .map(|item| item.strip_prefix("and ").unwrap_or(item).trim())
        .filter(|item| item.chars().any(char::is_alphabetic))
        .map(str::to_string)
        .collect()
}

/// Splits on commas, pipes and spaced dashes.
fn split_segments(text: &str) -> Vec<String> {
    text.replace(" – ", "|")
        .replace(" — ", "|")
        .replace(" - ", "|")
        .split([',', '|'])
        .map(clean_fragment)
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_fragment(text: &str) -> String {
    text.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, ',' | '|' | '-' | '–' | '—' | '(' | ')' | ':')
    })
    .to_string()
}

/// Splits at the first case-insensitive occurrence of any separator.
fn split_keyword<'a>(text: &'a str, separators: &[&str]) -> Option<(&'a str, &'a str)> {
    let lower = text.to_ascii_lowercase();
    separators
        .iter()
        .filter_map(|sep| lower.find(*sep).map(|idx| (idx, sep.len())))
        .min()
        .map(|(idx, len)| (text[..idx].trim(), text[idx + len..].trim()))
        .filter(|(left, right)| !left.is_empty() && !right.is_empty())
}

fn split_title_company(rest: &str, dictionary: &Dictionary) -> (String, Option<String>) {
    if let Some((title, company)) = split_keyword(rest, &[" at ", " @ "]) {
        return (clean_fragment(title), Some(clean_fragment(company)));
    }
    let segments = split_segments(rest);
    let title_index = segments
        .iter()
        .position(|s| dictionary.is_job_title(&s.to_lowercase()))
        .unwrap_or(0);
    let title = segments
        .get(title_index)
        .cloned()
        .unwrap_or_else(|| rest.to_string());
    let company = segments
        .into_iter()
        .enumerate()
        .find(|(i, _)| *i != title_index)
        .map(|(_, s)| s);
    (title, company)
}

/// Capitalized words throughout, no digits, not a sentence.
fn looks_like_proper_noun(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || words.len() > 8 || text.ends_with('.') {
        return false;
    }
    if text.chars().any(|c| c.is_ascii_digit() || c == '@') {
        return false;
    }
    words
        .iter()
        .filter(|w| !MINOR_WORDS.contains(&w.to_lowercase().as_str()))
        .all(|w| w.chars().next().map_or(false, char::is_uppercase))
}
