//! Splits cleaned resume lines into named sections.

use std::collections::BTreeMap;

use tracing::warn;

use super::dictionary::{Dictionary, Section};

const MAX_HEADER_WORDS: usize = 5;
const MAX_HEADER_CHARS: usize = 48;

const BULLETS: &[char] = &['•', '·', '▪', '●', '◦', '‣', '➢', '►', '*', '-', '–', '—', '>'];

/// Outcome of testing one line against the header synonyms.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderMatch {
    /// A header, with any content that followed `Header:` on the same line.
    Section(Section, Option<String>),
    /// Synonyms of several sections matched and none subsumes the others.
    Ambiguous(Vec<Section>),
    None,
}

/// Resume lines grouped by section. Lines before the first header form the preamble.
#[derive(Debug, Default)]
pub struct SectionedText {
    pub preamble: Vec<String>,
    sections: BTreeMap<Section, Vec<String>>,
    pub flags: Vec<String>,
}

impl SectionedText {
    pub fn lines(&self, section: Section) -> &[String] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, section: Section) -> bool {
        self.sections.contains_key(&section)
    }

    pub fn text(&self, section: Section) -> String {
        self.lines(section).join("\n")
    }
}

pub fn is_bullet(line: &str) -> bool {
    line.trim_start().starts_with(BULLETS)
}

pub fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| BULLETS.contains(&c) || c.is_whitespace())
        .trim_end()
}

/// Lowercase, `&` spelled out, punctuation folded to single spaces.
fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .replace('&', " and ")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// All caps, trailing colon, or every word capitalized.
fn is_header_styled(label: &str) -> bool {
    let trimmed = label.trim();
    if trimmed.ends_with(':') {
        return true;
    }
    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() && letters.iter().all(|c| c.is_uppercase()) {
        return true;
    }
    trimmed
        .split_whitespace()
        .filter(|w| !matches!(w.to_lowercase().as_str(), "and" | "of" | "&" | "/"))
        .all(|w| w.chars().next().map_or(false, |c| c.is_uppercase()))
}

pub fn classify_header(line: &str, dictionary: &Dictionary) -> HeaderMatch {
    let line = strip_bullet(line);
    if line.is_empty() {
        return HeaderMatch::None;
    }

    // `Skills: Python, SQL` style, label must be an exact synonym.
    if let Some((label, rest)) = line.split_once(':') {
        let rest = rest.trim();
        if !rest.is_empty() {
            let label = normalize_label(label);
            return dictionary
                .section_headers
                .iter()
                .find(|(_, synonyms)| synonyms.iter().any(|s| *s == label))
                .map(|(section, _)| HeaderMatch::Section(*section, Some(rest.to_string())))
                .unwrap_or(HeaderMatch::None);
        }
    }

    if line.chars().count() > MAX_HEADER_CHARS
        || line.split_whitespace().count() > MAX_HEADER_WORDS
        || line.chars().any(|c| c.is_ascii_digit() || c == '@')
    {
        return HeaderMatch::None;
    }

    let normalized = normalize_label(line);
    if normalized.is_empty() {
        return HeaderMatch::None;
    }
    let styled = is_header_styled(line);

    let mut hits: Vec<(Section, &str)> = Vec::new();
    for (section, synonyms) in &dictionary.section_headers {
        for synonym in synonyms {
            let exact = normalized == *synonym;
            let partial = styled
                && (normalized.starts_with(&format!("{synonym} "))
                    || normalized.ends_with(&format!(" {synonym}")));
            if exact || partial {
                hits.push((*section, synonym.as_str()));
            }
        }
    }

    let Some(&(first, _)) = hits.first() else {
        return HeaderMatch::None;
    };
    if hits.iter().all(|(s, _)| *s == first) {
        return HeaderMatch::Section(first, None);
    }

    // The longest synonym wins when it contains every other hit ("personal profile").
    let longest = hits
        .iter()
        .max_by_key(|(_, synonym)| synonym.len())
        .copied();
    if let Some((section, synonym)) = longest {
        if hits.iter().all(|(_, other)| synonym.contains(other)) {
            return HeaderMatch::Section(section, None);
        }
    }

    let mut sections: Vec<Section> = hits.into_iter().map(|(s, _)| s).collect();
    sections.sort();
    sections.dedup();
    HeaderMatch::Ambiguous(sections)
}

/// Groups `lines` under the most recent header. Repeated headers append to
/// the same section; ambiguous headers stay as content and are flagged.
pub fn segment(lines: &[String], dictionary: &Dictionary) -> SectionedText {
    let mut out = SectionedText::default();
    let mut current: Option<Section> = None;

    for line in lines {
        match classify_header(line, dictionary) {
            HeaderMatch::Section(section, inline) => {
                current = Some(section);
                let bucket = out.sections.entry(section).or_default();
                if let Some(content) = inline {
                    bucket.push(content);
                }
            }
            HeaderMatch::Ambiguous(candidates) => {
                warn!(line = %line, ?candidates, "ambiguous section header left unassigned");
                out.flags.push(format!(
                    "ambiguous section header \"{}\" matches {}",
                    line.trim(),
                    candidates
                        .iter()
                        .map(|s| format!("{s:?}").to_lowercase())
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
                push_line(&mut out, current, line);
            }
            HeaderMatch::None => push_line(&mut out, current, line),
        }
    }
    out
}

fn push_line(out: &mut SectionedText, current: Option<Section>, line: &str) {
    match current {
        Some(section) => out.sections.entry(section).or_default().push(line.to_string()),
        None => out.preamble.push(line.to_string()),
    }
}
