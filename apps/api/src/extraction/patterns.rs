//! Compiled regular expressions for resume and job extraction.
//!
//! Built once per extractor and shared read-only.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::models::resume::DateRange;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

#[derive(Debug, Clone)]
pub struct Patterns {
    pub email: Regex,
    phone_candidate: Regex,
    pub url: Regex,
    pub year: Regex,
    date_range: Regex,
    gpa_prefix: Regex,
    gpa_suffix: Regex,
    percent_suffix: Regex,
    percent_label: Regex,
    pub labelled_value: Regex,
    pub salary: Vec<Regex>,
    pub years_required: Regex,
    pub sentence_break: Regex,
    month_year: Regex,
    numeric_month_year: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self, regex::Error> {
        let date = format!(r"(?:{MONTH}\s*,?\s*(?:19|20)\d{{2}}|\d{{1,2}}\s*/\s*(?:19|20)\d{{2}}|(?:19|20)\d{{2}})");
        let end = format!(r"(?:{date}|present|current|now|ongoing|till date|to date)");

        Ok(Self {
            email: Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b")?,
            phone_candidate: Regex::new(r"\+?\(?\d[\d\s().-]{7,}\d")?,
            url: Regex::new(
                r"(?i)\b(?:https?://|www\.)[^\s,;|()]+|\b(?:github|gitlab|linkedin|bitbucket)\.(?:com|org)/[^\s,;|()]+",
            )?,
            year: Regex::new(r"\b(?:19|20)\d{2}\b")?,
            date_range: Regex::new(&format!(
                r"(?i)\b(?P<start>{date})\s*(?:-|–|—|to|until)\s*(?P<end>{end})\b"
            ))?,
            gpa_prefix: Regex::new(
                r"(?i)\bc?gpa\s*[:\-]?\s*(\d{1,2}(?:\.\d{1,2})?(?:\s*/\s*\d{1,2}(?:\.\d{1,2})?)?)",
            )?,
            gpa_suffix: Regex::new(
                r"(?i)(\d{1,2}\.\d{1,2}(?:\s*/\s*\d{1,2}(?:\.\d{1,2})?)?)\s*c?gpa\b",
            )?,
            percent_suffix: Regex::new(r"(?i)(\d{1,3}(?:\.\d{1,2})?)\s*(?:%|percent\b)")?,
            percent_label: Regex::new(r"(?i)\bpercentage\s*[:\-]?\s*(\d{1,3}(?:\.\d{1,2})?)")?,
            labelled_value: Regex::new(
                r"(?i)\b(date of birth|dob|gender|sex|marital status|nationality|address)\s*[:\-]\s*(.+)$",
            )?,
            salary: vec![
                Regex::new(
                    r"\$\s*(\d{1,3}(?:,\d{3})*(?:\.\d{2})?k?)\s*(?:-|–|to)\s*\$?\s*(\d{1,3}(?:,\d{3})*(?:\.\d{2})?k?)",
                )?,
                Regex::new(r"(?i)\b(\d{2,3})\s*k\s*(?:-|–|to)\s*(\d{2,3})\s*k\b")?,
            ],
            years_required: Regex::new(
                r"(?i)\b(\d{1,2})\s*\+?\s*(?:(?:-|–|to)\s*\d{1,2}\s*)?(?:years?|yrs?)\b",
            )?,
            sentence_break: Regex::new(r"[.!?;]\s+|\n+|•")?,
            month_year: Regex::new(&format!(r"(?i)^({MONTH})\s*,?\s*((?:19|20)\d{{2}})$"))?,
            numeric_month_year: Regex::new(r"^(\d{1,2})\s*/\s*((?:19|20)\d{2})$")?,
        })
    }

    /// First phone-like run with 10–15 digits.
    pub fn find_phone(&self, text: &str) -> Option<String> {
        self.phone_candidate
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .find(|candidate| {
                let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
                (10..=15).contains(&digits)
            })
            .map(str::to_string)
    }

    pub fn has_phone(&self, text: &str) -> bool {
        self.find_phone(text).is_some()
    }

    /// Last plausible graduation-style year in `text`.
    pub fn last_year(&self, text: &str, today: NaiveDate) -> Option<String> {
        self.year
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|y| {
                y.parse::<i32>()
                    .map(|y| (1950..=today.year() + 7).contains(&y))
                    .unwrap_or(false)
            })
            .last()
            .map(str::to_string)
    }

    pub fn gpa(&self, text: &str) -> Option<String> {
        self.gpa_prefix
            .captures(text)
            .or_else(|| self.gpa_suffix.captures(text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().split_whitespace().collect::<String>())
    }

    pub fn percentage(&self, text: &str) -> Option<String> {
        self.percent_label
            .captures(text)
            .or_else(|| self.percent_suffix.captures(text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// First date range in `text`, with "present"-style ends resolved to `today`.
    pub fn date_range(&self, text: &str, today: NaiveDate) -> Option<DateRange> {
        let caps = self.date_range.captures(text)?;
        let whole = caps.get(0)?.as_str();
        let start = self.parse_date(caps.name("start")?.as_str());
        let end_raw = caps.name("end")?.as_str();
        let is_current = end_raw
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic())
            && self.parse_date(end_raw).is_none();
        let end = if is_current {
            NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        } else {
            self.parse_date(end_raw)
        };

        Some(DateRange {
            text: whole.trim().to_string(),
            start,
            end,
            is_current,
        })
    }

    /// `text` with its first date range cut out.
    pub fn strip_date_range<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        self.date_range.replace(text, "")
    }

    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Some(caps) = self.month_year.captures(raw) {
            let month = month_number(caps.get(1)?.as_str())?;
            let year = caps.get(2)?.as_str().parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
        if let Some(caps) = self.numeric_month_year.captures(raw) {
            let month = caps.get(1)?.as_str().parse().ok()?;
            let year = caps.get(2)?.as_str().parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
        let year: i32 = raw.parse().ok()?;
        NaiveDate::from_ymd_opt(year, 1, 1)
    }
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_phone_requires_plausible_digit_count() {
        let p = Patterns::new().unwrap();
        assert_eq!(
            p.find_phone("Call +1 (555) 123-4567 today").as_deref(),
            Some("+1 (555) 123-4567")
        );
        assert!(p.find_phone("2019 - 2021").is_none());
        assert!(p.find_phone("9876543210").is_some());
    }

    #[test]
    fn test_month_year_range() {
        let p = Patterns::new().unwrap();
        let range = p.date_range("Acme Corp Jan 2019 - Mar 2021", today()).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2021, 3, 1));
        assert!(!range.is_current);
        assert_eq!(range.months(), Some(26));
    }

    #[test]
    fn test_present_resolves_to_reference_date() {
        let p = Patterns::new().unwrap();
        let range = p.date_range("06/2022 – Present", today()).unwrap();
        assert!(range.is_current);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2022, 6, 1));
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn test_year_only_range() {
        let p = Patterns::new().unwrap();
        let range = p.date_range("2016 to 2020", today()).unwrap();
        assert_eq!(range.months(), Some(48));
    }

    #[test]
    fn test_gpa_and_percentage() {
        let p = Patterns::new().unwrap();
        assert_eq!(p.gpa("CGPA: 8.5 / 10").as_deref(), Some("8.5/10"));
        assert_eq!(p.gpa("3.8 GPA").as_deref(), Some("3.8"));
        assert_eq!(p.percentage("Scored 92.5%").as_deref(), Some("92.5"));
        assert_eq!(p.percentage("Percentage: 85").as_deref(), Some("85"));
    }

    #[test]
    fn test_last_year_ignores_implausible_years() {
        let p = Patterns::new().unwrap();
        assert_eq!(p.last_year("2016 - 2020", today()).as_deref(), Some("2020"));
        assert_eq!(p.last_year("Class of 2099", today()), None);
    }
}
