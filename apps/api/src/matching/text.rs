//! Tokenization and TF-IDF cosine similarity over a pair of documents.

use std::collections::{BTreeMap, BTreeSet};

use crate::extraction::Dictionary;

/// Lowercase word tokens, stopwords and pure numbers dropped.
/// `+` and `#` stay attached so "c++" and "c#" survive.
pub fn tokenize(text: &str, dictionary: &Dictionary) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .map(|t| t.trim_start_matches(['+', '#']))
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !dictionary.is_stopword(t))
        .map(str::to_string)
        .collect()
}

pub fn token_set(text: &str, dictionary: &Dictionary) -> BTreeSet<String> {
    tokenize(text, dictionary).into_iter().collect()
}

/// Unigrams plus adjacent bigrams.
fn terms(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tokens.to_vec();
    out.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    out
}

fn term_counts(terms: &[String]) -> BTreeMap<&str, f64> {
    let mut counts = BTreeMap::new();
    for term in terms {
        *counts.entry(term.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine of L2-normalized TF-IDF vectors fitted on just these two documents,
/// with smooth idf `ln((1 + n) / (1 + df)) + 1`. Either side empty gives 0.0.
pub fn tfidf_cosine(a: &[String], b: &[String]) -> f64 {
    let (a_terms, b_terms) = (terms(a), terms(b));
    if a_terms.is_empty() || b_terms.is_empty() {
        return 0.0;
    }
    let (a_counts, b_counts) = (term_counts(&a_terms), term_counts(&b_terms));

    const DOCS: f64 = 2.0;
    let idf = |term: &str| {
        let df = a_counts.contains_key(term) as u8 + b_counts.contains_key(term) as u8;
        ((1.0 + DOCS) / (1.0 + df as f64)).ln() + 1.0
    };

    let weigh = |counts: &BTreeMap<&str, f64>| -> BTreeMap<String, f64> {
        let raw: BTreeMap<String, f64> = counts
            .iter()
            .map(|(term, tf)| (term.to_string(), tf * idf(*term)))
            .collect();
        let norm = raw.values().map(|w| w * w).sum::<f64>().sqrt();
        raw.into_iter()
            .map(|(term, w)| (term, if norm > 0.0 { w / norm } else { 0.0 }))
            .collect()
    };

    let (a_vec, b_vec) = (weigh(&a_counts), weigh(&b_counts));
    a_vec
        .iter()
        .filter_map(|(term, wa)| b_vec.get(term).map(|wb| wa * wb))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}
