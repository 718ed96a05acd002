use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
static CAPITALISED_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Extract entity candidates (people, orgs, email addresses) using simple
/// heuristics: email addresses plus capitalised words of at least three
/// letters. Case-insensitively de-duplicated, first-seen order preserved.
pub fn extract_entities(text: &str) -> Vec<String> {
    let email = EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
    });
    let capitalised = CAPITALISED_PATTERN
        .get_or_init(|| Regex::new(r"\b[A-Z][a-zA-Z]{2,}\b").expect("valid word pattern"));

    let mut candidates: Vec<&str> = email.find_iter(text).map(|m| m.as_str()).collect();
    candidates.extend(capitalised.find_iter(text).map(|m| m.as_str()));

    let mut seen: HashSet<String> = HashSet::new();
    let mut entities = Vec::new();
    for candidate in candidates {
        let key = candidate.to_lowercase();
        if seen.insert(key) {
            entities.push(candidate.to_string());
        }
    }

    entities
}
