//! Catalogue candidate matching
//!
//! The first candidate that passes every filter wins; candidates are not
//! scored against each other.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::modules::integrations::TitleCandidate;

/// Lowercase, drop accents and punctuation, collapse whitespace.
pub fn clean_string(input: &str) -> String {
    let stripped: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reorder `"Le Guin, Ursula K."` as `"Ursula K. Le Guin"` and clean it.
///
/// Anything after a second comma (life dates, roles) is dropped.
pub fn clean_author(author: &str) -> String {
    let mut parts = author.split(',').map(str::trim);

    let display = match (parts.next(), parts.next()) {
        (Some(last), Some(first)) if !first.is_empty() => format!("{} {}", first, last),
        (Some(last), _) => last.to_string(),
        (None, _) => String::new(),
    };

    clean_string(&display)
}

/// Cleaned title and author used both for the search query and for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTarget {
    pub title: String,
    pub author: String,
}

impl MatchTarget {
    pub fn new(title: &str, author: &str) -> Self {
        Self {
            title: clean_string(title),
            author: clean_author(author),
        }
    }

    pub fn accepts(&self, candidate: &TitleCandidate) -> bool {
        if !candidate.format.trim().eq_ignore_ascii_case("book") {
            return false;
        }

        if !candidate
            .languages
            .iter()
            .any(|lang| lang.trim().eq_ignore_ascii_case("english"))
        {
            return false;
        }

        let candidate_title = clean_string(&candidate.title);
        if !self
            .title
            .split_whitespace()
            .all(|word| candidate_title.contains(word))
        {
            return false;
        }

        clean_author(&candidate.author).contains(&self.author)
    }
}

/// First candidate accepted by `target`, if any.
pub fn select_best_match<'a>(
    target: &MatchTarget,
    candidates: &'a [TitleCandidate],
) -> Option<&'a TitleCandidate> {
    candidates.iter().find(|candidate| target.accepts(candidate))
}
