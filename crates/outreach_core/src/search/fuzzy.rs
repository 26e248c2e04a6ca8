//! Approximate matching of a search term against professor emails.
//!
//! # Responsibility
//! - Score term/email pairs with partial-ratio similarity in `0..=100`.
//! - Rank scored ids, keeping only those above the fixed threshold.
//!
//! # Invariants
//! - Only scores strictly greater than [`MATCH_THRESHOLD`] survive.
//! - At most [`MATCH_LIMIT`] matches are returned.
//! - Equal scores keep index (store) order.

use crate::model::application::ApplicationId;

/// Scores at or below this value are not matches.
pub const MATCH_THRESHOLD: u8 = 50;

/// Maximum number of ranked matches returned by one pass.
pub const MATCH_LIMIT: usize = 10;

/// Similarity scorer used by the candidate stage.
pub trait Scorer {
    /// Similarity of `query` against `choice` in `0..=100`.
    ///
    /// `None` means the pair could not be scored; callers treat it as a
    /// non-match.
    fn score(&self, query: &str, choice: &str) -> Option<u8>;
}

impl<F> Scorer for F
where
    F: Fn(&str, &str) -> Option<u8>,
{
    fn score(&self, query: &str, choice: &str) -> Option<u8> {
        self(query, choice)
    }
}

/// Substring-tolerant similarity: the best Indel ratio between the shorter
/// string and every equal-length window of the longer one.
///
/// Both sides are trimmed and lowercased first. A term contained verbatim in
/// the choice scores 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialRatio;

impl Scorer for PartialRatio {
    fn score(&self, query: &str, choice: &str) -> Option<u8> {
        let query = preprocess(query);
        let choice = preprocess(choice);
        if query.is_empty() || choice.is_empty() {
            return None;
        }
        Some(partial_ratio(&query, &choice))
    }
}

/// One id that scored above the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub id: ApplicationId,
    pub score: u8,
}

/// Scores `term` against every `(id, email)` entry and returns the ranked
/// survivors, best first.
pub fn rank_matches<S>(
    scorer: &S,
    term: &str,
    index: &[(ApplicationId, String)],
) -> Vec<FuzzyMatch>
where
    S: Scorer + ?Sized,
{
    let mut matches = index
        .iter()
        .filter_map(|(id, email)| {
            let score = scorer.score(term, email)?.min(100);
            (score > MATCH_THRESHOLD).then_some(FuzzyMatch { id: *id, score })
        })
        .collect::<Vec<_>>();

    matches.sort_by(|left, right| right.score.cmp(&left.score));
    matches.truncate(MATCH_LIMIT);
    matches
}

fn preprocess(value: &str) -> Vec<char> {
    value.trim().to_lowercase().chars().collect()
}

fn partial_ratio(left: &[char], right: &[char]) -> u8 {
    let (shorter, longer) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };

    let mut best = 0.0_f64;
    for window in longer.windows(shorter.len()) {
        let current = indel_ratio(shorter, window);
        if current > best {
            best = current;
            if best >= 1.0 {
                break;
            }
        }
    }

    (best * 100.0).round() as u8
}

/// `2 * LCS / (len_a + len_b)`.
fn indel_ratio(left: &[char], right: &[char]) -> f64 {
    let total = left.len() + right.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(left, right)) as f64 / total as f64
}

fn lcs_len(left: &[char], right: &[char]) -> usize {
    let mut row = vec![0usize; right.len() + 1];
    for &lc in left {
        let mut diagonal = 0;
        for (j, &rc) in right.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == rc {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[right.len()]
}
