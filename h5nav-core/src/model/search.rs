//!
//! ``src/model/search.rs``
//!
//! Queries, candidates and ranked result sets for the fuzzy search palette,
//! plus the subsequence scorer used by the search task.

use std::{fmt, ops::Range};

use compact_str::CompactString;

use crate::model::{collection::CollectionId, entry::EntryPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Entries of the active collection.
    #[default]
    Collection,

    /// Every open collection, then every known entry of each.
    Global,
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collection => "collection",
            Self::Global => "global",
        })
    }
}

/// Immutable query as typed into the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: CompactString,
    pub scope: SearchScope,
}

impl SearchQuery {
    pub fn new(text: impl Into<CompactString>, scope: SearchScope) -> Self {
        Self {
            text: text.into(),
            scope,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTarget {
    Entry {
        collection: CollectionId,
        path: EntryPath,
    },
    Collection(CollectionId),
}

/// Something that can be matched, with the text it is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub target: MatchTarget,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub target: MatchTarget,
    pub display: String,
    pub score: f64,
    /// Matched character ranges of `display`, merged and ascending.
    pub spans: Vec<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub revision: u64,
    pub query: SearchQuery,
    pub matches: Vec<SearchMatch>,
}

impl ResultSet {
    #[must_use]
    pub fn empty(revision: u64, query: SearchQuery) -> Self {
        Self {
            revision,
            query,
            matches: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Case-insensitive subsequence scorer.
///
/// `score = 1 / (1 + skipped + start_penalty * start)`, where `start` is the
/// character index of the first match and `skipped` counts the unmatched
/// characters between the first and last match. Every start position is
/// tried and the best alignment kept; ties go to the earliest start.
#[derive(Debug, Clone)]
pub struct FuzzyScorer {
    needle: Vec<char>,
    start_penalty: f64,
}

impl FuzzyScorer {
    #[must_use]
    pub fn new(query: &str, start_penalty: f64) -> Self {
        Self {
            needle: query.chars().map(fold).collect(),
            start_penalty,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self, haystack: &str) -> Option<(f64, Vec<Range<usize>>)> {
        if self.needle.is_empty() {
            return Some((1.0, Vec::new()));
        }

        let hay: Vec<char> = haystack.chars().map(fold).collect();
        let mut best: Option<(f64, Vec<usize>)> = None;

        for start in 0..hay.len() {
            if hay[start] != self.needle[0] {
                continue;
            }

            // Greedy from a fixed start gives the tightest end for that start.
            let Some(positions) = self.align_from(&hay, start) else {
                // No later start can complete either.
                break;
            };

            let last = positions[positions.len() - 1];
            let skipped = (last - start + 1) - self.needle.len();
            let score = 1.0 / (1.0 + skipped as f64 + self.start_penalty * start as f64);

            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, positions));
            }
        }

        best.map(|(score, positions)| (score, merge_spans(&positions)))
    }

    fn align_from(&self, hay: &[char], start: usize) -> Option<Vec<usize>> {
        let mut positions = Vec::with_capacity(self.needle.len());
        positions.push(start);

        let mut cursor = start + 1;
        for &want in &self.needle[1..] {
            let offset = hay[cursor..].iter().position(|&c| c == want)?;
            positions.push(cursor + offset);
            cursor += offset + 1;
        }

        Some(positions)
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Collapse ascending positions into contiguous ranges.
fn merge_spans(positions: &[usize]) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = Vec::new();
    for &p in positions {
        match spans.last_mut() {
            Some(span) if span.end == p => span.end = p + 1,
            _ => spans.push(p..p + 1),
        }
    }
    spans
}

/// Order by descending score. The sort is stable, so equal scores keep
/// candidate (discovery) order.
pub fn finish_ranking(matches: &mut Vec<SearchMatch>, max_results: usize) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(max_results);
}

/// Synchronous ranking of a full candidate list.
#[must_use]
pub fn rank(candidates: &[Candidate], scorer: &FuzzyScorer, max_results: usize) -> Vec<SearchMatch> {
    let mut matches: Vec<SearchMatch> = candidates
        .iter()
        .filter_map(|candidate| {
            scorer.score(&candidate.display).map(|(score, spans)| SearchMatch {
                target: candidate.target.clone(),
                display: candidate.display.clone(),
                score,
                spans,
            })
        })
        .collect();

    finish_ranking(&mut matches, max_results);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> Candidate {
        Candidate {
            target: MatchTarget::Entry {
                collection: CollectionId(1),
                path: EntryPath::new(path),
            },
            display: path.to_string(),
        }
    }

    #[test]
    fn test_exact_prefix_scores_one() {
        let scorer = FuzzyScorer::new("abc", 0.1);
        let (score, spans) = scorer.score("abcdef").unwrap();
        assert!((score - 1.0).abs() < f64::EPSILON);
        assert_eq!(spans, vec![0..3]);
    }

    #[test]
    fn test_skips_and_offset_penalized() {
        let scorer = FuzzyScorer::new("ac", 0.1);
        // one skipped char
        let (gap, spans) = scorer.score("abc").unwrap();
        assert!((gap - 0.5).abs() < 1e-9);
        assert_eq!(spans, vec![0..1, 2..3]);

        // offset 2, no skip: 1 / (1 + 0.2)
        let (offset, _) = scorer.score("xxac").unwrap();
        assert!((offset - 1.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_best_alignment_wins() {
        // a_b...ab: the later tight alignment beats the early loose one.
        let scorer = FuzzyScorer::new("ab", 0.1);
        let (score, spans) = scorer.score("a_____ab").unwrap();
        assert_eq!(spans, vec![6..8]);
        assert!((score - 1.0 / 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_case_insensitive_and_non_match() {
        let scorer = FuzzyScorer::new("GRP", 0.1);
        assert!(scorer.score("/groupA").is_some());
        assert!(scorer.score("/dataset1").is_none());
    }

    #[test]
    fn test_empty_query_keeps_order() {
        let candidates = vec![entry("/b"), entry("/a"), entry("/c")];
        let ranked = rank(&candidates, &FuzzyScorer::new("", 0.1), 10);
        let names: Vec<_> = ranked.iter().map(|m| m.display.as_str()).collect();
        assert_eq!(names, ["/b", "/a", "/c"]);
        assert!(ranked.iter().all(|m| (m.score - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_ties_keep_discovery_order_and_cap() {
        let candidates = vec![entry("/x1"), entry("/zz"), entry("/x2"), entry("/x3")];
        let ranked = rank(&candidates, &FuzzyScorer::new("x", 0.1), 2);
        let names: Vec<_> = ranked.iter().map(|m| m.display.as_str()).collect();
        assert_eq!(names, ["/x1", "/x2"]);
    }
}
