//! Price-rank inference over comment text
//!
//! Comments mention offered prices as `<quantity><rank letter>` tokens in a
//! mix of Latin and Cyrillic spellings ("3s", "3 s", "5эс"). The estimator
//! scans the whole corpus with one case-insensitive pattern built from the
//! vocabulary, normalizes every matched spelling to its canonical rank code
//! and returns the most frequent `<quantity><code>` token.

use std::collections::HashMap;

use anyhow::{Context, Result};
use regex::Regex;

/// Ordered mapping of canonical rank codes to their surface spellings.
///
/// Order matters twice: the pattern tries alternatives in declaration order,
/// and when two codes share a spelling the one declared later wins in the
/// reverse index.
#[derive(Debug, Clone)]
pub struct RankVocabulary {
    entries: Vec<(String, Vec<String>)>,
}

impl RankVocabulary {
    pub fn new<C, V>(entries: impl IntoIterator<Item = (C, Vec<V>)>) -> Self
    where
        C: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, variants)| {
                    (
                        code.into(),
                        variants.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }

    /// The rank alphabet used on the site, with the colloquial Cyrillic
    /// spellings seen in trade comments. Cyrillic "с" belongs to C, not S.
    pub fn default_triggers() -> Self {
        Self::new([
            ("S", vec!["s", "S", "эс"]),
            ("C", vec!["c", "C", "си", "с"]),
            ("A", vec!["a", "A", "а"]),
            ("B", vec!["b", "B", "б", "бэ"]),
            ("D", vec!["d", "D", "д"]),
            ("E", vec!["e", "E", "е"]),
            ("G", vec!["g", "G", "г", "гэ"]),
            ("H", vec!["h", "H", "аш"]),
            ("N", vec!["n", "N", "эн"]),
            ("P", vec!["p", "P", "п", "пэ"]),
            ("X", vec!["x", "X", "икс"]),
        ])
    }
}

impl Default for RankVocabulary {
    fn default() -> Self {
        Self::default_triggers()
    }
}

/// Frequency-voting rank estimator over a comment corpus
pub struct RankEstimator {
    /// lowercase spelling -> canonical code, last declaration wins on overlap
    reverse: HashMap<String, String>,
    pattern: Regex,
}

impl RankEstimator {
    pub fn new(vocabulary: &RankVocabulary) -> Result<Self> {
        let mut reverse = HashMap::new();
        for (code, variants) in vocabulary.entries() {
            for variant in variants {
                reverse.insert(variant.to_lowercase(), code.clone());
            }
        }

        let alternation = vocabulary
            .entries()
            .iter()
            .flat_map(|(_, variants)| variants.iter())
            .map(|variant| regex::escape(variant))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)(\d+)\s*({alternation})"))
            .context("rank vocabulary produced an invalid pattern")?;

        Ok(Self { reverse, pattern })
    }

    /// Most frequent normalized `<quantity><code>` token in the corpus, or
    /// `None` when no usable signal is present.
    ///
    /// A quantity of exactly "0" is not a signal; "01" and friends still
    /// count. Matches are non-overlapping, left to right, and a spelling
    /// that is a substring of a longer one is matched wherever the
    /// digits-then-spelling shape occurs - no longest-match preference.
    pub fn most_common_rank(&self, corpus: &str) -> Option<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for caps in self.pattern.captures_iter(corpus) {
            let quantity = &caps[1];
            if quantity == "0" {
                continue;
            }
            let Some(code) = self.reverse.get(&caps[2].to_lowercase()) else {
                continue;
            };
            let token = format!("{quantity}{code}");
            let count = counts.entry(token.clone()).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }

        // ties go to the token seen first in scan order
        let mut best: Option<(&String, usize)> = None;
        for token in &order {
            let count = counts[token];
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((token, count));
            }
        }
        best.map(|(token, _)| token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn estimator(vocabulary: RankVocabulary) -> RankEstimator {
        RankEstimator::new(&vocabulary).unwrap()
    }

    fn default_estimator() -> RankEstimator {
        estimator(RankVocabulary::default_triggers())
    }

    #[test]
    fn test_frequency_vote_discards_zero_quantity() {
        let est = estimator(RankVocabulary::new([("S", vec!["s"])]));
        let rank = est.most_common_rank("sold for 3s, 3 s again, and 0s nothing");
        assert_eq!(rank.as_deref(), Some("3S"));
    }

    #[test]
    fn test_empty_corpus_has_no_signal() {
        assert_eq!(default_estimator().most_common_rank(""), None);
    }

    #[test]
    fn test_zero_only_corpus_has_no_signal() {
        let est = estimator(RankVocabulary::new([("S", vec!["s"])]));
        assert_eq!(est.most_common_rank("0s 0 s 0s"), None);
    }

    #[test]
    fn test_leading_zero_quantity_still_counts() {
        let est = estimator(RankVocabulary::new([("S", vec!["s"])]));
        assert_eq!(est.most_common_rank("01s").as_deref(), Some("01S"));
    }

    #[rstest]
    #[case("отдам за 5эс", "5S")]
    #[case("меняю на 2 си", "2C")]
    #[case("куплю за 4 икс", "4X")]
    #[case("цена 3С", "3C")] // uppercase Cyrillic folds onto C's "с"
    fn test_variant_normalization(#[case] corpus: &str, #[case] expected: &str) {
        let rank = default_estimator().most_common_rank(corpus);
        assert_eq!(rank.as_deref(), Some(expected));
    }

    #[test]
    fn test_overlapping_variant_resolves_to_later_code() {
        // both codes claim "x"; the later declaration owns it
        let est = estimator(RankVocabulary::new([
            ("OLD", vec!["x"]),
            ("NEW", vec!["x"]),
        ]));
        assert_eq!(est.most_common_rank("2x").as_deref(), Some("2NEW"));
    }

    #[test]
    fn test_tie_goes_to_first_encountered_token() {
        let est = estimator(RankVocabulary::new([
            ("S", vec!["s"]),
            ("A", vec!["a"]),
        ]));
        let rank = est.most_common_rank("1s 2a 2a 1s 9s");
        // 1s and 2a both appear twice; 1s was seen first
        assert_eq!(rank.as_deref(), Some("1S"));
    }

    #[test]
    fn test_majority_wins_across_comments() {
        let corpus = "продам 3s\nотдам за 5а\nсменяю на 3 s\n3с продано";
        let rank = default_estimator().most_common_rank(corpus);
        assert_eq!(rank.as_deref(), Some("3S"));
    }

    #[test]
    fn test_digits_without_vocabulary_spelling_are_ignored() {
        let est = estimator(RankVocabulary::new([("S", vec!["s"])]));
        assert_eq!(est.most_common_rank("41 units, 7 копеек"), None);
    }
}
