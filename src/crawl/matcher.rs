// src/crawl/matcher.rs
// =============================================================================
// Counts keyword occurrences in a page body.
//
// Matching rules:
// - case-insensitive ("Rust" matches "rust" and "RUST")
// - literal: keywords are escaped, so "c++" or "a.b" match verbatim
// - non-overlapping: "aa" occurs twice in "aaaa", not three times
//
// Each keyword is compiled to a regex once per crawl run and shared by all
// traversal tasks (Regex is Send + Sync).
// =============================================================================

use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;
use crate::model::KeywordHits;

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    // (original keyword, compiled pattern) in configuration order
    patterns: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    pub fn new(keywords: &[String]) -> Result<Self, ConfigError> {
        let patterns = keywords
            .iter()
            .map(|keyword| {
                RegexBuilder::new(&regex::escape(keyword))
                    .case_insensitive(true)
                    .build()
                    .map(|re| (keyword.clone(), re))
                    .map_err(|e| ConfigError::InvalidKeyword {
                        keyword: keyword.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn find(&self, body: &str) -> KeywordHits {
        let mut hits = KeywordHits::default();
        if body.is_empty() {
            return hits;
        }

        for (keyword, re) in &self.patterns {
            let count = re.find_iter(body).count();
            if count > 0 {
                hits.counts.insert(keyword.clone(), count);
                hits.keywords.push(keyword.clone());
                hits.total += count;
            }
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(keywords: &[&str]) -> KeywordMatcher {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
        KeywordMatcher::new(&keywords).unwrap()
    }

    #[test]
    fn test_counts_case_insensitive() {
        let hits = matcher(&["foo"]).find("Foo foo FOO fOo bar");
        assert_eq!(hits.counts.get("foo"), Some(&4));
        assert_eq!(hits.total, 4);
        assert_eq!(hits.keywords, vec!["foo"]);
    }

    #[test]
    fn test_special_characters_are_literal() {
        let hits = matcher(&["c++", "a.b", "(x)"]).find("C++ and c++; axb a.b (x) x");
        assert_eq!(hits.counts.get("c++"), Some(&2));
        assert_eq!(hits.counts.get("a.b"), Some(&1));
        assert_eq!(hits.counts.get("(x)"), Some(&1));
        assert_eq!(hits.total, 4);
    }

    #[test]
    fn test_non_overlapping() {
        let hits = matcher(&["aa"]).find("aaaa");
        assert_eq!(hits.total, 2);
    }

    #[test]
    fn test_zero_counts_are_omitted_and_order_kept() {
        let hits = matcher(&["zeta", "missing", "alpha"]).find("alpha zeta alpha");
        assert_eq!(hits.keywords, vec!["zeta", "alpha"]);
        assert!(!hits.counts.contains_key("missing"));
        assert_eq!(hits.total, hits.counts.values().sum::<usize>());
    }

    #[test]
    fn test_empty_body() {
        let hits = matcher(&["foo"]).find("");
        assert_eq!(hits, KeywordHits::default());
    }

    #[test]
    fn test_unicode_keywords() {
        let hits = matcher(&["关键词", "Straße"]).find("关键词 STRASSE straße 关键词");
        assert_eq!(hits.counts.get("关键词"), Some(&2));
        assert_eq!(hits.counts.get("Straße"), Some(&1));
    }
}
