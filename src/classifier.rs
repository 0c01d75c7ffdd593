// src/classifier.rs
//! Keyword classifier: one item in, zero or more (item, category) records out.
//!
//! Keywords are folded once per language at construction. Matching is lexical
//! with word boundaries; the first keyword (dictionary order) that hits a category
//! wins, so each category yields at most one record per item.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use metrics::counter;
use rayon::prelude::*;
use tracing::debug;

use crate::dictionary::{normalize_language, KeywordDictionary};
use crate::matching::{contains_word, normalize_for_match};
use crate::model::{ClassificationRecord, Location, RawItem};
use crate::telemetry::ensure_metrics_described;

#[derive(Debug)]
struct FoldedKeyword {
    original: String,
    folded: String,
}

#[derive(Debug)]
struct CategoryMatcher {
    category: String,
    keywords: Vec<FoldedKeyword>,
}

#[derive(Debug)]
pub struct Classifier {
    dictionary: Arc<KeywordDictionary>,
    /// language → categories (sorted) with folded keywords in declared order
    by_language: HashMap<String, Vec<CategoryMatcher>>,
}

impl Classifier {
    pub fn new(dictionary: Arc<KeywordDictionary>) -> Self {
        let mut by_language: HashMap<String, Vec<CategoryMatcher>> = HashMap::new();
        for (category, langs) in dictionary.iter() {
            for (lang, keywords) in langs {
                if keywords.is_empty() {
                    continue;
                }
                let keywords = keywords
                    .iter()
                    .map(|k| FoldedKeyword {
                        original: k.clone(),
                        folded: normalize_for_match(k, lang),
                    })
                    .collect();
                by_language
                    .entry(lang.clone())
                    .or_default()
                    .push(CategoryMatcher {
                        category: category.to_string(),
                        keywords,
                    });
            }
        }
        Self {
            dictionary,
            by_language,
        }
    }

    pub fn dictionary(&self) -> &KeywordDictionary {
        &self.dictionary
    }

    /// Classify one item. Empty text or a language with no keywords yields an empty
    /// result, never an error.
    pub fn classify(&self, item: &RawItem) -> Vec<ClassificationRecord> {
        ensure_metrics_described();
        counter!("classify_items_total").increment(1);

        if item.text.trim().is_empty() {
            return Vec::new();
        }
        let lang = normalize_language(&item.language);
        let Some(matchers) = self.by_language.get(&lang) else {
            return Vec::new();
        };

        let text = normalize_for_match(&item.text, &lang);
        let item_id = item.fingerprint();
        let location = Location::resolve(item.region.as_deref(), &lang);

        let mut out = Vec::new();
        for m in matchers {
            let hit = m.keywords.iter().find(|k| contains_word(&text, &k.folded));
            if let Some(kw) = hit {
                out.push(ClassificationRecord {
                    item_id: item_id.clone(),
                    platform: item.platform.clone(),
                    timestamp: item.timestamp.clone(),
                    location: location.clone(),
                    language: lang.clone(),
                    category: m.category.clone(),
                    keyword: kw.original.clone(),
                });
            }
        }

        counter!("classify_records_total").increment(out.len() as u64);
        if !out.is_empty() {
            // Never log raw text. Only hashed id + categories.
            debug!(
                target: "classifier",
                id = %item_id,
                language = %lang,
                categories = ?out.iter().map(|r| r.category.as_str()).collect::<Vec<_>>(),
                "item matched"
            );
        }
        out
    }

    /// Classify many items in parallel. Output keeps input order.
    pub fn classify_batch(&self, items: &[RawItem]) -> Vec<ClassificationRecord> {
        items
            .par_iter()
            .map(|item| self.classify(item))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Diagnostic: every matching keyword per category, not just the first.
    /// Not used for counting.
    pub fn explain(&self, text: &str, language: &str) -> BTreeMap<String, Vec<String>> {
        let lang = normalize_language(language);
        let mut found = BTreeMap::new();
        let Some(matchers) = self.by_language.get(&lang) else {
            return found;
        };
        let text = normalize_for_match(text, &lang);
        for m in matchers {
            let hits: Vec<String> = m
                .keywords
                .iter()
                .filter(|k| contains_word(&text, &k.folded))
                .map(|k| k.original.clone())
                .collect();
            if !hits.is_empty() {
                found.insert(m.category.clone(), hits);
            }
        }
        found
    }
}
