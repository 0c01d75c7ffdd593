// src/dictionary.rs
//! Keyword dictionary: category → language → ordered keywords.
//!
//! JSON shape:
//! {
//!   "violence":   { "TR": ["şehit", "saldırı"], "EN": ["attack", "martyr"] },
//!   "conspiracy": { "EN": ["new world order"] }
//! }
//!
//! TOML uses one table per category with the same language → array layout.
//! Loaded once; there is no mutation API. Share it behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::matching::fold_case;

pub const DEFAULT_KEYWORDS_JSON: &str = "config/keywords.json";
pub const DEFAULT_KEYWORDS_TOML: &str = "config/keywords.toml";
pub const ENV_KEYWORDS_PATH: &str = "KEYWORDS_PATH";

type RawDictionary = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Normalize a language code for lookup: trimmed ASCII uppercase.
pub fn normalize_language(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordDictionary {
    entries: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl KeywordDictionary {
    /// Load from a file. Format is picked by extension (`.toml` / `.json`), with a
    /// content-sniffing fallback for anything else.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let origin = path.display().to_string();

        let dict = match ext.as_str() {
            "json" => Self::parse_json(&content, &origin)?,
            "toml" => Self::parse_toml(&content, &origin)?,
            _ => Self::parse_json(&content, &origin)
                .or_else(|_| Self::parse_toml(&content, &origin))?,
        };

        info!(
            target: "dictionary",
            path = %origin,
            categories = dict.entries.len(),
            keywords = dict.keyword_count(),
            "keyword dictionary loaded"
        );
        Ok(dict)
    }

    /// Resolve the dictionary path:
    /// 1) $KEYWORDS_PATH (must exist)
    /// 2) config/keywords.json
    /// 3) config/keywords.toml
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(p) = std::env::var(ENV_KEYWORDS_PATH) {
            return Self::load(&PathBuf::from(p));
        }
        let json_p = PathBuf::from(DEFAULT_KEYWORDS_JSON);
        if json_p.exists() {
            return Self::load(&json_p);
        }
        let toml_p = PathBuf::from(DEFAULT_KEYWORDS_TOML);
        if toml_p.exists() {
            return Self::load(&toml_p);
        }
        Err(ConfigError::Missing(json_p))
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Self::parse_json(s, "<inline json>")
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Self::parse_toml(s, "<inline toml>")
    }

    fn parse_json(s: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawDictionary =
            serde_json::from_str(s).map_err(|e| ConfigError::Malformed {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_raw(raw))
    }

    fn parse_toml(s: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawDictionary = toml::from_str(s).map_err(|e| ConfigError::Malformed {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_raw(raw))
    }

    /// Normalize language codes, trim keywords, drop blanks and fold-duplicates
    /// (first occurrence keeps its position).
    fn from_raw(raw: RawDictionary) -> Self {
        let mut entries: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for (category, langs) in raw {
            let category = category.trim().to_string();
            if category.is_empty() {
                debug!(target: "dictionary", "skipping blank category name");
                continue;
            }
            let slot = entries.entry(category).or_default();
            for (lang, keywords) in langs {
                let lang = normalize_language(&lang);
                if lang.is_empty() {
                    continue;
                }
                let list = slot.entry(lang.clone()).or_default();
                let mut seen: HashSet<String> =
                    list.iter().map(|k| fold_case(k, &lang)).collect();
                for kw in keywords {
                    let kw = kw.trim();
                    if kw.is_empty() {
                        continue;
                    }
                    if seen.insert(fold_case(kw, &lang)) {
                        list.push(kw.to_string());
                    }
                }
            }
        }
        Self { entries }
    }

    /// Keywords for `category` in `language`, in declared order. Empty when absent.
    pub fn keywords_for(&self, category: &str, language: &str) -> &[String] {
        self.entries
            .get(category)
            .and_then(|langs| langs.get(&normalize_language(language)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every language code that has at least one keyword in some category.
    pub fn languages(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flat_map(|langs| langs.iter())
            .filter(|(_, kws)| !kws.is_empty())
            .map(|(lang, _)| lang.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keyword_count() == 0
    }

    pub fn keyword_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|langs| langs.values())
            .map(Vec::len)
            .sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Vec<String>>)> {
        self.entries.iter().map(|(c, l)| (c.as_str(), l))
    }
}
