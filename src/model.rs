// src/model.rs
//! Shared data model: raw items, classification records, aggregate rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of observed text as produced by a source provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawItem {
    /// Optional caller-supplied identifier. When absent, see [`RawItem::fingerprint`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub platform: String,  // e.g. "SocialSite", "news"
    pub timestamp: String, // ISO-8601, parsed only at aggregation time
    pub language: String,  // e.g. "TR", "EN"
    #[serde(default)]
    pub region: Option<String>,
}

impl RawItem {
    pub fn new(
        text: impl Into<String>,
        platform: impl Into<String>,
        timestamp: impl Into<String>,
        language: impl Into<String>,
        region: Option<&str>,
    ) -> Self {
        Self {
            id: None,
            text: text.into(),
            platform: platform.into(),
            timestamp: timestamp.into(),
            language: language.into(),
            region: region.map(str::to_string),
        }
    }

    /// Stable identity used in logs and errors. Raw text never leaves this function.
    pub fn fingerprint(&self) -> String {
        if let Some(id) = self.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return id.to_string();
        }
        anon_hash(&[&self.platform, &self.timestamp, &self.text])
    }
}

/// Short SHA-256 prefix over the given parts (12 hex chars).
pub(crate) fn anon_hash(parts: &[&str]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p.as_bytes());
        hasher.update([0x1fu8]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Which granularity a resolved location represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationKind {
    Region,
    LanguageFallback,
}

impl LocationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationKind::Region => "region",
            LocationKind::LanguageFallback => "language-fallback",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved location: a concrete region, or the item's language when no region was given.
/// The two kinds are never merged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Location {
    Region(String),
    LanguageFallback(String),
}

impl Location {
    /// Region wins when present and non-blank; otherwise fall back to the language code.
    pub fn resolve(region: Option<&str>, language: &str) -> Self {
        match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => Location::Region(r.to_string()),
            None => Location::LanguageFallback(language.trim().to_string()),
        }
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Region(_) => LocationKind::Region,
            Location::LanguageFallback(_) => LocationKind::LanguageFallback,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Location::Region(v) | Location::LanguageFallback(v) => v,
        }
    }
}

/// One (item, category) match produced by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub item_id: String,
    pub platform: String,
    pub timestamp: String,
    pub location: Location,
    pub language: String,
    pub category: String,
    /// First keyword (in dictionary order) that matched this category.
    pub keyword: String,
}

/// One summary count. Serialized as
/// `{location, location_type, week, platform, category, count}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregateRow {
    pub location: String,
    pub location_type: LocationKind,
    pub week: String,
    pub platform: String,
    pub category: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_prefers_region_and_ignores_blank() {
        assert_eq!(
            Location::resolve(Some("Ankara"), "TR"),
            Location::Region("Ankara".into())
        );
        assert_eq!(
            Location::resolve(Some("   "), "EN"),
            Location::LanguageFallback("EN".into())
        );
        assert_eq!(
            Location::resolve(None, "EN").kind(),
            LocationKind::LanguageFallback
        );
    }

    #[test]
    fn row_serializes_with_flat_shape_and_literal_unicode() {
        let row = AggregateRow {
            location: "Şanlıurfa".into(),
            location_type: LocationKind::LanguageFallback,
            week: "2024-W03".into(),
            platform: "Forum".into(),
            category: "violence".into(),
            count: 2,
        };
        let s = serde_json::to_string(&row).unwrap();
        assert_eq!(
            s,
            r#"{"location":"Şanlıurfa","location_type":"language-fallback","week":"2024-W03","platform":"Forum","category":"violence","count":2}"#
        );
    }

    #[test]
    fn fingerprint_prefers_explicit_id() {
        let mut item = RawItem::new("x", "Forum", "2024-01-01", "EN", None);
        let hashed = item.fingerprint();
        assert_eq!(hashed.len(), 12);
        assert_eq!(hashed, item.fingerprint());

        item.id = Some("post-42".into());
        assert_eq!(item.fingerprint(), "post-42");
    }
}
