use serde::{Deserialize, Serialize};

use crate::hashing::hash_identity;
use crate::similarity::normalize_title;

/// One bibliographic entry under review.
///
/// Produced by the ingestion collaborator and treated as read-only by every
/// stage after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Primary persistent identifier.
    #[serde(default)]
    pub doi: Option<String>,
    /// Secondary persistent identifier (preprint id).
    #[serde(default)]
    pub arxiv_id: Option<String>,
    /// Origin tag (database the record was fetched from).
    #[serde(default)]
    pub source: Option<String>,
}

impl CandidateRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: None,
            authors: None,
            year: None,
            doi: None,
            arxiv_id: None,
            source: None,
        }
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = Some(abstract_text.into());
        self
    }

    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    pub fn with_arxiv_id(mut self, arxiv_id: impl Into<String>) -> Self {
        self.arxiv_id = Some(arxiv_id.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Abstract text, or `""` when missing.
    pub fn abstract_str(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or("")
    }

    /// `true` if the abstract has any non-whitespace content.
    pub fn has_abstract(&self) -> bool {
        !self.abstract_str().trim().is_empty()
    }

    pub fn normalized_doi(&self) -> Option<String> {
        self.doi.as_deref().and_then(normalize_doi)
    }

    pub fn normalized_arxiv_id(&self) -> Option<String> {
        self.arxiv_id.as_deref().and_then(normalize_arxiv_id)
    }

    /// Stable identity used by progress logs, review sessions and agreement
    /// pairing. Prefers the primary identifier, then the secondary one, then
    /// the normalized title with year and authors.
    pub fn key(&self) -> RecordKey {
        let hash = if let Some(doi) = self.normalized_doi() {
            hash_identity("doi", &doi)
        } else if let Some(arxiv) = self.normalized_arxiv_id() {
            hash_identity("arxiv", &arxiv)
        } else {
            let title = normalize_title(&self.title);
            let year = self.year.map(|y| y.to_string()).unwrap_or_default();
            let authors = self
                .authors
                .as_deref()
                .map(normalize_title)
                .unwrap_or_default();
            let mut material = format!("{title}|{year}|{authors}");
            if title.is_empty() {
                material.push('|');
                material.push_str(self.abstract_str().trim());
            }
            hash_identity("title", &material)
        };
        RecordKey::from_hash(hash)
    }

    /// Identifier suitable for display: DOI, then preprint id, then `"N/A"`.
    pub fn display_identifier(&self) -> &str {
        self.doi
            .as_deref()
            .or(self.arxiv_id.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("N/A")
    }
}

/// Stable per-record key (16 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn from_hash(hash: u64) -> Self {
        Self(format!("{hash:016x}"))
    }

    /// `"<key>-<ordinal>"`. Never equal to a hash-derived key.
    pub fn with_ordinal(&self, ordinal: usize) -> Self {
        Self(format!("{}-{ordinal}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

const ARXIV_PREFIXES: &[&str] = &["https://arxiv.org/abs/", "http://arxiv.org/abs/", "arxiv:"];

/// Lowercases a DOI and strips resolver/scheme prefixes.
///
/// Returns `None` for blank input so missing identifiers never match.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let stripped = DOI_PREFIXES
        .iter()
        .find_map(|prefix| lowered.strip_prefix(*prefix))
        .unwrap_or(&lowered)
        .trim();

    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Lowercases a preprint id, strips `arxiv:`/URL prefixes and a trailing
/// version suffix (`v2`).
pub fn normalize_arxiv_id(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let stripped = ARXIV_PREFIXES
        .iter()
        .find_map(|prefix| lowered.strip_prefix(*prefix))
        .unwrap_or(&lowered)
        .trim();

    let unversioned = match stripped.rfind('v') {
        Some(pos)
            if pos > 0
                && pos + 1 < stripped.len()
                && stripped[pos + 1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            &stripped[..pos]
        }
        _ => stripped,
    };

    if unversioned.is_empty() {
        None
    } else {
        Some(unversioned.to_string())
    }
}
