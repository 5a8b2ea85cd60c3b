//! Citations: the provenance half of a qualified edge.

use serde::{Deserialize, Serialize};

/// The controlled set of citation source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CitationType {
    PubMed,
    PubMedCentral,
    Doi,
    Url,
    OnlineResource,
    JournalArticle,
    Other,
}

impl CitationType {
    /// Recognize the surface spelling used in `SET Citation` (case-insensitive).
    pub fn parse(surface: &str) -> Option<Self> {
        let t = match surface.trim().to_ascii_lowercase().as_str() {
            "pubmed" => Self::PubMed,
            "pubmed central" | "pmc" => Self::PubMedCentral,
            "doi" => Self::Doi,
            "url" => Self::Url,
            "online resource" => Self::OnlineResource,
            "journal article" => Self::JournalArticle,
            "other" => Self::Other,
            _ => return None,
        };
        Some(t)
    }

    /// The lowercase database prefix stored on edges, e.g. `("pubmed", "12345")`.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::PubMed => "pubmed",
            Self::PubMedCentral => "pmc",
            Self::Doi => "doi",
            Self::Url => "url",
            Self::OnlineResource => "online resource",
            Self::JournalArticle => "journal article",
            Self::Other => "other",
        }
    }

    /// Only PubMed references are numerically validated.
    pub fn requires_numeric_reference(self) -> bool {
        matches!(self, Self::PubMed)
    }
}

/// A `(database, reference)` pair plus the optional parsed metadata from the
/// long `SET Citation` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Lowercase database prefix (`pubmed`, `doi`, ...).
    pub db: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Citation {
    pub fn new(citation_type: CitationType, reference: impl Into<String>) -> Self {
        Self {
            db: citation_type.prefix().to_string(),
            reference: reference.into(),
            title: None,
            authors: Vec::new(),
            date: None,
            comment: None,
        }
    }

    /// Whether the pair is internally consistent: non-empty on both sides,
    /// and numeric when the database demands it.
    pub fn is_consistent(&self) -> bool {
        if self.db.trim().is_empty() || self.reference.trim().is_empty() {
            return false;
        }
        if self.db == CitationType::PubMed.prefix() {
            return !self.reference.is_empty() && self.reference.chars().all(|c| c.is_ascii_digit());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_types_parse_case_insensitively() {
        assert_eq!(CitationType::parse("PubMed"), Some(CitationType::PubMed));
        assert_eq!(CitationType::parse("online resource"), Some(CitationType::OnlineResource));
        assert_eq!(CitationType::parse("Journal Article"), Some(CitationType::JournalArticle));
        assert_eq!(CitationType::parse("Book"), None);
    }

    #[test]
    fn pubmed_references_must_be_numeric() {
        assert!(Citation::new(CitationType::PubMed, "12345").is_consistent());
        assert!(!Citation::new(CitationType::PubMed, "PMC12345").is_consistent());
        assert!(Citation::new(CitationType::Doi, "10.1000/xyz123").is_consistent());
    }

    #[test]
    fn empty_references_are_inconsistent() {
        assert!(!Citation::new(CitationType::Other, " ").is_consistent());
    }
}
