//! The mutable compilation context: current citation, evidence, annotations,
//! and statement group. Lives exactly as long as one compilation.

use crate::model::Citation;
use crate::model::edge::Annotations;

#[derive(Debug, Clone, Default)]
pub struct ParserContext {
    pub citation: Option<Citation>,
    pub evidence: Option<String>,
    pub annotations: Annotations,
    pub statement_group: Option<String>,
}

impl ParserContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new citation. In citation-clearing mode this also drops the
    /// evidence and every free annotation; the statement group survives.
    pub fn set_citation(&mut self, citation: Citation, clearing: bool) {
        if clearing {
            self.evidence = None;
            self.annotations.clear();
        }
        self.citation = Some(citation);
    }

    /// Remove one context key. Returns false when nothing was set under it.
    pub fn unset(&mut self, key: &str) -> bool {
        match key {
            "Citation" => self.citation.take().is_some(),
            "Evidence" | "SupportingText" => self.evidence.take().is_some(),
            "STATEMENT_GROUP" => self.statement_group.take().is_some(),
            _ => self.annotations.remove(key).is_some(),
        }
    }

    pub fn unset_all(&mut self) {
        self.citation = None;
        self.evidence = None;
        self.annotations.clear();
        self.statement_group = None;
    }
}
