//! Edge payloads: a relation qualified by provenance and context.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::citation::Citation;
use crate::model::modifier::Participant;
use crate::model::relation::Relation;

/// Annotation context attached to an edge. Values are always sets, keyed by
/// the annotation keyword.
pub type Annotations = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Participant::is_bare")]
    pub source: Participant,
    #[serde(default, skip_serializing_if = "Participant::is_bare")]
    pub target: Participant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    /// First physical line of the originating statement. Excluded from the
    /// edge hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl EdgeData {
    /// The payload of an inferred or structural edge: relation only.
    pub fn unqualified(relation: Relation) -> Self {
        Self {
            relation,
            source: Participant::bare(),
            target: Participant::bare(),
            citation: None,
            evidence: None,
            annotations: Annotations::new(),
            line: None,
        }
    }

    /// Swap the two participant records, for the reverse direction of a
    /// two-way statement.
    pub fn reversed(&self) -> Self {
        let mut reversed = self.clone();
        std::mem::swap(&mut reversed.source, &mut reversed.target);
        reversed
    }
}
