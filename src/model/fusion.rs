//! Fusion entities: a 5′ partner, a 3′ partner, and their sequence ranges.

use serde::{Deserialize, Serialize};

use crate::model::concept::Concept;

/// Payload shared by `GeneFusion`, `RnaFusion`, and `ProteinFusion`.
/// Partner order is 5′ then 3′ and is never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fusion {
    pub partner5: Concept,
    pub range5: FusionRange,
    pub partner3: Concept,
    pub range3: FusionRange,
}

/// A fusion breakpoint range: either missing (the `"?"` sentinel) or an
/// enumerated `<reference>.<start>_<stop>` range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FusionRange {
    Missing,
    Enumerated {
        /// Reference sequence code, e.g. `r`, `c`, `p`.
        reference: String,
        start: FusionPosition,
        stop: FusionPosition,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FusionPosition {
    Position(i64),
    Unknown,
}

impl FusionPosition {
    fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token == "?" {
            return Some(Self::Unknown);
        }
        token.parse::<i64>().ok().map(Self::Position)
    }
}

impl FusionRange {
    /// Parse the quoted surface form: `"?"`, or `"<ref>.<start>_<stop>"`
    /// with integer or `?` endpoints (e.g. `"r.1_79"`, `"p.1_?"`).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == "?" {
            return Some(Self::Missing);
        }
        let (reference, span) = text.split_once('.')?;
        let reference = reference.trim();
        if reference.is_empty() || !reference.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let (start, stop) = span.split_once('_')?;
        Some(Self::Enumerated {
            reference: reference.to_string(),
            start: FusionPosition::parse(start)?,
            stop: FusionPosition::parse(stop)?,
        })
    }
}
