//! Fatal compilation errors and the recoverable warning taxonomy.

use serde::{Deserialize, Serialize};

/// Fatal conditions that abort a compilation.
///
/// Everything that can be recovered from — per-statement parse failures,
/// semantic rejections, context violations — is a [`BelWarning`] instead;
/// the compiler records it and moves to the next logical line.
#[derive(thiserror::Error, Debug)]
pub enum BelError {
    #[error("document metadata is missing the required field \"{0}\"")]
    MissingDocumentMetadata(&'static str),

    #[error("line {line}: malformed DEFINE directive: {message}")]
    MalformedDefine { line: u64, message: String },

    #[error("resource unavailable: {url}: {message}")]
    ResourceUnavailable { url: String, message: String },

    #[error("namespace \"{keyword}\" redefined with a different source")]
    RedefinedNamespace { keyword: String },

    #[error("annotation \"{keyword}\" redefined with a different source")]
    RedefinedAnnotation { keyword: String },

    #[error("compilation cancelled")]
    Cancelled,

    #[error("node-link document is not a valid graph: {0}")]
    Import(#[from] serde_json::Error),

    #[error("node-link document is not a valid graph: {0}")]
    MalformedNodeLink(String),
}

/// The closed taxonomy of recoverable per-statement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    // Syntax
    BelSyntax,
    PlaceholderAminoAcid,
    MalformedTranslocation,
    InvalidFunctionSemantic,
    NestedRelation,
    // Lexical identity
    NakedName,
    UndefinedNamespace,
    UndefinedAnnotation,
    MissingNamespaceName,
    MissingNamespaceRegex,
    MissingAnnotationRegex,
    IllegalAnnotationValue,
    // Context
    MissingCitation,
    InvalidCitation,
    InvalidCitationType,
    InvalidPubMedIdentifier,
    MissingEvidence,
    MissingAnnotationKey,
    // Semantic hygiene
    VersionFormat,
    NamespaceKeywordMismatch,
}

/// Whether a record is a true warning or an info-level normalization trace.
///
/// Legacy-form rewrites (BEL-1 activities, single-letter amino acids,
/// `sub`/`trunc` to HGVS) stay visible in the warning stream but are flagged
/// `Debug` so consumers can separate document defects from automatic fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Debug,
}

/// One recoverable failure, preserved in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BelWarning {
    /// 1-based number of the first physical line of the offending logical line.
    pub line: u64,
    /// The offending logical line, verbatim.
    pub text: String,
    pub kind: WarningKind,
    pub message: String,
    pub severity: Severity,
}

impl BelWarning {
    pub fn new(line: u64, text: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            kind,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// An info-level normalization trace carrying one of the legacy codes
    /// (001, 005, 006, 009, 016, 024, 025).
    pub fn debug(line: u64, text: impl Into<String>, kind: WarningKind, code: u16, message: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            kind,
            message: format!("{:03}: {}", code, message.into()),
            severity: Severity::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_warnings_carry_zero_padded_codes() {
        let w = BelWarning::debug(4, "kin(p(HGNC:AKT1))", WarningKind::BelSyntax, 1, "legacy activity");
        assert_eq!(w.severity, Severity::Debug);
        assert!(w.message.starts_with("001: "));
    }

    #[test]
    fn warning_kind_round_trips_through_json() {
        let kind = WarningKind::MissingNamespaceName;
        let json = serde_json::to_string(&kind).expect("serialize kind");
        let back: WarningKind = serde_json::from_str(&json).expect("deserialize kind");
        assert_eq!(back, kind);
    }
}
