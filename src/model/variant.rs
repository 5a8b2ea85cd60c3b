//! Variants carried by central-dogma entities: HGVS strings, protein and
//! gene modifications, and fragments.
//!
//! Legacy surface forms (`sub`, `trunc`, single-letter amino acids, BEL-1
//! modification letters) are normalized by the parser before construction;
//! nothing legacy is ever stored here.

use serde::{Deserialize, Serialize};

use crate::model::concept::Concept;

/// Namespace used for modification concepts given without an explicit prefix,
/// e.g. `pmod(Ph)`.
pub const DEFAULT_MODIFICATION_NAMESPACE: &str = "bel";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Variant {
    /// A free-form HGVS variant string, e.g. `p.Phe508del`.
    Hgvs { variant: String },
    /// Post-translational modification.
    ProteinModification {
        concept: Concept,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<AminoAcid>,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<i64>,
    },
    /// Gene modification, e.g. methylation.
    GeneModification { concept: Concept },
    /// A fragment of the parent entity.
    Fragment {
        start: FragmentBound,
        stop: FragmentBound,
        #[serde(skip_serializing_if = "Option::is_none")]
        descriptor: Option<String>,
    },
}

impl Variant {
    pub fn hgvs(variant: impl Into<String>) -> Self {
        Self::Hgvs {
            variant: variant.into(),
        }
    }

    /// A protein modification from the default vocabulary.
    pub fn pmod(name: impl Into<String>, code: Option<AminoAcid>, position: Option<i64>) -> Self {
        Self::ProteinModification {
            concept: Concept {
                namespace: DEFAULT_MODIFICATION_NAMESPACE.to_string(),
                identifier: None,
                name: Some(name.into()),
            },
            code,
            position,
        }
    }

    /// A gene modification from the default vocabulary.
    pub fn gmod(name: impl Into<String>) -> Self {
        Self::GeneModification {
            concept: Concept {
                namespace: DEFAULT_MODIFICATION_NAMESPACE.to_string(),
                identifier: None,
                name: Some(name.into()),
            },
        }
    }
}

/// One endpoint of a fragment range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FragmentBound {
    Position(i64),
    Unknown,
}

impl FragmentBound {
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token == "?" || token == "*" {
            return Some(Self::Unknown);
        }
        token.parse::<i64>().ok().map(Self::Position)
    }
}

/// The twenty proteinogenic amino acids plus the termination codon, parsed
/// from one- or three-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    Ter,
}

impl AminoAcid {
    /// Accepts one- and three-letter codes case-insensitively. Returns `None`
    /// for anything outside the closed set (including the `X` placeholder).
    pub fn from_code(code: &str) -> Option<Self> {
        let aa = match code.trim().to_ascii_uppercase().as_str() {
            "A" | "ALA" => Self::Ala,
            "R" | "ARG" => Self::Arg,
            "N" | "ASN" => Self::Asn,
            "D" | "ASP" => Self::Asp,
            "C" | "CYS" => Self::Cys,
            "Q" | "GLN" => Self::Gln,
            "E" | "GLU" => Self::Glu,
            "G" | "GLY" => Self::Gly,
            "H" | "HIS" => Self::His,
            "I" | "ILE" => Self::Ile,
            "L" | "LEU" => Self::Leu,
            "K" | "LYS" => Self::Lys,
            "M" | "MET" => Self::Met,
            "F" | "PHE" => Self::Phe,
            "P" | "PRO" => Self::Pro,
            "S" | "SER" => Self::Ser,
            "T" | "THR" => Self::Thr,
            "W" | "TRP" => Self::Trp,
            "Y" | "TYR" => Self::Tyr,
            "V" | "VAL" => Self::Val,
            "*" | "TER" | "STOP" => Self::Ter,
            _ => return None,
        };
        Some(aa)
    }

    /// Whether the surface code was the legacy single-letter form.
    pub fn is_legacy_code(code: &str) -> bool {
        let code = code.trim();
        code.len() == 1 && Self::from_code(code).is_some()
    }

    /// Title-case three-letter code, used in canonical forms and HGVS.
    pub fn three_letter(self) -> &'static str {
        match self {
            Self::Ala => "Ala",
            Self::Arg => "Arg",
            Self::Asn => "Asn",
            Self::Asp => "Asp",
            Self::Cys => "Cys",
            Self::Gln => "Gln",
            Self::Glu => "Glu",
            Self::Gly => "Gly",
            Self::His => "His",
            Self::Ile => "Ile",
            Self::Leu => "Leu",
            Self::Lys => "Lys",
            Self::Met => "Met",
            Self::Phe => "Phe",
            Self::Pro => "Pro",
            Self::Ser => "Ser",
            Self::Thr => "Thr",
            Self::Trp => "Trp",
            Self::Tyr => "Tyr",
            Self::Val => "Val",
            Self::Ter => "Ter",
        }
    }
}

/// Map a BEL-1 single-letter modification onto the default vocabulary label.
pub fn legacy_pmod_label(letter: &str) -> Option<&'static str> {
    let label = match letter {
        "P" => "Ph",
        "A" => "Ac",
        "F" => "Farn",
        "G" => "Glyco",
        "H" => "Hy",
        "M" => "Me",
        "R" => "ADPRib",
        "S" => "Sumo",
        "U" => "Ub",
        "O" => "NO",
        _ => return None,
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amino_acids_parse_both_code_lengths() {
        assert_eq!(AminoAcid::from_code("S"), Some(AminoAcid::Ser));
        assert_eq!(AminoAcid::from_code("ser"), Some(AminoAcid::Ser));
        assert_eq!(AminoAcid::from_code("Ser"), Some(AminoAcid::Ser));
        assert_eq!(AminoAcid::from_code("*"), Some(AminoAcid::Ter));
        assert_eq!(AminoAcid::from_code("X"), None);
        assert_eq!(AminoAcid::from_code("Sec"), None);
    }

    #[test]
    fn legacy_detection_only_flags_single_letters() {
        assert!(AminoAcid::is_legacy_code("S"));
        assert!(!AminoAcid::is_legacy_code("Ser"));
        assert!(!AminoAcid::is_legacy_code("Z"));
    }

    #[test]
    fn fragment_bounds_parse_positions_and_placeholders() {
        assert_eq!(FragmentBound::parse("20"), Some(FragmentBound::Position(20)));
        assert_eq!(FragmentBound::parse("?"), Some(FragmentBound::Unknown));
        assert_eq!(FragmentBound::parse("*"), Some(FragmentBound::Unknown));
        assert_eq!(FragmentBound::parse("twenty"), None);
    }

    #[test]
    fn legacy_pmod_letters_map_to_vocabulary_labels() {
        assert_eq!(legacy_pmod_label("P"), Some("Ph"));
        assert_eq!(legacy_pmod_label("U"), Some("Ub"));
        assert_eq!(legacy_pmod_label("Q"), None);
    }
}
