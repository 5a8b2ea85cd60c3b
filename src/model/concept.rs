//! Namespace-scoped concepts and the closed set of BEL functions.

use serde::{Deserialize, Serialize};

/// The minimal identity of a biological entity: a namespace prefix plus an
/// identifier, a name, or both. Empty strings are never stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Concept {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Concept {
    /// Build a concept, normalizing empty strings to absence. Returns `None`
    /// when neither an identifier nor a name survives normalization.
    pub fn new(
        namespace: impl Into<String>,
        identifier: Option<String>,
        name: Option<String>,
    ) -> Option<Self> {
        let namespace = namespace.into();
        let identifier = identifier.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let name = name.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if identifier.is_none() && name.is_none() {
            return None;
        }
        Some(Self {
            namespace,
            identifier,
            name,
        })
    }

    /// Shorthand for the common namespace/name pair.
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        Self::new(namespace, None, Some(name.into()))
    }

    /// The string used in canonical forms: the name when present, otherwise
    /// the identifier.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.identifier.as_deref())
            .unwrap_or_default()
    }
}

/// The closed set of BEL term functions (glossary function table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Function {
    Abundance,
    Gene,
    Rna,
    MicroRna,
    Protein,
    BiologicalProcess,
    Pathology,
    Complex,
    Composite,
    Reaction,
    Population,
}

impl Function {
    /// The abbreviated surface keyword, used in canonical forms.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Abundance => "a",
            Self::Gene => "g",
            Self::Rna => "r",
            Self::MicroRna => "m",
            Self::Protein => "p",
            Self::BiologicalProcess => "bp",
            Self::Pathology => "path",
            Self::Complex => "complex",
            Self::Composite => "composite",
            Self::Reaction => "rxn",
            Self::Population => "pop",
        }
    }

    /// The long surface keyword.
    pub fn long_form(self) -> &'static str {
        match self {
            Self::Abundance => "abundance",
            Self::Gene => "geneAbundance",
            Self::Rna => "rnaAbundance",
            Self::MicroRna => "microRNAAbundance",
            Self::Protein => "proteinAbundance",
            Self::BiologicalProcess => "biologicalProcess",
            Self::Pathology => "pathology",
            Self::Complex => "complexAbundance",
            Self::Composite => "compositeAbundance",
            Self::Reaction => "reaction",
            Self::Population => "populationAbundance",
        }
    }

    /// Recognize either surface form of a function keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let f = match keyword {
            "a" | "abundance" => Self::Abundance,
            "g" | "geneAbundance" => Self::Gene,
            "r" | "rnaAbundance" => Self::Rna,
            "m" | "microRNAAbundance" => Self::MicroRna,
            "p" | "proteinAbundance" => Self::Protein,
            "bp" | "biologicalProcess" => Self::BiologicalProcess,
            "path" | "pathology" => Self::Pathology,
            "complex" | "complexAbundance" => Self::Complex,
            "composite" | "compositeAbundance" => Self::Composite,
            "rxn" | "reaction" => Self::Reaction,
            "pop" | "populationAbundance" => Self::Population,
            _ => return None,
        };
        Some(f)
    }

    /// Whether this function participates in the central dogma chain and may
    /// therefore carry variants.
    pub fn is_central_dogma(self) -> bool {
        matches!(self, Self::Gene | Self::Rna | Self::MicroRna | Self::Protein)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_requires_identifier_or_name() {
        assert!(Concept::new("HGNC", None, None).is_none());
        assert!(Concept::new("HGNC", Some("  ".into()), Some(String::new())).is_none());
        let c = Concept::new("HGNC", Some("391".into()), Some("AKT1".into())).expect("both fields");
        assert_eq!(c.label(), "AKT1");
    }

    #[test]
    fn concept_label_falls_back_to_identifier() {
        let c = Concept::new("hgnc", Some("391".into()), None).expect("identifier only");
        assert_eq!(c.label(), "391");
    }

    #[test]
    fn function_keywords_round_trip() {
        for f in [
            Function::Abundance,
            Function::Gene,
            Function::Rna,
            Function::MicroRna,
            Function::Protein,
            Function::BiologicalProcess,
            Function::Pathology,
            Function::Complex,
            Function::Composite,
            Function::Reaction,
            Function::Population,
        ] {
            assert_eq!(Function::from_keyword(f.abbreviation()), Some(f));
            assert_eq!(Function::from_keyword(f.long_form()), Some(f));
        }
        assert_eq!(Function::from_keyword("prot"), None);
    }
}
