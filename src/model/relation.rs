//! The closed enumeration of BEL relations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "increases")]
    Increases,
    #[serde(rename = "directlyIncreases")]
    DirectlyIncreases,
    #[serde(rename = "decreases")]
    Decreases,
    #[serde(rename = "directlyDecreases")]
    DirectlyDecreases,
    #[serde(rename = "causesNoChange")]
    CausesNoChange,
    #[serde(rename = "regulates")]
    Regulates,
    #[serde(rename = "directlyRegulates")]
    DirectlyRegulates,
    #[serde(rename = "positiveCorrelation")]
    PositiveCorrelation,
    #[serde(rename = "negativeCorrelation")]
    NegativeCorrelation,
    #[serde(rename = "correlation")]
    Correlation,
    #[serde(rename = "noCorrelation")]
    NoCorrelation,
    #[serde(rename = "association")]
    Association,
    #[serde(rename = "binds")]
    Binds,
    #[serde(rename = "isA")]
    IsA,
    #[serde(rename = "subProcessOf")]
    SubProcessOf,
    #[serde(rename = "rateLimitingStepOf")]
    RateLimitingStepOf,
    #[serde(rename = "biomarkerFor")]
    BiomarkerFor,
    #[serde(rename = "prognosticBiomarkerFor")]
    PrognosticBiomarkerFor,
    #[serde(rename = "analogous")]
    Analogous,
    #[serde(rename = "orthologous")]
    Orthologous,
    #[serde(rename = "transcribedTo")]
    TranscribedTo,
    #[serde(rename = "translatedTo")]
    TranslatedTo,
    #[serde(rename = "equivalentTo")]
    EquivalentTo,
    #[serde(rename = "partOf")]
    PartOf,
    #[serde(rename = "hasVariant")]
    HasVariant,
    #[serde(rename = "hasComponent")]
    HasComponent,
    #[serde(rename = "hasMember")]
    HasMember,
    #[serde(rename = "hasReactant")]
    HasReactant,
    #[serde(rename = "hasProduct")]
    HasProduct,
}

impl Relation {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Increases => "increases",
            Self::DirectlyIncreases => "directlyIncreases",
            Self::Decreases => "decreases",
            Self::DirectlyDecreases => "directlyDecreases",
            Self::CausesNoChange => "causesNoChange",
            Self::Regulates => "regulates",
            Self::DirectlyRegulates => "directlyRegulates",
            Self::PositiveCorrelation => "positiveCorrelation",
            Self::NegativeCorrelation => "negativeCorrelation",
            Self::Correlation => "correlation",
            Self::NoCorrelation => "noCorrelation",
            Self::Association => "association",
            Self::Binds => "binds",
            Self::IsA => "isA",
            Self::SubProcessOf => "subProcessOf",
            Self::RateLimitingStepOf => "rateLimitingStepOf",
            Self::BiomarkerFor => "biomarkerFor",
            Self::PrognosticBiomarkerFor => "prognosticBiomarkerFor",
            Self::Analogous => "analogous",
            Self::Orthologous => "orthologous",
            Self::TranscribedTo => "transcribedTo",
            Self::TranslatedTo => "translatedTo",
            Self::EquivalentTo => "equivalentTo",
            Self::PartOf => "partOf",
            Self::HasVariant => "hasVariant",
            Self::HasComponent => "hasComponent",
            Self::HasMember => "hasMember",
            Self::HasReactant => "hasReactant",
            Self::HasProduct => "hasProduct",
        }
    }

    /// Recognize a relation keyword or one of its symbolic aliases.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let relation = match keyword {
            "increases" | "->" | "→" => Self::Increases,
            "directlyIncreases" | "=>" | "⇒" => Self::DirectlyIncreases,
            "decreases" | "-|" => Self::Decreases,
            "directlyDecreases" | "=|" => Self::DirectlyDecreases,
            "causesNoChange" | "cnc" => Self::CausesNoChange,
            "regulates" | "reg" => Self::Regulates,
            "directlyRegulates" => Self::DirectlyRegulates,
            "positiveCorrelation" | "pos" => Self::PositiveCorrelation,
            "negativeCorrelation" | "neg" => Self::NegativeCorrelation,
            "correlation" | "cor" => Self::Correlation,
            "noCorrelation" => Self::NoCorrelation,
            "association" | "--" => Self::Association,
            "binds" => Self::Binds,
            "isA" => Self::IsA,
            "subProcessOf" => Self::SubProcessOf,
            "rateLimitingStepOf" => Self::RateLimitingStepOf,
            "biomarkerFor" => Self::BiomarkerFor,
            "prognosticBiomarkerFor" => Self::PrognosticBiomarkerFor,
            "analogous" | "analogousTo" => Self::Analogous,
            "orthologous" => Self::Orthologous,
            "transcribedTo" | ":>" => Self::TranscribedTo,
            "translatedTo" | ">>" => Self::TranslatedTo,
            "equivalentTo" | "eq" => Self::EquivalentTo,
            "partOf" => Self::PartOf,
            "hasVariant" => Self::HasVariant,
            "hasComponent" => Self::HasComponent,
            "hasMember" => Self::HasMember,
            "hasReactant" => Self::HasReactant,
            "hasProduct" => Self::HasProduct,
            _ => return None,
        };
        Some(relation)
    }

    /// Relations that may be asserted or inferred without citation and
    /// evidence.
    pub fn allows_unqualified(self) -> bool {
        matches!(
            self,
            Self::HasVariant
                | Self::HasComponent
                | Self::HasMember
                | Self::HasReactant
                | Self::HasProduct
                | Self::TranscribedTo
                | Self::TranslatedTo
                | Self::EquivalentTo
                | Self::PartOf
        )
    }

    /// Correlative relations compile to a pair of directed edges, one in each
    /// direction, sharing a single content hash.
    pub fn is_two_way(self) -> bool {
        matches!(
            self,
            Self::PositiveCorrelation
                | Self::NegativeCorrelation
                | Self::Correlation
                | Self::NoCorrelation
                | Self::Association
                | Self::Binds
                | Self::Analogous
                | Self::Orthologous
                | Self::EquivalentTo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_aliases_resolve() {
        assert_eq!(Relation::from_keyword("->"), Some(Relation::Increases));
        assert_eq!(Relation::from_keyword("=|"), Some(Relation::DirectlyDecreases));
        assert_eq!(Relation::from_keyword("--"), Some(Relation::Association));
        assert_eq!(Relation::from_keyword("pos"), Some(Relation::PositiveCorrelation));
        assert_eq!(Relation::from_keyword("madeUp"), None);
    }

    #[test]
    fn keywords_round_trip() {
        for keyword in ["increases", "partOf", "hasReactant", "prognosticBiomarkerFor"] {
            let relation = Relation::from_keyword(keyword).expect("known keyword");
            assert_eq!(relation.keyword(), keyword);
        }
    }

    #[test]
    fn serde_uses_the_surface_keyword() {
        let json = serde_json::to_string(&Relation::DirectlyIncreases).expect("serialize");
        assert_eq!(json, "\"directlyIncreases\"");
    }

    #[test]
    fn structural_relations_are_unqualified() {
        assert!(Relation::HasVariant.allows_unqualified());
        assert!(Relation::TranscribedTo.allows_unqualified());
        assert!(!Relation::Increases.allows_unqualified());
    }

    #[test]
    fn correlations_are_two_way() {
        assert!(Relation::PositiveCorrelation.is_two_way());
        assert!(Relation::NegativeCorrelation.is_two_way());
        assert!(!Relation::Increases.is_two_way());
        assert!(!Relation::PartOf.is_two_way());
    }
}
