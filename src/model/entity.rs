//! The closed sum type of graph vertices.
//!
//! Entities are value objects: constructed once, normalized at construction,
//! immutable afterwards. List members and variants are sorted by canonical
//! form (and members de-duplicated) when an entity is built, so structural
//! equality coincides with canonical-form equality.

use serde::{Deserialize, Serialize};

use crate::canon;
use crate::model::concept::{Concept, Function};
use crate::model::fusion::Fusion;
use crate::model::variant::Variant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function")]
pub enum Entity {
    Abundance {
        concept: Concept,
    },
    Gene {
        concept: Concept,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<Variant>,
    },
    Rna {
        concept: Concept,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<Variant>,
    },
    MicroRna {
        concept: Concept,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<Variant>,
    },
    Protein {
        concept: Concept,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<Variant>,
    },
    BiologicalProcess {
        concept: Concept,
    },
    Pathology {
        concept: Concept,
    },
    Population {
        concept: Concept,
    },
    Complex {
        #[serde(skip_serializing_if = "Option::is_none")]
        concept: Option<Concept>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        members: Vec<Entity>,
    },
    Composite {
        members: Vec<Entity>,
    },
    Reaction {
        #[serde(skip_serializing_if = "Option::is_none")]
        concept: Option<Concept>,
        reactants: Vec<Entity>,
        products: Vec<Entity>,
    },
    GeneFusion {
        fusion: Fusion,
    },
    RnaFusion {
        fusion: Fusion,
    },
    ProteinFusion {
        fusion: Fusion,
    },
}

impl Entity {
    /// A variant-free entity of any concept-bearing function.
    pub fn simple(function: Function, concept: Concept) -> Option<Self> {
        let entity = match function {
            Function::Abundance => Self::Abundance { concept },
            Function::Gene => Self::Gene { concept, variants: Vec::new() },
            Function::Rna => Self::Rna { concept, variants: Vec::new() },
            Function::MicroRna => Self::MicroRna { concept, variants: Vec::new() },
            Function::Protein => Self::Protein { concept, variants: Vec::new() },
            Function::BiologicalProcess => Self::BiologicalProcess { concept },
            Function::Pathology => Self::Pathology { concept },
            Function::Population => Self::Population { concept },
            Function::Complex => Self::Complex {
                concept: Some(concept),
                members: Vec::new(),
            },
            Function::Composite | Function::Reaction => return None,
        };
        Some(entity)
    }

    /// A central-dogma entity with variants; `None` when the function cannot
    /// carry variants.
    pub fn with_variants(function: Function, concept: Concept, variants: Vec<Variant>) -> Option<Self> {
        let variants = sort_variants(variants);
        let entity = match function {
            Function::Gene => Self::Gene { concept, variants },
            Function::Rna => Self::Rna { concept, variants },
            Function::MicroRna => Self::MicroRna { concept, variants },
            Function::Protein => Self::Protein { concept, variants },
            _ => return None,
        };
        Some(entity)
    }

    pub fn complex_of(concept: Option<Concept>, members: Vec<Entity>) -> Self {
        Self::Complex {
            concept,
            members: sort_members(members),
        }
    }

    pub fn composite_of(members: Vec<Entity>) -> Self {
        Self::Composite {
            members: sort_members(members),
        }
    }

    pub fn reaction_of(concept: Option<Concept>, reactants: Vec<Entity>, products: Vec<Entity>) -> Self {
        Self::Reaction {
            concept,
            reactants: sort_members(reactants),
            products: sort_members(products),
        }
    }

    /// A fusion under one of the central-dogma functions; `None` otherwise.
    pub fn fusion(function: Function, fusion: Fusion) -> Option<Self> {
        let entity = match function {
            Function::Gene => Self::GeneFusion { fusion },
            Function::Rna => Self::RnaFusion { fusion },
            Function::Protein => Self::ProteinFusion { fusion },
            _ => return None,
        };
        Some(entity)
    }

    pub fn function(&self) -> Function {
        match self {
            Self::Abundance { .. } => Function::Abundance,
            Self::Gene { .. } | Self::GeneFusion { .. } => Function::Gene,
            Self::Rna { .. } | Self::RnaFusion { .. } => Function::Rna,
            Self::MicroRna { .. } => Function::MicroRna,
            Self::Protein { .. } | Self::ProteinFusion { .. } => Function::Protein,
            Self::BiologicalProcess { .. } => Function::BiologicalProcess,
            Self::Pathology { .. } => Function::Pathology,
            Self::Population { .. } => Function::Population,
            Self::Complex { .. } => Function::Complex,
            Self::Composite { .. } => Function::Composite,
            Self::Reaction { .. } => Function::Reaction,
        }
    }

    /// The concept identifying a simple entity or naming a complex/reaction.
    pub fn concept(&self) -> Option<&Concept> {
        match self {
            Self::Abundance { concept }
            | Self::Gene { concept, .. }
            | Self::Rna { concept, .. }
            | Self::MicroRna { concept, .. }
            | Self::Protein { concept, .. }
            | Self::BiologicalProcess { concept }
            | Self::Pathology { concept }
            | Self::Population { concept } => Some(concept),
            Self::Complex { concept, .. } | Self::Reaction { concept, .. } => concept.as_ref(),
            Self::Composite { .. }
            | Self::GeneFusion { .. }
            | Self::RnaFusion { .. }
            | Self::ProteinFusion { .. } => None,
        }
    }

    pub fn variants(&self) -> &[Variant] {
        match self {
            Self::Gene { variants, .. }
            | Self::Rna { variants, .. }
            | Self::MicroRna { variants, .. }
            | Self::Protein { variants, .. } => variants,
            _ => &[],
        }
    }

    /// The variant-free copy of a variant-bearing central-dogma entity.
    pub fn parent(&self) -> Option<Entity> {
        if self.variants().is_empty() {
            return None;
        }
        let concept = self.concept()?.clone();
        Entity::simple(self.function(), concept)
    }

    /// Members of a list abundance, in canonical order.
    pub fn members(&self) -> &[Entity] {
        match self {
            Self::Complex { members, .. } | Self::Composite { members } => members,
            _ => &[],
        }
    }

    pub fn reactants(&self) -> &[Entity] {
        match self {
            Self::Reaction { reactants, .. } => reactants,
            _ => &[],
        }
    }

    pub fn products(&self) -> &[Entity] {
        match self {
            Self::Reaction { products, .. } => products,
            _ => &[],
        }
    }
}

/// Sort by canonical form and drop duplicates; list abundances and reaction
/// sides are sets.
fn sort_members(mut members: Vec<Entity>) -> Vec<Entity> {
    members.sort_by_cached_key(canon::entity);
    members.dedup();
    members
}

fn sort_variants(mut variants: Vec<Variant>) -> Vec<Variant> {
    variants.sort_by_cached_key(canon::variant);
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::variant::AminoAcid;

    fn protein(name: &str) -> Entity {
        Entity::simple(
            Function::Protein,
            Concept::named("HGNC", name).expect("named concept"),
        )
        .expect("protein entity")
    }

    #[test]
    fn complex_members_are_sorted_and_deduplicated() {
        let a = Entity::complex_of(None, vec![protein("FOS"), protein("JUN"), protein("FOS")]);
        let b = Entity::complex_of(None, vec![protein("JUN"), protein("FOS")]);
        assert_eq!(a, b);
        assert_eq!(a.members().len(), 2);
    }

    #[test]
    fn reaction_sides_stay_separate() {
        let forward = Entity::reaction_of(None, vec![protein("A")], vec![protein("B")]);
        let reverse = Entity::reaction_of(None, vec![protein("B")], vec![protein("A")]);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn parent_strips_variants() {
        let variant = Entity::with_variants(
            Function::Protein,
            Concept::named("HGNC", "AKT1").expect("concept"),
            vec![Variant::pmod("Ph", Some(AminoAcid::Ser), Some(9))],
        )
        .expect("variant-bearing protein");
        let parent = variant.parent().expect("parent exists");
        assert_eq!(parent, protein("AKT1"));
        assert!(protein("AKT1").parent().is_none());
    }

    #[test]
    fn composite_cannot_be_built_as_simple() {
        let concept = Concept::named("X", "y").expect("concept");
        assert!(Entity::simple(Function::Composite, concept.clone()).is_none());
        assert!(Entity::simple(Function::Reaction, concept).is_none());
    }

    #[test]
    fn variants_only_attach_to_central_dogma_functions() {
        let concept = Concept::named("HGNC", "AKT1").expect("concept");
        assert!(Entity::with_variants(Function::Pathology, concept, vec![]).is_none());
    }
}
