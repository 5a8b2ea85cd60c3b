//! Edge-side participant modifiers: activities, degradations, and
//! translocations, plus the location that may decorate any participant.

use serde::{Deserialize, Serialize};

use crate::model::concept::Concept;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "modifier")]
pub enum Modifier {
    /// Molecular activity, with an optional effect concept (`ma(kin)`).
    Activity {
        #[serde(skip_serializing_if = "Option::is_none")]
        effect: Option<Concept>,
    },
    /// Degradation carries no effect field and is preserved as written.
    Degradation,
    /// Locations are absent only for legacy unqualified translocations,
    /// which are rejected by default.
    Translocation {
        #[serde(skip_serializing_if = "Option::is_none")]
        from_loc: Option<Concept>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to_loc: Option<Concept>,
    },
}

impl Modifier {
    /// The fixed translocation emitted for `sec(...)`: intracellular to
    /// extracellular space.
    pub fn secretion() -> Self {
        Self::Translocation {
            from_loc: Some(go_concept("0005622", "intracellular")),
            to_loc: Some(go_concept("0005615", "extracellular space")),
        }
    }

    /// The fixed translocation emitted for `surf(...)`: intracellular to the
    /// cell surface.
    pub fn cell_surface_expression() -> Self {
        Self::Translocation {
            from_loc: Some(go_concept("0005622", "intracellular")),
            to_loc: Some(go_concept("0009986", "cell surface")),
        }
    }
}

fn go_concept(identifier: &str, name: &str) -> Concept {
    Concept {
        namespace: "go".to_string(),
        identifier: Some(identifier.to_string()),
        name: Some(name.to_string()),
    }
}

/// One endpoint of an edge as it appeared in the statement: the entity is the
/// graph node; the modifier and location ride on the edge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Participant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Concept>,
}

impl Participant {
    pub fn bare() -> Self {
        Self::default()
    }

    pub fn is_bare(&self) -> bool {
        self.modifier.is_none() && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secretion_is_a_fixed_translocation() {
        let Modifier::Translocation { from_loc, to_loc } = Modifier::secretion() else {
            panic!("sec must be a translocation");
        };
        assert_eq!(from_loc.and_then(|c| c.name).as_deref(), Some("intracellular"));
        assert_eq!(to_loc.and_then(|c| c.name).as_deref(), Some("extracellular space"));
    }

    #[test]
    fn bare_participants_serialize_to_an_empty_object() {
        let json = serde_json::to_string(&Participant::bare()).expect("serialize");
        assert_eq!(json, "{}");
    }
}
