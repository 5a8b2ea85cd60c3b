//! Canonicalization and hashing.
//!
//! Every entity has exactly one canonical form — a deterministic BEL string —
//! and its SHA-512 hex digest is the node's identity everywhere: in the
//! graph, in node-link JSON, and across process runs. Edges hash a canonical
//! JSON payload that excludes the line number.

use serde_json::{Map, Value, json};
use sha2::{Digest, Sha512};

use crate::model::edge::EdgeData;
use crate::model::entity::Entity;
use crate::model::fusion::{Fusion, FusionPosition, FusionRange};
use crate::model::variant::{DEFAULT_MODIFICATION_NAMESPACE, FragmentBound, Variant};
use crate::model::{Concept, Function};

/// Render a string as a double-quoted BEL literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Canonical `namespace:identifier ! name` rendering; values are always
/// quoted so the form re-parses regardless of content.
pub fn concept(concept: &Concept) -> String {
    match (&concept.identifier, &concept.name) {
        (Some(identifier), Some(name)) => {
            format!("{}:{} ! {}", concept.namespace, quote(identifier), quote(name))
        }
        (Some(identifier), None) => format!("{}:{}", concept.namespace, quote(identifier)),
        (None, Some(name)) => format!("{}:{}", concept.namespace, quote(name)),
        // Unreachable through the constructor; rendered defensively.
        (None, None) => format!("{}:\"\"", concept.namespace),
    }
}

/// A modification concept renders bare when it lives in the default
/// vocabulary: `pmod(Ph, Ser, 9)` rather than `pmod(bel:"Ph", ...)`.
fn modification_concept(c: &Concept) -> String {
    if c.namespace == DEFAULT_MODIFICATION_NAMESPACE {
        if let Some(name) = &c.name {
            return name.clone();
        }
    }
    concept(c)
}

pub fn variant(variant: &Variant) -> String {
    match variant {
        Variant::Hgvs { variant } => format!("var({})", quote(variant)),
        Variant::ProteinModification {
            concept: c,
            code,
            position,
        } => {
            let mut out = format!("pmod({}", modification_concept(c));
            if let Some(code) = code {
                out.push_str(", ");
                out.push_str(code.three_letter());
                if let Some(position) = position {
                    out.push_str(&format!(", {position}"));
                }
            }
            out.push(')');
            out
        }
        Variant::GeneModification { concept: c } => {
            format!("gmod({})", modification_concept(c))
        }
        Variant::Fragment {
            start,
            stop,
            descriptor,
        } => {
            let range = match (start, stop) {
                (FragmentBound::Unknown, FragmentBound::Unknown) => "?".to_string(),
                _ => format!("{}_{}", fragment_bound(start), fragment_bound(stop)),
            };
            match descriptor {
                Some(descriptor) => format!("frag({}, {})", quote(&range), quote(descriptor)),
                None => format!("frag({})", quote(&range)),
            }
        }
    }
}

fn fragment_bound(bound: &FragmentBound) -> String {
    match bound {
        FragmentBound::Position(p) => p.to_string(),
        FragmentBound::Unknown => "?".to_string(),
    }
}

fn fusion_range(range: &FusionRange) -> String {
    match range {
        FusionRange::Missing => quote("?"),
        FusionRange::Enumerated {
            reference,
            start,
            stop,
        } => quote(&format!(
            "{}.{}_{}",
            reference,
            fusion_position(start),
            fusion_position(stop)
        )),
    }
}

fn fusion_position(position: &FusionPosition) -> String {
    match position {
        FusionPosition::Position(p) => p.to_string(),
        FusionPosition::Unknown => "?".to_string(),
    }
}

fn fusion(function: Function, f: &Fusion) -> String {
    format!(
        "{}(fus({}, {}, {}, {}))",
        function.abbreviation(),
        concept(&f.partner5),
        fusion_range(&f.range5),
        concept(&f.partner3),
        fusion_range(&f.range3)
    )
}

/// The canonical form of an entity. Members and variants were sorted at
/// construction; fusion partner order is preserved.
pub fn entity(entity: &Entity) -> String {
    match entity {
        Entity::Abundance { concept: c }
        | Entity::BiologicalProcess { concept: c }
        | Entity::Pathology { concept: c }
        | Entity::Population { concept: c } => {
            format!("{}({})", entity.function().abbreviation(), concept(c))
        }
        Entity::Gene { concept: c, variants }
        | Entity::Rna { concept: c, variants }
        | Entity::MicroRna { concept: c, variants }
        | Entity::Protein { concept: c, variants } => {
            let mut out = format!("{}({}", entity.function().abbreviation(), concept(c));
            for v in variants {
                out.push_str(", ");
                out.push_str(&variant(v));
            }
            out.push(')');
            out
        }
        Entity::Complex { concept: c, members } => {
            let mut parts: Vec<String> = Vec::with_capacity(members.len() + 1);
            if let Some(c) = c {
                parts.push(concept(c));
            }
            parts.extend(members.iter().map(self::entity));
            format!("complex({})", parts.join(", "))
        }
        Entity::Composite { members } => {
            let parts: Vec<String> = members.iter().map(self::entity).collect();
            format!("composite({})", parts.join(", "))
        }
        Entity::Reaction {
            concept: c,
            reactants,
            products,
        } => {
            let reactants: Vec<String> = reactants.iter().map(self::entity).collect();
            let products: Vec<String> = products.iter().map(self::entity).collect();
            let lists = format!(
                "reactants({}), products({})",
                reactants.join(", "),
                products.join(", ")
            );
            match c {
                Some(c) => format!("rxn({}, {})", concept(c), lists),
                None => format!("rxn({})", lists),
            }
        }
        Entity::GeneFusion { fusion: f } => fusion(Function::Gene, f),
        Entity::RnaFusion { fusion: f } => fusion(Function::Rna, f),
        Entity::ProteinFusion { fusion: f } => fusion(Function::Protein, f),
    }
}

fn sha512_hex(bytes: &[u8]) -> String {
    let digest = Sha512::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// SHA-512 of the UTF-8 canonical form; the node's graph identity.
pub fn node_hash(e: &Entity) -> String {
    sha512_hex(entity(e).as_bytes())
}

/// SHA-512 of the canonical JSON of the edge payload plus endpoint hashes.
///
/// Keys are emitted in sorted order (`serde_json` maps are ordered), set
/// values are already sorted in the model, and the line number is excluded.
/// For two-way relations the two `(hash, participant)` records are ordered by
/// node hash so both emitted directions share one content hash.
pub fn edge_hash(data: &EdgeData, source_hash: &str, target_hash: &str) -> String {
    let source_participant = serde_json::to_value(&data.source).unwrap_or(Value::Null);
    let target_participant = serde_json::to_value(&data.target).unwrap_or(Value::Null);

    let ((source_hash, source_participant), (target_hash, target_participant)) =
        if data.relation.is_two_way() && source_hash > target_hash {
            (
                (target_hash, target_participant),
                (source_hash, source_participant),
            )
        } else {
            (
                (source_hash, source_participant),
                (target_hash, target_participant),
            )
        };

    let mut annotations = Map::new();
    for (key, values) in &data.annotations {
        annotations.insert(
            key.clone(),
            Value::Array(values.iter().map(|v| Value::String(v.clone())).collect()),
        );
    }

    let payload = json!({
        "relation": data.relation,
        "source_modifier": source_participant,
        "target_modifier": target_participant,
        "citation": &data.citation,
        "evidence": &data.evidence,
        "annotations": Value::Object(annotations),
        "source_hash": source_hash,
        "target_hash": target_hash,
    });

    sha512_hex(payload.to_string().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::citation::{Citation, CitationType};
    use crate::model::modifier::Modifier;
    use crate::model::relation::Relation;
    use crate::model::variant::AminoAcid;

    fn protein(name: &str) -> Entity {
        Entity::simple(Function::Protein, Concept::named("HGNC", name).expect("concept"))
            .expect("protein")
    }

    #[test]
    fn simple_canonical_quotes_the_name() {
        assert_eq!(entity(&protein("AKT1")), "p(HGNC:\"AKT1\")");
    }

    #[test]
    fn identifier_and_name_render_with_the_bang_separator() {
        let c = Concept::new("hgnc", Some("391".into()), Some("AKT1".into())).expect("concept");
        assert_eq!(concept(&c), "hgnc:\"391\" ! \"AKT1\"");
    }

    #[test]
    fn pmod_renders_the_default_vocabulary_bare() {
        let v = Variant::pmod("Ph", Some(AminoAcid::Ser), Some(9));
        assert_eq!(variant(&v), "pmod(Ph, Ser, 9)");
    }

    #[test]
    fn variant_bearing_protein_contains_the_pmod() {
        let e = Entity::with_variants(
            Function::Protein,
            Concept::named("HGNC", "AKT1").expect("concept"),
            vec![Variant::pmod("Ph", Some(AminoAcid::Ser), Some(9))],
        )
        .expect("entity");
        assert_eq!(entity(&e), "p(HGNC:\"AKT1\", pmod(Ph, Ser, 9))");
    }

    #[test]
    fn complex_hash_is_member_order_independent() {
        let a = Entity::complex_of(None, vec![protein("FOS"), protein("JUN")]);
        let b = Entity::complex_of(None, vec![protein("JUN"), protein("FOS")]);
        assert_eq!(node_hash(&a), node_hash(&b));
    }

    #[test]
    fn reaction_hash_distinguishes_sides_but_not_order_within_a_side() {
        let a = Entity::reaction_of(None, vec![protein("A"), protein("B")], vec![protein("C")]);
        let b = Entity::reaction_of(None, vec![protein("B"), protein("A")], vec![protein("C")]);
        let swapped = Entity::reaction_of(None, vec![protein("C")], vec![protein("A"), protein("B")]);
        assert_eq!(node_hash(&a), node_hash(&b));
        assert_ne!(node_hash(&a), node_hash(&swapped));
    }

    #[test]
    fn fusion_hash_is_orientation_sensitive() {
        let tmprss2 = Concept::named("HGNC", "TMPRSS2").expect("concept");
        let erg = Concept::named("HGNC", "ERG").expect("concept");
        let forward = Entity::fusion(
            Function::Rna,
            Fusion {
                partner5: tmprss2.clone(),
                range5: FusionRange::Missing,
                partner3: erg.clone(),
                range3: FusionRange::Missing,
            },
        )
        .expect("fusion");
        let reversed = Entity::fusion(
            Function::Rna,
            Fusion {
                partner5: erg,
                range5: FusionRange::Missing,
                partner3: tmprss2,
                range3: FusionRange::Missing,
            },
        )
        .expect("fusion");
        assert_ne!(node_hash(&forward), node_hash(&reversed));
    }

    #[test]
    fn canonical_equality_matches_hash_equality() {
        let a = protein("AKT1");
        let b = protein("AKT1");
        let c = protein("EGFR");
        assert_eq!(entity(&a), entity(&b));
        assert_eq!(node_hash(&a), node_hash(&b));
        assert_ne!(entity(&a), entity(&c));
        assert_ne!(node_hash(&a), node_hash(&c));
    }

    fn qualified_payload(relation: Relation) -> EdgeData {
        let mut data = EdgeData::unqualified(relation);
        data.citation = Some(Citation::new(CitationType::PubMed, "12345"));
        data.evidence = Some("ex".to_string());
        data
    }

    #[test]
    fn two_way_edges_share_one_hash_across_directions() {
        let a = node_hash(&protein("A"));
        let b = node_hash(&protein("B"));
        let data = qualified_payload(Relation::PositiveCorrelation);
        assert_eq!(edge_hash(&data, &a, &b), edge_hash(&data.reversed(), &b, &a));
    }

    #[test]
    fn directed_edges_distinguish_directions() {
        let a = node_hash(&protein("A"));
        let b = node_hash(&protein("B"));
        let data = qualified_payload(Relation::Increases);
        assert_ne!(edge_hash(&data, &a, &b), edge_hash(&data, &b, &a));
    }

    #[test]
    fn edge_hash_ignores_the_line_number() {
        let a = node_hash(&protein("A"));
        let b = node_hash(&protein("B"));
        let mut with_line = qualified_payload(Relation::Increases);
        with_line.line = Some(40);
        let without_line = qualified_payload(Relation::Increases);
        assert_eq!(edge_hash(&with_line, &a, &b), edge_hash(&without_line, &a, &b));
    }

    #[test]
    fn edge_hash_sees_modifiers() {
        let a = node_hash(&protein("A"));
        let b = node_hash(&protein("B"));
        let plain = qualified_payload(Relation::Increases);
        let mut degraded = qualified_payload(Relation::Increases);
        degraded.source.modifier = Some(Modifier::Degradation);
        assert_ne!(edge_hash(&plain, &a, &b), edge_hash(&degraded, &a, &b));
    }
}
