//! Node-link JSON: the wire format shared with external collaborators.
//!
//! Export writes every node with its hash and every edge with its endpoint
//! hashes and content key. Import replays nodes and edges through the normal
//! insertion protocol — inference is deterministic, so the reimported graph
//! is hash-equivalent to the original.

use serde_json::{Map, Value, json};

use crate::error::{BelError, BelWarning};
use crate::graph::{BelGraph, ResourceSpec};
use crate::model::edge::EdgeData;
use crate::model::entity::Entity;

use std::collections::BTreeMap;

pub fn to_nodelink(graph: &BelGraph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes()
        .map(|(hash, entity)| {
            let mut object = match serde_json::to_value(entity) {
                Ok(Value::Object(object)) => object,
                _ => Map::new(),
            };
            object.insert("hash".to_string(), Value::String(hash.to_string()));
            Value::Object(object)
        })
        .collect();

    let edges: Vec<Value> = graph
        .edges
        .iter()
        .map(|(key, data)| {
            let mut object = match serde_json::to_value(data) {
                Ok(Value::Object(object)) => object,
                _ => Map::new(),
            };
            object.insert("source_hash".to_string(), Value::String(key.source.clone()));
            object.insert("target_hash".to_string(), Value::String(key.target.clone()));
            object.insert("key".to_string(), Value::String(key.key.clone()));
            Value::Object(object)
        })
        .collect();

    json!({
        "metadata": &graph.metadata,
        "namespaces": graph.namespaces(),
        "annotations": graph.annotations(),
        "warnings": graph.warnings(),
        "nodes": nodes,
        "edges": edges,
    })
}

pub fn from_nodelink(value: &Value) -> Result<BelGraph, BelError> {
    let mut graph = BelGraph::new();

    if let Some(metadata) = value.get("metadata") {
        graph.metadata = serde_json::from_value(metadata.clone())?;
    }
    if let Some(namespaces) = value.get("namespaces") {
        let namespaces: BTreeMap<String, ResourceSpec> = serde_json::from_value(namespaces.clone())?;
        for (keyword, spec) in namespaces {
            graph.declare_namespace(&keyword, spec);
        }
    }
    if let Some(annotations) = value.get("annotations") {
        let annotations: BTreeMap<String, ResourceSpec> = serde_json::from_value(annotations.clone())?;
        for (keyword, spec) in annotations {
            graph.declare_annotation(&keyword, spec);
        }
    }
    if let Some(warnings) = value.get("warnings") {
        let warnings: Vec<BelWarning> = serde_json::from_value(warnings.clone())?;
        for warning in warnings {
            graph.push_warning(warning);
        }
    }

    for node in list(value, "nodes") {
        let entity: Entity = serde_json::from_value(node.clone())?;
        graph.add_entity(entity);
    }

    for edge in list(value, "edges") {
        let source_hash = hash_field(edge, "source_hash")?;
        let target_hash = hash_field(edge, "target_hash")?;
        let source = graph.node_id(source_hash).ok_or_else(|| {
            BelError::MalformedNodeLink(format!("edge references unknown node {source_hash}"))
        })?;
        let target = graph.node_id(target_hash).ok_or_else(|| {
            BelError::MalformedNodeLink(format!("edge references unknown node {target_hash}"))
        })?;
        let data: EdgeData = serde_json::from_value(normalize_edge_object(edge))?;
        graph.insert_edge(source, target, data);
    }

    Ok(graph)
}

fn list<'a>(value: &'a Value, field: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|v| v.as_slice())
        .unwrap_or_default()
        .iter()
}

fn hash_field<'a>(edge: &'a Value, field: &str) -> Result<&'a str, BelError> {
    edge.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| BelError::MalformedNodeLink(format!("edge is missing {field}")))
}

/// Strip the endpoint fields and widen bare-string annotation values (the
/// older single-value representation) to singleton sets.
fn normalize_edge_object(edge: &Value) -> Value {
    let mut object = match edge {
        Value::Object(object) => object.clone(),
        _ => Map::new(),
    };
    object.remove("source_hash");
    object.remove("target_hash");
    object.remove("key");

    if let Some(Value::Object(annotations)) = object.get_mut("annotations") {
        for (_, values) in annotations.iter_mut() {
            if let Value::String(single) = values {
                *values = Value::Array(vec![Value::String(std::mem::take(single))]);
            }
        }
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::citation::{Citation, CitationType};
    use crate::model::concept::{Concept, Function};
    use crate::model::relation::Relation;

    fn protein(name: &str) -> Entity {
        Entity::simple(Function::Protein, Concept::named("HGNC", name).expect("concept"))
            .expect("protein")
    }

    fn sample_graph() -> BelGraph {
        let mut graph = BelGraph::new();
        graph.metadata.name = Some("T1".to_string());
        graph.metadata.version = Some("1.0.0".to_string());
        graph.declare_namespace("HGNC", ResourceSpec::Url("https://example/hgnc.belns".into()));

        let a = graph.add_entity(protein("AKT1"));
        let b = graph.add_entity(protein("EGFR"));
        let mut data = EdgeData::unqualified(Relation::Increases);
        data.citation = Some(Citation::new(CitationType::PubMed, "12345"));
        data.evidence = Some("ex".to_string());
        data.annotations
            .entry("CellLine".to_string())
            .or_default()
            .insert("HeLa".to_string());
        data.line = Some(6);
        graph.add_qualified_edge(a, b, data).expect("valid edge");
        graph
    }

    #[test]
    fn round_trip_preserves_the_graph() {
        let graph = sample_graph();
        let value = to_nodelink(&graph);
        let back = from_nodelink(&value).expect("reimport");
        assert_eq!(back, graph);
    }

    #[test]
    fn round_trip_preserves_hashes() {
        let graph = sample_graph();
        let value = to_nodelink(&graph);
        let back = from_nodelink(&value).expect("reimport");
        let original: Vec<&str> = graph.nodes().map(|(h, _)| h).collect();
        let reimported: Vec<&str> = back.nodes().map(|(h, _)| h).collect();
        assert_eq!(original, reimported);
    }

    #[test]
    fn single_value_annotations_widen_to_sets_on_import() {
        let graph = sample_graph();
        let mut value = to_nodelink(&graph);
        let edges = value
            .get_mut("edges")
            .and_then(Value::as_array_mut)
            .expect("edges array");
        for edge in edges.iter_mut() {
            if let Some(annotations) = edge.get_mut("annotations") {
                annotations["CellLine"] = Value::String("HeLa".to_string());
            }
        }
        let back = from_nodelink(&value).expect("reimport");
        assert_eq!(back, graph);
    }

    #[test]
    fn edges_referencing_unknown_nodes_are_rejected() {
        let graph = sample_graph();
        let mut value = to_nodelink(&graph);
        value["nodes"] = Value::Array(Vec::new());
        let err = from_nodelink(&value).expect_err("unknown nodes");
        assert!(matches!(err, BelError::MalformedNodeLink(_)));
    }
}
