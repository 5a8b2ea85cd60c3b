//! The BEL multigraph: entities keyed by canonical hash, edges keyed by
//! content, inference of structural edges on insertion.

pub mod nodelink;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::canon;
use crate::error::BelWarning;
use crate::model::edge::EdgeData;
use crate::model::entity::Entity;
use crate::model::relation::Relation;

/// Document-level metadata from `SET DOCUMENT` directives. The
/// `(name, version)` pair is the graph's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licenses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl DocumentMetadata {
    /// Store a recognized `SET DOCUMENT` key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "Name" => &mut self.name,
            "Version" => &mut self.version,
            "Description" => &mut self.description,
            "Authors" => &mut self.authors,
            "ContactInfo" => &mut self.contact_info,
            "Licenses" => &mut self.licenses,
            "Copyright" => &mut self.copyright,
            "Disclaimer" => &mut self.disclaimer,
            "Project" => &mut self.project,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// How a namespace or annotation keyword was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ResourceSpec {
    Url(String),
    Pattern(String),
    List(Vec<String>),
}

/// Index into the graph's entity arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// Content key of one edge: source hash, target hash, payload hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
    pub key: String,
}

/// Rejections from the qualified-edge protocol. Each maps onto the warning
/// taxonomy; the compiler records them and drops the statement.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EdgeError {
    #[error("qualified edge requires a citation")]
    MissingCitation,
    #[error("qualified edge requires evidence")]
    MissingEvidence,
    #[error("citation database and reference are inconsistent")]
    InvalidCitation,
}

impl EdgeError {
    pub fn kind(&self) -> crate::error::WarningKind {
        match self {
            Self::MissingCitation => crate::error::WarningKind::MissingCitation,
            Self::MissingEvidence => crate::error::WarningKind::MissingEvidence,
            Self::InvalidCitation => crate::error::WarningKind::InvalidCitation,
        }
    }
}

/// A labeled multidigraph over typed entities.
///
/// Entities live in an arena; a hash index de-duplicates insertion and edges
/// reference hashes, so cyclic topologies carry no ownership cycles. Edges
/// are keyed by content hash: re-adding an identical edge is a no-op.
#[derive(Debug, Clone, Default)]
pub struct BelGraph {
    pub metadata: DocumentMetadata,
    namespaces: BTreeMap<String, ResourceSpec>,
    annotations: BTreeMap<String, ResourceSpec>,
    entities: Vec<Entity>,
    hashes: Vec<String>,
    node_index: BTreeMap<String, NodeId>,
    edges: BTreeMap<EdgeKey, EdgeData>,
    warnings: Vec<BelWarning>,
}

impl BelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity and everything it implies: members of list
    /// abundances and reactions, the variant-free parent of a variant-bearing
    /// entity, and the central-dogma chain for variant-free proteins and
    /// RNAs. Idempotent; returns the node's id either way.
    pub fn add_entity(&mut self, entity: Entity) -> NodeId {
        let hash = canon::node_hash(&entity);
        if let Some(&id) = self.node_index.get(&hash) {
            return id;
        }

        let id = NodeId(self.entities.len());
        trace!(hash = %hash, "adding node");
        self.entities.push(entity.clone());
        self.hashes.push(hash.clone());
        self.node_index.insert(hash, id);

        for member in entity.members() {
            let member_id = self.add_entity(member.clone());
            let relation = match entity {
                Entity::Complex { .. } => Relation::HasComponent,
                _ => Relation::HasMember,
            };
            self.add_unqualified_edge(id, member_id, relation);
        }
        for reactant in entity.reactants() {
            let reactant_id = self.add_entity(reactant.clone());
            self.add_unqualified_edge(id, reactant_id, Relation::HasReactant);
        }
        for product in entity.products() {
            let product_id = self.add_entity(product.clone());
            self.add_unqualified_edge(id, product_id, Relation::HasProduct);
        }

        if let Some(parent) = entity.parent() {
            let parent_id = self.add_entity(parent);
            self.add_unqualified_edge(id, parent_id, Relation::HasVariant);
        } else if let Some(concept) = entity.concept().cloned() {
            match entity {
                Entity::Protein { .. } => {
                    let rna = Entity::Rna {
                        concept,
                        variants: Vec::new(),
                    };
                    let rna_id = self.add_entity(rna);
                    self.add_unqualified_edge(rna_id, id, Relation::TranslatedTo);
                }
                Entity::Rna { .. } | Entity::MicroRna { .. } => {
                    let gene = Entity::Gene {
                        concept,
                        variants: Vec::new(),
                    };
                    let gene_id = self.add_entity(gene);
                    self.add_unqualified_edge(gene_id, id, Relation::TranscribedTo);
                }
                _ => {}
            }
        }

        id
    }

    /// Look up an already-inserted entity by hash.
    pub fn node_id(&self, hash: &str) -> Option<NodeId> {
        self.node_index.get(hash).copied()
    }

    pub fn entity(&self, id: NodeId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn node_hash(&self, id: NodeId) -> &str {
        &self.hashes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All entities, in hash order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.node_index
            .iter()
            .map(|(hash, id)| (hash.as_str(), &self.entities[id.0]))
    }

    /// All edges as `(source_hash, target_hash, data)`, in key order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeData)> {
        self.edges
            .iter()
            .map(|(key, data)| (key.source.as_str(), key.target.as_str(), data))
    }

    /// All edges with their full content keys.
    pub fn edge_entries(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeData)> {
        self.edges.iter()
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    /// Insert a qualified edge after checking the provenance contract.
    pub fn add_qualified_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        data: EdgeData,
    ) -> Result<EdgeKey, EdgeError> {
        let citation = data.citation.as_ref().ok_or(EdgeError::MissingCitation)?;
        if citation.reference.trim().is_empty() {
            return Err(EdgeError::MissingCitation);
        }
        if !citation.is_consistent() {
            return Err(EdgeError::InvalidCitation);
        }
        if data.evidence.as_deref().map(str::trim).filter(|e| !e.is_empty()).is_none() {
            return Err(EdgeError::MissingEvidence);
        }
        Ok(self.insert_edge(source, target, data))
    }

    /// Insert an inferred or structural edge; idempotent by content.
    pub fn add_unqualified_edge(&mut self, source: NodeId, target: NodeId, relation: Relation) -> EdgeKey {
        self.insert_edge(source, target, EdgeData::unqualified(relation))
    }

    pub(crate) fn insert_edge(&mut self, source: NodeId, target: NodeId, data: EdgeData) -> EdgeKey {
        let source_hash = self.hashes[source.0].clone();
        let target_hash = self.hashes[target.0].clone();
        let key = EdgeKey {
            key: canon::edge_hash(&data, &source_hash, &target_hash),
            source: source_hash,
            target: target_hash,
        };
        self.edges.entry(key.clone()).or_insert(data);
        key
    }

    pub fn push_warning(&mut self, warning: BelWarning) {
        self.warnings.push(warning);
    }

    /// Warnings in document order.
    pub fn warnings(&self) -> &[BelWarning] {
        &self.warnings
    }

    pub fn namespaces(&self) -> &BTreeMap<String, ResourceSpec> {
        &self.namespaces
    }

    pub fn annotations(&self) -> &BTreeMap<String, ResourceSpec> {
        &self.annotations
    }

    /// Record a namespace declaration. Returns false when the keyword is
    /// already declared with a different source (the caller treats that as
    /// fatal); an identical redeclaration is a no-op.
    pub fn declare_namespace(&mut self, keyword: &str, spec: ResourceSpec) -> bool {
        declare(&mut self.namespaces, keyword, spec)
    }

    pub fn declare_annotation(&mut self, keyword: &str, spec: ResourceSpec) -> bool {
        declare(&mut self.annotations, keyword, spec)
    }
}

fn declare(map: &mut BTreeMap<String, ResourceSpec>, keyword: &str, spec: ResourceSpec) -> bool {
    match map.get(keyword) {
        Some(existing) => *existing == spec,
        None => {
            map.insert(keyword.to_string(), spec);
            true
        }
    }
}

/// Hash-equivalence: same metadata, declarations, warnings, node set, and
/// edge set. Arena order is an implementation detail and does not participate.
impl PartialEq for BelGraph {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.namespaces == other.namespaces
            && self.annotations == other.annotations
            && self.warnings == other.warnings
            && self.edges == other.edges
            && self.nodes().collect::<BTreeMap<_, _>>() == other.nodes().collect::<BTreeMap<_, _>>()
    }
}

impl Eq for BelGraph {}
