//! Graph documents and their metadata records
//!
//! A [`Graph`] is the unit of persistence: nodes and edges are never written
//! individually, the whole document is replaced on every edit.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{MeshError, Result};
use super::types::{CategoryId, EdgeId, GraphMetaId, NodeId, Point, UserId};

/// A content item placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub creator: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named relation between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub source: NodeId,
    pub target: NodeId,
    pub creator: UserId,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// True if the edge touches `node` on either end
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// True if the edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// The persisted aggregate of one graph's nodes and edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub meta: GraphMetaId,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// A broken structural invariant found by [`Graph::violations`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructureViolation {
    DuplicateNodeId { node: NodeId },
    DuplicateEdgeId { edge: EdgeId },
    DanglingEdge { edge: EdgeId, missing: NodeId },
    SelfLoop { edge: EdgeId, node: NodeId },
    DuplicateEdge { edge: EdgeId, existing: EdgeId },
}

impl fmt::Display for StructureViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureViolation::DuplicateNodeId { node } => {
                write!(f, "node id {} appears more than once", node)
            }
            StructureViolation::DuplicateEdgeId { edge } => {
                write!(f, "edge id {} appears more than once", edge)
            }
            StructureViolation::DanglingEdge { edge, missing } => {
                write!(f, "edge {} references missing node {}", edge, missing)
            }
            StructureViolation::SelfLoop { edge, node } => {
                write!(f, "edge {} connects node {} to itself", edge, node)
            }
            StructureViolation::DuplicateEdge { edge, existing } => {
                write!(f, "edge {} duplicates edge {}", edge, existing)
            }
        }
    }
}

impl Graph {
    /// Create an empty graph document for a metadata record
    pub fn new(meta: GraphMetaId) -> Self {
        Self {
            meta,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// The edge joining `a` and `b` regardless of direction
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.connects(a, b))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every structural invariant the document currently breaks
    pub fn violations(&self) -> Vec<StructureViolation> {
        let mut violations = Vec::new();

        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                violations.push(StructureViolation::DuplicateNodeId { node: node.id });
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        let mut pairs: Vec<(NodeId, NodeId, EdgeId)> = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(edge.id) {
                violations.push(StructureViolation::DuplicateEdgeId { edge: edge.id });
            }

            let mut dangling = false;
            for endpoint in [edge.source, edge.target] {
                if !node_ids.contains(&endpoint) {
                    violations.push(StructureViolation::DanglingEdge {
                        edge: edge.id,
                        missing: endpoint,
                    });
                    dangling = true;
                    break;
                }
            }
            if dangling {
                continue;
            }

            if edge.source == edge.target {
                violations.push(StructureViolation::SelfLoop {
                    edge: edge.id,
                    node: edge.source,
                });
                continue;
            }

            let key = unordered(edge.source, edge.target);
            if let Some((_, _, existing)) = pairs.iter().find(|(a, b, _)| (*a, *b) == key) {
                violations.push(StructureViolation::DuplicateEdge {
                    edge: edge.id,
                    existing: *existing,
                });
            } else {
                pairs.push((key.0, key.1, edge.id));
            }
        }

        violations
    }

    /// Fail with `InvalidStructure` on the first broken invariant
    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        match violations.first() {
            None => Ok(()),
            Some(first) if violations.len() == 1 => {
                Err(MeshError::invalid_structure(first.to_string()))
            }
            Some(first) => Err(MeshError::invalid_structure(format!(
                "{} (and {} more)",
                first,
                violations.len() - 1
            ))),
        }
    }
}

fn unordered(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Metadata record of a graph; the edit session reads it for permission checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMeta {
    pub id: GraphMetaId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub owner: UserId,
    #[serde(default)]
    pub collaborators: Vec<UserId>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GraphMeta {
    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner == user
    }

    pub fn is_collaborator(&self, user: UserId) -> bool {
        self.collaborators.contains(&user)
    }

    /// Owner or collaborator
    pub fn is_member(&self, user: UserId) -> bool {
        self.is_owner(user) || self.is_collaborator(user)
    }
}

/// A named group of graphs shown together on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub owner: UserId,
}
