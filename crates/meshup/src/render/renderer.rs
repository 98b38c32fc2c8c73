//! Keyed reconciliation of a graph against surface primitives

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::core::{BoundingBox, EdgeId, Graph, MeshError, NodeId, Point, RenderConfig, Result, Transform};

use super::surface::{Primitive, RenderSurface};

/// What a render pass changed on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Set on the pass that first populated an empty canvas
    pub fit_requested: bool,
}

impl RenderReport {
    /// True when no primitive was created or removed
    pub fn is_stable(&self) -> bool {
        self.created == 0 && self.removed == 0
    }
}

/// Draws graph snapshots onto a [`RenderSurface`]
///
/// Each pass joins edges by edge id and nodes by node id against the
/// primitives already on the surface: stale keys are removed, new keys are
/// created, and every remaining primitive is updated in place.
#[derive(Debug)]
pub struct GraphRenderer<S: RenderSurface> {
    surface: S,
    config: RenderConfig,
    nodes: HashMap<NodeId, S::Handle>,
    edges: HashMap<EdgeId, S::Handle>,
    positions: HashMap<NodeId, Point>,
    populated: bool,
}

impl<S: RenderSurface> GraphRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, RenderConfig::default())
    }

    pub fn with_config(surface: S, config: RenderConfig) -> Self {
        Self {
            surface,
            config,
            nodes: HashMap::new(),
            edges: HashMap::new(),
            positions: HashMap::new(),
            populated: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Number of node and edge primitives currently drawn
    pub fn rendered(&self) -> (usize, usize) {
        (self.nodes.len(), self.edges.len())
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.surface.set_transform(transform);
    }

    /// Reconcile the surface with `graph`
    ///
    /// Fails with `InvalidStructure` if an edge references a node absent from
    /// `graph`; the surface is left untouched in that case.
    pub fn render(&mut self, graph: &Graph) -> Result<RenderReport> {
        let positions: HashMap<NodeId, Point> =
            graph.nodes.iter().map(|n| (n.id, n.position)).collect();

        let mut lines = Vec::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            let endpoint = |id: NodeId| {
                positions.get(&id).copied().ok_or_else(|| {
                    MeshError::invalid_structure(format!(
                        "edge {} references node {} which is not in graph {}",
                        edge.id, id, graph.meta
                    ))
                })
            };
            let primitive = Primitive::Line {
                from: endpoint(edge.source)?,
                to: endpoint(edge.target)?,
                label: edge.label.clone(),
            };
            lines.push((edge.id, primitive));
        }

        let was_empty = self.nodes.is_empty() && self.edges.is_empty();
        let mut report = RenderReport::default();

        let live_edges: HashSet<EdgeId> = lines.iter().map(|(id, _)| *id).collect();
        reconcile(
            &mut self.surface,
            &mut self.edges,
            &live_edges,
            lines,
            &mut report,
        );

        let circles: Vec<(NodeId, Primitive)> = graph
            .nodes
            .iter()
            .map(|node| {
                let primitive = Primitive::Circle {
                    center: node.position,
                    radius: self.config.node_radius,
                    title: node.title.clone(),
                };
                (node.id, primitive)
            })
            .collect();
        let live_nodes: HashSet<NodeId> = positions.keys().copied().collect();
        reconcile(
            &mut self.surface,
            &mut self.nodes,
            &live_nodes,
            circles,
            &mut report,
        );

        self.positions = positions;
        if was_empty && !self.nodes.is_empty() && !self.populated {
            self.populated = true;
            report.fit_requested = true;
        }

        debug!(
            graph = %graph.meta,
            created = report.created,
            updated = report.updated,
            removed = report.removed,
            fit_requested = report.fit_requested,
            "Rendered graph"
        );
        Ok(report)
    }

    /// Bounding box of the rendered nodes including their radius
    pub fn content_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::around_points(self.positions.values().copied(), self.config.node_radius)
    }
}

/// Join one keyed primitive set against the handles already drawn
fn reconcile<S, K>(
    surface: &mut S,
    drawn: &mut HashMap<K, S::Handle>,
    live: &HashSet<K>,
    wanted: Vec<(K, Primitive)>,
    report: &mut RenderReport,
) where
    S: RenderSurface,
    K: Copy + Eq + std::hash::Hash + std::fmt::Display,
{
    drawn.retain(|key, handle| {
        if live.contains(key) {
            return true;
        }
        trace!(%key, "Removing stale primitive");
        surface.remove(*handle);
        report.removed += 1;
        false
    });

    for (key, primitive) in wanted {
        let handle = match drawn.get(&key) {
            Some(handle) => *handle,
            None => {
                trace!(%key, "Creating primitive");
                let handle = surface.create(&primitive);
                drawn.insert(key, handle);
                report.created += 1;
                handle
            }
        };
        surface.update(handle, &primitive);
        report.updated += 1;
    }
}
