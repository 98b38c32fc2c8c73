//! Mutations of one graph document on behalf of the signed-in user

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, span, trace, warn, Level};

use crate::core::{
    Closeable, DocumentStore, Edge, EdgeId, EditPolicy, EntityKind, Graph, GraphFilter,
    GraphMetaId, IdentityProvider, MeshError, Node, NodeId, Point, Result, SessionConfig,
    SessionContext, Subscription, UserId, WriteAck,
};

/// Fields of a node about to be created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNode {
    /// Canvas position; the session default is used when unset
    pub position: Option<Point>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NewNode {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of asking for an edge between two nodes
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeOutcome {
    /// The edge was created and persisted
    Added(Edge),
    /// Source and target were the same node; nothing was written
    SelfLoop,
    /// The pair was already connected by this edge; nothing was written
    Duplicate(EdgeId),
}

impl EdgeOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, EdgeOutcome::Added(_))
    }

    pub fn edge(&self) -> Option<&Edge> {
        match self {
            EdgeOutcome::Added(edge) => Some(edge),
            _ => None,
        }
    }
}

/// Edits one graph document
///
/// Every operation works on the newest snapshot the session has received,
/// blocking for the first one if none has arrived yet. Permission is checked
/// before any write, invariants are validated, and the whole document is
/// replaced in the store. There is no compare-and-swap: two sessions acting
/// on the same snapshot race and the last write wins.
///
/// The signed-in user comes from any [`IdentityProvider`]; the shared
/// [`SessionContext`] is the default.
pub struct GraphEditSession<S: DocumentStore + ?Sized, I: IdentityProvider = SessionContext> {
    store: Arc<S>,
    graph: GraphMetaId,
    identity: I,
    config: SessionConfig,
    subscription: Subscription<Graph>,
}

impl<S: DocumentStore + ?Sized, I: IdentityProvider> GraphEditSession<S, I> {
    /// Start editing `graph`, subscribing to its document
    pub fn open(
        store: Arc<S>,
        graph: GraphMetaId,
        identity: I,
        config: SessionConfig,
    ) -> Result<Self> {
        let subscription = store.find_graph(&GraphFilter::by_meta(graph))?;
        debug!(graph = %graph, policy = ?config.edit_policy, "Edit session opened");
        Ok(Self {
            store,
            graph,
            identity,
            config,
            subscription,
        })
    }

    pub fn graph_id(&self) -> GraphMetaId {
        self.graph
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The newest snapshot of the document
    pub fn current(&mut self) -> Result<Graph> {
        self.snapshot()
    }

    /// Create a node with a fresh id, owned by the current user
    pub fn add_node(&mut self, new: NewNode) -> Result<Node> {
        let span = span!(Level::DEBUG, "add_node", graph = %self.graph);
        let _enter = span.enter();

        let user = self.authorize()?;
        let mut graph = self.snapshot()?;

        let now = Utc::now();
        let node = Node {
            id: NodeId::new(),
            position: new.position.unwrap_or(self.config.default_position),
            title: new.title,
            content: new.content,
            tags: new.tags,
            creator: user,
            created_at: now,
            updated_at: now,
        };
        graph.nodes.push(node.clone());
        self.persist(&graph)?;

        debug!(node = %node.id, title = %node.title, "Node added");
        Ok(node)
    }

    /// Replace a node's editable fields and stamp `updated_at`
    ///
    /// Identity, creator and creation time are kept from the stored node.
    pub fn update_node(&mut self, node: Node) -> Result<Node> {
        let span = span!(Level::DEBUG, "update_node", graph = %self.graph, node = %node.id);
        let _enter = span.enter();

        self.authorize()?;
        let mut graph = self.snapshot()?;
        let stored = graph
            .node_mut(node.id)
            .ok_or_else(|| MeshError::not_found(EntityKind::Node, node.id))?;

        stored.position = node.position;
        stored.title = node.title;
        stored.content = node.content;
        stored.tags = node.tags;
        stored.updated_at = Utc::now();
        let updated = stored.clone();
        self.persist(&graph)?;

        debug!("Node updated");
        Ok(updated)
    }

    /// Move a node to a new canvas position
    pub fn move_node(&mut self, id: NodeId, position: Point) -> Result<Node> {
        let span = span!(Level::DEBUG, "move_node", graph = %self.graph, node = %id);
        let _enter = span.enter();

        self.authorize()?;
        let mut graph = self.snapshot()?;
        let stored = graph
            .node_mut(id)
            .ok_or_else(|| MeshError::not_found(EntityKind::Node, id))?;
        stored.position = position;
        stored.updated_at = Utc::now();
        let moved = stored.clone();
        self.persist(&graph)?;

        debug!(x = position.x, y = position.y, "Node moved");
        Ok(moved)
    }

    /// Remove a node and every edge touching it in a single write
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let span = span!(Level::DEBUG, "remove_node", graph = %self.graph, node = %id);
        let _enter = span.enter();

        self.authorize()?;
        let mut graph = self.snapshot()?;
        if !graph.has_node(id) {
            return Err(MeshError::not_found(EntityKind::Node, id));
        }

        graph.nodes.retain(|n| n.id != id);
        let before = graph.edges.len();
        graph.edges.retain(|e| !e.touches(id));
        let cascaded = before - graph.edges.len();
        self.persist(&graph)?;

        debug!(cascaded, "Node removed");
        Ok(())
    }

    /// Connect two nodes
    ///
    /// A self-loop or an already connected pair (in either direction) is a
    /// no-op and nothing is written.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeOutcome> {
        self.insert_edge(source, target, None)
    }

    /// Connect two nodes with a type label
    pub fn add_labeled_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        label: impl Into<String>,
    ) -> Result<EdgeOutcome> {
        self.insert_edge(source, target, Some(label.into()))
    }

    /// Remove an edge; false, with nothing written, if it does not exist
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<bool> {
        let span = span!(Level::DEBUG, "remove_edge", graph = %self.graph, edge = %id);
        let _enter = span.enter();

        self.authorize()?;
        let mut graph = self.snapshot()?;
        let before = graph.edges.len();
        graph.edges.retain(|e| e.id != id);
        if graph.edges.len() == before {
            trace!("Edge already absent");
            return Ok(false);
        }
        self.persist(&graph)?;

        debug!("Edge removed");
        Ok(true)
    }

    fn insert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        label: Option<String>,
    ) -> Result<EdgeOutcome> {
        let span = span!(
            Level::DEBUG,
            "add_edge",
            graph = %self.graph,
            source = %source,
            target = %target
        );
        let _enter = span.enter();

        let user = self.authorize()?;
        if source == target {
            debug!("Self-loop ignored");
            return Ok(EdgeOutcome::SelfLoop);
        }

        let mut graph = self.snapshot()?;
        for endpoint in [source, target] {
            if !graph.has_node(endpoint) {
                return Err(MeshError::not_found(EntityKind::Node, endpoint));
            }
        }
        if let Some(existing) = graph.edge_between(source, target) {
            debug!(existing = %existing.id, "Duplicate edge ignored");
            return Ok(EdgeOutcome::Duplicate(existing.id));
        }

        let edge = Edge {
            id: EdgeId::new(),
            label,
            source,
            target,
            creator: user,
            created_at: Utc::now(),
        };
        graph.edges.push(edge.clone());
        self.persist(&graph)?;

        debug!(edge = %edge.id, "Edge added");
        Ok(EdgeOutcome::Added(edge))
    }

    /// Newest snapshot, waiting for the first one if needed
    fn snapshot(&mut self) -> Result<Graph> {
        self.subscription.wait_first().map(Graph::clone)
    }

    /// The current user, if allowed to edit under the session's policy
    fn authorize(&self) -> Result<UserId> {
        let user = self.identity.require_user().map_err(|e| {
            warn!(graph = %self.graph, "Edit attempted while signed out");
            e
        })?;
        let meta = self
            .store
            .find_meta(self.graph)?
            .ok_or_else(|| MeshError::not_found(EntityKind::Graph, self.graph))?;

        let allowed = match self.config.edit_policy {
            EditPolicy::OwnerOnly => meta.is_owner(user),
            EditPolicy::OwnerAndCollaborators => meta.is_member(user),
        };
        if !allowed {
            warn!(user = %user, graph = %self.graph, "Edit permission denied");
            return Err(MeshError::permission_denied(user, self.graph));
        }
        Ok(user)
    }

    /// Validate and write the whole document
    fn persist(&self, graph: &Graph) -> Result<WriteAck> {
        graph.validate()?;
        let ack = self.store.replace_graph(graph).map_err(|e| {
            error!(graph = %self.graph, error = %e, "Graph write failed");
            e
        })?;
        trace!(revision = ack.revision, "Graph persisted");
        Ok(ack)
    }
}

impl<S: DocumentStore + ?Sized, I: IdentityProvider> Closeable for GraphEditSession<S, I> {
    fn close(&mut self) {
        self.subscription.close();
    }

    fn is_closed(&self) -> bool {
        self.subscription.is_closed()
    }
}
