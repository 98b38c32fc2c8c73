//! In-memory document store
//!
//! Keeps every document in a map guarded by a mutex and fans out each write
//! to the subscribers of that document. Used by tests, the CLI, and as the
//! reference behavior for remote stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, trace, warn};

use crate::core::{
    Category, DocumentStore, EntityKind, Graph, GraphFilter, GraphMeta, GraphMetaId, MeshError,
    MetaFilter, Result, Subscription, UserId, WriteAck,
};

#[derive(Debug, Default)]
struct GraphEntry {
    document: Option<Graph>,
    revision: u64,
    subscribers: Vec<Sender<Graph>>,
}

impl GraphEntry {
    /// Push the current document to every live subscriber, dropping dead ones
    fn broadcast(&mut self) {
        let Some(document) = &self.document else {
            return;
        };
        let before = self.subscribers.len();
        self.subscribers
            .retain(|sender| sender.send(document.clone()).is_ok());
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            trace!(graph = %document.meta, dropped, "Pruned closed subscribers");
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    graphs: HashMap<GraphMetaId, GraphEntry>,
    metas: HashMap<GraphMetaId, GraphMeta>,
    meta_order: Vec<GraphMetaId>,
    categories: Vec<Category>,
}

/// Document store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the connection: writes fail with `TransientIo` until
    /// the store is brought back online; reads keep working
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        debug!(offline, "Store connectivity changed");
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of live subscribers of a graph document
    pub fn subscriber_count(&self, id: GraphMetaId) -> usize {
        self.lock()
            .map(|state| {
                state
                    .graphs
                    .get(&id)
                    .map_or(0, |entry| entry.subscribers.len())
            })
            .unwrap_or(0)
    }

    /// Current revision of a graph document (0 if never written)
    pub fn revision(&self, id: GraphMetaId) -> u64 {
        self.lock()
            .map(|state| state.graphs.get(&id).map_or(0, |entry| entry.revision))
            .unwrap_or(0)
    }

    /// Current graph document, bypassing subscriptions
    pub fn graph(&self, id: GraphMetaId) -> Option<Graph> {
        self.lock()
            .ok()
            .and_then(|state| state.graphs.get(&id).and_then(|e| e.document.clone()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| MeshError::transient_io("store state lock poisoned"))
    }

    fn ensure_online(&self, operation: &'static str) -> Result<()> {
        if self.is_offline() {
            warn!(operation, "Store is offline, rejecting write");
            return Err(MeshError::transient_io(format!(
                "{} failed: store is offline",
                operation
            )));
        }
        Ok(())
    }
}

impl DocumentStore for InMemoryStore {
    fn find_graph(&self, filter: &GraphFilter) -> Result<Subscription<Graph>> {
        let mut state = self.lock()?;
        let (sender, subscription) = Subscription::channel();
        let entry = state.graphs.entry(filter.meta).or_default();
        if let Some(document) = &entry.document {
            // Receiver is alive, so this cannot fail
            let _ = sender.send(document.clone());
        }
        entry.subscribers.push(sender);
        trace!(
            graph = %filter.meta,
            subscribers = entry.subscribers.len(),
            "Graph subscription opened"
        );
        Ok(subscription)
    }

    fn replace_graph(&self, graph: &Graph) -> Result<WriteAck> {
        self.ensure_online("replace_graph")?;
        let mut state = self.lock()?;
        if !state.metas.contains_key(&graph.meta) {
            return Err(MeshError::not_found(EntityKind::Graph, graph.meta));
        }

        let entry = state.graphs.entry(graph.meta).or_default();
        entry.document = Some(graph.clone());
        entry.revision += 1;
        entry.broadcast();

        debug!(
            graph = %graph.meta,
            revision = entry.revision,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Graph document replaced"
        );
        Ok(WriteAck {
            id: graph.meta,
            revision: entry.revision,
        })
    }

    fn find_meta(&self, id: GraphMetaId) -> Result<Option<GraphMeta>> {
        Ok(self.lock()?.metas.get(&id).cloned())
    }

    fn replace_meta(&self, meta: &GraphMeta) -> Result<WriteAck> {
        self.ensure_online("replace_meta")?;
        let mut state = self.lock()?;
        if state.metas.insert(meta.id, meta.clone()).is_none() {
            state.meta_order.push(meta.id);
        }
        let revision = state.graphs.get(&meta.id).map_or(0, |e| e.revision);
        debug!(graph = %meta.id, name = %meta.name, "Graph metadata replaced");
        Ok(WriteAck {
            id: meta.id,
            revision,
        })
    }

    fn list_meta(&self, filter: &MetaFilter) -> Result<Vec<GraphMeta>> {
        let state = self.lock()?;
        Ok(state
            .meta_order
            .iter()
            .filter_map(|id| state.metas.get(id))
            .filter(|meta| filter.matches(meta))
            .cloned()
            .collect())
    }

    fn delete_graph(&self, id: GraphMetaId) -> Result<()> {
        self.ensure_online("delete_graph")?;
        let mut state = self.lock()?;
        if state.metas.remove(&id).is_none() {
            return Err(MeshError::not_found(EntityKind::Graph, id));
        }
        state.meta_order.retain(|m| *m != id);
        // Dropping the entry drops every sender, ending the streams
        let subscribers = state
            .graphs
            .remove(&id)
            .map_or(0, |entry| entry.subscribers.len());
        debug!(graph = %id, subscribers, "Graph deleted");
        Ok(())
    }

    fn insert_category(&self, category: &Category) -> Result<()> {
        self.ensure_online("insert_category")?;
        let mut state = self.lock()?;
        state.categories.retain(|c| c.id != category.id);
        state.categories.push(category.clone());
        Ok(())
    }

    fn categories(&self, owner: Option<UserId>) -> Result<Vec<Category>> {
        let state = self.lock()?;
        Ok(state
            .categories
            .iter()
            .filter(|c| owner.map_or(true, |o| c.owner == o))
            .cloned()
            .collect())
    }
}
