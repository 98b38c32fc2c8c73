//! Document store interface and live subscriptions
//!
//! The store hands out [`Subscription`]s that deliver successive snapshots of
//! a document until they are closed, and accepts whole-document replaces.

use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::trace;

use super::closeable::{CloseState, Closeable};
use super::error::{MeshError, Result};
use super::graph::{Category, Graph, GraphMeta};
use super::types::{CategoryId, GraphMetaId, UserId};

/// Acknowledgment of a completed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAck {
    pub id: GraphMetaId,
    /// Number of writes applied to the document so far
    pub revision: u64,
}

/// Selects the graph document to observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphFilter {
    pub meta: GraphMetaId,
}

impl GraphFilter {
    pub fn by_meta(meta: GraphMetaId) -> Self {
        Self { meta }
    }
}

/// Selects metadata records; unset fields match everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaFilter {
    /// Owner or collaborator
    pub member: Option<UserId>,
    pub category: Option<CategoryId>,
}

impl MetaFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn member(user: UserId) -> Self {
        Self {
            member: Some(user),
            category: None,
        }
    }

    pub fn category(category: CategoryId) -> Self {
        Self {
            member: None,
            category: Some(category),
        }
    }

    pub fn matches(&self, meta: &GraphMeta) -> bool {
        self.member.map_or(true, |user| meta.is_member(user))
            && self.category.map_or(true, |c| meta.category == Some(c))
    }
}

/// Backing store for graph documents and their metadata
///
/// Graph documents are only ever replaced whole. The store applies no
/// compare-and-swap, so the last write wins.
pub trait DocumentStore: Send + Sync {
    /// Observe a graph document; the current snapshot, if any, is delivered first
    fn find_graph(&self, filter: &GraphFilter) -> Result<Subscription<Graph>>;

    /// Replace the whole graph document keyed by `graph.meta`
    fn replace_graph(&self, graph: &Graph) -> Result<WriteAck>;

    fn find_meta(&self, id: GraphMetaId) -> Result<Option<GraphMeta>>;

    /// Insert or replace a metadata record
    fn replace_meta(&self, meta: &GraphMeta) -> Result<WriteAck>;

    fn list_meta(&self, filter: &MetaFilter) -> Result<Vec<GraphMeta>>;

    /// Remove a graph and its metadata; open subscriptions are terminated
    fn delete_graph(&self, id: GraphMetaId) -> Result<()>;

    fn insert_category(&self, category: &Category) -> Result<()>;

    fn categories(&self, owner: Option<UserId>) -> Result<Vec<Category>>;
}

/// A live stream of document snapshots
///
/// Snapshots queue up in a channel; [`Subscription::refresh`] drains them so
/// that [`Subscription::latest`] always reflects the newest one received.
/// Dropping or closing the subscription unsubscribes from the store.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: Option<Receiver<T>>,
    latest: Option<T>,
    received: u64,
    state: CloseState,
}

impl<T> Subscription<T> {
    /// Wrap the receiving half of a snapshot channel
    pub fn new(receiver: Receiver<T>) -> Self {
        Self {
            receiver: Some(receiver),
            latest: None,
            received: 0,
            state: CloseState::new("subscription"),
        }
    }

    /// A subscription fed by the returned sender, for stores and tests
    pub fn channel() -> (mpsc::Sender<T>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self::new(receiver))
    }

    /// Drain queued snapshots; true if at least one new snapshot arrived
    ///
    /// A disconnected sender terminates the stream: the subscription closes
    /// but keeps its last snapshot.
    pub fn refresh(&mut self) -> bool {
        let Some(receiver) = &self.receiver else {
            return false;
        };

        let mut updated = false;
        let mut disconnected = false;
        loop {
            match receiver.try_recv() {
                Ok(value) => {
                    self.latest = Some(value);
                    self.received += 1;
                    updated = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected {
            trace!(received = self.received, "Snapshot stream ended");
            self.close();
        }
        updated
    }

    /// The newest snapshot received so far, without draining the channel
    pub fn latest(&self) -> Option<&T> {
        self.latest.as_ref()
    }

    /// The newest snapshot, blocking until the first one arrives
    pub fn wait_first(&mut self) -> Result<&T> {
        self.refresh();
        if self.latest.is_none() {
            let receiver = self
                .receiver
                .as_ref()
                .ok_or_else(|| MeshError::subscription_closed("no snapshot was received"))?;
            match receiver.recv() {
                Ok(value) => {
                    self.latest = Some(value);
                    self.received += 1;
                    // Pick up anything queued behind the first value
                    self.refresh();
                }
                Err(_) => {
                    self.close();
                    return Err(MeshError::subscription_closed(
                        "stream ended before the first snapshot",
                    ));
                }
            }
        }
        self.latest
            .as_ref()
            .ok_or_else(|| MeshError::subscription_closed("no snapshot was received"))
    }

    /// Number of snapshots received over the subscription's lifetime
    pub fn received(&self) -> u64 {
        self.received
    }
}

impl<T> Closeable for Subscription<T> {
    fn close(&mut self) {
        if self.state.close() {
            self.receiver = None;
        }
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }
}
