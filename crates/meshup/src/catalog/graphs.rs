//! Metadata-level operations over the graphs of the signed-in user

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::core::{
    Category, CategoryId, DocumentStore, EntityKind, Graph, GraphMeta, GraphMetaId,
    IdentityProvider, MeshError, MetaFilter, Result, SessionConfig, SessionContext, UserId,
};
use crate::edit::GraphEditSession;

/// Fields of a graph about to be created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewGraph {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Option<CategoryId>,
}

impl NewGraph {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn in_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }
}

/// Editable settings of an existing graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSettings {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Option<CategoryId>,
}

impl From<&GraphMeta> for GraphSettings {
    fn from(meta: &GraphMeta) -> Self {
        Self {
            name: meta.name.clone(),
            description: meta.description.clone(),
            tags: meta.tags.clone(),
            category: meta.category,
        }
    }
}

/// Creates, shares and lists graphs for the signed-in user
///
/// Edit sessions opened from the catalog share its identity provider.
pub struct GraphCatalog<S: DocumentStore + ?Sized, I: IdentityProvider + Clone = SessionContext> {
    store: Arc<S>,
    identity: I,
    session_config: SessionConfig,
}

impl<S: DocumentStore + ?Sized, I: IdentityProvider + Clone> GraphCatalog<S, I> {
    pub fn new(store: Arc<S>, identity: I) -> Self {
        Self::with_session_config(store, identity, SessionConfig::default())
    }

    /// Catalog whose edit sessions use `session_config`
    pub fn with_session_config(
        store: Arc<S>,
        identity: I,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            store,
            identity,
            session_config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a graph owned by the current user with an empty document
    pub fn create_graph(&self, new: NewGraph) -> Result<GraphMeta> {
        let owner = self.identity.require_user()?;
        let name = normalized_name(&new.name)?;
        if let Some(category) = new.category {
            self.ensure_category(category)?;
        }

        let now = Utc::now();
        let meta = GraphMeta {
            id: GraphMetaId::new(),
            name,
            description: new.description,
            tags: new.tags,
            owner,
            collaborators: Vec::new(),
            category: new.category,
            created_at: now,
            updated_at: now,
        };
        self.store.replace_meta(&meta)?;
        self.store.replace_graph(&Graph::new(meta.id))?;

        info!(graph = %meta.id, name = %meta.name, owner = %owner, "Graph created");
        Ok(meta)
    }

    /// Change name, description, tags and category; owner only
    pub fn update_settings(&self, id: GraphMetaId, settings: GraphSettings) -> Result<GraphMeta> {
        let (_, mut meta) = self.owned_meta(id)?;
        let name = normalized_name(&settings.name)?;
        if let Some(category) = settings.category {
            self.ensure_category(category)?;
        }

        meta.name = name;
        meta.description = settings.description;
        meta.tags = settings.tags;
        meta.category = settings.category;
        meta.updated_at = Utc::now();
        self.store.replace_meta(&meta)?;

        debug!(graph = %id, "Graph settings updated");
        Ok(meta)
    }

    /// Share a graph; false if `user` already collaborates
    pub fn add_collaborator(&self, id: GraphMetaId, user: UserId) -> Result<bool> {
        let (owner, mut meta) = self.owned_meta(id)?;
        if user == owner {
            return Err(MeshError::invalid_structure(format!(
                "owner {} cannot be a collaborator of graph {}",
                owner, id
            )));
        }
        if meta.is_collaborator(user) {
            return Ok(false);
        }

        meta.collaborators.push(user);
        meta.updated_at = Utc::now();
        self.store.replace_meta(&meta)?;
        debug!(graph = %id, collaborator = %user, "Collaborator added");
        Ok(true)
    }

    /// Stop sharing a graph with `user`; false if they were not a collaborator
    pub fn remove_collaborator(&self, id: GraphMetaId, user: UserId) -> Result<bool> {
        let (_, mut meta) = self.owned_meta(id)?;
        let before = meta.collaborators.len();
        meta.collaborators.retain(|c| *c != user);
        if meta.collaborators.len() == before {
            return Ok(false);
        }

        meta.updated_at = Utc::now();
        self.store.replace_meta(&meta)?;
        debug!(graph = %id, collaborator = %user, "Collaborator removed");
        Ok(true)
    }

    /// Delete a graph and its document; owner only
    pub fn delete_graph(&self, id: GraphMetaId) -> Result<()> {
        self.owned_meta(id)?;
        self.store.delete_graph(id)?;
        info!(graph = %id, "Graph deleted");
        Ok(())
    }

    /// Graphs `user` owns or collaborates on
    pub fn graphs_for_user(&self, user: UserId) -> Result<Vec<GraphMeta>> {
        self.store.list_meta(&MetaFilter::member(user))
    }

    /// Graphs visible to the current user
    pub fn my_graphs(&self) -> Result<Vec<GraphMeta>> {
        let user = self.identity.require_user()?;
        self.graphs_for_user(user)
    }

    pub fn create_category(&self, name: &str) -> Result<Category> {
        let owner = self.identity.require_user()?;
        let category = Category {
            id: CategoryId::new(),
            name: normalized_name(name)?,
            owner,
        };
        self.store.insert_category(&category)?;
        debug!(category = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Categories of the current user
    pub fn categories(&self) -> Result<Vec<Category>> {
        let user = self.identity.require_user()?;
        self.store.categories(Some(user))
    }

    /// Graphs of a category that the current user can see
    pub fn graphs_in_category(&self, category: CategoryId) -> Result<Vec<GraphMeta>> {
        let user = self.identity.require_user()?;
        self.store.list_meta(&MetaFilter {
            member: Some(user),
            category: Some(category),
        })
    }

    /// Open an edit session on a graph as the current user
    pub fn open_session(&self, id: GraphMetaId) -> Result<GraphEditSession<S, I>> {
        if self.store.find_meta(id)?.is_none() {
            return Err(MeshError::not_found(EntityKind::Graph, id));
        }
        GraphEditSession::open(
            self.store.clone(),
            id,
            self.identity.clone(),
            self.session_config,
        )
    }

    /// Current user and the metadata of a graph they own
    fn owned_meta(&self, id: GraphMetaId) -> Result<(UserId, GraphMeta)> {
        let user = self.identity.require_user()?;
        let meta = self
            .store
            .find_meta(id)?
            .ok_or_else(|| MeshError::not_found(EntityKind::Graph, id))?;
        if !meta.is_owner(user) {
            warn!(user = %user, graph = %id, "Only the owner may change a graph");
            return Err(MeshError::permission_denied(user, id));
        }
        Ok((user, meta))
    }

    fn ensure_category(&self, id: CategoryId) -> Result<()> {
        let known = self.store.categories(None)?.iter().any(|c| c.id == id);
        if known {
            Ok(())
        } else {
            Err(MeshError::not_found(EntityKind::Category, id))
        }
    }
}

fn normalized_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MeshError::invalid_structure("name must not be empty"));
    }
    Ok(trimmed.to_string())
}
