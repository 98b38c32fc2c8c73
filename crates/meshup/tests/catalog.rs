//! Graph catalog: ownership, sharing, categories

use std::sync::Arc;

use meshup::prelude::*;
use meshup::{EntityKind, MetaFilter};

const OWNER: UserId = UserId::from_u128(1);
const FRIEND: UserId = UserId::from_u128(2);

fn catalog_for(store: &Arc<InMemoryStore>, user: UserId) -> GraphCatalog<InMemoryStore> {
    GraphCatalog::new(store.clone(), SessionContext::signed_in(user))
}

#[test]
fn test_create_graph_stores_meta_and_empty_document() {
    let store = Arc::new(InMemoryStore::new());
    let catalog = catalog_for(&store, OWNER);
    let meta = catalog
        .create_graph(NewGraph::named("Thesis").with_description("Sources and notes"))
        .unwrap();

    assert_eq!(meta.owner, OWNER);
    assert!(meta.collaborators.is_empty());
    assert_eq!(store.find_meta(meta.id).unwrap(), Some(meta.clone()));
    assert_eq!(store.graph(meta.id), Some(Graph::new(meta.id)));
}

#[test]
fn test_only_owner_changes_settings() {
    let store = Arc::new(InMemoryStore::new());
    let meta = catalog_for(&store, OWNER)
        .create_graph(NewGraph::named("Thesis"))
        .unwrap();
    catalog_for(&store, OWNER)
        .add_collaborator(meta.id, FRIEND)
        .unwrap();

    let friend = catalog_for(&store, FRIEND);
    let settings = GraphSettings {
        name: "Mine now".into(),
        ..GraphSettings::from(&meta)
    };
    assert!(matches!(
        friend.update_settings(meta.id, settings.clone()),
        Err(MeshError::PermissionDenied { .. })
    ));
    assert!(matches!(
        friend.delete_graph(meta.id),
        Err(MeshError::PermissionDenied { .. })
    ));

    let updated = catalog_for(&store, OWNER)
        .update_settings(meta.id, settings)
        .unwrap();
    assert_eq!(updated.name, "Mine now");
    assert!(updated.updated_at >= meta.updated_at);
}

#[test]
fn test_collaborators_are_deduplicated() {
    let store = Arc::new(InMemoryStore::new());
    let catalog = catalog_for(&store, OWNER);
    let meta = catalog.create_graph(NewGraph::named("Shared")).unwrap();

    assert!(catalog.add_collaborator(meta.id, FRIEND).unwrap());
    assert!(!catalog.add_collaborator(meta.id, FRIEND).unwrap());
    assert!(matches!(
        catalog.add_collaborator(meta.id, OWNER),
        Err(MeshError::InvalidStructure { .. })
    ));
    assert_eq!(
        store.find_meta(meta.id).unwrap().unwrap().collaborators,
        vec![FRIEND]
    );

    assert!(catalog.remove_collaborator(meta.id, FRIEND).unwrap());
    assert!(!catalog.remove_collaborator(meta.id, FRIEND).unwrap());
}

#[test]
fn test_graphs_for_user_includes_shared() {
    let store = Arc::new(InMemoryStore::new());
    let owner = catalog_for(&store, OWNER);
    let friend = catalog_for(&store, FRIEND);

    let shared = owner.create_graph(NewGraph::named("Shared")).unwrap();
    owner.create_graph(NewGraph::named("Private")).unwrap();
    owner.add_collaborator(shared.id, FRIEND).unwrap();
    friend.create_graph(NewGraph::named("Friend's own")).unwrap();

    let names: Vec<String> = friend
        .my_graphs()
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["Shared".to_string(), "Friend's own".to_string()]);
    assert_eq!(owner.graphs_for_user(OWNER).unwrap().len(), 2);
}

#[test]
fn test_delete_graph_removes_everything() {
    let store = Arc::new(InMemoryStore::new());
    let catalog = catalog_for(&store, OWNER);
    let meta = catalog.create_graph(NewGraph::named("Scratch")).unwrap();

    catalog.delete_graph(meta.id).unwrap();
    assert!(store.find_meta(meta.id).unwrap().is_none());
    assert!(store.graph(meta.id).is_none());
    assert!(matches!(
        catalog.delete_graph(meta.id),
        Err(MeshError::NotFound { kind: EntityKind::Graph, .. })
    ));
    assert!(matches!(
        catalog.open_session(meta.id),
        Err(MeshError::NotFound { .. })
    ));
}

#[test]
fn test_categories_group_graphs() {
    let store = Arc::new(InMemoryStore::new());
    let catalog = catalog_for(&store, OWNER);
    let books = catalog.create_category("Books").unwrap();
    let films = catalog.create_category("  Films ").unwrap();
    assert_eq!(films.name, "Films");

    let dune = catalog
        .create_graph(NewGraph::named("Dune").in_category(books.id))
        .unwrap();
    catalog.create_graph(NewGraph::named("Loose")).unwrap();

    assert_eq!(catalog.categories().unwrap().len(), 2);
    let in_books = catalog.graphs_in_category(books.id).unwrap();
    assert_eq!(in_books.len(), 1);
    assert_eq!(in_books[0].id, dune.id);
    assert!(catalog.graphs_in_category(films.id).unwrap().is_empty());

    assert_eq!(
        store.list_meta(&MetaFilter::category(books.id)).unwrap().len(),
        1
    );
    assert!(catalog_for(&store, FRIEND).categories().unwrap().is_empty());
}

#[test]
fn test_open_session_edits_the_graph() {
    let store = Arc::new(InMemoryStore::new());
    let catalog = catalog_for(&store, OWNER);
    let meta = catalog.create_graph(NewGraph::named("Notes")).unwrap();

    let mut session = catalog.open_session(meta.id).unwrap();
    session.add_node(NewNode::titled("first")).unwrap();
    assert_eq!(store.graph(meta.id).unwrap().node_count(), 1);
}

#[test]
fn test_catalog_with_session_config() {
    let store = Arc::new(InMemoryStore::new());
    let meta = catalog_for(&store, OWNER)
        .create_graph(NewGraph::named("Team"))
        .unwrap();
    catalog_for(&store, OWNER)
        .add_collaborator(meta.id, FRIEND)
        .unwrap();

    let friend = GraphCatalog::with_session_config(
        store.clone(),
        SessionContext::signed_in(FRIEND),
        SessionConfig::default().with_edit_policy(EditPolicy::OwnerAndCollaborators),
    );
    let mut session = friend.open_session(meta.id).unwrap();
    assert!(session.add_node(NewNode::titled("contribution")).is_ok());
}
