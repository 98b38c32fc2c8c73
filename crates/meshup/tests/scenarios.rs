//! End-to-end scenarios: edits flowing through the store into a live view

use std::sync::Arc;
use std::time::{Duration, Instant};

use meshup::prelude::*;

const OWNER: UserId = UserId::from_u128(1);

fn setup() -> (Arc<InMemoryStore>, GraphEditSession<InMemoryStore>, GraphView<RecordingSurface>) {
    let store = Arc::new(InMemoryStore::new());
    let catalog = GraphCatalog::new(store.clone(), SessionContext::signed_in(OWNER));
    let meta = catalog.create_graph(NewGraph::named("Scenario")).unwrap();
    let session = catalog.open_session(meta.id).unwrap();
    let view = GraphView::open(
        store.as_ref(),
        meta.id,
        RecordingSurface::new(800.0, 600.0),
        &MeshConfig::default(),
    )
    .unwrap();
    (store, session, view)
}

#[test]
fn test_two_node_scenario() {
    let (_store, mut session, mut view) = setup();

    let one = session
        .add_node(NewNode::titled("1").at(Point::new(100.0, 100.0)))
        .unwrap();
    let two = session
        .add_node(NewNode::titled("2").at(Point::new(200.0, 150.0)))
        .unwrap();
    assert!(session.add_edge(one.id, two.id).unwrap().is_added());

    view.sync().unwrap();
    assert_eq!(view.surface().circles(), 2);
    assert_eq!(view.surface().lines(), 1);

    session.remove_node(one.id).unwrap();
    view.sync().unwrap();

    let graph = session.current().unwrap();
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].id, two.id);
    assert!(graph.edges.is_empty());
    assert_eq!(view.surface().circles(), 1);
    assert_eq!(view.surface().lines(), 0);
}

#[test]
fn test_removed_node_leaves_no_edge_primitives() {
    let (_store, mut session, mut view) = setup();
    let ids: Vec<_> = (0..4)
        .map(|i| {
            session
                .add_node(NewNode::titled(format!("n{}", i)).at(Point::new(i as f64 * 50.0, 0.0)))
                .unwrap()
                .id
        })
        .collect();
    for pair in ids.windows(2) {
        session.add_edge(pair[0], pair[1]).unwrap();
    }
    view.sync().unwrap();
    assert_eq!(view.surface().lines(), 3);

    session.remove_node(ids[1]).unwrap();
    view.sync().unwrap();

    let graph = view.graph().unwrap();
    assert!(graph.edges.iter().all(|e| !e.touches(ids[1])));
    assert_eq!(view.surface().lines(), 1);
    assert_eq!(view.renderer().rendered(), (3, 1));
}

#[test]
fn test_render_twice_is_stable() {
    let (_store, mut session, mut view) = setup();
    let a = session.add_node(NewNode::titled("a")).unwrap();
    let b = session
        .add_node(NewNode::titled("b").at(Point::new(40.0, 40.0)))
        .unwrap();
    session.add_edge(a.id, b.id).unwrap();
    view.sync().unwrap();

    let mut renderer = GraphRenderer::new(RecordingSurface::new(800.0, 600.0));
    let graph = session.current().unwrap();
    renderer.render(&graph).unwrap();
    renderer.surface_mut().reset_counts();

    let report = renderer.render(&graph).unwrap();
    assert!(report.is_stable());
    assert_eq!(renderer.surface().created, 0);
    assert_eq!(renderer.surface().removed, 0);
}

#[test]
fn test_first_population_fits_content() {
    let (_store, mut session, mut view) = setup();

    // The empty document renders nothing and requests no fit
    let report = view.sync().unwrap().unwrap();
    assert!(!report.fit_requested);
    assert_eq!(view.viewport().transform(), Transform::IDENTITY);

    session
        .add_node(NewNode::titled("only").at(Point::new(500.0, 500.0)))
        .unwrap();
    let report = view.sync().unwrap().unwrap();
    assert!(report.fit_requested);

    let on_screen = view.viewport().transform().apply(Point::new(500.0, 500.0));
    assert!((on_screen.x - 400.0).abs() < 1e-9);
    assert!((on_screen.y - 300.0).abs() < 1e-9);
    assert_eq!(view.surface().transform(), view.viewport().transform());

    // Later renders leave the user's transform alone
    session
        .add_node(NewNode::titled("second").at(Point::new(0.0, 0.0)))
        .unwrap();
    let before = view.viewport().transform();
    let report = view.sync().unwrap().unwrap();
    assert!(!report.fit_requested);
    assert_eq!(view.viewport().transform(), before);
}

#[test]
fn test_sync_without_new_snapshot_does_nothing() {
    let (_store, _session, mut view) = setup();
    assert!(view.sync().unwrap().is_some());
    assert!(view.sync().unwrap().is_none());
}

#[test]
fn test_resize_is_debounced_then_applied() {
    let (_store, mut session, mut view) = setup();
    session
        .add_node(NewNode::titled("a").at(Point::new(10.0, 10.0)))
        .unwrap();
    view.sync().unwrap();

    let start = Instant::now();
    view.on_resize(1024.0, 768.0, start);
    view.on_resize(1280.0, 720.0, start + Duration::from_millis(20));
    view.poll(start + Duration::from_millis(60)).unwrap();
    assert_eq!(view.viewport().size(), (800.0, 600.0));

    view.poll(start + Duration::from_millis(70)).unwrap();
    assert_eq!(view.viewport().size(), (1280.0, 720.0));
    assert_eq!(view.surface().size(), (1280.0, 720.0));
}

#[test]
fn test_zoom_gesture_is_clamped_against_content() {
    let (_store, mut session, mut view) = setup();
    session
        .add_node(NewNode::titled("a").at(Point::new(0.0, 0.0)))
        .unwrap();
    view.sync().unwrap();

    let start = Instant::now();
    view.on_zoom_gesture(Transform::new(1.0e6, 1.0e6, 1.0), start);
    view.poll(start + Duration::from_millis(50)).unwrap();

    let t = view.viewport().transform();
    assert!(t.x < 800.0);
    assert!(t.y < 600.0);
}

#[test]
fn test_deleted_graph_closes_view_stream() {
    let (store, session, mut view) = setup();
    view.sync().unwrap();
    let id = session.graph_id();

    let catalog = GraphCatalog::new(store.clone(), SessionContext::signed_in(OWNER));
    catalog.delete_graph(id).unwrap();
    assert!(view.sync().unwrap().is_none());
    assert!(view.graph().is_some());
}
