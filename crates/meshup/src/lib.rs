//! meshUp - collaborative knowledge graphs on an interactive canvas
//!
//! The crate provides the pieces behind a graph canvas: a viewport
//! controller that clamps zoom gestures and fits content to its container,
//! a renderer that reconciles graph snapshots with drawn primitives, and an
//! edit session that mutates a graph document and persists it whole.
//!
//! # Quick Start
//!
//! ```rust
//! use meshup::render_svg;
//! use meshup::prelude::*;
//!
//! let graph = Graph::new(GraphMetaId::new());
//! let svg = render_svg(&graph, 800.0, 600.0, None).unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! # Editing
//!
//! ```rust
//! use std::sync::Arc;
//! use meshup::prelude::*;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let user = UserId::new();
//! let catalog = GraphCatalog::new(store.clone(), SessionContext::signed_in(user));
//!
//! let meta = catalog.create_graph(NewGraph::named("Reading list")).unwrap();
//! let mut session = catalog.open_session(meta.id).unwrap();
//!
//! let a = session.add_node(NewNode::titled("Dune")).unwrap();
//! let b = session.add_node(NewNode::titled("Foundation")).unwrap();
//! assert!(session.add_edge(a.id, b.id).unwrap().is_added());
//!
//! // The reverse direction is the same connection
//! let again = session.add_edge(b.id, a.id).unwrap();
//! assert!(matches!(again, EdgeOutcome::Duplicate(_)));
//! assert_eq!(session.current().unwrap().edge_count(), 1);
//! ```

pub mod catalog;
pub mod core;
pub mod edit;
pub mod render;
pub mod store;
pub mod viewport;

pub use crate::core::*;

use crate::render::{GraphRenderer, RenderSurface, SvgSurface};
use crate::viewport::ViewportController;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{GraphCatalog, GraphSettings, NewGraph};
    pub use crate::core::{
        BoundingBox, Closeable, DocumentStore, Edge, EdgeId, EditPolicy, Graph, GraphMeta,
        GraphMetaId, IdentityProvider, MeshConfig, MeshError, Node, NodeId, Point, SessionConfig,
        SessionContext, Transform, UserId, ViewportConfig,
    };
    pub use crate::edit::{EdgeOutcome, GraphEditSession, NewNode};
    pub use crate::render::{
        GraphRenderer, GraphView, RecordingSurface, RenderReport, RenderSurface, SvgSurface,
    };
    pub use crate::store::InMemoryStore;
    pub use crate::viewport::ViewportController;
}

/// Render a graph to an SVG document fitted to a `width` x `height` container
///
/// The graph is validated first; any broken invariant is reported as
/// `InvalidStructure`. `max_scale` caps the fit scale.
///
/// # Example
/// ```rust
/// use meshup::render_svg;
/// use meshup::prelude::*;
///
/// let graph = Graph::new(GraphMetaId::new());
/// let svg = render_svg(&graph, 400.0, 300.0, Some(2.0)).unwrap();
/// assert!(svg.contains("translate(0,0) scale(1)"));
/// ```
pub fn render_svg(graph: &Graph, width: f64, height: f64, max_scale: Option<f64>) -> Result<String> {
    render_svg_with_config(graph, width, height, max_scale, &MeshConfig::default())
}

/// [`render_svg`] with explicit configuration
pub fn render_svg_with_config(
    graph: &Graph,
    width: f64,
    height: f64,
    max_scale: Option<f64>,
    config: &MeshConfig,
) -> Result<String> {
    graph.validate()?;

    let surface = SvgSurface::with_config(width, height, config.render.clone());
    let mut renderer = GraphRenderer::with_config(surface, config.render.clone());
    renderer.render(graph)?;

    let viewport = ViewportController::with_config(width, height, config.viewport);
    let fitted = viewport.fit_to_container(renderer.content_bounds().as_ref(), max_scale);
    renderer.surface_mut().set_transform(fitted);
    Ok(renderer.surface().to_svg())
}

/// Transform that fits a graph's nodes into a `width` x `height` container
pub fn fit_transform(
    graph: &Graph,
    width: f64,
    height: f64,
    max_scale: Option<f64>,
    config: &MeshConfig,
) -> Result<Transform> {
    graph.validate()?;
    let bounds = BoundingBox::around_points(
        graph.nodes.iter().map(|n| n.position),
        config.render.node_radius,
    );
    let viewport = ViewportController::with_config(width, height, config.viewport);
    Ok(viewport.fit_to_container(bounds.as_ref(), max_scale))
}
