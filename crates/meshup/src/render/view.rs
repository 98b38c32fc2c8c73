//! A live, zoomable view of one graph document

use std::time::Instant;

use tracing::{debug, warn};

use crate::core::{
    CloseState, Closeable, Debouncer, DocumentStore, Graph, GraphFilter, GraphMetaId, MeshConfig,
    MeshError, Result, Subscription, Transform,
};
use crate::viewport::ViewportController;

use super::renderer::{GraphRenderer, RenderReport};
use super::surface::RenderSurface;

/// Renders every snapshot of a subscribed graph and drives the viewport
///
/// Resize and zoom events are debounced; nothing is recomputed until the
/// caller polls with a clock past the debounce window.
#[derive(Debug)]
pub struct GraphView<S: RenderSurface> {
    subscription: Subscription<Graph>,
    renderer: GraphRenderer<S>,
    viewport: ViewportController,
    resize: Debouncer<(f64, f64)>,
    zoom: Debouncer<Transform>,
    state: CloseState,
}

impl<S: RenderSurface> GraphView<S> {
    pub fn new(subscription: Subscription<Graph>, surface: S, config: &MeshConfig) -> Self {
        let (width, height) = surface.size();
        Self {
            subscription,
            renderer: GraphRenderer::with_config(surface, config.render.clone()),
            viewport: ViewportController::with_config(width, height, config.viewport),
            resize: Debouncer::new(config.debounce),
            zoom: Debouncer::new(config.debounce),
            state: CloseState::new("graph view"),
        }
    }

    /// Subscribe to `graph` in `store` and view it on `surface`
    pub fn open<D>(store: &D, graph: GraphMetaId, surface: S, config: &MeshConfig) -> Result<Self>
    where
        D: DocumentStore + ?Sized,
    {
        let subscription = store.find_graph(&GraphFilter::by_meta(graph))?;
        debug!(graph = %graph, "Graph view opened");
        Ok(Self::new(subscription, surface, config))
    }

    pub fn renderer(&self) -> &GraphRenderer<S> {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    /// The snapshot currently drawn
    pub fn graph(&self) -> Option<&Graph> {
        self.subscription.latest()
    }

    /// Render the newest snapshot if one arrived since the last sync
    ///
    /// The first pass that populates the canvas also fits the content to the
    /// container.
    pub fn sync(&mut self) -> Result<Option<RenderReport>> {
        if self.is_closed() {
            return Err(MeshError::subscription_closed("graph view is closed"));
        }
        if !self.subscription.refresh() {
            return Ok(None);
        }
        self.redraw()
    }

    /// Queue a zoom or pan gesture
    pub fn on_zoom_gesture(&mut self, raw: Transform, now: Instant) {
        self.zoom.push(raw, now);
    }

    /// Queue a container resize
    pub fn on_resize(&mut self, width: f64, height: f64, now: Instant) {
        self.resize.push((width, height), now);
    }

    /// Apply debounced events whose window elapsed at `now`, then sync
    pub fn poll(&mut self, now: Instant) -> Result<Option<RenderReport>> {
        if self.is_closed() {
            return Err(MeshError::subscription_closed("graph view is closed"));
        }

        let mut report = None;
        if let Some((width, height)) = self.resize.poll(now) {
            self.viewport.on_resize(width, height);
            self.renderer.surface_mut().resize(width, height);
            let redrawn = self.redraw();
            // Re-clamp the current transform against the new container
            let transform = self.viewport.transform();
            self.apply_clamped(transform);
            report = redrawn?;
        }
        if let Some(raw) = self.zoom.poll(now) {
            self.apply_clamped(raw);
        }

        match self.sync()? {
            Some(latest) => Ok(Some(latest)),
            None => Ok(report),
        }
    }

    /// Fit the drawn content to the container and apply the result
    pub fn fit(&mut self) -> Transform {
        let bounds = self.renderer.content_bounds();
        let fitted = self.viewport.fit_to_container(bounds.as_ref(), None);
        self.viewport.apply(fitted);
        self.renderer.set_transform(fitted);
        fitted
    }

    fn apply_clamped(&mut self, raw: Transform) {
        let bounds = self.renderer.content_bounds();
        let clamped = self.viewport.on_zoom_gesture(raw, bounds.as_ref());
        self.viewport.apply(clamped);
        self.renderer.set_transform(clamped);
    }

    fn redraw(&mut self) -> Result<Option<RenderReport>> {
        let Some(graph) = self.subscription.latest() else {
            return Ok(None);
        };
        let report = self.renderer.render(graph).map_err(|e| {
            warn!(error = %e, "Render pass failed");
            e
        })?;
        if report.fit_requested {
            self.fit();
        }
        Ok(Some(report))
    }
}

impl<S: RenderSurface> Closeable for GraphView<S> {
    fn close(&mut self) {
        if self.state.close() {
            self.subscription.close();
            self.resize.flush();
            self.zoom.flush();
        }
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::core::{Edge, EdgeId, Node, NodeId, Point, UserId};
    use crate::render::RecordingSurface;

    fn node(id: u128, x: f64, y: f64) -> Node {
        Node {
            id: NodeId::from_u128(id),
            position: Point::new(x, y),
            title: format!("n{}", id),
            content: String::new(),
            tags: Vec::new(),
            creator: UserId::from_u128(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_closed_view_rejects_sync() {
        let (_sender, subscription) = Subscription::channel();
        let mut view = GraphView::new(
            subscription,
            RecordingSurface::new(800.0, 600.0),
            &MeshConfig::default(),
        );
        view.close();
        assert!(view.is_closed());
        assert!(view.sync().is_err());
    }

    #[test]
    fn test_zoom_waits_for_debounce_window() {
        let (_sender, subscription) = Subscription::channel();
        let mut view = GraphView::new(
            subscription,
            RecordingSurface::new(800.0, 600.0),
            &MeshConfig::default(),
        );
        let start = Instant::now();
        view.on_zoom_gesture(Transform::new(10.0, 10.0, 2.0), start);
        view.poll(start + Duration::from_millis(10)).unwrap();
        assert_eq!(view.viewport().transform(), Transform::IDENTITY);

        view.poll(start + Duration::from_millis(50)).unwrap();
        assert_eq!(view.viewport().transform(), Transform::new(10.0, 10.0, 2.0));
        assert_eq!(view.surface().transform(), Transform::new(10.0, 10.0, 2.0));
    }

    #[test]
    fn test_failed_redraw_on_resize_still_reclamps() {
        let (sender, subscription) = Subscription::channel();
        let mut view = GraphView::new(
            subscription,
            RecordingSurface::new(800.0, 600.0),
            &MeshConfig::default(),
        );
        let mut graph = Graph::new(GraphMetaId::from_u128(1));
        graph.nodes.push(node(1, 500.0, 500.0));
        sender.send(graph.clone()).unwrap();
        view.sync().unwrap();

        let start = Instant::now();
        view.on_zoom_gesture(Transform::new(700.0, 0.0, 1.0), start);
        view.poll(start + Duration::from_millis(50)).unwrap();
        assert_eq!(view.viewport().transform(), Transform::new(700.0, 0.0, 1.0));

        // A snapshot with a dangling edge cannot be drawn
        graph.edges.push(Edge {
            id: EdgeId::from_u128(10),
            label: None,
            source: NodeId::from_u128(1),
            target: NodeId::from_u128(99),
            creator: UserId::from_u128(1),
            created_at: Utc::now(),
        });
        sender.send(graph).unwrap();
        assert!(view.sync().is_err());

        let later = start + Duration::from_millis(100);
        view.on_resize(200.0, 150.0, later);
        assert!(view.poll(later + Duration::from_millis(50)).is_err());

        let transform = view.viewport().transform();
        assert!(transform.x < 200.0, "{}", transform);
        assert_eq!(view.surface().transform(), transform);
    }
}
