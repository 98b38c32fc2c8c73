//! Pan/zoom state for a rendering container

use tracing::{debug, trace};

use crate::core::{BoundingBox, Transform, ViewportConfig};

/// Owns the container size and the current content transform
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    width: f64,
    height: f64,
    transform: Transform,
    config: ViewportConfig,
}

impl ViewportController {
    /// Controller for a `width` x `height` container at the identity transform
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_config(width, height, ViewportConfig::default())
    }

    pub fn with_config(width: f64, height: f64, config: ViewportConfig) -> Self {
        debug!(width, height, "Viewport initialized");
        Self {
            width,
            height,
            transform: Transform::IDENTITY,
            config,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Container size as `(width, height)`
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Make `transform` the current one
    pub fn apply(&mut self, transform: Transform) {
        trace!(%transform, "Transform applied");
        self.transform = transform;
    }

    /// Record a new container size; the transform is left untouched
    pub fn on_resize(&mut self, width: f64, height: f64) {
        debug!(width, height, "Viewport resized");
        self.width = width;
        self.height = height;
    }

    /// Limit a transform proposed by a zoom or pan gesture
    ///
    /// The scale is kept within the configured extent. With a content box,
    /// the translation is bounded so that at least the visible fraction of
    /// the box (scaled by `sqrt(k)`) stays inside the container on each axis.
    /// The controller itself is not changed.
    pub fn on_zoom_gesture(&self, raw: Transform, content: Option<&BoundingBox>) -> Transform {
        let k = limit(raw.k, self.config.min_scale, self.config.max_scale);
        let Some(b) = content else {
            return Transform::new(raw.x, raw.y, k);
        };

        let fraction = self.config.visible_fraction;
        let root_k = k.sqrt();
        let x = limit(
            raw.x,
            -b.x * k - b.width * k + b.width * fraction * root_k,
            self.width - b.width * fraction * root_k,
        );
        let y = limit(
            raw.y,
            -b.y * k - b.height * k + b.height * fraction * root_k,
            self.height - b.height * fraction * root_k,
        );

        let clamped = Transform::new(x, y, k);
        if clamped != raw {
            trace!(%raw, %clamped, "Zoom gesture clamped");
        }
        clamped
    }

    /// Transform that fits `content` inside the container, centered
    ///
    /// The scale is the tighter of the width and height ratios, shrunk by the
    /// fit padding and capped by `max_scale` (or the configured default cap).
    /// Without content, for a box with no extent, or for an empty container,
    /// the current transform is returned unchanged.
    pub fn fit_to_container(&self, content: Option<&BoundingBox>, max_scale: Option<f64>) -> Transform {
        let Some(b) = content else {
            return self.transform;
        };
        if b.is_degenerate() || self.width <= 0.0 || self.height <= 0.0 {
            trace!(?b, "Nothing to fit");
            return self.transform;
        }

        let ratio = |container: f64, extent: f64| {
            if extent > 0.0 {
                container / extent
            } else {
                f64::INFINITY
            }
        };
        let mut k = ratio(self.width, b.width).min(ratio(self.height, b.height))
            * (1.0 - self.config.fit_padding);
        if let Some(cap) = max_scale.or(self.config.max_fit_scale) {
            k = k.min(cap);
        }
        if !k.is_finite() || k <= 0.0 {
            return self.transform;
        }

        let center = b.center();
        let fitted = Transform::new(
            self.width / 2.0 - center.x * k,
            self.height / 2.0 - center.y * k,
            k,
        );
        debug!(%fitted, "Fit content to container");
        fitted
    }
}

/// `value` kept within `[lower, upper]`, favoring `upper` when the bounds cross
fn limit(value: f64, lower: f64, upper: f64) -> f64 {
    value.max(lower).min(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;

    #[test]
    fn test_new_starts_at_identity() {
        let viewport = ViewportController::new(800.0, 600.0);
        assert_eq!(viewport.transform(), Transform::IDENTITY);
        assert_eq!(viewport.size(), (800.0, 600.0));
    }

    #[test]
    fn test_fit_centers_single_node() {
        let viewport = ViewportController::new(800.0, 600.0);
        let content = BoundingBox::around(Point::new(500.0, 500.0), 10.0);
        let t = viewport.fit_to_container(Some(&content), None);
        let center = t.apply(Point::new(500.0, 500.0));
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
        assert!((t.k - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_respects_max_scale() {
        let viewport = ViewportController::new(800.0, 600.0);
        let content = BoundingBox::around(Point::new(0.0, 0.0), 10.0);
        assert_eq!(viewport.fit_to_container(Some(&content), Some(2.0)).k, 2.0);
    }

    #[test]
    fn test_fit_without_content_keeps_transform() {
        let mut viewport = ViewportController::new(800.0, 600.0);
        let current = Transform::new(10.0, 20.0, 1.5);
        viewport.apply(current);
        assert_eq!(viewport.fit_to_container(None, None), current);
        let point = BoundingBox::new(5.0, 5.0, 0.0, 0.0);
        assert_eq!(viewport.fit_to_container(Some(&point), None), current);
    }

    #[test]
    fn test_fit_flat_box_uses_other_axis() {
        let viewport = ViewportController::new(800.0, 600.0);
        let line = BoundingBox::new(0.0, 100.0, 400.0, 0.0);
        let t = viewport.fit_to_container(Some(&line), None);
        assert!((t.k - 1.8).abs() < 1e-9);
        assert!((t.y - (300.0 - 100.0 * t.k)).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp_keeps_third_visible() {
        let viewport = ViewportController::new(800.0, 600.0);
        let content = BoundingBox::new(0.0, 0.0, 1000.0, 300.0);

        let right = viewport.on_zoom_gesture(Transform::new(5000.0, 0.0, 1.0), Some(&content));
        assert!((right.x - (800.0 - 1000.0 / 3.0)).abs() < 1e-9);

        let left = viewport.on_zoom_gesture(Transform::new(-5000.0, 0.0, 1.0), Some(&content));
        assert!((left.x - (-1000.0 + 1000.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_gesture_does_not_mutate() {
        let viewport = ViewportController::new(800.0, 600.0);
        let _ = viewport.on_zoom_gesture(Transform::new(50.0, 50.0, 2.0), None);
        assert_eq!(viewport.transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_zoom_scale_limited_to_extent() {
        let viewport = ViewportController::new(800.0, 600.0);
        assert_eq!(viewport.on_zoom_gesture(Transform::new(0.0, 0.0, 1000.0), None).k, 40.0);
        assert_eq!(viewport.on_zoom_gesture(Transform::new(0.0, 0.0, 0.0), None).k, 0.05);
    }

    #[test]
    fn test_resize_keeps_transform() {
        let mut viewport = ViewportController::new(800.0, 600.0);
        let t = Transform::new(1.0, 2.0, 3.0);
        viewport.apply(t);
        viewport.on_resize(1024.0, 768.0);
        assert_eq!(viewport.size(), (1024.0, 768.0));
        assert_eq!(viewport.transform(), t);
    }
}
