//! Configuration for the viewport, the renderer and edit sessions

use std::time::Duration;

use super::types::Point;

/// Smallest padding fraction applied around fitted content
pub const MIN_FIT_PADDING: f64 = 0.05;
/// Largest padding fraction applied around fitted content
pub const MAX_FIT_PADDING: f64 = 0.10;
/// Window used to debounce resize and zoom events
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Tuning of the viewport controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// Fraction of the content box that must stay inside the container
    pub visible_fraction: f64,
    /// Padding fraction applied when fitting content to the container
    pub fit_padding: f64,
    /// Allowed scale range for zoom gestures
    pub min_scale: f64,
    pub max_scale: f64,
    /// Cap on the scale chosen by a fit when the caller passes none
    pub max_fit_scale: Option<f64>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            visible_fraction: 1.0 / 3.0,
            fit_padding: MAX_FIT_PADDING,
            min_scale: 0.05,
            max_scale: 40.0,
            max_fit_scale: None,
        }
    }
}

impl ViewportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fit padding, kept within 5%..=10%
    pub fn with_fit_padding(mut self, padding: f64) -> Self {
        self.fit_padding = if padding.is_finite() {
            padding.max(MIN_FIT_PADDING).min(MAX_FIT_PADDING)
        } else {
            MAX_FIT_PADDING
        };
        self
    }

    pub fn with_visible_fraction(mut self, fraction: f64) -> Self {
        self.visible_fraction = fraction;
        self
    }

    /// Set the scale extent; a reversed range is swapped
    pub fn with_scale_extent(mut self, min: f64, max: f64) -> Self {
        self.min_scale = min.min(max);
        self.max_scale = max.max(min);
        self
    }

    pub fn with_max_fit_scale(mut self, max: Option<f64>) -> Self {
        self.max_fit_scale = max;
        self
    }
}

/// Visual attributes of rendered primitives
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub node_radius: f64,
    pub node_fill: String,
    pub node_stroke: String,
    pub edge_stroke: String,
    pub edge_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_radius: 10.0,
            node_fill: "#69b3a2".to_string(),
            node_stroke: "#2f4f4f".to_string(),
            edge_stroke: "#999999".to_string(),
            edge_width: 1.5,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_radius(mut self, radius: f64) -> Self {
        self.node_radius = radius.max(0.0);
        self
    }
}

/// Who may mutate a graph's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    /// Only the graph owner may edit
    #[default]
    OwnerOnly,
    /// Owner and listed collaborators may edit
    OwnerAndCollaborators,
}

/// Behavior of graph edit sessions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub edit_policy: EditPolicy,
    /// Position given to nodes created without one
    pub default_position: Point,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            edit_policy: EditPolicy::OwnerOnly,
            default_position: Point::new(0.0, 0.0),
        }
    }
}

impl SessionConfig {
    pub fn with_edit_policy(mut self, policy: EditPolicy) -> Self {
        self.edit_policy = policy;
        self
    }

    pub fn with_default_position(mut self, position: Point) -> Self {
        self.default_position = position;
        self
    }
}

/// Bundle of every component's configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MeshConfig {
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
    pub session: SessionConfig,
    pub debounce: Duration,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
            session: SessionConfig::default(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl MeshConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_padding_is_kept_in_range() {
        assert_eq!(ViewportConfig::new().with_fit_padding(0.5).fit_padding, 0.10);
        assert_eq!(ViewportConfig::new().with_fit_padding(0.0).fit_padding, 0.05);
        assert_eq!(ViewportConfig::new().with_fit_padding(0.07).fit_padding, 0.07);
        assert_eq!(
            ViewportConfig::new().with_fit_padding(f64::NAN).fit_padding,
            0.10
        );
    }

    #[test]
    fn test_scale_extent_is_ordered() {
        let config = ViewportConfig::new().with_scale_extent(5.0, 0.5);
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.max_scale, 5.0);
    }

    #[test]
    fn test_defaults() {
        let config = MeshConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.session.edit_policy, EditPolicy::OwnerOnly);
        assert!((config.viewport.visible_fraction - 1.0 / 3.0).abs() < f64::EPSILON);
    }
}
