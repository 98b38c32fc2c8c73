//! SVG serialization surface
//!
//! Edges and nodes live in two groups inside a single content group, so lines
//! are always painted under circles and one transform pans and zooms both.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::core::{RenderConfig, Transform};

use super::surface::{Primitive, RenderSurface};

/// Surface that serializes its primitives to a standalone SVG document
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    config: RenderConfig,
    transform: Transform,
    next_handle: u64,
    primitives: BTreeMap<u64, Primitive>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_config(width, height, RenderConfig::default())
    }

    pub fn with_config(width: f64, height: f64, config: RenderConfig) -> Self {
        Self {
            width,
            height,
            config,
            transform: Transform::IDENTITY,
            next_handle: 0,
            primitives: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Serialize the surface, primitives in creation order
    pub fn to_svg(&self) -> String {
        let mut edges = String::new();
        let mut nodes = String::new();
        let style = &self.config;

        // Writing into a String cannot fail
        for primitive in self.primitives.values() {
            match primitive {
                Primitive::Line { from, to, label } => {
                    let _ = write!(
                        edges,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}">"#,
                        from.x, from.y, to.x, to.y, style.edge_stroke, style.edge_width
                    );
                    if let Some(label) = label {
                        let _ = write!(edges, "<title>{}</title>", escape_xml(label));
                    }
                    edges.push_str("</line>\n");
                }
                Primitive::Circle {
                    center,
                    radius,
                    title,
                } => {
                    let _ = writeln!(
                        nodes,
                        r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}"><title>{}</title></circle>"#,
                        center.x,
                        center.y,
                        radius,
                        style.node_fill,
                        style.node_stroke,
                        escape_xml(title)
                    );
                }
            }
        }

        let t = self.transform;
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            svg,
            r#"<g class="content" transform="translate({},{}) scale({})">"#,
            t.x, t.y, t.k
        );
        let _ = write!(svg, "<g class=\"edges\">\n{}</g>\n", edges);
        let _ = write!(svg, "<g class=\"nodes\">\n{}</g>\n", nodes);
        svg.push_str("</g>\n</svg>\n");
        svg
    }
}

impl RenderSurface for SvgSurface {
    type Handle = u64;

    fn create(&mut self, primitive: &Primitive) -> u64 {
        self.next_handle += 1;
        self.primitives.insert(self.next_handle, primitive.clone());
        self.next_handle
    }

    fn update(&mut self, handle: u64, primitive: &Primitive) {
        if let Some(slot) = self.primitives.get_mut(&handle) {
            *slot = primitive.clone();
        }
    }

    fn remove(&mut self, handle: u64) {
        self.primitives.remove(&handle);
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;

    #[test]
    fn test_svg_contains_transform_and_shapes() {
        let mut surface = SvgSurface::new(800.0, 600.0);
        surface.create(&Primitive::Line {
            from: Point::new(0.0, 0.0),
            to: Point::new(10.0, 0.0),
            label: Some("relates".into()),
        });
        surface.create(&Primitive::Circle {
            center: Point::new(10.0, 0.0),
            radius: 10.0,
            title: "Idea".into(),
        });
        surface.set_transform(Transform::new(5.0, 6.0, 2.0));

        let svg = surface.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"transform="translate(5,6) scale(2)""#));
        assert!(svg.contains("<title>relates</title>"));
        assert!(svg.contains(r#"<circle cx="10" cy="0" r="10""#));
        assert!(svg.find("<line").unwrap() < svg.find("<circle").unwrap());
    }

    #[test]
    fn test_titles_are_escaped() {
        let mut surface = SvgSurface::new(10.0, 10.0);
        surface.create(&Primitive::Circle {
            center: Point::new(0.0, 0.0),
            radius: 1.0,
            title: "a < b & \"c\"".into(),
        });
        assert!(surface.to_svg().contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn test_removed_primitives_are_not_serialized() {
        let mut surface = SvgSurface::new(10.0, 10.0);
        let handle = surface.create(&Primitive::Circle {
            center: Point::new(0.0, 0.0),
            radius: 1.0,
            title: "gone".into(),
        });
        surface.remove(handle);
        assert!(surface.is_empty());
        assert!(!surface.to_svg().contains("gone"));
    }
}
