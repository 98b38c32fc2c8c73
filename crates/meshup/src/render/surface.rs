//! Drawing surfaces the renderer targets

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::core::{Point, Transform};

/// A shape placed in the content group
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A node
    Circle {
        center: Point,
        radius: f64,
        title: String,
    },
    /// An edge between two node centers
    Line {
        from: Point,
        to: Point,
        label: Option<String>,
    },
}


/// Retained-mode drawing target
///
/// Primitives are created once and then addressed by handle, so the renderer
/// can update a matched shape in place instead of redrawing everything.
pub trait RenderSurface {
    /// Identifies a primitive on this surface
    type Handle: Copy + Eq + Hash + Debug;

    fn create(&mut self, primitive: &Primitive) -> Self::Handle;

    fn update(&mut self, handle: Self::Handle, primitive: &Primitive);

    fn remove(&mut self, handle: Self::Handle);

    /// Set the transform of the content group holding every primitive
    fn set_transform(&mut self, transform: Transform);

    fn resize(&mut self, width: f64, height: f64);

    /// Surface size as `(width, height)`
    fn size(&self) -> (f64, f64);
}

/// Surface that keeps primitives in memory and counts every operation
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    next_handle: u64,
    live: HashMap<u64, Primitive>,
    transform: Transform,
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            transform: Transform::IDENTITY,
            ..Self::default()
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.live.values()
    }

    pub fn lines(&self) -> usize {
        self.primitives()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count()
    }

    pub fn circles(&self) -> usize {
        self.primitives()
            .filter(|p| matches!(p, Primitive::Circle { .. }))
            .count()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Zero the operation counters, keeping the primitives
    pub fn reset_counts(&mut self) {
        self.created = 0;
        self.updated = 0;
        self.removed = 0;
    }
}

impl RenderSurface for RecordingSurface {
    type Handle = u64;

    fn create(&mut self, primitive: &Primitive) -> u64 {
        self.next_handle += 1;
        self.live.insert(self.next_handle, primitive.clone());
        self.created += 1;
        self.next_handle
    }

    fn update(&mut self, handle: u64, primitive: &Primitive) {
        if let Some(slot) = self.live.get_mut(&handle) {
            *slot = primitive.clone();
            self.updated += 1;
        }
    }

    fn remove(&mut self, handle: u64) {
        if self.live.remove(&handle).is_some() {
            self.removed += 1;
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_counts() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let circle = Primitive::Circle {
            center: Point::new(1.0, 1.0),
            radius: 2.0,
            title: "a".into(),
        };
        let handle = surface.create(&circle);
        surface.update(handle, &circle);
        surface.remove(handle);
        surface.remove(handle);
        assert_eq!((surface.created, surface.updated, surface.removed), (1, 1, 1));
        assert_eq!(surface.live_count(), 0);
    }
}
