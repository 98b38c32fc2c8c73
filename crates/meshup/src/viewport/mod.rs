//! Viewport control: zoom clamping and fit-to-container
//!
//! The controller owns the pan/zoom [`Transform`](crate::core::Transform)
//! applied to the rendered content group. Gestures propose a transform, the
//! controller limits it so part of the content always stays on screen, and
//! the caller applies the result.

mod controller;

pub use controller::*;
