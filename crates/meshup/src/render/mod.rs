//! Graph rendering
//!
//! [`GraphRenderer`] reconciles graph snapshots with primitives on a
//! [`RenderSurface`]; [`GraphView`] ties a renderer, a subscription and a
//! viewport controller together.

mod renderer;
mod surface;
mod svg;
mod view;

pub use renderer::*;
pub use surface::*;
pub use svg::*;
pub use view::*;
