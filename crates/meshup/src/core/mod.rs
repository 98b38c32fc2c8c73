//! Core abstractions shared by the viewport, renderer and edit session
//!
//! Graph documents, identifiers and geometry, the store and identity seams,
//! configuration, errors and logging.

mod closeable;
mod config;
mod debounce;
mod error;
mod graph;
pub mod logging;
mod session;
mod store;
mod types;

pub use closeable::*;
pub use config::*;
pub use debounce::*;
pub use error::*;
pub use graph::*;
pub use logging::*;
pub use session::*;
pub use store::*;
pub use types::*;
