//! Graph catalog: creating, sharing and organizing graphs

mod graphs;

pub use graphs::*;
