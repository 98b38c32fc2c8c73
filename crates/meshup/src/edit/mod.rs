//! Graph editing
//!
//! A [`GraphEditSession`] applies user mutations to the latest snapshot of a
//! graph document and writes the whole document back to the store.

mod session;

pub use session::*;
