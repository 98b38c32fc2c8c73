//! Close lifecycle shared by subscriptions and views
//!
//! Components that can be dismissed implement [`Closeable`] and compose a
//! [`CloseState`] instead of each tracking the flag by hand.

use tracing::trace;

/// Capability of components with an explicit close lifecycle
pub trait Closeable {
    /// Release the component's resources. Closing twice is a no-op.
    fn close(&mut self);

    /// True once `close` has run
    fn is_closed(&self) -> bool;
}

/// Shared close bookkeeping composed into closeable components
#[derive(Debug, Clone, Default)]
pub struct CloseState {
    label: &'static str,
    closed: bool,
}

impl CloseState {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            closed: false,
        }
    }

    /// Mark as closed; returns true only for the first call
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        trace!(component = self.label, "Closed");
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}
