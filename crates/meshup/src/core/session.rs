//! Identity of the signed-in user
//!
//! The current user is an explicit value handed to edit sessions and the
//! catalog rather than an ambient global. A [`SessionContext`] is created at
//! login and cleared at logout; every clone observes the same state.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use super::error::{MeshError, Result};
use super::types::UserId;

/// Source of the current user's identity
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if any
    fn current_user_id(&self) -> Option<UserId>;

    /// The signed-in user, or `Unauthenticated`
    fn require_user(&self) -> Result<UserId> {
        self.current_user_id().ok_or(MeshError::Unauthenticated)
    }
}

/// Shared login state
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Arc<RwLock<Option<UserId>>>,
}

impl SessionContext {
    /// A context with nobody signed in
    pub fn new() -> Self {
        Self::default()
    }

    /// A context already signed in as `user`
    pub fn signed_in(user: UserId) -> Self {
        let context = Self::new();
        context.login(user);
        context
    }

    pub fn login(&self, user: UserId) {
        let mut guard = self.user.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(user);
        info!(user = %user, "User signed in");
    }

    pub fn logout(&self) {
        let mut guard = self.user.write().unwrap_or_else(|e| e.into_inner());
        if let Some(user) = guard.take() {
            debug!(user = %user, "User signed out");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user_id().is_some()
    }
}

impl IdentityProvider for SessionContext {
    fn current_user_id(&self) -> Option<UserId> {
        *self.user.read().unwrap_or_else(|e| e.into_inner())
    }
}
