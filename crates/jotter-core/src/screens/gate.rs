//! Session gate: keeps protected routes behind a live session.

use std::sync::Arc;

use super::{Handled, Navigator, Route};
use crate::auth::{AuthStateChange, AuthSubscription};
use crate::backend::AuthBackend;

pub struct SessionGate<B: AuthBackend> {
    backend: Arc<B>,
    subscription: Option<AuthSubscription>,
}

impl<B: AuthBackend> SessionGate<B> {
    pub const fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            subscription: None,
        }
    }

    /// Subscribe to auth changes, then route on the current session.
    ///
    /// A failed session lookup is treated as signed out.
    pub async fn mount(&mut self, nav: &mut Navigator) -> Handled {
        if self.subscription.is_none() {
            self.subscription = Some(self.backend.on_auth_state_change());
        }

        match self.backend.get_session().await {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.user.id, "session restored");
                nav.reset(Route::Notes);
                Handled::Done
            }
            Ok(None) => {
                nav.reset(Route::Login);
                Handled::Done
            }
            Err(error) => {
                tracing::warn!("Session lookup failed, treating as signed out: {}", error);
                nav.reset(Route::Login);
                Handled::Failed
            }
        }
    }

    /// Wait for the next auth change. `None` when not mounted.
    pub async fn next_change(&mut self) -> Option<AuthStateChange> {
        self.subscription.as_mut()?.next().await
    }

    /// Apply an auth change. Returns `true` when it forced a redirect to login.
    pub fn handle_change(&self, change: &AuthStateChange, nav: &mut Navigator) -> bool {
        if change.has_session() {
            return false;
        }
        let current = nav.current();
        if !(current.is_protected() || *current == Route::Index) {
            return false;
        }
        tracing::info!(event = ?change.event, "session ended, redirecting to login");
        nav.reset(Route::Login);
        true
    }

    pub fn unmount(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }
}

impl<B: AuthBackend> Drop for SessionGate<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}
