//! Auth state change notifications.

use tokio::sync::broadcast;

use super::AuthSession;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    /// Stored session could not be refreshed and was dropped
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStateChange {
    pub event: AuthEvent,
    /// Session in effect after the event
    pub session: Option<AuthSession>,
}

impl AuthStateChange {
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }
}

/// Fan-out of auth state changes to every live subscription.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthStateChange>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl AuthEvents {
    pub fn emit(&self, event: AuthEvent, session: Option<AuthSession>) {
        tracing::debug!(?event, signed_in = session.is_some(), "auth state changed");
        // No subscribers is fine.
        let _ = self.sender.send(AuthStateChange { event, session });
    }

    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: Some(self.sender.subscribe()),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Handle returned by `on_auth_state_change`. Dropping it also unsubscribes.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: Option<broadcast::Receiver<AuthStateChange>>,
}

impl AuthSubscription {
    /// Wait for the next change. `None` once unsubscribed or the source is gone.
    ///
    /// Cancel safe. A lagging subscriber skips to the oldest retained event.
    pub async fn next(&mut self) -> Option<AuthStateChange> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;

    fn session() -> AuthSession {
        AuthSession {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: i64::MAX,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let events = AuthEvents::default();
        let mut subscription = events.subscribe();

        events.emit(AuthEvent::SignedIn, Some(session()));
        events.emit(AuthEvent::SignedOut, None);

        let first = subscription.next().await.unwrap();
        assert_eq!(first.event, AuthEvent::SignedIn);
        assert!(first.has_session());
        let second = subscription.next().await.unwrap();
        assert_eq!(second.event, AuthEvent::SignedOut);
        assert!(!second.has_session());
    }

    #[tokio::test]
    async fn unsubscribe_detaches_receiver() {
        let events = AuthEvents::default();
        let mut subscription = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);

        subscription.unsubscribe();
        assert!(!subscription.is_active());
        assert_eq!(events.subscriber_count(), 0);
        assert!(subscription.next().await.is_none());
    }
}
