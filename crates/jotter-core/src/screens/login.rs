//! Email/password sign-in.

use std::sync::Arc;

use super::{
    Handled, Navigator, Presenter, Route, ScreenScope, ERROR_TITLE, MSG_FILL_ALL_FIELDS,
};
use crate::backend::AuthBackend;

pub struct LoginScreen<B: AuthBackend> {
    backend: Arc<B>,
    scope: ScreenScope,
    pub email: String,
    pub password: String,
    loading: bool,
}

impl<B: AuthBackend> LoginScreen<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            scope: ScreenScope::new(),
            email: String::new(),
            password: String::new(),
            loading: false,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn scope(&self) -> ScreenScope {
        self.scope.clone()
    }

    pub async fn submit<P: Presenter>(&mut self, nav: &mut Navigator, ui: &P) -> Handled {
        if self.loading {
            return Handled::Skipped;
        }
        if self.email.is_empty() || self.password.is_empty() {
            ui.alert(ERROR_TITLE, MSG_FILL_ALL_FIELDS);
            return Handled::Rejected;
        }

        self.loading = true;
        let backend = Arc::clone(&self.backend);
        let result = self
            .scope
            .run(backend.sign_in(&self.email, &self.password))
            .await;
        self.loading = false;
        let Some(result) = result else {
            return Handled::Cancelled;
        };

        match result {
            Ok(_) => {
                self.password.clear();
                nav.reset(Route::Notes);
                Handled::Done
            }
            Err(error) => {
                tracing::debug!("sign-in failed: {}", error);
                ui.alert(ERROR_TITLE, &error.to_string());
                Handled::Failed
            }
        }
    }

    pub fn open_register(&self, nav: &mut Navigator) {
        nav.push(Route::Register);
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::{BackendCall, InMemoryBackend};
    use crate::screens::RecordingPresenter;

    fn screen(backend: &Arc<InMemoryBackend>, email: &str, password: &str) -> LoginScreen<InMemoryBackend> {
        let mut screen = LoginScreen::new(Arc::clone(backend));
        screen.email = email.to_string();
        screen.password = password.to_string();
        screen
    }

    #[tokio::test]
    async fn valid_credentials_navigate_to_notes() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_user("a@example.com", "secret");
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();
        nav.reset(Route::Login);

        let mut login = screen(&backend, "a@example.com", "secret");
        assert_eq!(login.submit(&mut nav, &ui).await, Handled::Done);
        assert_eq!(nav.history(), &[Route::Notes]);
        assert!(ui.alerts().is_empty());
        assert!(!login.is_loading());
    }

    #[tokio::test]
    async fn invalid_credentials_alert_and_stay() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_user("a@example.com", "secret");
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();
        nav.reset(Route::Login);

        let mut login = screen(&backend, "a@example.com", "nope");
        assert_eq!(login.submit(&mut nav, &ui).await, Handled::Failed);
        assert_eq!(nav.history(), &[Route::Login]);
        assert_eq!(ui.last_message().as_deref(), Some("Invalid login credentials"));
        assert!(!login.is_loading());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_without_request() {
        let backend = Arc::new(InMemoryBackend::new());
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();

        let mut login = screen(&backend, "a@example.com", "");
        assert_eq!(login.submit(&mut nav, &ui).await, Handled::Rejected);
        assert_eq!(ui.last_message().as_deref(), Some(MSG_FILL_ALL_FIELDS));
        assert!(!backend
            .calls()
            .iter()
            .any(|call| matches!(call, BackendCall::SignIn { .. })));
    }

    #[tokio::test]
    async fn register_link_pushes_route() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut nav = Navigator::new();
        nav.reset(Route::Login);
        LoginScreen::new(backend).open_register(&mut nav);
        assert_eq!(nav.history(), &[Route::Login, Route::Register]);
    }

    #[tokio::test]
    async fn cancelled_submit_can_be_retried() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_user("a@example.com", "secret");
        backend.set_latency(Some(Duration::from_millis(200)));
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();
        nav.reset(Route::Login);

        let mut login = screen(&backend, "a@example.com", "secret");
        let scope = login.scope();
        let (handled, ()) = tokio::join!(login.submit(&mut nav, &ui), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            scope.cancel();
        });
        assert_eq!(handled, Handled::Cancelled);
        assert!(!login.is_loading());
        assert_eq!(nav.history(), &[Route::Login]);

        backend.set_latency(None);
        login.scope().reset();
        assert_eq!(login.submit(&mut nav, &ui).await, Handled::Done);
        assert_eq!(nav.history(), &[Route::Notes]);
    }
}
