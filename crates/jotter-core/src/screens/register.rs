//! Account registration.

use std::sync::Arc;

use super::{
    Handled, Navigator, Presenter, Route, ScreenScope, ERROR_TITLE, MSG_CHECK_EMAIL,
    MSG_FILL_ALL_FIELDS, MSG_PASSWORDS_DIFFER, SUCCESS_TITLE,
};
use crate::auth::SignUpOutcome;
use crate::backend::AuthBackend;

pub struct RegisterScreen<B: AuthBackend> {
    backend: Arc<B>,
    scope: ScreenScope,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    loading: bool,
}

impl<B: AuthBackend> RegisterScreen<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            scope: ScreenScope::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
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

    /// Sign up, then send the user to login whether or not confirmation is pending.
    pub async fn submit<P: Presenter>(&mut self, nav: &mut Navigator, ui: &P) -> Handled {
        if self.loading {
            return Handled::Skipped;
        }
        if self.email.is_empty() || self.password.is_empty() || self.confirm_password.is_empty()
        {
            ui.alert(ERROR_TITLE, MSG_FILL_ALL_FIELDS);
            return Handled::Rejected;
        }
        if self.password != self.confirm_password {
            ui.alert(ERROR_TITLE, MSG_PASSWORDS_DIFFER);
            return Handled::Rejected;
        }

        self.loading = true;
        let result = self
            .scope
            .run(self.backend.sign_up(&self.email, &self.password))
            .await;
        self.loading = false;
        let Some(result) = result else {
            return Handled::Cancelled;
        };

        match result {
            Ok(outcome) => {
                if matches!(outcome, SignUpOutcome::ConfirmationRequired) {
                    ui.alert(SUCCESS_TITLE, MSG_CHECK_EMAIL);
                } else {
                    tracing::info!("sign-up confirmed immediately");
                }
                self.password.clear();
                self.confirm_password.clear();
                nav.reset(Route::Login);
                Handled::Done
            }
            Err(error) => {
                ui.alert(ERROR_TITLE, &error.to_string());
                Handled::Failed
            }
        }
    }

    pub fn open_login(&self, nav: &mut Navigator) {
        if !nav.back() {
            nav.reset(Route::Login);
        }
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::{BackendCall, InMemoryBackend};
    use crate::screens::RecordingPresenter;

    fn filled(
        backend: &Arc<InMemoryBackend>,
        password: &str,
        confirm: &str,
    ) -> RegisterScreen<InMemoryBackend> {
        let mut screen = RegisterScreen::new(Arc::clone(backend));
        screen.email = "new@example.com".to_string();
        screen.password = password.to_string();
        screen.confirm_password = confirm.to_string();
        screen
    }

    fn sign_up_calls(backend: &InMemoryBackend) -> usize {
        backend
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::SignUp { .. }))
            .count()
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let backend = Arc::new(InMemoryBackend::new());
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();

        for (password, confirm) in [("secret", "secret2"), ("a", "b"), ("long-password", "x")] {
            let mut screen = filled(&backend, password, confirm);
            assert_eq!(screen.submit(&mut nav, &ui).await, Handled::Rejected);
        }
        assert_eq!(ui.last_message().as_deref(), Some(MSG_PASSWORDS_DIFFER));
        assert_eq!(sign_up_calls(&backend), 0);
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let backend = Arc::new(InMemoryBackend::new());
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();

        let mut screen = filled(&backend, "secret", "");
        assert_eq!(screen.submit(&mut nav, &ui).await, Handled::Rejected);
        assert_eq!(ui.last_message().as_deref(), Some(MSG_FILL_ALL_FIELDS));
        assert_eq!(sign_up_calls(&backend), 0);
    }

    #[tokio::test]
    async fn success_asks_for_confirmation_and_routes_to_login() {
        let backend = Arc::new(InMemoryBackend::new());
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();
        nav.reset(Route::Login);
        nav.push(Route::Register);

        let mut screen = filled(&backend, "secret", "secret");
        assert_eq!(screen.submit(&mut nav, &ui).await, Handled::Done);
        assert_eq!(ui.last_message().as_deref(), Some(MSG_CHECK_EMAIL));
        assert_eq!(nav.history(), &[Route::Login]);
    }

    #[tokio::test]
    async fn backend_error_is_shown_verbatim() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_user("new@example.com", "old");
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();
        nav.reset(Route::Register);

        let mut screen = filled(&backend, "secret", "secret");
        assert_eq!(screen.submit(&mut nav, &ui).await, Handled::Failed);
        assert_eq!(ui.last_message().as_deref(), Some("User already registered"));
        assert_eq!(nav.current(), &Route::Register);
        assert!(!screen.is_loading());
    }

    #[tokio::test]
    async fn auto_confirmed_sign_up_skips_the_email_prompt() {
        let backend = Arc::new(InMemoryBackend::with_auto_confirm());
        let ui = RecordingPresenter::default();
        let mut nav = Navigator::new();
        nav.reset(Route::Login);
        nav.push(Route::Register);

        let mut screen = filled(&backend, "secret", "secret");
        assert_eq!(screen.submit(&mut nav, &ui).await, Handled::Done);
        assert!(!ui.alerts().iter().any(|alert| alert.message == MSG_CHECK_EMAIL));
        assert_eq!(nav.history(), &[Route::Login]);
        assert!(backend.get_session().await.unwrap().is_some());
        assert!(screen.password.is_empty());
    }
}
