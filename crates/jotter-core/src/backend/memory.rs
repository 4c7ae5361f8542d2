//! In-process backend with the same observable behavior as the hosted one.
//!
//! Used by tests and by the CLI's `--demo` mode. Row ownership is enforced
//! here the way row-level security would: rows of other users are invisible,
//! and updates or deletes of them touch zero rows without failing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AuthBackend, NotesBackend};
use crate::auth::{
    AuthEvent, AuthEvents, AuthSession, AuthSubscription, AuthUser, SignUpOutcome,
};
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::util::{is_blank, unix_timestamp_now};
use crate::{Error, Result};

/// Oldest calls are dropped once the log holds this many.
pub const CALL_LOG_LIMIT: usize = 256;

const SESSION_LIFETIME_SECONDS: i64 = 3600;
const NO_ROWS_MESSAGE: &str = "JSON object requested, multiple (or no) rows returned";

/// One recorded backend operation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SignUp { email: String },
    SignIn { email: String },
    SignOut,
    GetSession,
    GetUser,
    FetchNote(NoteId),
    ListNotes { user_id: String },
    InsertNote(NewNote),
    UpdateNote(NoteId),
    DeleteNote(NoteId),
}

impl BackendCall {
    #[must_use]
    pub const fn is_data_call(&self) -> bool {
        matches!(
            self,
            Self::FetchNote(_)
                | Self::ListNotes { .. }
                | Self::InsertNote(_)
                | Self::UpdateNote(_)
                | Self::DeleteNote(_)
        )
    }
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    session: Option<AuthSession>,
    notes: Vec<Note>,
    calls: VecDeque<BackendCall>,
    next_failure: Option<String>,
    next_data_failure: Option<String>,
    last_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
    events: AuthEvents,
    latency: Mutex<Option<Duration>>,
    auto_confirm: bool,
}

impl InMemoryBackend {
    /// Sign-ups require email confirmation, like a default hosted project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign-ups are confirmed and signed in immediately.
    #[must_use]
    pub fn with_auto_confirm() -> Self {
        Self {
            auto_confirm: true,
            ..Self::default()
        }
    }

    /// Register a confirmed account directly.
    pub fn add_user(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::now_v7().to_string(),
            email: Some(email.to_string()),
        };
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
                confirmed: true,
            },
        );
        user
    }

    /// Mark an account as having followed its confirmation link.
    pub fn confirm_email(&self, email: &str) {
        if let Some(account) = self.lock().accounts.get_mut(email) {
            account.confirmed = true;
        }
    }

    /// Drop the current session as if its refresh token stopped working.
    pub fn expire_session(&self) {
        self.lock().session = None;
        self.events.emit(AuthEvent::SessionExpired, None);
    }

    /// Make the next backend call fail with `message`.
    pub fn fail_next_call(&self, message: impl Into<String>) {
        self.lock().next_failure = Some(message.into());
    }

    /// Make the next `notes` table call fail with `message`; auth calls pass.
    pub fn fail_next_data_call(&self, message: impl Into<String>) {
        self.lock().next_data_failure = Some(message.into());
    }

    /// Delay every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut guard) = self.latency.lock() {
            *guard = latency;
        }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.iter().cloned().collect()
    }

    #[must_use]
    pub fn data_call_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.is_data_call())
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Every stored row, regardless of owner.
    #[must_use]
    pub fn all_notes(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock only happens in a failing test.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn begin(&self, call: BackendCall) -> Result<()> {
        let latency = self.latency.lock().ok().and_then(|guard| *guard);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        let data_failure = if call.is_data_call() {
            state.next_data_failure.take()
        } else {
            None
        };
        if state.calls.len() == CALL_LOG_LIMIT {
            state.calls.pop_front();
        }
        state.calls.push_back(call);
        match state.next_failure.take().or(data_failure) {
            Some(message) => Err(Error::Api(message)),
            None => Ok(()),
        }
    }

    fn current_user_id(&self) -> Result<String> {
        self.lock()
            .session
            .as_ref()
            .map(|session| session.user.id.clone())
            .ok_or(Error::NotSignedIn)
    }
}

fn issue_session(user: &AuthUser) -> AuthSession {
    AuthSession {
        access_token: format!("access-{}", Uuid::now_v7()),
        refresh_token: format!("refresh-{}", Uuid::now_v7()),
        expires_at: unix_timestamp_now() + SESSION_LIFETIME_SECONDS,
        user: user.clone(),
    }
}

impl AuthBackend for InMemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        self.begin(BackendCall::SignUp {
            email: email.to_string(),
        })
        .await?;
        if is_blank(email) || is_blank(password) {
            return Err(Error::Api(
                "Signup requires a valid password".to_string(),
            ));
        }

        let session = {
            let mut state = self.lock();
            if state.accounts.contains_key(email) {
                return Err(Error::Api("User already registered".to_string()));
            }
            let user = AuthUser {
                id: Uuid::now_v7().to_string(),
                email: Some(email.to_string()),
            };
            state.accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                    confirmed: self.auto_confirm,
                },
            );
            if !self.auto_confirm {
                return Ok(SignUpOutcome::ConfirmationRequired);
            }
            let session = issue_session(&user);
            state.session = Some(session.clone());
            session
        };

        self.events.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.begin(BackendCall::SignIn {
            email: email.to_string(),
        })
        .await?;

        let session = {
            let mut state = self.lock();
            let account = state
                .accounts
                .get(email)
                .filter(|account| account.password == password)
                .cloned()
                .ok_or_else(|| Error::Api("Invalid login credentials".to_string()))?;
            if !account.confirmed {
                return Err(Error::Api("Email not confirmed".to_string()));
            }
            let session = issue_session(&account.user);
            state.session = Some(session.clone());
            session
        };

        self.events.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.begin(BackendCall::SignOut).await?;
        self.lock().session = None;
        self.events.emit(AuthEvent::SignedOut, None);
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>> {
        self.begin(BackendCall::GetSession).await?;
        Ok(self.lock().session.clone())
    }

    async fn get_user(&self) -> Result<Option<AuthUser>> {
        self.begin(BackendCall::GetUser).await?;
        Ok(self.lock().session.as_ref().map(|session| session.user.clone()))
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.events.subscribe()
    }
}

impl NotesBackend for InMemoryBackend {
    async fn fetch_note(&self, id: &NoteId) -> Result<Note> {
        self.begin(BackendCall::FetchNote(id.clone())).await?;
        let user_id = self.current_user_id()?;
        self.lock()
            .notes
            .iter()
            .find(|note| &note.id == id && note.user_id == user_id)
            .cloned()
            .ok_or_else(|| Error::Api(NO_ROWS_MESSAGE.to_string()))
    }

    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        self.begin(BackendCall::ListNotes {
            user_id: user_id.to_string(),
        })
        .await?;
        let owner = self.current_user_id()?;
        let mut notes = self
            .lock()
            .notes
            .iter()
            .filter(|note| note.user_id == owner && note.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        notes.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(notes)
    }

    async fn insert_note(&self, note: &NewNote) -> Result<()> {
        self.begin(BackendCall::InsertNote(note.clone())).await?;
        let owner = self.current_user_id()?;
        if note.user_id != owner {
            return Err(Error::Api(
                "new row violates row-level security policy for table \"notes\"".to_string(),
            ));
        }

        let mut state = self.lock();
        // Keep created_at strictly increasing so newest-first ordering is total.
        let mut created_at = Utc::now();
        if let Some(last) = state.last_created_at {
            if created_at <= last {
                created_at = last + chrono::Duration::microseconds(1);
            }
        }
        state.last_created_at = Some(created_at);
        state.notes.push(Note {
            id: NoteId::new(Uuid::now_v7().to_string()),
            user_id: note.user_id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            created_at,
            updated_at: None,
        });
        Ok(())
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        self.begin(BackendCall::UpdateNote(id.clone())).await?;
        let owner = self.current_user_id()?;
        let mut state = self.lock();
        if let Some(note) = state
            .notes
            .iter_mut()
            .find(|note| &note.id == id && note.user_id == owner)
        {
            note.title.clone_from(&patch.title);
            note.content.clone_from(&patch.content);
            note.updated_at = Some(patch.updated_at);
        }
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.begin(BackendCall::DeleteNote(id.clone())).await?;
        let owner = self.current_user_id()?;
        self.lock()
            .notes
            .retain(|note| !(&note.id == id && note.user_id == owner));
        Ok(())
    }
}
