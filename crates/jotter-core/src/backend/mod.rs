//! The backend-as-a-service boundary.
//!
//! Screens never reach for a global client. They receive a `Backend` and only
//! call the operations below, so tests can swap in [`InMemoryBackend`].
//!
//! Ownership of notes is the backend's job (row-level security). The client
//! passes the signed-in user's id as a filter, but that filter is not a
//! security boundary.

mod memory;
mod supabase;

use crate::auth::{AuthSession, AuthSubscription, AuthUser, SignUpOutcome};
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::Result;

pub use memory::{BackendCall, InMemoryBackend};
pub use supabase::{SupabaseAuthClient, SupabaseBackend};

#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    async fn sign_out(&self) -> Result<()>;

    /// Current session, refreshed if it is about to expire.
    async fn get_session(&self) -> Result<Option<AuthSession>>;

    /// User behind the current session, as confirmed by the backend.
    async fn get_user(&self) -> Result<Option<AuthUser>>;

    fn on_auth_state_change(&self) -> AuthSubscription;
}

/// Row operations on the `notes` table.
#[allow(async_fn_in_trait)]
pub trait NotesBackend {
    async fn fetch_note(&self, id: &NoteId) -> Result<Note>;

    /// Notes owned by `user_id`, newest `created_at` first.
    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>>;

    async fn insert_note(&self, note: &NewNote) -> Result<()>;

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()>;

    async fn delete_note(&self, id: &NoteId) -> Result<()>;
}

pub trait Backend: AuthBackend + NotesBackend {}

impl<T: AuthBackend + NotesBackend> Backend for T {}
