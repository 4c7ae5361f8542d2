//! Headless screen controllers.
//!
//! Each screen holds its own view state and an injected backend. Handlers
//! take the navigator and presenter explicitly, await backend calls one at a
//! time, and report what happened as a [`Handled`] value. Rendering is left to
//! the front-end.

mod gate;
mod login;
mod navigation;
mod note_detail;
mod notes_list;
mod presenter;
mod register;
mod scope;

pub use gate::SessionGate;
pub use login::LoginScreen;
pub use navigation::{Navigator, Route};
pub use note_detail::{DetailView, NoteDetailScreen};
pub use notes_list::{ListView, NoteForm, NoteRow, NotesListScreen};
pub use presenter::{ConfirmPrompt, Presenter, RecordedAlert, RecordingPresenter};
pub use register::RegisterScreen;
pub use scope::ScreenScope;

pub const ERROR_TITLE: &str = "Error";
pub const SUCCESS_TITLE: &str = "Success";

pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const MSG_PASSWORDS_DIFFER: &str = "Passwords do not match";
pub const MSG_CHECK_EMAIL: &str = "Check your email to confirm your account";
pub const MSG_ENTER_TITLE: &str = "Please enter a title";
pub const MSG_NOTE_SAVED: &str = "Note saved";
pub const MSG_NO_NOTES: &str = "No notes yet. Create one!";

/// Outcome of one screen handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The request went through
    Done,
    /// Client-side validation failed; nothing was sent
    Rejected,
    /// The backend reported an error, already shown to the user
    Failed,
    /// The screen was unmounted while the request was in flight
    Cancelled,
    /// Nothing to do: a request is already running, no user, or the user backed out
    Skipped,
}
