//! The signed-in user's notes: list, quick create, delete, sign out.

use std::sync::Arc;

use chrono::Locale;

use super::{
    ConfirmPrompt, Handled, Navigator, Presenter, Route, ScreenScope, ERROR_TITLE,
    MSG_ENTER_TITLE,
};
use crate::auth::AuthUser;
use crate::backend::Backend;
use crate::display::{format_date, locale_from_env, to_local};
use crate::models::{is_valid_title, NewNote, Note, NoteId};

const PREVIEW_LINES: usize = 2;

/// One rendered list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: NoteId,
    pub title: String,
    /// First two lines of the content
    pub preview: String,
    /// Creation date in the user's locale
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Empty,
    Notes(Vec<NoteRow>),
}

/// The collapsible "new note" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    pub visible: bool,
    pub title: String,
    pub content: String,
}

impl NoteForm {
    fn clear(&mut self) {
        self.visible = false;
        self.title.clear();
        self.content.clear();
    }
}

pub struct NotesListScreen<B: Backend> {
    backend: Arc<B>,
    scope: ScreenScope,
    locale: Locale,
    notes: Vec<Note>,
    loading: bool,
    pub form: NoteForm,
}

impl<B: Backend> NotesListScreen<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            scope: ScreenScope::new(),
            locale: locale_from_env(),
            notes: Vec::new(),
            loading: true,
            form: NoteForm::default(),
        }
    }

    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn scope(&self) -> ScreenScope {
        self.scope.clone()
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn view(&self) -> ListView {
        if self.loading {
            return ListView::Loading;
        }
        if self.notes.is_empty() {
            return ListView::Empty;
        }
        ListView::Notes(self.notes.iter().map(|note| self.row(note)).collect())
    }

    fn row(&self, note: &Note) -> NoteRow {
        NoteRow {
            id: note.id.clone(),
            title: note.title.clone(),
            preview: note.content_preview(PREVIEW_LINES),
            created: format_date(&to_local(note.created_at), self.locale),
        }
    }

    /// Runs every time the screen gains focus, not only on first mount.
    pub async fn on_focus<P: Presenter>(&mut self, ui: &P) -> Handled {
        self.scope.reset();
        self.refresh(ui).await
    }

    /// Re-fetch the list. Rows are kept when the fetch fails.
    pub async fn refresh<P: Presenter>(&mut self, ui: &P) -> Handled {
        let user = match self.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => return Handled::Skipped,
            Err(handled) => return handled,
        };

        let backend = Arc::clone(&self.backend);
        let Some(result) = self.scope.run(backend.list_notes(&user.id)).await else {
            return Handled::Cancelled;
        };
        self.loading = false;

        match result {
            Ok(notes) => {
                tracing::debug!(count = notes.len(), "notes fetched");
                self.notes = notes;
                Handled::Done
            }
            Err(error) => {
                ui.alert(ERROR_TITLE, &error.to_string());
                Handled::Failed
            }
        }
    }

    /// `Err` carries the handler outcome when no lookup result can be used.
    async fn current_user(&self) -> Result<Option<AuthUser>, Handled> {
        let backend = Arc::clone(&self.backend);
        match self.scope.run(backend.get_user()).await {
            None => Err(Handled::Cancelled),
            Some(Ok(user)) => Ok(user),
            Some(Err(error)) => {
                tracing::warn!("Could not resolve the current user: {}", error);
                Ok(None)
            }
        }
    }

    pub fn toggle_form(&mut self) {
        self.form.visible = !self.form.visible;
    }

    pub async fn create_note<P: Presenter>(&mut self, ui: &P) -> Handled {
        if !is_valid_title(&self.form.title) {
            ui.alert(ERROR_TITLE, MSG_ENTER_TITLE);
            return Handled::Rejected;
        }
        let user = match self.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => return Handled::Skipped,
            Err(handled) => return handled,
        };

        let note = NewNote {
            user_id: user.id,
            title: self.form.title.clone(),
            content: self.form.content.clone(),
        };
        let backend = Arc::clone(&self.backend);
        let Some(result) = self.scope.run(backend.insert_note(&note)).await else {
            return Handled::Cancelled;
        };

        match result {
            Ok(()) => {
                tracing::info!("note created");
                self.form.clear();
                if self.refresh(ui).await == Handled::Cancelled {
                    return Handled::Cancelled;
                }
                Handled::Done
            }
            Err(error) => {
                ui.alert(ERROR_TITLE, &error.to_string());
                Handled::Failed
            }
        }
    }

    /// Ask before deleting. Only the confirming choice reaches the backend.
    pub async fn request_delete<P: Presenter>(&mut self, id: &NoteId, ui: &P) -> Handled {
        if !ui.confirm(&ConfirmPrompt::delete_note()).await {
            return Handled::Skipped;
        }

        let backend = Arc::clone(&self.backend);
        let Some(result) = self.scope.run(backend.delete_note(id)).await else {
            return Handled::Cancelled;
        };

        match result {
            Ok(()) => {
                tracing::info!(note_id = %id, "note deleted");
                if self.refresh(ui).await == Handled::Cancelled {
                    return Handled::Cancelled;
                }
                Handled::Done
            }
            Err(error) => {
                ui.alert(ERROR_TITLE, &error.to_string());
                Handled::Failed
            }
        }
    }

    pub fn open_note(&self, id: &NoteId, nav: &mut Navigator) {
        nav.push(Route::NoteDetail { id: id.clone() });
    }

    /// Sign out and go to login even when the backend call fails.
    pub async fn sign_out(&mut self, nav: &mut Navigator) -> Handled {
        let backend = Arc::clone(&self.backend);
        let Some(result) = self.scope.run(backend.sign_out()).await else {
            return Handled::Cancelled;
        };
        if let Err(error) = result {
            tracing::warn!("Sign-out failed: {}", error);
        }
        nav.reset(Route::Login);
        Handled::Done
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }
}
