//! Edit a single note.

use std::sync::Arc;

use chrono::Locale;

use super::{
    Handled, Navigator, Presenter, ScreenScope, ERROR_TITLE, MSG_ENTER_TITLE, MSG_NOTE_SAVED,
    SUCCESS_TITLE,
};
use crate::backend::NotesBackend;
use crate::display::{format_date_time, locale_from_env, to_local};
use crate::models::{is_valid_title, Note, NoteId, NotePatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Loading,
    Editing {
        title: String,
        content: String,
        /// "Last updated: ..." footer
        last_updated: String,
        saving: bool,
    },
}

pub struct NoteDetailScreen<B: NotesBackend> {
    backend: Arc<B>,
    scope: ScreenScope,
    locale: Locale,
    note_id: Option<NoteId>,
    note: Option<Note>,
    pub title: String,
    pub content: String,
    loading: bool,
    saving: bool,
}

impl<B: NotesBackend> NoteDetailScreen<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            scope: ScreenScope::new(),
            locale: locale_from_env(),
            note_id: None,
            note: None,
            title: String::new(),
            content: String::new(),
            loading: true,
            saving: false,
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
    pub const fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    pub async fn mount<P: Presenter>(
        &mut self,
        id: NoteId,
        nav: &mut Navigator,
        ui: &P,
    ) -> Handled {
        self.scope.reset();
        self.set_note_id(id, nav, ui).await
    }

    /// Load `id` unless it is already on screen.
    pub async fn set_note_id<P: Presenter>(
        &mut self,
        id: NoteId,
        nav: &mut Navigator,
        ui: &P,
    ) -> Handled {
        if self.note_id.as_ref() == Some(&id) && self.note.is_some() {
            return Handled::Skipped;
        }
        self.note_id = Some(id.clone());
        self.note = None;
        self.loading = true;

        let backend = Arc::clone(&self.backend);
        let result = self.scope.run(backend.fetch_note(&id)).await;
        self.loading = false;
        let Some(result) = result else {
            self.note_id = None;
            return Handled::Cancelled;
        };

        match result {
            Ok(note) => {
                self.title.clone_from(&note.title);
                self.content.clone_from(&note.content);
                self.note = Some(note);
                Handled::Done
            }
            Err(error) => {
                tracing::debug!(note_id = %id, "note fetch failed: {}", error);
                ui.alert(ERROR_TITLE, &error.to_string());
                nav.back();
                Handled::Failed
            }
        }
    }

    /// Write the edited title and content. The screen stays open either way.
    pub async fn save<P: Presenter>(&mut self, ui: &P) -> Handled {
        if self.saving {
            return Handled::Skipped;
        }
        let Some(id) = self.note_id.clone() else {
            return Handled::Skipped;
        };
        if !is_valid_title(&self.title) {
            ui.alert(ERROR_TITLE, MSG_ENTER_TITLE);
            return Handled::Rejected;
        }

        self.saving = true;
        let patch = NotePatch::now(self.title.clone(), self.content.clone());
        let backend = Arc::clone(&self.backend);
        let result = self.scope.run(backend.update_note(&id, &patch)).await;
        self.saving = false;
        let Some(result) = result else {
            return Handled::Cancelled;
        };

        match result {
            Ok(()) => {
                if let Some(note) = self.note.as_mut() {
                    note.title = patch.title;
                    note.content = patch.content;
                    note.updated_at = Some(patch.updated_at);
                }
                tracing::info!(note_id = %id, "note saved");
                ui.alert(SUCCESS_TITLE, MSG_NOTE_SAVED);
                Handled::Done
            }
            Err(error) => {
                ui.alert(ERROR_TITLE, &error.to_string());
                Handled::Failed
            }
        }
    }

    #[must_use]
    pub fn last_updated_label(&self) -> Option<String> {
        self.note.as_ref().map(|note| {
            format!(
                "Last updated: {}",
                format_date_time(&to_local(note.last_updated_at()), self.locale)
            )
        })
    }

    #[must_use]
    pub fn view(&self) -> DetailView {
        match self.last_updated_label() {
            Some(last_updated) if !self.loading => DetailView::Editing {
                title: self.title.clone(),
                content: self.content.clone(),
                last_updated,
                saving: self.saving,
            },
            _ => DetailView::Loading,
        }
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
    use crate::backend::{AuthBackend, BackendCall, InMemoryBackend};
    use crate::models::NewNote;
    use crate::screens::{RecordingPresenter, Route};

    async fn backend_with_note(content: &str) -> (Arc<InMemoryBackend>, Note) {
        let backend = Arc::new(InMemoryBackend::new());
        let user = backend.add_user("a@example.com", "secret");
        backend.sign_in("a@example.com", "secret").await.unwrap();
        backend
            .insert_note(&NewNote {
                user_id: user.id,
                title: "Draft".to_string(),
                content: content.to_string(),
            })
            .await
            .unwrap();
        let note = backend.all_notes().remove(0);
        backend.clear_calls();
        (backend, note)
    }

    fn nav_at(id: &NoteId) -> Navigator {
        let mut nav = Navigator::new();
        nav.reset(Route::Notes);
        nav.push(Route::NoteDetail { id: id.clone() });
        nav
    }

    fn screen(backend: &Arc<InMemoryBackend>) -> NoteDetailScreen<InMemoryBackend> {
        NoteDetailScreen::new(Arc::clone(backend)).with_locale(Locale::POSIX)
    }

    #[tokio::test]
    async fn mount_populates_fields_and_footer() {
        let (backend, note) = backend_with_note("body").await;
        let ui = RecordingPresenter::default();
        let mut nav = nav_at(&note.id);
        let mut detail = screen(&backend);
        assert_eq!(detail.view(), DetailView::Loading);

        assert_eq!(detail.mount(note.id.clone(), &mut nav, &ui).await, Handled::Done);
        assert_eq!(detail.title, "Draft");
        assert_eq!(detail.content, "body");
        assert_eq!(
            detail.last_updated_label(),
            Some(format!(
                "Last updated: {}",
                format_date_time(&to_local(note.created_at), Locale::POSIX)
            ))
        );
        assert!(matches!(detail.view(), DetailView::Editing { saving: false, .. }));
    }

    #[tokio::test]
    async fn fetch_failure_alerts_and_goes_back() {
        let (backend, _) = backend_with_note("").await;
        let ui = RecordingPresenter::default();
        let missing = NoteId::new("missing");
        let mut nav = nav_at(&missing);
        let mut detail = screen(&backend);

        assert_eq!(detail.mount(missing, &mut nav, &ui).await, Handled::Failed);
        assert_eq!(nav.history(), &[Route::Notes]);
        assert_eq!(
            ui.last_message().as_deref(),
            Some("JSON object requested, multiple (or no) rows returned")
        );
    }

    #[tokio::test]
    async fn saved_edit_is_visible_on_refetch() {
        let (backend, note) = backend_with_note("old").await;
        let ui = RecordingPresenter::default();
        let mut nav = nav_at(&note.id);
        let mut detail = screen(&backend);
        detail.mount(note.id.clone(), &mut nav, &ui).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        detail.content = "new content".to_string();
        assert_eq!(detail.save(&ui).await, Handled::Done);
        assert_eq!(ui.last_message().as_deref(), Some(MSG_NOTE_SAVED));
        assert_eq!(nav.current(), &Route::NoteDetail { id: note.id.clone() });

        let mut reopened = screen(&backend);
        reopened.mount(note.id.clone(), &mut nav, &ui).await;
        let stored = reopened.note().unwrap();
        assert_eq!(stored.content, "new content");
        assert!(stored.updated_at.unwrap() > stored.created_at);
    }

    #[tokio::test]
    async fn blank_title_is_rejected_without_update() {
        let (backend, note) = backend_with_note("").await;
        let ui = RecordingPresenter::default();
        let mut nav = nav_at(&note.id);
        let mut detail = screen(&backend);
        detail.mount(note.id.clone(), &mut nav, &ui).await;

        detail.title = "  ".to_string();
        assert_eq!(detail.save(&ui).await, Handled::Rejected);
        assert_eq!(ui.last_message().as_deref(), Some(MSG_ENTER_TITLE));
        assert!(!backend
            .calls()
            .iter()
            .any(|call| matches!(call, BackendCall::UpdateNote(_))));
    }

    #[tokio::test]
    async fn save_error_is_alerted_and_flag_cleared() {
        let (backend, note) = backend_with_note("").await;
        let ui = RecordingPresenter::default();
        let mut nav = nav_at(&note.id);
        let mut detail = screen(&backend);
        detail.mount(note.id.clone(), &mut nav, &ui).await;

        backend.fail_next_call("JWT expired");
        assert_eq!(detail.save(&ui).await, Handled::Failed);
        assert_eq!(ui.last_message().as_deref(), Some("JWT expired"));
        assert!(!detail.is_saving());
    }

    #[tokio::test]
    async fn changing_the_route_id_refetches() {
        let (backend, note) = backend_with_note("").await;
        let ui = RecordingPresenter::default();
        let mut nav = nav_at(&note.id);
        let mut detail = screen(&backend);
        detail.mount(note.id.clone(), &mut nav, &ui).await;

        assert_eq!(
            detail.set_note_id(note.id.clone(), &mut nav, &ui).await,
            Handled::Skipped
        );
        let other = NoteId::new("other");
        nav.push(Route::NoteDetail { id: other.clone() });
        detail.set_note_id(other, &mut nav, &ui).await;

        let fetches = backend
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::FetchNote(_)))
            .count();
        assert_eq!(fetches, 2);
    }

    #[tokio::test]
    async fn unmount_during_save_drops_the_result() {
        let (backend, note) = backend_with_note("").await;
        let ui = RecordingPresenter::default();
        let mut nav = nav_at(&note.id);
        let mut detail = screen(&backend);
        detail.mount(note.id.clone(), &mut nav, &ui).await;

        backend.set_latency(Some(Duration::from_millis(200)));
        detail.title = "Renamed".to_string();
        let scope = detail.scope();
        let (handled, ()) = tokio::join!(detail.save(&ui), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            scope.cancel();
        });

        assert_eq!(handled, Handled::Cancelled);
        assert!(ui.alerts().is_empty());
        assert_eq!(detail.note().unwrap().title, "Draft");
    }

    #[tokio::test]
    async fn remount_after_cancelled_save_can_save_again() {
        let (backend, note) = backend_with_note("").await;
        let ui = RecordingPresenter::default();
        let mut nav = nav_at(&note.id);
        let mut detail = screen(&backend);
        detail.mount(note.id.clone(), &mut nav, &ui).await;

        backend.set_latency(Some(Duration::from_millis(200)));
        detail.title = "Renamed".to_string();
        let scope = detail.scope();
        let (handled, ()) = tokio::join!(detail.save(&ui), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            scope.cancel();
        });
        assert_eq!(handled, Handled::Cancelled);
        assert!(!detail.is_saving());

        backend.set_latency(None);
        detail.mount(note.id.clone(), &mut nav, &ui).await;
        assert_eq!(detail.save(&ui).await, Handled::Done);
        assert_eq!(backend.all_notes()[0].title, "Renamed");
    }
}
