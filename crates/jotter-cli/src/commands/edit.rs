use jotter_core::backend::NotesBackend;
use jotter_core::models::{is_valid_title, NotePatch};
use jotter_core::screens::MSG_NOTE_SAVED;

use crate::commands::common::normalize_note_identifier;
use crate::error::CliError;

/// Fields left out keep their stored value.
pub async fn run_edit<B: NotesBackend>(
    backend: &B,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<(), CliError> {
    if title.is_none() && content.is_none() {
        return Err(CliError::NothingToEdit);
    }
    let note_id = normalize_note_identifier(id)?;
    let note = backend.fetch_note(&note_id).await?;

    let title = title.unwrap_or(note.title);
    if !is_valid_title(&title) {
        return Err(CliError::EmptyTitle);
    }
    let content = content.unwrap_or(note.content);

    backend
        .update_note(&note_id, &NotePatch::now(title, content))
        .await?;
    println!("{MSG_NOTE_SAVED}");
    Ok(())
}
