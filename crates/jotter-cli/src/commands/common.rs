use chrono::{Locale, SecondsFormat};
use jotter_core::auth::AuthUser;
use jotter_core::backend::AuthBackend;
use jotter_core::display::{format_date, format_date_time, to_local};
use jotter_core::{Note, NoteId};
use serde::Serialize;

use crate::error::CliError;

const PREVIEW_CHARS: usize = 40;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note_preview(note, PREVIEW_CHARS * 2),
        content: note.content.clone(),
        created_at: note.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        updated_at: note
            .updated_at
            .map(|value| value.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}

pub fn format_note_lines(notes: &[Note], locale: Locale) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let title = truncate(&note.title, 24);
            let preview = note_preview(note, PREVIEW_CHARS);
            let created = format_date(&to_local(note.created_at), locale);
            format!("{}  {title:<24}  {preview:<40}  {created}", note.id)
        })
        .collect()
}

pub fn format_note_detail(note: &Note, locale: Locale) -> String {
    let updated = format_date_time(&to_local(note.last_updated_at()), locale);
    let mut rendered = format!("{}\n\n", note.title);
    if !note.content.is_empty() {
        rendered.push_str(&note.content);
        rendered.push_str("\n\n");
    }
    rendered.push_str(&format!("Last updated: {updated}"));
    rendered
}

/// First content line with whitespace collapsed.
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect::<String>();
    truncated.push_str("...");
    truncated
}

pub fn normalize_note_identifier(id: &str) -> Result<NoteId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(NoteId::new(trimmed))
    }
}

pub async fn require_user<B: AuthBackend>(backend: &B) -> Result<AuthUser, CliError> {
    backend.get_user().await?.ok_or(CliError::NotSignedIn)
}
