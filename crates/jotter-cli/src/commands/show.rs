use jotter_core::backend::NotesBackend;
use jotter_core::display::locale_from_env;

use crate::commands::common::{format_note_detail, normalize_note_identifier};
use crate::error::CliError;

pub async fn run_show<B: NotesBackend>(backend: &B, id: &str) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    let note = backend.fetch_note(&note_id).await?;
    println!("{}", format_note_detail(&note, locale_from_env()));
    Ok(())
}
