use jotter_core::backend::Backend;
use jotter_core::display::locale_from_env;

use crate::commands::common::{format_note_lines, note_to_list_item, require_user, NoteListItem};
use crate::error::CliError;

pub async fn run_list<B: Backend>(backend: &B, as_json: bool) -> Result<(), CliError> {
    let user = require_user(backend).await?;
    let notes = backend.list_notes(&user.id).await?;

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("{}", jotter_core::screens::MSG_NO_NOTES);
    } else {
        for line in format_note_lines(&notes, locale_from_env()) {
            println!("{line}");
        }
    }

    Ok(())
}
