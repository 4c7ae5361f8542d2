use jotter_core::backend::NotesBackend;
use jotter_core::screens::{ConfirmPrompt, Presenter};

use crate::commands::common::normalize_note_identifier;
use crate::error::CliError;

pub async fn run_delete<B: NotesBackend, P: Presenter>(
    backend: &B,
    id: &str,
    ui: &P,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    if !ui.confirm(&ConfirmPrompt::delete_note()).await {
        println!("Cancelled");
        return Ok(());
    }

    backend.delete_note(&note_id).await?;
    println!("{note_id}");
    Ok(())
}
