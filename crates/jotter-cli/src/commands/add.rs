use jotter_core::backend::Backend;
use jotter_core::models::{is_valid_title, NewNote};

use crate::commands::common::require_user;
use crate::error::CliError;

pub async fn run_add<B: Backend>(backend: &B, title: &str, content: &str) -> Result<(), CliError> {
    if !is_valid_title(title) {
        return Err(CliError::EmptyTitle);
    }
    let user = require_user(backend).await?;

    backend
        .insert_note(&NewNote {
            user_id: user.id,
            title: title.to_string(),
            content: content.to_string(),
        })
        .await?;

    tracing::info!("note created");
    println!("Created \"{title}\"");
    Ok(())
}
