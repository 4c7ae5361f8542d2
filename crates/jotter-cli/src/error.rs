use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] jotter_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Please enter a title")]
    EmptyTitle,
    #[error("Nothing to change. Pass --title and/or --content.")]
    NothingToEdit,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Not signed in. Run `jotter auth login --email <email> --password <password>` first."
    )]
    NotSignedIn,
    #[error(
        "Supabase is not configured. Run `jotter config init` or set SUPABASE_URL and SUPABASE_ANON_KEY."
    )]
    NotConfigured,
}
