//! Backend selection for a CLI invocation.

use std::sync::Arc;

use jotter_core::auth::{AuthSession, AuthSubscription, AuthUser, SignUpOutcome};
use jotter_core::backend::{AuthBackend, InMemoryBackend, NotesBackend, SupabaseBackend};
use jotter_core::config::ClientConfig;
use jotter_core::models::{NewNote, NotePatch};
use jotter_core::{Note, NoteId, Result};

use crate::auth::KeyringSessionStore;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo";

/// Either the configured Supabase project or the in-process demo backend.
pub enum CliBackend {
    Supabase(SupabaseBackend<KeyringSessionStore>),
    Demo(InMemoryBackend),
}

impl CliBackend {
    /// Demo backend with one confirmed account, optionally already signed in.
    pub async fn demo(signed_in: bool) -> Result<Self> {
        let backend = InMemoryBackend::with_auto_confirm();
        backend.add_user(DEMO_EMAIL, DEMO_PASSWORD);
        if signed_in {
            backend.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await?;
        }
        Ok(Self::Demo(backend))
    }

    pub const fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }
}

/// Resolve the backend for `profile`. Profile values win over the environment.
pub fn open_supabase(
    profile: Option<&str>,
) -> std::result::Result<(String, CliBackend), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile);
    let client_config = match config.profile(&profile_name) {
        Some(profile) => profile.client_config()?,
        None => None,
    };
    let client_config = match client_config {
        Some(client_config) => client_config,
        None => ClientConfig::from_env()?.ok_or(CliError::NotConfigured)?,
    };

    tracing::debug!(
        profile = %profile_name,
        url = %client_config.supabase_url,
        "using Supabase backend"
    );
    let backend = SupabaseBackend::new(&client_config, KeyringSessionStore::new(&profile_name))?;
    Ok((profile_name, CliBackend::Supabase(backend)))
}

pub async fn open_backend(
    profile: Option<&str>,
    demo: bool,
    signed_in_demo: bool,
) -> std::result::Result<(String, Arc<CliBackend>), CliError> {
    if demo {
        tracing::info!("using in-memory demo backend");
        let backend = CliBackend::demo(signed_in_demo).await?;
        return Ok(("demo".to_string(), Arc::new(backend)));
    }
    let (profile_name, backend) = open_supabase(profile)?;
    Ok((profile_name, Arc::new(backend)))
}

impl AuthBackend for CliBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        match self {
            Self::Supabase(backend) => backend.sign_up(email, password).await,
            Self::Demo(backend) => backend.sign_up(email, password).await,
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        match self {
            Self::Supabase(backend) => backend.sign_in(email, password).await,
            Self::Demo(backend) => backend.sign_in(email, password).await,
        }
    }

    async fn sign_out(&self) -> Result<()> {
        match self {
            Self::Supabase(backend) => backend.sign_out().await,
            Self::Demo(backend) => backend.sign_out().await,
        }
    }

    async fn get_session(&self) -> Result<Option<AuthSession>> {
        match self {
            Self::Supabase(backend) => backend.get_session().await,
            Self::Demo(backend) => backend.get_session().await,
        }
    }

    async fn get_user(&self) -> Result<Option<AuthUser>> {
        match self {
            Self::Supabase(backend) => backend.get_user().await,
            Self::Demo(backend) => backend.get_user().await,
        }
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        match self {
            Self::Supabase(backend) => backend.on_auth_state_change(),
            Self::Demo(backend) => backend.on_auth_state_change(),
        }
    }
}

impl NotesBackend for CliBackend {
    async fn fetch_note(&self, id: &NoteId) -> Result<Note> {
        match self {
            Self::Supabase(backend) => backend.fetch_note(id).await,
            Self::Demo(backend) => backend.fetch_note(id).await,
        }
    }

    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        match self {
            Self::Supabase(backend) => backend.list_notes(user_id).await,
            Self::Demo(backend) => backend.list_notes(user_id).await,
        }
    }

    async fn insert_note(&self, note: &NewNote) -> Result<()> {
        match self {
            Self::Supabase(backend) => backend.insert_note(note).await,
            Self::Demo(backend) => backend.insert_note(note).await,
        }
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        match self {
            Self::Supabase(backend) => backend.update_note(id, patch).await,
            Self::Demo(backend) => backend.update_note(id, patch).await,
        }
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        match self {
            Self::Supabase(backend) => backend.delete_note(id).await,
            Self::Demo(backend) => backend.delete_note(id).await,
        }
    }
}
