use std::env;

use jotter_core::config::{normalize_project_url, ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL};
use jotter_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            request_timeout_secs,
            no_activate,
        } => run_config_init(
            global_profile,
            supabase_url,
            supabase_anon_key,
            request_timeout_secs,
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn run_config_init(
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    request_timeout_secs: Option<u64>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged = merge_profile(
        &existing,
        supabase_url,
        supabase_anon_key,
        request_timeout_secs,
        |name| env::var(name).ok(),
    )?;
    *config.profile_mut_or_default(&profile_name) = merged;
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profile(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    let missing = missing_fields(profile);
    if missing.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `jotter auth login --email <email> --password <password>`."
        );
    } else {
        println!("Profile '{}' is missing: {}", profile_name, missing.join(", "));
    }

    Ok(())
}

/// Explicit flags win, then the environment, then what the profile already had.
pub fn merge_profile(
    existing: &CliProfile,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    request_timeout_secs: Option<u64>,
    lookup_env: impl Fn(&str) -> Option<String>,
) -> Result<CliProfile, CliError> {
    let supabase_url = normalize_text_option(supabase_url)
        .or_else(|| normalize_text_option(lookup_env(ENV_SUPABASE_URL)))
        .or_else(|| existing.supabase_url())
        .map(|url| normalize_project_url(&url))
        .transpose()?;
    let supabase_anon_key = normalize_text_option(supabase_anon_key)
        .or_else(|| normalize_text_option(lookup_env(ENV_SUPABASE_ANON_KEY)))
        .or_else(|| existing.supabase_anon_key());

    Ok(CliProfile {
        supabase_url,
        supabase_anon_key,
        request_timeout_secs: request_timeout_secs.or(existing.request_timeout_secs),
    })
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url().is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing.push("supabase_anon_key");
    }
    missing
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let Some(profile) = config.profile(&profile_name) else {
        println!("Profile '{profile_name}' is not configured.");
        return Ok(());
    };

    let active = config.active_profile.as_deref() == Some(profile_name.as_str());
    println!(
        "Profile '{profile_name}'{}",
        if active { " (active)" } else { "" }
    );
    println!(
        "  supabase_url: {}",
        profile.supabase_url().as_deref().unwrap_or("(unset)")
    );
    println!(
        "  supabase_anon_key: {}",
        profile
            .supabase_anon_key()
            .map_or("(unset)", |_| "(set)")
    );
    if let Some(secs) = profile.request_timeout_secs {
        println!("  request_timeout_secs: {secs}");
    }
    Ok(())
}
