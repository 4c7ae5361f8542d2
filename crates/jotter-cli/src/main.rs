//! Jotter CLI - personal notes stored in a Supabase project
//!
//! `jotter` with no subcommand opens the interactive terminal app; the
//! subcommands cover scripting and account management.

mod auth;
mod backend;
mod cli;
mod commands;
mod config_profiles;
mod error;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::backend::{open_backend, CliBackend, DEMO_EMAIL, DEMO_PASSWORD};
use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::app::run_app;
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::error::CliError;
use crate::terminal::{AssumeYes, Terminal, TerminalPresenter};

const LOG_DIRECTIVES: [&str; 2] = ["jotter_cli=info", "jotter_core=info"];

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command.unwrap_or(Commands::App) {
        Commands::App => {
            let (_, backend) = open_backend(profile, cli.demo, false).await?;
            if backend.is_demo() {
                println!("Demo mode: sign in as {DEMO_EMAIL} / {DEMO_PASSWORD}");
            }
            run_app(backend, &Terminal::stdin()).await?;
        }
        Commands::Auth { command } => {
            let (profile_name, backend) = open_backend(profile, cli.demo, false).await?;
            run_auth(backend.as_ref(), command, &profile_name).await?;
        }
        Commands::List { json } => {
            let backend = open_signed_in(profile, cli.demo).await?;
            run_list(backend.as_ref(), json).await?;
        }
        Commands::Add { title, content } => {
            let backend = open_signed_in(profile, cli.demo).await?;
            run_add(backend.as_ref(), &title, &content).await?;
        }
        Commands::Show { id } => {
            let backend = open_signed_in(profile, cli.demo).await?;
            run_show(backend.as_ref(), &id).await?;
        }
        Commands::Edit { id, title, content } => {
            let backend = open_signed_in(profile, cli.demo).await?;
            run_edit(backend.as_ref(), &id, title, content).await?;
        }
        Commands::Delete { id, yes } => {
            let backend = open_signed_in(profile, cli.demo).await?;
            if yes {
                run_delete(backend.as_ref(), &id, &AssumeYes).await?;
            } else {
                let terminal = Terminal::stdin();
                run_delete(backend.as_ref(), &id, &TerminalPresenter::new(&terminal)).await?;
            }
        }
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}

/// One-shot note commands against a demo backend start signed in.
async fn open_signed_in(
    profile: Option<&str>,
    demo: bool,
) -> Result<std::sync::Arc<CliBackend>, CliError> {
    let (_, backend) = open_backend(profile, demo, true).await?;
    Ok(backend)
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in LOG_DIRECTIVES {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
