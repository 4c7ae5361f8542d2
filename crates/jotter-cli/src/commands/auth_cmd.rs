use chrono::DateTime;
use jotter_core::auth::SignUpOutcome;
use jotter_core::backend::AuthBackend;
use jotter_core::display::{format_date_time, locale_from_env, to_local};
use jotter_core::screens::MSG_CHECK_EMAIL;

use crate::cli::AuthCommands;
use crate::error::CliError;

pub async fn run_auth<B: AuthBackend>(
    backend: &B,
    command: AuthCommands,
    profile_name: &str,
) -> Result<(), CliError> {
    match command {
        AuthCommands::Register { email, password } => {
            match backend.sign_up(&email, &password).await? {
                SignUpOutcome::ConfirmationRequired => println!("{MSG_CHECK_EMAIL}"),
                SignUpOutcome::SignedIn(session) => {
                    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                    println!("Registered and signed in profile '{profile_name}' as {email_label}");
                }
            }
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            let session = backend.sign_in(&email, &password).await?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in profile '{profile_name}' as {email_label}");
            Ok(())
        }
        AuthCommands::Status => {
            if let Some(session) = backend.get_session().await? {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                let expires = DateTime::from_timestamp(session.expires_at, 0).map_or_else(
                    || session.expires_at.to_string(),
                    |value| format_date_time(&to_local(value), locale_from_env()),
                );
                println!(
                    "Profile '{profile_name}' is signed in as {email_label} (expires {expires})"
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            backend.sign_out().await?;
            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}
