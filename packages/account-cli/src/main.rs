//! Terminal front end for the Kavir Market account API.

mod session;
mod views;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Select};
use tracing_subscriber::EnvFilter;

use auth_flow::{entry_redirect, ApiClient, ApiConfig, Route, Session};

use crate::session::StoredSession;

#[derive(Parser)]
#[command(name = "account", about = "Kavir Market account client", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an email or phone number
    Login,
    /// Reset a forgotten password
    ResetPassword,
    /// Show or update the account profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Set the initial password on an OTP-only account
    SetPassword,
    /// Change the account password
    ChangePassword,
    /// Attach and verify an email address
    AddEmail,
    /// Forget the stored session
    Logout,
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Update,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("account_cli=info,auth_flow=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ApiConfig::from_env();
    let client = ApiClient::new(config.base_url.clone());
    let mut store = StoredSession::load();

    match cli.command {
        Some(command) => dispatch(command, &client, &config, &mut store).await,
        None => menu(&client, &config, &mut store).await,
    }
}

async fn dispatch(
    command: Commands,
    client: &ApiClient,
    config: &ApiConfig,
    store: &mut StoredSession,
) -> Result<()> {
    match command {
        Commands::Login => {
            if let Some(Route::Dashboard) =
                entry_redirect(Route::Login, store.is_authenticated())
            {
                println!("{}", "Already signed in.".dimmed());
                return views::profile::show(&session(client, store)).await;
            }
            views::login::run(client, config, store).await
        }
        Commands::ResetPassword => {
            if entry_redirect(Route::ForgotPassword, store.is_authenticated()).is_some() {
                println!("{}", "Already signed in. Use change-password instead.".dimmed());
                return Ok(());
            }
            views::reset::run(client).await
        }
        Commands::Profile { action } => {
            let session = require_session(client, store)?;
            match action {
                ProfileAction::Show => views::profile::show(&session).await,
                ProfileAction::Update => views::profile::update(&session).await,
            }
        }
        Commands::SetPassword => {
            let session = require_session(client, store)?;
            views::profile::set_password(&session).await
        }
        Commands::ChangePassword => {
            let session = require_session(client, store)?;
            views::profile::change_password(&session).await
        }
        Commands::AddEmail => {
            let session = require_session(client, store)?;
            views::profile::add_email(&session).await
        }
        Commands::Logout => {
            store.clear()?;
            println!("{}", "✓ Signed out.".green());
            Ok(())
        }
    }
}

async fn menu(client: &ApiClient, config: &ApiConfig, store: &mut StoredSession) -> Result<()> {
    let term = Term::stdout();
    term.clear_screen()?;
    println!("{}", "Kavir Market".bright_cyan().bold());

    let theme = ColorfulTheme::default();
    loop {
        println!();
        let authenticated = store.is_authenticated();
        let options: &[&str] = if authenticated {
            &[
                "Dashboard",
                "Update profile",
                "Change password",
                "Add an email address",
                "Sign out",
                "Exit",
            ]
        } else {
            &["Sign in", "Reset password", "Exit"]
        };

        let selection = Select::with_theme(&theme)
            .with_prompt("Kavir Market account")
            .items(options)
            .default(0)
            .interact()?;

        let result = if authenticated {
            match selection {
                0 => views::profile::show(&session(client, store)).await,
                1 => views::profile::update(&session(client, store)).await,
                2 => views::profile::change_password(&session(client, store)).await,
                3 => views::profile::add_email(&session(client, store)).await,
                4 => {
                    store.clear()?;
                    println!("{}", "✓ Signed out.".green());
                    Ok(())
                }
                _ => return Ok(()),
            }
        } else {
            match selection {
                0 => views::login::run(client, config, store).await,
                1 => views::reset::run(client).await,
                _ => return Ok(()),
            }
        };

        if let Err(err) = result {
            println!("{}", format!("✗ {err:#}").red());
        }
    }
}

fn session(client: &ApiClient, store: &StoredSession) -> Session {
    Session::new(client.clone(), store.refresh_token.clone())
}

/// The route-level gate for account-only commands.
fn require_session(client: &ApiClient, store: &StoredSession) -> Result<Session> {
    if entry_redirect(Route::Dashboard, store.is_authenticated()) == Some(Route::Login) {
        anyhow::bail!("not signed in; run `account login` first");
    }
    Ok(session(client, store))
}
