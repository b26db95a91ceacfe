use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use authgate::app::{App, Page};
use authgate::config::{ClientConfig, ConfigError};
use authgate::net::api::ApiError;
use authgate::pages::{FormOutcome, login, register};
use authgate::state::session::{SessionManager, SessionPhase};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Form(String),
}

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Log in, register and browse protected screens against the auth backend")]
struct Cli {
    #[arg(long, env = "AUTHGATE_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "AUTHGATE_STORAGE_PATH")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current session.
    Status,
    /// Navigate to a location and print the resulting screen.
    Open {
        #[arg(default_value = "/")]
        location: String,
    },
    /// Log in and print the screen the session lands on.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Location to return to after logging in.
        #[arg(long)]
        from: Option<String>,
    },
    /// Create an account, then log in with the same credentials.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// End the session, locally even if the backend is unreachable.
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    Ok(ClientConfig::with_overrides(cli.api_url.as_deref(), cli.storage.clone())?)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(&cli)?;
    tracing::debug!(api_url = %config.api_url, storage = %config.storage_path.display(), "configured");

    let session = SessionManager::from_config(&config)?;
    session.initialize().await;
    let app = App::new(session.clone());

    match cli.command {
        Command::Status => {
            print_status(&session);
            Ok(())
        }
        Command::Open { location } => {
            print_page(&app.navigate(&location));
            Ok(())
        }
        Command::Login { email, password, from } => {
            let outcome = login::submit(&session, &email, &password, from.as_deref()).await;
            follow(&app, outcome)
        }
        Command::Register { email, password, confirm_password } => {
            let outcome = register::submit(&session, &email, &password, &confirm_password).await;
            follow(&app, outcome)
        }
        Command::Logout => {
            let signal = session.logout().await;
            print_page(&app.navigate(signal.redirect_to));
            Ok(())
        }
    }
}

fn follow(app: &App, outcome: FormOutcome) -> Result<(), CliError> {
    match outcome {
        FormOutcome::Navigate(location) => {
            print_page(&app.navigate(&location));
            Ok(())
        }
        FormOutcome::Error(message) => Err(CliError::Form(message)),
    }
}

fn print_page(page: &Page) {
    if let Some(from) = &page.from {
        println!("[{}] (redirected from {from}; log in to continue)", page.location);
    } else {
        println!("[{}]", page.location);
    }
    println!();
    print!("{}", page.body);
}

fn print_status(session: &SessionManager) {
    let state = session.state();
    let phase = match state.phase {
        SessionPhase::Initializing => "initializing",
        SessionPhase::Unauthenticated => "signed out",
        SessionPhase::Authenticating => "signing in",
        SessionPhase::Authenticated => "signed in",
    };
    match (&state.user, state.is_authenticated()) {
        (Some(user), true) => println!("{phase} as {} ({})", user.email, user.id),
        _ => println!("{phase}"),
    }
}
