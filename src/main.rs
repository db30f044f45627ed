mod commands;
mod prompt;


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use parishat_client::config::ClientConfig;
use parishat_client::error::{ClientError, ErrorCode};
use parishat_client::net::api::{HttpApi, MembershipApi};
use parishat_client::net::exchange;
use parishat_client::net::storage::UPLOAD_FALLBACK;
use parishat_client::state::admin::{ACTION_FALLBACK, LOAD_FALLBACK};
use parishat_client::state::session::SessionStore;
use parishat_client::state::token::{FileTokenStore, TokenStore};
use parishat_client::state::wizard::SUBMIT_FALLBACK;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not signed in; run `parishat login` first")]
    NotSignedIn,
    #[error("access denied; redirected to {0}")]
    Redirected(&'static str),
    #[error("unknown route `{0}`")]
    UnknownRoute(String),
    #[error("no informational page `{0}`")]
    UnknownPage(String),
    #[error("invalid role `{0}` (expected PERMANENT, NORMAL, ASSOCIATED or HEAD)")]
    InvalidRole(String),
    #[error("cancelled")]
    Cancelled,
    /// The command already printed its failure.
    #[error("failure already reported")]
    Reported,
}

#[derive(Parser, Debug)]
#[command(name = "parishat", about = "Parishat membership client")]
struct Cli {
    #[arg(long, env = "PARISHAT_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "PARISHAT_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account (phone + PIN) and sign in.
    Register {
        phone: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, help = "4-digit PIN; prompted twice when omitted")]
        pin: Option<String>,
    },
    /// Sign in with phone + PIN.
    Login {
        phone: String,
        #[arg(long)]
        pin: Option<String>,
    },
    /// Sign in through the configured credential exchange.
    Verify {
        identifier: String,
        #[arg(long, help = "PIN or password; prompted when omitted")]
        secret: Option<String>,
    },
    Logout,
    Whoami,
    /// Show the latest membership application.
    Status,
    /// Fill in and submit a membership application.
    Apply {
        #[arg(long, help = "JSON draft to submit instead of prompting")]
        file: Option<PathBuf>,
    },
    /// Show the digital member ID card.
    Card,
    /// Print the access decision for a route.
    Route { path: String },
    /// Upload a photo or payment receipt and print its public URL.
    Upload {
        file: PathBuf,
        #[arg(long)]
        bucket: Option<String>,
    },
    SetPin,
    Admin(AdminCommand),
    /// Print an informational page, or the site map when no name is given.
    Pages { name: Option<String> },
}

impl Command {
    /// Message shown when a failure carries no displayable detail.
    fn fallback(&self) -> &'static str {
        match self {
            Self::Register { .. } => "Registration failed",
            Self::Login { .. } | Self::Verify { .. } => "Login failed",
            Self::Apply { .. } => SUBMIT_FALLBACK,
            Self::Upload { .. } => UPLOAD_FALLBACK,
            Self::Admin(AdminCommand { command: AdminSubcommand::Pending | AdminSubcommand::Show { .. } }) => {
                LOAD_FALLBACK
            }
            Self::Admin(_) => ACTION_FALLBACK,
            _ => "Request failed",
        }
    }
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    /// List pending membership requests.
    Pending,
    Show {
        user_id: Uuid,
    },
    Approve {
        user_id: Uuid,
        #[arg(long, help = "Grant this role instead of the requested one")]
        role: Option<String>,
    },
    Reject {
        user_id: Uuid,
    },
    CreateMember {
        phone: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, default_value = "NORMAL")]
        role: String,
        #[arg(long)]
        pin: Option<String>,
    },
    Unlock {
        user_id: Uuid,
    },
}

/// How often the token file is checked for sign-ins and sign-outs made by
/// other `parishat` processes.
const TOKEN_POLL: Duration = Duration::from_millis(500);

/// Everything a command needs, built once per invocation.
struct CliContext {
    config: ClientConfig,
    tokens: Arc<FileTokenStore>,
    api: Arc<HttpApi>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let fallback = cli.command.fallback();
    if let Err(e) = run(cli).await {
        if let CliError::Client(inner) = &e {
            tracing::debug!(code = inner.error_code(), retryable = inner.retryable(), error = %inner, "command failed");
        }
        if let Some(message) = error_message(&e, fallback) {
            eprintln!("error: {message}");
        }
        std::process::exit(1);
    }
}

/// The line printed for a failed command, or `None` when the command has
/// already shown it.
fn error_message(err: &CliError, fallback: &str) -> Option<String> {
    match err {
        CliError::Reported => None,
        CliError::Client(inner) => Some(inner.user_message(fallback)),
        other => Some(other.to_string()),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_owned();
    }
    if let Some(token_file) = cli.token_file {
        config.token_file = token_file;
    }

    let tokens = Arc::new(FileTokenStore::new(config.token_file.clone()));
    let api = Arc::new(HttpApi::new(&config, tokens.clone())?);
    let ctx = CliContext { config, tokens, api };

    // Static pages and route listings do not need a session.
    if let Command::Pages { name } = &cli.command {
        return commands::pages(name.as_deref());
    }

    let membership: Arc<dyn MembershipApi> = ctx.api.clone();
    let credential_exchange = exchange::from_config(&ctx.config, membership.clone())?;
    let token_store: Arc<dyn TokenStore> = ctx.tokens.clone();
    let handle = SessionStore::start(membership, token_store, credential_exchange).await;
    let session = handle.store();
    let watcher = Arc::clone(&ctx.tokens).watch(TOKEN_POLL);

    let result = match cli.command {
        Command::Register { phone, full_name, pin } => commands::register(session, &phone, &full_name, pin).await,
        Command::Login { phone, pin } => commands::login(session, &phone, pin).await,
        Command::Verify { identifier, secret } => commands::verify(session, &identifier, secret).await,
        Command::Logout => {
            session.sign_out().await;
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => commands::whoami(session),
        Command::Status => commands::status(&ctx, session).await,
        Command::Apply { file } => commands::apply(&ctx, session, file).await,
        Command::Card => commands::card(session),
        Command::Route { path } => commands::route(session, &path),
        Command::Upload { file, bucket } => commands::upload(&ctx, session, &file, bucket).await,
        Command::SetPin => commands::set_pin(session).await,
        Command::Admin(admin) => commands::admin(&ctx, session, admin.command).await,
        Command::Pages { .. } => Ok(()),
    };

    watcher.abort();
    handle.shutdown().await;
    result
}
