use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use ride_client::config::resolve_config;
use ride_client::http::RequestConfig;
use ride_client::lifecycle::Shutdown;
use ride_client::observability::logging;
use ride_client::session::{spawn_session_guard, Credentials, SessionStore};
use ride_client::{Actor, ApiClients};

#[derive(Parser)]
#[command(name = "ride-client")]
#[command(about = "Authenticated API client for the ride platform", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which API surface to talk to.
    #[arg(short, long, value_enum, default_value_t = ActorArg::Passenger)]
    actor: ActorArg,

    /// Overrides the configured and VITE_API_BASE_URL base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Log in with these credentials before running the command.
    #[arg(long, requires = "password")]
    email: Option<String>,

    #[arg(long, requires = "email")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActorArg {
    Passenger,
    Driver,
}

impl From<ActorArg> for Actor {
    fn from(arg: ActorArg) -> Self {
        match arg {
            ActorArg::Passenger => Actor::Passenger,
            ActorArg::Driver => Actor::Driver,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the user
    Login,
    /// Load the current user profile
    Profile,
    /// GET a path
    Get { path: String },
    /// POST a JSON body to a path
    Post {
        path: String,
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Log out
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.base_url.as_deref())?;
    logging::init(&config.observability);

    let actor = Actor::from(cli.actor);
    let clients = ApiClients::from_config(&config)?;
    let store = Arc::new(SessionStore::new(clients.get(actor).clone()));

    let shutdown = Shutdown::new();
    let guard = spawn_session_guard(store.clone(), shutdown.subscribe());

    let credentials = match (cli.email, cli.password) {
        (Some(email), Some(password)) => Some(Credentials::new(email, password)),
        _ => None,
    };
    if let (Some(credentials), false) = (&credentials, matches!(cli.command, Commands::Login)) {
        store.login(credentials).await?;
    }

    let result: Result<Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Login => match &credentials {
            Some(credentials) => store.login(credentials).await.map_err(Into::into),
            None => Err("login requires --email and --password".into()),
        },
        Commands::Profile => store.load_profile().await.map_err(Into::into),
        Commands::Get { path } => store
            .request(RequestConfig::get(path))
            .await
            .map(|response| response.body)
            .map_err(Into::into),
        Commands::Post { path, data } => {
            let body: Value = match data {
                Some(raw) => serde_json::from_str(&raw)?,
                None => Value::Null,
            };
            store
                .request(RequestConfig::post(path).json(body))
                .await
                .map(|response| response.body)
                .map_err(Into::into)
        }
        Commands::Logout => store.logout().await.map(|_| Value::Null).map_err(Into::into),
    };

    shutdown.trigger();
    if let Err(e) = guard.await {
        tracing::error!(error = %e, "Session guard task failed");
    }

    let state = store.state();
    if let Some(notice) = state.notice {
        eprintln!("Notice: {}", serde_json::to_string(&notice)?);
    }

    match result {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
