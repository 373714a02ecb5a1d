//! Study Planner CLI
//!
//! Command-line front end for the study planner:
//! - Register and log in
//! - Show the current user
//! - Show the dashboard
//! - Check where a path would land

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use study_planner::config::{generate_default_config, Config, LoggingConfig};
use study_planner::dashboard::{
    render_json, DashboardAggregator, DashboardState, DashboardView, LoadOutcome,
};
use study_planner::{
    ApiClient, FileTokenStorage, IdentityOutcome, LoginForm, Navigator, RegisterForm, Route,
    SessionStore, StudyApi,
};

#[derive(Parser)]
#[command(name = "study-planner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Study planner client: track subjects, tasks and study sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides config and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Register {
        username: String,
        email: String,
        password: String,
    },

    /// Sign in
    Login { username: String, password: String },

    /// Sign out and forget the stored token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show progress, subjects, tasks and study sessions
    Dashboard,

    /// Show where navigating to a path would land
    Open {
        /// Path such as /dashboard or /login
        path: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);

    let format = cli.format;
    match cli.command {
        Commands::Config { output } => write_config(output.as_deref()),
        command => App::connect(&config)?.run(command, format).await,
    }
}

/// Session, API client and navigator shared by the session commands
struct App {
    session: SessionStore,
    api: Arc<ApiClient>,
    navigator: Navigator,
}

impl App {
    fn connect(config: &Config) -> anyhow::Result<Self> {
        let storage = FileTokenStorage::new(config.session.token_path());
        let session = SessionStore::restore(storage).context("Failed to restore session")?;
        let api = Arc::new(ApiClient::new(config.api.to_client_config(), session.clone())?);
        let navigator = Navigator::new(session.clone());

        tracing::debug!(base_url = api.base_url(), "Client ready");
        Ok(Self {
            session,
            api,
            navigator,
        })
    }

    async fn run(&self, command: Commands, format: OutputFormat) -> anyhow::Result<()> {
        match command {
            Commands::Register {
                username,
                email,
                password,
            } => {
                let mut form = RegisterForm::new(username, email, password);
                let route = form.submit(&*self.api, &self.session).await?;
                println!("Account created. Signed in as {}.", form.username);
                println!("Next: {}", self.navigator.navigate(route).await);
            }

            Commands::Login { username, password } => {
                let mut form = LoginForm::new(username, password);
                let route = form.submit(&*self.api, &self.session).await?;
                println!("Signed in as {}.", form.username);
                println!("Next: {}", self.navigator.navigate(route).await);
            }

            Commands::Logout => {
                self.session.logout().await;
                println!("Signed out.");
            }

            Commands::Whoami => match self.session.refresh_identity(&*self.api).await {
                IdentityOutcome::Verified => {
                    let user = self
                        .session
                        .user()
                        .await
                        .context("User missing after verification")?;
                    match format {
                        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                        OutputFormat::Text => {
                            println!("Username: {}", user.username);
                            println!("Email:    {}", user.email);
                            if let Some(created_at) = &user.created_at {
                                println!("Joined:   {}", created_at);
                            }
                        }
                    }
                }
                IdentityOutcome::Anonymous => println!("Not signed in."),
                IdentityOutcome::Rejected => bail!("Session expired. Please log in again."),
                IdentityOutcome::Stale => bail!("Session changed while checking identity"),
            },

            Commands::Dashboard => {
                show_dashboard(self, format).await?;
            }

            Commands::Open { path } => {
                let requested = Route::parse(&path);
                let landed = self.navigator.navigate(requested.clone()).await;
                match format {
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "requested": requested.path(), "route": landed.path() })
                    ),
                    OutputFormat::Text => match &landed {
                        Route::NotFound(path) => println!("{}: page not found", path),
                        route if *route != requested => {
                            println!("{} -> redirected to {}", requested, route)
                        }
                        route => println!("{}", route),
                    },
                }
            }

            Commands::Config { output } => write_config(output.as_deref())?,
        }

        Ok(())
    }
}

fn write_config(output: Option<&Path>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

async fn show_dashboard(app: &App, format: OutputFormat) -> anyhow::Result<()> {
    let App {
        session,
        api,
        navigator,
    } = app;

    if navigator.navigate(Route::Dashboard).await != Route::Dashboard {
        bail!("Not signed in. Run `study-planner login <username> <password>` first.");
    }

    let watcher = session.watch_identity(api.clone() as Arc<dyn StudyApi>);
    let follower = navigator.watch();

    let aggregator = DashboardAggregator::new(api.clone(), session.clone());
    let outcome = aggregator.load().await;

    watcher.abort();
    follower.abort();

    match outcome {
        LoadOutcome::Applied => {}
        LoadOutcome::SignedOut => {
            let route = navigator.sync().await;
            bail!("Session expired. Redirected to {}; please log in again.", route);
        }
        LoadOutcome::Discarded => bail!("Session changed while loading the dashboard"),
    }

    match aggregator.state().await {
        DashboardState::Ready(dashboard) => match format {
            OutputFormat::Json => println!("{}", render_json(&dashboard)?),
            OutputFormat::Text => print!("{}", DashboardView(dashboard.as_ref())),
        },
        DashboardState::Failed(message) => bail!(message),
        DashboardState::Loading => bail!("Dashboard did not finish loading"),
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("study_planner={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
