//! Connecta CLI
//!
//! Terminal front end for Connecta event registration.
//!
//! # Usage
//!
//! ```bash
//! connecta register --flow tournament
//! connecta phone +201012345678 "+966 50 123 4567"
//! connecta draft show --flow exhibition
//! connecta dashboard --email admin@connecta.com stats
//! connecta import list.csv --batch-size 200
//! connecta config set api_url http://localhost:8090
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use connecta_forms::application::dashboard::{SortColumn, VerificationFilter};
use connecta_forms::FlowKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "connecta")]
#[command(author = "Connecta")]
#[command(version)]
#[command(about = "Connecta event registration from the terminal", long_about = None)]
struct Cli {
    /// Backend URL (overrides the config file)
    #[arg(long, env = "CONNECTA_API_URL")]
    api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Show error details on the recovery screen
    #[arg(long, env = "CONNECTA_DEV")]
    dev: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a registration form
    Register {
        #[arg(long, value_parser = parse_flow)]
        flow: FlowKind,
        /// Ignore any saved draft
        #[arg(long)]
        fresh: bool,
    },
    /// Validate phone numbers
    Phone {
        #[arg(required = true)]
        numbers: Vec<String>,
    },
    /// Inspect or discard saved drafts
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },
    /// Admin dashboard
    Dashboard {
        #[arg(long, env = "CONNECTA_ADMIN_EMAIL", default_value = "")]
        email: String,
        #[arg(long, env = "CONNECTA_ADMIN_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
        #[command(subcommand)]
        action: DashboardCommands,
    },
    /// Import schools and universities from a CSV file
    Import {
        file: std::path::PathBuf,
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Show the saved draft of a flow
    Show {
        #[arg(long, value_parser = parse_flow)]
        flow: FlowKind,
    },
    /// Delete the saved draft of a flow
    Clear {
        #[arg(long, value_parser = parse_flow)]
        flow: FlowKind,
    },
}

#[derive(Subcommand)]
enum DashboardCommands {
    /// Registration statistics
    Stats,
    /// List users
    Users {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        interest: Option<String>,
        #[arg(long)]
        education: Option<String>,
        #[arg(long)]
        game: Option<String>,
        #[arg(long, value_enum, default_value = "any")]
        status: StatusArg,
        #[arg(long, value_enum, default_value = "name")]
        sort: SortArg,
        #[arg(long)]
        desc: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Show the effective configuration
    Show,
    /// Initialize configuration
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Any,
    Verified,
    Unverified,
}

impl From<StatusArg> for VerificationFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Any => Self::Any,
            StatusArg::Verified => Self::Verified,
            StatusArg::Unverified => Self::Unverified,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Phone,
    Joined,
}

impl From<SortArg> for SortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::Phone => Self::Phone,
            SortArg::Joined => Self::Joined,
        }
    }
}

fn parse_flow(raw: &str) -> Result<FlowKind, String> {
    raw.parse().map_err(|e: connecta_forms::FormsError| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match config::Config::load(cli.profile.as_deref()) {
        Ok(config) => {
            let context = commands::Context::new(config, &cli);
            run(cli.command, context).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, context: commands::Context) -> anyhow::Result<()> {
    match command {
        Commands::Register { flow, fresh } => commands::register::handle(&context, flow, fresh).await,
        Commands::Phone { numbers } => commands::phone::handle(&context, &numbers),
        Commands::Draft { action } => commands::draft::handle(&context, action),
        Commands::Dashboard { email, password, action } => {
            commands::dashboard::handle(&context, &email, &password, action).await
        }
        Commands::Import { file, batch_size } => commands::import::handle(&context, &file, batch_size).await,
        Commands::Config { action } => commands::config::handle(&context, action),
    }
}
