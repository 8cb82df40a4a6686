// ============================
// crates/backend-bin/src/main.rs
// ============================
//! Tokio / Axum entry-point for the time-clock server.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use timeclock_backend::{
    config::Settings,
    directory::{FlatFileDirectory, NewEmployee},
    router::create_router,
    AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timeclock-server", about = "Employee time-clock service")]
struct Cli {
    /// Configuration file, layered under `TIMECLOCK_*` environment variables
    #[arg(long, global = true, default_value = "timeclock.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Create an employee record and print its number
    AddEmployee(AddEmployee),
}

#[derive(Args)]
struct AddEmployee {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    username: String,
    #[arg(long, default_value = "")]
    cell_phone_number: String,
    #[arg(long)]
    position: String,
    #[arg(long)]
    manager: bool,
    /// Manager's employee number
    #[arg(long)]
    manager_id: Option<u32>,
    /// Initial password; a temporary one is generated when omitted
    #[arg(long)]
    password: Option<String>,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

async fn serve(state: AppState, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    let addr = bind.unwrap_or(state.settings.bind_addr);
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn add_employee(state: AppState, args: AddEmployee) -> anyhow::Result<()> {
    let manager_id = match args.manager_id {
        Some(raw) => Some(
            timeclock_backend::validation::validate_employee_no(i64::from(raw))
                .context("invalid --manager-id")?,
        ),
        None => None,
    };

    let credential = state
        .auth
        .credentials()
        .provision(args.password.as_deref())
        .await?;

    let record = state
        .directory
        .insert(NewEmployee {
            first_name: args.first_name,
            last_name: args.last_name,
            username: args.username,
            cell_phone_number: args.cell_phone_number,
            position: args.position,
            is_manager: Some(args.manager),
            manager_id,
            password_hash: credential.password_hash,
        })
        .await?;

    println!("employee number: {}", record.employee_no);
    if let Some(temporary) = credential.temporary_password {
        println!("temporary password: {}", temporary.as_str());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    init_tracing(&settings);

    let directory = FlatFileDirectory::new(&settings.data_dir)
        .with_context(|| format!("failed to open data directory {}", settings.data_dir.display()))?;
    let state = AppState::new(Arc::new(directory), settings)?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(state, bind).await,
        Command::AddEmployee(args) => add_employee(state, args).await,
    }
}
