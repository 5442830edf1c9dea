// Composition root: wires adapters, session service and transport together

use anyhow::Result;
use clap::Parser;
use lgit::adapters::{FileRecentStore, GitAdapter};
use lgit::cli::CliArgs;
use lgit::config::Config;
use lgit::services::{RepositorySession, SessionService};
use lgit::transport;
use lgit_core::app::Command;
use lgit_core::domain::Outcome;
use lgit_core::ports::RecentStore;
use lgit_core::protocol::Request;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn setup_logging(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let config = Config::from_cli_and_file(&cli_args, cli_args.config.clone())?;
    setup_logging(&config.log.filter);

    let cwd = std::env::current_dir()?;
    let recent_store = Arc::new(FileRecentStore::with_path(config.data_file_path(&cwd)));

    if cli_args.list_recent {
        for path in recent_store.load()?.paths() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let provider = Arc::new(GitAdapter::with_options(config.git_options()));
    let mut session = RepositorySession::new(provider, recent_store);

    if let Some(path) = &cli_args.open {
        let command = Command::open(path.to_string_lossy()).with_cwd(cwd.to_string_lossy());
        let request = Request::new(0, command);
        if let Outcome::Failure { code, message } = session.dispatch(&request).result {
            error!("Could not open {}: {}: {}", path.display(), code, message);
        }
    }

    let (service, handle) = SessionService::new(session);
    let service_task = tokio::spawn(service.run());

    info!("Serving requests on stdin");
    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = transport::serve(stdin, tokio::io::stdout(), handle).await {
        error!("Transport failed: {:#}", e);
        return Err(e);
    }

    service_task.await??;
    info!("lgit shut down cleanly");
    Ok(())
}
