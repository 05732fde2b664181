mod cli;
mod commands;
mod error;
mod output;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use domru_api::SessionClient;
use domru_config::Config;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(domru_config::config_path);

    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "domru", &mut std::io::stdout());
            Ok(())
        }

        // Only touches the config file
        Command::Logout => commands::login::logout(&config_path, &cli.global),

        cmd => {
            let config = load_config(&config_path, &cli.global)?;
            let session = build_session(&config, &config_path)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &session, &config_path, &cli.global).await
        }
    }
}

/// Load the config file and apply CLI flag overrides.
fn load_config(path: &Path, global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config =
        domru_config::load_from(path).map_err(|e| CliError::from_config(e, path))?;

    if let Some(ref url) = global.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        config.timeout = timeout;
    }
    if global.insecure {
        config.insecure = true;
    }
    Ok(config)
}

/// Build the session client, signed in with the stored session if present.
fn build_session(config: &Config, path: &Path) -> Result<SessionClient, CliError> {
    let api_url = config.api_url().map_err(|e| CliError::from_config(e, path))?;
    let transport = config.transport().map_err(|e| CliError::from_config(e, path))?;

    let session = SessionClient::new(api_url, &transport)?;
    if let Some(credentials) = config.credentials() {
        session.set_credentials(credentials);
    }
    Ok(session)
}
