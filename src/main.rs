//! am-silence-ctl - create or delete Alertmanager silences

use am_silence_ctl::cli::Cli;
use am_silence_ctl::{app, Config, Endpoints, HostIdentity, SilenceClient, DEFAULT_TIMEOUT};
use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());
    let host = HostIdentity::detect();
    let endpoints = Endpoints::from_base_url(&config.alertmanager_url);

    let client = match SilenceClient::new(endpoints, DEFAULT_TIMEOUT) {
        Ok(client) => client,
        Err(e) => {
            error!(class = %e.class(), error = %e, "Failed to set up Alertmanager client");
            return ExitCode::FAILURE;
        }
    };

    match app::run(&cli.invocation(), &config, &host, &client).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(class = %e.class(), error = %e, "Silence operation failed");
            ExitCode::FAILURE
        }
    }
}
