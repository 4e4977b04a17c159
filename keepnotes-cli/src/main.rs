use clap::Parser;
use keepnotes_cli::commands::{run, Cli};
use keepnotes_cli::configuration::CONFIGURATION;
use keepnotes_cli::telemetry::{get_subscriber, init_tracing};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let configuration = CONFIGURATION
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to read configuration: {}", e))?;
    init_tracing(get_subscriber(configuration));

    let repository = configuration.get_note_repository(cli.base_url.as_deref())?;
    let out = Arc::new(Mutex::new(std::io::stdout()));
    if run(cli.command, Arc::new(repository), out).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
