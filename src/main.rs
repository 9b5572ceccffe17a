mod collectors;
mod config;
mod registry;
mod report;
mod state;

use clap::error::ErrorKind;
use clap::Parser;
use collectors::checks::collect;
use collectors::dataset::AnalyticsClient;
use config::{Config, ConfigError};
use state::CollectionOutcome;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const RENDER_FAILED: &str = r#"{"prtg":{"error":1,"text":"Sensor failed: can't render report"}}"#;

#[derive(Parser, Debug)]
#[command(name = "zfssa-sensor")]
#[command(version)]
struct Cli {
    /// JSON parameter blob handed over by PRTG, e.g.
    /// '{"params": "--host 10.0.0.5 -u root -p secret -i cpu,nfs3", "timeout": 60}'
    parameters: Option<String>,
    /// Print the names of all available checks and exit.
    #[arg(long)]
    list_checks: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let mut outcome = CollectionOutcome::new();
            fail(&mut outcome, ConfigError::from(err));
            emit(&mut outcome);
            return ExitCode::FAILURE;
        }
    };

    if cli.list_checks {
        for name in registry::names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let mut outcome = CollectionOutcome::new();
    let code = run(cli.parameters.as_deref(), &mut outcome).await;
    emit(&mut outcome);
    code
}

async fn run(parameters: Option<&str>, outcome: &mut CollectionOutcome) -> ExitCode {
    let cfg = match parameters
        .ok_or(ConfigError::MissingArgument)
        .and_then(Config::from_argument)
    {
        Ok(cfg) => cfg,
        Err(err) => {
            fail(outcome, err);
            return ExitCode::FAILURE;
        }
    };

    let client = match AnalyticsClient::new(&cfg) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "can't build HTTP client");
            outcome.add_error(format!("Sensor failed: {err}"));
            return ExitCode::FAILURE;
        }
    };

    info!(
        host = %cfg.host,
        timeout_secs = cfg.timeout_secs,
        verify_tls = cfg.verify_tls,
        "collecting appliance metrics"
    );

    match collect(&client, &cfg, outcome).await {
        Ok(failed) => {
            info!(
                channels = outcome.channels.len(),
                failed_checks = failed,
                clean = outcome.is_ok(),
                "collection finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            fail(outcome, err);
            ExitCode::FAILURE
        }
    }
}

fn fail(outcome: &mut CollectionOutcome, err: ConfigError) {
    error!(error = %err, "configuration rejected");
    outcome.add_error(err.to_string());
}

fn emit(outcome: &mut CollectionOutcome) {
    match report::render(outcome) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            error!(error = %err, "can't serialize report");
            println!("{RENDER_FAILED}");
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
