//! sqlprobe - run one SQL query and print its typed result as JSON.

use db_sqlprobe::cli::Cli;
use db_sqlprobe::config::{Config, DEFAULT_LOG_LEVEL};
use db_sqlprobe::error::{ProbeError, Result};
use db_sqlprobe::evaluator::Evaluator;
use db_sqlprobe::logging;
use db_sqlprobe::request::{QueryRequest, RequestFields};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let mut cli = Cli::parse_args();
    let config_path = cli.config_path();
    let config = Config::load_from_file(&config_path);

    let level = config
        .as_ref()
        .map(|c| c.probe.log_level.clone())
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    logging::init_stderr_logging(&level);
    info!("Loading config from: {}", config_path.display());

    // Returning normally drops every secret before the process exits.
    match config.and_then(|config| run(&mut cli, &config)) {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &mut Cli, config: &Config) -> Result<ExitCode> {
    let request = build_request(cli, config)?;

    // Evaluation failures are logged by the evaluator
    let evaluator = Evaluator::default().with_default_timeout(config.probe.connect_timeout);
    let Ok(item) = evaluator.evaluate_blocking(request) else {
        return Ok(ExitCode::FAILURE);
    };

    let json = item
        .to_json(cli.pretty)
        .map_err(|e| ProbeError::internal(format!("Failed to render output: {e}")))?;
    println!("{}", json.expose());

    Ok(ExitCode::SUCCESS)
}

/// Resolves the request with precedence:
/// 1. CLI arguments and environment variables (highest)
/// 2. Named request from config
fn build_request(cli: &mut Cli, config: &Config) -> Result<QueryRequest> {
    let mut fields = match cli.request_name() {
        Some(name) => config.get_request(name)?,
        None => RequestFields::default(),
    };
    fields.merge(cli.take_fields());
    fields.into_request()
}
