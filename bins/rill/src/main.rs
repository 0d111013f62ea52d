mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rill_engine::pipeline::Pipeline;

use crate::cli::Cli;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.effective_config();

    let level = config
        .as_ref()
        .ok()
        .and_then(|c| c.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = match config {
        Ok(c) => c,
        Err(e) => return fail("failed to load config", e),
    };
    if let Err(e) = config.install_float_format() {
        return fail("failed to install float format", e);
    }

    let pipeline = match Pipeline::from_config(&config, Box::new(std::io::stdout())) {
        Ok(p) => p,
        Err(e) => return fail("failed to build pipeline", e),
    };

    match pipeline.run().await {
        Ok(summary) => {
            tracing::info!(
                records_read = summary.records_read,
                records_written = summary.records_written,
                lines_written = summary.lines_written,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail("pipeline failed", e),
    }
}

fn fail(what: &str, error: rill_engine::EngineError) -> ExitCode {
    tracing::error!(error = %error, "{what}");
    eprintln!("rill: {error}");
    ExitCode::FAILURE
}
