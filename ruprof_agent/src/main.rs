//! Entry point for the sampler. Parses args and runs the tick loop.

use ruprof_agent::cli::{parse_args, Cli, USAGE};
use ruprof_agent::run_sampler;
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = match parse_args(env::args()) {
        Ok(Cli::Run(cfg)) => cfg,
        Ok(Cli::Help) => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(ExitCode::from(2));
        }
    };

    run_sampler(cfg).await?;
    Ok(ExitCode::SUCCESS)
}
