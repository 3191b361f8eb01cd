//! Entry point for the chart renderer. Parses args and draws the charts.

use anyhow::Context;
use ruprof::app::App;
use ruprof::cli::{parse_args, Cli, USAGE};
use ruprof::groups::resolve_groups;
use ruprof::{build_charts, render_charts, OutputTarget, RasterSize, SampleTable};
use std::env;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args()) {
        Ok(Cli::Run(args)) => args,
        Ok(Cli::Help) => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(ExitCode::from(2));
        }
    };

    let table = SampleTable::load(&args.samples)
        .with_context(|| format!("loading samples from {}", args.samples.display()))?;
    info!(rows = table.rows(), columns = table.columns().len(), "samples loaded");

    let groups = resolve_groups(args.group_config.as_deref(), &table);
    let charts = build_charts(&table, &groups, args.mode);

    match &args.output {
        OutputTarget::Interactive => {
            let source = args.samples.display().to_string();
            App::new(charts, source).run().await?;
        }
        target => {
            render_charts(&charts, target, RasterSize::from_env())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
