mod args;
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use mailposture::{MonitorConfig, build_assembler, normalize_domain, run_monitor};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env("MAILPOSTURE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    // stdout carries the report
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let mut cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = MonitorConfig::load(cli.config.as_deref()).context("load configuration")?;
    cli.apply_to(&mut config);

    match cli.cmd.take().unwrap_or(Commands::Run) {
        Commands::Run => {
            let summary = run_monitor(&config).await?;
            output::write_summary(&summary, cli.format)?;
            // exit codes: 0 ok, 2 records not persisted, 1 fatal
            if summary.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))
            }
        }
        Commands::Assess { domain, agency } => {
            let fqdn = normalize_domain(&domain).with_context(|| format!("invalid domain '{domain}'"))?;
            let assembler = build_assembler(&config)?;
            let report = assembler.assess(&fqdn, &agency).await;
            output::write_report(&report, cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
