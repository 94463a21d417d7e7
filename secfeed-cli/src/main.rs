mod cli;

use std::process::ExitCode;

use clap::Parser;
use secfeed_core::{run, HttpFeedSource, Mode};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mode = Mode::from(cli.command);
    let config = cli.app_config()?;
    let source = HttpFeedSource::new(&config.fetch_config())?;

    let mut stdout = std::io::stdout().lock();
    let report = run(mode, &config, &source, &mut stdout).await?;
    info!(
        %mode,
        cached = report.was_cached,
        discovered = report.discovered,
        matched = report.matched,
        pages = report.pages.len(),
        "run complete"
    );
    Ok(())
}

/// Top-level message only: every error in this crate already embeds its cause.
fn diagnostic(err: &anyhow::Error) -> String {
    format!("sec-feed: {err}")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
