// dualvalue entry point.
//
// 1. Parse the command line
// 2. Initialize tracing (stderr, so reports on stdout stay clean)
// 3. Load config, run the command, write the report to stdout

use anyhow::Context;
use clap::Parser;
use dualvalue_app::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    init_tracing()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(args, &mut out)
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dualvalue=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
