//! `repolens` binary.
//!
//! ```text
//! repolens serve [--bind 127.0.0.1:3000]
//! repolens analyze https://github.com/owner/repo [--json]
//! repolens explain https://github.com/owner/repo [--level junior|mid|senior] [--path src]
//! repolens history [--clear]
//! ```

use anyhow::Result;
use clap::Parser;
use repolens_cli::command::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so streamed explanations on stdout stay clean.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.command.default_log_filter()),
    )
    .target(env_logger::Target::Stderr)
    .init();

    run(cli).await
}
