#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use knowyou::Config;
use knowyou::cli::Cli;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    rust_i18n::set_locale(&config.invitations.locale);

    knowyou::app::dispatch(cli, config).await
}
