mod app;
mod classifier;
mod cli;
mod config;
mod domain;
mod infrastructure;
mod store;
mod tasks;
mod transport;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use infrastructure::{directories, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let app = app::TriageApp::initialize(config, paths)?;
    app.run(cli).await
}
