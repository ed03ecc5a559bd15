#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod config;
mod core;
mod error;
mod export;
mod prelude;
mod quantity;
mod tables;

use chrono::Utc;
use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    config::Config,
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();
    info!(version = crate_version!(), "starting…");

    let config = Config::load(&args.config, Utc::now().date_naive())?;

    // Dropping the command future aborts the in-flight request and the remaining windows.
    tokio::select! {
        result = run(&config, args.command) => result?,
        signal = shutdown_signal() => {
            let signal = signal?;
            warn!(signal, "interrupted");
            bail!("interrupted by {signal}");
        }
    }

    info!("done!");
    Ok(())
}

async fn run(config: &Config, command: Command) -> Result {
    match command {
        Command::Export(args) => cli::export(config, &args).await,
        Command::Plan => {
            cli::plan(config);
            Ok(())
        }
        Command::Show => cli::show(config).await,
    }
}

/// Resolve on Ctrl+C or SIGTERM, whichever comes first.
async fn shutdown_signal() -> Result<&'static str> {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.context("failed to install the Ctrl+C handler")?;
        Ok::<_, Error>("Ctrl+C")
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("failed to install the SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, Error>("SIGTERM")
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<&'static str>>();

    tokio::select! {
        signal = ctrl_c => signal,
        signal = terminate => signal,
    }
}
