//! docmap command-line client.
//!
//! Compiles selection queries and runs eager-loading queries against JSON
//! fixtures held in an in-memory store.

mod args;
mod commands;

use args::{Args, Command};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let output = match &args.command {
        Command::Compile { query } => commands::compile_query(query)?,
        Command::Find(find) => commands::find(find).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
