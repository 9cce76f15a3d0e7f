//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use docmap_core::{AdapterConfig, PrunePolicy};

/// docmap command-line interface.
#[derive(Debug, Parser)]
#[command(name = "docmap")]
#[command(version, about = "Compile selection queries and resolve record graphs")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a selection query into native filter and options documents.
    Compile {
        /// Selection query as JSON.
        #[arg(short, long)]
        query: String,
    },

    /// Run a query with eager loading against JSON fixture files.
    Find(FindArgs),
}

#[derive(Debug, clap::Args)]
pub struct FindArgs {
    /// Schema file (`{"mappers": [...]}`).
    #[arg(long)]
    pub schema: PathBuf,

    /// Data file (`{"collection": [record, ...]}`).
    #[arg(long)]
    pub data: PathBuf,

    /// Root mapper name.
    #[arg(short, long)]
    pub mapper: String,

    /// Selection query as JSON.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Relation name or dotted path to eager-load. Repeatable.
    #[arg(short, long = "with")]
    pub with: Vec<String>,

    /// Fields to return for root records. Repeatable.
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Treatment of eager-load entries outside a matched path.
    #[arg(long, value_enum, default_value = "blank")]
    pub prune: PruneArg,

    /// Identity field for mappers that do not declare one.
    #[arg(long, default_value = "id")]
    pub id_attribute: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PruneArg {
    /// Blank out unmatched entries.
    Blank,
    /// Drop unmatched entries.
    Drop,
}

impl From<PruneArg> for PrunePolicy {
    fn from(arg: PruneArg) -> Self {
        match arg {
            PruneArg::Blank => PrunePolicy::BlankUnmatched,
            PruneArg::Drop => PrunePolicy::DropUnmatched,
        }
    }
}

impl From<&FindArgs> for AdapterConfig {
    fn from(args: &FindArgs) -> Self {
        AdapterConfig::new()
            .with_prune_policy(args.prune.into())
            .with_default_id_attribute(args.id_attribute.clone())
    }
}
