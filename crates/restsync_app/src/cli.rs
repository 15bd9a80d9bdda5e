use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use restsync_engine::{CreatePolicy, Reconciliation};

#[derive(Debug, Parser)]
#[command(
    name = "restsync",
    version,
    about = "Mirror a REST collection locally and aggregate paginated endpoints"
)]
pub(crate) struct Cli {
    /// RON configuration file; missing files fall back to defaults.
    #[arg(long, default_value = "restsync.ron")]
    pub config: PathBuf,

    /// Collection endpoint, e.g. http://localhost:8080/pets.
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long, value_enum)]
    pub create_policy: Option<CreateArg>,

    #[arg(long, value_enum)]
    pub reconciliation: Option<ReconciliationArg>,

    /// Also write logs to ./restsync.log.
    #[arg(long)]
    pub log_file: bool,

    /// Repeat for more detail (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Load the collection and print one entity per line.
    List,
    /// Create an entity from a JSON object without an id.
    Create { json: String },
    /// Delete an entity by id.
    Remove { id: String },
    /// Fetch pages 1..=N concurrently and print the flattened payload.
    Aggregate {
        #[arg(long)]
        pages: usize,
        /// Page URL with a `{page}` placeholder.
        #[arg(long)]
        url_template: String,
        /// JSON pointer to the payload array inside each page.
        #[arg(long, default_value = "/data")]
        pointer: String,
        /// Print only this field of every item.
        #[arg(long)]
        field: Option<String>,
        /// Overrides `max_concurrency` from the config file; 0 means unbounded.
        #[arg(long)]
        max_concurrency: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CreateArg {
    AppendReturned,
    Reload,
}

impl From<CreateArg> for CreatePolicy {
    fn from(arg: CreateArg) -> Self {
        match arg {
            CreateArg::AppendReturned => CreatePolicy::AppendReturned,
            CreateArg::Reload => CreatePolicy::Reload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReconciliationArg {
    Optimistic,
    Confirmed,
}

impl From<ReconciliationArg> for Reconciliation {
    fn from(arg: ReconciliationArg) -> Self {
        match arg {
            ReconciliationArg::Optimistic => Reconciliation::Optimistic,
            ReconciliationArg::Confirmed => Reconciliation::Confirmed,
        }
    }
}
