//! Command line argument parsing for the Sagitta CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Sagitta - an embedded vector store
#[derive(Parser, Debug, Clone)]
#[command(name = "sagitta")]
#[command(about = "An embedded vector store with durable collections and similarity search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SagittaArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Directory collections are stored under
    #[arg(short, long, env = "SAGITTA_DATA_DIR", default_value = ".sagitta")]
    pub data_dir: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SagittaArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Output format for command results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a collection
    Create(CreateArgs),

    /// Add documents to a collection
    Add(AddArgs),

    /// Fetch documents by id or filter
    Get(GetArgs),

    /// Delete documents by id or filter
    Delete(DeleteArgs),

    /// Run a similarity search
    Search(SearchArgs),

    /// List all collections
    List,

    /// Show collection statistics
    Stats(StatsArgs),

    /// Drop a collection and its persisted snapshot
    Drop(DropArgs),
}

/// Arguments for creating a collection
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Distance metric (cosine, euclidean, dot)
    #[arg(short, long, default_value = "cosine")]
    pub metric: String,

    /// Expected vector dimension
    #[arg(short, long)]
    pub dimension: Option<usize>,
}

/// Arguments for adding documents
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Document file (JSON array or JSONL), one payload per document
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,

    /// Distance metric used if the collection does not exist yet
    #[arg(short, long, default_value = "cosine")]
    pub metric: String,
}

/// Arguments for fetching documents
#[derive(Parser, Debug, Clone)]
pub struct GetArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Document ids to fetch
    #[arg(short, long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Metadata filter as JSON, e.g. '{"source": "news"}'
    #[arg(short = 'w', long = "where")]
    pub r#where: Option<String>,
}

/// Arguments for deleting documents
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Document ids to delete
    #[arg(short, long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Metadata filter as JSON
    #[arg(short = 'w', long = "where")]
    pub r#where: Option<String>,
}

/// Search mode selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchModeArg {
    /// Plain similarity ranking
    Similarity,
    /// Maximal marginal relevance re-ranking
    Mmr,
}

/// Arguments for similarity search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Query vector as a JSON array, e.g. '[0.1, 0.2]'
    #[arg(long, conflicts_with = "text")]
    pub vector: Option<String>,

    /// Query text, embedded with the collection's embedder
    #[arg(short, long)]
    pub text: Option<String>,

    /// Number of results
    #[arg(short, long, default_value = "10")]
    pub k: usize,

    /// Metadata filter as JSON
    #[arg(short = 'w', long = "where")]
    pub r#where: Option<String>,

    /// Drop hits whose distance exceeds this threshold
    #[arg(short, long)]
    pub score_threshold: Option<f64>,

    /// Search mode
    #[arg(short, long, value_enum, default_value = "similarity")]
    pub mode: SearchModeArg,

    /// MMR relevance/diversity trade-off in [0, 1]
    #[arg(long, default_value = "0.5")]
    pub lambda: f64,

    /// MMR candidate pool size (defaults to max(4 * k, 20))
    #[arg(long)]
    pub fetch_k: Option<usize>,
}

/// Arguments for collection statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,
}

/// Arguments for dropping a collection
#[derive(Parser, Debug, Clone)]
pub struct DropArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,
}
