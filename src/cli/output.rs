//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{OutputFormat, SagittaArgs};
use crate::collection::CollectionStats;
use crate::document::Document;
use crate::error::Result;

/// Result structure for collection creation.
#[derive(Debug, Serialize)]
pub struct CollectionCreatedResult {
    pub name: String,
    pub metric: String,
    pub dimension: Option<usize>,
}

/// Result structure for document addition.
#[derive(Debug, Serialize)]
pub struct DocumentAdditionResult {
    pub collection: String,
    pub documents_added: usize,
    pub ids: Vec<String>,
    pub duration_ms: u64,
}

/// Result structure for document fetches.
#[derive(Debug, Serialize)]
pub struct GetResult {
    pub collection: String,
    pub documents: Vec<Document>,
}

/// Result structure for deletions.
#[derive(Debug, Serialize)]
pub struct DeletionResult {
    pub collection: String,
    pub documents_deleted: usize,
}

/// A single search hit in CLI output.
#[derive(Debug, Serialize)]
pub struct HitOutput {
    pub id: String,
    pub distance: f64,
    pub text: String,
    pub metadata: serde_json::Value,
}

/// Result structure for searches.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub collection: String,
    pub hits: Vec<HitOutput>,
    pub duration_ms: u64,
}

/// Result structure for listing collections.
#[derive(Debug, Serialize)]
pub struct ListResult {
    pub collections: Vec<String>,
}

/// Result structure for dropping a collection.
#[derive(Debug, Serialize)]
pub struct DropResult {
    pub name: String,
}

/// Print a command result in the selected output format.
///
/// Human mode prints the message followed by any detail lines the caller
/// already emitted; JSON mode serializes the payload.
pub fn output_result<T: Serialize>(message: &str, payload: &T, args: &SagittaArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => {
            let rendered = if args.pretty {
                serde_json::to_string_pretty(payload)?
            } else {
                serde_json::to_string(payload)?
            };
            println!("{rendered}");
        }
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
            }
        }
    }
    Ok(())
}

/// Print collection statistics in human format.
pub fn print_stats_human(stats: &CollectionStats) {
    println!("collection: {}", stats.name);
    println!("documents:  {}", stats.document_count);
    println!("metric:     {}", stats.metric);
    match stats.dimension {
        Some(dimension) => println!("dimension:  {dimension}"),
        None => println!("dimension:  (unset)"),
    }
}

/// Print search hits in human format.
pub fn print_hits_human(hits: &[HitOutput]) {
    if hits.is_empty() {
        println!("no results");
        return;
    }
    for (rank, hit) in hits.iter().enumerate() {
        let mut text: String = hit.text.chars().take(60).collect();
        if text.len() < hit.text.len() {
            text.push('…');
        }
        println!("{:>3}. {} (distance {:.6}) {}", rank + 1, hit.id, hit.distance, text);
    }
}
