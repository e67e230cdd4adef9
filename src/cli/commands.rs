//! Command implementations for the Sagitta CLI.

use std::fs;
use std::time::Instant;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::collection::{CollectionConfig, Selector};
use crate::document::DocumentPayload;
use crate::error::{Result, SagittaError};
use crate::filter::Filter;
use crate::manager::CollectionManager;
use crate::query::SearchRequest;
use crate::vector::DistanceMetric;

/// Execute a CLI command.
pub fn execute_command(args: SagittaArgs) -> Result<()> {
    let manager = CollectionManager::new(&args.data_dir)?;

    let result = match &args.command {
        Command::Create(create_args) => create_collection(&manager, create_args.clone(), &args),
        Command::Add(add_args) => add_documents(&manager, add_args.clone(), &args),
        Command::Get(get_args) => get_documents(&manager, get_args.clone(), &args),
        Command::Delete(delete_args) => delete_documents(&manager, delete_args.clone(), &args),
        Command::Search(search_args) => search_collection(&manager, search_args.clone(), &args),
        Command::List => list_collections(&manager, &args),
        Command::Stats(stats_args) => show_stats(&manager, stats_args.clone(), &args),
        Command::Drop(drop_args) => drop_collection(&manager, drop_args.clone(), &args),
    };

    manager.close_all()?;
    result
}

/// Create a collection.
fn create_collection(
    manager: &CollectionManager,
    args: CreateArgs,
    cli_args: &SagittaArgs,
) -> Result<()> {
    let mut config = CollectionConfig::new(&args.collection)
        .with_metric(DistanceMetric::parse_str(&args.metric)?);
    if let Some(dimension) = args.dimension {
        config = config.with_dimension_hint(dimension);
    }

    let collection = manager.get_or_create(config, None)?;

    output_result(
        &format!("collection '{}' is ready", args.collection),
        &CollectionCreatedResult {
            name: collection.name().to_string(),
            metric: collection.metric().name().to_string(),
            dimension: collection.dimension(),
        },
        cli_args,
    )
}

/// Add documents from a JSON array or JSONL file.
fn add_documents(
    manager: &CollectionManager,
    args: AddArgs,
    cli_args: &SagittaArgs,
) -> Result<()> {
    let content = fs::read_to_string(&args.document_file)?;
    let payloads = parse_payloads(&content)?;

    let collection = match manager.open(&args.collection, None) {
        Ok(collection) => collection,
        Err(SagittaError::NotFound(_)) => manager.get_or_create(
            CollectionConfig::new(&args.collection)
                .with_metric(DistanceMetric::parse_str(&args.metric)?),
            None,
        )?,
        Err(e) => return Err(e),
    };

    let start_time = Instant::now();
    let ids = collection.add(payloads)?;
    let duration_ms = start_time.elapsed().as_millis() as u64;

    output_result(
        &format!(
            "added {} documents to '{}' in {duration_ms} ms",
            ids.len(),
            args.collection
        ),
        &DocumentAdditionResult {
            collection: args.collection,
            documents_added: ids.len(),
            ids,
            duration_ms,
        },
        cli_args,
    )
}

/// Fetch documents by id or filter.
fn get_documents(
    manager: &CollectionManager,
    args: GetArgs,
    cli_args: &SagittaArgs,
) -> Result<()> {
    let collection = manager.open(&args.collection, None)?;
    let selector = build_selector(args.ids, args.r#where.as_deref())?;
    let documents = collection.get(&selector)?;

    if cli_args.output_format == OutputFormat::Human {
        for document in &documents {
            println!("{}\t{}", document.id, document.text);
        }
    }

    output_result(
        &format!("{} documents", documents.len()),
        &GetResult {
            collection: args.collection,
            documents,
        },
        cli_args,
    )
}

/// Delete documents by id or filter.
fn delete_documents(
    manager: &CollectionManager,
    args: DeleteArgs,
    cli_args: &SagittaArgs,
) -> Result<()> {
    let collection = manager.open(&args.collection, None)?;
    let selector = build_selector(args.ids, args.r#where.as_deref())?;
    let documents_deleted = collection.delete(&selector)?;

    output_result(
        &format!("deleted {documents_deleted} documents from '{}'", args.collection),
        &DeletionResult {
            collection: args.collection,
            documents_deleted,
        },
        cli_args,
    )
}

/// Run a similarity search.
fn search_collection(
    manager: &CollectionManager,
    args: SearchArgs,
    cli_args: &SagittaArgs,
) -> Result<()> {
    let collection = manager.open(&args.collection, None)?;

    let vector = match (&args.vector, &args.text) {
        (Some(raw), _) => serde_json::from_str::<Vec<f64>>(raw).map_err(|e| {
            SagittaError::invalid_argument(format!("query vector is not a JSON array: {e}"))
        })?,
        (None, Some(text)) => collection.embed_text(text)?,
        (None, None) => {
            return Err(SagittaError::invalid_argument(
                "search requires --vector or --text",
            ));
        }
    };

    let mut request = SearchRequest::new(vector, args.k);
    if let Some(filter) = parse_where(args.r#where.as_deref())? {
        request = request.with_filter(filter);
    }
    if let Some(threshold) = args.score_threshold {
        request = request.with_score_threshold(threshold);
    }
    if args.mode == SearchModeArg::Mmr {
        let fetch_k = args.fetch_k.unwrap_or_else(|| (4 * args.k).max(20));
        request = request.with_mmr(args.lambda, fetch_k);
    }

    let start_time = Instant::now();
    let results = collection.query(&request)?;
    let duration_ms = start_time.elapsed().as_millis() as u64;

    let hits = results
        .hits
        .into_iter()
        .map(|hit| {
            Ok(HitOutput {
                id: hit.document.id,
                distance: hit.distance,
                text: hit.document.text,
                metadata: serde_json::to_value(&hit.document.metadata)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if cli_args.output_format == OutputFormat::Human {
        print_hits_human(&hits);
    }

    output_result(
        &format!("{} hits in {duration_ms} ms", hits.len()),
        &SearchOutput {
            collection: args.collection,
            hits,
            duration_ms,
        },
        cli_args,
    )
}

/// List all collections under the data directory.
fn list_collections(manager: &CollectionManager, cli_args: &SagittaArgs) -> Result<()> {
    let collections = manager.list_collections()?;

    if cli_args.output_format == OutputFormat::Human {
        for name in &collections {
            println!("{name}");
        }
    }

    output_result(
        &format!("{} collections", collections.len()),
        &ListResult { collections },
        cli_args,
    )
}

/// Show collection statistics.
fn show_stats(
    manager: &CollectionManager,
    args: StatsArgs,
    cli_args: &SagittaArgs,
) -> Result<()> {
    let collection = manager.open(&args.collection, None)?;
    let stats = collection.stats();

    match cli_args.output_format {
        OutputFormat::Human => {
            print_stats_human(&stats);
            Ok(())
        }
        OutputFormat::Json => output_result("", &stats, cli_args),
    }
}

/// Drop a collection and its persisted snapshot.
fn drop_collection(
    manager: &CollectionManager,
    args: DropArgs,
    cli_args: &SagittaArgs,
) -> Result<()> {
    manager.drop_collection(&args.collection)?;

    output_result(
        &format!("dropped collection '{}'", args.collection),
        &DropResult {
            name: args.collection,
        },
        cli_args,
    )
}

/// Parse payloads from a JSON array or JSONL content.
fn parse_payloads(content: &str) -> Result<Vec<DocumentPayload>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Ok(serde_json::from_str(line)?))
        .collect()
}

fn parse_where(raw: Option<&str>) -> Result<Option<Filter>> {
    match raw {
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw)?;
            Ok(Some(Filter::from_json(&value)?))
        }
        None => Ok(None),
    }
}

fn build_selector(ids: Vec<String>, r#where: Option<&str>) -> Result<Selector> {
    let mut selector = Selector::default();
    if !ids.is_empty() {
        selector.ids = Some(ids);
    }
    selector.filter = parse_where(r#where)?;
    Ok(selector)
}
