//! Export command implementation.

use anyhow::{Context, Result};
use soexport::export::write_ndjson;
use soexport::{Config, ExportOptions, Exporter, ObjectRef};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::open_store;

/// Export flags as given on the command line.
#[derive(Debug, Default)]
pub struct ExportArgs {
    pub types: Vec<String>,
    pub all_types: bool,
    pub search: Option<String>,
    pub namespace: Option<String>,
    pub objects: Vec<ObjectRef>,
    pub include_references_deep: bool,
    pub workspaces: Vec<String>,
    pub exclude_export_details: bool,
    pub size_limit: Option<usize>,
    pub request: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

fn load_request(path: &Path) -> Result<ExportOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid export request {}", path.display()))
}

/// Merge flags over the request file; flags win, the config fills the size limit.
fn build_options(args: &ExportArgs, base: ExportOptions, config: &Config) -> ExportOptions {
    let mut options = base;
    if !args.types.is_empty() {
        options.types = Some(args.types.clone());
    }
    if !args.objects.is_empty() {
        options.objects = Some(args.objects.clone());
    }
    if args.search.is_some() {
        options.search = args.search.clone();
    }
    if args.namespace.is_some() {
        options.namespace = args.namespace.clone();
    }
    if !args.workspaces.is_empty() {
        options.workspaces = Some(args.workspaces.clone());
    }
    options.include_references_deep |= args.include_references_deep;
    options.exclude_export_details |= args.exclude_export_details;

    options.export_size_limit = match (args.size_limit, options.export_size_limit) {
        (Some(flag), _) => Some(clamp_limit(flag)),
        (None, Some(requested)) => Some(requested),
        (None, None) => Some(clamp_limit(config.export.size_limit)),
    };
    options
}

fn clamp_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Run the export command.
pub async fn run_export(config: &Config, args: ExportArgs) -> Result<()> {
    let store = open_store(&config.store)?;

    let base = match &args.request {
        Some(path) => load_request(path)?,
        None => ExportOptions::default(),
    };
    let mut options = build_options(&args, base, config);
    if args.all_types {
        let types = store.types().await?;
        tracing::info!("Exporting all {} types", types.len());
        options.types = Some(types);
    }

    let exporter = Exporter::from_config(store.shared(), config);
    let stream = exporter.export(options).await.context("Export failed")?;

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    let report = write_ndjson(stream, writer).await?;

    let destination = args
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    eprintln!(
        "Exported {} objects to {}",
        report.objects_written, destination
    );
    if let Some(summary) = report.summary.filter(|s| s.missing_ref_count > 0) {
        eprintln!("Missing references ({}):", summary.missing_ref_count);
        for missing in &summary.missing_references {
            eprintln!("  {}", missing);
        }
    }

    Ok(())
}
