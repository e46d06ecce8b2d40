//! pdfforge - Split and merge PDF documents page by page.
//!
//! A command-line front-end over the pdfforge workspace.

mod cli;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::cli::{Cli, Command, HistoryCommand, SplitArgs, StoreArg};
use pdfforge::config::{Config, StoreConfig};
use pdfforge::document::{Upload, validate_upload};
use pdfforge::identity::OwnerId;
use pdfforge::io::PdfReader;
use pdfforge::output::{OutputFormatter, describe_record, format_file_size};
use pdfforge::utils::collect_paths_for_patterns;
use pdfforge::workspace::{OperationOutcome, RemoteDeletion, Workspace};
use pdfforge::{PdfForgeError, Result};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);

    // Run the application and handle errors
    if let Err(err) = run(cli, &formatter).await {
        formatter.error(&format!("Error: {err}"));
        process::exit(err.exit_code());
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level chosen by `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "pdfforge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let config = load_config(&cli)?;

    if let Command::Info { file } = &cli.command {
        return info(file, &config, formatter).await;
    }

    let mut workspace = Workspace::from_config(config).await?;
    if let Some(user) = &cli.user {
        workspace.identity().sign_in(OwnerId::new(user.as_str()));
    }
    formatter.debug(&format!("Acting as {}", workspace.identity().current()));

    match cli.command {
        Command::Info { .. } => Ok(()),
        Command::Split(args) => split(&mut workspace, args, formatter).await,
        Command::Merge { inputs, output } => merge(&mut workspace, inputs, output, formatter).await,
        Command::Thumbnails { file, out_dir, .. } => {
            thumbnails(&mut workspace, &file, &out_dir, formatter).await
        }
        Command::History(HistoryCommand::List) => history_list(&workspace, formatter).await,
        Command::History(HistoryCommand::Delete { id }) => {
            history_delete(&mut workspace, &id, formatter).await
        }
    }
}

/// Build the configuration: file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };

    match cli.store {
        Some(StoreArg::Memory) => config.store = StoreConfig::Memory,
        Some(StoreArg::Remote) => {
            let (Some(base_url), Some(api_key)) = (&cli.store_url, &cli.store_key) else {
                return Err(PdfForgeError::invalid_config(
                    "--store remote needs --store-url and --store-key",
                ));
            };
            let table = match &config.store {
                StoreConfig::Remote { table, .. } => table.clone(),
                StoreConfig::Memory => "processed_files".to_string(),
            };
            config.store = StoreConfig::Remote {
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                table,
            };
        }
        None => {}
    }

    if let Some(file) = &cli.guest_file {
        config.guest_usage_file = Some(file.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Command::Thumbnails { width: Some(width), .. } = &cli.command {
        config.thumbnail_width = *width;
    }

    config
        .validate()
        .map_err(|e| PdfForgeError::invalid_config(e.to_string()))?;
    Ok(config)
}

async fn info(file: &Path, config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let upload = Upload::from_path(file).await?;
    validate_upload(&upload, config.max_upload_bytes)?;

    let bytes = upload.content.read().await?;
    let info = PdfReader::new().inspect(&upload.name, bytes).await?;

    formatter.info(&upload.name);
    formatter.detail("Pages", &info.page_count.to_string());
    formatter.detail("Version", &info.version);
    if let Some((width, height)) = info.first_page_size {
        formatter.detail("Page size", &format!("{width:.0} x {height:.0} pt"));
    }
    formatter.detail("Size", &format_file_size(info.byte_size));
    formatter.debug(&format!("{} objects", info.object_count));
    Ok(())
}

async fn split(workspace: &mut Workspace, args: SplitArgs, formatter: &OutputFormatter) -> Result<()> {
    let document = workspace.upload(Upload::from_path(&args.file).await?).await?;
    let mut editor = workspace.open_editor(document.id())?;

    if let Some(expression) = &args.pages {
        let selection = editor.apply_range(expression);
        formatter.debug(&format!("Range selects pages {}", selection.describe()));
    } else if let Some(order) = &args.order {
        for &page in order {
            if !editor.selection().contains(page) {
                editor.toggle(page)?;
            }
        }
    }
    if let Some(name) = &args.output {
        editor.set_output_name(name)?;
    }

    formatter.info(&format!(
        "Splitting {} page(s) out of {}",
        editor.selection().len(),
        document.name()
    ));
    let outcome = workspace.split(&editor).await?;
    report_outcome(&outcome, formatter);
    Ok(())
}

/// Expand glob patterns, keeping the order they were given in.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let patterns: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
    collect_paths_for_patterns(&patterns)
}

async fn merge(
    workspace: &mut Workspace,
    inputs: Vec<PathBuf>,
    output: Option<String>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let paths = expand_inputs(&inputs)?;

    let mut uploads = Vec::with_capacity(paths.len());
    for path in &paths {
        uploads.push(Upload::from_path(path).await?);
    }

    // Every input must load; a merge never skips a bad file.
    let mut ids = Vec::with_capacity(uploads.len());
    for (_, result) in workspace.upload_many(uploads).await {
        ids.push(result?.id());
    }

    let mut plan = workspace.plan_merge(&ids)?;
    if let Some(name) = &output {
        plan.set_output_name(name)?;
    }

    formatter.info(&format!(
        "Merging {} file(s), {} page(s)",
        plan.len(),
        plan.total_pages()
    ));
    let outcome = workspace.merge(&plan).await?;
    report_outcome(&outcome, formatter);
    Ok(())
}

fn report_outcome(outcome: &OperationOutcome, formatter: &OutputFormatter) {
    formatter.success(&format!(
        "Created {} ({} pages, {})",
        outcome.artifact.output_path.display(),
        outcome.processed.result_page_count,
        outcome.artifact.format_file_size()
    ));
    formatter.debug(&format!("Record id {}", outcome.processed.id));

    for warning in &outcome.warnings {
        formatter.warning(&format!("Not saved to history: {warning}"));
    }
}

async fn thumbnails(
    workspace: &mut Workspace,
    file: &Path,
    out_dir: &Path,
    formatter: &OutputFormatter,
) -> Result<()> {
    let document = workspace.upload(Upload::from_path(file).await?).await?;
    let editor = workspace.open_editor(document.id())?;

    let report = workspace.render_thumbnails(&editor).await;

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    tokio::fs::create_dir_all(out_dir).await?;

    for entry in editor.grid().snapshot() {
        let Some(thumbnail) = entry.thumbnail else {
            formatter.warning(&format!("Page {} has no preview", entry.page_number));
            continue;
        };
        let path = out_dir.join(format!("{stem}_p{}.png", entry.page_number));
        tokio::fs::write(&path, &thumbnail.png).await?;
        formatter.debug(&format!(
            "{} ({}x{})",
            path.display(),
            thumbnail.width,
            thumbnail.height
        ));
    }

    formatter.success(&format!(
        "Rendered {} of {} page(s) into {}",
        report.rendered,
        report.rendered + report.failed,
        out_dir.display()
    ));
    Ok(())
}

async fn history_list(workspace: &Workspace, formatter: &OutputFormatter) -> Result<()> {
    let view = workspace.history().await;
    if let Some(warning) = &view.warning {
        formatter.warning(&format!("History store unavailable, showing this session only: {warning}"));
    }

    if view.entries.is_empty() {
        formatter.info("No processed documents");
        return Ok(());
    }
    for (index, record) in view.entries.iter().enumerate() {
        formatter.list_item(index + 1, &describe_record(record));
        formatter.debug(&format!("id {}", record.id));
    }
    Ok(())
}

async fn history_delete(workspace: &mut Workspace, id: &str, formatter: &OutputFormatter) -> Result<()> {
    let id = Uuid::parse_str(id.trim())
        .map_err(|_| PdfForgeError::not_found("Processed document", id))?;
    let outcome = workspace.delete_processed(id).await?;

    match outcome.remote {
        RemoteDeletion::Deleted => formatter.success(&format!("Deleted {id}")),
        RemoteDeletion::Skipped => formatter.success(&format!("Removed {id} from this session")),
        RemoteDeletion::Failed(e) => {
            if outcome.removed_locally {
                formatter.warning(&format!("Removed {id} locally, remote delete failed: {e}"));
            } else {
                return Err(e);
            }
        }
    }
    Ok(())
}
