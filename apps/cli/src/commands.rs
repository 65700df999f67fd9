//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use graphloom_core::graph;
use graphloom_core::import::{ImportReport, ProgressReporter, run as run_import};
use graphloom_core::manifest::{MANIFEST_FILE_NAME, Manifest};
use graphloom_shared::{ImportOptions, init_config, load_config};
use graphloom_storage::Store;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Graphloom: turn document trees into knowledge graphs.
#[derive(Parser)]
#[command(
    name = "graphloom",
    version,
    about = "Import a tree of structured documents into an incrementally-updatable knowledge graph.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Import a source tree into the knowledge graph.
    Import {
        /// Root directory of the source documents.
        source: String,

        /// Output directory for the import manifest (defaults from config).
        #[arg(short, long)]
        out: Option<String>,

        /// Persistence destination (libSQL database path).
        #[arg(short, long)]
        dest: Option<String>,

        /// Import mode: full or incremental.
        #[arg(short, long)]
        mode: Option<String>,

        /// Compute everything, persist nothing.
        #[arg(long)]
        dry_run: bool,

        /// Skip relationship extraction.
        #[arg(long)]
        skip_relationships: bool,

        /// Do not emit provenance source nodes.
        #[arg(long)]
        no_source_nodes: bool,

        /// Do not split documents into derived child nodes.
        #[arg(long)]
        no_derived_nodes: bool,
    },

    /// Check the import manifest's internal consistency.
    Validate {
        /// Output directory holding the manifest (defaults from config).
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Show connected-component statistics for the persisted graph.
    Components {
        /// Persistence destination (libSQL database path).
        #[arg(short, long)]
        dest: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "graphloom=info",
        1 => "graphloom=debug",
        _ => "graphloom=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Import {
            source,
            out,
            dest,
            mode,
            dry_run,
            skip_relationships,
            no_source_nodes,
            no_derived_nodes,
        } => {
            cmd_import(
                &source,
                out.as_deref(),
                dest.as_deref(),
                mode.as_deref(),
                dry_run,
                skip_relationships,
                no_source_nodes,
                no_derived_nodes,
                cli.verbose > 0,
            )
            .await
        }
        Command::Validate { out } => cmd_validate(out.as_deref()).await,
        Command::Components { dest } => cmd_components(dest.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
async fn cmd_import(
    source: &str,
    out: Option<&str>,
    dest: Option<&str>,
    mode: Option<&str>,
    dry_run: bool,
    skip_relationships: bool,
    no_source_nodes: bool,
    no_derived_nodes: bool,
    verbose: bool,
) -> Result<()> {
    let config = load_config()?;

    let mut options = ImportOptions::from_config(&config, source);
    if let Some(out) = out {
        options.output_dir = PathBuf::from(out);
    }
    if let Some(dest) = dest {
        options.destination = Some(PathBuf::from(dest));
    }
    if let Some(mode) = mode {
        options.mode = mode.parse()?;
    }
    options.dry_run = dry_run;
    options.skip_relationships = skip_relationships;
    options.generate_source_nodes = !no_source_nodes;
    options.generate_derived_nodes = !no_derived_nodes;
    options.verbose = verbose;

    info!(
        source,
        mode = ?options.mode,
        dry_run,
        "starting import"
    );

    let reporter = CliProgress::new();
    let report = run_import(&options, &reporter).await;

    print_report(&report, dry_run);

    // Per-file errors are data, not failures; only a failed run stage is an
    // error exit.
    if report.stage == graphloom_core::import::ImportStage::Failed {
        let message = report
            .file_results
            .iter()
            .find_map(|r| r.message.clone())
            .unwrap_or_else(|| "import failed".into());
        return Err(eyre!(message));
    }
    Ok(())
}

fn print_report(report: &ImportReport, dry_run: bool) {
    let elapsed = (report.completed_at - report.started_at)
        .to_std()
        .unwrap_or_default();

    println!();
    if dry_run {
        println!("  Import (dry-run) finished.");
    } else {
        println!("  Import finished.");
    }
    println!("  Files:         {}", report.total_files);
    println!("  Created:       {}", report.created);
    println!("  Skipped:       {}", report.skipped);
    println!("  Errors:        {}", report.errors);
    if report.removed_files > 0 {
        println!(
            "  Removed:       {} files ({} nodes)",
            report.removed_files, report.removed_nodes
        );
    }
    println!("  Nodes:         {}", report.total_nodes);
    println!("  Relationships: {}", report.total_relationships);
    println!("  Time:          {:.1}s", elapsed.as_secs_f64());

    for result in &report.file_results {
        if let Some(message) = &result.message {
            println!("    ! {}: {message}", result.path);
        }
    }
    println!();
}

async fn cmd_validate(out: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let output_dir = out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    let manifest_path = output_dir.join(MANIFEST_FILE_NAME);

    if !manifest_path.exists() {
        return Err(eyre!("no manifest found at {}", manifest_path.display()));
    }

    let manifest = Manifest::load(&manifest_path);
    let violations = manifest.validate();

    if violations.is_empty() {
        println!(
            "manifest consistent: {} sources, {} nodes",
            manifest.total_source_files, manifest.total_nodes
        );
        Ok(())
    } else {
        for violation in &violations {
            println!("violation: {violation}");
        }
        Err(eyre!("{} manifest violations", violations.len()))
    }
}

async fn cmd_components(dest: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let destination = dest
        .map(PathBuf::from)
        .or_else(|| config.defaults.destination.as_ref().map(PathBuf::from))
        .ok_or_else(|| eyre!("no destination configured (set --dest)"))?;

    let store = Store::open_readonly(&destination).await?;
    let nodes = store.load_nodes().await?;
    let relationships = store.load_relationships().await?;

    let graph = graph::build_graph(nodes.iter().map(|n| n.id.as_str()), &relationships);
    let components = graph::connected_components(&graph);
    let isolated = components.iter().filter(|c| c.len() == 1).count();
    let largest = components.iter().map(Vec::len).max().unwrap_or(0);

    println!("nodes:         {}", nodes.len());
    println!("relationships: {}", relationships.len());
    println!("components:    {}", components.len());
    println!("isolated:      {isolated}");
    println!("largest:       {largest}");

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("created {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_processed(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Processing [{current}/{total}] {path}"));
    }

    fn done(&self, _report: &ImportReport) {
        self.spinner.finish_and_clear();
    }
}
