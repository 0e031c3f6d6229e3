use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use css::{MediaEnv, StyleSheetSet};
use dom::{Dom, StableId};
use layout::StaticLayout;
use livepatch::Agent;
use patch::EditOp;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

#[derive(Parser)]
#[command(name = "livepatch")]
#[command(about = "Apply live edits to a page and query its cascade", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an edit batch to a document and print the resulting document
    Apply {
        /// Document in simple JSON form
        document: PathBuf,

        /// JSON array of edits
        edits: PathBuf,

        /// Page geometry table, used to redraw highlights
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Address the page was loaded from
        #[arg(long, default_value = "http://localhost/index.html")]
        url: Url,
    },

    /// Print the accepted value of a property for one element
    Cascade {
        /// Document in simple JSON form
        document: PathBuf,

        /// Stable id of the element
        #[arg(long)]
        id: u64,

        /// Property to resolve
        #[arg(short, long)]
        property: String,

        /// Stylesheets in document order
        #[arg(long = "css", required = true)]
        stylesheets: Vec<PathBuf>,

        /// Viewport width for media queries
        #[arg(long, default_value_t = 1024.0)]
        width: f32,

        /// Viewport height for media queries
        #[arg(long, default_value_t = 768.0)]
        height: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Apply {
            document,
            edits,
            layout,
            url,
        } => apply(&document, &edits, layout.as_deref(), url),
        Commands::Cascade {
            document,
            id,
            property,
            stylesheets,
            width,
            height,
        } => cascade(&document, StableId(id), &property, &stylesheets, MediaEnv { width, height }),
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_document(path: &Path) -> Result<Dom> {
    Dom::from_simple_json(&read(path)?)
        .with_context(|| format!("Failed to load document {}", path.display()))
}

fn apply(document: &Path, edits: &Path, layout: Option<&Path>, url: Url) -> Result<()> {
    let dom = load_document(document)?;
    let batch = EditOp::parse_batch(&read(edits)?)
        .with_context(|| format!("Failed to parse edits {}", edits.display()))?;
    let layout = match layout {
        Some(path) => StaticLayout::from_json(&read(path)?)
            .with_context(|| format!("Failed to parse layout {}", path.display()))?,
        None => StaticLayout::default(),
    };

    let now = Instant::now();
    let mut agent = Agent::new(dom, StyleSheetSet::new(), layout, url, now);
    let report = agent.apply_dom_edits(&batch, now);
    info!(
        applied = report.applied,
        skipped = report.skipped.len(),
        released = report.released,
        "batch done"
    );

    println!("{}", agent.get_simple_dom());
    eprintln!(
        "applied {} of {} edits, released {} detached nodes",
        report.applied,
        batch.len(),
        report.released
    );
    for skipped in &report.skipped {
        eprintln!("  skipped #{} {}: {}", skipped.index, skipped.kind, skipped.error);
    }
    Ok(())
}

fn cascade(
    document: &Path,
    id: StableId,
    property: &str,
    stylesheets: &[PathBuf],
    env: MediaEnv,
) -> Result<()> {
    let dom = load_document(document)?;
    let mut sheets = StyleSheetSet::new();
    for path in stylesheets {
        let href = path.display().to_string();
        sheets.push(Some(href.as_str()), "", &read(path)?);
    }

    let node = dom
        .find_by_stable_id(id)
        .with_context(|| format!("No element with stable id {id}"))?;
    let accepted = style::accepted_value(&dom, node, property, &sheets, &env);
    println!("{}", serde_json::to_string_pretty(&accepted)?);
    Ok(())
}
