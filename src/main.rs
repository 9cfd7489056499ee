use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use tidemap_rs::config::{self, Overrides};
use tidemap_rs::ingest::{IngestTask, TaskState};
use tidemap_rs::layout::{self, Placement};
use tidemap_rs::render::colors::{rank_color, status_color};
use tidemap_rs::render::svg::{render_svg, SvgStyle};
use tidemap_rs::source::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
    Svg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorBy {
    Status,
    Rank,
}

/// Lay out species counts as a proportional treemap.
#[derive(Debug, Parser)]
#[command(name = "tidemap", version)]
struct Cli {
    /// Dataset file (.csv or .json). Uses the built-in species sample when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Canvas width
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Canvas height
    #[arg(long, default_value_t = 400.0)]
    height: f64,

    /// JSON file with layout options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Drop items with invalid weights instead of failing
    #[arg(long)]
    skip_invalid: bool,

    #[arg(long)]
    min_width_fraction: Option<f64>,

    #[arg(long)]
    min_height_fraction: Option<f64>,

    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// SVG fill: native/invasive status or layout rank
    #[arg(long, value_enum, default_value_t = ColorBy::Status)]
    color_by: ColorBy,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tidemap_rs=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let overrides = Overrides {
        skip_invalid: cli.skip_invalid,
        min_width_fraction: cli.min_width_fraction,
        min_height_fraction: cli.min_height_fraction,
    };
    let options = config::load_options(cli.options.as_deref(), &overrides)?;
    let source = config::open_source(cli.input.as_deref())?;

    // Load on a worker thread and follow its progress here.
    let (tx, rx) = mpsc::channel();
    let handle = IngestTask::new(1, source).spawn(tx);
    for update in rx {
        match update.state {
            TaskState::Uploading { progress } => {
                tracing::debug!("Ingest {}: {:.0}%", update.task_id, progress)
            }
            TaskState::Failed { message } => {
                tracing::error!("Ingest {} failed: {}", update.task_id, message)
            }
            state => tracing::info!("Ingest {}: {}", update.task_id, state.name()),
        }
    }
    let items = handle
        .join()
        .map_err(|_| anyhow::anyhow!("ingest thread panicked"))??;

    let placements = layout::layout(&items, cli.width, cli.height, &options)?;
    tracing::info!(
        "Placed {} of {} items on a {}x{} canvas",
        placements.len(),
        items.len(),
        cli.width,
        cli.height
    );

    let rendered = match cli.format {
        Format::Table => render_table(&placements),
        Format::Json => serde_json::to_string_pretty(&placements)?,
        Format::Svg => render_svg(
            &placements,
            cli.width,
            cli.height,
            &SvgStyle::default(),
            |p| match cli.color_by {
                ColorBy::Status => status_color(p.item.tag),
                ColorBy::Rank => rank_color(p.rank),
            },
        ),
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}

fn render_table(placements: &[Placement<'_, Status>]) -> String {
    let mut out = format!(
        "{:<40} {:>8} {:>9} {:>9} {:>9} {:>9} {:>7}  {}\n",
        "name", "weight", "x", "y", "width", "height", "share", "fit"
    );
    for p in placements {
        let marker = match p.item.tag {
            Status::Invasive => " (invasive)",
            Status::Native => "",
        };
        out.push_str(&format!(
            "{:<40} {:>8} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>6.1}%  {:?}{}\n",
            p.item.name, p.item.weight, p.x, p.y, p.width, p.height, p.percentage, p.fit, marker
        ));
    }
    out
}
