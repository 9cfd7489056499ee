//! Diagnostic tool to verify the source → layout → report pipeline

use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Result;
use clap::Parser;

use tidemap_rs::config::{self, Overrides};
use tidemap_rs::ingest::IngestTask;
use tidemap_rs::layout::batch::{layout_batch, Panel};
use tidemap_rs::layout::check::check;
use tidemap_rs::layout::{self, Fit};
use tidemap_rs::render::labels::LabelPolicy;

#[derive(Debug, Parser)]
#[command(name = "debug-layout")]
struct Args {
    /// Dataset file (.csv or .json); built-in species sample when omitted
    input: Option<PathBuf>,

    #[arg(long, default_value_t = 1920.0)]
    width: f64,

    #[arg(long, default_value_t = 1080.0)]
    height: f64,

    /// JSON file with layout options
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(long)]
    skip_invalid: bool,

    #[arg(long)]
    min_width_fraction: Option<f64>,

    #[arg(long)]
    min_height_fraction: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tidemap_rs=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    println!("=== DIAGNOSTIC: Source → Layout Pipeline ===");

    // Load
    let source = config::open_source(args.input.as_deref())?;
    println!("Source: {}", source.describe());
    let (tx, rx) = mpsc::channel();
    let mut task = IngestTask::new(0, source);
    let items = task.run(&tx)?;
    drop(tx);
    println!(
        "\n[1] Ingest finished in state '{}' after {} updates: {} items",
        task.state().name(),
        rx.try_iter().count(),
        items.len()
    );

    let total: f64 = items
        .iter()
        .filter(|i| i.has_valid_weight())
        .map(|i| i.weight)
        .sum();
    let invalid = items.iter().filter(|i| !i.has_valid_weight()).count();
    println!("    Total weight: {} ({} invalid items)", total, invalid);

    // Show top 10 items by weight
    println!("\n[2] Top 10 items by weight:");
    let mut by_weight: Vec<_> = items.iter().collect();
    by_weight.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    for (i, item) in by_weight.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' - {} ({:?})",
            i, item.name, item.weight, item.tag
        );
    }

    // Compute layout
    let overrides = Overrides {
        skip_invalid: args.skip_invalid,
        min_width_fraction: args.min_width_fraction,
        min_height_fraction: args.min_height_fraction,
    };
    let options = config::load_options(args.options.as_deref(), &overrides)?;
    let placements = layout::layout(&items, args.width, args.height, &options)?;
    println!(
        "\n[3] Layout computed: {} rectangles in {:.0}x{:.0}",
        placements.len(),
        args.width,
        args.height
    );

    let mut ranked: Vec<_> = placements.iter().collect();
    ranked.sort_by_key(|p| p.rank);
    for p in &ranked {
        println!(
            "    #{} '{}' - rect: {:.1}x{:.1} ({:.0} units²) at ({:.1}, {:.1}) - {:.1}% - {:?}",
            p.rank,
            p.item.name,
            p.width,
            p.height,
            p.area(),
            p.x,
            p.y,
            p.percentage,
            p.fit
        );
    }

    // Check for anomalies
    println!("\n[4] Checking for anomalies:");
    let report = check(&placements, args.width, args.height);
    println!("    Total rect area: {:.0}", report.placed_area);
    println!("    Canvas area:     {:.0}", report.canvas_area);
    println!("    Coverage:        {:.3}%", report.coverage * 100.0);
    println!("    Percentage sum:  {:.6}", report.percentage_sum);
    println!("    Overlaps:        {:?}", report.overlaps);
    println!("    Out of bounds:   {:?}", report.out_of_bounds);
    println!(
        "    Verdict:         {}",
        if report.is_sound() { "OK" } else { "ANOMALIES FOUND" }
    );

    // How far each tile is from its proportional area
    println!("\n[5] Tiles not sized proportionally:");
    let canvas_area = args.width * args.height;
    for p in placements.iter().filter(|p| p.fit != Fit::Proportional) {
        let ideal = p.percentage / 100.0 * canvas_area;
        println!(
            "    '{}' {:?}: area {:.0} vs ideal {:.0} ({:+.1}%)",
            p.item.name,
            p.fit,
            p.area(),
            ideal,
            (p.area() / ideal - 1.0) * 100.0
        );
    }

    // Count label candidates with the default policy
    let policy = LabelPolicy::default();
    let labeled = placements.iter().filter(|p| policy.fits(*p)).count();
    println!(
        "\n[6] Text label count: {} rects (out of {})",
        labeled,
        placements.len()
    );

    // Same items across a range of canvas shapes, laid out in parallel
    println!("\n[7] Aspect ratio sweep:");
    let panels: Vec<Panel<_>> = [0.25, 0.5, 1.0, 2.0, 4.0]
        .iter()
        .map(|&aspect| Panel::new(items.clone(), args.height * aspect, args.height))
        .collect();
    for (panel, result) in panels.iter().zip(layout_batch(&panels, &options)) {
        match result {
            Ok(placed) => {
                let report = check(&placed, panel.width, panel.height);
                println!(
                    "    {:>6.0}x{:<6.0} {} rects, coverage {:.3}%, {}",
                    panel.width,
                    panel.height,
                    placed.len(),
                    report.coverage * 100.0,
                    if report.is_sound() { "OK" } else { "ANOMALIES FOUND" }
                );
            }
            Err(e) => println!("    {:>6.0}x{:<6.0} failed: {}", panel.width, panel.height, e),
        }
    }

    Ok(())
}
