use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use siteplan::{
    init_logging, load_preset_catalog, normalize_snapshot, open_plan, scatter_report, summarize,
    SettingsPersistence, BUILD_DATE, VERSION,
};

#[derive(Parser)]
#[command(name = "siteplan")]
#[command(about = "Inspect, preview and normalize site-planning snapshots")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override a config value, e.g. `--set scatter.max_points=200`
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize layers, features and areas of a snapshot
    Inspect { snapshot: PathBuf },
    /// Preview scatter point counts for assigned green polygons
    Scatter { snapshot: PathBuf },
    /// Re-encode a snapshot, dropping unresolvable features
    Normalize { input: PathBuf, output: PathBuf },
    /// Write the effective configuration back to the config file
    SaveConfig,
    /// Print version and build date
    Version,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json)?;

    let mut settings =
        SettingsPersistence::load(args.config.as_deref()).context("Failed to load config")?;
    settings
        .apply_overrides(&args.overrides)
        .context("Invalid --set override")?;
    let config = settings.config().clone();

    match args.command {
        Command::Inspect { snapshot } => {
            let state = open_plan(&config, &snapshot)?;
            let summary = summarize(&state.canvas);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{}: {} features, {} images, {} vertices (active layer {})",
                    snapshot.display(),
                    summary.features,
                    summary.images,
                    summary.vertices,
                    summary.active_layer
                );
                for layer in &summary.layers {
                    let flags = match (layer.visible, layer.locked) {
                        (true, false) => "",
                        (false, false) => " [hidden]",
                        (true, true) => " [locked]",
                        (false, true) => " [hidden, locked]",
                    };
                    println!(
                        "  {:<10} {:<20} polygons {:>4} ({:>10.1} m2)  polylines {:>4} ({:>8.1} m){}",
                        layer.kind,
                        layer.name,
                        layer.polygons,
                        layer.area_m2,
                        layer.polylines,
                        layer.length_m,
                        flags
                    );
                }
            }
        }
        Command::Scatter { snapshot } => {
            let catalog = load_preset_catalog(&config)?;
            let state = open_plan(&config, &snapshot)?;
            let report = scatter_report(&state, &catalog);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_empty() {
                println!("No green polygons with a scatter assignment");
            } else {
                for entry in &report {
                    println!(
                        "  {:<24} {:<10} {:>10.1} m2  {:>5}/{:<5} points",
                        entry.polygon_id, entry.category, entry.area_m2, entry.points, entry.target
                    );
                }
            }
        }
        Command::Normalize { input, output } => {
            let features = normalize_snapshot(&config, &input, &output)?;
            println!("Wrote {} features to {}", features, output.display());
            if !args.overrides.is_empty() {
                tracing::debug!("Overrides apply to this run only; use save-config to keep them");
            }
        }
        Command::SaveConfig => {
            settings.save()?;
            println!("Saved config to {}", settings.path().display());
        }
        Command::Version => {
            println!("siteplan {} (built {})", VERSION, BUILD_DATE);
        }
    }

    Ok(())
}
