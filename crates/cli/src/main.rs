//! landshift CLI - directional land-cover change analysis

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use landshift_algorithms::analysis::{analyze_files, AnalysisParams};
use landshift_algorithms::clip::{ClipParams, NodataPolicy, DEFAULT_TARGET_CLASS};
use landshift_algorithms::direction::SectorWindow;
use landshift_chart::{
    class_name, compare, series_label, title_for, ChartOptions, PercentDistribution, RadarChart,
};
use landshift_core::io::{read_boundary_layer, read_geotiff};
use landshift_core::{Direction, DirectionCounts, Raster, Selection};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "landshift")]
#[command(author, version, about = "Directional land-cover change analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a land-cover raster
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Count class pixels per compass direction at two dates and chart the change
    Analyze {
        /// Land-cover raster of the start date
        start: PathBuf,
        /// Land-cover raster of the end date
        end: PathBuf,
        /// GeoJSON boundary layer
        boundaries: PathBuf,
        /// Attribute filter FIELD=VALUE, repeat to combine (e.g. NAME=Wake)
        #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE", required = true)]
        criteria: Vec<String>,
        /// Target class code
        #[arg(short, long, default_value_t = DEFAULT_TARGET_CLASS)]
        class: i64,
        /// Display name of the class (default: Urban for 2, else "Class N")
        #[arg(long)]
        class_name: Option<String>,
        /// Sector window: directional, lower-right, full
        #[arg(long, default_value = "directional")]
        window: String,
        /// Pixels outside the boundary: as-absent, preserve
        #[arg(long, default_value = "as-absent")]
        nodata_policy: String,
        /// Use boundary coordinates unchanged for rasters without a CRS
        #[arg(long)]
        assume_boundary_crs: bool,
        /// Legend label of the start date (e.g. 2001)
        #[arg(long, default_value = "Start Year")]
        start_label: String,
        /// Legend label of the end date (e.g. 2019)
        #[arg(long, default_value = "End Year")]
        end_label: String,
        /// Chart title (default built from the class and the selection)
        #[arg(long)]
        title: Option<String>,
        /// Write the radar chart as SVG
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

// ─── Report ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report {
    selection: String,
    class: i64,
    window: SectorWindow,
    nodata_policy: NodataPolicy,
    start: SeriesReport,
    end: SeriesReport,
}

#[derive(Serialize)]
struct SeriesReport {
    label: String,
    total: u64,
    counts: DirectionCounts,
    percentages: PercentDistribution,
}

impl SeriesReport {
    fn new(label: &str, counts: DirectionCounts) -> Self {
        Self {
            label: label.to_string(),
            total: counts.total(),
            percentages: PercentDistribution::from_counts_or_zero(&counts),
            counts,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the log subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_selection(criteria: &[String]) -> Result<Selection> {
    criteria.iter().try_fold(Selection::new(), |selection, item| {
        let (field, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid filter '{}': expected FIELD=VALUE", item))?;
        let field = field.trim();
        if field.is_empty() {
            anyhow::bail!("Invalid filter '{}': empty field name", item);
        }
        Ok(selection.field(field, value.trim()))
    })
}

/// Title from the selected values: the first is the area, the rest its state
fn default_title(class: &str, selection: &Selection) -> String {
    let values: Vec<&str> = selection.criteria().iter().map(|(_, v)| v.as_str()).collect();
    match values.split_first() {
        Some((area, rest)) if !rest.is_empty() => title_for(class, area, &rest.join(", ")),
        Some((area, _)) => format!("{class} Class Percentage Change\n{area}"),
        None => format!("{class} Class Percentage Change"),
    }
}

fn print_table(report: &Report) {
    println!("Boundary: {}", report.selection);
    println!("Class: {} (window: {})", report.class, report.window);
    println!();
    println!(
        "{:<4} {:>10} {:>8} {:>10} {:>8}",
        "Dir", report.start.label, "%", report.end.label, "%"
    );
    for direction in Direction::ALL {
        println!(
            "{:<4} {:>10} {:>7.2}% {:>10} {:>7.2}%",
            direction.name(),
            report.start.counts[direction],
            report.start.percentages.get(direction),
            report.end.counts[direction],
            report.end.percentages.get(direction),
        );
    }
    println!(
        "{:<4} {:>10} {:>8} {:>10}",
        "All", report.start.total, "", report.end.total
    );
}

fn write_chart(chart: &RadarChart, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing chart...");
    std::fs::write(path, chart.to_svg())
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let pb = spinner("Reading raster...");
            let raster: Raster<f64> =
                read_geotiff(&input, None).context("Failed to read raster")?;
            pb.finish_and_clear();

            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let histogram = raster.class_histogram();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            match raster.crs() {
                Some(crs) => println!("CRS: {}", crs),
                None => println!("CRS: none"),
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {} ({} cells)", nodata, histogram.nodata_count);
            }
            println!("\nClasses:");
            let valid = histogram.valid_count().max(1) as f64;
            for (code, count) in &histogram.counts {
                println!(
                    "  {:>5}: {:>10} ({:.1}%)",
                    code,
                    count,
                    100.0 * *count as f64 / valid
                );
            }
        }

        Commands::Analyze {
            start,
            end,
            boundaries,
            criteria,
            class,
            class_name: name,
            window,
            nodata_policy,
            assume_boundary_crs,
            start_label,
            end_label,
            title,
            output,
            json,
        } => {
            let selection = parse_selection(&criteria)?;
            let window: SectorWindow = window.parse().map_err(|e| anyhow!("{}", e))?;
            let nodata_policy: NodataPolicy =
                nodata_policy.parse().map_err(|e| anyhow!("{}", e))?;
            let params = AnalysisParams {
                clip: ClipParams {
                    target_class: class,
                    nodata_policy,
                    assume_boundary_crs,
                },
                window,
            };

            let t0 = Instant::now();
            let pb = spinner("Reading boundaries...");
            let layer = read_boundary_layer(&boundaries).with_context(|| {
                format!("Failed to read boundary layer {}", boundaries.display())
            })?;
            pb.set_message("Clipping and counting...");
            let (counts_start, counts_end) = analyze_files(&start, &end, &layer, &selection, &params)
                .with_context(|| format!("Analysis of {} failed", selection))?;
            pb.finish_and_clear();
            info!("Analysis finished in {:.2?}", t0.elapsed());

            let class_label = name.unwrap_or_else(|| class_name(class));
            let start_series = series_label(&class_label, &start_label);
            let end_series = series_label(&class_label, &end_label);

            if let Some(path) = output {
                let options = ChartOptions {
                    title: title.unwrap_or_else(|| default_title(&class_label, &selection)),
                    start_label: start_series.clone(),
                    end_label: end_series.clone(),
                    ..ChartOptions::default()
                };
                let chart = compare(&counts_start, &counts_end, &options)
                    .context("Failed to build the chart")?;
                write_chart(&chart, &path)?;
                info!("Chart saved to: {}", path.display());
            }

            let report = Report {
                selection: selection.to_string(),
                class,
                window,
                nodata_policy,
                start: SeriesReport::new(&start_series, counts_start),
                end: SeriesReport::new(&end_series, counts_end),
            };
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to encode report")?
                );
            } else {
                print_table(&report);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_filters() {
        let selection =
            parse_selection(&["NAME=Wake".to_string(), "STATE_ABBR = NC".to_string()]).unwrap();
        assert_eq!(
            selection.criteria(),
            &[
                ("NAME".to_string(), "Wake".to_string()),
                ("STATE_ABBR".to_string(), "NC".to_string()),
            ]
        );
        assert!(parse_selection(&["NAME".to_string()]).is_err());
        assert!(parse_selection(&["=Wake".to_string()]).is_err());
    }

    #[test]
    fn filter_value_may_contain_equals() {
        let selection = parse_selection(&["CODE=a=b".to_string()]).unwrap();
        assert_eq!(selection.criteria()[0].1, "a=b");
    }

    #[test]
    fn title_from_selection() {
        let selection = Selection::new().field("NAME", "Wake").field("STATE_ABBR", "NC");
        assert_eq!(
            default_title("Urban", &selection),
            "Urban Class Percentage Change\nWake, NC"
        );
        let selection = Selection::new().field("NAME", "Wake");
        assert_eq!(
            default_title("Class 5", &selection),
            "Class 5 Class Percentage Change\nWake"
        );
    }

    #[test]
    fn cli_arguments_parse() {
        let cli = Cli::try_parse_from([
            "landshift",
            "analyze",
            "a.tif",
            "b.tif",
            "counties.geojson",
            "--where",
            "NAME=Wake",
            "-w",
            "STATE_ABBR=NC",
            "--window",
            "full",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                criteria, window, class, json, ..
            } => {
                assert_eq!(criteria.len(), 2);
                assert_eq!(window, "full");
                assert_eq!(class, DEFAULT_TARGET_CLASS);
                assert!(!json);
            }
            Commands::Info { .. } => panic!("expected analyze"),
        }
    }

    #[test]
    fn report_serializes_counts() {
        let report = SeriesReport::new("Urban 2001", DirectionCounts::new([1, 0, 0, 0, 0, 0, 0, 1]));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["counts"][7], 1);
        assert_eq!(value["percentages"][0], 50.0);
    }
}
