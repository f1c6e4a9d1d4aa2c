//! Sweep a grid of intervention sets and write the 2030 outcome of each
//!
//! Outputs one CSV row per grid point, ordered housing-major

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use data_nova::scenario::{smallest_crossing, ScenarioGrid, ScenarioRunner};

#[derive(Parser)]
#[command(name = "scenario_grid", about = "Parallel sweep over intervention magnitudes")]
struct Cli {
    /// Largest magnitude on every axis (percentage points)
    #[arg(long, default_value_t = 10.0)]
    max: f64,

    /// Step between grid values
    #[arg(long, default_value_t = 0.5)]
    step: f64,

    #[arg(long, default_value = "scenario_grid_output.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct GridRow {
    housing_reduction: f64,
    education_increase: f64,
    business_increase: f64,
    final_baseline: Option<f64>,
    final_combined: Option<f64>,
    net_improvement: Option<f64>,
    crosses_threshold: Option<bool>,
    first_crossing_year: Option<i32>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let grid = ScenarioGrid::uniform(cli.max, cli.step);
    println!("Running {} scenarios...", grid.len());

    let start = Instant::now();
    let points = ScenarioRunner::new().run_grid(&grid);
    println!("Projections complete in {:?}", start.elapsed());

    let file = File::create(&cli.output).with_context(|| format!("creating {}", cli.output.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut crossing = 0;
    for point in &points {
        let p = &point.parameters;
        let row = match &point.result {
            Ok(result) => {
                if result.crosses_threshold {
                    crossing += 1;
                }
                GridRow {
                    housing_reduction: p.housing_burden_reduction_points,
                    education_increase: p.early_education_increase_points,
                    business_increase: p.minority_business_increase_points,
                    final_baseline: Some(result.final_baseline),
                    final_combined: Some(result.final_combined),
                    net_improvement: Some(result.net_improvement),
                    crosses_threshold: Some(result.crosses_threshold),
                    first_crossing_year: result.year_threshold_first_crossed,
                    error: None,
                }
            }
            Err(e) => GridRow {
                housing_reduction: p.housing_burden_reduction_points,
                education_increase: p.early_education_increase_points,
                business_increase: p.minority_business_increase_points,
                final_baseline: None,
                final_combined: None,
                net_improvement: None,
                crosses_threshold: None,
                first_crossing_year: None,
                error: Some(e.to_string()),
            },
        };
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("\nGrid Summary:");
    println!("  Scenarios: {}", points.len());
    println!("  Crossing threshold: {}", crossing);
    if let Some(best) = smallest_crossing(&points) {
        let p = &best.parameters;
        println!(
            "  Smallest crossing set: housing {:.1}, education {:.1}, business {:.1}",
            p.housing_burden_reduction_points, p.early_education_increase_points, p.minority_business_increase_points
        );
    }
    println!("\nOutput written to: {}", cli.output.display());
    Ok(())
}
