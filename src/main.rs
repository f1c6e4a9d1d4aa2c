//! Data Nova CLI
//!
//! Command-line interface for IGS projections, historical series, report
//! exports and dashboard settings

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::info;

use data_nova::api::SimulationResponse;
use data_nova::history::{fallback_importance, load_importance_or_fallback, LONOKE_REGION};
use data_nova::projection::{
    ImpactCoefficients, InterventionParameters, ProjectionConfig, ProjectionEngine, DEFAULT_ANCHOR_SCORE,
    DEFAULT_END_YEAR, DEFAULT_START_YEAR,
};
use data_nova::report::{
    build_pdf_document, export_file_name, to_csv_string, to_json_string, ExportFormat, ReportData, ReportType,
};
use data_nova::settings::{DashboardSettings, DataSource};

#[derive(Parser)]
#[command(name = "data_nova", version, about = "Inclusive growth score analytics for Lonoke County")]
struct Cli {
    /// Dashboard settings file
    #[arg(long, global = true, default_value = "data_nova_settings.json")]
    settings: PathBuf,

    /// Region id to load history for
    #[arg(long, global = true, default_value = LONOKE_REGION)]
    region: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project baseline and intervention scenarios
    Simulate {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Print the API response JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the historical series from the configured data source
    History {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write a report export
    Export {
        #[arg(long, value_enum, default_value_t = ReportType::Comprehensive)]
        report: ReportType,

        /// Defaults to the settings' export format
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Label recorded in the JSON export metadata
        #[arg(long, default_value = "all")]
        date_range: String,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Feature importance CSV (`feature,importance`)
        #[arg(long)]
        importance: Option<PathBuf>,

        #[command(flatten)]
        scenario: ScenarioArgs,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show or initialize dashboard settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings
    Show,
    /// Write the default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct ScenarioArgs {
    /// Housing cost burden reduction (percentage points)
    #[arg(long, default_value_t = 8.5)]
    housing: f64,

    /// Early education enrollment increase (percentage points)
    #[arg(long, default_value_t = 4.1)]
    education: f64,

    /// Minority-owned business increase (percentage points)
    #[arg(long, default_value_t = 1.2)]
    business: f64,

    /// Anchor IGS for the start year
    #[arg(long, default_value_t = DEFAULT_ANCHOR_SCORE)]
    anchor: f64,

    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    start_year: i32,

    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    end_year: i32,

    /// Success threshold for the combined scenario
    #[arg(long)]
    threshold: Option<f64>,
}

impl ScenarioArgs {
    fn parameters(&self) -> InterventionParameters {
        InterventionParameters::new(self.housing, self.education, self.business)
    }

    fn engine(&self) -> ProjectionEngine {
        let mut config = ProjectionConfig::default();
        if let Some(threshold) = self.threshold {
            config.threshold_value = threshold;
        }
        ProjectionEngine::new(ImpactCoefficients::default(), config)
    }
}

#[derive(Args)]
struct SourceArgs {
    /// Override the settings' data source
    #[arg(long, value_enum)]
    source: Option<DataSource>,

    /// CSV file for `--source file`
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Program and arguments for `--source command`
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    data_command: Option<Vec<String>>,
}

impl SourceArgs {
    fn apply(&self, settings: &mut DashboardSettings) {
        if let Some(source) = self.source {
            settings.data_source = source;
        }
        if let Some(path) = &self.data_path {
            settings.data_path = Some(path.clone());
        }
        if let Some(command) = &self.data_command {
            settings.data_command = Some(command.clone());
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = DashboardSettings::load(&cli.settings)
        .with_context(|| format!("loading settings from {}", cli.settings.display()))?;

    match cli.command {
        Commands::Simulate { scenario, json } => run_simulate(&scenario, json),
        Commands::History { source } => {
            source.apply(&mut settings);
            run_history(&settings, &cli.region)
        }
        Commands::Export {
            report,
            format,
            date_range,
            out_dir,
            importance,
            scenario,
            source,
        } => {
            source.apply(&mut settings);
            let format = format.unwrap_or(settings.default_export_format);
            run_export(&settings, &cli.region, report, format, &date_range, &out_dir, importance.as_deref(), &scenario)
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                println!("{}", serde_json::to_string_pretty(&settings)?);
                Ok(())
            }
            SettingsAction::Init { force } => {
                if cli.settings.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", cli.settings.display());
                }
                DashboardSettings::default()
                    .save(&cli.settings)
                    .with_context(|| format!("writing {}", cli.settings.display()))?;
                println!("Wrote default settings to {}", cli.settings.display());
                Ok(())
            }
        },
    }
}

fn run_simulate(scenario: &ScenarioArgs, json: bool) -> Result<()> {
    let params = scenario.parameters();
    let result = scenario
        .engine()
        .project(scenario.anchor, scenario.start_year, scenario.end_year, &params)
        .context("running projection")?;

    if json {
        let request = data_nova::api::SimulationRequest {
            housing_reduction: scenario.housing,
            education_increase: scenario.education,
            business_increase: scenario.business,
        };
        let response = SimulationResponse::from_result(&request, &result);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Data Nova v{}", env!("CARGO_PKG_VERSION"));
    println!("==================\n");
    println!(
        "Interventions: housing -{:.1} pts, education +{:.1} pts, business +{:.1} pts",
        params.housing_burden_reduction_points,
        params.early_education_increase_points,
        params.minority_business_increase_points
    );
    println!(
        "Impacts: housing {:.2}, education {:.2}, business {:.2}, combined {:.2}\n",
        result.impact_summary.housing,
        result.impact_summary.education,
        result.impact_summary.business,
        result.impact_summary.combined
    );

    println!(
        "{:>6} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Year", "Baseline", "Housing", "Education", "Business", "Combined"
    );
    for row in &result.rows {
        println!(
            "{:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            row.year,
            row.baseline_score,
            row.housing_scenario_score,
            row.education_scenario_score,
            row.business_scenario_score,
            row.combined_scenario_score
        );
    }

    let summary = result.summary();
    println!("\nNet improvement: {:.2}", summary.net_improvement);
    match summary.year_threshold_first_crossed {
        Some(year) => println!("Threshold {} first crossed in {}", result.threshold_value, year),
        None => println!("Threshold {} not reached", result.threshold_value),
    }
    Ok(())
}

fn run_history(settings: &DashboardSettings, region: &str) -> Result<()> {
    let provider = settings.build_provider(region).context("building data provider")?;
    let (series, origin) = provider.resolve(region);
    info!("History for {} resolved from {:?} source", region, origin);

    println!(
        "{:>6} {:>8} {:>8} {:>8} {:>10}",
        "Year", "IGS", "Place", "Economy", "Community"
    );
    for o in &series {
        println!(
            "{:>6} {:>8.2} {:>8.2} {:>8.2} {:>10.2}",
            o.year, o.igs_score, o.place_score, o.economy_score, o.community_score
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_export(
    settings: &DashboardSettings,
    region: &str,
    report_type: ReportType,
    format: ExportFormat,
    date_range: &str,
    out_dir: &Path,
    importance: Option<&Path>,
    scenario: &ScenarioArgs,
) -> Result<()> {
    let provider = settings.build_provider(region).context("building data provider")?;
    let feature_importance = match importance {
        Some(path) => load_importance_or_fallback(path),
        None => fallback_importance(),
    };

    let data = ReportData::prepare(
        &provider,
        &scenario.engine(),
        region,
        scenario.anchor,
        (scenario.start_year, scenario.end_year),
        &scenario.parameters(),
        feature_importance,
    )
    .context("preparing report data")?;

    let exported_at = Utc::now();
    let file_name = export_file_name(report_type, format, exported_at.date_naive());

    // PDF bytes are left to a document writer; the section model goes out as JSON
    let (path, contents) = match format {
        ExportFormat::Csv => (out_dir.join(&file_name), to_csv_string(&data, report_type)?),
        ExportFormat::Json => (
            out_dir.join(&file_name),
            to_json_string(&data, report_type, date_range, exported_at)?,
        ),
        ExportFormat::Pdf => {
            let document = build_pdf_document(&data, report_type);
            print!("{}", document.render_text());
            (
                out_dir.join(format!("{}.json", file_name)),
                serde_json::to_string_pretty(&document)?,
            )
        }
    };

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    println!("Exported {} report to {}", report_type, path.display());
    Ok(())
}
