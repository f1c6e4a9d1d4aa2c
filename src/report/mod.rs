//! Report assembly and export formats
//!
//! A [`ReportData`] is built once per export from the historical series and a
//! single [`ProjectionResult`]; the CSV, JSON and PDF formatters only format
//! what it derives, so the three formats never disagree.

mod csv;
mod json;
mod pdf;

pub use self::csv::{csv_table, to_csv_string, write_csv};
pub use self::json::{build_json_export, to_json_string, ExportMetadata, EXPORT_DATA_SOURCE, EXPORT_VERSION};
pub use self::pdf::{build_pdf_document, PdfDocument, PdfSection};

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::history::{
    latest_pair, observation_for_year, FallbackProvider, FeatureImportance, SeriesOrigin, YearlyObservation,
    LONOKE_DISPLAY_NAME,
};
use crate::projection::{
    round_to_cents, InterventionParameters, ModelInfo, ProjectionEngine, ProjectionError, ProjectionResult,
};

/// Pillar score at or above which a pillar is rated `Good`
pub const PILLAR_GOOD_SCORE: f64 = 40.0;
/// Each pillar's share of the IGS
pub const PILLAR_WEIGHT_PCT: f64 = 33.3;

/// Errors raised while rendering exports
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("no data available for the {0} report")]
    Empty(ReportType),
}

/// Which report to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Comprehensive,
    Summary,
    Trends,
    Pillars,
    Predictions,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::Comprehensive,
        ReportType::Summary,
        ReportType::Trends,
        ReportType::Pillars,
        ReportType::Predictions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Comprehensive => "comprehensive",
            ReportType::Summary => "summary",
            ReportType::Trends => "trends",
            ReportType::Pillars => "pillars",
            ReportType::Predictions => "predictions",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid report type: {}", s))
    }
}

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// `Lonoke_County_{report}_{YYYY-MM-DD}.{ext}`
pub fn export_file_name(report_type: ReportType, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "Lonoke_County_{}_{}.{}",
        report_type,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Header plus string cells, shared by the CSV and PDF layouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
}

impl Table {
    pub fn new(head: &[&str]) -> Self {
        Self {
            head: head.iter().map(|h| h.to_string()).collect(),
            body: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.head.len());
        self.body.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Two-decimal cell
pub(crate) fn cell2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Cell with `decimals` places, blank when the value is missing
pub(crate) fn opt_cell(value: Option<f64>, decimals: usize) -> String {
    value.map(|v| format!("{:.*}", decimals, v)).unwrap_or_default()
}

/// Direction of a metric versus the previous year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStatus {
    Improving,
    Stable,
    Declining,
}

impl TrendStatus {
    fn from_change(change_pct: Option<f64>) -> Self {
        match change_pct {
            Some(c) if c > 0.0 => TrendStatus::Improving,
            Some(c) if c < 0.0 => TrendStatus::Declining,
            _ => TrendStatus::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStatus::Improving => "Improving",
            TrendStatus::Stable => "Stable",
            TrendStatus::Declining => "Declining",
        }
    }
}

/// Percentage change from `previous` to `current`, 2 decimals
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some(round_to_cents((current - previous) / previous * 100.0))
}

/// Latest value of a score compared with the year before
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub metric: String,
    pub current: f64,
    pub previous: Option<f64>,
    pub change_pct: Option<f64>,
    pub status: TrendStatus,
}

/// IGS and pillars for one historical year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTrend {
    pub year: i32,
    pub igs_score: f64,
    /// Growth versus the previous calendar year; `None` when that year is missing
    pub growth_rate_pct: Option<f64>,
    pub place_score: f64,
    pub economy_score: f64,
    pub community_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarBreakdown {
    pub pillar: String,
    pub score: f64,
    pub change_pct: Option<f64>,
    pub weight_pct: f64,
    pub status: String,
}

/// Indicator levels after applying the interventions to the latest year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionScenario {
    pub housing_burden_pct: Option<f64>,
    pub early_education_pct: Option<f64>,
    pub minority_business_pct: Option<f64>,
}

impl InterventionScenario {
    pub fn from_latest(latest: Option<&YearlyObservation>, params: &InterventionParameters) -> Self {
        Self {
            housing_burden_pct: latest
                .and_then(|o| o.housing_cost_burden_pct)
                .map(|v| shift_pct(v, -params.housing_burden_reduction_points)),
            early_education_pct: latest
                .and_then(|o| o.early_education_enrollment_pct)
                .map(|v| shift_pct(v, params.early_education_increase_points)),
            minority_business_pct: latest
                .and_then(|o| o.minority_owned_business_pct)
                .map(|v| shift_pct(v, params.minority_business_increase_points)),
        }
    }
}

/// Move a percentage by `delta` points, kept within 0..=100
fn shift_pct(level: f64, delta: f64) -> f64 {
    round_to_cents((level + delta).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub title: String,
    pub county: String,
    pub region: String,
    pub years_covered: Option<String>,
    pub total_observations: usize,
    /// Provider label, or `fallback` when the fixed series was substituted
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub current_igs: Option<f64>,
    pub previous_igs: Option<f64>,
    pub igs_change_pct: Option<f64>,
    pub status: TrendStatus,
    pub current_place: Option<f64>,
    pub current_economy: Option<f64>,
    pub current_community: Option<f64>,
}

/// Everything an export needs, derived once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub metadata: ReportMetadata,
    pub executive_summary: ExecutiveSummary,
    pub historical_data: Vec<YearlyObservation>,
    pub projection: ProjectionResult,
    pub scenario: InterventionScenario,
    pub model_info: ModelInfo,
    pub feature_importance: Vec<FeatureImportance>,
}

impl ReportData {
    pub fn new(
        region: &str,
        historical_data: Vec<YearlyObservation>,
        projection: ProjectionResult,
        feature_importance: Vec<FeatureImportance>,
        source: &str,
    ) -> Self {
        let latest = latest_pair(&historical_data);
        let current = latest.map(|(l, _)| l);
        let previous = latest.and_then(|(_, p)| p);
        let igs_change_pct = current.zip(previous).and_then(|(c, p)| pct_change(p.igs_score, c.igs_score));

        let years_covered = match (historical_data.first(), historical_data.last()) {
            (Some(first), Some(last)) => Some(format!("{}-{}", first.year, last.year)),
            _ => None,
        };

        Self {
            metadata: ReportMetadata {
                title: "Lonoke County IGS Comprehensive Report".to_string(),
                county: LONOKE_DISPLAY_NAME.to_string(),
                region: region.to_string(),
                years_covered,
                total_observations: historical_data.len(),
                source: source.to_string(),
            },
            executive_summary: ExecutiveSummary {
                current_igs: current.map(|o| o.igs_score),
                previous_igs: previous.map(|o| o.igs_score),
                igs_change_pct,
                status: TrendStatus::from_change(igs_change_pct),
                current_place: current.map(|o| o.place_score),
                current_economy: current.map(|o| o.economy_score),
                current_community: current.map(|o| o.community_score),
            },
            scenario: InterventionScenario::from_latest(current, &projection.parameters),
            historical_data,
            projection,
            model_info: ModelInfo::calibrated(),
            feature_importance,
        }
    }

    /// Resolve the series through `provider`, run `engine` and assemble the report.
    ///
    /// The projection is anchored on `anchor_score`, never on provider output.
    pub fn prepare(
        provider: &FallbackProvider,
        engine: &ProjectionEngine,
        region: &str,
        anchor_score: f64,
        years: (i32, i32),
        params: &InterventionParameters,
        feature_importance: Vec<FeatureImportance>,
    ) -> Result<Self, ProjectionError> {
        let projection = engine.project(anchor_score, years.0, years.1, params)?;
        let (series, origin) = provider.resolve(region);
        let source = match origin {
            SeriesOrigin::Primary => provider.inner_name(),
            SeriesOrigin::Fallback => "fallback",
        };
        Ok(Self::new(region, series, projection, feature_importance, source))
    }

    fn latest_and_previous(&self) -> Option<(&YearlyObservation, Option<&YearlyObservation>)> {
        latest_pair(&self.historical_data)
    }

    /// Latest IGS and pillar scores against the previous year
    pub fn key_metrics(&self) -> Vec<KeyMetric> {
        let Some((latest, previous)) = self.latest_and_previous() else {
            return Vec::new();
        };

        let metric = |name: &str, score: fn(&YearlyObservation) -> f64| {
            let prev = previous.map(score);
            let change_pct = prev.and_then(|p| pct_change(p, score(latest)));
            KeyMetric {
                metric: name.to_string(),
                current: score(latest),
                previous: prev,
                change_pct,
                status: TrendStatus::from_change(change_pct),
            }
        };

        vec![
            metric("IGS Score", |o| o.igs_score),
            metric("Place Score", |o| o.place_score),
            metric("Economy Score", |o| o.economy_score),
            metric("Community Score", |o| o.community_score),
        ]
    }

    /// Yearly scores with growth against the previous calendar year
    pub fn yearly_trends(&self) -> Vec<YearlyTrend> {
        self.historical_data
            .iter()
            .map(|o| YearlyTrend {
                year: o.year,
                igs_score: o.igs_score,
                growth_rate_pct: observation_for_year(&self.historical_data, o.year - 1)
                    .and_then(|prev| pct_change(prev.igs_score, o.igs_score)),
                place_score: o.place_score,
                economy_score: o.economy_score,
                community_score: o.community_score,
            })
            .collect()
    }

    /// Place / Economy / Community for the latest year
    pub fn pillars(&self) -> Vec<PillarBreakdown> {
        let Some((latest, previous)) = self.latest_and_previous() else {
            return Vec::new();
        };

        let pillar = |name: &str, score: fn(&YearlyObservation) -> f64| PillarBreakdown {
            pillar: name.to_string(),
            score: score(latest),
            change_pct: previous.and_then(|p| pct_change(score(p), score(latest))),
            weight_pct: PILLAR_WEIGHT_PCT,
            status: if score(latest) >= PILLAR_GOOD_SCORE {
                "Good".to_string()
            } else {
                "Needs Improvement".to_string()
            },
        };

        vec![
            pillar("Place", |o| o.place_score),
            pillar("Economy", |o| o.economy_score),
            pillar("Community", |o| o.community_score),
        ]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::history::{fallback_importance, reference_series, LONOKE_REGION};

    pub(crate) fn reference_report() -> ReportData {
        let projection = ProjectionEngine::default()
            .project_default(&InterventionParameters::reference_scenario())
            .unwrap();
        ReportData::new(LONOKE_REGION, reference_series(), projection, fallback_importance(), "embedded")
    }

    #[test]
    fn test_report_type_parsing() {
        assert_eq!("Predictions".parse::<ReportType>(), Ok(ReportType::Predictions));
        assert_eq!(" trends ".parse::<ReportType>(), Ok(ReportType::Trends));
        assert!("quarterly".parse::<ReportType>().is_err());
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(
            export_file_name(ReportType::Summary, ExportFormat::Csv, date),
            "Lonoke_County_summary_2025-03-09.csv"
        );
    }

    #[test]
    fn test_executive_summary() {
        let report = reference_report();
        let summary = &report.executive_summary;

        assert_eq!(summary.current_igs, Some(27.0));
        assert_eq!(summary.previous_igs, Some(28.0));
        assert_eq!(summary.igs_change_pct, Some(-3.57));
        assert_eq!(summary.status, TrendStatus::Declining);
        assert_eq!(report.metadata.years_covered.as_deref(), Some("2019-2024"));
        assert_eq!(report.metadata.total_observations, 6);
    }

    #[test]
    fn test_key_metrics_and_pillars() {
        let report = reference_report();

        let metrics = report.key_metrics();
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics[1].metric, "Place Score");
        assert_eq!(metrics[1].change_pct, Some(0.0));
        assert_eq!(metrics[1].status, TrendStatus::Stable);
        assert_eq!(metrics[2].change_pct, Some(-9.09));

        let pillars = report.pillars();
        assert_eq!(pillars[0].status, "Needs Improvement");
        assert_eq!(pillars[2].pillar, "Community");
        assert_eq!(pillars[2].status, "Good");
    }

    #[test]
    fn test_yearly_trends_use_explicit_years() {
        let mut report = reference_report();
        // Drop 2021 to leave a gap
        report.historical_data.retain(|o| o.year != 2021);

        let trends = report.yearly_trends();
        assert_eq!(trends[0].growth_rate_pct, None);
        assert_eq!(trends[1].growth_rate_pct, Some(-15.0));
        assert_eq!(trends[2].year, 2022);
        assert_eq!(trends[2].growth_rate_pct, None);
    }

    #[test]
    fn test_intervention_scenario_levels() {
        let report = reference_report();
        assert_eq!(report.scenario.housing_burden_pct, Some(78.0));
        assert_eq!(report.scenario.early_education_pct, Some(37.5));
        assert_eq!(report.scenario.minority_business_pct, Some(9.5));

        let latest = reference_series().pop();
        let extreme = InterventionScenario::from_latest(latest.as_ref(), &InterventionParameters::new(100.0, 100.0, 100.0));
        assert_eq!(extreme.housing_burden_pct, Some(0.0));
        assert_eq!(extreme.early_education_pct, Some(100.0));
        assert_eq!(extreme.minority_business_pct, Some(100.0));
    }

    #[test]
    fn test_empty_series_still_reports_projection() {
        let projection = ProjectionEngine::default()
            .project_default(&InterventionParameters::none())
            .unwrap();
        let report = ReportData::new(LONOKE_REGION, Vec::new(), projection, Vec::new(), "embedded");

        assert!(report.key_metrics().is_empty());
        assert!(report.pillars().is_empty());
        assert_eq!(report.executive_summary.current_igs, None);
        assert_eq!(report.projection.rows.len(), 7);
    }

    #[test]
    fn test_prepare_falls_back() {
        struct Broken;
        impl crate::history::HistoricalDataProvider for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn get_series(&self, region: &str) -> Result<Vec<YearlyObservation>, crate::history::HistoryError> {
                Err(crate::history::HistoryError::UnknownRegion(region.to_string()))
            }
        }

        let provider = FallbackProvider::new(Box::new(Broken));
        let report = ReportData::prepare(
            &provider,
            &ProjectionEngine::default(),
            LONOKE_REGION,
            27.0,
            (2024, 2030),
            &InterventionParameters::reference_scenario(),
            Vec::new(),
        )
        .unwrap();

        assert_eq!(report.metadata.source, "fallback");
        assert_eq!(report.historical_data.len(), 6);
    }
}
