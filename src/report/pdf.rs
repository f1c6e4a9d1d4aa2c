//! Titled-section table model consumed by a PDF writer

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::{cell2, ReportData, ReportType, Table};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfSection {
    pub title: String,
    #[serde(flatten)]
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfDocument {
    pub title: String,
    pub sections: Vec<PdfSection>,
}

impl PdfDocument {
    pub fn section(&self, title: &str) -> Option<&PdfSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Plain-text preview: title, then each section as pipe-separated rows
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        for section in &self.sections {
            let _ = writeln!(out, "\n## {}", section.title);
            let _ = writeln!(out, "{}", section.table.head.join(" | "));
            for row in &section.table.body {
                let _ = writeln!(out, "{}", row.join(" | "));
            }
        }
        out
    }
}

fn or_na(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn pct_or_na(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}%", decimals, v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn dollars_or_na(value: Option<f64>) -> String {
    value
        .map(|v| format!("${:.0}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn section(title: impl Into<String>, table: Table) -> PdfSection {
    PdfSection {
        title: title.into(),
        table,
    }
}

fn key_metrics_table(data: &ReportData) -> Table {
    let mut table = Table::new(&["Metric", "Current Value", "Change %", "Status"]);
    for m in data.key_metrics() {
        table.push(vec![
            m.metric,
            cell2(m.current),
            pct_or_na(m.change_pct, 2),
            m.status.as_str().to_string(),
        ]);
    }
    table
}

fn historical_scores_table(data: &ReportData) -> Table {
    let mut table = Table::new(&["Year", "IGS", "Place", "Economy", "Community"]);
    for o in &data.historical_data {
        table.push(vec![
            o.year.to_string(),
            cell2(o.igs_score),
            cell2(o.place_score),
            cell2(o.economy_score),
            cell2(o.community_score),
        ]);
    }
    table
}

fn indicator_table(data: &ReportData) -> Table {
    let mut table = Table::new(&[
        "Year",
        "Median Income",
        "Broadband %",
        "Housing Burden %",
        "Early Ed %",
        "Minority Business %",
    ]);
    for o in data.historical_data.iter().filter(|o| o.has_indicators()) {
        table.push(vec![
            o.year.to_string(),
            dollars_or_na(o.median_income),
            or_na(o.broadband_access_pct, 1),
            or_na(o.housing_cost_burden_pct, 1),
            or_na(o.early_education_enrollment_pct, 1),
            or_na(o.minority_owned_business_pct, 2),
        ]);
    }
    table
}

fn model_table(data: &ReportData) -> Table {
    let info = &data.model_info;
    let mut table = Table::new(&["Model Information", "Value"]);
    table.push(vec!["Algorithm".to_string(), info.algorithm.clone()]);
    table.push(vec!["R² Score (Accuracy)".to_string(), cell2(info.r2_score)]);
    table.push(vec!["Training Counties".to_string(), info.training_counties.to_string()]);
    table.push(vec!["Features Used".to_string(), info.features.to_string()]);
    table
}

fn forecast_table(data: &ReportData) -> Table {
    let mut table = Table::new(&["Year", "Baseline", "Housing", "Education", "Business", "Combined"]);
    for r in &data.projection.rows {
        table.push(vec![
            r.year.to_string(),
            cell2(r.baseline_score),
            cell2(r.housing_scenario_score),
            cell2(r.education_scenario_score),
            cell2(r.business_scenario_score),
            cell2(r.combined_scenario_score),
        ]);
    }
    table
}

fn forecast_title(data: &ReportData) -> String {
    match data.projection.end_year() {
        Some(end) => format!("Intervention Scenarios to {}", end),
        None => "Intervention Scenarios".to_string(),
    }
}

fn impact_table(data: &ReportData) -> Table {
    let impacts = &data.projection.impact_summary;
    let params = &data.projection.parameters;
    let scenario = &data.scenario;

    let mut table = Table::new(&["Intervention", "Change", "Resulting Level", "IGS Impact"]);
    table.push(vec![
        "Housing Affordability".to_string(),
        format!("-{:.1} pts burden", params.housing_burden_reduction_points),
        pct_or_na(scenario.housing_burden_pct, 1),
        format!("+{:.2}", impacts.housing),
    ]);
    table.push(vec![
        "Early Education".to_string(),
        format!("+{:.1} pts enrollment", params.early_education_increase_points),
        pct_or_na(scenario.early_education_pct, 1),
        format!("+{:.2}", impacts.education),
    ]);
    table.push(vec![
        "Small Business Support".to_string(),
        format!("+{:.1} pts minority-owned", params.minority_business_increase_points),
        pct_or_na(scenario.minority_business_pct, 1),
        format!("+{:.2}", impacts.business),
    ]);
    table.push(vec![
        "Combined (All Three)".to_string(),
        "All three interventions together".to_string(),
        NOT_AVAILABLE.to_string(),
        format!("+{:.2}", impacts.combined),
    ]);
    table
}

fn findings_table(data: &ReportData) -> Table {
    let p = &data.projection;
    let mut table = Table::new(&["Finding", "Value"]);
    table.push(vec!["Threshold for Success".to_string(), format!("{} points", p.threshold_value)]);
    table.push(vec!["Baseline Final Year".to_string(), cell2(p.final_baseline)]);
    table.push(vec!["Combined Final Year".to_string(), cell2(p.final_combined)]);
    table.push(vec!["Net Improvement".to_string(), cell2(p.net_improvement)]);
    table.push(vec![
        "Crosses Threshold?".to_string(),
        match p.year_threshold_first_crossed {
            Some(year) => format!("Yes, first in {}", year),
            None => "No (Needs More)".to_string(),
        },
    ]);
    table
}

/// Section list for `report_type`; empty tables are dropped
pub fn build_pdf_document(data: &ReportData, report_type: ReportType) -> PdfDocument {
    let (title, sections) = match report_type {
        ReportType::Comprehensive => {
            let history_title = match &data.metadata.years_covered {
                Some(years) => format!("Historical Trends ({})", years),
                None => "Historical Trends".to_string(),
            };

            let mut importance = Table::new(&["Feature", "Importance"]);
            for f in data.feature_importance.iter().take(10) {
                importance.push(vec![f.feature.clone(), format!("{:.4}", f.importance)]);
            }

            (
                "Lonoke County - Comprehensive IGS Report",
                vec![
                    section("Executive Summary", key_metrics_table(data)),
                    section(history_title, historical_scores_table(data)),
                    section("Key Indicators", indicator_table(data)),
                    section("Machine Learning Model Information", model_table(data)),
                    section("Top 10 Most Important Features", importance),
                    section(forecast_title(data), forecast_table(data)),
                ],
            )
        }
        ReportType::Summary => (
            "Lonoke County - Executive Summary",
            vec![section("Key Metrics Overview", key_metrics_table(data))],
        ),
        ReportType::Trends => {
            let mut growth = Table::new(&["Year", "IGS Score", "Growth Rate %"]);
            let mut pillars = Table::new(&["Year", "Place Score", "Economy Score", "Community Score"]);
            for t in data.yearly_trends() {
                growth.push(vec![t.year.to_string(), cell2(t.igs_score), or_na(t.growth_rate_pct, 2)]);
                pillars.push(vec![
                    t.year.to_string(),
                    cell2(t.place_score),
                    cell2(t.economy_score),
                    cell2(t.community_score),
                ]);
            }
            (
                "Lonoke County - Trends Analysis",
                vec![
                    section("Year-over-Year Growth Analysis", growth),
                    section("Pillar Trends Over Time", pillars),
                    section("Key Indicator Trends", indicator_table(data)),
                ],
            )
        }
        ReportType::Pillars => {
            let mut breakdown = Table::new(&["Pillar", "Score", "Change %", "Weight %", "Status"]);
            for p in data.pillars() {
                breakdown.push(vec![
                    p.pillar,
                    cell2(p.score),
                    or_na(p.change_pct, 2),
                    format!("{:.1}", p.weight_pct),
                    p.status,
                ]);
            }
            (
                "Lonoke County - Pillar Breakdown",
                vec![section("Three Pillars of Inclusive Growth", breakdown)],
            )
        }
        ReportType::Predictions => (
            "Lonoke County - ML Predictions",
            vec![
                section("Model Details", model_table(data)),
                section(forecast_title(data), forecast_table(data)),
                section("Intervention Impact Details", impact_table(data)),
                section("Key Findings", findings_table(data)),
            ],
        ),
    };

    PdfDocument {
        title: title.to_string(),
        sections: sections.into_iter().filter(|s| !s.table.is_empty()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::reference_report;

    #[test]
    fn test_predictions_document() {
        let doc = build_pdf_document(&reference_report(), ReportType::Predictions);
        assert_eq!(doc.sections.len(), 4);

        let forecast = doc.section("Intervention Scenarios to 2030").unwrap();
        assert_eq!(forecast.table.body.len(), 7);
        assert_eq!(forecast.table.body[6], ["2030", "25.20", "38.93", "38.91", "27.00", "54.44"]);

        let findings = doc.section("Key Findings").unwrap();
        assert_eq!(findings.table.body[4][1], "Yes, first in 2026");

        let impacts = doc.section("Intervention Impact Details").unwrap();
        assert_eq!(impacts.table.body[0][2], "78.0%");
        assert_eq!(impacts.table.body[3][3], "+15.39");
    }

    #[test]
    fn test_impact_cells_match_api() {
        use crate::api::{SimulationRequest, SimulationResponse};

        let report = reference_report();
        let request = SimulationRequest {
            housing_reduction: 8.5,
            education_increase: 4.1,
            business_increase: 1.2,
        };
        let api = SimulationResponse::from_result(&request, &report.projection).impacts;

        let doc = build_pdf_document(&report, ReportType::Predictions);
        let body = &doc.section("Intervention Impact Details").unwrap().table.body;
        let cells: Vec<f64> = body.iter().map(|row| row[3].trim_start_matches('+').parse().unwrap()).collect();

        assert_eq!(cells, [api.housing, api.education, api.business, api.combined]);
        // 7.225 must not print as 7.22 anywhere
        assert_eq!(body[0][3], "+7.23");
        assert_eq!(api.housing, 7.23);
    }

    #[test]
    fn test_comprehensive_document() {
        let doc = build_pdf_document(&reference_report(), ReportType::Comprehensive);

        let summary = doc.section("Executive Summary").unwrap();
        assert_eq!(summary.table.body[0], ["IGS Score", "27.00", "-3.57%", "Declining"]);
        assert!(doc.section("Historical Trends (2019-2024)").is_some());
        assert_eq!(doc.section("Key Indicators").unwrap().table.body[5][1], "$36500");
        assert_eq!(doc.section("Top 10 Most Important Features").unwrap().table.body.len(), 8);
    }

    #[test]
    fn test_empty_sections_dropped() {
        let mut report = reference_report();
        report.historical_data.clear();
        report.feature_importance.clear();

        let doc = build_pdf_document(&report, ReportType::Comprehensive);
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Machine Learning Model Information", "Intervention Scenarios to 2030"]);
    }

    #[test]
    fn test_render_text() {
        let doc = build_pdf_document(&reference_report(), ReportType::Pillars);
        let text = doc.render_text();
        assert!(text.starts_with("Lonoke County - Pillar Breakdown\n"));
        assert!(text.contains("## Three Pillars of Inclusive Growth"));
        assert!(text.contains("Community | 40.00 | -2.44 | 33.3 | Good"));
    }
}
