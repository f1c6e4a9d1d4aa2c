//! Forecast output structures for projections

use serde::{Deserialize, Serialize};

use super::coefficients::{ImpactSummary, InterventionParameters, ScenarioImpacts};

/// Round to 2 decimal places, halves away from zero.
///
/// Exported values are rounded when rows are built, not when displayed, so
/// CSV/JSON/PDF output carries exactly these numbers.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A single projected year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub year: i32,
    pub baseline_score: f64,
    pub housing_scenario_score: f64,
    pub education_scenario_score: f64,
    pub business_scenario_score: f64,
    pub combined_scenario_score: f64,
}

impl ForecastRow {
    /// Scores in column order, paired with their column names
    pub fn scores(&self) -> [(&'static str, f64); 5] {
        [
            ("baseline_score", self.baseline_score),
            ("housing_scenario_score", self.housing_scenario_score),
            ("education_scenario_score", self.education_scenario_score),
            ("business_scenario_score", self.business_scenario_score),
            ("combined_scenario_score", self.combined_scenario_score),
        ]
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Score at the first projected year
    pub anchor_score: f64,

    /// Interventions this projection was run with
    pub parameters: InterventionParameters,

    /// Unamplified impact magnitudes (unrounded), used to build the rows
    #[serde(skip_serializing, default)]
    pub impacts: ScenarioImpacts,

    /// Cent-rounded impacts; the only form any export shows
    pub impact_summary: ImpactSummary,

    /// One row per year, ascending
    pub rows: Vec<ForecastRow>,

    /// Score at or above which the region is no longer distressed
    pub threshold_value: f64,

    pub final_baseline: f64,
    pub final_combined: f64,
    pub net_improvement: f64,
    pub crosses_threshold: bool,

    /// First year whose combined score reaches the threshold, if any
    pub year_threshold_first_crossed: Option<i32>,
}

impl ProjectionResult {
    /// Build the result and its summary fields from completed rows
    pub(crate) fn from_rows(
        anchor_score: f64,
        parameters: InterventionParameters,
        impacts: ScenarioImpacts,
        rows: Vec<ForecastRow>,
        threshold_value: f64,
    ) -> Self {
        let final_baseline = rows.last().map(|r| r.baseline_score).unwrap_or(anchor_score);
        let final_combined = rows.last().map(|r| r.combined_scenario_score).unwrap_or(anchor_score);

        let year_threshold_first_crossed = rows
            .iter()
            .find(|r| r.combined_scenario_score >= threshold_value)
            .map(|r| r.year);

        Self {
            anchor_score,
            parameters,
            impact_summary: impacts.rounded(),
            impacts,
            rows,
            threshold_value,
            final_baseline,
            final_combined,
            net_improvement: round_to_cents(final_combined - final_baseline),
            crosses_threshold: final_combined >= threshold_value,
            year_threshold_first_crossed,
        }
    }

    /// Row for an explicit year
    pub fn row_for_year(&self, year: i32) -> Option<&ForecastRow> {
        self.rows.iter().find(|r| r.year == year)
    }

    pub fn start_year(&self) -> Option<i32> {
        self.rows.first().map(|r| r.year)
    }

    pub fn end_year(&self) -> Option<i32> {
        self.rows.last().map(|r| r.year)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            total_years: self.rows.len() as u32,
            final_baseline: self.final_baseline,
            final_combined: self.final_combined,
            net_improvement: self.net_improvement,
            crosses_threshold: self.crosses_threshold,
            year_threshold_first_crossed: self.year_threshold_first_crossed,
            peak_combined: self
                .rows
                .iter()
                .map(|r| r.combined_scenario_score)
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub final_baseline: f64,
    pub final_combined: f64,
    pub net_improvement: f64,
    pub crosses_threshold: bool,
    pub year_threshold_first_crossed: Option<i32>,
    pub peak_combined: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, baseline: f64, combined: f64) -> ForecastRow {
        ForecastRow {
            year,
            baseline_score: baseline,
            housing_scenario_score: baseline,
            education_scenario_score: baseline,
            business_scenario_score: baseline,
            combined_scenario_score: combined,
        }
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(54.4391), 54.44);
        assert_eq!(round_to_cents(27.0012), 27.0);
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(-0.125), -0.13);
    }

    #[test]
    fn test_threshold_year_is_first_crossing() {
        let rows = vec![
            row(2024, 27.0, 40.0),
            row(2025, 26.7, 44.99),
            row(2026, 26.4, 45.0),
            row(2027, 26.1, 44.0),
            row(2028, 25.8, 47.0),
        ];
        let result = ProjectionResult::from_rows(
            27.0,
            InterventionParameters::none(),
            ScenarioImpacts::default(),
            rows,
            45.0,
        );

        assert_eq!(result.year_threshold_first_crossed, Some(2026));
        assert!(result.crosses_threshold);
        assert_eq!(result.net_improvement, 21.2);
    }

    #[test]
    fn test_threshold_never_reached_is_none() {
        let rows = vec![row(2024, 27.0, 30.0), row(2025, 26.7, 31.0)];
        let result = ProjectionResult::from_rows(
            27.0,
            InterventionParameters::none(),
            ScenarioImpacts::default(),
            rows,
            45.0,
        );

        assert_eq!(result.year_threshold_first_crossed, None);
        assert!(!result.crosses_threshold);
        assert_eq!(result.summary().peak_combined, 31.0);
    }

    #[test]
    fn test_row_lookup_by_year() {
        let rows = vec![row(2024, 27.0, 30.0), row(2025, 26.7, 31.0)];
        let result = ProjectionResult::from_rows(
            27.0,
            InterventionParameters::none(),
            ScenarioImpacts::default(),
            rows,
            45.0,
        );

        assert_eq!(result.row_for_year(2025).map(|r| r.baseline_score), Some(26.7));
        assert!(result.row_for_year(2030).is_none());
        assert_eq!(result.start_year(), Some(2024));
        assert_eq!(result.end_year(), Some(2025));
    }
}
