//! Core projection engine for yearly IGS what-if forecasts

use log::debug;
use serde::{Deserialize, Serialize};

use super::coefficients::{ImpactCoefficients, InterventionParameters};
use super::error::ProjectionError;
use super::forecast::{round_to_cents, ForecastRow, ProjectionResult};

/// Known IGS score for the county in the anchor year
pub const DEFAULT_ANCHOR_SCORE: f64 = 27.0;
pub const DEFAULT_START_YEAR: i32 = 2024;
pub const DEFAULT_END_YEAR: i32 = 2030;
/// Score above which the region is no longer considered distressed
pub const DEFAULT_THRESHOLD: f64 = 45.0;

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Baseline points lost per year after the anchor year
    pub baseline_decline_rate_per_year: f64,

    /// Growth of intervention impact per year after the anchor year
    pub amplification_rate_per_year: f64,

    /// Clamp every score at zero
    pub floor_at_zero: bool,

    /// Threshold used for the crossing summary
    pub threshold_value: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            baseline_decline_rate_per_year: 0.3,
            amplification_rate_per_year: 0.15,
            floor_at_zero: true,
            threshold_value: DEFAULT_THRESHOLD,
        }
    }
}

impl ProjectionConfig {
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let rates = [
            ("baseline_decline_rate_per_year", self.baseline_decline_rate_per_year),
            ("amplification_rate_per_year", self.amplification_rate_per_year),
        ];
        for (name, value) in rates {
            if !value.is_finite() {
                return Err(ProjectionError::InvalidConfig { name, value, reason: "must be finite" });
            }
            if value <= 0.0 {
                return Err(ProjectionError::InvalidConfig { name, value, reason: "must be positive" });
            }
        }

        if !self.threshold_value.is_finite() {
            return Err(ProjectionError::InvalidConfig {
                name: "threshold_value",
                value: self.threshold_value,
                reason: "must be finite",
            });
        }

        Ok(())
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    coefficients: ImpactCoefficients,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given coefficients and config
    pub fn new(coefficients: ImpactCoefficients, config: ProjectionConfig) -> Self {
        Self { coefficients, config }
    }

    pub fn coefficients(&self) -> &ImpactCoefficients {
        &self.coefficients
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project the county's default 2024-2030 window from the 27.0 anchor
    pub fn project_default(&self, params: &InterventionParameters) -> Result<ProjectionResult, ProjectionError> {
        self.project(DEFAULT_ANCHOR_SCORE, DEFAULT_START_YEAR, DEFAULT_END_YEAR, params)
    }

    /// Run a projection producing one row per year in `start_year..=end_year`
    pub fn project(
        &self,
        anchor_score: f64,
        start_year: i32,
        end_year: i32,
        params: &InterventionParameters,
    ) -> Result<ProjectionResult, ProjectionError> {
        if !anchor_score.is_finite() {
            return Err(ProjectionError::InvalidConfig {
                name: "baseline_anchor_score",
                value: anchor_score,
                reason: "must be finite",
            });
        }
        if end_year < start_year {
            return Err(ProjectionError::InvalidRange { start_year, end_year });
        }
        params.validate()?;
        self.coefficients.validate()?;
        self.config.validate()?;

        // Impact magnitudes are fixed; only the amplification varies by year
        let impacts = self.coefficients.impacts(params);
        let combined_impact = impacts.combined();

        let rows = (start_year..=end_year)
            .map(|year| {
                let offset = f64::from(year - start_year);
                let baseline = anchor_score - self.config.baseline_decline_rate_per_year * offset;
                let amplification = 1.0 + self.config.amplification_rate_per_year * offset;

                let row = ForecastRow {
                    year,
                    baseline_score: self.finish_score(baseline),
                    housing_scenario_score: self.finish_score(baseline + impacts.housing * amplification),
                    education_scenario_score: self.finish_score(baseline + impacts.education * amplification),
                    business_scenario_score: self.finish_score(baseline + impacts.business * amplification),
                    combined_scenario_score: self.finish_score(baseline + combined_impact * amplification),
                };
                check_finite(&row)?;
                Ok(row)
            })
            .collect::<Result<Vec<_>, ProjectionError>>()?;

        debug!(
            "Projected {} years from {:.2} (h={}, e={}, b={})",
            rows.len(),
            anchor_score,
            params.housing_burden_reduction_points,
            params.early_education_increase_points,
            params.minority_business_increase_points,
        );

        Ok(ProjectionResult::from_rows(
            anchor_score,
            *params,
            impacts,
            rows,
            self.config.threshold_value,
        ))
    }

    /// Apply the zero floor (if configured) then round to cents
    fn finish_score(&self, score: f64) -> f64 {
        let floored = if self.config.floor_at_zero { score.max(0.0) } else { score };
        round_to_cents(floored)
    }
}

fn check_finite(row: &ForecastRow) -> Result<(), ProjectionError> {
    match row.scores().into_iter().find(|(_, value)| !value.is_finite()) {
        Some((column, value)) => Err(ProjectionError::Computation { year: row.year, column, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_result() -> ProjectionResult {
        ProjectionEngine::default()
            .project(27.0, 2024, 2030, &InterventionParameters::new(8.5, 4.1, 1.2))
            .unwrap()
    }

    fn decimals_at_most_two(value: f64) -> bool {
        ((value * 100.0).round() - value * 100.0).abs() < 1e-6
    }

    #[test]
    fn test_reference_scenario_2030() {
        let result = reference_result();
        let last = result.rows.last().unwrap();

        assert_eq!(last.year, 2030);
        assert_eq!(last.baseline_score, 25.2);
        // 25.2 + (8.5*0.85 + 4.1*1.76 + 1.2*0.79) * (1 + 0.15*6) = 54.4391
        assert_eq!(last.combined_scenario_score, 54.44);
        assert_eq!(last.housing_scenario_score, 38.93);
        assert_eq!(last.education_scenario_score, 38.91);
        assert_eq!(last.business_scenario_score, 27.0);

        assert_eq!(result.final_baseline, 25.2);
        assert_eq!(result.final_combined, 54.44);
        assert_eq!(result.net_improvement, 29.24);
        assert!(result.crosses_threshold);
    }

    #[test]
    fn test_reference_scenario_first_crossing() {
        let result = reference_result();

        // 2025: 26.7 + 15.389 * 1.15 = 44.397..., 2026: 26.4 + 15.389 * 1.3 = 46.4057
        assert_eq!(result.row_for_year(2025).unwrap().combined_scenario_score, 44.4);
        assert_eq!(result.row_for_year(2026).unwrap().combined_scenario_score, 46.41);
        assert_eq!(result.year_threshold_first_crossed, Some(2026));
    }

    #[test]
    fn test_row_count_matches_span() {
        let engine = ProjectionEngine::default();
        for (start, end) in [(2024, 2024), (2024, 2030), (1999, 2041)] {
            let result = engine.project(27.0, start, end, &InterventionParameters::reference_scenario()).unwrap();
            assert_eq!(result.rows.len(), (end - start + 1) as usize);
            for (i, row) in result.rows.iter().enumerate() {
                assert_eq!(row.year, start + i as i32);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let engine = ProjectionEngine::default();
        let params = InterventionParameters::new(3.3, 7.7, 0.4);
        let a = engine.project(31.5, 2020, 2035, &params).unwrap();
        let b = engine.project(31.5, 2020, 2035, &params).unwrap();

        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_zero_intervention_matches_baseline() {
        let result = ProjectionEngine::default()
            .project(27.0, 2024, 2030, &InterventionParameters::none())
            .unwrap();

        for row in &result.rows {
            assert_eq!(row.housing_scenario_score, row.baseline_score);
            assert_eq!(row.education_scenario_score, row.baseline_score);
            assert_eq!(row.business_scenario_score, row.baseline_score);
            assert_eq!(row.combined_scenario_score, row.baseline_score);
        }
        assert_eq!(result.net_improvement, 0.0);
        assert_eq!(result.year_threshold_first_crossed, None);
    }

    #[test]
    fn test_monotonic_in_each_intervention() {
        let engine = ProjectionEngine::default();
        let base = InterventionParameters::new(2.0, 2.0, 2.0);
        let low = engine.project(27.0, 2024, 2030, &base).unwrap();

        let bumps = [
            InterventionParameters { housing_burden_reduction_points: 6.0, ..base },
            InterventionParameters { early_education_increase_points: 6.0, ..base },
            InterventionParameters { minority_business_increase_points: 6.0, ..base },
        ];

        for (which, params) in bumps.iter().enumerate() {
            let high = engine.project(27.0, 2024, 2030, params).unwrap();
            for (lo, hi) in low.rows.iter().zip(&high.rows) {
                let (lo_own, hi_own) = match which {
                    0 => (lo.housing_scenario_score, hi.housing_scenario_score),
                    1 => (lo.education_scenario_score, hi.education_scenario_score),
                    _ => (lo.business_scenario_score, hi.business_scenario_score),
                };
                assert!(hi_own >= lo_own);
                assert!(hi.combined_scenario_score >= lo.combined_scenario_score);
            }
        }
    }

    #[test]
    fn test_scores_have_two_decimals() {
        let result = ProjectionEngine::default()
            .project(33.333, 2024, 2040, &InterventionParameters::new(1.111, 2.222, 3.333))
            .unwrap();

        for row in &result.rows {
            for (_, value) in row.scores() {
                assert!(decimals_at_most_two(value), "{} has more than 2 decimals", value);
            }
        }
    }

    #[test]
    fn test_floor_at_zero() {
        let config = ProjectionConfig {
            baseline_decline_rate_per_year: 5.0,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(ImpactCoefficients::default(), config);
        let result = engine.project(3.0, 2024, 2030, &InterventionParameters::none()).unwrap();

        assert!(result.rows.iter().all(|r| r.scores().iter().all(|(_, v)| *v >= 0.0)));
        assert_eq!(result.final_baseline, 0.0);
    }

    #[test]
    fn test_without_floor_scores_go_negative() {
        let config = ProjectionConfig {
            baseline_decline_rate_per_year: 5.0,
            floor_at_zero: false,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(ImpactCoefficients::default(), config);
        let result = engine.project(3.0, 2024, 2030, &InterventionParameters::none()).unwrap();

        assert_relative_eq!(result.final_baseline, -27.0);
    }

    #[test]
    fn test_negative_parameter_yields_no_result() {
        let result = ProjectionEngine::default().project(27.0, 2024, 2030, &InterventionParameters::new(-1.0, 0.0, 0.0));
        assert!(matches!(result, Err(ProjectionError::InvalidParameter { .. })));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = ProjectionEngine::default().project(27.0, 2030, 2024, &InterventionParameters::none());
        assert_eq!(
            result.unwrap_err(),
            ProjectionError::InvalidRange { start_year: 2030, end_year: 2024 }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let coefficients = ImpactCoefficients {
            business_impact_per_point: -0.79,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(coefficients, ProjectionConfig::default());
        assert!(matches!(
            engine.project_default(&InterventionParameters::none()),
            Err(ProjectionError::InvalidConfig { .. })
        ));

        let config = ProjectionConfig {
            amplification_rate_per_year: f64::NAN,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(ImpactCoefficients::default(), config);
        assert!(engine.project_default(&InterventionParameters::none()).is_err());

        for config in [
            ProjectionConfig { baseline_decline_rate_per_year: 0.0, ..Default::default() },
            ProjectionConfig { amplification_rate_per_year: 0.0, ..Default::default() },
            ProjectionConfig { amplification_rate_per_year: -0.15, ..Default::default() },
        ] {
            let engine = ProjectionEngine::new(ImpactCoefficients::default(), config);
            match engine.project_default(&InterventionParameters::reference_scenario()) {
                Err(ProjectionError::InvalidConfig { reason, .. }) => assert_eq!(reason, "must be positive"),
                other => panic!("expected InvalidConfig, got {:?}", other),
            }
        }

        assert!(ProjectionEngine::default()
            .project(f64::INFINITY, 2024, 2030, &InterventionParameters::none())
            .is_err());
    }

    #[test]
    fn test_custom_threshold() {
        let config = ProjectionConfig {
            threshold_value: 60.0,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(ImpactCoefficients::default(), config);
        let result = engine.project_default(&InterventionParameters::reference_scenario()).unwrap();

        assert_eq!(result.threshold_value, 60.0);
        assert_eq!(result.year_threshold_first_crossed, None);
        assert!(!result.crosses_threshold);
    }

    #[test]
    fn test_huge_inputs_surface_computation_error() {
        let result = ProjectionEngine::default().project(27.0, 2024, 2030, &InterventionParameters::new(f64::MAX, 0.0, 0.0));
        assert!(matches!(result, Err(ProjectionError::Computation { .. })));
    }
}
