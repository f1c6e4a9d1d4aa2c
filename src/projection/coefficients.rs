//! Intervention magnitudes and the impact coefficients that price them

use serde::{Deserialize, Serialize};

use super::error::ProjectionError;
use super::forecast::round_to_cents;

/// IGS points gained per percentage point of housing-burden reduction
pub const HOUSING_IMPACT_PER_POINT: f64 = 0.85;
/// IGS points gained per percentage point of early-education enrollment
pub const EDUCATION_IMPACT_PER_POINT: f64 = 1.76;
/// IGS points gained per percentage point of minority-owned businesses
pub const BUSINESS_IMPACT_PER_POINT: f64 = 0.79;

/// Percentage-point deltas applied to the baseline indicators
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InterventionParameters {
    /// Reduction of the housing cost burden share
    pub housing_burden_reduction_points: f64,

    /// Increase of early-education enrollment
    pub early_education_increase_points: f64,

    /// Increase of the minority-owned business share
    pub minority_business_increase_points: f64,
}

impl InterventionParameters {
    pub fn new(housing: f64, education: f64, business: f64) -> Self {
        Self {
            housing_burden_reduction_points: housing,
            early_education_increase_points: education,
            minority_business_increase_points: business,
        }
    }

    /// No intervention at all
    pub fn none() -> Self {
        Self::default()
    }

    /// The scenario the dashboard opens with: housing burden 86.5% -> 78%,
    /// enrollment 33.4% -> 37.5%, minority businesses 8.3% -> 9.5%.
    pub fn reference_scenario() -> Self {
        Self::new(8.5, 4.1, 1.2)
    }

    /// Reject negative or non-finite magnitudes instead of clamping them
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let fields = [
            ("housing_burden_reduction_points", self.housing_burden_reduction_points),
            ("early_education_increase_points", self.early_education_increase_points),
            ("minority_business_increase_points", self.minority_business_increase_points),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ProjectionError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }
}

/// Externally calibrated multipliers; configuration, not runtime state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactCoefficients {
    pub housing_impact_per_point: f64,
    pub education_impact_per_point: f64,
    pub business_impact_per_point: f64,
}

impl Default for ImpactCoefficients {
    fn default() -> Self {
        Self {
            housing_impact_per_point: HOUSING_IMPACT_PER_POINT,
            education_impact_per_point: EDUCATION_IMPACT_PER_POINT,
            business_impact_per_point: BUSINESS_IMPACT_PER_POINT,
        }
    }
}

impl ImpactCoefficients {
    /// Every coefficient must be finite and strictly positive
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let fields = [
            ("housing_impact_per_point", self.housing_impact_per_point),
            ("education_impact_per_point", self.education_impact_per_point),
            ("business_impact_per_point", self.business_impact_per_point),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ProjectionError::InvalidConfig {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
            if value <= 0.0 {
                return Err(ProjectionError::InvalidConfig {
                    name,
                    value,
                    reason: "must be positive",
                });
            }
        }

        Ok(())
    }

    /// Impact magnitudes for a set of interventions (year independent)
    pub fn impacts(&self, params: &InterventionParameters) -> ScenarioImpacts {
        ScenarioImpacts {
            housing: params.housing_burden_reduction_points * self.housing_impact_per_point,
            education: params.early_education_increase_points * self.education_impact_per_point,
            business: params.minority_business_increase_points * self.business_impact_per_point,
        }
    }
}

/// Provenance of the calibrated coefficients, reported alongside results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub algorithm: String,
    pub r2_score: f64,
    pub training_counties: u32,
    pub features: u32,
}

impl ModelInfo {
    /// Random forest fit on the county plus three solution counties
    pub fn calibrated() -> Self {
        Self {
            algorithm: "Random Forest Regressor".to_string(),
            r2_score: 0.73,
            training_counties: 3,
            features: 78,
        }
    }
}

/// Unamplified IGS impact of each single intervention
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioImpacts {
    pub housing: f64,
    pub education: f64,
    pub business: f64,
}

impl ScenarioImpacts {
    /// All three interventions applied together
    pub fn combined(&self) -> f64 {
        self.housing + self.education + self.business
    }

    /// Cent-rounded magnitudes shared by every output format.
    ///
    /// `combined` rounds the raw sum, not the sum of the rounded parts.
    pub fn rounded(&self) -> ImpactSummary {
        ImpactSummary {
            housing: round_to_cents(self.housing),
            education: round_to_cents(self.education),
            business: round_to_cents(self.business),
            combined: round_to_cents(self.combined()),
        }
    }
}

/// Rounded impact magnitudes as exported
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub housing: f64,
    pub education: f64,
    pub business: f64,
    pub combined: f64,
}
