//! Projection engine for policy-intervention what-if forecasts

mod coefficients;
mod engine;
mod error;
mod forecast;

pub use coefficients::{
    ImpactCoefficients, ImpactSummary, InterventionParameters, ModelInfo, ScenarioImpacts, BUSINESS_IMPACT_PER_POINT,
    EDUCATION_IMPACT_PER_POINT, HOUSING_IMPACT_PER_POINT,
};
pub use engine::{
    ProjectionConfig, ProjectionEngine, DEFAULT_ANCHOR_SCORE, DEFAULT_END_YEAR, DEFAULT_START_YEAR,
    DEFAULT_THRESHOLD,
};
pub use error::ProjectionError;
pub use forecast::{round_to_cents, ForecastRow, ProjectionResult, ProjectionSummary};
