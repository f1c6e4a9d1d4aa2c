//! Scenario runner for batch and grid projections
//!
//! Holds one engine and one anchor/year range, then projects many intervention
//! sets against it. Each projection is independent, so grids run in parallel.

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::projection::{
    InterventionParameters, ProjectionEngine, ProjectionError, ProjectionResult, DEFAULT_ANCHOR_SCORE,
    DEFAULT_END_YEAR, DEFAULT_START_YEAR,
};

/// Pre-configured runner for many intervention sets
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let grid = ScenarioGrid::uniform(10.0, 2.5);
/// let points = runner.run_grid(&grid);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
    anchor_score: f64,
    start_year: i32,
    end_year: i32,
}

impl ScenarioRunner {
    /// Default engine, anchor 27.0 and 2024..=2030
    pub fn new() -> Self {
        Self::with_engine(ProjectionEngine::default())
    }

    pub fn with_engine(engine: ProjectionEngine) -> Self {
        Self {
            engine,
            anchor_score: DEFAULT_ANCHOR_SCORE,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
        }
    }

    pub fn with_range(mut self, anchor_score: f64, start_year: i32, end_year: i32) -> Self {
        self.anchor_score = anchor_score;
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    /// Run a single projection
    pub fn run(&self, params: &InterventionParameters) -> Result<ProjectionResult, ProjectionError> {
        self.engine.project(self.anchor_score, self.start_year, self.end_year, params)
    }

    /// Run several intervention sets in order; one failure doesn't stop the rest
    pub fn run_batch(&self, params: &[InterventionParameters]) -> Vec<Result<ProjectionResult, ProjectionError>> {
        params.iter().map(|p| self.run(p)).collect()
    }

    /// Project every point of `grid` in parallel, in grid order
    pub fn run_grid(&self, grid: &ScenarioGrid) -> Vec<GridPoint> {
        grid.parameters()
            .par_iter()
            .map(|params| GridPoint {
                parameters: *params,
                result: self.run(params),
            })
            .collect()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Cartesian sweep over the three intervention magnitudes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioGrid {
    pub housing: Vec<f64>,
    pub education: Vec<f64>,
    pub business: Vec<f64>,
}

impl ScenarioGrid {
    /// `0, step, 2*step, ..` up to and including `max` on every axis.
    ///
    /// Steps finer than [`MAX_AXIS_STEPS`] allow are widened to `max / MAX_AXIS_STEPS`.
    pub fn uniform(max: f64, step: f64) -> Self {
        let axis = axis_values(max, step);
        Self {
            housing: axis.clone(),
            education: axis.clone(),
            business: axis,
        }
    }

    pub fn len(&self) -> usize {
        self.housing.len() * self.education.len() * self.business.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Housing-major order
    pub fn parameters(&self) -> Vec<InterventionParameters> {
        let mut out = Vec::with_capacity(self.len());
        for &h in &self.housing {
            for &e in &self.education {
                for &b in &self.business {
                    out.push(InterventionParameters::new(h, e, b));
                }
            }
        }
        out
    }
}

/// Upper bound on steps per axis; a full grid is at most 101^3 projections
pub const MAX_AXIS_STEPS: usize = 100;

fn axis_values(max: f64, step: f64) -> Vec<f64> {
    if !(max.is_finite() && step.is_finite()) || max < 0.0 || step <= 0.0 {
        return vec![0.0];
    }
    let steps = (max / step + 1e-9).floor();
    if steps > MAX_AXIS_STEPS as f64 {
        warn!(
            "Grid step {} over 0..={} exceeds {} steps per axis, widening to {}",
            step,
            max,
            MAX_AXIS_STEPS,
            max / MAX_AXIS_STEPS as f64
        );
        return (0..=MAX_AXIS_STEPS)
            .map(|i| max * (i as f64 / MAX_AXIS_STEPS as f64))
            .collect();
    }
    // Integer stepping avoids drift from repeated addition
    (0..=steps as usize).map(|i| i as f64 * step).collect()
}

#[derive(Debug, Clone)]
pub struct GridPoint {
    pub parameters: InterventionParameters,
    pub result: Result<ProjectionResult, ProjectionError>,
}

impl GridPoint {
    /// Sum of the three magnitudes, a rough proxy for program size
    pub fn total_points(&self) -> f64 {
        let p = &self.parameters;
        p.housing_burden_reduction_points + p.early_education_increase_points + p.minority_business_increase_points
    }
}

/// Smallest intervention (by total points) whose combined scenario crosses the threshold
pub fn smallest_crossing(points: &[GridPoint]) -> Option<&GridPoint> {
    points
        .iter()
        .filter(|p| p.result.as_ref().map_or(false, |r| r.crosses_threshold))
        .min_by(|a, b| a.total_points().total_cmp(&b.total_points()))
}
