//! Policy simulation endpoint
//!
//! Transport-agnostic: [`handle_simulation`] takes the raw request body and
//! returns a status code plus JSON body. The `simulation_handler` binary wraps
//! it for AWS Lambda.

use base64::{engine::general_purpose, Engine as _};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::projection::{
    ForecastRow, ImpactSummary, InterventionParameters, ModelInfo, ProjectionEngine, ProjectionError,
    ProjectionResult, DEFAULT_ANCHOR_SCORE,
};

/// Simulation request body; missing fields count as no intervention
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    #[serde(default)]
    pub housing_reduction: f64,
    #[serde(default)]
    pub education_increase: f64,
    #[serde(default)]
    pub business_increase: f64,
}

impl SimulationRequest {
    pub fn parameters(&self) -> InterventionParameters {
        InterventionParameters::new(self.housing_reduction, self.education_increase, self.business_increase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionEcho {
    pub housing_reduction: f64,
    pub education_increase: f64,
    pub business_increase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: i32,
    pub baseline: f64,
    pub housing: f64,
    pub education: f64,
    pub business: f64,
    pub combined: f64,
}

impl From<&ForecastRow> for ProjectionPoint {
    fn from(row: &ForecastRow) -> Self {
        Self {
            year: row.year,
            baseline: row.baseline_score,
            housing: row.housing_scenario_score,
            education: row.education_scenario_score,
            business: row.business_scenario_score,
            combined: row.combined_scenario_score,
        }
    }
}

/// Final-row summary. The `_2030` keys carry the last projected year
/// whatever the range is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub baseline_2030: f64,
    pub combined_2030: f64,
    pub improvement: f64,
    pub crosses_threshold: bool,
    /// First year the combined scenario reaches the threshold, `null` if never
    pub years_to_threshold: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub success: bool,
    pub current_igs: f64,
    pub threshold: f64,
    pub interventions: InterventionEcho,
    pub impacts: ImpactSummary,
    pub projections: Vec<ProjectionPoint>,
    pub summary: SimulationSummary,
    pub model_info: ModelInfo,
}

impl SimulationResponse {
    pub fn from_result(request: &SimulationRequest, result: &ProjectionResult) -> Self {
        Self {
            success: true,
            current_igs: result.anchor_score,
            threshold: result.threshold_value,
            interventions: InterventionEcho {
                housing_reduction: request.housing_reduction,
                education_increase: request.education_increase,
                business_increase: request.business_increase,
            },
            impacts: result.impact_summary,
            projections: result.rows.iter().map(ProjectionPoint::from).collect(),
            summary: SimulationSummary {
                baseline_2030: result.final_baseline,
                combined_2030: result.final_combined,
                improvement: result.net_improvement,
                crosses_threshold: result.crosses_threshold,
                years_to_threshold: result.year_threshold_first_crossed,
            },
            model_info: ModelInfo::calibrated(),
        }
    }
}

/// Run one simulation over the default anchor and year range
pub fn simulate(engine: &ProjectionEngine, request: &SimulationRequest) -> Result<SimulationResponse, ProjectionError> {
    let result = engine.project_default(&request.parameters())?;
    Ok(SimulationResponse::from_result(request, &result))
}

/// Status code and JSON body of an API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

/// Request body as text, decoding base64 when the gateway flags it.
///
/// A missing body is `{}`, so every field defaults to no intervention.
pub fn request_body(body: Option<&str>, is_base64_encoded: bool) -> Result<String, ApiResponse> {
    let body = match body {
        Some(body) if is_base64_encoded => body,
        Some(body) => return Ok(body.to_string()),
        None => return Ok("{}".to_string()),
    };
    let bytes = general_purpose::STANDARD.decode(body.trim()).map_err(|e| {
        warn!("Rejected simulation request body: {}", e);
        ApiResponse::error(400, format!("Invalid base64 body: {}", e))
    })?;
    String::from_utf8(bytes).map_err(|e| ApiResponse::error(400, format!("Invalid JSON: {}", e)))
}

/// Parse `body`, run the simulation and map failures to 400 / 500
pub fn handle_simulation(engine: &ProjectionEngine, body: &str) -> ApiResponse {
    let request: SimulationRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Rejected simulation request: {}", e);
            return ApiResponse::error(400, format!("Invalid JSON: {}", e));
        }
    };

    info!(
        "Simulating housing={} education={} business={} from anchor {}",
        request.housing_reduction, request.education_increase, request.business_increase, DEFAULT_ANCHOR_SCORE
    );

    match simulate(engine, &request) {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(body) => ApiResponse { status: 200, body },
            Err(e) => ApiResponse::error(500, e.to_string()),
        },
        Err(e) if e.is_validation() => {
            warn!("Invalid simulation parameters: {}", e);
            ApiResponse::error(400, e.to_string())
        }
        Err(e) => {
            warn!("Simulation failed: {}", e);
            ApiResponse::error(500, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ImpactCoefficients, ProjectionConfig};

    #[test]
    fn test_reference_simulation() {
        let body = r#"{"housingReduction": 8.5, "educationIncrease": 4.1, "businessIncrease": 1.2}"#;
        let response = handle_simulation(&ProjectionEngine::default(), body);

        assert_eq!(response.status, 200);
        let json = &response.body;
        assert_eq!(json["success"], true);
        assert_eq!(json["current_igs"], 27.0);
        assert_eq!(json["threshold"], 45.0);
        assert_eq!(json["interventions"]["housing_reduction"], 8.5);
        assert_eq!(json["impacts"]["combined"], 15.39);
        assert_eq!(json["projections"].as_array().unwrap().len(), 7);
        assert_eq!(json["projections"][6]["combined"], 54.44);
        assert_eq!(json["summary"]["baseline_2030"], 25.2);
        assert_eq!(json["summary"]["combined_2030"], 54.44);
        assert_eq!(json["summary"]["improvement"], 29.24);
        assert_eq!(json["summary"]["crosses_threshold"], true);
        assert_eq!(json["summary"]["years_to_threshold"], 2026);
        assert_eq!(json["model_info"]["features"], 78);
    }

    #[test]
    fn test_never_crossing_reports_null() {
        let response = handle_simulation(&ProjectionEngine::default(), "{}");
        assert_eq!(response.status, 200);
        assert_eq!(response.body["summary"]["crosses_threshold"], false);
        assert_eq!(response.body["summary"]["years_to_threshold"], Value::Null);
    }

    #[test]
    fn test_bad_requests_are_400() {
        let engine = ProjectionEngine::default();

        let response = handle_simulation(&engine, "not json");
        assert_eq!(response.status, 400);
        assert!(response.body["error"].as_str().unwrap().starts_with("Invalid JSON"));

        let response = handle_simulation(&engine, r#"{"housingReduction": "lots"}"#);
        assert_eq!(response.status, 400);

        let response = handle_simulation(&engine, r#"{"educationIncrease": -1}"#);
        assert_eq!(response.status, 400);
        assert!(response.body["error"].as_str().unwrap().contains("early_education_increase_points"));
    }

    #[test]
    fn test_base64_body_decoded() {
        let json = r#"{"housingReduction": 8.5, "educationIncrease": 4.1, "businessIncrease": 1.2}"#;
        let encoded = general_purpose::STANDARD.encode(json);

        let body = request_body(Some(encoded.as_str()), true).unwrap();
        assert_eq!(body, json);
        let response = handle_simulation(&ProjectionEngine::default(), &body);
        assert_eq!(response.status, 200);
        assert_eq!(response.body["summary"]["combined_2030"], 54.44);

        assert_eq!(request_body(Some(json), false).unwrap(), json);
        assert_eq!(request_body(None, true).unwrap(), "{}");

        let bad = request_body(Some("not base64!"), true).unwrap_err();
        assert_eq!(bad.status, 400);
        let not_utf8 = general_purpose::STANDARD.encode([0xff, 0xfe]);
        assert_eq!(request_body(Some(not_utf8.as_str()), true).unwrap_err().status, 400);
    }

    #[test]
    fn test_computation_error_is_500() {
        let engine = ProjectionEngine::new(ImpactCoefficients::default(), ProjectionConfig::default());
        let response = handle_simulation(&engine, r#"{"housingReduction": 1e308}"#);
        assert_eq!(response.status, 500);
        assert!(response.body.get("error").is_some());
    }
}
