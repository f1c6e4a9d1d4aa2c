//! AWS Lambda handler for the policy simulation endpoint
//!
//! Accepts `{housingReduction, educationIncrease, businessIncrease}` via POST
//! and returns baseline and intervention projections with a threshold summary.
//!
//! Supports Lambda Function URLs and HTTP APIs (payload format 2.0).

use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use aws_lambda_events::encodings::Body;
use data_nova::api::{handle_simulation, request_body, ApiResponse};
use data_nova::projection::ProjectionEngine;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;

fn response(status: u16, body: Option<String>) -> Result<ApiGatewayV2httpResponse, Error> {
    let mut response = ApiGatewayV2httpResponse {
        status_code: i64::from(status),
        body: body.map(Body::Text),
        ..Default::default()
    };

    let headers = &mut response.headers;
    headers.insert("content-type", "application/json".parse()?);
    headers.insert("access-control-allow-origin", "*".parse()?);
    headers.insert("access-control-allow-methods", "POST, OPTIONS".parse()?);
    headers.insert("access-control-allow-headers", "Content-Type".parse()?);
    Ok(response)
}

fn json_response(api: ApiResponse) -> Result<ApiGatewayV2httpResponse, Error> {
    response(api.status, Some(serde_json::to_string(&api.body)?))
}

/// Lambda handler function
async fn handler(event: LambdaEvent<ApiGatewayV2httpRequest>) -> Result<ApiGatewayV2httpResponse, Error> {
    let request = event.payload;
    let method = request.request_context.http.method.as_str().to_ascii_uppercase();

    match method.as_str() {
        // CORS preflight
        "OPTIONS" => response(200, None),
        "POST" => {
            let body = match request_body(request.body.as_deref(), request.is_base64_encoded) {
                Ok(body) => body,
                Err(api) => return json_response(api),
            };
            let api = handle_simulation(&ProjectionEngine::default(), &body);
            info!("Simulation request answered with {}", api.status);
            json_response(api)
        }
        other => json_response(ApiResponse::error(405, format!("Method {} not allowed", other))),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
