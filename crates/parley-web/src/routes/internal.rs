//! Connectivity check against the text-generation API.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::AppState;

pub const TEST_PROMPT: &str = "Hello, this is a test message. Please respond with a short greeting.";

#[derive(Deserialize, Default)]
struct TestConnectionRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Send one prompt (the body's `prompt`, or a greeting) to the generator.
///
/// Always answers 200; the outcome is in `success`.
pub async fn test_connection(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TestConnectionResponse>, (StatusCode, String)> {
    let req: TestConnectionRequest = if body.is_empty() {
        TestConnectionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    };
    let prompt = req
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| TEST_PROMPT.to_string());

    let result = match state.generator.generate(&prompt).await {
        Ok(text) => {
            info!("Generation API connection test succeeded");
            TestConnectionResponse {
                success: true,
                message: "Connection test succeeded".to_string(),
                response: Some(text),
            }
        }
        Err(e) => {
            warn!(error = %e, "Generation API connection test failed");
            TestConnectionResponse {
                success: false,
                message: format!("Connection test failed: {}", e),
                response: None,
            }
        }
    };
    Ok(Json(result))
}
