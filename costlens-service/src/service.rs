use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use costlens_core::error::AnalysisFailure;
use costlens_core::{AppConfig, analysis, chat, icd, zip};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message })))
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
}

pub fn create_app(config: AppConfig) -> Router {
    let app_state = AppState {
        config,
        http: reqwest::Client::new(),
    };
    build_router(app_state)
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/search-icd", post(search_icd))
        .route("/api/validate-zip", post(validate_zip))
        .route("/api/analyze-costs", post(analyze_costs))
        .route("/api/chatbot", post(chatbot))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Medical Cost Analysis Service",
        "version": "1.0.0",
        "description": "Symptom to diagnosis codes, procedure codes and estimated price ranges",
        "endpoints": {
            "POST /api/search-icd": "Search ICD-10 codes for a symptom",
            "POST /api/validate-zip": "Validate a US zip code",
            "POST /api/analyze-costs": "Run the complete cost analysis",
            "POST /api/chatbot": "Ask a free-form medical question",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Deserialize)]
struct SearchIcdRequest {
    #[serde(default)]
    symptom: String,
}

async fn search_icd(
    State(state): State<AppState>,
    Json(request): Json<SearchIcdRequest>,
) -> ApiResult<Value> {
    let symptom = request.symptom.trim();
    if symptom.is_empty() {
        return Err(bad_request_error("Symptom is required"));
    }

    info!(symptom = %symptom, "searching ICD-10 codes");
    let icd_codes = icd::diagnoses_with_descriptions(&state.http, &state.config, symptom)
        .await
        .map_err(|e| {
            error!(error = %e, "ICD search failed");
            internal_error("An error occurred", &e.to_string())
        })?;

    if icd_codes.is_empty() {
        return Err(not_found_error(
            "No matching ICD-10 codes found for this symptom",
        ));
    }

    Ok(Json(json!({
        "success": true,
        "symptom": symptom,
        "icd_codes": icd_codes
    })))
}

#[derive(Debug, Deserialize)]
struct ValidateZipRequest {
    #[serde(default)]
    zip_code: String,
}

async fn validate_zip(
    State(state): State<AppState>,
    Json(request): Json<ValidateZipRequest>,
) -> ApiResult<Value> {
    let zip_code = request.zip_code.trim();
    if zip_code.is_empty() {
        return Err(bad_request_error("Zip code is required"));
    }

    let valid = zip::is_valid_zip(&state.http, &state.config, zip_code)
        .await
        .map_err(|e| {
            error!(error = %e, "zip validation failed");
            internal_error("An error occurred", &e.to_string())
        })?;

    Ok(Json(json!({
        "valid": valid,
        "zip_code": zip_code
    })))
}

#[derive(Debug, Deserialize)]
struct AnalyzeCostsRequest {
    #[serde(default)]
    symptom: String,
    icd_selection_index: Option<i64>,
    #[serde(default)]
    zip_code: String,
}

/// Map each reportable analysis condition to a stable client-visible status.
fn failure_response(failure: &AnalysisFailure) -> ApiError {
    let status = match failure {
        AnalysisFailure::NoCodesFound => StatusCode::NOT_FOUND,
        AnalysisFailure::SelectionOutOfBounds { .. } => StatusCode::BAD_REQUEST,
        AnalysisFailure::InvalidZip => StatusCode::BAD_REQUEST,
        AnalysisFailure::CptMappingFailed => StatusCode::BAD_GATEWAY,
        AnalysisFailure::CostCalculationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AnalysisFailure::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": failure.to_string() })))
}

async fn analyze_costs(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCostsRequest>,
) -> ApiResult<Value> {
    let symptom = request.symptom.trim();
    if symptom.is_empty() {
        return Err(bad_request_error("Symptom is required"));
    }
    let Some(selection_index) = request.icd_selection_index else {
        return Err(bad_request_error("ICD selection is required"));
    };
    let zip_code = request.zip_code.trim();
    if zip_code.is_empty() {
        return Err(bad_request_error("Zip code is required"));
    }

    info!(
        symptom = %symptom,
        selection_index = %selection_index,
        zip_code = %zip_code,
        "running complete cost analysis"
    );

    let analysis = analysis::complete_cost_analysis(
        &state.http,
        &state.config,
        symptom,
        selection_index,
        zip_code,
    )
    .await
    .map_err(|failure| {
        error!(failure = %failure, "cost analysis failed");
        failure_response(&failure)
    })?;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis
    })))
}

#[derive(Debug, Deserialize)]
struct ChatbotRequest {
    #[serde(default)]
    query: String,
}

async fn chatbot(
    State(state): State<AppState>,
    Json(request): Json<ChatbotRequest>,
) -> ApiResult<Value> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(bad_request_error("Query is required"));
    }

    let response = chat::ask(&state.config, query).await.map_err(|e| {
        error!(error = %e, "chatbot completion failed");
        internal_error("An error occurred", &e.to_string())
    })?;

    Ok(Json(json!({
        "success": true,
        "query": query,
        "response": response
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use costlens_core::error::CostError;

    // The dummy URLs guarantee any attempted external call would fail loudly;
    // the input guards must reject before reaching them.
    fn test_state() -> AppState {
        AppState {
            config: AppConfig {
                icd_base_url: "http://localhost:1/icd".to_string(),
                zip_base_url: "http://localhost:1/zip".to_string(),
                openrouter_api_key: "test-key".to_string(),
                model: "openai/gpt-4.1".to_string(),
                icd_max_results: 10,
            },
            http: reqwest::Client::new(),
        }
    }

    fn rejection(result: ApiResult<Value>) -> (StatusCode, Value) {
        match result {
            Err((status, Json(body))) => (status, body),
            Ok(_) => panic!("expected the request to be rejected"),
        }
    }

    fn error_message(body: &Value) -> &str {
        body.get("error").and_then(Value::as_str).unwrap()
    }

    #[tokio::test]
    async fn empty_symptom_is_rejected_before_any_external_call() {
        let result = search_icd(
            State(test_state()),
            Json(SearchIcdRequest {
                symptom: "   ".to_string(),
            }),
        )
        .await;
        let (status, body) = rejection(result);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Symptom is required");
    }

    #[tokio::test]
    async fn empty_zip_code_is_rejected_before_any_external_call() {
        let result = validate_zip(
            State(test_state()),
            Json(ValidateZipRequest {
                zip_code: String::new(),
            }),
        )
        .await;
        let (status, body) = rejection(result);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Zip code is required");
    }

    #[tokio::test]
    async fn analyze_rejects_empty_symptom_first() {
        let result = analyze_costs(
            State(test_state()),
            Json(AnalyzeCostsRequest {
                symptom: String::new(),
                icd_selection_index: Some(0),
                zip_code: "10001".to_string(),
            }),
        )
        .await;
        let (status, body) = rejection(result);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Symptom is required");
    }

    #[tokio::test]
    async fn analyze_rejects_missing_selection_index() {
        let result = analyze_costs(
            State(test_state()),
            Json(AnalyzeCostsRequest {
                symptom: "chest pain".to_string(),
                icd_selection_index: None,
                zip_code: "10001".to_string(),
            }),
        )
        .await;
        let (status, body) = rejection(result);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "ICD selection is required");
    }

    #[tokio::test]
    async fn analyze_rejects_empty_zip_code() {
        let result = analyze_costs(
            State(test_state()),
            Json(AnalyzeCostsRequest {
                symptom: "chest pain".to_string(),
                icd_selection_index: Some(0),
                zip_code: "  ".to_string(),
            }),
        )
        .await;
        let (status, body) = rejection(result);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Zip code is required");
    }

    #[tokio::test]
    async fn empty_chatbot_query_is_rejected() {
        let result = chatbot(
            State(test_state()),
            Json(ChatbotRequest {
                query: String::new(),
            }),
        )
        .await;
        let (status, body) = rejection(result);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Query is required");
    }

    #[test]
    fn failure_statuses_are_stable() {
        let cases = [
            (AnalysisFailure::NoCodesFound, StatusCode::NOT_FOUND),
            (
                AnalysisFailure::SelectionOutOfBounds { index: -1, max: 4 },
                StatusCode::BAD_REQUEST,
            ),
            (AnalysisFailure::InvalidZip, StatusCode::BAD_REQUEST),
            (AnalysisFailure::CptMappingFailed, StatusCode::BAD_GATEWAY),
            (
                AnalysisFailure::CostCalculationFailed("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AnalysisFailure::Unexpected(CostError::Completion("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (failure, expected) in cases {
            assert_eq!(failure_response(&failure).0, expected);
        }
    }

    #[test]
    fn failure_messages_match_reported_conditions() {
        assert_eq!(
            failure_response(&AnalysisFailure::CptMappingFailed)
                .1
                .get("error")
                .and_then(Value::as_str),
            Some("Failed to get CPT codes for the selected diagnosis")
        );
        assert_eq!(
            failure_response(&AnalysisFailure::InvalidZip)
                .1
                .get("error")
                .and_then(Value::as_str),
            Some("Invalid zip code provided")
        );
    }

    #[test]
    fn analyze_request_tolerates_missing_fields() {
        let request: AnalyzeCostsRequest = serde_json::from_str("{}").unwrap();
        assert!(request.symptom.is_empty());
        assert!(request.icd_selection_index.is_none());
        assert!(request.zip_code.is_empty());
    }
}
