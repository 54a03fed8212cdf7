//! HTTP request handlers for the reconciliation engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::run_reconciliation;

use super::request::ReconcileRequest;
use super::response::{ApiError, ApiErrorResponse, ReconcileResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reconcile", post(reconcile_handler))
        .with_state(state)
}

/// Handler for POST /reconcile endpoint.
///
/// Accepts a period's cost records plus an optional prior-period baseline
/// and returns the run's findings, anomaly flags, and audit record. A
/// failure to persist the audit record does not fail the request; it is
/// reported via `audit_persisted`.
async fn reconcile_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing reconciliation request");

    // Handle JSON parsing errors
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    // Get the body text which contains the detailed error from serde
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let config = state.config().config();
    match run_reconciliation(&request.records, &request.baseline, config, request.period) {
        Ok(output) => {
            // Persist-after-compute: a storage failure downgrades the
            // response, never discards the findings.
            let audit_persisted = match state.audit_log() {
                Some(log) => match log.append(&output.audit) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(
                            correlation_id = %correlation_id,
                            run_id = %output.audit.run_id,
                            error = %err,
                            "Failed to persist audit record"
                        );
                        false
                    }
                },
                None => false,
            };

            info!(
                correlation_id = %correlation_id,
                run_id = %output.audit.run_id,
                findings = output.findings.len(),
                anomaly_flags = output.anomalies.len(),
                audit_persisted,
                "Reconciliation request completed"
            );

            let response = ReconcileResponse {
                run_id: output.audit.run_id,
                period: output.period,
                findings: output.findings,
                anomalies: output.anomalies,
                audit: output.audit,
                audit_persisted,
            };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(response),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Reconciliation failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::engine::AuditLog;
    use crate::models::{BudgetStatus, CostRecord};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/billing").expect("Failed to load config");
        AppState::new(config)
    }

    fn cost_record(account: &str, service: &str, day: u32, amount: &str) -> CostRecord {
        CostRecord {
            account_id: account.to_string(),
            service_name: service.to_string(),
            usage_date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            currency: "USD".to_string(),
        }
    }

    fn create_valid_request() -> ReconcileRequest {
        ReconcileRequest {
            period: "2025-11".parse().unwrap(),
            records: vec![
                cost_record("111122223333", "AmazonEC2", 3, "1200.50"),
                cost_record("222233334444", "AmazonEKS", 4, "800.00"),
            ],
            baseline: vec![],
        }
    }

    async fn post_json(router: Router, body: String) -> axum::response::Response {
        router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reconcile")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_api_001_valid_request_returns_200() {
        let router = create_router(create_test_state());

        let body = serde_json::to_string(&create_valid_request()).unwrap();
        let response = post_json(router, body).await;

        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: ReconcileResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.findings[0].business_unit, "Engineering");
        assert_eq!(result.findings[0].status, BudgetStatus::WithinBudget);
        assert_eq!(result.audit.record_counts.cost_records, 2);
        assert!(!result.audit_persisted);
    }

    #[tokio::test]
    async fn test_api_002_malformed_json_returns_400() {
        let router = create_router(create_test_state());

        let response = post_json(router, "{invalid json".to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_api_003_missing_records_field_returns_400() {
        let router = create_router(create_test_state());

        let response = post_json(router, r#"{"period": "2025-11"}"#.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert!(
            error.message.contains("missing field")
                || error.message.to_lowercase().contains("records"),
            "Expected error message to mention missing field, got: {}",
            error.message
        );
    }

    #[tokio::test]
    async fn test_api_004_invalid_record_returns_400() {
        let router = create_router(create_test_state());

        let mut request = create_valid_request();
        request.records.push(cost_record("111122223333", "AmazonS3", 5, "-10"));
        let body = serde_json::to_string(&request).unwrap();

        let response = post_json(router, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "INVALID_RECORD");
        assert!(error.message.contains("index 2"));
    }

    #[tokio::test]
    async fn test_api_005_audit_log_persists_run() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));
        let state = create_test_state().with_audit_log(log.clone());
        let router = create_router(state);

        let body = serde_json::to_string(&create_valid_request()).unwrap();
        let response = post_json(router, body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: ReconcileResponse = serde_json::from_slice(&body).unwrap();
        assert!(result.audit_persisted);

        let persisted = log.load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].run_id, result.run_id);
    }

    #[tokio::test]
    async fn test_api_006_audit_failure_downgrades_not_fails() {
        let log = AuditLog::new("/nonexistent-dir/audit.jsonl");
        let state = create_test_state().with_audit_log(log);
        let router = create_router(state);

        let body = serde_json::to_string(&create_valid_request()).unwrap();
        let response = post_json(router, body).await;

        // Findings are still returned; only the persistence flag drops.
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: ReconcileResponse = serde_json::from_slice(&body).unwrap();
        assert!(!result.audit_persisted);
        assert_eq!(result.findings.len(), 2);
    }

    #[tokio::test]
    async fn test_overrun_reported_with_top_drivers() {
        let router = create_router(create_test_state());

        // Engineering budget is 150000 at a 10% threshold; 172000 overruns.
        let request = ReconcileRequest {
            period: "2025-11".parse().unwrap(),
            records: vec![
                cost_record("111122223333", "AmazonEC2", 3, "120000"),
                cost_record("111122223333", "AmazonSageMaker", 4, "40000"),
                cost_record("111122224444", "AmazonS3", 5, "12000"),
            ],
            baseline: vec![],
        };
        let body = serde_json::to_string(&request).unwrap();

        let response = post_json(router, body).await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: ReconcileResponse = serde_json::from_slice(&body).unwrap();

        let finding = &result.findings[0];
        assert_eq!(finding.business_unit, "Engineering");
        assert_eq!(finding.status, BudgetStatus::Overrun);
        assert_eq!(finding.variance_amount, Some(Decimal::from(22000)));
        assert_eq!(
            finding.variance_pct,
            Some(Decimal::from_str("14.67").unwrap())
        );
        assert_eq!(finding.top_drivers[0].service_name, "AmazonEC2");
        assert_eq!(finding.top_drivers[0].amount, Decimal::from(120000));
    }
}
