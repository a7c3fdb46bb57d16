use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bizplan_ai::Generation;

use crate::dto::{
    ApiResponse, ChatRequest, InvestmentData, InvestmentRequest, TaxStrategyData,
    TaxStrategyRequest,
};
use crate::error::ApiError;
use crate::service::PlannerService;

pub fn router(service: PlannerService) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/tax-strategies", post(tax_strategies))
        .route("/investment-strategies", post(investment_strategies))
        .route("/chat", post(chat))
        .with_state(service);

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /api/health
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/tax-strategies
async fn tax_strategies(
    State(service): State<PlannerService>,
    payload: Result<Json<TaxStrategyRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TaxStrategyData>>, ApiError> {
    let Json(request) = payload?;
    let data = service.plan_tax_strategies(request).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// POST /api/investment-strategies
async fn investment_strategies(
    State(service): State<PlannerService>,
    payload: Result<Json<InvestmentRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<InvestmentData>>, ApiError> {
    let Json(request) = payload?;
    let data = service.plan_investment(request).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// POST /api/chat
async fn chat(
    State(service): State<PlannerService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Generation>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(service.chat(request).await?))
}

async fn not_found() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(serde_json::json!({"success": false, "error": "Not found"})),
    )
}
