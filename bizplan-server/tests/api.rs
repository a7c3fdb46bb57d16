use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use bizplan_ai::DisabledGenerator;
use bizplan_core::{CalculationKind, ConstantTable, PlannerRepository};
use bizplan_db_sqlite::SqliteRepository;
use bizplan_server::{PlannerService, router};

async fn setup() -> (Router, Arc<SqliteRepository>) {
    let repo = SqliteRepository::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    repo.run_migrations().await.expect("Failed to run migrations");
    let repo = Arc::new(repo);

    let service = PlannerService::new(
        Arc::new(ConstantTable::for_year(2024).unwrap()),
        repo.clone(),
        Arc::new(DisabledGenerator),
    );
    (router(service), repo)
}

async fn post_json(
    app: Router,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn currency_value(text: &str) -> i64 {
    text.replace(['$', ','], "").parse().unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"success": true, "data": "OK"}));
}

#[tokio::test]
async fn tax_strategies_end_to_end() {
    let (app, _) = setup().await;

    let (status, body) = post_json(
        app,
        "/api/tax-strategies",
        json!({"revenue": 200000, "expensesPercentage": 30, "withdrawalAmount": 100000}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["sequence"], 1);
    let strategies = body["data"]["strategies"].as_array().unwrap();
    assert_eq!(strategies.len(), 4);
    for row in strategies {
        for field in ["salary", "dividend", "totalTax", "netIncome", "effectiveTaxRate"] {
            assert!(!row[field].as_str().unwrap().is_empty(), "{field} is empty");
        }
        assert!(currency_value(row["totalTax"].as_str().unwrap()) > 0);
        assert!(
            currency_value(row["netIncome"].as_str().unwrap())
                <= currency_value(row["withdrawalAmount"].as_str().unwrap())
        );
    }
    assert_eq!(strategies[0]["name"], "100% Salary");
    assert_eq!(strategies[0]["ei"], "$1,049");
    assert_eq!(strategies[1]["corporateTax"], "$17,080");
    assert!(!body["data"]["recommendation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn registered_user_runs_are_sequenced_and_recorded() {
    let (app, repo) = setup().await;
    let user = repo.create_user("owner@example.com", None).await.unwrap();
    let request = json!({
        "revenue": 150000,
        "expensesPercentage": 20,
        "withdrawalAmount": 80000,
        "email": "owner@example.com",
        "province": "Ontario"
    });

    let (_, first) = post_json(app.clone(), "/api/tax-strategies", request.clone()).await;
    let (_, second) = post_json(app, "/api/tax-strategies", request).await;

    assert_eq!(first["data"]["sequence"], 1);
    assert_eq!(second["data"]["sequence"], 2);
    let count = repo
        .count_calculations_for_user(user.id, CalculationKind::TaxStrategy)
        .await
        .unwrap();
    assert_eq!(count, 2);
    let latest = repo.get_calculation(2).await.unwrap();
    assert_eq!(latest.user_id, Some(user.id));
    assert_eq!(latest.input["province"], "Ontario");
    assert_eq!(latest.result["sequence"], 2);
}

#[tokio::test]
async fn negative_revenue_is_bad_request() {
    let (app, _) = setup().await;

    let (status, body) = post_json(
        app,
        "/api/tax-strategies",
        json!({"revenue": -1, "expensesPercentage": 30, "withdrawalAmount": 100}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("revenue"));
}

#[tokio::test]
async fn oversized_amount_is_bad_request() {
    let (app, _) = setup().await;

    let (status, body) = post_json(
        app,
        "/api/investment-strategies",
        json!({
            "amount": 5e27,
            "rrspRoom": 0,
            "currentIncome": "$100-200K",
            "retirementIncome": "$50-100K",
            "years": 60
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("amount"));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (app, _) = setup().await;

    let (status, body) = post_json(app, "/api/tax-strategies", json!({"revenue": "lots"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn investment_without_rrsp_room_marks_rrsp_unavailable() {
    let (app, _) = setup().await;

    let (status, body) = post_json(
        app,
        "/api/investment-strategies",
        json!({
            "amount": 10000,
            "rrspRoom": 0,
            "currentIncome": "$100-200K",
            "retirementIncome": "$50-100K",
            "years": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let rrsp = &data["strategies"][2];
    assert_eq!(rrsp["name"], "RRSP");
    assert_eq!(rrsp["available"], false);
    assert_eq!(rrsp["afterTaxCash"], "Not Available");
    assert_eq!(rrsp["finalValue"], "Not Available");

    let ranking = data["ranking"].as_array().unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["isOptimal"], true);
    assert_eq!(ranking[0]["difference"], "$0");
    assert!(ranking.iter().all(|r| r["name"] != "RRSP"));
    assert!(!data["considerations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_income_label_is_bad_request() {
    let (app, _) = setup().await;

    let (status, body) = post_json(
        app,
        "/api/investment-strategies",
        json!({
            "amount": 10000,
            "rrspRoom": 5000,
            "currentIncome": "Six figures",
            "retirementIncome": "$50-100K",
            "years": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Six figures"));
}

#[tokio::test]
async fn chat_failure_is_reported_in_body() {
    let (app, _) = setup().await;

    let (status, body) = post_json(
        app,
        "/api/chat",
        json!({"messages": [{"role": "user", "content": "Hello"}], "category": "chat"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn chat_with_unknown_role_is_bad_request() {
    let (app, _) = setup().await;

    let (status, _) = post_json(
        app,
        "/api/chat",
        json!({"messages": [{"role": "narrator", "content": "Hello"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
