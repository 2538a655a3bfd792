#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use workhour_allocator::{CalendarConfig, http_api};

const TABLE: &str = "20250001\t2025/11/10\t2025/11/17\t需求分析\t4.0\n\
                     20250002\t2025/11/10\t2025/11/17\t前端开发\t12.0";

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(CalendarConfig::new());
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = new_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn allocate_returns_tasks_and_result() {
    let response = new_router()
        .oneshot(json_request("POST", "/allocate", json!({ "text": TABLE })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(body["tasks"][0]["name"], "需求分析");
    let result = &body["result"];
    assert_eq!(result["stats"]["totalTasks"], 2);
    assert_eq!(result["stats"]["totalHoursAllocated"], 16.0);
    assert_eq!(result["allocations"][0]["taskIds"], json!(["20250001", "20250002"]));
    assert_eq!(result["allocations"][0]["dayOfWeek"], "周一");
    assert_eq!(result["allocations"][1]["remainingCapacity"], 0.0);
    assert!(result["unallocatedTasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_text_is_a_bad_request() {
    let response = new_router()
        .oneshot(json_request("POST", "/parse", json!({ "text": "nothing here" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no_usable_rows");
}

#[tokio::test]
async fn span_limit_is_a_bad_request() {
    let state = http_api::AppState::new(CalendarConfig::new())
        .with_limits(workhour_allocator::AllocationLimits { max_span_days: 3 });
    let response = http_api::router(state)
        .oneshot(json_request("POST", "/allocate", json!({ "text": TABLE })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().unwrap().contains("span 8 days"));
}

#[tokio::test]
async fn toggled_holiday_changes_later_allocations() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config/days/2025-11-10/toggle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(response).await;
    assert_eq!(status["kind"], "holiday");
    assert_eq!(status["isWorkday"], false);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/allocate", json!({ "text": TABLE })))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["allocations"][0]["date"], "2025-11-11");

    let response = app
        .oneshot(Request::builder().uri("/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let config = body_json(response).await;
    assert_eq!(config["holidays"], json!(["2025-11-10"]));
}

#[tokio::test]
async fn put_config_validates_overlap() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/config",
            json!({ "holidays": ["2025-11-15"], "makeupDays": ["2025-11-15"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/config",
            json!({ "holidays": [], "makeupDays": ["2025-11-15"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/config/days/2025-11-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = body_json(response).await;
    assert_eq!(status["kind"], "makeup");
    assert_eq!(status["dayOfWeek"], "周六");
}

#[tokio::test]
async fn bad_path_date_is_rejected() {
    let response = new_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config/days/not-a-date/toggle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
