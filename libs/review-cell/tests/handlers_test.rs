use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_cell::router::review_routes;
use shared_config::AppConfig;

fn test_app(server: &MockServer) -> Router {
    let config = AppConfig {
        database_url: server.uri(),
        database_secret: String::new(),
        poll_interval_secs: 1,
    };
    review_routes(Arc::new(config))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn reviews_snapshot() -> Value {
    json!({
        "-Nr1": {
            "userId": "u1",
            "doctorId": "d1",
            "doctorName": "Dr. Jenny Watson",
            "rating": 5,
            "reviewText": "Attentive and thorough.",
            "recommend": true,
            "timestamp": 1741100000000u64
        },
        "-Nr2": {
            "userId": "u2",
            "doctorId": "d1",
            "doctorName": "Dr. Jenny Watson",
            "rating": 4,
            "reviewText": "Helpful, slight wait.",
            "recommend": true,
            "timestamp": 1741200000000u64
        },
        "-Nr3": {
            "userId": "u3",
            "doctorId": "d2",
            "doctorName": "Dr. Raul Zirkind",
            "rating": 5,
            "reviewText": "Great diagnosis.",
            "recommend": false,
            "timestamp": 1741300000000u64
        }
    })
}

#[tokio::test]
async fn submitting_a_valid_review_pushes_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reviews.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "-NrNew"})))
        .expect(1)
        .mount(&server)
        .await;

    let draft = json!({
        "userId": "u1",
        "doctorId": "d1",
        "doctorName": "Dr. Jenny Watson",
        "rating": 5,
        "reviewText": "Attentive and thorough.",
        "recommend": true
    });

    let response = test_app(&server)
        .oneshot(
            Request::post("/")
                .header(header::CONTENT_TYPE, "application/json")
                .header("Authorization", "Bearer user-token")
                .body(Body::from(draft.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reviewKey"], "-NrNew");
}

#[tokio::test]
async fn unanswered_recommend_never_reaches_the_store() {
    let server = MockServer::start().await;
    // No POST mock mounted: a store hit would fail the test.

    let draft = json!({
        "userId": "u1",
        "doctorId": "d1",
        "doctorName": "Dr. Jenny Watson",
        "rating": 5,
        "reviewText": "Attentive and thorough.",
        "recommend": null
    });

    let response = test_app(&server)
        .oneshot(
            Request::post("/")
                .header(header::CONTENT_TYPE, "application/json")
                .header("Authorization", "Bearer user-token")
                .body(Body::from(draft.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_requires_a_token() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(
            Request::post("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn doctor_reviews_are_newest_first_with_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reviews.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_snapshot()))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(Request::get("/doctor/d1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["userId"], "u2", "newest review first");
    assert_eq!(body["summary"]["reviewCount"], 2);
    assert!((body["summary"]["averageRating"].as_f64().unwrap() - 4.5).abs() < 1e-9);
}

#[tokio::test]
async fn star_filter_narrows_the_list_but_not_the_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reviews.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_snapshot()))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(
            Request::get("/doctor/d1?rating=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 5);
    assert_eq!(body["summary"]["reviewCount"], 2);
}
