mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn slo_lifecycle(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/slos",
        json!({ "name": "checkout", "objective": 0.999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/slos",
        json!({ "name": "checkout", "objective": 0.99 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(app.clone(), "/api/v1/slos/checkout").await;
    assert_eq!(body_json(response).await["data"]["id"], id.as_str());

    let response = delete(app.clone(), &format!("/api/v1/slos/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete(app, &format!("/api/v1/slos/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn objective_out_of_range_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/slos",
        json!({ "name": "checkout", "objective": 99.9 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn records_are_summed(pool: PgPool) {
    let app = common::build_test_app(pool);
    for (success, value) in [(true, 90), (true, 5), (false, 10)] {
        let response = post_json(
            app.clone(),
            "/api/v1/slos/records",
            json!({ "name": "checkout", "success": success, "value": value }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let json = body_json(get(app.clone(), "/api/v1/slos/sums").await).await;
    let sums = json["data"].as_array().unwrap();
    assert_eq!(sums.len(), 1);
    assert_eq!(sums[0]["name"], "checkout");
    assert_eq!(sums[0]["success"], 95);
    assert_eq!(sums[0]["failure"], 10);

    let json = body_json(get(app, "/api/v1/slos/sums?since=2999-01-01T00:00:00Z").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn negative_record_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/slos/records",
        json!({ "name": "checkout", "success": true, "value": -1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn buckets_of_one_slo(pool: PgPool) {
    let app = common::build_test_app(pool);
    post_json(
        app.clone(),
        "/api/v1/slos",
        json!({ "name": "checkout", "objective": 0.999 }),
    )
    .await;
    for (name, success, value) in [("checkout", true, 90), ("checkout", true, 5), ("other", false, 1)] {
        post_json(
            app.clone(),
            "/api/v1/slos/records",
            json!({ "name": name, "success": success, "value": value }),
        )
        .await;
    }

    let response = get(app.clone(), "/api/v1/slos/checkout/buckets").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let buckets = json["data"].as_array().unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["success"], true);
    assert_eq!(buckets[0]["value"], 95);

    let response = get(app, "/api/v1/slos/unknown/buckets").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
