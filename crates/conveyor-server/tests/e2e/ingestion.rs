//! Batch upload tests: full acceptance, partial rejection with
//! per-record detail, and the failure modes around unknown or empty
//! input.

use super::common::*;
use axum::http::StatusCode;
use serde_json::json;
use sqlx::Row;

pub async fn run_all_tests(ctx: &TestContext) {
    test_full_batch_accepted(ctx).await;
    test_partial_rejection(ctx).await;
    test_empty_and_unknown(ctx).await;
    test_upload_info(ctx).await;
    test_data_browsing(ctx).await;
}

async fn setup_table(ctx: &TestContext) {
    let (status, body) = ctx
        .post(
            "/api/v1/tables/create",
            json!({
                "tableName": "readings",
                "tableAliasName": "Sensor Readings",
                "fields": [
                    { "name": "sensor", "type": "Text", "required": true },
                    { "name": "value", "type": "Float", "required": true },
                    { "name": "note", "type": "Text" }
                ]
            }),
        )
        .await;
    expect_data(status, &body, "create readings");
}

async fn test_full_batch_accepted(ctx: &TestContext) {
    println!("  🧪 test_full_batch_accepted");
    setup_table(ctx).await;

    let (status, body) = ctx
        .post(
            "/api/v1/upload/readings",
            json!({ "data": [
                { "sensor": "t-100", "value": 21.5 },
                { "sensor": "t-101", "value": 19.25, "note": "calibrated" }
            ]}),
        )
        .await;
    let data = expect_data(status, &body, "upload full batch");
    assert_eq!(data["total"], 2);
    assert_eq!(data["accepted"], 2);
    assert_eq!(data["rejected"], 0);
    assert!(data["errors"].as_array().unwrap().is_empty());
    assert!(data["batchId"].is_string());

    // Records actually landed in the physical table.
    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM user_data_readings")
        .fetch_one(&ctx.pool)
        .await
        .expect("count query")
        .get("n");
    assert_eq!(count, 2);

    // Informational counter moved with the batch.
    let (status, body) = ctx.get("/api/v1/tables/detail?tableName=readings").await;
    let data = expect_data(status, &body, "detail after upload");
    assert_eq!(data["table"]["totalCount"], 2);

    println!("     ✓ Batch persisted and counter bumped");
}

async fn test_partial_rejection(ctx: &TestContext) {
    println!("  🧪 test_partial_rejection");

    let (status, body) = ctx
        .post(
            "/api/v1/upload/readings",
            json!({ "data": [
                { "sensor": "t-102", "value": 18.0 },
                { "sensor": "t-103" },
                { "sensor": "t-104", "value": 17.5, "altitude": 900 },
                { "sensor": "t-105", "value": 16.0 }
            ]}),
        )
        .await;
    let data = expect_data(status, &body, "upload mixed batch");
    assert_eq!(data["total"], 4);
    assert_eq!(data["accepted"], 2);
    assert_eq!(data["rejected"], 2);

    let errors = data["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 2);

    // Index 1 is missing a required field; index 2 carries an unknown
    // one. Each failure names its record and its violation.
    assert_eq!(errors[0]["index"], 1);
    let messages = errors[0]["messages"].as_array().unwrap();
    assert!(
        messages.iter().any(|m| m.as_str().unwrap().contains("value")),
        "missing-required message names the field: {}",
        body
    );

    assert_eq!(errors[1]["index"], 2);
    let messages = errors[1]["messages"].as_array().unwrap();
    assert!(
        messages.iter().any(|m| m.as_str().unwrap().contains("altitude")),
        "unknown-field message names the field: {}",
        body
    );

    // Valid records were not held hostage by the invalid ones.
    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM user_data_readings")
        .fetch_one(&ctx.pool)
        .await
        .expect("count query")
        .get("n");
    assert_eq!(count, 4);

    println!("     ✓ Invalid records rejected individually, valid ones kept");
}

async fn test_empty_and_unknown(ctx: &TestContext) {
    println!("  🧪 test_empty_and_unknown");

    let (status, body) = ctx
        .post("/api/v1/upload/readings", json!({ "data": [] }))
        .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "empty batch");

    let (status, body) = ctx
        .post(
            "/api/v1/upload/no_such_table",
            json!({ "data": [ { "a": 1 } ] }),
        )
        .await;
    expect_error(status, &body, StatusCode::NOT_FOUND, "unknown table");

    println!("     ✓ Empty batch is 400, unknown table is 404");
}

async fn test_upload_info(ctx: &TestContext) {
    println!("  🧪 test_upload_info");

    let (status, body) = ctx.get("/api/v1/upload/readings").await;
    let data = expect_data(status, &body, "upload info");
    assert_eq!(data["table"]["name"], "readings");
    let fields = data["fields"].as_array().expect("fields array");
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0]["originalType"], "text");
    assert_eq!(fields[1]["originalType"], "double precision");

    println!("     ✓ Upload info reflects raw column types");
}

async fn test_data_browsing(ctx: &TestContext) {
    println!("  🧪 test_data_browsing");

    // Four records were accepted across the earlier batches. The
    // browsing view returns them newest first with the field shape.
    let (status, body) = ctx.get("/api/v1/tables/data?tableName=readings").await;
    let data = expect_data(status, &body, "browse readings");
    assert_eq!(data["table"]["name"], "readings");
    assert_eq!(data["limit"], 100);
    assert_eq!(data["total"], 4);

    let records = data["records"].as_array().expect("records array");
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["sensor"], "t-105", "newest record first");
    assert_eq!(records[3]["sensor"], "t-100", "oldest record last");
    for record in records {
        let obj = record.as_object().unwrap();
        assert!(!obj.contains_key("id"), "internal columns never leak");
        assert!(!obj.contains_key("created_at"));
    }

    let fields = data["fields"].as_array().expect("fields array");
    assert_eq!(fields.len(), 3);

    // Browsing is read-only: a consumer pulling afterwards still gets
    // the very first record.
    let (status, body) = ctx
        .get("/api/v1/consume/readings?consumer=browser-check")
        .await;
    let data = expect_data(status, &body, "pull after browse");
    assert_eq!(data["data"][0]["sensor"], "t-100");

    // Missing selector.
    let (status, body) = ctx.get("/api/v1/tables/data").await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "no selector");

    println!("     ✓ Browsing view lists recent records without consuming");
}
