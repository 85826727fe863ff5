//! Table provisioning tests: creation, validation rejections, the
//! detail projection, and the catalog listings.

use super::common::*;
use axum::http::StatusCode;
use serde_json::json;
use sqlx::Row;

pub async fn run_all_tests(ctx: &TestContext) {
    test_create_and_describe(ctx).await;
    test_duplicate_name_rejected(ctx).await;
    test_invalid_spec_rejected(ctx).await;
    test_unique_key_constraint_created(ctx).await;
    test_listings(ctx).await;
}

async fn test_create_and_describe(ctx: &TestContext) {
    println!("  🧪 test_create_and_describe");

    let (status, body) = ctx
        .post(
            "/api/v1/tables/create",
            json!({
                "tableName": "orders",
                "tableAliasName": "Orders",
                "fields": [
                    { "name": "sku", "type": "Text", "required": true },
                    { "name": "quantity", "type": "Integer", "required": true },
                    { "name": "price", "type": "Float" },
                    { "name": "shipped", "type": "Boolean" },
                    { "name": "ordered_at", "type": "Timestamp" },
                    { "name": "metadata", "type": "Json" }
                ]
            }),
        )
        .await;
    let data = expect_data(status, &body, "create orders");
    assert_eq!(data["tableName"], "orders");
    assert_eq!(data["tableAliasName"], "Orders");
    assert_eq!(data["fieldCount"], 6);
    let table_id = data["tableId"].as_i64().expect("numeric table id");

    // The described shape must come back from the live store, with the
    // declared names, order, and mapped types intact.
    let (status, body) = ctx
        .get(&format!("/api/v1/tables/detail?tableId={}", table_id))
        .await;
    let data = expect_data(status, &body, "detail orders");
    let fields = data["fields"].as_array().expect("fields array");
    let names: Vec<&str> = fields.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec!["sku", "quantity", "price", "shipped", "ordered_at", "metadata"]
    );
    assert_eq!(fields[0]["fieldType"], "Text");
    assert_eq!(fields[0]["required"], true);
    assert_eq!(fields[1]["fieldType"], "Integer");
    assert_eq!(fields[2]["fieldType"], "Float");
    assert_eq!(fields[2]["required"], false);
    assert_eq!(fields[3]["fieldType"], "Boolean");
    assert_eq!(fields[4]["fieldType"], "Timestamp");
    assert_eq!(fields[5]["fieldType"], "Json");

    // Internal columns never leak into the projection.
    assert!(!names.contains(&"id"));
    assert!(!names.contains(&"created_at"));
    assert!(!names.contains(&"updated_at"));

    // Sample record covers every field.
    let template = data["templateData"].as_object().expect("template object");
    assert_eq!(template.len(), 6);
    assert!(template["quantity"].is_number());
    assert!(template["shipped"].is_boolean());

    // Lookup by name resolves to the same table.
    let (status, body) = ctx.get("/api/v1/tables/detail?tableName=orders").await;
    let data = expect_data(status, &body, "detail by name");
    assert_eq!(data["table"]["id"].as_i64(), Some(table_id));

    println!("     ✓ Declared fields round-trip through the live store");
}

async fn test_duplicate_name_rejected(ctx: &TestContext) {
    println!("  🧪 test_duplicate_name_rejected");

    let before: i64 = sqlx::query("SELECT COUNT(*) AS n FROM conveyor_tables")
        .fetch_one(&ctx.pool)
        .await
        .expect("count query")
        .get("n");

    let (status, body) = ctx
        .post(
            "/api/v1/tables/create",
            json!({
                "tableName": "orders",
                "tableAliasName": "Orders Again",
                "fields": [ { "name": "sku", "type": "Text" } ]
            }),
        )
        .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "duplicate create");
    assert!(
        body["message"].as_str().unwrap().contains("already exists"),
        "message names the collision: {}",
        body
    );

    let after: i64 = sqlx::query("SELECT COUNT(*) AS n FROM conveyor_tables")
        .fetch_one(&ctx.pool)
        .await
        .expect("count query")
        .get("n");
    assert_eq!(before, after, "rejected create must not add a catalog row");

    println!("     ✓ Name collision rejected without touching the catalog");
}

async fn test_invalid_spec_rejected(ctx: &TestContext) {
    println!("  🧪 test_invalid_spec_rejected");

    // Identifier rule on the table name.
    let (status, body) = ctx
        .post(
            "/api/v1/tables/create",
            json!({
                "tableName": "9starts_with_digit",
                "tableAliasName": "",
                "fields": [ { "name": "a", "type": "Text" } ]
            }),
        )
        .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "bad table name");

    // Empty field list.
    let (status, body) = ctx
        .post(
            "/api/v1/tables/create",
            json!({ "tableName": "empty_fields", "tableAliasName": "", "fields": [] }),
        )
        .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "empty fields");

    // Unique key referencing an undeclared field.
    let (status, body) = ctx
        .post(
            "/api/v1/tables/create",
            json!({
                "tableName": "bad_unique",
                "tableAliasName": "",
                "fields": [ { "name": "a", "type": "Text" } ],
                "uniqueKeys": ["missing"]
            }),
        )
        .await;
    expect_error(status, &body, StatusCode::BAD_REQUEST, "bad unique key");

    println!("     ✓ Structural validation rejects before any DDL runs");
}

async fn test_unique_key_constraint_created(ctx: &TestContext) {
    println!("  🧪 test_unique_key_constraint_created");

    let (status, body) = ctx
        .post(
            "/api/v1/tables/create",
            json!({
                "tableName": "devices",
                "tableAliasName": "Devices",
                "fields": [
                    { "name": "vendor", "type": "Text", "required": true },
                    { "name": "serial", "type": "Text", "required": true }
                ],
                "uniqueKeys": ["vendor", "serial"]
            }),
        )
        .await;
    let data = expect_data(status, &body, "create devices");
    assert_eq!(data["uniqueKeys"], json!(["vendor", "serial"]));

    // The constraint is real: the detail endpoint re-derives it from
    // information_schema, not from anything stored at creation time.
    let (status, body) = ctx.get("/api/v1/tables/detail?tableName=devices").await;
    let data = expect_data(status, &body, "detail devices");
    assert_eq!(data["uniqueKeys"], json!(["vendor", "serial"]));

    println!("     ✓ Unique constraint derived back from the store");
}

async fn test_listings(ctx: &TestContext) {
    println!("  🧪 test_listings");

    let (status, body) = ctx.get("/api/v1/tables/list").await;
    let data = expect_data(status, &body, "list");
    let tables = data.as_array().expect("list array");
    assert!(tables.iter().any(|t| t["name"] == "orders"));
    assert!(tables.iter().any(|t| t["name"] == "devices"));
    for table in tables {
        assert_eq!(table["status"], "active");
        assert_eq!(table["canConsume"], true);
    }

    let (status, body) = ctx.get("/api/v1/tables/active").await;
    let data = expect_data(status, &body, "active");
    let active = data.as_array().expect("active array");
    assert!(active.iter().any(|t| t["name"] == "orders"));

    // Unknown id is a 404, not an empty success.
    let (status, body) = ctx.get("/api/v1/tables/detail?tableId=999999").await;
    expect_error(status, &body, StatusCode::NOT_FOUND, "unknown id");

    println!("     ✓ Listings and lookups consistent");
}
