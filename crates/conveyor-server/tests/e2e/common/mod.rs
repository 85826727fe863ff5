//! Shared test infrastructure for Conveyor end-to-end tests.
//!
//! This module provides:
//! - Docker container management for PostgreSQL
//! - A test context holding the pool and application state
//! - HTTP helpers that drive the real router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use conveyor_ingest::{create_sink, SinkBackend};
use conveyor_server::{create_router, AppState};
use serde_json::Value;
use sqlx::PgPool;
use std::process::Command;
use std::time::Duration;
use tower::ServiceExt;

// =============================================================================
// DOCKER CONTAINER CONFIGURATION
// =============================================================================

pub const CONTAINER_NAME: &str = "conveyor_test_postgres";
pub const POSTGRES_PORT: u16 = 5434;
pub const POSTGRES_PASSWORD: &str = "conveyor_test_password";
pub const DATABASE_NAME: &str = "conveyor_test";

pub fn database_url() -> String {
    format!(
        "postgres://postgres:{}@localhost:{}/{}",
        POSTGRES_PASSWORD, POSTGRES_PORT, DATABASE_NAME
    )
}

// =============================================================================
// DOCKER CONTAINER MANAGEMENT
// =============================================================================

/// Start a PostgreSQL container for testing
pub fn start_postgres_container() -> Result<(), String> {
    let output = Command::new("docker")
        .args(["ps", "-a", "-q", "-f", &format!("name={}", CONTAINER_NAME)])
        .output()
        .map_err(|e| format!("Failed to check existing container: {}", e))?;

    let container_exists = !String::from_utf8_lossy(&output.stdout).trim().is_empty();

    if container_exists {
        let _ = Command::new("docker")
            .args(["rm", "-f", CONTAINER_NAME])
            .output();
    }

    let status = Command::new("docker")
        .args([
            "run",
            "-d",
            "--name",
            CONTAINER_NAME,
            "-e",
            &format!("POSTGRES_PASSWORD={}", POSTGRES_PASSWORD),
            "-e",
            &format!("POSTGRES_DB={}", DATABASE_NAME),
            "-p",
            &format!("{}:5432", POSTGRES_PORT),
            "postgres:16-alpine",
        ])
        .status()
        .map_err(|e| format!("Failed to start container: {}", e))?;

    if !status.success() {
        return Err("Failed to start PostgreSQL container".to_string());
    }

    Ok(())
}

/// Stop and remove the PostgreSQL container
pub fn stop_postgres_container() {
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output();
}

/// Wait for PostgreSQL to be ready
pub async fn wait_for_postgres() -> Result<PgPool, String> {
    for attempt in 1..=30 {
        match PgPool::connect(&database_url()).await {
            Ok(pool) => {
                if sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok() {
                    println!("✅ PostgreSQL ready after {} attempts", attempt);
                    return Ok(pool);
                }
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    println!("⏳ Waiting for PostgreSQL... (attempt {})", attempt);
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    Err("PostgreSQL did not become ready in time".to_string())
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

pub struct TestContext {
    pub pool: PgPool,
    pub state: AppState,
}

impl TestContext {
    pub async fn setup() -> Result<Self, String> {
        start_postgres_container()?;
        let pool = wait_for_postgres().await?;
        conveyor_schema::bootstrap::ensure_registry(&pool)
            .await
            .map_err(|e| format!("Failed to create registry tables: {}", e))?;
        println!("✅ Registry tables created");

        let sink = create_sink(SinkBackend::Direct, pool.clone());
        let state = AppState::new(pool.clone(), sink);
        Ok(Self { pool, state })
    }

    /// Drive one request through a fresh instance of the real router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let router = create_router(self.state.clone());
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("valid request"),
            None => Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .expect("valid request"),
        };

        let response = router.oneshot(request).await.expect("router never errors");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, value)
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, Some(body)).await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request("GET", path, None).await
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        stop_postgres_container();
        println!("🧹 PostgreSQL container removed");
    }
}

// =============================================================================
// ASSERTION HELPERS
// =============================================================================

/// Assert a success envelope and return its `data` payload.
pub fn expect_data(status: StatusCode, body: &Value, context: &str) -> Value {
    assert_eq!(status, StatusCode::OK, "{}: body {}", context, body);
    assert_eq!(body["success"], true, "{}: body {}", context, body);
    body["data"].clone()
}

/// Assert a failure envelope with the given status.
pub fn expect_error(status: StatusCode, body: &Value, expected: StatusCode, context: &str) {
    assert_eq!(status, expected, "{}: body {}", context, body);
    assert_eq!(body["success"], false, "{}: body {}", context, body);
}
