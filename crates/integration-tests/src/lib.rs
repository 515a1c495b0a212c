//! Integration tests for LeadDesk.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests
//! LEADDESK_TEST_DATABASE_URL=postgres://localhost/leaddesk_test \
//!     cargo test -p leaddesk-integration-tests -- --ignored
//! ```
//!
//! HTTP tests additionally need the admin server running against the same
//! database (`LEADDESK_TEST_BASE_URL`, default `http://localhost:5001`).
//!
//! # Test Categories
//!
//! - `store_atomicity` - `PgStore` transactions against a real database
//! - `admin_leads` - Upload and distribution through the HTTP API

#![allow(clippy::missing_panics_doc)]

use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use leaddesk_admin::db::{AgentRepository, create_pool};
use leaddesk_admin::models::{Agent, NewAgent};
use leaddesk_admin::services::AuthService;

/// Password given to admins created by tests.
pub const TEST_PASSWORD: &str = "integration-password";

/// Base URL of the running admin server.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("LEADDESK_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:5001".to_string())
}

/// Connect to the test database and apply migrations.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("LEADDESK_TEST_DATABASE_URL")
        .expect("LEADDESK_TEST_DATABASE_URL must be set for ignored tests");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// An email no other test run will use.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// A lead name no other test run will use.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

/// Insert an agent directly.
pub async fn create_agent(pool: &PgPool, name: &str) -> Agent {
    let agent = NewAgent::parse(name, &unique_email("agent"), "+12015550123")
        .expect("valid test agent");
    AgentRepository::new(pool)
        .create(&agent)
        .await
        .expect("Failed to create agent")
}

/// Count stored leads with this first name.
pub async fn count_leads_named(pool: &PgPool, first_name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leaddesk.lead WHERE first_name = $1")
        .bind(first_name)
        .fetch_one(pool)
        .await
        .expect("Failed to count leads")
}

/// Create a fresh admin and return a client holding its session cookie.
pub async fn logged_in_client(pool: &PgPool) -> Client {
    let email = unique_email("admin");
    AuthService::new(pool)
        .register(&email, "Integration Admin", TEST_PASSWORD)
        .await
        .expect("Failed to create admin");

    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client");

    let resp = client
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&serde_json::json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to log in");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());

    client
}
