/// Common test utilities for integration tests
///
/// Provides shared infrastructure for exercising the full router
/// against a real database:
/// - Test database setup (migrations run on first use)
/// - Test user creation and JWT token generation
/// - Request helpers driving the router via `tower::Service`
///
/// Integration tests need `DATABASE_URL` to point at a PostgreSQL
/// instance; when it is not set, `TestContext::new()` returns `None`
/// and tests skip themselves.
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::PgPool;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskdeck_shared::auth::jwt::{create_token, Claims, TokenType};
use taskdeck_shared::db::migrations::run_migrations;
use taskdeck_shared::models::user::{CreateUser, User};
use tower::Service as _;
use uuid::Uuid;

/// Signing secret used by the test router and test tokens
pub const TEST_JWT_SECRET: &str = "taskdeck-test-secret-0123456789abcdef";

/// Placeholder hash for users that never log in through the API
///
/// Real hashing is exercised by the auth flow tests; task tests only
/// need a user row and a token.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHQ$unused";

/// Test context containing the router, database, and a fresh user
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    ///
    /// Returns `None` when `DATABASE_URL` is not configured, so tests
    /// can skip cleanly on machines without a database.
    pub async fn new() -> Option<Self> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").ok()?;

        let db = PgPool::connect(&url).await.expect("connect test database");
        run_migrations(&db).await.expect("run migrations");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        let (user, token) = create_test_user(&db).await;

        Some(Self {
            db,
            app,
            user,
            token,
        })
    }

    /// Removes the context's user (tasks cascade)
    pub async fn cleanup(self) {
        delete_user(&self.db, self.user.id).await;
    }
}

/// Creates a user row with a unique username and a valid access token
pub async fn create_test_user(db: &PgPool) -> (User, String) {
    let user = User::create(
        db,
        CreateUser {
            username: format!("test-user-{}", Uuid::new_v4()),
            password_hash: DUMMY_PASSWORD_HASH.to_string(),
        },
    )
    .await
    .expect("create test user");

    let claims = Claims::new(user.id, TokenType::Access);
    let token = create_token(&claims, TEST_JWT_SECRET).expect("create test token");

    (user, token)
}

/// Deletes a user row (tasks cascade)
pub async fn delete_user(db: &PgPool, id: Uuid) {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .expect("delete test user");
}

/// Sends a request through the router and returns status + JSON body
///
/// Empty response bodies (e.g. 204) come back as `Value::Null`.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!(
                "response body is not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&bytes)
            )
        })
    };

    (status, json)
}

/// Creates a task through the API and returns its response body
pub async fn create_task(
    ctx: &TestContext,
    token: &str,
    title: &str,
    description: &str,
    status: Option<&str>,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "title": title,
        "description": description,
        "due_date": "2024-01-10",
    });
    if let Some(status) = status {
        body["status"] = serde_json::Value::String(status.to_string());
    }

    let (status_code, json) = request(&ctx.app, "POST", "/v1/tasks", Some(token), Some(body)).await;
    assert_eq!(
        status_code,
        StatusCode::CREATED,
        "task creation failed: {}",
        json
    );

    json
}
