//! Test harness with testcontainers for integration testing.
//!
//! Uses a shared Postgres container across all tests. The container and
//! migrations are initialized once on first use, then reused.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use civic_core::config::OtpPolicy;
use civic_core::kernel::{LocalFileStore, MockMessagingGateway, ServerDeps, TestDependencies};
use civic_core::server::{build_router, AppState};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

const UPLOAD_LIMIT: usize = 1024 * 1024;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Per-test handle: a fresh pool on the shared database.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let (deps, messaging) = ctx.deps();
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }

    /// Dependencies with mock delivery; the returned gateway shares its outbox.
    pub fn deps(&self) -> (ServerDeps, MockMessagingGateway) {
        self.deps_with_policy(OtpPolicy::default())
    }

    pub fn deps_with_policy(&self, policy: OtpPolicy) -> (ServerDeps, MockMessagingGateway) {
        let test_deps = TestDependencies::new().with_otp_policy(policy);
        let messaging = test_deps.messaging.clone();
        (test_deps.into_server_deps(self.db_pool.clone()), messaging)
    }

    /// Router without rate limiting, for `oneshot` requests.
    pub fn router(&self) -> (Router, MockMessagingGateway) {
        let (router, messaging, _) = self.router_with_uploads();
        (router, messaging)
    }

    /// Router whose file store writes to, and serves from, the returned directory.
    pub fn router_with_uploads(&self) -> (Router, MockMessagingGateway, PathBuf) {
        let (mut deps, messaging) = self.deps();
        let upload_dir =
            std::env::temp_dir().join(format!("civic-http-{}", uuid::Uuid::new_v4()));
        deps.file_store = Arc::new(LocalFileStore::new(upload_dir.clone(), UPLOAD_LIMIT));
        let router = build_router(AppState::new(deps, upload_dir.clone(), UPLOAD_LIMIT));
        (router, messaging, upload_dir)
    }
}
