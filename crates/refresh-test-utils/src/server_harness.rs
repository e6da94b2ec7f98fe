//! Test server harness for E2E testing
//!
//! Provides `TestRefreshServer` for spawning real refresh service instances in tests.

use crate::crypto_fixtures::{test_key_ring, KeyMode};
use metrics_exporter_prometheus::PrometheusBuilder;
use refresh_service::handlers::AppState;
use refresh_service::jwt::JwtManager;
use refresh_service::routes;
use refresh_service::services::JwtRefreshService;
use refresh_service::user_token::{
    InMemoryRevocationRegistry, JwtUserTokenIssuer, JwtUserTokenReader, JwtUserTokenValidator,
    TokenTtl,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Path of the refresh endpoint.
pub const REFRESH_PATH: &str = "/api/v1/admin/token/refresh";

/// Test harness for spawning the refresh service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_refresh_e2e() -> Result<(), anyhow::Error> {
///     let server = TestRefreshServer::spawn(KeyMode::Encrypted).await?;
///     let response = server.post_refresh(Some("Bearer abc")).await?;
///     assert_eq!(response.status(), 401);
///     Ok(())
/// }
/// ```
pub struct TestRefreshServer {
    addr: SocketAddr,
    manager: Arc<JwtManager>,
    revocations: Arc<InMemoryRevocationRegistry>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestRefreshServer {
    /// Spawn a new test server instance
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Use the fixture key ring for `mode`
    /// - Start the HTTP server in the background
    pub async fn spawn(mode: KeyMode) -> Result<Self, anyhow::Error> {
        Self::spawn_with_seed(1, mode).await
    }

    /// Spawn a server whose signing key comes from `seed`
    ///
    /// Servers with different seeds reject each other's signed tokens.
    pub async fn spawn_with_seed(seed: u8, mode: KeyMode) -> Result<Self, anyhow::Error> {
        let keys = test_key_ring(seed, mode)
            .map_err(|e| anyhow::anyhow!("Failed to build test key ring: {}", e))?;

        let manager = Arc::new(JwtManager::new(keys));
        let revocations = Arc::new(InMemoryRevocationRegistry::new());
        let refresh_service = JwtRefreshService::new(
            Arc::new(JwtUserTokenReader::new(Arc::clone(&manager))),
            Arc::new(JwtUserTokenValidator::new(revocations.clone())),
            Arc::new(JwtUserTokenIssuer::new(
                Arc::clone(&manager),
                TokenTtl::default(),
            )),
        );

        let state = Arc::new(AppState {
            refresh_service: Arc::new(refresh_service),
        });

        // The global recorder can only be installed once per test process.
        // Later servers get a standalone recorder instead.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            manager,
            revocations,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Manager holding the server's keys, for minting and reading tokens
    pub fn manager(&self) -> &JwtManager {
        &self.manager
    }

    /// Revocation registry consulted by the server's validator
    pub fn revocations(&self) -> &InMemoryRevocationRegistry {
        &self.revocations
    }

    /// POST to the refresh endpoint with an optional raw `Authorization` value
    pub async fn post_refresh(
        &self,
        authorization: Option<&str>,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let mut request = self
            .client
            .post(format!("{}{}", self.url(), REFRESH_PATH));
        if let Some(value) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, value);
        }
        Ok(request.send().await?)
    }

    /// Refresh `token` as a bearer credential and return the new token
    ///
    /// Fails on any non-200 response.
    pub async fn refresh(&self, token: &str) -> Result<String, anyhow::Error> {
        let response = self
            .post_refresh(Some(&format!("Bearer {}", token)))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Refresh failed with {}: {}", status, body);
        }

        Ok(response.json::<String>().await?)
    }
}
