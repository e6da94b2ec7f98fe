use refresh_service::config::Config;
use refresh_service::handlers::AppState;
use refresh_service::jwt::JwtManager;
use refresh_service::routes;
use refresh_service::services::JwtRefreshService;
use refresh_service::user_token::{
    InMemoryRevocationRegistry, JwtUserTokenIssuer, JwtUserTokenReader, JwtUserTokenValidator,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration before tracing so LOG_LEVEL/LOG_FORMAT apply
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    let json_layer = config
        .observability
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.observability.json_logs).then(tracing_subscriber::fmt::layer);
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    info!("Starting token refresher");

    let keys = config.key_ring().map_err(|e| {
        error!("Failed to load keys: {}", e);
        e
    })?;
    info!(
        kid = keys.signing.key_id(),
        encrypted = keys.content.is_some(),
        "Keys loaded"
    );

    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    let manager = Arc::new(JwtManager::new(keys));
    // Nothing in this process records revocations. A host that revokes
    // sessions supplies its own RevokedTokenRegistry here.
    let revocations = Arc::new(InMemoryRevocationRegistry::new());
    let refresh_service = JwtRefreshService::new(
        Arc::new(JwtUserTokenReader::new(Arc::clone(&manager))),
        Arc::new(JwtUserTokenValidator::new(revocations).with_clock_skew(config.clock_skew())),
        Arc::new(JwtUserTokenIssuer::new(manager, config.token_ttl())),
    );

    let state = Arc::new(AppState {
        refresh_service: Arc::new(refresh_service),
    });
    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Token refresher listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
