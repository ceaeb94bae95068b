use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use forum_service::grpc::start_grpc_server;
use forum_service::metrics::serve_metrics;
use forum_service::repository::PgForumRepository;
use forum_service::services::ContentService;
use forum_service::Config;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(json_logs: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "forum-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({"ready": true})),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "ready": false,
                "error": "PostgreSQL connection failed"
            }))
        }
    }
}

/// Forum Service
///
/// Threads and messages over gRPC, PostgreSQL for storage.
///
/// - gRPC `forum.v1.Forum` on GRPC_PORT (default 50060), plus grpc.health.v1
/// - HTTP `/health`, `/ready`, `/metrics` on HTTP_PORT (default 8090)
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.json_logs);

    info!("Starting forum-service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: env={}, http_port={}, grpc_port={}",
        config.app.env, config.app.http_port, config.grpc.port
    );

    let db = &config.database;
    let connect_options =
        PgConnectOptions::from_str(&db.url).context("Failed to parse DATABASE_URL")?;
    let pg_pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .min_connections(db.min_connections)
        .acquire_timeout(Duration::from_secs(db.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(db.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(db.max_lifetime_secs))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database")?;
    info!("Database pool created: {:?}", db);

    let repository = Arc::new(PgForumRepository::new(pg_pool.clone()));
    let content = ContentService::initialize(repository)
        .await
        .context("Failed to prepare forum schema")?;
    info!("Forum schema ready");

    let grpc_addr: SocketAddr = format!("{}:{}", config.app.host, config.grpc.port)
        .parse()
        .context("Invalid gRPC address")?;
    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);

    let mut join_set = JoinSet::new();

    let http_pool = pg_pool.clone();
    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(http_pool.clone()))
            .route("/health", web::get().to(liveness_check))
            .route("/ready", web::get().to(readiness_check))
            .route("/metrics", web::get().to(serve_metrics))
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .disable_signals()
    .run();
    let http_handle = http_server.handle();

    join_set.spawn(async move {
        http_server
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
    });
    info!("HTTP health server listening on http://{}", http_addr);

    join_set.spawn(async move {
        start_grpc_server(grpc_addr, content, shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("gRPC server error: {}", e))
    });

    // The gRPC server owns the signal; the first task to finish stops the rest.
    let outcome = match join_set.join_next().await {
        Some(Ok(result)) => result,
        Some(Err(e)) => Err(anyhow::anyhow!("Task panicked: {}", e)),
        None => Ok(()),
    };

    info!("forum-service shutting down");
    http_handle.stop(true).await;
    join_set.shutdown().await;
    pg_pool.close().await;

    outcome
}
