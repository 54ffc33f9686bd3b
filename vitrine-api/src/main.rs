use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_api::{app, AppState};
use vitrine_catalog::SystemClock;
use vitrine_core::PricingResolver;
use vitrine_store::{DbClient, PgFlashSaleRepository, PgProductRepository, RedisClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = vitrine_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Vitrine API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let redis = RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    let products = Arc::new(PgProductRepository::new(db.pool.clone()));
    let sales = Arc::new(PgFlashSaleRepository::new(db.pool.clone()));
    let views = Arc::new(redis);

    let resolver = Arc::new(PricingResolver::new(
        products.clone(),
        sales.clone(),
        Arc::new(SystemClock),
    ));

    let app_state = AppState {
        products,
        sales,
        views,
        resolver,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
