pub mod analytics;
pub mod chef;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repo;
pub mod routes;


use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use analytics::AnalyticsEngine;
use config::Config;
use db::Database;
use lifecycle::{LifecyclePolicy, OrderLifecycle};
use repo::OrderStore;

#[derive(Clone)]
pub struct AppState {
    pub store: OrderStore,
    pub analytics: AnalyticsEngine,
    pub lifecycle: OrderLifecycle,
}

impl AppState {
    pub fn new(db: Arc<Database>, policy: LifecyclePolicy) -> Self {
        let store = OrderStore::new(db.clone());
        let analytics = AnalyticsEngine::new(db);
        let lifecycle = OrderLifecycle::new(store.clone(), analytics.clone(), policy);
        Self {
            store,
            analytics,
            lifecycle,
        }
    }
}

pub async fn run() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let db = Arc::new(Database::open(&config.db_path()).expect("Failed to open database"));
    db.initialize().expect("Failed to initialize database");

    let policy = if config.strict_transitions {
        LifecyclePolicy::strict()
    } else {
        LifecyclePolicy::default()
    };
    let state = AppState::new(db, policy);
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|err| panic!("Failed to bind {addr}: {err}"));

    info!("Fish Burger backend listening on http://{addr}");
    info!("API endpoints available under /api");

    axum::serve(listener, app)
        .await
        .expect("error while running server");
}
