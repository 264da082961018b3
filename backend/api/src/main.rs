//! Good2Give REST API — entry point.
//!
//! Serves the food-donation marketplace over SQLite: signup/login exchange
//! credentials for a bearer token, donors post listings, recipients reserve
//! them, and the reservation workflow runs through the core coordinator so
//! the listing/reservation invariants hold for every caller.

mod api;
mod auth;
mod config;
mod db;
mod errors;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use good2give_core::{CoordinatorPolicy, ImpactConfig, ReservationCoordinator};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::AppState;
use config::Config;
use db::{SqliteListings, SqliteReservations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    let coordinator = ReservationCoordinator::new(
        SqliteListings::new(pool.clone()),
        SqliteReservations::new(pool.clone()),
        CoordinatorPolicy {
            donor_may_complete: config.donor_may_complete,
        },
    );

    let state = Arc::new(AppState {
        pool,
        config: config.clone(),
        coordinator,
        impact_config: ImpactConfig::default(),
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/listings", get(api::get_listings).post(api::create_listing))
        .route(
            "/listings/:id",
            get(api::get_listing).patch(api::update_listing),
        )
        .route("/reservations", get(api::get_reservations).post(api::create_reservation))
        .route("/reservations/:id/status", post(api::update_reservation_status))
        .route("/impact", get(api::get_impact))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
