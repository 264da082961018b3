//! Axum REST API handlers.
//!
//! Every coordinator-invoking route resolves the caller through
//! [`AuthUser`](crate::auth::AuthUser) first. Reservation-workflow
//! permissions live in the coordinator so the same policy holds no matter
//! which entry point calls it; the listing CRUD routes enforce the
//! donor-ownership checks the stores delegate to their caller.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use good2give_core::{
    compute_impact, CoordinatorError, FoodListing, ImpactConfig, ImpactMetrics,
    ListingDisplayStatus, ListingFilter, ListingStore, ListingUpdate, NewListing, Reservation,
    ReservationCoordinator, ReservationStatus, ReservationStore, Role,
};

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{SqliteListings, SqliteReservations};
use crate::errors::Result;

pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub coordinator: ReservationCoordinator<SqliteListings, SqliteReservations>,
    pub impact_config: ImpactConfig,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// A listing plus its derived display status (`expired` overlaying an
/// `available` listing past its expiry date).
#[derive(Serialize)]
pub struct ListingResponse {
    #[serde(flatten)]
    pub listing: FoodListing,
    pub display_status: ListingDisplayStatus,
}

impl ListingResponse {
    fn new(listing: FoodListing) -> Self {
        let display_status = listing.display_status(Utc::now());
        Self {
            listing,
            display_status,
        }
    }
}

#[derive(Serialize)]
pub struct ListingsResponse {
    pub count: usize,
    pub listings: Vec<ListingResponse>,
}

#[derive(Serialize)]
pub struct ReservationsResponse {
    pub count: usize,
    pub reservations: Vec<Reservation>,
}

/// Both sides of a reservation transition, as they stand afterwards.
#[derive(Serialize)]
pub struct TransitionResponse {
    pub reservation: Reservation,
    pub listing: ListingResponse,
}

// ─────────────────────────────────────────────────────────
// Request shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReserveRequest {
    pub listing_id: String,
    #[serde(default)]
    pub pickup_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub status: ReservationStatus,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /listings`
///
/// Available, unexpired listings matching the optional `category` and
/// `search` query parameters, newest first. Public — browsing needs no
/// account.
pub async fn get_listings(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<ListingsResponse>> {
    let listings = state.coordinator.available_listings(&filter).await?;
    Ok(Json(ListingsResponse {
        count: listings.len(),
        listings: listings.into_iter().map(ListingResponse::new).collect(),
    }))
}

/// `GET /listings/:id`
pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>> {
    let listing = state
        .coordinator
        .listings()
        .get(&id)
        .await
        .map_err(CoordinatorError::from)?
        .ok_or(CoordinatorError::NotFound)?;
    Ok(Json(ListingResponse::new(listing)))
}

/// `POST /listings`
///
/// Donor only. Identity, display name, `available` status, and the creation
/// timestamp are stamped from the token, never taken from the body.
pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(req): Json<NewListing>,
) -> Result<(StatusCode, Json<ListingResponse>)> {
    if actor.role != Role::Donor {
        return Err(CoordinatorError::Forbidden.into());
    }

    let listing = req.into_listing(&actor, Utc::now());
    state
        .coordinator
        .listings()
        .insert(&listing)
        .await
        .map_err(CoordinatorError::from)?;
    Ok((StatusCode::CREATED, Json(ListingResponse::new(listing))))
}

/// `PATCH /listings/:id`
///
/// Non-status fields only, and only by the owning donor.
pub async fn update_listing(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(update): Json<ListingUpdate>,
) -> Result<Json<ListingResponse>> {
    let listing = state
        .coordinator
        .listings()
        .get(&id)
        .await
        .map_err(CoordinatorError::from)?
        .ok_or(CoordinatorError::NotFound)?;
    if listing.donor_id != actor.id {
        return Err(CoordinatorError::Forbidden.into());
    }

    let updated = state
        .coordinator
        .listings()
        .update_fields(&id, &update)
        .await
        .map_err(CoordinatorError::from)?
        .ok_or(CoordinatorError::NotFound)?;
    Ok(Json(ListingResponse::new(updated)))
}

/// `POST /reservations`
///
/// Reserve an available listing. A lost race surfaces as 409 and leaves no
/// reservation behind.
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(req): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<Reservation>)> {
    let reservation = state
        .coordinator
        .reserve(&req.listing_id, &actor, req.pickup_time, req.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// `POST /reservations/:id/status`
///
/// Drive a reservation to `confirmed`, `completed`, or `cancelled`. The
/// listing side effect is applied in the same operation; the response
/// carries both records.
pub async fn update_reservation_status(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>> {
    let (reservation, listing) = state.coordinator.transition(&id, &actor, req.status).await?;
    Ok(Json(TransitionResponse {
        reservation,
        listing: ListingResponse::new(listing),
    }))
}

/// `GET /reservations`
///
/// The authenticated actor's view: own claims for a recipient, claims
/// against owned listings for a donor.
pub async fn get_reservations(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<Json<ReservationsResponse>> {
    let reservations = state.coordinator.reservations_for(&actor).await?;
    Ok(Json(ReservationsResponse {
        count: reservations.len(),
        reservations,
    }))
}

/// `GET /impact`
///
/// Aggregate impact metrics recomputed on demand from completed donations.
pub async fn get_impact(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ImpactMetrics>> {
    let listings = state
        .coordinator
        .listings()
        .list()
        .await
        .map_err(CoordinatorError::from)?;
    let reservations = state
        .coordinator
        .reservations()
        .list()
        .await
        .map_err(CoordinatorError::from)?;
    let metrics = compute_impact(&reservations, &listings, &state.impact_config);
    Ok(Json(metrics))
}
