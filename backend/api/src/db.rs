//! Database layer — migrations, user queries, and the SQLite-backed store
//! pair consumed by the reservation coordinator.
//!
//! The stores implement the core `ListingStore` / `ReservationStore` traits;
//! the compare-and-set required by the coordinator maps onto a conditional
//! `UPDATE ... WHERE id = ? AND status = ?`, whose `rows_affected` tells the
//! caller whether it won.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use good2give_core::{
    Coordinates, FoodCategory, FoodListing, ListingStatus, ListingStore, ListingUpdate, Location,
    Reservation, ReservationStatus, ReservationStore, StoreError, Temperature,
};

use crate::errors::Result;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // Make sure the file is created if it doesn't exist yet.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

fn store_err(e: impl std::fmt::Display) -> StoreError {
    StoreError(e.to_string())
}

// ─────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────

/// A user row as stored in / read from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub organization: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, password_hash, role, organization, address, phone, created_at
        FROM   users
        WHERE  email = ?1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn insert_user(pool: &SqlitePool, user: &UserRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users
            (id, name, email, password_hash, role, organization, address, phone, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(&user.organization)
    .bind(&user.address)
    .bind(&user.phone)
    .bind(user.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Listings
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
struct ListingRow {
    id: String,
    title: String,
    description: String,
    quantity: f64,
    unit: String,
    category: String,
    expiry_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    status: String,
    donor_id: String,
    donor_name: String,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    image_url: Option<String>,
    pickup_instructions: Option<String>,
    dietary_info: Option<String>,
    temperature: Option<String>,
}

impl TryFrom<ListingRow> for FoodListing {
    type Error = StoreError;

    fn try_from(row: ListingRow) -> std::result::Result<Self, StoreError> {
        let category = FoodCategory::parse(&row.category)
            .ok_or_else(|| store_err(format!("unknown category: {}", row.category)))?;
        let status = ListingStatus::parse(&row.status)
            .ok_or_else(|| store_err(format!("unknown listing status: {}", row.status)))?;
        let temperature = match row.temperature.as_deref() {
            Some(t) => Some(
                Temperature::parse(t)
                    .ok_or_else(|| store_err(format!("unknown temperature: {t}")))?,
            ),
            None => None,
        };
        let dietary_info = match row.dietary_info.as_deref() {
            Some(json) => Some(serde_json::from_str(json).map_err(store_err)?),
            None => None,
        };
        let coordinates = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };

        Ok(FoodListing {
            id: row.id,
            title: row.title,
            description: row.description,
            quantity: row.quantity,
            unit: row.unit,
            category,
            expiry_date: row.expiry_date,
            created_at: row.created_at,
            status,
            donor_id: row.donor_id,
            donor_name: row.donor_name,
            location: Location {
                address: row.address,
                coordinates,
            },
            image_url: row.image_url,
            pickup_instructions: row.pickup_instructions,
            dietary_info,
            temperature,
        })
    }
}

const LISTING_COLUMNS: &str = "id, title, description, quantity, unit, category, expiry_date, \
     created_at, status, donor_id, donor_name, address, lat, lng, image_url, \
     pickup_instructions, dietary_info, temperature";

/// Listing half of the SQLite store pair.
#[derive(Clone)]
pub struct SqliteListings {
    pool: SqlitePool,
}

impl SqliteListings {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for SqliteListings {
    async fn get(&self, id: &str) -> std::result::Result<Option<FoodListing>, StoreError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(FoodListing::try_from).transpose()
    }

    async fn insert(&self, listing: &FoodListing) -> std::result::Result<(), StoreError> {
        let dietary_info = listing
            .dietary_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT INTO listings
                (id, title, description, quantity, unit, category, expiry_date,
                 created_at, status, donor_id, donor_name, address, lat, lng,
                 image_url, pickup_instructions, dietary_info, temperature)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18)
            "#,
        )
        .bind(&listing.id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.quantity)
        .bind(&listing.unit)
        .bind(listing.category.as_str())
        .bind(listing.expiry_date)
        .bind(listing.created_at)
        .bind(listing.status.as_str())
        .bind(&listing.donor_id)
        .bind(&listing.donor_name)
        .bind(&listing.location.address)
        .bind(listing.location.coordinates.map(|c| c.lat))
        .bind(listing.location.coordinates.map(|c| c.lng))
        .bind(&listing.image_url)
        .bind(&listing.pickup_instructions)
        .bind(dietary_info)
        .bind(listing.temperature.map(|t| t.as_str()))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn update_fields(
        &self,
        id: &str,
        update: &ListingUpdate,
    ) -> std::result::Result<Option<FoodListing>, StoreError> {
        // Read-modify-write; status and ownership columns are never touched
        // through this path.
        let Some(mut listing) = self.get(id).await? else {
            return Ok(None);
        };
        update.apply(&mut listing);

        let dietary_info = listing
            .dietary_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(store_err)?;

        sqlx::query(
            r#"
            UPDATE listings
            SET    title = ?2, description = ?3, quantity = ?4, unit = ?5,
                   category = ?6, expiry_date = ?7, address = ?8, lat = ?9,
                   lng = ?10, image_url = ?11, pickup_instructions = ?12,
                   dietary_info = ?13, temperature = ?14
            WHERE  id = ?1
            "#,
        )
        .bind(id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.quantity)
        .bind(&listing.unit)
        .bind(listing.category.as_str())
        .bind(listing.expiry_date)
        .bind(&listing.location.address)
        .bind(listing.location.coordinates.map(|c| c.lat))
        .bind(listing.location.coordinates.map(|c| c.lng))
        .bind(&listing.image_url)
        .bind(&listing.pickup_instructions)
        .bind(dietary_info)
        .bind(listing.temperature.map(|t| t.as_str()))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(Some(listing))
    }

    async fn set_status(
        &self,
        id: &str,
        status: ListingStatus,
    ) -> std::result::Result<bool, StoreError> {
        let affected = sqlx::query("UPDATE listings SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn set_status_if(
        &self,
        id: &str,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> std::result::Result<bool, StoreError> {
        // The conditional UPDATE is atomic in SQLite; rows_affected == 1
        // means this caller won the compare-and-set.
        let affected =
            sqlx::query("UPDATE listings SET status = ?3 WHERE id = ?1 AND status = ?2")
                .bind(id)
                .bind(expected.as_str())
                .bind(next.as_str())
                .execute(&self.pool)
                .await
                .map_err(store_err)?
                .rows_affected();
        Ok(affected == 1)
    }

    async fn list(&self) -> std::result::Result<Vec<FoodListing>, StoreError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(FoodListing::try_from).collect()
    }
}

// ─────────────────────────────────────────────────────────
// Reservations
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
struct ReservationRow {
    id: String,
    listing_id: String,
    recipient_id: String,
    recipient_name: String,
    status: String,
    created_at: DateTime<Utc>,
    pickup_time: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StoreError;

    fn try_from(row: ReservationRow) -> std::result::Result<Self, StoreError> {
        let status = ReservationStatus::parse(&row.status)
            .ok_or_else(|| store_err(format!("unknown reservation status: {}", row.status)))?;
        Ok(Reservation {
            id: row.id,
            listing_id: row.listing_id,
            recipient_id: row.recipient_id,
            recipient_name: row.recipient_name,
            status,
            created_at: row.created_at,
            pickup_time: row.pickup_time,
            notes: row.notes,
        })
    }
}

const RESERVATION_COLUMNS: &str =
    "id, listing_id, recipient_id, recipient_name, status, created_at, pickup_time, notes";

/// Reservation half of the SQLite store pair.
#[derive(Clone)]
pub struct SqliteReservations {
    pool: SqlitePool,
}

impl SqliteReservations {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for SqliteReservations {
    async fn get(&self, id: &str) -> std::result::Result<Option<Reservation>, StoreError> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(Reservation::try_from).transpose()
    }

    async fn insert(&self, reservation: &Reservation) -> std::result::Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, listing_id, recipient_id, recipient_name, status, created_at,
                 pickup_time, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.listing_id)
        .bind(&reservation.recipient_id)
        .bind(&reservation.recipient_name)
        .bind(reservation.status.as_str())
        .bind(reservation.created_at)
        .bind(reservation.pickup_time)
        .bind(&reservation.notes)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn set_status_if(
        &self,
        id: &str,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> std::result::Result<bool, StoreError> {
        let affected =
            sqlx::query("UPDATE reservations SET status = ?3 WHERE id = ?1 AND status = ?2")
                .bind(id)
                .bind(expected.as_str())
                .bind(next.as_str())
                .execute(&self.pool)
                .await
                .map_err(store_err)?
                .rows_affected();
        Ok(affected == 1)
    }

    async fn list_by_listing(
        &self,
        listing_id: &str,
    ) -> std::result::Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE listing_id = ?1 \
             ORDER BY created_at DESC"
        ))
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn list_by_recipient(
        &self,
        recipient_id: &str,
    ) -> std::result::Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE recipient_id = ?1 \
             ORDER BY created_at DESC"
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn list_by_donor(
        &self,
        donor_id: &str,
    ) -> std::result::Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT r.id, r.listing_id, r.recipient_id, r.recipient_name, r.status,
                   r.created_at, r.pickup_time, r.notes
            FROM   reservations r
            JOIN   listings l ON l.id = r.listing_id
            WHERE  l.donor_id = ?1
            ORDER  BY r.created_at DESC
            "#,
        )
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn list(&self) -> std::result::Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(Reservation::try_from).collect()
    }
}
