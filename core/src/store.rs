//! # Store abstractions
//!
//! The coordinator owns no data; it works through these two traits so the
//! backing storage can be swapped (in-memory for tests and embedding, a
//! relational pool in the service) without touching the state-machine logic.
//!
//! Stores perform **no cross-entity validation** — `set_status` and
//! `set_status_if` are plain writes. Invariant enforcement is entirely the
//! coordinator's job; the only contract a backend must honour is that
//! `set_status_if` is an atomic compare-and-set on the status column.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{
    FoodListing, ListingStatus, ListingUpdate, Reservation, ReservationStatus,
};

/// Access to food-listing records.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<FoodListing>, StoreError>;

    async fn insert(&self, listing: &FoodListing) -> Result<(), StoreError>;

    /// Apply a partial update to the non-status fields. Returns the updated
    /// record, or `None` if the listing does not exist.
    async fn update_fields(
        &self,
        id: &str,
        update: &ListingUpdate,
    ) -> Result<Option<FoodListing>, StoreError>;

    /// Unconditional status write. Returns `false` if the listing does not
    /// exist.
    async fn set_status(&self, id: &str, status: ListingStatus) -> Result<bool, StoreError>;

    /// Atomic compare-and-set: write `next` only if the current status is
    /// `expected`. Returns whether the write happened. This is the
    /// serialization primitive guarding against double-booking.
    async fn set_status_if(
        &self,
        id: &str,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<FoodListing>, StoreError>;
}

/// Access to reservation records.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Reservation>, StoreError>;

    async fn insert(&self, reservation: &Reservation) -> Result<(), StoreError>;

    /// Atomic compare-and-set on the reservation status. A duplicate request
    /// loses this CAS, which is what keeps transitions idempotent-safe.
    async fn set_status_if(
        &self,
        id: &str,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<bool, StoreError>;

    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Reservation>, StoreError>;

    async fn list_by_recipient(&self, recipient_id: &str) -> Result<Vec<Reservation>, StoreError>;

    /// Reservations made against listings owned by the given donor.
    async fn list_by_donor(&self, donor_id: &str) -> Result<Vec<Reservation>, StoreError>;

    async fn list(&self) -> Result<Vec<Reservation>, StoreError>;
}

// ─────────────────────────────────────────────────────────
// In-memory implementation
// ─────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryInner {
    listings: HashMap<String, FoodListing>,
    reservations: HashMap<String, Reservation>,
}

/// Listing half of the in-memory store pair. Cheap to clone; clones share
/// the same tables.
#[derive(Clone)]
pub struct MemoryListings {
    inner: Arc<Mutex<MemoryInner>>,
}

/// Reservation half of the in-memory store pair. Shares tables with its
/// [`MemoryListings`] sibling so the `list_by_donor` join stays consistent.
#[derive(Clone)]
pub struct MemoryReservations {
    inner: Arc<Mutex<MemoryInner>>,
}

/// Build a linked pair of in-memory stores over one shared table set.
pub fn memory_stores() -> (MemoryListings, MemoryReservations) {
    let inner = Arc::new(Mutex::new(MemoryInner::default()));
    (
        MemoryListings {
            inner: inner.clone(),
        },
        MemoryReservations { inner },
    )
}

// Poisoning carries no meaning for these plain maps; recover the guard
// instead of propagating a panic from an unrelated thread.
fn locked(inner: &Mutex<MemoryInner>) -> MutexGuard<'_, MemoryInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ListingStore for MemoryListings {
    async fn get(&self, id: &str) -> Result<Option<FoodListing>, StoreError> {
        let inner = locked(&self.inner);
        Ok(inner.listings.get(id).cloned())
    }

    async fn insert(&self, listing: &FoodListing) -> Result<(), StoreError> {
        let mut inner = locked(&self.inner);
        inner.listings.insert(listing.id.clone(), listing.clone());
        Ok(())
    }

    async fn update_fields(
        &self,
        id: &str,
        update: &ListingUpdate,
    ) -> Result<Option<FoodListing>, StoreError> {
        let mut inner = locked(&self.inner);
        Ok(inner.listings.get_mut(id).map(|listing| {
            update.apply(listing);
            listing.clone()
        }))
    }

    async fn set_status(&self, id: &str, status: ListingStatus) -> Result<bool, StoreError> {
        let mut inner = locked(&self.inner);
        match inner.listings.get_mut(id) {
            Some(listing) => {
                listing.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_status_if(
        &self,
        id: &str,
        expected: ListingStatus,
        next: ListingStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = locked(&self.inner);
        match inner.listings.get_mut(id) {
            Some(listing) if listing.status == expected => {
                listing.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<FoodListing>, StoreError> {
        let inner = locked(&self.inner);
        Ok(inner.listings.values().cloned().collect())
    }
}

#[async_trait]
impl ReservationStore for MemoryReservations {
    async fn get(&self, id: &str) -> Result<Option<Reservation>, StoreError> {
        let inner = locked(&self.inner);
        Ok(inner.reservations.get(id).cloned())
    }

    async fn insert(&self, reservation: &Reservation) -> Result<(), StoreError> {
        let mut inner = locked(&self.inner);
        inner
            .reservations
            .insert(reservation.id.clone(), reservation.clone());
        Ok(())
    }

    async fn set_status_if(
        &self,
        id: &str,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = locked(&self.inner);
        match inner.reservations.get_mut(id) {
            Some(reservation) if reservation.status == expected => {
                reservation.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Reservation>, StoreError> {
        let inner = locked(&self.inner);
        Ok(inner
            .reservations
            .values()
            .filter(|r| r.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn list_by_recipient(&self, recipient_id: &str) -> Result<Vec<Reservation>, StoreError> {
        let inner = locked(&self.inner);
        Ok(inner
            .reservations
            .values()
            .filter(|r| r.recipient_id == recipient_id)
            .cloned()
            .collect())
    }

    async fn list_by_donor(&self, donor_id: &str) -> Result<Vec<Reservation>, StoreError> {
        let inner = locked(&self.inner);
        Ok(inner
            .reservations
            .values()
            .filter(|r| {
                inner
                    .listings
                    .get(&r.listing_id)
                    .is_some_and(|l| l.donor_id == donor_id)
            })
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<Reservation>, StoreError> {
        let inner = locked(&self.inner);
        Ok(inner.reservations.values().cloned().collect())
    }
}
