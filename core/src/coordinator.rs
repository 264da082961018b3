//! # ReservationCoordinator
//!
//! The state machine tying listings and reservations together. Every
//! transition that leaves a reservation in a non-active state (`completed`,
//! `cancelled`) moves the linked listing out of `reserved` in the same
//! operation — to `available` when the food is back up for grabs, or
//! `completed` when the donation was fulfilled. This pairing is the
//! load-bearing invariant: a listing must never sit in `reserved` with no
//! active reservation, and never carry two active reservations at once.
//!
//! ## Transition table
//!
//! | Event    | Precondition                              | Reservation          | Listing             | Actor     |
//! |----------|-------------------------------------------|----------------------|---------------------|-----------|
//! | Reserve  | listing `available`, not expired          | (none) → `pending`   | `available`→`reserved` | recipient |
//! | Confirm  | reservation `pending`, actor is donor     | `pending`→`confirmed`| unchanged            | donor     |
//! | Decline  | reservation `pending`, actor is donor     | `pending`→`cancelled`| `reserved`→`available` | donor    |
//! | Complete | reservation `confirmed`, actor is recipient | `confirmed`→`completed` | `reserved`→`completed` | recipient |
//! | Cancel   | reservation active, actor is recipient    | → `cancelled`        | `reserved`→`available` | recipient |
//!
//! ## Serialization
//!
//! Reserve's check-then-set runs through the listing store's
//! compare-and-set (`available` → `reserved`); a lost race surfaces as
//! [`CoordinatorError::Conflict`] and no reservation row is ever created for
//! the loser. All other transitions compare-and-set the reservation status
//! first, so a duplicated request fails that CAS and cannot apply the
//! listing side effect twice. When storage fails between the two writes of
//! a pair, the first write is rolled back with a compensating CAS so
//! neither side commits alone.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoordinatorError, Result};
use crate::store::{ListingStore, ReservationStore};
use crate::types::{
    Actor, FoodListing, ListingFilter, ListingStatus, Reservation, ReservationStatus, Role,
};

/// Policy knobs for permission edges the workflow leaves open.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorPolicy {
    /// Whether the donor may mark a confirmed reservation as completed, in
    /// addition to the recipient who made it.
    pub donor_may_complete: bool,
}

impl Default for CoordinatorPolicy {
    fn default() -> Self {
        Self {
            donor_may_complete: false,
        }
    }
}

/// Enforces the joint listing/reservation invariants. Generic over the two
/// store traits so storage can be swapped without touching this logic.
pub struct ReservationCoordinator<L, R> {
    listings: L,
    reservations: R,
    policy: CoordinatorPolicy,
}

impl<L: ListingStore, R: ReservationStore> ReservationCoordinator<L, R> {
    pub fn new(listings: L, reservations: R, policy: CoordinatorPolicy) -> Self {
        Self {
            listings,
            reservations,
            policy,
        }
    }

    /// Reserve an available listing for `actor`.
    ///
    /// The compare-and-set on the listing status is the linearization point:
    /// of two concurrent calls exactly one wins, the other gets
    /// [`CoordinatorError::Conflict`] and leaves no dangling reservation.
    pub async fn reserve(
        &self,
        listing_id: &str,
        actor: &Actor,
        pickup_time: Option<DateTime<Utc>>,
        notes: Option<String>,
    ) -> Result<Reservation> {
        if actor.role != Role::Recipient {
            return Err(CoordinatorError::Forbidden);
        }

        let listing = self
            .listings
            .get(listing_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        if listing.donor_id == actor.id {
            return Err(CoordinatorError::Forbidden);
        }
        if listing.is_expired(Utc::now()) {
            return Err(CoordinatorError::Conflict);
        }

        let won = self
            .listings
            .set_status_if(listing_id, ListingStatus::Available, ListingStatus::Reserved)
            .await?;
        if !won {
            return Err(CoordinatorError::Conflict);
        }

        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            listing_id: listing_id.to_string(),
            recipient_id: actor.id.clone(),
            recipient_name: actor.name.clone(),
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
            pickup_time,
            notes,
        };
        if let Err(err) = self.reservations.insert(&reservation).await {
            // Undo the won CAS so the listing cannot strand in `reserved`
            // with no reservation behind it.
            let _ = self
                .listings
                .set_status_if(listing_id, ListingStatus::Reserved, ListingStatus::Available)
                .await;
            return Err(err.into());
        }

        Ok(reservation)
    }

    /// Drive a reservation to `target`, applying the paired listing update.
    ///
    /// Returns the reservation and listing as they stand after the
    /// transition.
    pub async fn transition(
        &self,
        reservation_id: &str,
        actor: &Actor,
        target: ReservationStatus,
    ) -> Result<(Reservation, FoodListing)> {
        let mut reservation = self
            .reservations
            .get(reservation_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;
        let mut listing = self
            .listings
            .get(&reservation.listing_id)
            .await?
            .ok_or(CoordinatorError::NotFound)?;

        let is_donor = actor.id == listing.donor_id;
        let is_recipient = actor.id == reservation.recipient_id;

        match target {
            // No transition returns to pending.
            ReservationStatus::Pending => return Err(CoordinatorError::InvalidState),

            ReservationStatus::Confirmed => {
                if !is_donor {
                    return Err(CoordinatorError::Forbidden);
                }
                self.apply(
                    &mut reservation,
                    ReservationStatus::Pending,
                    ReservationStatus::Confirmed,
                )
                .await?;
                // Listing stays reserved.
            }

            ReservationStatus::Cancelled => {
                let from = if is_donor {
                    // Donor decline: only a pending reservation can be turned
                    // down.
                    ReservationStatus::Pending
                } else if is_recipient {
                    // Recipient cancel: any active reservation.
                    reservation.status
                } else {
                    return Err(CoordinatorError::Forbidden);
                };
                if !from.is_active() {
                    return Err(CoordinatorError::InvalidState);
                }
                self.apply(&mut reservation, from, ReservationStatus::Cancelled)
                    .await?;
                if let Err(err) = self
                    .release_listing(&mut listing, ListingStatus::Available)
                    .await
                {
                    self.unwind(&mut reservation, from).await;
                    return Err(err);
                }
            }

            ReservationStatus::Completed => {
                let allowed = is_recipient || (self.policy.donor_may_complete && is_donor);
                if !allowed {
                    return Err(CoordinatorError::Forbidden);
                }
                self.apply(
                    &mut reservation,
                    ReservationStatus::Confirmed,
                    ReservationStatus::Completed,
                )
                .await?;
                if let Err(err) = self
                    .release_listing(&mut listing, ListingStatus::Completed)
                    .await
                {
                    self.unwind(&mut reservation, ReservationStatus::Confirmed)
                        .await;
                    return Err(err);
                }
            }
        }

        Ok((reservation, listing))
    }

    /// Compare-and-set the reservation status and mirror it on the local
    /// copy. A failed CAS means the reservation was not in `from` — either
    /// the precondition never held or a duplicate request already applied
    /// the transition.
    async fn apply(
        &self,
        reservation: &mut Reservation,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<()> {
        let applied = self
            .reservations
            .set_status_if(&reservation.id, from, to)
            .await?;
        if !applied {
            return Err(CoordinatorError::InvalidState);
        }
        reservation.status = to;
        Ok(())
    }

    /// Best-effort reversal of a reservation CAS whose paired listing write
    /// failed. The storage error that triggered the unwind is what the
    /// caller reports; a rollback failure must not mask it.
    async fn unwind(&self, reservation: &mut Reservation, to: ReservationStatus) {
        if let Ok(true) = self
            .reservations
            .set_status_if(&reservation.id, reservation.status, to)
            .await
        {
            reservation.status = to;
        }
    }

    /// Move the listing out of `reserved` as the paired side of a terminal
    /// reservation transition. The reservation CAS already serialized us, so
    /// this write is unconditional.
    async fn release_listing(
        &self,
        listing: &mut FoodListing,
        to: ListingStatus,
    ) -> Result<()> {
        self.listings.set_status(&listing.id, to).await?;
        listing.status = to;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Read side
    // ─────────────────────────────────────────────────────────

    /// Listings open for reservation: `available`, unexpired, matching the
    /// filter, newest first.
    pub async fn available_listings(&self, filter: &ListingFilter) -> Result<Vec<FoodListing>> {
        let now = Utc::now();
        let mut listings: Vec<FoodListing> = self
            .listings
            .list()
            .await?
            .into_iter()
            .filter(|l| {
                l.status == ListingStatus::Available && !l.is_expired(now) && filter.matches(l)
            })
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    /// The reservations relevant to `actor`: their own claims for a
    /// recipient, claims against their listings for a donor. Newest first.
    pub async fn reservations_for(&self, actor: &Actor) -> Result<Vec<Reservation>> {
        let mut reservations = match actor.role {
            Role::Recipient => self.reservations.list_by_recipient(&actor.id).await?,
            Role::Donor => self.reservations.list_by_donor(&actor.id).await?,
        };
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    pub fn listings(&self) -> &L {
        &self.listings
    }

    pub fn reservations(&self) -> &R {
        &self.reservations
    }
}
