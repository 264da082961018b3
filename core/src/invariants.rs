#![allow(dead_code)]

use crate::types::{FoodListing, ListingStatus, Reservation, ReservationStatus};

/// INV-1: at most one active (`pending`/`confirmed`) reservation may
/// reference a listing, and exactly one iff the listing is `reserved`.
pub fn assert_single_active_reservation(listing: &FoodListing, reservations: &[Reservation]) {
    let active = reservations
        .iter()
        .filter(|r| r.listing_id == listing.id && r.status.is_active())
        .count();

    assert!(
        active <= 1,
        "INV-1 violated: listing {} has {} active reservations",
        listing.id,
        active
    );
    assert_eq!(
        active == 1,
        listing.status == ListingStatus::Reserved,
        "INV-1 violated: listing {} is {:?} with {} active reservations",
        listing.id,
        listing.status,
        active
    );
}

/// INV-2: a listing in `available` status has zero active reservations
/// referencing it.
pub fn assert_available_has_no_active(listing: &FoodListing, reservations: &[Reservation]) {
    if listing.status == ListingStatus::Available {
        let active = reservations
            .iter()
            .filter(|r| r.listing_id == listing.id && r.status.is_active())
            .count();
        assert_eq!(
            active, 0,
            "INV-2 violated: available listing {} has {} active reservations",
            listing.id, active
        );
    }
}

/// INV-3: reservation status transition validity. Only forward transitions
/// are allowed:
///   Pending   -> Confirmed | Cancelled
///   Confirmed -> Completed | Cancelled
///   Completed -> (none)
///   Cancelled -> (none)
pub fn assert_valid_reservation_transition(from: &ReservationStatus, to: &ReservationStatus) {
    let valid = matches!(
        (from, to),
        (ReservationStatus::Pending, ReservationStatus::Confirmed)
            | (ReservationStatus::Pending, ReservationStatus::Cancelled)
            | (ReservationStatus::Confirmed, ReservationStatus::Completed)
            | (ReservationStatus::Confirmed, ReservationStatus::Cancelled)
    );

    assert!(
        valid,
        "INV-3 violated: invalid reservation transition from {:?} to {:?}",
        from, to
    );
}

/// INV-4: a terminal reservation must leave its listing out of `reserved` —
/// `completed` pairs with a `completed` listing, `cancelled` with an
/// `available` one.
pub fn assert_paired_terminal_state(reservation: &Reservation, listing: &FoodListing) {
    match reservation.status {
        ReservationStatus::Completed => assert_eq!(
            listing.status,
            ListingStatus::Completed,
            "INV-4 violated: completed reservation {} but listing {} is {:?}",
            reservation.id,
            listing.id,
            listing.status
        ),
        ReservationStatus::Cancelled => assert_ne!(
            listing.status,
            ListingStatus::Reserved,
            "INV-4 violated: cancelled reservation {} left listing {} reserved",
            reservation.id,
            listing.id
        ),
        _ => {}
    }
}

/// INV-5: listing quantity must always be positive.
pub fn assert_quantity_positive(listing: &FoodListing) {
    assert!(
        listing.quantity > 0.0,
        "INV-5 violated: listing {} has non-positive quantity ({})",
        listing.id,
        listing.quantity
    );
}

/// Run all per-listing invariants against the full reservation set.
pub fn assert_all_listing_invariants(listing: &FoodListing, reservations: &[Reservation]) {
    assert_single_active_reservation(listing, reservations);
    assert_available_has_no_active(listing, reservations);
    assert_quantity_positive(listing);
}
