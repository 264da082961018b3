//! # Good2Give Domain Core
//!
//! This crate holds the reservation lifecycle of the Good2Give food-donation
//! marketplace: donors post surplus-food listings, recipients claim them,
//! and a claim moves through an approval workflow while the listing's
//! availability stays consistent with it.
//!
//! | Concern       | Module                                         |
//! |---------------|------------------------------------------------|
//! | Entities      | [`types`]                                      |
//! | Storage seam  | [`store`] (traits + in-memory implementation)  |
//! | State machine | [`coordinator`]                                |
//! | Impact math   | [`impact`]                                     |
//! | Errors        | [`error`]                                      |
//!
//! ## Architecture
//!
//! All invariant enforcement lives in
//! [`coordinator::ReservationCoordinator`]; the stores are deliberately
//! dumb record access so a relational backend can implement the same traits
//! (the REST service does, over SQLite) without duplicating any workflow
//! logic. The impact projection is a pure function over completed records
//! and never writes back.

pub mod coordinator;
pub mod error;
pub mod impact;
pub mod store;
pub mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_impact;

pub use coordinator::{CoordinatorPolicy, ReservationCoordinator};
pub use error::{CoordinatorError, StoreError};
pub use impact::{compute_impact, ImpactConfig, ImpactMetrics};
pub use store::{
    memory_stores, ListingStore, MemoryListings, MemoryReservations, ReservationStore,
};
pub use types::{
    Actor, Coordinates, FoodCategory, FoodListing, ListingDisplayStatus, ListingFilter,
    ListingStatus, ListingUpdate, Location, NewListing, Reservation, ReservationStatus, Role,
    Temperature,
};
