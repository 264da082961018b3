//! # Types
//!
//! Shared data structures used across the Good2Give domain core.
//!
//! ## Design decisions
//!
//! ### Status as a Finite-State Machine
//!
//! [`ReservationStatus`] enforces a strict forward-only lifecycle:
//!
//! ```text
//! Pending ──► Confirmed ──► Completed
//!     │            │
//!     └──► Cancelled ◄┘
//! ```
//!
//! Backward transitions and transitions out of terminal states (`Completed`,
//! `Cancelled`) are rejected by the coordinator.
//!
//! ### Derived `expired` display state
//!
//! A listing's persisted status is only ever `available | reserved |
//! completed`. The `expired` state shown to users is computed at read time by
//! comparing the expiry timestamp against the current clock
//! ([`FoodListing::display_status`]); it is never written to storage, so no
//! background sweep is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Posts surplus-food listings.
    Donor,
    /// Browses and reserves listings.
    Recipient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Recipient => "recipient",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donor" => Some(Self::Donor),
            "recipient" => Some(Self::Recipient),
            _ => None,
        }
    }
}

/// The identity the session layer resolves for every coordinator call.
///
/// The coordinator trusts this completely; credential validation happens
/// upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub name: String,
}

/// Persisted lifecycle status of a food listing.
///
/// `expired` is deliberately absent — see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Open for reservation.
    Available,
    /// Held by exactly one active reservation.
    Reserved,
    /// Picked up; donation fulfilled.
    Completed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "reserved" => Some(Self::Reserved),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Listing status as shown to users, including the derived `expired` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingDisplayStatus {
    Available,
    Reserved,
    Completed,
    Expired,
}

/// Approval-workflow status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Awaiting the donor's decision.
    Pending,
    /// Approved by the donor; pickup pending.
    Confirmed,
    /// Picked up. Terminal.
    Completed,
    /// Declined by the donor or withdrawn by the recipient. Terminal.
    Cancelled,
}

impl ReservationStatus {
    /// `pending` and `confirmed` reservations hold their listing in
    /// `reserved`.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Category of the food being donated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodCategory {
    #[serde(rename = "produce")]
    Produce,
    #[serde(rename = "bakery")]
    Bakery,
    #[serde(rename = "dairy")]
    Dairy,
    #[serde(rename = "meat")]
    Meat,
    #[serde(rename = "prepared meals")]
    PreparedMeals,
    #[serde(rename = "canned goods")]
    CannedGoods,
    #[serde(rename = "beverages")]
    Beverages,
    #[serde(rename = "other")]
    Other,
}

impl FoodCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "produce",
            Self::Bakery => "bakery",
            Self::Dairy => "dairy",
            Self::Meat => "meat",
            Self::PreparedMeals => "prepared meals",
            Self::CannedGoods => "canned goods",
            Self::Beverages => "beverages",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "produce" => Some(Self::Produce),
            "bakery" => Some(Self::Bakery),
            "dairy" => Some(Self::Dairy),
            "meat" => Some(Self::Meat),
            "prepared meals" => Some(Self::PreparedMeals),
            "canned goods" => Some(Self::CannedGoods),
            "beverages" => Some(Self::Beverages),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Required storage temperature for the food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperature {
    #[serde(rename = "frozen")]
    Frozen,
    #[serde(rename = "refrigerated")]
    Refrigerated,
    #[serde(rename = "room temperature")]
    RoomTemperature,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::Refrigerated => "refrigerated",
            Self::RoomTemperature => "room temperature",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "frozen" => Some(Self::Frozen),
            "refrigerated" => Some(Self::Refrigerated),
            "room temperature" => Some(Self::RoomTemperature),
            _ => None,
        }
    }
}

/// Geographic coordinates of a pickup location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Where the food is picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// A donor's posted surplus-food offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub category: FoodCategory,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: ListingStatus,
    pub donor_id: String,
    pub donor_name: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_info: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
}

impl FoodListing {
    /// True once the expiry timestamp has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }

    /// The status users see: `expired` overlays an `available` listing whose
    /// expiry has passed. Never persisted.
    pub fn display_status(&self, now: DateTime<Utc>) -> ListingDisplayStatus {
        match self.status {
            ListingStatus::Available if self.is_expired(now) => ListingDisplayStatus::Expired,
            ListingStatus::Available => ListingDisplayStatus::Available,
            ListingStatus::Reserved => ListingDisplayStatus::Reserved,
            ListingStatus::Completed => ListingDisplayStatus::Completed,
        }
    }
}

/// Fields a donor supplies when posting a listing. Identity, status, and
/// timestamps are stamped by the caller-side create path.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub category: FoodCategory,
    pub expiry_date: DateTime<Utc>,
    pub location: Location,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub pickup_instructions: Option<String>,
    #[serde(default)]
    pub dietary_info: Option<Vec<String>>,
    #[serde(default)]
    pub temperature: Option<Temperature>,
}

impl NewListing {
    /// Materialise a full listing for the given donor: fresh id, `available`
    /// status, creation time stamped now.
    pub fn into_listing(self, donor: &Actor, now: DateTime<Utc>) -> FoodListing {
        FoodListing {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            category: self.category,
            expiry_date: self.expiry_date,
            created_at: now,
            status: ListingStatus::Available,
            donor_id: donor.id.clone(),
            donor_name: donor.name.clone(),
            location: self.location,
            image_url: self.image_url,
            pickup_instructions: self.pickup_instructions,
            dietary_info: self.dietary_info,
            temperature: self.temperature,
        }
    }
}

/// Partial update of a listing's non-status fields. Ownership is enforced by
/// the caller; the store applies whatever is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<FoodCategory>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub pickup_instructions: Option<String>,
    #[serde(default)]
    pub dietary_info: Option<Vec<String>>,
    #[serde(default)]
    pub temperature: Option<Temperature>,
}

impl ListingUpdate {
    /// Apply the present fields to `listing` in place. Status and ownership
    /// fields are untouchable through this path.
    pub fn apply(&self, listing: &mut FoodListing) {
        if let Some(v) = &self.title {
            listing.title = v.clone();
        }
        if let Some(v) = &self.description {
            listing.description = v.clone();
        }
        if let Some(v) = self.quantity {
            listing.quantity = v;
        }
        if let Some(v) = &self.unit {
            listing.unit = v.clone();
        }
        if let Some(v) = self.category {
            listing.category = v;
        }
        if let Some(v) = self.expiry_date {
            listing.expiry_date = v;
        }
        if let Some(v) = &self.location {
            listing.location = v.clone();
        }
        if let Some(v) = &self.image_url {
            listing.image_url = Some(v.clone());
        }
        if let Some(v) = &self.pickup_instructions {
            listing.pickup_instructions = Some(v.clone());
        }
        if let Some(v) = &self.dietary_info {
            listing.dietary_info = Some(v.clone());
        }
        if let Some(v) = self.temperature {
            listing.temperature = Some(v);
        }
    }
}

/// A recipient's claim against a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub listing_id: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Filter for browsing available listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    /// Restrict to one category.
    #[serde(default)]
    pub category: Option<FoodCategory>,
    /// Case-insensitive substring match over title and description.
    #[serde(default)]
    pub search: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &FoodListing) -> bool {
        if let Some(category) = self.category {
            if listing.category != category {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !listing.title.to_lowercase().contains(&term)
                && !listing.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}
