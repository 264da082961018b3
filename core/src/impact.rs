//! Impact accounting — a read-time projection over completed donations.
//!
//! Never a source of truth: the metrics are recomputed on demand from the
//! set of `completed` reservations joined to their listings, and nothing is
//! ever written back.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{FoodListing, Reservation, ReservationStatus};

/// Conversion factors for the impact projection. The defaults match the
/// figures published on the impact page: 1.2 lbs of food per meal, 2 kg of
/// CO2 and 400 gallons of water saved per pound rescued.
#[derive(Debug, Clone)]
pub struct ImpactConfig {
    /// Pounds per unit for known non-weight units. Unknown units fall back
    /// to [`ImpactConfig::default_unit_weight`].
    pub unit_weights: HashMap<String, f64>,
    /// Pounds assumed per unit when the unit is not in the table.
    pub default_unit_weight: f64,
    /// Pounds of food per meal provided.
    pub lbs_per_meal: f64,
    /// Kilograms of CO2 prevented per pound rescued.
    pub co2_per_lb: f64,
    /// Gallons of water conserved per pound rescued.
    pub water_per_lb: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        let mut unit_weights = HashMap::new();
        unit_weights.insert("lbs".to_string(), 1.0);
        unit_weights.insert("lb".to_string(), 1.0);
        unit_weights.insert("pounds".to_string(), 1.0);
        unit_weights.insert("kg".to_string(), 2.2);
        Self {
            unit_weights,
            default_unit_weight: 1.0,
            lbs_per_meal: 1.2,
            co2_per_lb: 2.0,
            water_per_lb: 400.0,
        }
    }
}

impl ImpactConfig {
    /// Convert a listing quantity to pounds through the unit table.
    pub fn to_weight(&self, quantity: f64, unit: &str) -> f64 {
        let per_unit = self
            .unit_weights
            .get(&unit.to_lowercase())
            .copied()
            .unwrap_or(self.default_unit_weight);
        quantity * per_unit
    }
}

/// Aggregate statistics derived from completed donations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactMetrics {
    /// Count of completed reservations.
    pub total_donations: u64,
    /// Total food rescued, in pounds.
    pub total_weight: f64,
    /// Estimated meals provided.
    pub meals_provided: f64,
    /// Estimated CO2 emissions prevented, in kilograms.
    pub co2_saved: f64,
    /// Estimated water conserved, in gallons.
    pub water_saved: f64,
}

/// Compute impact metrics over the given records.
///
/// Only `completed` reservations count. A reservation whose listing is
/// missing from `listings` is skipped rather than failing the whole
/// projection. Pure — inputs are never mutated.
pub fn compute_impact(
    reservations: &[Reservation],
    listings: &[FoodListing],
    config: &ImpactConfig,
) -> ImpactMetrics {
    let by_id: HashMap<&str, &FoodListing> =
        listings.iter().map(|l| (l.id.as_str(), l)).collect();

    let mut total_donations = 0u64;
    let mut total_weight = 0.0f64;

    for reservation in reservations {
        if reservation.status != ReservationStatus::Completed {
            continue;
        }
        let Some(listing) = by_id.get(reservation.listing_id.as_str()) else {
            continue;
        };
        total_donations += 1;
        total_weight += config.to_weight(listing.quantity, &listing.unit);
    }

    ImpactMetrics {
        total_donations,
        total_weight,
        meals_provided: total_weight / config.lbs_per_meal,
        co2_saved: total_weight * config.co2_per_lb,
        water_saved: total_weight * config.water_per_lb,
    }
}
