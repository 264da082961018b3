use chrono::{Duration, Utc};

use crate::impact::{compute_impact, ImpactConfig};
use crate::types::{
    FoodCategory, FoodListing, ListingStatus, Location, Reservation, ReservationStatus,
};

fn listing(id: &str, quantity: f64, unit: &str) -> FoodListing {
    FoodListing {
        id: id.to_string(),
        title: "Donation".to_string(),
        description: String::new(),
        quantity,
        unit: unit.to_string(),
        category: FoodCategory::Other,
        expiry_date: Utc::now() + Duration::days(1),
        created_at: Utc::now(),
        status: ListingStatus::Completed,
        donor_id: "d1".to_string(),
        donor_name: "Donor d1".to_string(),
        location: Location {
            address: "1 Main St".to_string(),
            coordinates: None,
        },
        image_url: None,
        pickup_instructions: None,
        dietary_info: None,
        temperature: None,
    }
}

fn reservation(id: &str, listing_id: &str, status: ReservationStatus) -> Reservation {
    Reservation {
        id: id.to_string(),
        listing_id: listing_id.to_string(),
        recipient_id: "r1".to_string(),
        recipient_name: "Recipient r1".to_string(),
        status,
        created_at: Utc::now(),
        pickup_time: None,
        notes: None,
    }
}

#[test]
fn only_completed_reservations_count() {
    let listings = vec![listing("l1", 12.0, "lbs"), listing("l2", 100.0, "lbs")];
    let reservations = vec![
        reservation("r1", "l1", ReservationStatus::Completed),
        reservation("r2", "l2", ReservationStatus::Pending),
        reservation("r3", "l2", ReservationStatus::Cancelled),
    ];

    let metrics = compute_impact(&reservations, &listings, &ImpactConfig::default());
    assert_eq!(metrics.total_donations, 1);
    assert_eq!(metrics.total_weight, 12.0);
}

#[test]
fn derived_metrics_use_documented_constants() {
    // 12 lbs rescued: 10 meals, 24 kg CO2, 4800 gallons of water.
    let listings = vec![listing("l1", 12.0, "lbs")];
    let reservations = vec![reservation("r1", "l1", ReservationStatus::Completed)];

    let metrics = compute_impact(&reservations, &listings, &ImpactConfig::default());
    assert_eq!(metrics.total_weight, 12.0);
    assert!((metrics.meals_provided - 10.0).abs() < 1e-9);
    assert!((metrics.co2_saved - 24.0).abs() < 1e-9);
    assert!((metrics.water_saved - 4800.0).abs() < 1e-9);
}

#[test]
fn unknown_units_default_to_one_pound_each() {
    let listings = vec![listing("l1", 30.0, "meals"), listing("l2", 5.0, "kg")];
    let reservations = vec![
        reservation("r1", "l1", ReservationStatus::Completed),
        reservation("r2", "l2", ReservationStatus::Completed),
    ];

    let metrics = compute_impact(&reservations, &listings, &ImpactConfig::default());
    assert_eq!(metrics.total_donations, 2);
    // 30 meals at the 1 lb/unit fallback + 5 kg at 2.2 lb/kg.
    assert!((metrics.total_weight - 41.0).abs() < 1e-9);
}

#[test]
fn missing_listing_reference_is_skipped() {
    let listings = vec![listing("l1", 12.0, "lbs")];
    let reservations = vec![
        reservation("r1", "l1", ReservationStatus::Completed),
        reservation("r2", "ghost", ReservationStatus::Completed),
    ];

    let metrics = compute_impact(&reservations, &listings, &ImpactConfig::default());
    assert_eq!(metrics.total_donations, 1);
    assert_eq!(metrics.total_weight, 12.0);
}

#[test]
fn empty_input_yields_zero_metrics() {
    let metrics = compute_impact(&[], &[], &ImpactConfig::default());
    assert_eq!(metrics.total_donations, 0);
    assert_eq!(metrics.total_weight, 0.0);
    assert_eq!(metrics.meals_provided, 0.0);
    assert_eq!(metrics.co2_saved, 0.0);
    assert_eq!(metrics.water_saved, 0.0);
}

#[test]
fn conversion_factors_are_configurable() {
    let config = ImpactConfig {
        lbs_per_meal: 2.0,
        co2_per_lb: 1.0,
        water_per_lb: 100.0,
        ..ImpactConfig::default()
    };
    let listings = vec![listing("l1", 10.0, "lbs")];
    let reservations = vec![reservation("r1", "l1", ReservationStatus::Completed)];

    let metrics = compute_impact(&reservations, &listings, &config);
    assert!((metrics.meals_provided - 5.0).abs() < 1e-9);
    assert!((metrics.co2_saved - 10.0).abs() < 1e-9);
    assert!((metrics.water_saved - 1000.0).abs() < 1e-9);
}
