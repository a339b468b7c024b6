use farecraft::domain::entities::market_context::MarketContext;
use farecraft::domain::ports::model_store::ModelStore;
use farecraft::domain::values::booking_time::BookingTime;
use farecraft::domain::values::location::LocationCategory;
use farecraft::domain::values::loyalty::LoyaltyTier;
use farecraft::domain::values::vehicle::VehicleType;
use farecraft::infrastructure::store::json_store::JsonModelStore;
use farecraft::FareCraft;

fn row(
    riders: u32,
    drivers: u32,
    location: LocationCategory,
    time: BookingTime,
    vehicle: VehicleType,
    cost: f64,
) -> MarketContext {
    MarketContext {
        number_of_riders: riders,
        number_of_drivers: drivers,
        location_category: location,
        customer_loyalty_status: LoyaltyTier::Silver,
        number_of_past_rides: 8,
        average_ratings: 4.1,
        time_of_booking: time,
        vehicle_type: vehicle,
        expected_ride_duration: 25.0,
        historical_cost_of_ride: cost,
    }
}

fn history() -> Vec<MarketContext> {
    let mut rows = Vec::new();
    for i in 0..30 {
        rows.push(row(
            80 + i,
            20,
            LocationCategory::Urban,
            BookingTime::Evening,
            VehicleType::Premium,
            40.0,
        ));
        rows.push(row(
            15,
            60 + i,
            LocationCategory::Rural,
            BookingTime::Afternoon,
            VehicleType::Economy,
            28.0,
        ));
    }
    rows
}

#[test]
fn fitted_model_is_persisted_and_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();

    let model = FareCraft::fit_segments(&history(), 2, out).unwrap();
    assert_eq!(model.k, 2);
    assert!(model.labels.contains(&"Urban_Peak_Premium".to_string()));
    assert!(model.labels.contains(&"Rural_Standard_Economy".to_string()));

    let loaded = JsonModelStore::new(out).load_segment_model().unwrap();
    assert_eq!(loaded.centroids, model.centroids);
    assert_eq!(loaded.labels, model.labels);
}

#[test]
fn cluster_characteristics_reflect_their_members() {
    let dir = tempfile::tempdir().unwrap();
    let model =
        FareCraft::fit_segments(&history(), 2, dir.path().to_str().unwrap()).unwrap();

    let urban = model
        .labels
        .iter()
        .position(|l| l == "Urban_Peak_Premium")
        .unwrap();
    let rural = 1 - urban;

    assert_eq!(model.characteristics[urban].size, 30);
    assert_eq!(model.characteristics[rural].size, 30);
    // Riders outnumber drivers in the urban group, so its ratio is lower.
    assert!(
        model.characteristics[urban].avg_supply_demand_ratio
            < model.characteristics[rural].avg_supply_demand_ratio
    );
    assert!((model.characteristics[urban].avg_historical_cost - 40.0).abs() < 1e-9);
}

#[test]
fn too_few_rows_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let rows = history();
    let result = FareCraft::fit_segments(&rows[..3], 6, dir.path().to_str().unwrap());
    assert!(result.is_err());
}
