//! Shared test helpers.

use farecraft::domain::entities::market_context::MarketContext;
use farecraft::domain::values::booking_time::BookingTime;
use farecraft::domain::values::location::LocationCategory;
use farecraft::domain::values::loyalty::LoyaltyTier;
use farecraft::domain::values::vehicle::VehicleType;
use farecraft::infrastructure::factors::NoopFactorProvider;
use farecraft::infrastructure::rules::StaticRuleSource;
use farecraft::infrastructure::store::builtin::BuiltinModelStore;
use farecraft::FareCraft;
use std::sync::Arc;

pub fn setup() -> FareCraft {
    FareCraft::with_providers(
        ":memory:",
        Arc::new(BuiltinModelStore),
        Arc::new(StaticRuleSource::default()),
        Arc::new(NoopFactorProvider),
        "gradient_boost",
    )
    .unwrap()
}

/// Urban evening premium ride with a Gold customer; demand outstrips
/// supply two to one.
pub fn busy_evening_context() -> MarketContext {
    MarketContext {
        number_of_riders: 60,
        number_of_drivers: 30,
        location_category: LocationCategory::Urban,
        customer_loyalty_status: LoyaltyTier::Gold,
        number_of_past_rides: 12,
        average_ratings: 4.3,
        time_of_booking: BookingTime::Evening,
        vehicle_type: VehicleType::Premium,
        expected_ride_duration: 30.0,
        historical_cost_of_ride: 35.0,
    }
}

/// Quiet suburban afternoon economy ride, supply-heavy market.
pub fn quiet_afternoon_context() -> MarketContext {
    MarketContext {
        number_of_riders: 15,
        number_of_drivers: 40,
        location_category: LocationCategory::Suburban,
        customer_loyalty_status: LoyaltyTier::Bronze,
        number_of_past_rides: 2,
        average_ratings: 3.9,
        time_of_booking: BookingTime::Afternoon,
        vehicle_type: VehicleType::Economy,
        expected_ride_duration: 18.0,
        historical_cost_of_ride: 22.0,
    }
}
