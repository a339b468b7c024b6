use crate::domain::error::DomainError;
use crate::domain::values::booking_time::BookingTime;
use crate::domain::values::location::LocationCategory;
use crate::domain::values::loyalty::LoyaltyTier;
use crate::domain::values::vehicle::VehicleType;
use serde::{Deserialize, Serialize};

/// Immutable description of a single pricing decision request.
///
/// Constructed once at ingress and passed by value through the pipeline.
/// Scenario variants are new copies (`with_riders`, `with_cost`); nothing
/// mutates a context after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub number_of_riders: u32,
    pub number_of_drivers: u32,
    pub location_category: LocationCategory,
    pub customer_loyalty_status: LoyaltyTier,
    pub number_of_past_rides: u32,
    pub average_ratings: f64,
    pub time_of_booking: BookingTime,
    pub vehicle_type: VehicleType,
    /// Expected ride duration in minutes.
    pub expected_ride_duration: f64,
    /// Reference price: what this ride historically cost to serve.
    pub historical_cost_of_ride: f64,
}

impl MarketContext {
    /// Drivers per rider. Zero riders means unlimited supply per rider,
    /// reported as +∞ rather than an error.
    pub fn supply_demand_ratio(&self) -> f64 {
        if self.number_of_riders == 0 {
            f64::INFINITY
        } else {
            self.number_of_drivers as f64 / self.number_of_riders as f64
        }
    }

    /// Copy with a different rider count (demand scenarios).
    pub fn with_riders(&self, number_of_riders: u32) -> Self {
        Self {
            number_of_riders,
            ..self.clone()
        }
    }

    /// Copy with a different historical cost (cost scenarios).
    pub fn with_cost(&self, historical_cost_of_ride: f64) -> Self {
        Self {
            historical_cost_of_ride,
            ..self.clone()
        }
    }

    /// Request-time sanity checks. Rider count zero is allowed (the
    /// supply/demand ratio handles it); ratings and prices are not
    /// open-ended.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(1.0..=5.0).contains(&self.average_ratings) {
            return Err(DomainError::InvalidInput(format!(
                "average_ratings must be in [1, 5], got {}",
                self.average_ratings
            )));
        }
        if self.historical_cost_of_ride <= 0.0 || !self.historical_cost_of_ride.is_finite() {
            return Err(DomainError::InvalidInput(format!(
                "historical_cost_of_ride must be positive, got {}",
                self.historical_cost_of_ride
            )));
        }
        if self.expected_ride_duration <= 0.0 || !self.expected_ride_duration.is_finite() {
            return Err(DomainError::InvalidInput(format!(
                "expected_ride_duration must be positive, got {}",
                self.expected_ride_duration
            )));
        }
        Ok(())
    }

    /// Parse a context from loosely-typed request JSON.
    ///
    /// Numeric fields are required; categorical fields parse leniently so
    /// an unseen value (new vehicle tier, renamed loyalty level) degrades
    /// to a sentinel default with a warning instead of failing the request.
    pub fn from_json(data: &serde_json::Value) -> Result<Self, DomainError> {
        let number_of_riders = data["number_of_riders"]
            .as_u64()
            .ok_or(DomainError::InvalidInput(
                "Missing required field: number_of_riders".into(),
            ))? as u32;
        let number_of_drivers = data["number_of_drivers"]
            .as_u64()
            .ok_or(DomainError::InvalidInput(
                "Missing required field: number_of_drivers".into(),
            ))? as u32;
        let number_of_past_rides = data["number_of_past_rides"].as_u64().unwrap_or(0) as u32;
        let average_ratings = data["average_ratings"].as_f64().unwrap_or(4.0);
        let expected_ride_duration =
            data["expected_ride_duration"]
                .as_f64()
                .ok_or(DomainError::InvalidInput(
                    "Missing required field: expected_ride_duration".into(),
                ))?;
        let historical_cost_of_ride =
            data["historical_cost_of_ride"]
                .as_f64()
                .ok_or(DomainError::InvalidInput(
                    "Missing required field: historical_cost_of_ride".into(),
                ))?;

        Ok(Self {
            number_of_riders,
            number_of_drivers,
            location_category: LocationCategory::parse_lenient(
                data["location_category"].as_str().unwrap_or(""),
            ),
            customer_loyalty_status: LoyaltyTier::parse_lenient(
                data["customer_loyalty_status"].as_str().unwrap_or(""),
            ),
            number_of_past_rides,
            average_ratings,
            time_of_booking: BookingTime::parse_lenient(
                data["time_of_booking"].as_str().unwrap_or(""),
            ),
            vehicle_type: VehicleType::parse_lenient(data["vehicle_type"].as_str().unwrap_or("")),
            expected_ride_duration,
            historical_cost_of_ride,
        })
    }
}
