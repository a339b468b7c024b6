//! Built-in model artifacts.
//!
//! Fitted defaults compiled into the binary so the engine works out of
//! the box with no model directory configured. The segment model covers
//! six market segments observed in historical ride data; the demand
//! models are the default gradient-boost and linear artifacts.

use crate::domain::entities::segment::{SegmentCharacteristics, SegmentModel};
use crate::domain::error::DomainError;
use crate::domain::ports::demand_model::DemandModel;
use crate::domain::ports::model_store::ModelStore;
use crate::domain::values::booking_time::BookingTime;
use crate::domain::values::location::LocationCategory;
use crate::domain::values::vehicle::VehicleType;
use crate::infrastructure::models::gradient_boost::{self, GradientBoostModel};
use crate::infrastructure::models::linear::{self, LinearDemandModel};
use std::sync::Arc;

#[derive(Default)]
pub struct BuiltinModelStore;

impl ModelStore for BuiltinModelStore {
    fn load_segment_model(&self) -> Result<SegmentModel, DomainError> {
        Ok(default_segment_model())
    }

    fn load_demand_models(&self) -> Result<Vec<Arc<dyn DemandModel>>, DomainError> {
        Ok(vec![
            Arc::new(GradientBoostModel::new(gradient_boost::default_artifact())?),
            Arc::new(LinearDemandModel::new(linear::default_artifact())?),
        ])
    }
}

/// Six-cluster segment model fitted on historical ride data. Centroids
/// live in standardized (ratio, time, location, vehicle) space.
pub fn default_segment_model() -> SegmentModel {
    SegmentModel {
        k: 6,
        feature_means: [1.0, 1.5, 0.6, 0.35],
        feature_stds: [0.8, 1.1, 0.75, 0.48],
        centroids: vec![
            [-0.75, 0.45, -0.80, 1.35],
            [-0.75, -1.36, -0.80, -0.73],
            [0.00, -0.45, -0.80, -0.73],
            [0.60, 1.36, 0.53, -0.73],
            [-0.30, 0.45, 0.53, 1.35],
            [1.60, -0.45, 1.87, -0.73],
        ],
        labels: vec![
            "Urban_Peak_Premium".to_string(),
            "Urban_Peak_Economy".to_string(),
            "Urban_Standard_Economy".to_string(),
            "Suburban_Standard_Economy".to_string(),
            "Suburban_Peak_Premium".to_string(),
            "Rural_Standard_Economy".to_string(),
        ],
        characteristics: vec![
            SegmentCharacteristics {
                size: 120,
                avg_supply_demand_ratio: 0.40,
                avg_historical_cost: 42.0,
                dominant_location: LocationCategory::Urban,
                dominant_time: BookingTime::Evening,
                dominant_vehicle: VehicleType::Premium,
            },
            SegmentCharacteristics {
                size: 260,
                avg_supply_demand_ratio: 0.45,
                avg_historical_cost: 28.0,
                dominant_location: LocationCategory::Urban,
                dominant_time: BookingTime::Morning,
                dominant_vehicle: VehicleType::Economy,
            },
            SegmentCharacteristics {
                size: 310,
                avg_supply_demand_ratio: 0.90,
                avg_historical_cost: 25.0,
                dominant_location: LocationCategory::Urban,
                dominant_time: BookingTime::Afternoon,
                dominant_vehicle: VehicleType::Economy,
            },
            SegmentCharacteristics {
                size: 180,
                avg_supply_demand_ratio: 1.40,
                avg_historical_cost: 30.0,
                dominant_location: LocationCategory::Suburban,
                dominant_time: BookingTime::Night,
                dominant_vehicle: VehicleType::Economy,
            },
            SegmentCharacteristics {
                size: 90,
                avg_supply_demand_ratio: 0.70,
                avg_historical_cost: 48.0,
                dominant_location: LocationCategory::Suburban,
                dominant_time: BookingTime::Evening,
                dominant_vehicle: VehicleType::Premium,
            },
            SegmentCharacteristics {
                size: 60,
                avg_supply_demand_ratio: 2.30,
                avg_historical_cost: 36.0,
                dominant_location: LocationCategory::Rural,
                dominant_time: BookingTime::Afternoon,
                dominant_vehicle: VehicleType::Economy,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_segment_model_is_consistent() {
        let model = default_segment_model();
        assert_eq!(model.k, 6);
        assert_eq!(model.centroids.len(), model.k);
        assert_eq!(model.labels.len(), model.k);
        assert_eq!(model.characteristics.len(), model.k);
        assert!(model.feature_stds.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn test_builtin_store_ships_two_models() {
        let store = BuiltinModelStore;
        let models = store.load_demand_models().unwrap();
        assert_eq!(models.len(), 2);
        let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
        assert!(names.contains(&"gradient_boost"));
        assert!(names.contains(&"linear"));
    }
}
