//! Log-linear demand model with signed, interpretable coefficients.

use super::{price_response, sigmoid};
use crate::domain::error::DomainError;
use crate::domain::ports::demand_model::{
    DemandFeatures, DemandModel, FeatureContribution, FEATURE_NAMES,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub name: String,
    pub intercept: f64,
    /// One signed coefficient per encoded feature, index-aligned with
    /// the feature name manifest.
    pub coefficients: Vec<f64>,
    pub elasticity: f64,
}

pub struct LinearDemandModel {
    artifact: LinearArtifact,
}

impl LinearDemandModel {
    pub fn new(artifact: LinearArtifact) -> Result<Self, DomainError> {
        if artifact.coefficients.len() != FEATURE_NAMES.len() {
            return Err(DomainError::ModelUnavailable(format!(
                "model '{}' has {} coefficients, expected {}",
                artifact.name,
                artifact.coefficients.len(),
                FEATURE_NAMES.len()
            )));
        }
        Ok(Self { artifact })
    }
}

impl DemandModel for LinearDemandModel {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn predict(
        &self,
        features: &DemandFeatures,
        elasticity_modifier: f64,
    ) -> Result<f64, DomainError> {
        let score: f64 = self.artifact.intercept
            + features
                .vector()
                .iter()
                .zip(self.artifact.coefficients.iter())
                .map(|(x, c)| x * c)
                .sum::<f64>();
        let base = sigmoid(score);
        let response = price_response(
            features.price,
            features.cost,
            self.artifact.elasticity,
            elasticity_modifier,
        );
        Ok(base * response * features.external_adjustment)
    }

    fn explain(&self) -> Option<Vec<FeatureContribution>> {
        Some(
            FEATURE_NAMES
                .iter()
                .zip(self.artifact.coefficients.iter())
                .map(|(name, c)| FeatureContribution {
                    feature: name.to_string(),
                    weight: *c,
                })
                .collect(),
        )
    }
}

/// Default fitted coefficients shipped with the binary.
pub fn default_artifact() -> LinearArtifact {
    LinearArtifact {
        name: "linear".to_string(),
        intercept: 2.2,
        coefficients: vec![
            -0.15,  // supply_demand_ratio: oversupply lowers per-ride demand
            -1.10,  // price_to_cost_ratio
            -0.05,  // location
            0.10,   // time_of_booking
            0.25,   // vehicle_type
            0.12,   // loyalty_tier
            0.18,   // average_rating
            0.004,  // past_rides
        ],
        elasticity: -0.9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::market_context::MarketContext;
    use crate::domain::values::booking_time::BookingTime;
    use crate::domain::values::location::LocationCategory;
    use crate::domain::values::loyalty::LoyaltyTier;
    use crate::domain::values::vehicle::VehicleType;

    fn ctx() -> MarketContext {
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

    #[test]
    fn test_coefficients_are_signed() {
        let model = LinearDemandModel::new(default_artifact()).unwrap();
        let contributions = model.explain().unwrap();
        let price_coef = contributions
            .iter()
            .find(|c| c.feature == "price_to_cost_ratio")
            .unwrap();
        assert!(price_coef.weight < 0.0);
    }

    #[test]
    fn test_coefficient_count_validated() {
        let artifact = LinearArtifact {
            name: "broken".into(),
            intercept: 0.0,
            coefficients: vec![1.0, 2.0],
            elasticity: -1.0,
        };
        assert!(LinearDemandModel::new(artifact).is_err());
    }

    #[test]
    fn test_external_adjustment_scales_demand() {
        let model = LinearDemandModel::new(default_artifact()).unwrap();
        let neutral = model
            .predict(&DemandFeatures::from_context(&ctx(), 40.0, 1.0), 1.0)
            .unwrap();
        let boosted = model
            .predict(&DemandFeatures::from_context(&ctx(), 40.0, 1.2), 1.0)
            .unwrap();
        assert!((boosted - neutral * 1.2).abs() < 1e-9);
    }
}
