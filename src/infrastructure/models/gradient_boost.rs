//! Gradient-boosted stump ensemble for demand prediction.
//!
//! The artifact is a flat list of decision stumps over the encoded
//! feature vector. Importances are magnitude-based: each feature's share
//! of the total absolute split contribution.

use super::{price_response, sigmoid};
use crate::domain::error::DomainError;
use crate::domain::ports::demand_model::{
    DemandFeatures, DemandModel, FeatureContribution, FEATURE_NAMES,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stump {
    /// Index into the encoded feature vector.
    pub feature: usize,
    pub threshold: f64,
    /// Output when the feature is ≤ threshold.
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostArtifact {
    pub name: String,
    pub bias: f64,
    pub learning_rate: f64,
    pub elasticity: f64,
    pub stumps: Vec<Stump>,
}

pub struct GradientBoostModel {
    artifact: GradientBoostArtifact,
}

impl GradientBoostModel {
    pub fn new(artifact: GradientBoostArtifact) -> Result<Self, DomainError> {
        if let Some(stump) = artifact
            .stumps
            .iter()
            .find(|s| s.feature >= FEATURE_NAMES.len())
        {
            return Err(DomainError::ModelUnavailable(format!(
                "model '{}' references feature index {} out of range",
                artifact.name, stump.feature
            )));
        }
        Ok(Self { artifact })
    }
}

impl DemandModel for GradientBoostModel {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn predict(
        &self,
        features: &DemandFeatures,
        elasticity_modifier: f64,
    ) -> Result<f64, DomainError> {
        let x = features.vector();
        let raw: f64 = self
            .artifact
            .stumps
            .iter()
            .map(|s| if x[s.feature] <= s.threshold { s.left } else { s.right })
            .sum();
        let score = self.artifact.bias + self.artifact.learning_rate * raw;
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
        let mut totals = [0.0; FEATURE_NAMES.len()];
        for s in &self.artifact.stumps {
            totals[s.feature] += self.artifact.learning_rate * (s.left - s.right).abs();
        }
        let sum: f64 = totals.iter().sum();
        if sum <= 0.0 {
            return None;
        }
        Some(
            FEATURE_NAMES
                .iter()
                .zip(totals.iter())
                .map(|(name, t)| FeatureContribution {
                    feature: name.to_string(),
                    weight: t / sum,
                })
                .collect(),
        )
    }
}

/// Default fitted ensemble shipped with the binary.
pub fn default_artifact() -> GradientBoostArtifact {
    GradientBoostArtifact {
        name: "gradient_boost".to_string(),
        bias: 0.0,
        learning_rate: 0.5,
        elasticity: -1.0,
        stumps: vec![
            Stump { feature: 1, threshold: 1.5, left: 3.0, right: -1.0 },
            Stump { feature: 1, threshold: 2.0, left: 2.0, right: -2.0 },
            Stump { feature: 1, threshold: 2.5, left: 1.2, right: -2.5 },
            Stump { feature: 0, threshold: 1.0, left: 0.8, right: -0.8 },
            Stump { feature: 4, threshold: 0.5, left: -0.3, right: 0.5 },
            Stump { feature: 6, threshold: 4.0, left: -0.5, right: 0.5 },
            Stump { feature: 5, threshold: 1.5, left: -0.2, right: 0.4 },
            Stump { feature: 3, threshold: 1.5, left: -0.2, right: 0.3 },
            Stump { feature: 7, threshold: 10.0, left: -0.1, right: 0.2 },
            Stump { feature: 2, threshold: 0.5, left: 0.2, right: -0.1 },
        ],
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
    fn test_demand_decreases_with_price() {
        let model = GradientBoostModel::new(default_artifact()).unwrap();
        let low = model
            .predict(&DemandFeatures::from_context(&ctx(), 35.0, 1.0), 1.0)
            .unwrap();
        let high = model
            .predict(&DemandFeatures::from_context(&ctx(), 90.0, 1.0), 1.0)
            .unwrap();
        assert!(low > high);
        assert!(low <= 1.0 && high >= 0.0);
    }

    #[test]
    fn test_importances_are_normalized() {
        let model = GradientBoostModel::new(default_artifact()).unwrap();
        let importances = model.explain().unwrap();
        assert_eq!(importances.len(), FEATURE_NAMES.len());
        let total: f64 = importances.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(importances.iter().all(|c| c.weight >= 0.0));
    }

    #[test]
    fn test_out_of_range_feature_rejected() {
        let mut artifact = default_artifact();
        artifact.stumps.push(Stump { feature: 99, threshold: 0.0, left: 0.0, right: 0.0 });
        assert!(matches!(
            GradientBoostModel::new(artifact),
            Err(DomainError::ModelUnavailable(_))
        ));
    }
}
