//! HTTP external factor provider.
//!
//! Posts a compact context summary to a factor service and expects a
//! multiplicative demand adjustment back. The multiplier is clamped to
//! [0.5, 2.0] so a misbehaving service cannot swing recommendations
//! arbitrarily.

use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use crate::domain::ports::external_factors::{ExternalFactorProvider, ExternalFactors};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_MULTIPLIER: f64 = 0.5;
const MAX_MULTIPLIER: f64 = 2.0;

#[derive(Serialize)]
struct FactorRequest<'a> {
    location_category: &'a str,
    time_of_booking: &'a str,
    vehicle_type: &'a str,
    number_of_riders: u32,
    number_of_drivers: u32,
}

#[derive(Deserialize)]
struct FactorResponse {
    demand_multiplier: f64,
    #[serde(default)]
    sources: Vec<String>,
}

pub struct HttpFactorProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpFactorProvider {
    pub fn new(url: impl Into<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DomainError::External(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl ExternalFactorProvider for HttpFactorProvider {
    async fn demand_adjustment(&self, ctx: &MarketContext) -> Result<ExternalFactors, DomainError> {
        let location = ctx.location_category.to_string();
        let time = ctx.time_of_booking.to_string();
        let vehicle = ctx.vehicle_type.to_string();
        let request = FactorRequest {
            location_category: &location,
            time_of_booking: &time,
            vehicle_type: &vehicle,
            number_of_riders: ctx.number_of_riders,
            number_of_drivers: ctx.number_of_drivers,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("factor service request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::External(format!(
                "factor service returned {}",
                response.status()
            )));
        }

        let body: FactorResponse = response
            .json()
            .await
            .map_err(|e| DomainError::External(format!("factor service response invalid: {e}")))?;

        if !body.demand_multiplier.is_finite() {
            return Err(DomainError::External(
                "factor service returned a non-finite multiplier".to_string(),
            ));
        }

        Ok(ExternalFactors {
            demand_multiplier: body.demand_multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER),
            sources: body.sources,
        })
    }
}
