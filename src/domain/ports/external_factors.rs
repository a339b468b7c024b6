use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use serde::Serialize;

/// Multiplicative demand adjustment derived from external context
/// (weather, events, fuel prices). Neutral means "no adjustment".
#[derive(Debug, Clone, Serialize)]
pub struct ExternalFactors {
    pub demand_multiplier: f64,
    /// Which sources contributed (e.g. "weather", "events").
    pub sources: Vec<String>,
}

impl ExternalFactors {
    pub fn neutral() -> Self {
        Self {
            demand_multiplier: 1.0,
            sources: vec![],
        }
    }
}

#[async_trait::async_trait]
pub trait ExternalFactorProvider: Send + Sync {
    async fn demand_adjustment(&self, ctx: &MarketContext) -> Result<ExternalFactors, DomainError>;
}
