use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use crate::domain::ports::external_factors::{ExternalFactorProvider, ExternalFactors};

/// Always-neutral provider, used when no factor service is configured.
#[derive(Default)]
pub struct NoopFactorProvider;

#[async_trait::async_trait]
impl ExternalFactorProvider for NoopFactorProvider {
    async fn demand_adjustment(&self, _ctx: &MarketContext) -> Result<ExternalFactors, DomainError> {
        Ok(ExternalFactors::neutral())
    }
}
