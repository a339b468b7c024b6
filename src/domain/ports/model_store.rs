use crate::domain::entities::segment::SegmentModel;
use crate::domain::error::DomainError;
use crate::domain::ports::demand_model::DemandModel;
use std::sync::Arc;

/// Versioned model artifact store. Loading is performed lazily by the
/// consumers (segment classifier, model registry) and memoized; a failed
/// load surfaces as `ModelUnavailable` / `NotFitted` upstream.
pub trait ModelStore: Send + Sync {
    fn load_segment_model(&self) -> Result<SegmentModel, DomainError>;

    /// At least two variants are expected so agreement analysis is
    /// meaningful.
    fn load_demand_models(&self) -> Result<Vec<Arc<dyn DemandModel>>, DomainError>;
}
