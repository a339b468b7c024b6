use crate::domain::values::booking_time::BookingTime;
use crate::domain::values::confidence::ConfidenceLevel;
use crate::domain::values::location::LocationCategory;
use crate::domain::values::vehicle::VehicleType;
use serde::{Deserialize, Serialize};

/// Number of standardized features the segment model clusters on:
/// supply/demand ratio, booking time, location, vehicle type.
pub const SEGMENT_FEATURES: usize = 4;

/// Aggregate statistics for one cluster, computed at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentCharacteristics {
    /// Number of historical rows assigned to this cluster.
    pub size: usize,
    pub avg_supply_demand_ratio: f64,
    pub avg_historical_cost: f64,
    pub dominant_location: LocationCategory,
    pub dominant_time: BookingTime,
    pub dominant_vehicle: VehicleType,
}

/// A fitted partition model: feature scaler, cluster centers, and the
/// per-cluster labels/characteristics derived at fit time. Plain data so
/// the model store can persist and reload it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentModel {
    pub k: usize,
    pub feature_means: [f64; SEGMENT_FEATURES],
    pub feature_stds: [f64; SEGMENT_FEATURES],
    /// Cluster centers in standardized feature space, indexed by cluster id.
    pub centroids: Vec<[f64; SEGMENT_FEATURES]>,
    /// `{Location}_{Peak|Standard}_{Vehicle}` per cluster.
    pub labels: Vec<String>,
    pub characteristics: Vec<SegmentCharacteristics>,
}

/// Outcome of classifying one context.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResult {
    pub segment_name: String,
    pub cluster_id: usize,
    pub characteristics: SegmentCharacteristics,
    /// Euclidean distance to the assigned centroid in standardized space.
    pub centroid_distance: f64,
    pub confidence: ConfidenceLevel,
}
