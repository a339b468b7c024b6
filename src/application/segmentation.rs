//! Market segment classification.
//!
//! Assigns a context to one of k fixed clusters fitted offline over
//! historical rides. Four features are standardized and clustered with
//! Lloyd's k-means: supply/demand ratio, booking time, location, vehicle
//! type. Initialization is deterministic (quantile seeds along the ratio
//! axis) so a fit over the same rows always produces the same model.

use crate::domain::entities::market_context::MarketContext;
use crate::domain::entities::segment::{
    SegmentCharacteristics, SegmentModel, SegmentResult, SEGMENT_FEATURES,
};
use crate::domain::error::DomainError;
use crate::domain::ports::model_store::ModelStore;
use crate::domain::values::booking_time::BookingTime;
use crate::domain::values::confidence::ConfidenceLevel;
use crate::domain::values::location::LocationCategory;
use crate::domain::values::vehicle::VehicleType;
use parking_lot::RwLock;
use std::sync::Arc;

/// Default cluster count.
pub const DEFAULT_CLUSTERS: usize = 6;

const MAX_ITERATIONS: usize = 100;
const RATIO_CLIP: f64 = 10.0;

fn encode(ctx: &MarketContext) -> [f64; SEGMENT_FEATURES] {
    [
        ctx.supply_demand_ratio().min(RATIO_CLIP),
        ctx.time_of_booking.encoding(),
        ctx.location_category.encoding(),
        ctx.vehicle_type.encoding(),
    ]
}

fn standardize(
    raw: &[f64; SEGMENT_FEATURES],
    means: &[f64; SEGMENT_FEATURES],
    stds: &[f64; SEGMENT_FEATURES],
) -> [f64; SEGMENT_FEATURES] {
    let mut out = [0.0; SEGMENT_FEATURES];
    for i in 0..SEGMENT_FEATURES {
        out[i] = (raw[i] - means[i]) / stds[i];
    }
    out
}

fn squared_distance(a: &[f64; SEGMENT_FEATURES], b: &[f64; SEGMENT_FEATURES]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the nearest centroid; first occurrence wins ties.
fn nearest(point: &[f64; SEGMENT_FEATURES], centroids: &[[f64; SEGMENT_FEATURES]]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

pub struct SegmentClassifier {
    store: Arc<dyn ModelStore>,
    model: RwLock<Option<Arc<SegmentModel>>>,
}

impl SegmentClassifier {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self {
            store,
            model: RwLock::new(None),
        }
    }

    /// Fit a partition model over historical rows. Offline entry point;
    /// request-time classification only ever reads the fitted model.
    pub fn fit(rows: &[MarketContext], k: usize) -> Result<SegmentModel, DomainError> {
        if k == 0 {
            return Err(DomainError::InvalidInput("cluster count must be > 0".into()));
        }
        if rows.len() < k {
            return Err(DomainError::InvalidInput(format!(
                "need at least {k} rows to fit {k} clusters, got {}",
                rows.len()
            )));
        }

        let raw: Vec<[f64; SEGMENT_FEATURES]> = rows.iter().map(encode).collect();

        let mut means = [0.0; SEGMENT_FEATURES];
        let mut stds = [0.0; SEGMENT_FEATURES];
        let n = raw.len() as f64;
        for i in 0..SEGMENT_FEATURES {
            means[i] = raw.iter().map(|r| r[i]).sum::<f64>() / n;
            let var = raw.iter().map(|r| (r[i] - means[i]).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            // Constant features would divide by zero; leave them unscaled.
            stds[i] = if std > 1e-9 { std } else { 1.0 };
        }

        let points: Vec<[f64; SEGMENT_FEATURES]> =
            raw.iter().map(|r| standardize(r, &means, &stds)).collect();

        // Deterministic seeding: spread initial centers across the
        // supply/demand axis at evenly spaced quantiles.
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| {
            points[a][0]
                .partial_cmp(&points[b][0])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let mut centroids: Vec<[f64; SEGMENT_FEATURES]> = (0..k)
            .map(|i| {
                let idx = if k == 1 { 0 } else { i * (points.len() - 1) / (k - 1) };
                points[order[idx]]
            })
            .collect();

        let mut assignments = vec![0usize; points.len()];
        for _ in 0..MAX_ITERATIONS {
            let mut changed = false;
            for (p, a) in points.iter().zip(assignments.iter_mut()) {
                let cluster = nearest(p, &centroids);
                if cluster != *a {
                    *a = cluster;
                    changed = true;
                }
            }

            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&[f64; SEGMENT_FEATURES]> = points
                    .iter()
                    .zip(assignments.iter())
                    .filter(|(_, a)| **a == cluster)
                    .map(|(p, _)| p)
                    .collect();
                // An empty cluster keeps its previous center.
                if members.is_empty() {
                    continue;
                }
                for i in 0..SEGMENT_FEATURES {
                    centroid[i] =
                        members.iter().map(|m| m[i]).sum::<f64>() / members.len() as f64;
                }
            }

            if !changed {
                break;
            }
        }

        let mut characteristics = Vec::with_capacity(k);
        let mut labels = Vec::with_capacity(k);
        for cluster in 0..k {
            let members: Vec<&MarketContext> = rows
                .iter()
                .zip(assignments.iter())
                .filter(|(_, a)| **a == cluster)
                .map(|(r, _)| r)
                .collect();
            let ch = Self::characterize(&members);
            labels.push(format!(
                "{}_{}_{}",
                ch.dominant_location,
                if ch.dominant_time.is_peak() { "Peak" } else { "Standard" },
                ch.dominant_vehicle
            ));
            characteristics.push(ch);
        }

        Ok(SegmentModel {
            k,
            feature_means: means,
            feature_stds: stds,
            centroids,
            labels,
            characteristics,
        })
    }

    fn characterize(members: &[&MarketContext]) -> SegmentCharacteristics {
        if members.is_empty() {
            // Empty clusters get neutral stats so labels stay well-formed.
            return SegmentCharacteristics {
                size: 0,
                avg_supply_demand_ratio: 0.0,
                avg_historical_cost: 0.0,
                dominant_location: LocationCategory::Urban,
                dominant_time: BookingTime::Afternoon,
                dominant_vehicle: VehicleType::Economy,
            };
        }
        let n = members.len() as f64;
        let avg_ratio = members
            .iter()
            .map(|m| m.supply_demand_ratio().min(RATIO_CLIP))
            .sum::<f64>()
            / n;
        let avg_cost = members.iter().map(|m| m.historical_cost_of_ride).sum::<f64>() / n;

        SegmentCharacteristics {
            size: members.len(),
            avg_supply_demand_ratio: avg_ratio,
            avg_historical_cost: avg_cost,
            dominant_location: dominant(members, |m| m.location_category),
            dominant_time: dominant(members, |m| m.time_of_booking),
            dominant_vehicle: dominant(members, |m| m.vehicle_type),
        }
    }

    /// Lazily load and memoize the fitted model. Safe under concurrent
    /// first use: a race loads the same artifact twice, last write wins.
    fn model(&self) -> Result<Arc<SegmentModel>, DomainError> {
        if let Some(model) = self.model.read().as_ref() {
            return Ok(model.clone());
        }
        let loaded = Arc::new(
            self.store
                .load_segment_model()
                .map_err(|e| DomainError::NotFitted(e.to_string()))?,
        );
        tracing::info!(clusters = loaded.k, "segment model loaded");
        let mut guard = self.model.write();
        if guard.is_none() {
            *guard = Some(loaded.clone());
        }
        Ok(guard.as_ref().cloned().unwrap_or(loaded))
    }

    pub fn classify(&self, ctx: &MarketContext) -> Result<SegmentResult, DomainError> {
        let model = self.model()?;
        let point = standardize(&encode(ctx), &model.feature_means, &model.feature_stds);
        let cluster_id = nearest(&point, &model.centroids);
        let centroid_distance = squared_distance(&point, &model.centroids[cluster_id]).sqrt();

        Ok(SegmentResult {
            segment_name: model.labels[cluster_id].clone(),
            cluster_id,
            characteristics: model.characteristics[cluster_id].clone(),
            centroid_distance,
            confidence: ConfidenceLevel::from_distance(centroid_distance),
        })
    }
}

fn dominant<T, F>(members: &[&MarketContext], f: F) -> T
where
    T: Copy + PartialEq,
    F: Fn(&MarketContext) -> T,
{
    let mut best = f(members[0]);
    let mut best_count = 0;
    let mut seen: Vec<(T, usize)> = Vec::new();
    for m in members {
        let v = f(m);
        match seen.iter_mut().find(|(x, _)| *x == v) {
            Some((_, c)) => *c += 1,
            None => seen.push((v, 1)),
        }
    }
    for (v, c) in seen {
        if c > best_count {
            best = v;
            best_count = c;
        }
    }
    best
}
