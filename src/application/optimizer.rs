//! Grid-search profit optimization.
//!
//! For every candidate price the primary demand model is queried and
//! profit is computed as `(price − cost) × demand`, floored at zero so a
//! loss is never selected. The argmax over the grid is the recommended
//! price; the baseline for uplift comparison is always the historical
//! cost itself.

use crate::application::registry::{ModelRegistry, PredictOptions};
use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// Maximum points kept in the visualization curve.
const CURVE_POINTS: usize = 20;

#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Absolute lower bound for the grid; the effective lower bound is
    /// `max(min_price, cost)` so the optimizer never prices below cost.
    pub min_price: f64,
    pub max_price: f64,
    pub step: f64,
    pub cache_capacity: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_price: 10.0,
            max_price: 200.0,
            step: 1.0,
            cache_capacity: 128,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    pub price: f64,
    pub demand: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub optimal_price: f64,
    pub expected_demand: f64,
    pub expected_profit: f64,
    /// Baseline is the ride priced at historical cost.
    pub baseline_price: f64,
    pub baseline_profit: f64,
    pub profit_uplift_percent: f64,
    /// Down-sampled price/demand/profit series for visualization
    /// (≤20 points, first and last grid points always kept).
    pub price_demand_curve: Vec<PricePoint>,
    pub optimization_time_ms: f64,
}

/// Bounded cache with insertion-order (FIFO) eviction. Not LRU: eviction
/// ignores access recency.
struct FifoCache {
    map: HashMap<String, OptimizationResult>,
    order: VecDeque<String>,
    capacity: usize,
}

impl FifoCache {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &str) -> Option<OptimizationResult> {
        self.map.get(key).cloned()
    }

    fn insert(&mut self, key: String, value: OptimizationResult) {
        if self.capacity == 0 {
            return;
        }
        if self.map.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
            if self.order.len() > self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.map.remove(&oldest);
                }
            }
        }
    }
}

pub struct PriceOptimizer {
    registry: Arc<ModelRegistry>,
    config: OptimizerConfig,
    cache: Mutex<FifoCache>,
}

impl PriceOptimizer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_config(registry, OptimizerConfig::default())
    }

    pub fn with_config(registry: Arc<ModelRegistry>, config: OptimizerConfig) -> Self {
        let cache = Mutex::new(FifoCache::new(config.cache_capacity));
        Self {
            registry,
            config,
            cache,
        }
    }

    /// Stable cache key over every context attribute plus the segment
    /// label and prediction knobs. Float fields are keyed by their bit
    /// patterns so the key is exact, not formatted.
    fn cache_key(ctx: &MarketContext, segment_name: &str, opts: PredictOptions) -> String {
        format!(
            "{}|{}|{}|{}|{}|{:x}|{}|{}|{:x}|{:x}|{}|{:x}|{:x}",
            ctx.number_of_riders,
            ctx.number_of_drivers,
            ctx.location_category,
            ctx.customer_loyalty_status,
            ctx.number_of_past_rides,
            ctx.average_ratings.to_bits(),
            ctx.time_of_booking,
            ctx.vehicle_type,
            ctx.expected_ride_duration.to_bits(),
            ctx.historical_cost_of_ride.to_bits(),
            segment_name,
            opts.elasticity_modifier.to_bits(),
            opts.external_adjustment.to_bits(),
        )
    }

    /// Optimize with default prediction knobs.
    pub fn optimize(
        &self,
        ctx: &MarketContext,
        segment_name: &str,
        use_cache: bool,
    ) -> Result<OptimizationResult, DomainError> {
        self.optimize_with(ctx, segment_name, PredictOptions::default(), use_cache)
    }

    /// Full grid search. `use_cache = false` bypasses both cache read and
    /// write (sensitivity scenarios must not pollute shared state).
    /// Demand model failures propagate uncaught.
    pub fn optimize_with(
        &self,
        ctx: &MarketContext,
        segment_name: &str,
        opts: PredictOptions,
        use_cache: bool,
    ) -> Result<OptimizationResult, DomainError> {
        let key = Self::cache_key(ctx, segment_name, opts);
        if use_cache {
            if let Some(hit) = self.cache.lock().get(&key) {
                tracing::debug!(segment = segment_name, "optimizer cache hit");
                return Ok(hit);
            }
        }

        let started = Instant::now();
        let cost = ctx.historical_cost_of_ride;
        let primary = self.registry.primary_model().to_string();

        let start = self.config.min_price.max(cost);
        let mut prices = Vec::new();
        let mut p = start;
        while p <= self.config.max_price + 1e-9 {
            prices.push(p);
            p += self.config.step;
        }
        // A cost above the configured ceiling still gets evaluated at cost.
        if prices.is_empty() {
            prices.push(start);
        }

        let mut curve = Vec::with_capacity(prices.len());
        let mut best_idx = 0;
        let mut best_profit = f64::NEG_INFINITY;
        for (i, &price) in prices.iter().enumerate() {
            let demand = self.registry.predict(ctx, price, &primary, opts)?;
            let profit = ((price - cost) * demand).max(0.0);
            if profit > best_profit {
                best_profit = profit;
                best_idx = i;
            }
            curve.push(PricePoint {
                price,
                demand,
                profit,
            });
        }

        let baseline_demand = self.registry.predict(ctx, cost, &primary, opts)?;
        let baseline_profit = ((cost - cost) * baseline_demand).max(0.0);

        let optimal = &curve[best_idx];
        let profit_uplift_percent = if baseline_profit > 0.0 {
            (optimal.profit - baseline_profit) / baseline_profit * 100.0
        } else if optimal.profit > 0.0 {
            100.0
        } else {
            0.0
        };

        let result = OptimizationResult {
            optimal_price: optimal.price,
            expected_demand: optimal.demand,
            expected_profit: optimal.profit,
            baseline_price: cost,
            baseline_profit,
            profit_uplift_percent,
            price_demand_curve: downsample(&curve),
            optimization_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        };

        if use_cache {
            self.cache.lock().insert(key, result.clone());
        }
        Ok(result)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().map.len()
    }

    pub fn is_cached(&self, ctx: &MarketContext, segment_name: &str) -> bool {
        let key = Self::cache_key(ctx, segment_name, PredictOptions::default());
        self.cache.lock().map.contains_key(&key)
    }
}

/// Evenly spaced down-sampling that always keeps the first and last
/// grid points.
fn downsample(curve: &[PricePoint]) -> Vec<PricePoint> {
    if curve.len() <= CURVE_POINTS {
        return curve.to_vec();
    }
    let mut out = Vec::with_capacity(CURVE_POINTS);
    let mut last_idx = usize::MAX;
    for i in 0..CURVE_POINTS {
        let idx = i * (curve.len() - 1) / (CURVE_POINTS - 1);
        if idx != last_idx {
            out.push(curve[idx].clone());
            last_idx = idx;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downsample_keeps_endpoints() {
        let curve: Vec<PricePoint> = (0..137)
            .map(|i| PricePoint {
                price: i as f64,
                demand: 0.5,
                profit: 1.0,
            })
            .collect();
        let sampled = downsample(&curve);
        assert!(sampled.len() <= CURVE_POINTS);
        assert_eq!(sampled.first().unwrap().price, 0.0);
        assert_eq!(sampled.last().unwrap().price, 136.0);
    }

    #[test]
    fn test_downsample_short_series_untouched() {
        let curve: Vec<PricePoint> = (0..5)
            .map(|i| PricePoint {
                price: i as f64,
                demand: 0.5,
                profit: 1.0,
            })
            .collect();
        assert_eq!(downsample(&curve).len(), 5);
    }

    #[test]
    fn test_fifo_cache_evicts_oldest() {
        let mut cache = FifoCache::new(2);
        let value = OptimizationResult {
            optimal_price: 1.0,
            expected_demand: 0.5,
            expected_profit: 0.5,
            baseline_price: 1.0,
            baseline_profit: 0.0,
            profit_uplift_percent: 100.0,
            price_demand_curve: vec![],
            optimization_time_ms: 0.0,
        };
        cache.insert("a".into(), value.clone());
        cache.insert("b".into(), value.clone());
        cache.insert("c".into(), value.clone());
        assert_eq!(cache.map.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_fifo_cache_overwrite_does_not_grow() {
        let mut cache = FifoCache::new(2);
        let value = OptimizationResult {
            optimal_price: 1.0,
            expected_demand: 0.5,
            expected_profit: 0.5,
            baseline_price: 1.0,
            baseline_profit: 0.0,
            profit_uplift_percent: 100.0,
            price_demand_curve: vec![],
            optimization_time_ms: 0.0,
        };
        cache.insert("a".into(), value.clone());
        cache.insert("a".into(), value);
        assert_eq!(cache.map.len(), 1);
        assert_eq!(cache.order.len(), 1);
    }
}
