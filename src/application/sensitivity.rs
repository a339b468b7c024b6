//! Multi-scenario sensitivity analysis.
//!
//! Re-runs the optimizer under a fixed space of 17 perturbed scenarios
//! (7 elasticity, 5 demand, 5 cost) and aggregates the spread of optimal
//! prices into a confidence band and a robustness score. Scenarios are
//! independent pure computations over context copies, so the CPU-bound
//! batch runs on a rayon pool.

use crate::application::optimizer::PriceOptimizer;
use crate::application::registry::PredictOptions;
use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// Elasticity multipliers: −30% … +30% around the trained value.
pub const ELASTICITY_MODIFIERS: [f64; 7] = [0.7, 0.8, 0.9, 1.0, 1.1, 1.2, 1.3];
/// Demand multipliers applied to the rider count: −20% … +20%.
pub const DEMAND_MODIFIERS: [f64; 5] = [0.8, 0.9, 1.0, 1.1, 1.2];
/// Cost multipliers applied to the historical cost: −10% … +10%.
pub const COST_MODIFIERS: [f64; 5] = [0.9, 0.95, 1.0, 1.05, 1.1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioType {
    Elasticity,
    Demand,
    Cost,
}

/// One point in sensitivity space.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_type: ScenarioType,
    pub modifier: f64,
    pub optimal_price: f64,
    pub expected_profit: f64,
    pub expected_demand: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceBand {
    pub min_price: f64,
    pub max_price: f64,
    pub range: f64,
    /// Range relative to the base-case optimal price.
    pub range_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensitivityResult {
    pub base_case: ScenarioResult,
    pub elasticity_sensitivity: Vec<ScenarioResult>,
    pub demand_sensitivity: Vec<ScenarioResult>,
    pub cost_sensitivity: Vec<ScenarioResult>,
    pub confidence_band: ConfidenceBand,
    pub worst_case: ScenarioResult,
    pub best_case: ScenarioResult,
    /// `max(0, 100 − 2 × range_percent)`. Linear and capped; not a
    /// statistical measure.
    pub robustness_score: f64,
}

pub struct SensitivityAnalyzer {
    optimizer: Arc<PriceOptimizer>,
}

impl SensitivityAnalyzer {
    pub fn new(optimizer: Arc<PriceOptimizer>) -> Self {
        Self { optimizer }
    }

    /// Run all 17 scenarios and aggregate. Fail-fast: the first scenario
    /// error aborts the whole analysis. The caller's context is never
    /// mutated and the shared optimizer cache is never read or written.
    pub fn analyze(
        &self,
        ctx: &MarketContext,
        segment_name: &str,
    ) -> Result<SensitivityResult, DomainError> {
        let mut specs: Vec<(ScenarioType, f64)> = Vec::with_capacity(17);
        specs.extend(ELASTICITY_MODIFIERS.iter().map(|m| (ScenarioType::Elasticity, *m)));
        specs.extend(DEMAND_MODIFIERS.iter().map(|m| (ScenarioType::Demand, *m)));
        specs.extend(COST_MODIFIERS.iter().map(|m| (ScenarioType::Cost, *m)));

        let results: Vec<ScenarioResult> = specs
            .into_par_iter()
            .map(|(scenario_type, modifier)| {
                self.run_scenario(ctx, segment_name, scenario_type, modifier)
            })
            .collect::<Result<_, DomainError>>()?;

        let elasticity: Vec<ScenarioResult> = results[..7].to_vec();
        let demand: Vec<ScenarioResult> = results[7..12].to_vec();
        let cost: Vec<ScenarioResult> = results[12..].to_vec();

        // Base case is the unperturbed elasticity scenario.
        let base_case = elasticity
            .iter()
            .find(|r| (r.modifier - 1.0).abs() < 1e-9)
            .cloned()
            .ok_or_else(|| {
                DomainError::InvalidInput("elasticity grid missing the 1.0 base point".into())
            })?;

        let min_price = results.iter().map(|r| r.optimal_price).fold(f64::INFINITY, f64::min);
        let max_price = results
            .iter()
            .map(|r| r.optimal_price)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = max_price - min_price;
        let range_percent = if base_case.optimal_price > 0.0 {
            range / base_case.optimal_price * 100.0
        } else {
            0.0
        };

        // First occurrence wins ties, in elasticity → demand → cost order.
        let mut worst_case = results[0].clone();
        let mut best_case = results[0].clone();
        for r in &results[1..] {
            if r.expected_profit < worst_case.expected_profit {
                worst_case = r.clone();
            }
            if r.expected_profit > best_case.expected_profit {
                best_case = r.clone();
            }
        }

        Ok(SensitivityResult {
            base_case,
            elasticity_sensitivity: elasticity,
            demand_sensitivity: demand,
            cost_sensitivity: cost,
            confidence_band: ConfidenceBand {
                min_price,
                max_price,
                range,
                range_percent,
            },
            worst_case,
            best_case,
            robustness_score: (100.0 - 2.0 * range_percent).max(0.0),
        })
    }

    fn run_scenario(
        &self,
        ctx: &MarketContext,
        segment_name: &str,
        scenario_type: ScenarioType,
        modifier: f64,
    ) -> Result<ScenarioResult, DomainError> {
        let (scenario_ctx, opts) = match scenario_type {
            // Elasticity perturbs the model parameter, not the context.
            ScenarioType::Elasticity => (
                ctx.clone(),
                PredictOptions {
                    elasticity_modifier: modifier,
                    ..Default::default()
                },
            ),
            ScenarioType::Demand => {
                let riders = ((ctx.number_of_riders as f64 * modifier).round() as u32).max(1);
                (ctx.with_riders(riders), PredictOptions::default())
            }
            ScenarioType::Cost => (
                ctx.with_cost(ctx.historical_cost_of_ride * modifier),
                PredictOptions::default(),
            ),
        };

        let optimized =
            self.optimizer
                .optimize_with(&scenario_ctx, segment_name, opts, false)?;

        Ok(ScenarioResult {
            scenario_type,
            modifier,
            optimal_price: optimized.optimal_price,
            expected_profit: optimized.expected_profit,
            expected_demand: optimized.expected_demand,
        })
    }
}
