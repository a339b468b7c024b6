pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::optimizer::{OptimizationResult, PriceOptimizer};
use crate::application::pipeline::{PricingPipeline, PricingResult};
use crate::application::registry::{ModelRegistry, PredictOptions};
use crate::application::rules::{RulesEngine, RulesResult};
use crate::application::segmentation::SegmentClassifier;
use crate::application::sensitivity::SensitivityResult;
use crate::domain::entities::decision_trace::DecisionTrace;
use crate::domain::entities::market_context::MarketContext;
use crate::domain::entities::segment::{SegmentModel, SegmentResult};
use crate::domain::error::DomainError;
use crate::domain::ports::demand_model::FeatureContribution;
use crate::domain::ports::external_factors::ExternalFactorProvider;
use crate::domain::ports::model_store::ModelStore;
use crate::domain::ports::rule_source::RuleSource;
use crate::domain::ports::trace_repository::{TraceRepository, TraceSummary};
use crate::infrastructure::factors::{HttpFactorProvider, NoopFactorProvider};
use crate::infrastructure::rules::{JsonRuleSource, StaticRuleSource};
use crate::infrastructure::sqlite::{run_migrations, SqliteTraceRepo};
use crate::infrastructure::store::builtin::BuiltinModelStore;
use crate::infrastructure::store::json_store::JsonModelStore;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct FareCraft {
    pipeline: PricingPipeline,
    classifier: Arc<SegmentClassifier>,
    registry: Arc<ModelRegistry>,
    optimizer: Arc<PriceOptimizer>,
    rules: Arc<RulesEngine>,
    traces: Arc<dyn TraceRepository>,
}

impl FareCraft {
    /// Environment-driven construction:
    /// `FARECRAFT_MODEL_DIR` selects a filesystem model store over the
    /// built-in artifacts, `FARECRAFT_RULES` a JSON rule file over the
    /// built-in rules, `FARECRAFT_FACTORS_URL` an HTTP factor service
    /// over the neutral provider, `FARECRAFT_PRIMARY_MODEL` the model
    /// the optimizer queries.
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let store: Arc<dyn ModelStore> = match std::env::var("FARECRAFT_MODEL_DIR") {
            Ok(dir) => Arc::new(JsonModelStore::new(dir)),
            Err(_) => Arc::new(BuiltinModelStore),
        };
        let rule_source: Arc<dyn RuleSource> = match std::env::var("FARECRAFT_RULES") {
            Ok(path) => Arc::new(JsonRuleSource::new(path)),
            Err(_) => Arc::new(StaticRuleSource::default()),
        };
        let factors: Arc<dyn ExternalFactorProvider> =
            match std::env::var("FARECRAFT_FACTORS_URL") {
                Ok(url) => Arc::new(HttpFactorProvider::new(url)?),
                Err(_) => Arc::new(NoopFactorProvider),
            };
        let primary = std::env::var("FARECRAFT_PRIMARY_MODEL")
            .unwrap_or_else(|_| "gradient_boost".to_string());

        Self::with_providers(db_path, store, rule_source, factors, &primary)
    }

    pub fn with_providers(
        db_path: &str,
        store: Arc<dyn ModelStore>,
        rule_source: Arc<dyn RuleSource>,
        factors: Arc<dyn ExternalFactorProvider>,
        primary_model: &str,
    ) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        run_migrations(&conn)?;
        let traces: Arc<dyn TraceRepository> = Arc::new(SqliteTraceRepo::new(conn));

        let classifier = Arc::new(SegmentClassifier::new(store.clone()));
        let registry = Arc::new(ModelRegistry::new(store, primary_model));
        let optimizer = Arc::new(PriceOptimizer::new(registry.clone()));
        let rules = Arc::new(RulesEngine::new(rule_source.load_rules()?)?);

        let pipeline = PricingPipeline::new(
            classifier.clone(),
            registry.clone(),
            optimizer.clone(),
            rules.clone(),
            factors,
            traces.clone(),
        );

        Ok(Self {
            pipeline,
            classifier,
            registry,
            optimizer,
            rules,
            traces,
        })
    }

    // Delegating methods

    pub async fn recommend(
        &self,
        ctx: &MarketContext,
    ) -> Result<(PricingResult, DecisionTrace), DomainError> {
        self.pipeline.recommend(ctx).await
    }

    pub fn sensitivity(&self, ctx: &MarketContext) -> Result<SensitivityResult, DomainError> {
        self.pipeline.sensitivity(ctx)
    }

    pub fn classify(&self, ctx: &MarketContext) -> Result<SegmentResult, DomainError> {
        ctx.validate()?;
        self.classifier.classify(ctx)
    }

    pub fn predict_all(
        &self,
        ctx: &MarketContext,
        price: f64,
    ) -> Result<BTreeMap<String, f64>, DomainError> {
        ctx.validate()?;
        self.registry.predict_all(ctx, price, PredictOptions::default())
    }

    pub fn explain_model(
        &self,
        model_name: &str,
    ) -> Result<Option<Vec<FeatureContribution>>, DomainError> {
        self.registry.explain(model_name)
    }

    pub fn model_names(&self) -> Result<Vec<String>, DomainError> {
        self.registry.model_names()
    }

    pub fn optimize(&self, ctx: &MarketContext) -> Result<OptimizationResult, DomainError> {
        ctx.validate()?;
        let segment = self.classifier.classify(ctx)?;
        self.optimizer.optimize(ctx, &segment.segment_name, true)
    }

    pub fn apply_rules(&self, ctx: &MarketContext, price: f64) -> Result<RulesResult, DomainError> {
        ctx.validate()?;
        Ok(self.rules.apply(ctx, price))
    }

    /// Fit a segment model over historical rows and persist it into a
    /// model directory, where `FARECRAFT_MODEL_DIR` can pick it up.
    pub fn fit_segments(
        rows: &[MarketContext],
        k: usize,
        out_dir: &str,
    ) -> Result<SegmentModel, DomainError> {
        let model = SegmentClassifier::fit(rows, k)?;
        JsonModelStore::new(out_dir).save_segment_model(&model)?;
        Ok(model)
    }

    pub fn trace_get(&self, trace_id: &str) -> Result<Option<DecisionTrace>, DomainError> {
        self.traces.get(trace_id)
    }

    pub fn trace_list(&self, limit: usize) -> Result<Vec<TraceSummary>, DomainError> {
        self.traces.list(limit)
    }
}
