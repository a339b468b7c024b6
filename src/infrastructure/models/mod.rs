//! Concrete demand model variants.
//!
//! Both variants share the same response form: a feature score squashed
//! through a sigmoid, shaped by an exponential price response around the
//! historical cost, then scaled by the external demand adjustment:
//!
//! `demand = sigmoid(score) × exp(elasticity × modifier × (p/c − 1)) × ext`
//!
//! The elasticity parameter is part of each trained artifact; sensitivity
//! scenarios scale it through the modifier without touching the artifact.

pub mod gradient_boost;
pub mod linear;

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn price_response(price: f64, cost: f64, elasticity: f64, modifier: f64) -> f64 {
    if cost <= 0.0 {
        return 1.0;
    }
    (elasticity * modifier * (price / cost - 1.0)).exp()
}
