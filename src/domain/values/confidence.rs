//! Confidence scoring from segment assignment distance.
//!
//! A context that sits close to its cluster centroid is a context the
//! pricing models were effectively trained on; one far away is being
//! extrapolated. Both the coarse level and the continuous score are pure
//! functions of the centroid distance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance scale for the exponential confidence decay.
const CONFIDENCE_SCALE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Coarse level from standardized centroid distance:
    /// under 1.0 is high, under 2.0 medium, anything further low.
    pub fn from_distance(distance: f64) -> Self {
        if distance < 1.0 {
            ConfidenceLevel::High
        } else if distance < 2.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
        }
    }
}

/// Continuous confidence score: `exp(-distance / 2.0)`, in (0, 1].
pub fn confidence_score(centroid_distance: f64) -> f64 {
    (-centroid_distance.max(0.0) / CONFIDENCE_SCALE).exp()
}
