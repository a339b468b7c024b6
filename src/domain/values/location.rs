use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationCategory {
    Urban,
    Suburban,
    Rural,
}

impl LocationCategory {
    /// Ordinal code used by the segment feature encoder.
    pub fn encoding(&self) -> f64 {
        match self {
            LocationCategory::Urban => 0.0,
            LocationCategory::Suburban => 1.0,
            LocationCategory::Rural => 2.0,
        }
    }

    /// Lenient parse for request ingress: unknown values map to the
    /// Urban sentinel instead of failing the request.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(value = s, "unknown location category, defaulting to Urban");
            LocationCategory::Urban
        })
    }
}

impl fmt::Display for LocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationCategory::Urban => write!(f, "Urban"),
            LocationCategory::Suburban => write!(f, "Suburban"),
            LocationCategory::Rural => write!(f, "Rural"),
        }
    }
}

impl FromStr for LocationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "urban" => Ok(LocationCategory::Urban),
            "suburban" => Ok(LocationCategory::Suburban),
            "rural" => Ok(LocationCategory::Rural),
            _ => Err(format!("Unknown location category: {s}")),
        }
    }
}
