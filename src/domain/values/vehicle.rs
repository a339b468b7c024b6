use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Economy,
    Premium,
}

impl VehicleType {
    pub fn encoding(&self) -> f64 {
        match self {
            VehicleType::Economy => 0.0,
            VehicleType::Premium => 1.0,
        }
    }

    /// Lenient parse for request ingress: unknown values map to the
    /// Economy sentinel instead of failing the request.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(value = s, "unknown vehicle type, defaulting to Economy");
            VehicleType::Economy
        })
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleType::Economy => write!(f, "Economy"),
            VehicleType::Premium => write!(f, "Premium"),
        }
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "economy" => Ok(VehicleType::Economy),
            "premium" => Ok(VehicleType::Premium),
            _ => Err(format!("Unknown vehicle type: {s}")),
        }
    }
}
