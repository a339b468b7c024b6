use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingTime {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl BookingTime {
    pub fn encoding(&self) -> f64 {
        match self {
            BookingTime::Morning => 0.0,
            BookingTime::Afternoon => 1.0,
            BookingTime::Evening => 2.0,
            BookingTime::Night => 3.0,
        }
    }

    /// Peak/Standard binning used for segment labels. Morning and Evening
    /// are commute windows; the mapping is fixed because segment names
    /// depend on it staying stable across fits.
    pub fn is_peak(&self) -> bool {
        matches!(self, BookingTime::Morning | BookingTime::Evening)
    }

    /// Lenient parse for request ingress: unknown values map to the
    /// Afternoon sentinel instead of failing the request.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(value = s, "unknown booking time, defaulting to Afternoon");
            BookingTime::Afternoon
        })
    }
}

impl fmt::Display for BookingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingTime::Morning => write!(f, "Morning"),
            BookingTime::Afternoon => write!(f, "Afternoon"),
            BookingTime::Evening => write!(f, "Evening"),
            BookingTime::Night => write!(f, "Night"),
        }
    }
}

impl FromStr for BookingTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(BookingTime::Morning),
            "afternoon" => Ok(BookingTime::Afternoon),
            "evening" => Ok(BookingTime::Evening),
            "night" => Ok(BookingTime::Night),
            _ => Err(format!("Unknown booking time: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_binning() {
        assert!(BookingTime::Morning.is_peak());
        assert!(BookingTime::Evening.is_peak());
        assert!(!BookingTime::Afternoon.is_peak());
        assert!(!BookingTime::Night.is_peak());
    }
}
