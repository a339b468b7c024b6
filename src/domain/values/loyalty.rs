use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub fn encoding(&self) -> f64 {
        match self {
            LoyaltyTier::Bronze => 0.0,
            LoyaltyTier::Silver => 1.0,
            LoyaltyTier::Gold => 2.0,
            LoyaltyTier::Platinum => 3.0,
        }
    }

    /// Lenient parse for request ingress: unknown tiers map to the
    /// Bronze sentinel instead of failing the request.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(value = s, "unknown loyalty tier, defaulting to Bronze");
            LoyaltyTier::Bronze
        })
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoyaltyTier::Bronze => write!(f, "Bronze"),
            LoyaltyTier::Silver => write!(f, "Silver"),
            LoyaltyTier::Gold => write!(f, "Gold"),
            LoyaltyTier::Platinum => write!(f, "Platinum"),
        }
    }
}

impl FromStr for LoyaltyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bronze" => Ok(LoyaltyTier::Bronze),
            // Legacy tier name from before the bronze/silver/gold/platinum scheme.
            "regular" => Ok(LoyaltyTier::Bronze),
            "silver" => Ok(LoyaltyTier::Silver),
            "gold" => Ok(LoyaltyTier::Gold),
            "platinum" => Ok(LoyaltyTier::Platinum),
            _ => Err(format!("Unknown loyalty tier: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_regular_maps_to_bronze() {
        assert_eq!("Regular".parse::<LoyaltyTier>(), Ok(LoyaltyTier::Bronze));
        assert_eq!("regular".parse::<LoyaltyTier>(), Ok(LoyaltyTier::Bronze));
    }

    #[test]
    fn test_lenient_parse_falls_back_to_bronze() {
        assert_eq!(LoyaltyTier::parse_lenient("Diamond"), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::parse_lenient("Platinum"), LoyaltyTier::Platinum);
    }
}
