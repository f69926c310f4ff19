// =============================================================================
// Shared types used across the PairLens analysis engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Directional call for the relative-performance question "will A outperform
/// B?". Produced by the statistical signal generator, the advisory service,
/// and the conviction fusion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "FAVOR_A")]
    FavorA,
    #[serde(rename = "FAVOR_B")]
    FavorB,
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FavorA => write!(f, "FAVOR_A"),
            Self::FavorB => write!(f, "FAVOR_B"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Directional call from the technical-confirmation classifier. Kept as a
/// separate vocabulary (FAVORS_A vs FAVOR_A) because the two signal families
/// are compared, never interchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechDirection {
    #[serde(rename = "FAVORS_A")]
    FavorsA,
    #[serde(rename = "FAVORS_B")]
    FavorsB,
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

impl std::fmt::Display for TechDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FavorsA => write!(f, "FAVORS_A"),
            Self::FavorsB => write!(f, "FAVORS_B"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Trend direction of the ratio momentum, derived from the regression slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "FLAT")]
    Flat,
}

impl Default for TrendDirection {
    fn default() -> Self {
        Self::Flat
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
            Self::Flat => write!(f, "FLAT"),
        }
    }
}

/// Supported historical lookback windows for a pair analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Default for Lookback {
    fn default() -> Self {
        Self::OneYear
    }
}

impl Lookback {
    /// Parse a request-supplied lookback string. Unknown values return `None`
    /// so the caller can fall back to the default rather than erroring.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1mo" => Some(Self::OneMonth),
            "3mo" => Some(Self::ThreeMonths),
            "6mo" => Some(Self::SixMonths),
            "1y" => Some(Self::OneYear),
            "2y" => Some(Self::TwoYears),
            "5y" => Some(Self::FiveYears),
            _ => None,
        }
    }

    /// Range parameter understood by the Yahoo chart endpoint.
    pub fn as_range(&self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }

    /// Minimum overlapping trading days for a usable pair analysis. Short
    /// lookbacks get a lower floor so a fresh month of data is still
    /// analyzable.
    pub fn min_trading_days(&self) -> usize {
        match self {
            Self::OneMonth | Self::ThreeMonths => 15,
            _ => 30,
        }
    }
}

impl std::fmt::Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_range())
    }
}
