use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a factor's weighted contribution enters the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    /// Weight counts toward the denominator; contribution toward the numerator.
    Base,
    /// Adds to the numerator only.
    Bonus,
    /// Subtracts from the numerator only.
    Malus,
}

/// One independently weighted input dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Season,
    WaterTemperature,
    Depth,
    TempDepthMatch,
    DaytimeWindow,
    NightBoost,
    RainBonus,
    RainMalus,
    CloudCover,
    MoonPhase,
    WindDirection,
    WindStrength,
    Turbidity,
    PressureTrend,
}

impl Factor {
    pub fn all() -> &'static [Factor] {
        &[
            Factor::Season,
            Factor::WaterTemperature,
            Factor::Depth,
            Factor::TempDepthMatch,
            Factor::DaytimeWindow,
            Factor::NightBoost,
            Factor::RainBonus,
            Factor::RainMalus,
            Factor::CloudCover,
            Factor::MoonPhase,
            Factor::WindDirection,
            Factor::WindStrength,
            Factor::Turbidity,
            Factor::PressureTrend,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Factor::Season => "season",
            Factor::WaterTemperature => "water_temperature",
            Factor::Depth => "depth",
            Factor::TempDepthMatch => "temp_depth_match",
            Factor::DaytimeWindow => "daytime_window",
            Factor::NightBoost => "night_boost",
            Factor::RainBonus => "rain_bonus",
            Factor::RainMalus => "rain_malus",
            Factor::CloudCover => "cloud_cover",
            Factor::MoonPhase => "moon_phase",
            Factor::WindDirection => "wind_direction",
            Factor::WindStrength => "wind_strength",
            Factor::Turbidity => "turbidity",
            Factor::PressureTrend => "pressure_trend",
        }
    }

    pub fn kind(&self) -> FactorKind {
        match self {
            Factor::NightBoost | Factor::RainBonus => FactorKind::Bonus,
            Factor::RainMalus => FactorKind::Malus,
            _ => FactorKind::Base,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Factor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Factor::all()
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown factor '{}'", s))
    }
}
