pub mod factor;
pub mod profile;
pub mod result;
pub mod snapshot;

pub use factor::{Factor, FactorKind};
pub use profile::{
    BearingPreference, ClosedSeasonSpan, IdealRange, PreferredWindow, SeasonalRanges,
    SpeciesProfile, TurbidityPreference, WindowAnchor,
};
pub use result::{FactorOutcome, OptimalWindow, ScoreResult, WindowSource};
pub use snapshot::{EnvironmentSnapshot, PressureTrend, Season, Turbidity};
