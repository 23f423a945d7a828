//! Championship configuration, competitor registry entries, and races.

use serde::{Deserialize, Serialize};

use crate::types::{RaceId, RaceStatus, ScoringSystem};

/// Series-level scoring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Championship {
    /// Number of races planned for the series. Informational only.
    pub total_races: u32,
    /// How many of a competitor's worst discardable scores are excluded.
    pub discard_count: u32,
    /// Scoring system in force.
    pub scoring_system: ScoringSystem,
}

impl Championship {
    /// Low-point configuration with the given race plan and discard allowance.
    pub fn low_point(total_races: u32, discard_count: u32) -> Self {
        Self {
            total_races,
            discard_count,
            scoring_system: ScoringSystem::LowPoint,
        }
    }
}

/// One registered racing entry.
///
/// Identity fields are immutable after registration; verification is mutated
/// by the external registration workflow, never by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    /// Sail number, the unique display identifier within a championship.
    pub sail_number: String,
    /// ISO country code of the entry.
    pub country_code: String,
    /// True once registration has been verified.
    pub is_verified: bool,
}

/// One scored contest within the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    /// Stable race identifier.
    pub id: RaceId,
    /// 1-based sequential race number; defines score-card order.
    pub number: u32,
    /// Lifecycle state. Only finished races score.
    pub status: RaceStatus,
    /// False for races (e.g. a medal final) that may never be discarded.
    pub is_discardable: bool,
}

impl Race {
    /// True when the transition `from -> to` is allowed by the race lifecycle.
    ///
    /// Scheduled races may start or be abandoned; racing may finish or be
    /// abandoned. Finished and abandoned are terminal.
    pub fn transition_allowed(from: RaceStatus, to: RaceStatus) -> bool {
        matches!(
            (from, to),
            (RaceStatus::Scheduled, RaceStatus::Racing)
                | (RaceStatus::Racing, RaceStatus::Finished)
                | (RaceStatus::Scheduled, RaceStatus::Abandoned)
                | (RaceStatus::Racing, RaceStatus::Abandoned)
        )
    }
}
