//! Low-point series standings.
//!
//! A stateless transform from (championship config, competitors, races,
//! results) to ranked standings. No I/O, no retained references; callers may
//! invoke it concurrently over shared snapshots.
//!
//! Deterministic rules where the sailing instructions leave room:
//! - equally-bad discardable scores discard the later race number first;
//! - exact net-point ties cascade through discards used, then the
//!   finishing-place ladder (more firsts, then more seconds, ...), then
//!   lexicographic sail number;
//! - every entry receives a unique rank, ties included.

use std::cmp::Ordering;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::{
    record::ResultRecord,
    series::{Championship, Competitor, Race},
    types::{RaceId, RaceStatus, ResultId, ScoringSystem},
};

/// Errors surfaced by the standings computation.
///
/// Configuration problems fail before any scoring work; reference problems
/// only fail under [`ScoringOptions::strict_refs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// The championship names a scoring system this engine does not implement.
    UnsupportedSystem(ScoringSystem),
    /// A result references a race id that was not supplied.
    UnknownRace {
        /// Offending result.
        result_id: ResultId,
        /// Race id with no match.
        race_id: RaceId,
    },
    /// A result references a sail number with no registered competitor.
    UnknownCompetitor {
        /// Offending result.
        result_id: ResultId,
        /// Sail number with no match.
        sail_number: String,
    },
}

/// Caller-selected strictness for dangling references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringOptions {
    /// When true, a result referencing an unknown race or competitor fails
    /// the whole computation. When false (default), unknown races drop the
    /// result and unknown competitors score under the sail number alone.
    pub strict_refs: bool,
}

/// One excluded race score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscardedScore {
    /// Race number whose score was excluded.
    pub race_number: u32,
    /// Point value excluded from the net total.
    pub points: f64,
}

/// Per-competitor computed series result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStanding {
    /// Final rank, 1-based and unique within one computation.
    pub position: u32,
    /// Competitor sail number.
    pub sail_number: String,
    /// The competitor's score card: points per scored race, race-number order.
    pub race_scores: Vec<f64>,
    /// Sum of all score-card points.
    pub total_points: f64,
    /// Excluded scores, race-number order.
    pub discards: Vec<DiscardedScore>,
    /// Total minus discarded points; the value standings are ranked by.
    pub net_points: f64,
}

struct Tally {
    standing: SeriesStanding,
    // places[i] = count of finishes at position i + 1
    places: Vec<u32>,
}

/// Computes ranked series standings under low-point scoring.
///
/// Only results of finished races score; voided results never score. Every
/// competitor with at least one scorable result appears exactly once in the
/// output, ranked ascending by net points with the deterministic tie-break
/// cascade described at module level. Empty input yields an empty list.
pub fn calculate_standings(
    championship: &Championship,
    competitors: &[Competitor],
    races: &[Race],
    results: &[ResultRecord],
    options: &ScoringOptions,
) -> Result<Vec<SeriesStanding>, ScoringError> {
    if championship.scoring_system != ScoringSystem::LowPoint {
        return Err(ScoringError::UnsupportedSystem(championship.scoring_system));
    }

    let races_by_id: HashMap<RaceId, &Race> = races.iter().map(|r| (r.id, r)).collect();
    let known_sails: HashSet<&str> = competitors
        .iter()
        .map(|c| c.sail_number.as_str())
        .collect();

    let mut by_sail: HashMap<&str, Vec<(&Race, &ResultRecord)>> = HashMap::new();

    for rec in results {
        if rec.flags.is_void {
            continue;
        }

        let Some(race) = races_by_id.get(&rec.race_id).copied() else {
            if options.strict_refs {
                return Err(ScoringError::UnknownRace {
                    result_id: rec.id,
                    race_id: rec.race_id,
                });
            }
            continue;
        };

        if race.status != RaceStatus::Finished {
            continue;
        }

        if options.strict_refs && !known_sails.contains(rec.sail_number.as_str()) {
            return Err(ScoringError::UnknownCompetitor {
                result_id: rec.id,
                sail_number: rec.sail_number.clone(),
            });
        }

        by_sail
            .entry(rec.sail_number.as_str())
            .or_default()
            .push((race, rec));
    }

    let mut tallies: Vec<Tally> = by_sail
        .into_iter()
        .map(|(sail, card)| score_card(championship, sail, card))
        .collect();

    tallies.sort_by(compare_tallies);

    Ok(tallies
        .into_iter()
        .enumerate()
        .map(|(idx, tally)| SeriesStanding {
            position: idx as u32 + 1,
            ..tally.standing
        })
        .collect())
}

fn score_card(championship: &Championship, sail: &str, mut card: Vec<(&Race, &ResultRecord)>) -> Tally {
    // Race number defines score-card order; ids disambiguate bad data.
    card.sort_by_key(|(race, rec)| (race.number, race.id, rec.id));

    let race_scores: Vec<f64> = card.iter().map(|(_, rec)| rec.points).collect();
    let total_points: f64 = race_scores.iter().sum();

    let mut candidates: Vec<DiscardedScore> = card
        .iter()
        .filter(|(race, _)| race.is_discardable)
        .map(|(race, rec)| DiscardedScore {
            race_number: race.number,
            points: rec.points,
        })
        .collect();
    // Worst score first; equal scores drop the later race.
    candidates.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| b.race_number.cmp(&a.race_number))
    });
    candidates.truncate(championship.discard_count as usize);

    let discard_sum: f64 = candidates.iter().map(|d| d.points).sum();
    let net_points = total_points - discard_sum;

    let mut discards = candidates;
    discards.sort_by_key(|d| d.race_number);

    let mut places: Vec<u32> = Vec::new();
    for (_, rec) in &card {
        if !rec.status.is_finisher() {
            continue;
        }
        let Some(position) = rec.position else {
            continue;
        };
        if position == 0 {
            continue;
        }
        let idx = position as usize - 1;
        if places.len() <= idx {
            places.resize(idx + 1, 0);
        }
        places[idx] += 1;
    }

    Tally {
        standing: SeriesStanding {
            position: 0,
            sail_number: sail.to_string(),
            race_scores,
            total_points,
            discards,
            net_points,
        },
        places,
    }
}

fn compare_tallies(a: &Tally, b: &Tally) -> Ordering {
    a.standing
        .net_points
        .total_cmp(&b.standing.net_points)
        .then_with(|| a.standing.discards.len().cmp(&b.standing.discards.len()))
        .then_with(|| compare_place_ladder(&a.places, &b.places))
        .then_with(|| a.standing.sail_number.cmp(&b.standing.sail_number))
}

// More firsts ranks ahead; then more seconds, and so on up the ladder.
fn compare_place_ladder(a: &[u32], b: &[u32]) -> Ordering {
    let rungs = a.len().max(b.len());
    for i in 0..rungs {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        match bv.cmp(&av) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}
