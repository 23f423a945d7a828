//! Per-race leaderboards and competitor score cards.

use std::cmp::Ordering;

use hashbrown::HashMap;

use crate::{
    record::ResultRecord,
    series::Race,
    types::RaceId,
};

/// Orders one race's results for display.
///
/// Finishers come first, position ascending; non-finishers follow, ordered by
/// status severity, then points ascending, then sail number. Voided results
/// are dropped. Pure filter and sort; inputs are untouched.
pub fn race_leaderboard(race_id: RaceId, results: &[ResultRecord]) -> Vec<ResultRecord> {
    let mut rows: Vec<ResultRecord> = results
        .iter()
        .filter(|rec| rec.race_id == race_id && !rec.flags.is_void)
        .cloned()
        .collect();

    rows.sort_by(|a, b| match (a.position, b.position) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.sail_number.cmp(&b.sail_number)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .status
            .severity()
            .cmp(&b.status.severity())
            .then_with(|| a.points.total_cmp(&b.points))
            .then_with(|| a.sail_number.cmp(&b.sail_number)),
    });

    rows
}

/// One competitor's results in race-number order.
///
/// Voided results are dropped; results referencing a race not in `races`
/// sort last, by race id. Pure filter and sort.
pub fn competitor_results(
    sail_number: &str,
    races: &[Race],
    results: &[ResultRecord],
) -> Vec<ResultRecord> {
    let numbers: HashMap<RaceId, u32> = races.iter().map(|r| (r.id, r.number)).collect();

    let mut rows: Vec<ResultRecord> = results
        .iter()
        .filter(|rec| rec.sail_number == sail_number && !rec.flags.is_void)
        .cloned()
        .collect();

    rows.sort_by_key(|rec| {
        (
            numbers.get(&rec.race_id).copied().unwrap_or(u32::MAX),
            rec.race_id,
            rec.id,
        )
    });

    rows
}
