use std::collections::BTreeSet;

use proptest::prelude::*;

use fleetscore::{
    core::store::{RegattaStore, StoreError},
    record::{ResultDraft, ResultFlags, ResultPatch, ResultRecord},
    score::standings::{ScoringOptions, calculate_standings},
    series::{Championship, Competitor, Race},
    types::{RaceStatus, ResultStatus},
};

fn competitor(idx: u8) -> Competitor {
    Competitor {
        sail_number: format!("S{idx}"),
        country_code: "INT".to_string(),
        is_verified: true,
    }
}

#[derive(Debug, Clone)]
struct RacePlan {
    finished: bool,
    discardable: bool,
}

#[derive(Debug, Clone)]
struct ResultPlan {
    race_idx: u8,
    comp_idx: u8,
    points: u8,
    position: Option<u8>,
    void: bool,
}

fn regatta_strategy() -> impl Strategy<
    Value = (
        u32,              // discard count
        Vec<RacePlan>,    // races
        Vec<ResultPlan>,  // raw results, duplicates possible
    ),
> {
    (
        0u32..4,
        prop::collection::vec(
            (any::<bool>(), any::<bool>()).prop_map(|(finished, discardable)| RacePlan {
                finished,
                discardable,
            }),
            1..8,
        ),
        prop::collection::vec(
            (0u8..8, 0u8..8, 1u8..20, prop::option::of(1u8..8), any::<bool>()).prop_map(
                |(race_idx, comp_idx, points, position, void)| ResultPlan {
                    race_idx,
                    comp_idx,
                    points,
                    position,
                    void,
                },
            ),
            0..60,
        ),
    )
}

fn build_inputs(
    race_plans: &[RacePlan],
    result_plans: &[ResultPlan],
) -> (Vec<Competitor>, Vec<Race>, Vec<ResultRecord>) {
    let competitors: Vec<Competitor> = (0..8).map(competitor).collect();

    let races: Vec<Race> = race_plans
        .iter()
        .enumerate()
        .map(|(i, plan)| Race {
            id: i as u64 + 1,
            number: i as u32 + 1,
            status: if plan.finished {
                RaceStatus::Finished
            } else {
                RaceStatus::Racing
            },
            is_discardable: plan.discardable,
        })
        .collect();

    let mut seen_pairs = BTreeSet::new();
    let mut results = Vec::new();
    for plan in result_plans {
        let race_id = u64::from(plan.race_idx % race_plans.len() as u8) + 1;
        let sail = format!("S{}", plan.comp_idx);
        if !plan.void && !seen_pairs.insert((race_id, sail.clone())) {
            continue; // one live result per pair
        }
        results.push(ResultRecord {
            id: results.len() as u64 + 1,
            race_id,
            sail_number: sail,
            position: plan.position.map(u32::from),
            points: f64::from(plan.points),
            status: if plan.position.is_some() {
                ResultStatus::Finished
            } else {
                ResultStatus::Dnf
            },
            flags: ResultFlags {
                is_void: plan.void,
                protest_pending: false,
            },
        });
    }

    (competitors, races, results)
}

proptest! {
    #[test]
    fn standings_hold_scoring_invariants(
        (discard_count, race_plans, result_plans) in regatta_strategy()
    ) {
        let (competitors, races, results) = build_inputs(&race_plans, &result_plans);
        let championship = Championship::low_point(races.len() as u32, discard_count);
        let options = ScoringOptions::default();

        let standings =
            calculate_standings(&championship, &competitors, &races, &results, &options)
                .expect("low-point scoring never fails on valid refs");

        // Presence: exactly the sails with at least one scorable result.
        let mut expected = BTreeSet::new();
        for rec in &results {
            let race = &races[(rec.race_id - 1) as usize];
            if !rec.flags.is_void && race.status == RaceStatus::Finished {
                expected.insert(rec.sail_number.clone());
            }
        }
        let listed: BTreeSet<String> =
            standings.iter().map(|s| s.sail_number.clone()).collect();
        prop_assert_eq!(&listed, &expected);
        prop_assert_eq!(standings.len(), expected.len());

        // Ranks are a contiguous 1..N sequence.
        for (idx, standing) in standings.iter().enumerate() {
            prop_assert_eq!(standing.position, idx as u32 + 1);
        }

        // Net points never decrease down the table.
        for pair in standings.windows(2) {
            prop_assert!(pair[0].net_points <= pair[1].net_points);
        }

        for standing in &standings {
            // Conservation. Points are small integers, so sums are exact.
            let discard_sum: f64 = standing.discards.iter().map(|d| d.points).sum();
            prop_assert_eq!(standing.net_points, standing.total_points - discard_sum);
            let total: f64 = standing.race_scores.iter().sum();
            prop_assert_eq!(standing.total_points, total);

            // Discard bound and non-discardable protection.
            let discardable_count = results
                .iter()
                .filter(|rec| {
                    let race = &races[(rec.race_id - 1) as usize];
                    !rec.flags.is_void
                        && rec.sail_number == standing.sail_number
                        && race.status == RaceStatus::Finished
                        && race.is_discardable
                })
                .count();
            prop_assert_eq!(
                standing.discards.len(),
                discardable_count.min(discard_count as usize)
            );
            for discard in &standing.discards {
                let race = races
                    .iter()
                    .find(|r| r.number == discard.race_number)
                    .expect("discard references a known race");
                prop_assert!(race.is_discardable);
                prop_assert_eq!(race.status, RaceStatus::Finished);
            }
        }

        // Determinism, including tie-break resolution.
        let again =
            calculate_standings(&championship, &competitors, &races, &results, &options)
                .expect("recompute");
        prop_assert_eq!(
            serde_json::to_string(&standings).expect("encode"),
            serde_json::to_string(&again).expect("encode")
        );
    }
}

// Store-level counterpart: random mutation sequences keep the secondary
// indices consistent with a full scan, and a complete undo/redo pass is an
// exact roundtrip.

#[derive(Debug, Clone)]
enum Action {
    Insert { race_idx: u8, comp_idx: u8, points: u8 },
    PatchPoints { target: u8, points: u8 },
    Void { target: u8 },
    RaceStatus { race_idx: u8, to_finished: bool },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..6, 0u8..6, 1u8..20).prop_map(|(race_idx, comp_idx, points)| Action::Insert {
            race_idx,
            comp_idx,
            points,
        }),
        (0u8..24, 1u8..20).prop_map(|(target, points)| Action::PatchPoints { target, points }),
        (0u8..24).prop_map(|target| Action::Void { target }),
        (0u8..6, any::<bool>()).prop_map(|(race_idx, to_finished)| Action::RaceStatus {
            race_idx,
            to_finished,
        }),
    ]
}

fn seeded_store() -> RegattaStore {
    let mut store = RegattaStore::new();
    for i in 0..6u8 {
        store.add_competitor(competitor(i));
    }
    for i in 0..6u64 {
        store.add_race(Race {
            id: i + 1,
            number: i as u32 + 1,
            status: RaceStatus::Racing,
            is_discardable: true,
        });
    }
    store
}

fn full_scan_by_sail(store: &RegattaStore, sail: &str) -> Vec<u64> {
    store
        .ordered_ids()
        .iter()
        .copied()
        .filter(|id| store.get(*id).is_some_and(|r| r.sail_number == sail))
        .collect()
}

fn indexed_by_sail(store: &RegattaStore, sail: &str) -> Vec<u64> {
    store.by_sail(sail).into_iter().map(|r| r.id).collect()
}

fn observable_state(store: &RegattaStore) -> (Vec<ResultRecord>, Vec<RaceStatus>) {
    let records = store
        .ordered_ids()
        .iter()
        .filter_map(|id| store.get(*id).cloned())
        .collect();
    let statuses = (1..=6u64)
        .map(|id| store.race(id).expect("seeded race").status)
        .collect();
    (records, statuses)
}

proptest! {
    #[test]
    fn random_sequences_preserve_indices_and_undo_redo_roundtrip(
        actions in prop::collection::vec(action_strategy(), 1..120)
    ) {
        let mut store = seeded_store();

        for action in actions {
            match action {
                Action::Insert { race_idx, comp_idx, points } => {
                    let _ = store.insert(ResultDraft {
                        race_id: u64::from(race_idx % 6) + 1,
                        sail_number: format!("S{}", comp_idx % 6),
                        position: Some(u32::from(points % 6) + 1),
                        points: f64::from(points),
                        status: ResultStatus::Finished,
                        flags: ResultFlags::default(),
                    });
                }
                Action::PatchPoints { target, points } => {
                    let ids = store.ordered_ids().to_vec();
                    if ids.is_empty() {
                        continue;
                    }
                    let id = ids[usize::from(target) % ids.len()];
                    let _ = store.patch(
                        id,
                        ResultPatch {
                            points: Some(f64::from(points)),
                            ..ResultPatch::default()
                        },
                    );
                }
                Action::Void { target } => {
                    let ids = store.ordered_ids().to_vec();
                    if ids.is_empty() {
                        continue;
                    }
                    let id = ids[usize::from(target) % ids.len()];
                    let _ = store.void(id);
                }
                Action::RaceStatus { race_idx, to_finished } => {
                    let id = u64::from(race_idx % 6) + 1;
                    let to = if to_finished {
                        RaceStatus::Finished
                    } else {
                        RaceStatus::Abandoned
                    };
                    let _ = store.set_race_status(id, to);
                }
            }

            for i in 0..6u8 {
                let sail = format!("S{i}");
                prop_assert_eq!(indexed_by_sail(&store, &sail), full_scan_by_sail(&store, &sail));
            }
        }

        let target = observable_state(&store);
        loop {
            match store.undo() {
                Ok(_) => {}
                Err(StoreError::NothingToUndo) => break,
                Err(other) => prop_assert!(false, "unexpected undo error: {other:?}"),
            }
        }

        loop {
            match store.redo() {
                Ok(_) => {}
                Err(StoreError::NothingToRedo) => break,
                Err(other) => prop_assert!(false, "unexpected redo error: {other:?}"),
            }
        }

        prop_assert_eq!(observable_state(&store), target);
    }
}
