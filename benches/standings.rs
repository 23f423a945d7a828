use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use fleetscore::{
    core::store::RegattaStore,
    record::{ResultDraft, ResultFlags},
    score::standings::ScoringOptions,
    series::{Championship, Competitor, Race},
    types::{RaceStatus, ResultStatus},
};

fn seeded_store(fleet: u32, races: u32) -> RegattaStore {
    let mut store = RegattaStore::new();
    for i in 0..fleet {
        store.add_competitor(Competitor {
            sail_number: format!("S{i}"),
            country_code: "INT".to_string(),
            is_verified: true,
        });
    }
    for number in 1..=races {
        store.add_race(Race {
            id: u64::from(number),
            number,
            status: RaceStatus::Finished,
            is_discardable: number != races,
        });
    }
    for number in 1..=races {
        for i in 0..fleet {
            let position = (i + number) % fleet + 1;
            let _ = store
                .insert(ResultDraft {
                    race_id: u64::from(number),
                    sail_number: format!("S{i}"),
                    position: Some(position),
                    points: f64::from(position),
                    status: ResultStatus::Finished,
                    flags: ResultFlags::default(),
                })
                .expect("insert");
        }
    }
    store
}

fn bench_inserts(c: &mut Criterion) {
    c.bench_function("store_insert_10k", |b| {
        b.iter(|| {
            let _ = seeded_store(100, 100);
        });
    });
}

fn bench_standings(c: &mut Criterion) {
    let mut group = c.benchmark_group("standings_recompute");
    let championship = Championship::low_point(20, 2);
    let options = ScoringOptions::default();

    for fleet in [20u32, 100u32, 300u32] {
        let store = seeded_store(fleet, 20);
        group.bench_with_input(BenchmarkId::from_parameter(fleet), &fleet, |b, _| {
            b.iter(|| {
                let _ = store.standings(&championship, &options).expect("standings");
            });
        });
    }

    group.finish();
}

fn bench_leaderboard(c: &mut Criterion) {
    let store = seeded_store(300, 20);
    c.bench_function("race_leaderboard_300", |b| {
        b.iter(|| {
            let _ = store.race_leaderboard(10);
        });
    });
}

criterion_group!(benches, bench_inserts, bench_standings, bench_leaderboard);
criterion_main!(benches);
