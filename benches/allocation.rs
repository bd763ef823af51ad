//! Benchmark for the load-fairness allocator over growing pools.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use triage::dispatch::allocate;
use triage::directory::AllocationEntry;
use triage::rank::{Rank, RankMask};
use triage::store::AllocationHistory;
use triage::ticket::{OrgPath, ProfileId, UnitId};
use uuid::Uuid;

struct FixedHistory(HashMap<UnitId, u64>);

impl AllocationHistory for FixedHistory {
    fn count_since(
        &self,
        destination: UnitId,
        _origins: &[UnitId],
        _rank: Rank,
        _since: DateTime<Utc>,
    ) -> u64 {
        self.0.get(&destination).copied().unwrap_or(0)
    }
}

fn make_pool(size: usize) -> (Vec<AllocationEntry>, FixedHistory) {
    let entries: Vec<AllocationEntry> = (0..size)
        .map(|i| {
            let id = UnitId(Uuid::from_u128(i as u128 + 1));
            AllocationEntry {
                profile: ProfileId(Uuid::from_u128(0xFF)),
                destination: OrgPath {
                    company: id,
                    division: id,
                    section: id,
                    unit: id,
                },
                rate_a: (i % 5 + 1) as f64,
                rate: (i % 3 + 1) as f64,
                third_party: false,
                collab_line: false,
                normal_mask: RankMask::all(),
            }
        })
        .collect();
    let history = FixedHistory(
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.destination.unit, (i * 7 % 23) as u64))
            .collect(),
    );
    (entries, history)
}

fn bench_allocate(c: &mut Criterion) {
    let window = Utc.with_ymd_and_hms(2024, 6, 9, 15, 0, 0).unwrap();
    let mut group = c.benchmark_group("allocate");

    for size in [4, 16, 64] {
        let (entries, history) = make_pool(size);
        let pool: Vec<&AllocationEntry> = entries.iter().collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                black_box(allocate(
                    black_box(&pool),
                    &[],
                    Rank::B,
                    window,
                    &history,
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_allocate);
criterion_main!(benches);
