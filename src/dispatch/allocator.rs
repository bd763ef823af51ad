//! Load-fairness allocation
//!
//! Round-robin with capacity weighting: each candidate's priority value
//! is (occurrences within the rolling window + 1) / configured rate, and
//! the minimum wins. Destinations with a higher rate absorb more load
//! before their priority value grows; recently assigned destinations are
//! deprioritized by their occurrence count.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::directory::AllocationEntry;
use crate::rank::Rank;
use crate::store::AllocationHistory;
use crate::ticket::UnitId;

use super::decision::{Allocation, CandidateLoad};

/// Select the least-loaded candidate from the pool.
///
/// Candidates are weighed in enumeration order; ties on the priority
/// value keep the first-seen candidate, making the result deterministic
/// for a fixed pool order. Returns `None` for an empty pool. Entries with
/// a non-positive rate must be filtered out by the pool lookup; they are
/// skipped here as a final guard.
pub fn allocate(
    pool: &[&AllocationEntry],
    origins: &[UnitId],
    rank: Rank,
    window_start: DateTime<Utc>,
    history: &dyn AllocationHistory,
) -> Option<Allocation> {
    let mut loads: Vec<CandidateLoad> = Vec::with_capacity(pool.len());

    for entry in pool {
        let rate = entry.rate_for(rank);
        if rate <= 0.0 {
            continue;
        }
        let occurrences =
            history.count_since(entry.destination.unit, origins, rank, window_start);
        let priority = (occurrences + 1) as f64 / rate;
        loads.push(CandidateLoad {
            unit: entry.destination.unit,
            destination: entry.destination,
            occurrences,
            rate,
            priority,
        });
    }

    // Strict-less comparison keeps the first-enumerated candidate on ties.
    let mut winner: Option<&CandidateLoad> = None;
    for load in &loads {
        let beats = winner.map(|w| load.priority < w.priority).unwrap_or(true);
        if beats {
            winner = Some(load);
        }
    }
    let winner = winner?.clone();

    // Audit list ordered by ascending priority; the sort is stable so
    // equal-priority candidates keep their enumeration order.
    loads.sort_by(|a, b| a.priority.total_cmp(&b.priority));

    debug!(
        rank = %rank,
        winner = %winner.unit.0,
        occurrences = winner.occurrences,
        priority = winner.priority,
        candidates = loads.len(),
        "allocation selected"
    );

    Some(Allocation {
        winner,
        audit: loads,
    })
}
