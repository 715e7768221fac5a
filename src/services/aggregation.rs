//! Pure projection of a pass collection into the greenie-board view.
//!
//! Everything here is synchronous and side-effect free: the same slice in,
//! the same view out. Empty input yields the empty/zero/`None` identity
//! values, never an error.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::pass::{AggregatedView, Pass, PilotBucket};

/// Comparator for ordering pilot buckets by name.
///
/// The default is case-insensitive code-point order with an exact tiebreak.
/// Embedders with locale collation tables inject their own comparator;
/// locale machinery is a presentation concern, not part of this projection.
pub fn default_pilot_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Group passes into per-pilot buckets using the default name ordering.
///
/// Pilot names match exactly: grouping is case-sensitive and the empty string
/// is a name, distinct from an unattributed (`None`) pilot. Within each
/// bucket passes are most recent first. The unattributed bucket, when
/// non-empty, is always last.
pub fn group_by_pilot(passes: &[Pass]) -> Vec<PilotBucket> {
    group_by_pilot_with(passes, default_pilot_order)
}

/// Same as [`group_by_pilot`] with a caller-supplied name comparator.
pub fn group_by_pilot_with<F>(passes: &[Pass], order: F) -> Vec<PilotBucket>
where
    F: Fn(&str, &str) -> Ordering,
{
    let mut named: HashMap<&str, Vec<Pass>> = HashMap::new();
    let mut unattributed: Vec<Pass> = Vec::new();

    for pass in passes {
        match pass.pilot.as_deref() {
            Some(pilot) => named.entry(pilot).or_default().push(pass.clone()),
            None => unattributed.push(pass.clone()),
        }
    }

    let mut buckets: Vec<PilotBucket> = named
        .into_iter()
        .map(|(pilot, passes)| PilotBucket {
            pilot: Some(pilot.to_string()),
            passes,
        })
        .collect();
    buckets.sort_by(|a, b| {
        // Both buckets are named here; the unattributed bucket is appended below
        order(
            a.pilot.as_deref().unwrap_or(""),
            b.pilot.as_deref().unwrap_or(""),
        )
    });

    if !unattributed.is_empty() {
        buckets.push(PilotBucket {
            pilot: None,
            passes: unattributed,
        });
    }

    for bucket in &mut buckets {
        sort_most_recent_first(&mut bucket.passes);
    }

    buckets
}

/// Traps over counted attempts: `trap == Some(true)` over `trap != None`.
/// `None` when nothing in the collection counts toward the rate.
pub fn boarding_rate(passes: &[Pass]) -> Option<f64> {
    let counted = passes.iter().filter(|p| p.trap.is_some()).count();
    if counted == 0 {
        return None;
    }
    let traps = passes.iter().filter(|p| p.trap == Some(true)).count();
    Some(traps as f64 / counted as f64)
}

/// Largest per-pilot bucket size, the unattributed bucket included.
pub fn max_passes_for_pilot(passes: &[Pass]) -> usize {
    let mut counts: HashMap<Option<&str>, usize> = HashMap::new();
    for pass in passes {
        *counts.entry(pass.pilot.as_deref()).or_insert(0) += 1;
    }
    counts.into_values().max().unwrap_or(0)
}

/// Distinct non-null pilot names. Unordered; presentation sorts as needed.
pub fn pilot_names(passes: &[Pass]) -> HashSet<String> {
    passes
        .iter()
        .filter_map(|p| p.pilot.clone())
        .collect()
}

impl AggregatedView {
    /// Project a pass collection into the derived view.
    pub fn project(passes: &[Pass]) -> Self {
        Self {
            passes_by_pilot: group_by_pilot(passes),
            boarding_rate: boarding_rate(passes),
            max_passes_for_pilot: max_passes_for_pilot(passes),
        }
    }
}

fn sort_most_recent_first(passes: &mut [Pass]) {
    passes.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| b.id.cmp(&a.id)));
}
