//! Racing dispatcher: runs the two-tier protocol for one query's
//! candidates across a worker pool, stopping everything as soon as one
//! worker confirms a hit.

use super::config::ClusterConfig;
use super::error::EngineError;
use super::state::ClusterState;
use super::worker::{align_pair, PairVerdict};
use crate::core::align::StructureAligner;
use crate::core::models::chain::ChainView;
use crate::core::models::store::StructureStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

#[derive(Debug, Default)]
struct Outcome {
    winner: Option<usize>,
    error: Option<EngineError>,
}

/// Races the candidates and returns the winning cluster id, if any.
///
/// Candidates are dealt round-robin to at most `config.threads`
/// workers, so one worker walks the list in its given (ranked) order.
/// Workers poll a shared cancellation flag between candidates; the
/// first hit takes the mutex, re-checks the flag, commits the cluster
/// id and raises the flag. Alignment failure commits an error the same
/// way and cancels the peers. All workers are joined before returning.
pub(crate) fn dispatch<A: StructureAligner + Sync>(
    aligner: &A,
    store: &StructureStore,
    state: &ClusterState,
    query: usize,
    candidates: &[usize],
    config: &ClusterConfig,
) -> Result<Option<usize>, EngineError> {
    if candidates.is_empty() {
        return Ok(None);
    }
    let query_record = store.chain(query);
    let query_view = query_record.view().ok_or_else(|| {
        EngineError::Internal(format!("query '{}' has no residue data", query_record.id))
    })?;

    let worker_count = config.threads.max(1).min(candidates.len());
    let mut slices: Vec<Vec<usize>> = vec![Vec::new(); worker_count];
    for (k, &candidate) in candidates.iter().enumerate() {
        slices[k % worker_count].push(candidate);
    }

    let cancelled = AtomicBool::new(false);
    let outcome = Mutex::new(Outcome::default());

    thread::scope(|scope| {
        for slice in &slices {
            let slice = slice.as_slice();
            let cancelled = &cancelled;
            let outcome = &outcome;
            scope.spawn(move || {
                run_worker(
                    aligner, store, state, query_view, slice, config, cancelled, outcome,
                );
            });
        }
    });

    let outcome = outcome
        .into_inner()
        .map_err(|_| EngineError::Internal("dispatcher result mutex poisoned".to_string()))?;
    match outcome.error {
        Some(error) => Err(error),
        None => Ok(outcome.winner),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_worker<A: StructureAligner>(
    aligner: &A,
    store: &StructureStore,
    state: &ClusterState,
    query_view: ChainView<'_>,
    slice: &[usize],
    config: &ClusterConfig,
    cancelled: &AtomicBool,
    outcome: &Mutex<Outcome>,
) {
    for &candidate in slice {
        // Cooperative cancellation, observed between candidates only.
        if cancelled.load(Ordering::Relaxed) {
            return;
        }

        match align_pair(aligner, store, query_view, candidate, config) {
            Ok(PairVerdict::Miss) => continue,
            Ok(PairVerdict::Hit) => {
                let Ok(mut guard) = outcome.lock() else { return };
                // The relaxed flag is safe here: the mutex orders the
                // commit against every later lock-and-load.
                if !cancelled.load(Ordering::Relaxed) {
                    match state.cluster_of_representative(candidate) {
                        Some(cluster) => guard.winner = Some(cluster),
                        None => {
                            guard.error = Some(EngineError::Internal(format!(
                                "candidate '{}' is not a representative",
                                store.chain(candidate).id
                            )))
                        }
                    }
                    cancelled.store(true, Ordering::Relaxed);
                }
                return;
            }
            Err(error) => {
                let Ok(mut guard) = outcome.lock() else { return };
                if guard.error.is_none() {
                    guard.error = Some(error);
                }
                cancelled.store(true, Ordering::Relaxed);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{protein, store_of, ScriptedAligner};

    fn config_with_threads(threads: usize) -> ClusterConfig {
        ClusterConfig {
            threads,
            ..ClusterConfig::default()
        }
    }

    fn two_rep_setup() -> (StructureStore, ClusterState) {
        let store = store_of(vec![
            protein("r0", 120),
            protein("r1", 120),
            protein("q", 110),
        ]);
        let mut state = ClusterState::new(store.len());
        state.new_cluster(0);
        state.new_cluster(1);
        (store, state)
    }

    #[test]
    fn empty_candidate_list_reports_no_hit() {
        let (store, state) = two_rep_setup();
        let aligner = ScriptedAligner::new(0.9);
        let result = dispatch(&aligner, &store, &state, 2, &[], &config_with_threads(4)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn all_misses_report_no_hit_for_any_worker_count() {
        for threads in [1, 2, 8] {
            let (store, state) = two_rep_setup();
            let aligner = ScriptedAligner::new(0.2);
            let result = dispatch(
                &aligner,
                &store,
                &state,
                2,
                &[0, 1],
                &config_with_threads(threads),
            )
            .unwrap();
            assert_eq!(result, None, "threads = {threads}");
        }
    }

    #[test]
    fn unique_hit_wins_for_any_worker_count() {
        for threads in [1, 2, 8] {
            let (store, state) = two_rep_setup();
            let aligner = ScriptedAligner::new(0.2).with_score("q", "r1", 0.9);
            let result = dispatch(
                &aligner,
                &store,
                &state,
                2,
                &[0, 1],
                &config_with_threads(threads),
            )
            .unwrap();
            assert_eq!(result, Some(1), "threads = {threads}");
        }
    }

    #[test]
    fn serial_dispatch_takes_the_first_hit_in_rank_order() {
        let (store, state) = two_rep_setup();
        let aligner = ScriptedAligner::new(0.9);
        // Both candidates would hit; with one worker the list order
        // decides.
        let result = dispatch(&aligner, &store, &state, 2, &[1, 0], &config_with_threads(1))
            .unwrap();
        assert_eq!(result, Some(1));
    }

    #[test]
    fn racing_workers_return_some_winning_candidate() {
        let (store, state) = two_rep_setup();
        let aligner = ScriptedAligner::new(0.9);
        let result = dispatch(&aligner, &store, &state, 2, &[0, 1], &config_with_threads(8))
            .unwrap();
        assert!(matches!(result, Some(0) | Some(1)));
    }

    #[test]
    fn alignment_failure_aborts_the_dispatch() {
        for threads in [1, 4] {
            let (store, state) = two_rep_setup();
            let aligner = ScriptedAligner::new(0.2).with_failure("q", "r0");
            let result = dispatch(
                &aligner,
                &store,
                &state,
                2,
                &[0, 1],
                &config_with_threads(threads),
            );
            assert!(
                matches!(result, Err(EngineError::Alignment { .. })),
                "threads = {threads}"
            );
        }
    }

    #[test]
    fn more_workers_than_candidates_is_fine() {
        let (store, state) = two_rep_setup();
        let aligner = ScriptedAligner::new(0.9);
        let result = dispatch(&aligner, &store, &state, 2, &[0], &config_with_threads(16))
            .unwrap();
        assert_eq!(result, Some(0));
    }
}
