//! The greedy clustering scan.
//!
//! Chains are visited longest-first; the head chain seeds the first
//! cluster and each subsequent chain either joins the cluster of the
//! first representative it matches or founds a new one. Previously
//! assigned members are never revisited.

use super::candidates::select_candidates;
use super::config::ClusterConfig;
use super::dispatch::dispatch;
use super::error::EngineError;
use super::progress::{Placement, ScanObserver};
use super::state::{ClusterState, Clustering};
use crate::core::align::StructureAligner;
use crate::core::models::store::StructureStore;
use tracing::{debug, info};

/// Chains at or below this length are undefined inputs for the
/// alignment kernel and always form singleton clusters.
pub const DEGENERATE_LEN: usize = 5;

pub fn run_scan<A: StructureAligner + Sync>(
    store: &mut StructureStore,
    aligner: &A,
    config: &ClusterConfig,
    observer: &dyn ScanObserver,
) -> Result<Clustering, EngineError> {
    if store.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let order = store.length_index();
    let mut state = ClusterState::new(store.len());

    let seed = order[0];
    state.new_cluster(seed);
    info!(
        chain = %store.chain(seed).id,
        residues = store.chain(seed).len(),
        "seeded first cluster with the longest chain"
    );

    observer.scan_started((order.len() - 1) as u64);

    for &query in &order[1..] {
        let record = store.chain(query);
        if record.len() <= DEGENERATE_LEN {
            debug!(chain = %record.id, residues = record.len(), "too short to align, promoting to singleton");
            state.new_cluster(query);
            observer.chain_placed(Placement::Founded);
            continue;
        }

        let candidates = select_candidates(aligner, store, &state, query, config)?;
        debug!(
            chain = %record.id,
            residues = record.len(),
            candidates = candidates.len(),
            clusters = state.cluster_count(),
            "testing candidate representatives"
        );

        match dispatch(aligner, store, &state, query, &candidates, config)? {
            Some(cluster) => {
                state.assign(query, cluster);
                // Members are never aligned again; free their arrays.
                store.release_residues(query);
                observer.chain_placed(Placement::Joined);
            }
            None => {
                state.new_cluster(query);
                observer.chain_placed(Placement::Founded);
            }
        }
    }

    let clustering = state.into_clustering();
    observer.scan_finished(clustering.len());
    info!(
        chains = store.len(),
        clusters = clustering.len(),
        "scan finished"
    );
    Ok(clustering)
}
