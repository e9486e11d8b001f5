//! Public clustering workflow: validates the configuration and runs the
//! greedy length-ordered scan over a loaded structure store.

use crate::core::align::StructureAligner;
use crate::core::models::store::StructureStore;
use crate::engine::config::ClusterConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ScanObserver;
use crate::engine::scan::run_scan;
use crate::engine::state::Clustering;
use tracing::{info, instrument};

#[instrument(skip_all, name = "cluster_workflow")]
pub fn run<A: StructureAligner + Sync>(
    store: &mut StructureStore,
    aligner: &A,
    config: &ClusterConfig,
    observer: &dyn ScanObserver,
) -> Result<Clustering, EngineError> {
    config.validate()?;

    info!(
        chains = store.len(),
        cutoff = config.tm_cutoff,
        score_mode = config.score_mode.index(),
        threads = config.threads,
        "starting greedy structural clustering"
    );

    let clustering = run_scan(store, aligner, config, observer)?;

    info!(clusters = clustering.len(), "clustering complete");
    Ok(clustering)
}
