//! Candidate selection for one query: the admissibility scan over the
//! existing representatives, and the optional pre-filter that ranks and
//! trims them.

use super::config::ClusterConfig;
use super::error::EngineError;
use super::score::{mean_length, ScoreBounds, SHORT_PAIR_MEAN_LEN};
use super::state::ClusterState;
use crate::core::align::{AlignParams, StructureAligner};
use crate::core::models::store::StructureStore;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Representatives the query could possibly join, newest cluster first.
///
/// The newest-first order is a length-locality heuristic: recently
/// founded clusters have seed lengths closest to the query, so they are
/// the most likely hits when no pre-filter reorders the list.
pub(crate) fn admissible_representatives(
    store: &StructureStore,
    state: &ClusterState,
    query: usize,
    config: &ClusterConfig,
) -> Vec<usize> {
    let q = store.chain(query);
    state
        .representatives()
        .iter()
        .rev()
        .copied()
        .filter(|&rep| {
            let r = store.chain(rep);
            q.mol.sign() * r.mol.sign() >= 0
                && config
                    .score_mode
                    .admits(q.len(), r.len(), config.tm_cutoff)
        })
        .collect()
}

/// Builds the final candidate list for one query.
///
/// Without the pre-filter this is the admissible list itself. With it,
/// every admissible representative is scored by the cheap alignment,
/// kept if it clears the per-pair bound (or the pair is small), and the
/// survivors are ranked best-first and truncated to a length-dependent
/// budget.
pub(crate) fn select_candidates<A: StructureAligner>(
    aligner: &A,
    store: &StructureStore,
    state: &ClusterState,
    query: usize,
    config: &ClusterConfig,
) -> Result<Vec<usize>, EngineError> {
    let admissible = admissible_representatives(store, state, query, config);
    if !config.prefilter || admissible.is_empty() {
        return Ok(admissible);
    }

    let q = store.chain(query);
    let query_view = q.view().ok_or_else(|| {
        EngineError::Internal(format!("query '{}' has no residue data", q.id))
    })?;
    let query_len = q.len();
    let hint_set = config.hints.co_clustered(&q.id);

    let mut scored: Vec<(f64, usize)> = Vec::new();
    let mut hinted_found = 0usize;

    for &rep in &admissible {
        let r = store.chain(rep);

        // Once enough hinted representatives are ranked, stop paying
        // for un-hinted ones.
        if let Some(set) = hint_set {
            if hinted_found >= 2 && scored.len() >= set.len() && !set.contains(r.id.as_str()) {
                continue;
            }
        }

        let rep_view = r.view().ok_or_else(|| {
            EngineError::Internal(format!("representative '{}' has no residue data", r.id))
        })?;
        let mol_sum = q.mol.sign() + r.mol.sign();
        let bounds = ScoreBounds::for_pair(config.tm_cutoff, config.score_mode, mol_sum);
        let params = AlignParams {
            mol_sum,
            tm_cutoff: config.tm_cutoff,
            length_norm: config.score_mode.length_norm(),
        };

        let pair = aligner
            .hw_rmsd(query_view, rep_view, &params)
            .map_err(|source| EngineError::Alignment {
                query: q.id.clone(),
                candidate: r.id.clone(),
                source,
            })?;
        let tm = config.score_mode.combine(pair);
        trace!(query = %q.id, representative = %r.id, tm, "pre-filter score");

        if tm >= bounds.lb_prefilter || mean_length(query_len, r.len()) <= SHORT_PAIR_MEAN_LEN {
            match hint_set {
                Some(set) if set.contains(r.id.as_str()) => {
                    // Hinted representatives sort ahead of every
                    // un-hinted score.
                    scored.push((tm + 1.0, rep));
                    hinted_found += 1;
                    if hinted_found == set.len() {
                        break;
                    }
                }
                _ => scored.push((tm, rep)),
            }
        }

        // A score this high guarantees a hit downstream; no point
        // ranking further.
        if tm >= bounds.ub_prefilter {
            break;
        }
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let budget = representative_budget(query_len);
    let mut selected = Vec::with_capacity(scored.len().min(budget));
    for (tm, rep) in scored {
        if selected.len() >= budget
            && mean_length(query_len, store.chain(rep).len()) > SHORT_PAIR_MEAN_LEN
            && tm < 0.5 * config.tm_cutoff
        {
            break;
        }
        selected.push(rep);
    }
    debug!(
        query = %q.id,
        admissible = admissible.len(),
        ranked = selected.len(),
        "pre-filter candidate selection"
    );
    Ok(selected)
}

/// Candidate budget after ranking: generous for short queries, sliding
/// down to a small constant for long ones.
fn representative_budget(query_len: usize) -> usize {
    const MIN_BUDGET: usize = 10;
    const MAX_BUDGET: usize = 50;
    if query_len as f64 <= SHORT_PAIR_MEAN_LEN {
        MAX_BUDGET
    } else if query_len as f64 >= 1000.0 {
        MIN_BUDGET
    } else {
        MIN_BUDGET
            + ((1000.0 - query_len as f64) / (1000.0 - SHORT_PAIR_MEAN_LEN)
                * (MAX_BUDGET - MIN_BUDGET) as f64) as usize
    }
}
