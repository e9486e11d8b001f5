//! The two-tier alignment protocol for one (query, candidate) pair.

use super::config::ClusterConfig;
use super::error::EngineError;
use super::score::{mean_length, ScoreBounds, LONG_PAIR_MEAN_LEN};
use crate::core::align::{AlignError, AlignParams, StructureAligner};
use crate::core::models::chain::ChainView;
use crate::core::models::store::StructureStore;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairVerdict {
    Hit,
    Miss,
}

/// Runs the two-tier protocol: a first alignment (fast when forced or
/// when the pair is large) whose score can confirm a hit or a miss
/// outright, and a precise second alignment adjudicating the
/// intermediate band.
pub(crate) fn align_pair<A: StructureAligner>(
    aligner: &A,
    store: &StructureStore,
    query_view: ChainView<'_>,
    candidate: usize,
    config: &ClusterConfig,
) -> Result<PairVerdict, EngineError> {
    let record = store.chain(candidate);
    let candidate_view = record.view().ok_or_else(|| {
        EngineError::Internal(format!("representative '{}' has no residue data", record.id))
    })?;

    let mol_sum = query_view.mol.sign() + candidate_view.mol.sign();
    let bounds = ScoreBounds::for_pair(config.tm_cutoff, config.score_mode, mol_sum);
    let params = AlignParams {
        mol_sum,
        tm_cutoff: config.tm_cutoff,
        length_norm: config.score_mode.length_norm(),
    };

    let tier1_fast = config.fast
        || mean_length(query_view.len(), candidate_view.len()) >= LONG_PAIR_MEAN_LEN;

    let pair = aligner
        .tm_align(query_view, candidate_view, &params, tier1_fast)
        .map_err(|source| alignment_error(&query_view, &candidate_view, source))?;
    let tm = config.score_mode.combine(pair);
    trace!(
        query = %query_view.id,
        candidate = %candidate_view.id,
        tm,
        fast = tier1_fast,
        "tier-1 alignment"
    );

    if tm >= bounds.ub_fast || (tm >= config.tm_cutoff && tier1_fast) {
        return Ok(PairVerdict::Hit);
    }
    if tm < bounds.lb_fast {
        return Ok(PairVerdict::Miss);
    }

    let pair = aligner
        .tm_align(query_view, candidate_view, &params, false)
        .map_err(|source| alignment_error(&query_view, &candidate_view, source))?;
    let tm = config.score_mode.combine(pair);
    trace!(
        query = %query_view.id,
        candidate = %candidate_view.id,
        tm,
        "tier-2 alignment"
    );

    Ok(if tm >= config.tm_cutoff {
        PairVerdict::Hit
    } else {
        PairVerdict::Miss
    })
}

fn alignment_error(
    query: &ChainView<'_>,
    candidate: &ChainView<'_>,
    source: AlignError,
) -> EngineError {
    EngineError::Alignment {
        query: query.id.to_string(),
        candidate: candidate.id.to_string(),
        source,
    }
}
