//! Structural alignment primitives.
//!
//! The clustering engine depends only on the [`StructureAligner`] trait:
//! a precise/fast pairwise aligner (`tm_align`) and a cheap pre-filter
//! aligner (`hw_rmsd`), both reporting a TM-score pair under the two
//! length normalizations. [`tmalign::TmAligner`] is the kernel shipped
//! with the crate; tests substitute scripted implementations.

pub mod kabsch;
pub mod tmalign;
pub mod tmscore;

use crate::core::models::chain::ChainView;
use thiserror::Error;

/// TM-scores of one alignment under both normalizations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TmPair {
    /// TM-score normalized by the query length.
    pub by_query: f64,
    /// TM-score normalized by the candidate length.
    pub by_candidate: f64,
}

/// Pair-independent inputs threaded through to the aligner.
///
/// `length_norm` mirrors the normalization flag of the classic aligner
/// command line; it is derived from the score mode and opaque to the
/// engine.
#[derive(Debug, Clone, Copy)]
pub struct AlignParams {
    /// Sum of the two chains' molecule signs; positive means RNA.
    pub mol_sum: i32,
    /// The clustering TM-score cutoff, available for internal pruning.
    pub tm_cutoff: f64,
    pub length_norm: i32,
}

impl AlignParams {
    pub fn is_rna(&self) -> bool {
        self.mol_sum > 0
    }
}

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("chain '{id}' is too short to align ({len} residues)")]
    TooShort { id: String, len: usize },

    #[error("superposition requires at least 3 point pairs, found {found}")]
    InsufficientPoints { found: usize },

    #[error("superposition is degenerate: {0}")]
    DegenerateGeometry(&'static str),
}

/// Pairwise structural alignment, abstracted so the engine can be
/// driven by any kernel honouring the TM1/TM2 normalization contract.
pub trait StructureAligner {
    /// Full structural alignment. `fast` selects the coarse search used
    /// by the first tier of the clustering protocol.
    fn tm_align(
        &self,
        query: ChainView<'_>,
        candidate: ChainView<'_>,
        params: &AlignParams,
        fast: bool,
    ) -> Result<TmPair, AlignError>;

    /// Heuristic weighted-RMSD alignment used as a candidate pre-filter.
    /// Much cheaper than [`tm_align`](Self::tm_align) and allowed to be
    /// loose; scores feed a ranking, not a final decision.
    fn hw_rmsd(
        &self,
        query: ChainView<'_>,
        candidate: ChainView<'_>,
        params: &AlignParams,
    ) -> Result<TmPair, AlignError>;
}
