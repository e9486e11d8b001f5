//! Composite TM-score rules, length admissibility, and the score bounds
//! that drive the two-tier alignment protocol.

use crate::core::align::TmPair;

/// Pairs whose geometric-mean length is at most this are always kept by
/// the pre-filter, whatever their score.
pub const SHORT_PAIR_MEAN_LEN: f64 = 50.0;
/// Pairs whose geometric-mean length reaches this always use the fast
/// alignment in tier 1.
pub const LONG_PAIR_MEAN_LEN: f64 = 1000.0;

/// Geometric mean of two chain lengths; alignment cost grows with the
/// product of the lengths, so this is the natural size measure.
pub fn mean_length(query_len: usize, candidate_len: usize) -> f64 {
    ((query_len * candidate_len) as f64).sqrt()
}

/// How TM1 (normalized by the query length) and TM2 (normalized by the
/// candidate length) are combined into the single score the cutoff is
/// applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreMode {
    /// The larger of the two scores, i.e. normalized by the shorter chain.
    Larger,
    /// The smaller of the two scores, i.e. normalized by the longer chain.
    Smaller,
    Average,
    Harmonic,
    Geometric,
    RootMeanSquare,
}

impl ScoreMode {
    /// Numeric selector as exposed on the command line (1 to 6).
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(ScoreMode::Larger),
            2 => Some(ScoreMode::Smaller),
            3 => Some(ScoreMode::Average),
            4 => Some(ScoreMode::Harmonic),
            5 => Some(ScoreMode::Geometric),
            6 => Some(ScoreMode::RootMeanSquare),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            ScoreMode::Larger => 1,
            ScoreMode::Smaller => 2,
            ScoreMode::Average => 3,
            ScoreMode::Harmonic => 4,
            ScoreMode::Geometric => 5,
            ScoreMode::RootMeanSquare => 6,
        }
    }

    pub fn combine(self, pair: TmPair) -> f64 {
        let (a, b) = (pair.by_query, pair.by_candidate);
        match self {
            ScoreMode::Larger => a.max(b),
            ScoreMode::Smaller => a.min(b),
            ScoreMode::Average => (a + b) / 2.0,
            ScoreMode::Harmonic => 2.0 / (1.0 / a + 1.0 / b),
            ScoreMode::Geometric => (a * b).sqrt(),
            ScoreMode::RootMeanSquare => ((a * a + b * b) / 2.0).sqrt(),
        }
    }

    /// Necessary length condition for a pair to reach `cutoff` at all,
    /// given that each normalized score is bounded by the length ratio.
    /// Rejection here is sound: an alignment call cannot produce a hit.
    pub fn admits(self, query_len: usize, candidate_len: usize, cutoff: f64) -> bool {
        let x = query_len as f64;
        let y = candidate_len as f64;
        match self {
            ScoreMode::Larger => true,
            ScoreMode::Smaller => x >= cutoff * y,
            ScoreMode::Average => x >= (2.0 * cutoff - 1.0) * y,
            ScoreMode::Harmonic => x * (2.0 / cutoff - 1.0) >= y,
            ScoreMode::Geometric => x >= cutoff * cutoff * y,
            ScoreMode::RootMeanSquare => x * x >= (2.0 * cutoff * cutoff - 1.0) * y * y,
        }
    }

    /// Length-normalization selector forwarded to the alignment kernel.
    /// The arm order is load-bearing: `Geometric` resolves through the
    /// first arm.
    pub fn length_norm(self) -> i32 {
        if matches!(
            self,
            ScoreMode::Smaller | ScoreMode::Harmonic | ScoreMode::Geometric
        ) {
            -2
        } else if matches!(self, ScoreMode::Larger | ScoreMode::Geometric) {
            -1
        } else if self == ScoreMode::Average {
            1
        } else {
            0
        }
    }
}

/// Score thresholds that short-circuit the two-tier protocol and gate
/// the pre-filter, derived per pair from the cutoff, the score mode and
/// the combined molecule sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBounds {
    /// Fast score at or above which a hit is certain.
    pub ub_fast: f64,
    /// Fast score below which a miss is certain.
    pub lb_fast: f64,
    /// Pre-filter score at or above which a downstream hit is certain.
    pub ub_prefilter: f64,
    /// Pre-filter score below which a candidate is not worth ranking.
    pub lb_prefilter: f64,
}

impl ScoreBounds {
    pub fn for_pair(cutoff: f64, mode: ScoreMode, mol_sum: i32) -> Self {
        let ub = 0.9 * cutoff + 0.1;
        let mut lb_fast = 0.9 * cutoff;
        let mut lb_prefilter = 0.5 * cutoff;
        // Normalizing by the shorter chain admits much weaker raw
        // scores, so the miss bounds drop, further for RNA than for
        // protein.
        if mode.index() <= 1 {
            if mol_sum > 0 {
                lb_fast = 0.60 * cutoff;
                lb_prefilter = 0.02 * cutoff;
            } else {
                lb_fast = 0.80 * cutoff;
                lb_prefilter = 0.25 * cutoff;
            }
        }
        Self {
            ub_fast: ub,
            lb_fast,
            ub_prefilter: ub,
            lb_prefilter,
        }
    }
}
