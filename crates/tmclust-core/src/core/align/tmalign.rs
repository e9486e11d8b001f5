//! Shipped sequence-independent alignment kernel.
//!
//! `tm_align` enumerates gapless residue offsets between the two chains
//! and refines each by iterative superposition on the close pairs,
//! keeping the transform with the best combined TM-score. The `fast`
//! flag coarsens the offset grid and shortens the refinement. `hw_rmsd`
//! screens offsets with a single superposition and then runs a fixed
//! number of distance-weighted refinement rounds.
//!
//! The kernel honours the TM1/TM2 normalization contract of
//! [`StructureAligner`]; callers must not rely on any further detail of
//! the search.

use super::kabsch::{superpose, weighted_superpose};
use super::tmscore::{d0, tm_from_distances};
use super::{AlignError, AlignParams, StructureAligner, TmPair};
use crate::core::models::chain::ChainView;
use nalgebra::Point3;

/// Shortest gapless overlap worth scoring.
const MIN_OVERLAP: usize = 5;
const PRECISE_ITERATIONS: usize = 8;
const FAST_ITERATIONS: usize = 3;
/// Fixed refinement rounds of the pre-filter alignment.
const PREFILTER_ITERATIONS: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct TmAligner;

impl TmAligner {
    pub fn new() -> Self {
        Self
    }

    fn check_length(view: &ChainView<'_>) -> Result<(), AlignError> {
        if view.len() < MIN_OVERLAP {
            return Err(AlignError::TooShort {
                id: view.id.to_string(),
                len: view.len(),
            });
        }
        Ok(())
    }

    /// Offsets to visit, expanding outward from 0 in `step` increments.
    fn offsets(query_len: usize, candidate_len: usize, step: usize) -> Vec<i64> {
        let lo = MIN_OVERLAP as i64 - query_len as i64;
        let hi = candidate_len as i64 - MIN_OVERLAP as i64;
        let mut offsets = vec![0];
        let mut k = step as i64;
        while -k >= lo || k <= hi {
            if k <= hi {
                offsets.push(k);
            }
            if -k >= lo {
                offsets.push(-k);
            }
            k += step as i64;
        }
        offsets
    }

    /// Scores one gapless offset; `None` when the overlap is too short.
    fn score_offset(
        query: &ChainView<'_>,
        candidate: &ChainView<'_>,
        offset: i64,
        iterations: usize,
        is_rna: bool,
    ) -> Result<Option<TmPair>, AlignError> {
        let query_len = query.len();
        let candidate_len = candidate.len();

        let query_start = (-offset).max(0) as usize;
        let candidate_start = (query_start as i64 + offset) as usize;
        if query_start >= query_len || candidate_start >= candidate_len {
            return Ok(None);
        }
        let overlap = (query_len - query_start).min(candidate_len - candidate_start);
        if overlap < MIN_OVERLAP {
            return Ok(None);
        }

        let mobile = &query.coords[query_start..query_start + overlap];
        let target = &candidate.coords[candidate_start..candidate_start + overlap];

        let cut_sq = d0(query_len.min(candidate_len), is_rna)
            .clamp(4.5, 8.0)
            .powi(2);
        let mut included: Vec<usize> = (0..overlap).collect();
        let mut best: Option<TmPair> = None;
        let mut best_sum = f64::NEG_INFINITY;

        for _ in 0..iterations {
            let sel_mobile: Vec<Point3<f64>> = included.iter().map(|&k| mobile[k]).collect();
            let sel_target: Vec<Point3<f64>> = included.iter().map(|&k| target[k]).collect();
            let (rotation, translation) = superpose(&sel_mobile, &sel_target)?;

            let dist_sq: Vec<f64> = mobile
                .iter()
                .zip(target)
                .map(|(m, t)| ((rotation * m + translation) - t).norm_squared())
                .collect();
            let pair = TmPair {
                by_query: tm_from_distances(&dist_sq, query_len, is_rna),
                by_candidate: tm_from_distances(&dist_sq, candidate_len, is_rna),
            };
            let sum = pair.by_query + pair.by_candidate;
            if sum > best_sum {
                best_sum = sum;
                best = Some(pair);
            }

            let next: Vec<usize> = (0..overlap).filter(|&k| dist_sq[k] < cut_sq).collect();
            if next.len() < 3 || next == included {
                break;
            }
            included = next;
        }

        Ok(best)
    }

    fn best_over_offsets(
        query: &ChainView<'_>,
        candidate: &ChainView<'_>,
        step: usize,
        iterations: usize,
        is_rna: bool,
    ) -> Result<(i64, TmPair), AlignError> {
        let mut best: Option<(i64, TmPair)> = None;
        let mut best_sum = f64::NEG_INFINITY;
        for offset in Self::offsets(query.len(), candidate.len(), step) {
            if let Some(pair) = Self::score_offset(query, candidate, offset, iterations, is_rna)? {
                let sum = pair.by_query + pair.by_candidate;
                if sum > best_sum {
                    best_sum = sum;
                    best = Some((offset, pair));
                }
            }
        }
        best.ok_or(AlignError::DegenerateGeometry("no alignable overlap"))
    }
}

impl StructureAligner for TmAligner {
    fn tm_align(
        &self,
        query: ChainView<'_>,
        candidate: ChainView<'_>,
        params: &AlignParams,
        fast: bool,
    ) -> Result<TmPair, AlignError> {
        Self::check_length(&query)?;
        Self::check_length(&candidate)?;

        let min_len = query.len().min(candidate.len());
        let (step, iterations) = if fast {
            ((min_len / 10).max(1), FAST_ITERATIONS)
        } else {
            (1, PRECISE_ITERATIONS)
        };

        let (_, pair) =
            Self::best_over_offsets(&query, &candidate, step, iterations, params.is_rna())?;
        Ok(pair)
    }

    fn hw_rmsd(
        &self,
        query: ChainView<'_>,
        candidate: ChainView<'_>,
        params: &AlignParams,
    ) -> Result<TmPair, AlignError> {
        Self::check_length(&query)?;
        Self::check_length(&candidate)?;
        let is_rna = params.is_rna();

        let query_len = query.len();
        let candidate_len = candidate.len();
        let min_len = query_len.min(candidate_len);

        // One-shot screen for a starting offset.
        let step = (min_len / 5).max(1);
        let (offset, mut pair) = Self::best_over_offsets(&query, &candidate, step, 1, is_rna)?;

        let query_start = (-offset).max(0) as usize;
        let candidate_start = (query_start as i64 + offset) as usize;
        let overlap = (query_len - query_start).min(candidate_len - candidate_start);
        let mobile = &query.coords[query_start..query_start + overlap];
        let target = &candidate.coords[candidate_start..candidate_start + overlap];

        let d0_sq = d0(min_len, is_rna).powi(2);
        let mut weights = vec![1.0; overlap];
        for _ in 0..PREFILTER_ITERATIONS {
            let (rotation, translation) = weighted_superpose(mobile, target, &weights)?;
            let dist_sq: Vec<f64> = mobile
                .iter()
                .zip(target)
                .map(|(m, t)| ((rotation * m + translation) - t).norm_squared())
                .collect();
            for (w, &d2) in weights.iter_mut().zip(&dist_sq) {
                *w = 1.0 / (1.0 + d2 / d0_sq);
            }
            pair = TmPair {
                by_query: tm_from_distances(&dist_sq, query_len, is_rna),
                by_candidate: tm_from_distances(&dist_sq, candidate_len, is_rna),
            };
        }
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::chain::{ChainRecord, MoleculeType, ResidueData};
    use nalgebra::{Rotation3, Vector3};

    fn protein(id: &str, coords: Vec<Point3<f64>>) -> ChainRecord {
        let n = coords.len();
        let data = ResidueData {
            seq: vec![b'A'; n],
            sec: vec![b'C'; n],
            coords,
        };
        ChainRecord::new(id.to_string(), MoleculeType::Protein, data)
    }

    fn helix(n: usize) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let theta = 100.0_f64.to_radians() * i as f64;
                Point3::new(2.3 * theta.cos(), 2.3 * theta.sin(), 1.5 * i as f64)
            })
            .collect()
    }

    fn extended(n: usize) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| Point3::new(3.8 * i as f64, 0.0, 0.0))
            .collect()
    }

    fn params() -> AlignParams {
        AlignParams {
            mol_sum: -2,
            tm_cutoff: 0.5,
            length_norm: -2,
        }
    }

    #[test]
    fn identical_chains_score_one() {
        let a = protein("a", helix(30));
        let b = protein("b", helix(30));
        let pair = TmAligner::new()
            .tm_align(a.view().unwrap(), b.view().unwrap(), &params(), false)
            .unwrap();
        assert!(pair.by_query > 0.99, "{pair:?}");
        assert!(pair.by_candidate > 0.99, "{pair:?}");
    }

    #[test]
    fn rigid_motion_does_not_change_the_score() {
        let rotation = Rotation3::from_euler_angles(0.7, -0.2, 1.9);
        let shift = Vector3::new(30.0, -12.0, 4.0);
        let moved: Vec<_> = helix(30).iter().map(|p| rotation * p + shift).collect();

        let a = protein("a", helix(30));
        let b = protein("b", moved);
        let pair = TmAligner::new()
            .tm_align(a.view().unwrap(), b.view().unwrap(), &params(), false)
            .unwrap();
        assert!(pair.by_query > 0.99, "{pair:?}");
    }

    #[test]
    fn fragment_scores_high_under_query_normalization_only() {
        let full = helix(40);
        let fragment: Vec<_> = full[10..30].to_vec();

        let q = protein("frag", fragment);
        let c = protein("full", full);
        let pair = TmAligner::new()
            .tm_align(q.view().unwrap(), c.view().unwrap(), &params(), false)
            .unwrap();
        assert!(pair.by_query > 0.95, "{pair:?}");
        assert!(pair.by_candidate < 0.65, "{pair:?}");
        assert!(pair.by_candidate > 0.4, "{pair:?}");
    }

    #[test]
    fn unrelated_folds_score_low() {
        let a = protein("helix", helix(30));
        let b = protein("strand", extended(30));
        let pair = TmAligner::new()
            .tm_align(a.view().unwrap(), b.view().unwrap(), &params(), false)
            .unwrap();
        assert!(pair.by_query < 0.35, "{pair:?}");
        assert!(pair.by_candidate < 0.35, "{pair:?}");
    }

    #[test]
    fn fast_mode_still_finds_identical_chains() {
        let a = protein("a", helix(60));
        let b = protein("b", helix(60));
        let pair = TmAligner::new()
            .tm_align(a.view().unwrap(), b.view().unwrap(), &params(), true)
            .unwrap();
        assert!(pair.by_query > 0.99, "{pair:?}");
    }

    #[test]
    fn prefilter_separates_identical_from_unrelated() {
        let aligner = TmAligner::new();
        let a = protein("a", helix(30));
        let b = protein("b", helix(30));
        let c = protein("c", extended(30));

        let same = aligner
            .hw_rmsd(a.view().unwrap(), b.view().unwrap(), &params())
            .unwrap();
        let diff = aligner
            .hw_rmsd(a.view().unwrap(), c.view().unwrap(), &params())
            .unwrap();
        assert!(same.by_query > 0.95, "{same:?}");
        assert!(diff.by_query < same.by_query - 0.4, "{same:?} vs {diff:?}");
    }

    #[test]
    fn short_chain_is_rejected() {
        let a = protein("tiny", helix(4));
        let b = protein("b", helix(30));
        let result = TmAligner::new().tm_align(
            a.view().unwrap(),
            b.view().unwrap(),
            &params(),
            false,
        );
        assert!(matches!(result, Err(AlignError::TooShort { len: 4, .. })));
    }
}
