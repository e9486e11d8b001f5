//! TM-score arithmetic shared by the alignment kernels.

/// Length-dependent distance scale of the TM-score.
///
/// Protein and RNA use different empirical fits; both are floored at
/// 0.5 A so short chains keep a positive scale.
pub fn d0(norm_len: usize, is_rna: bool) -> f64 {
    let l = norm_len as f64;
    let raw = if is_rna {
        0.6 * (l - 0.5).max(0.0).sqrt() - 2.5
    } else {
        1.24 * (l - 15.0).cbrt() - 1.8
    };
    raw.max(0.5)
}

/// TM-score of a set of aligned squared distances under the given
/// normalization length.
pub fn tm_from_distances(dist_sq: &[f64], norm_len: usize, is_rna: bool) -> f64 {
    if norm_len == 0 {
        return 0.0;
    }
    let d0_sq = d0(norm_len, is_rna).powi(2);
    let sum: f64 = dist_sq.iter().map(|&d2| 1.0 / (1.0 + d2 / d0_sq)).sum();
    sum / norm_len as f64
}
