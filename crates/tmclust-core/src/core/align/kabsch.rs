//! Optimal rigid-body superposition of paired point sets.

use super::AlignError;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// Least-squares superposition of `mobile` onto `target`.
pub fn superpose(
    mobile: &[Point3<f64>],
    target: &[Point3<f64>],
) -> Result<(Rotation3<f64>, Vector3<f64>), AlignError> {
    let weights = vec![1.0; mobile.len()];
    weighted_superpose(mobile, target, &weights)
}

/// Weighted least-squares superposition of `mobile` onto `target`.
///
/// Weights must be non-negative with a positive sum; pairs with zero
/// weight do not constrain the fit.
pub fn weighted_superpose(
    mobile: &[Point3<f64>],
    target: &[Point3<f64>],
    weights: &[f64],
) -> Result<(Rotation3<f64>, Vector3<f64>), AlignError> {
    debug_assert_eq!(mobile.len(), target.len());
    debug_assert_eq!(mobile.len(), weights.len());
    if mobile.len() < 3 {
        return Err(AlignError::InsufficientPoints {
            found: mobile.len(),
        });
    }

    let total_weight: f64 = weights.iter().sum();
    if total_weight <= f64::EPSILON {
        return Err(AlignError::DegenerateGeometry("all pair weights vanish"));
    }

    let mobile_centroid = Point3::from(
        mobile
            .iter()
            .zip(weights)
            .map(|(p, &w)| p.coords * w)
            .sum::<Vector3<f64>>()
            / total_weight,
    );
    let target_centroid = Point3::from(
        target
            .iter()
            .zip(weights)
            .map(|(p, &w)| p.coords * w)
            .sum::<Vector3<f64>>()
            / total_weight,
    );

    let covariance = mobile
        .iter()
        .zip(target)
        .zip(weights)
        .fold(Matrix3::zeros(), |acc, ((m, t), &w)| {
            acc + (t - target_centroid) * (m - mobile_centroid).transpose() * w
        });

    let svd = covariance.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(AlignError::DegenerateGeometry(
            "singular value decomposition did not converge",
        ));
    };

    let mut correction = Matrix3::identity();
    if (u * v_t).determinant() < 0.0 {
        correction[(2, 2)] = -1.0;
    }

    let rotation = Rotation3::from_matrix(&(u * correction * v_t));
    let translation = target_centroid.coords - rotation * mobile_centroid.coords;
    Ok((rotation, translation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tetrahedron() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn pure_translation_is_recovered() {
        let mobile = tetrahedron();
        let shift = Vector3::new(4.0, -2.0, 7.5);
        let target: Vec<_> = mobile.iter().map(|p| p + shift).collect();

        let (rotation, translation) = superpose(&mobile, &target).unwrap();
        assert_relative_eq!(rotation.angle(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(translation, shift, epsilon = 1e-9);
    }

    #[test]
    fn rotation_is_recovered() {
        let mobile = tetrahedron();
        let rotation = Rotation3::from_euler_angles(0.3, -1.1, 2.0);
        let target: Vec<_> = mobile.iter().map(|p| rotation * p).collect();

        let (recovered, translation) = superpose(&mobile, &target).unwrap();
        for (m, t) in mobile.iter().zip(&target) {
            assert_relative_eq!(recovered * m + translation, *t, epsilon = 1e-9);
        }
    }

    #[test]
    fn reflection_is_never_produced() {
        // A mirrored target cannot be reached by a proper rotation; the
        // result must still be a rotation (determinant +1).
        let mobile = tetrahedron();
        let target: Vec<_> = mobile
            .iter()
            .map(|p| Point3::new(-p.x, p.y, p.z))
            .collect();

        let (rotation, _) = superpose(&mobile, &target).unwrap();
        assert_relative_eq!(rotation.matrix().determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_weight_pairs_do_not_constrain_the_fit() {
        let mut mobile = tetrahedron();
        let shift = Vector3::new(1.0, 2.0, 3.0);
        let mut target: Vec<_> = mobile.iter().map(|p| p + shift).collect();

        // An outlier pair with zero weight must not affect the result.
        mobile.push(Point3::new(100.0, 0.0, 0.0));
        target.push(Point3::new(-100.0, 50.0, 0.0));
        let weights = vec![1.0, 1.0, 1.0, 1.0, 0.0];

        let (rotation, translation) =
            weighted_superpose(&mobile, &target, &weights).unwrap();
        assert_relative_eq!(rotation.angle(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(translation, shift, epsilon = 1e-9);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let mobile = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let target = mobile.clone();
        assert!(matches!(
            superpose(&mobile, &target),
            Err(AlignError::InsufficientPoints { found: 2 })
        ));
    }
}
