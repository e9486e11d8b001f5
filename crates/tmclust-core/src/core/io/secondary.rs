//! Secondary-structure codes from representative-atom geometry.
//!
//! Protein chains get a CA-distance assignment over a five-residue
//! window: `H` (helix), `E` (strand), `T` (turn), `C` (coil). RNA chains
//! are coded as coil throughout; the codes only seed the alignment
//! primitives and carry no meaning beyond that.

use crate::core::models::chain::MoleculeType;
use nalgebra::Point3;

pub const HELIX: u8 = b'H';
pub const STRAND: u8 = b'E';
pub const TURN: u8 = b'T';
pub const COIL: u8 = b'C';

/// Assigns one code per residue.
pub fn assign(coords: &[Point3<f64>], mol: MoleculeType) -> Vec<u8> {
    match mol {
        MoleculeType::Protein => assign_protein(coords),
        MoleculeType::Rna => vec![COIL; coords.len()],
    }
}

fn assign_protein(coords: &[Point3<f64>]) -> Vec<u8> {
    let n = coords.len();
    let mut sec = vec![COIL; n];
    if n < 5 {
        return sec;
    }

    for i in 2..n - 2 {
        let d13 = (coords[i - 2] - coords[i]).norm();
        let d14 = (coords[i - 2] - coords[i + 1]).norm();
        let d15 = (coords[i - 2] - coords[i + 2]).norm();
        let d24 = (coords[i - 1] - coords[i + 1]).norm();
        let d25 = (coords[i - 1] - coords[i + 2]).norm();
        let d35 = (coords[i] - coords[i + 2]).norm();
        sec[i] = window_code(d13, d14, d15, d24, d25, d35);
    }
    sec
}

/// Classifies the central residue of a five-residue window from its six
/// non-adjacent CA-CA distances. The reference distances are the
/// canonical helix and strand geometries.
fn window_code(d13: f64, d14: f64, d15: f64, d24: f64, d25: f64, d35: f64) -> u8 {
    let delta = 2.1;
    if (d15 - 6.37).abs() < delta
        && (d14 - 5.18).abs() < delta
        && (d25 - 5.18).abs() < delta
        && (d13 - 5.45).abs() < delta
        && (d24 - 5.45).abs() < delta
        && (d35 - 5.45).abs() < delta
    {
        return HELIX;
    }

    let delta = 1.42;
    if (d15 - 13.0).abs() < delta
        && (d14 - 10.4).abs() < delta
        && (d25 - 10.4).abs() < delta
        && (d13 - 6.1).abs() < delta
        && (d24 - 6.1).abs() < delta
        && (d35 - 6.1).abs() < delta
    {
        return STRAND;
    }

    if d15 < 8.0 {
        return TURN;
    }
    COIL
}
