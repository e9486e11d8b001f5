use nalgebra::Point3;
use std::fmt;

/// Molecule class of a chain.
///
/// Clustering never mixes the two classes: a protein chain and an RNA
/// chain are structurally incomparable under TM-score normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleculeType {
    Protein,
    Rna,
}

impl MoleculeType {
    /// Signed indicator used throughout the engine: +1 for RNA, -1 for
    /// protein. The product of two signs is negative iff the molecule
    /// types disagree.
    pub fn sign(self) -> i32 {
        match self {
            MoleculeType::Rna => 1,
            MoleculeType::Protein => -1,
        }
    }

    /// Inverse of [`sign`](Self::sign); non-positive values map to protein.
    pub fn from_sign(sign: i32) -> Self {
        if sign > 0 {
            MoleculeType::Rna
        } else {
            MoleculeType::Protein
        }
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoleculeType::Protein => write!(f, "protein"),
            MoleculeType::Rna => write!(f, "RNA"),
        }
    }
}

/// Per-residue arrays of a chain: one sequence letter, one
/// secondary-structure code, and one representative-atom coordinate per
/// residue, all of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueData {
    pub seq: Vec<u8>,
    pub sec: Vec<u8>,
    pub coords: Vec<Point3<f64>>,
}

impl ResidueData {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// A single chain as the clustering engine sees it.
///
/// Records are immutable after load except for one state transition:
/// once a chain has been assigned to an existing cluster its per-residue
/// data is no longer needed and is dropped via
/// [`release_residues`](Self::release_residues). The residue count
/// survives the release, so the length index and the admissibility
/// filter keep working on released chains.
#[derive(Debug, Clone)]
pub struct ChainRecord {
    pub id: String,
    pub mol: MoleculeType,
    len: usize,
    residues: Option<ResidueData>,
}

impl ChainRecord {
    pub fn new(id: String, mol: MoleculeType, residues: ResidueData) -> Self {
        debug_assert_eq!(residues.seq.len(), residues.coords.len());
        debug_assert_eq!(residues.sec.len(), residues.coords.len());
        Self {
            id,
            mol,
            len: residues.len(),
            residues: Some(residues),
        }
    }

    /// Residue count. Valid even after the residue data is released.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrowed per-residue view, or `None` once released.
    pub fn view(&self) -> Option<ChainView<'_>> {
        self.residues.as_ref().map(|data| ChainView {
            id: &self.id,
            mol: self.mol,
            seq: &data.seq,
            sec: &data.sec,
            coords: &data.coords,
        })
    }

    /// Drops the per-residue arrays. Called exactly once, when the chain
    /// joins an existing cluster; representatives are never released.
    pub fn release_residues(&mut self) {
        self.residues = None;
    }

    pub fn is_released(&self) -> bool {
        self.residues.is_none()
    }
}

/// Borrowed per-residue data handed to the alignment primitives.
#[derive(Debug, Clone, Copy)]
pub struct ChainView<'a> {
    pub id: &'a str,
    pub mol: MoleculeType,
    pub seq: &'a [u8],
    pub sec: &'a [u8],
    pub coords: &'a [Point3<f64>],
}

impl ChainView<'_> {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_of_len(n: usize) -> ChainRecord {
        let data = ResidueData {
            seq: vec![b'A'; n],
            sec: vec![b'C'; n],
            coords: (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect(),
        };
        ChainRecord::new(format!("chain{n}"), MoleculeType::Protein, data)
    }

    #[test]
    fn sign_product_is_negative_iff_types_disagree() {
        let p = MoleculeType::Protein.sign();
        let r = MoleculeType::Rna.sign();
        assert!(p * r < 0);
        assert!(p * p > 0);
        assert!(r * r > 0);
    }

    #[test]
    fn from_sign_round_trips() {
        assert_eq!(MoleculeType::from_sign(1), MoleculeType::Rna);
        assert_eq!(MoleculeType::from_sign(-1), MoleculeType::Protein);
        assert_eq!(MoleculeType::from_sign(0), MoleculeType::Protein);
    }

    #[test]
    fn length_survives_release() {
        let mut chain = record_of_len(7);
        assert_eq!(chain.len(), 7);
        assert!(chain.view().is_some());

        chain.release_residues();
        assert!(chain.is_released());
        assert!(chain.view().is_none());
        assert_eq!(chain.len(), 7);
    }

    #[test]
    fn view_borrows_all_arrays() {
        let chain = record_of_len(3);
        let view = chain.view().unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.seq.len(), 3);
        assert_eq!(view.sec.len(), 3);
        assert_eq!(view.id, "chain3");
    }
}
