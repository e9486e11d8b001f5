//! Scripted aligners and store builders shared by the engine tests.

use crate::core::align::{AlignError, AlignParams, StructureAligner, TmPair};
use crate::core::models::chain::{ChainRecord, ChainView, MoleculeType, ResidueData};
use crate::core::models::store::StructureStore;
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) fn chain(id: &str, mol: MoleculeType, len: usize) -> ChainRecord {
    let data = ResidueData {
        seq: vec![b'A'; len],
        sec: vec![b'C'; len],
        coords: (0..len).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect(),
    };
    ChainRecord::new(id.to_string(), mol, data)
}

pub(crate) fn protein(id: &str, len: usize) -> ChainRecord {
    chain(id, MoleculeType::Protein, len)
}

pub(crate) fn store_of(chains: Vec<ChainRecord>) -> StructureStore {
    StructureStore::from_chains(chains)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Full { fast: bool },
    Prefilter,
}

/// Deterministic aligner driven by per-pair score tables. Scores are
/// symmetric and returned under both normalizations, so every score
/// mode combines them to the same value.
#[derive(Debug, Default)]
pub(crate) struct ScriptedAligner {
    default_score: f64,
    scores: HashMap<(String, String), f64>,
    fast_scores: HashMap<(String, String), f64>,
    prefilter_scores: HashMap<(String, String), f64>,
    failing: HashSet<(String, String)>,
    pub calls: Mutex<Vec<(String, String, CallKind)>>,
}

impl ScriptedAligner {
    pub fn new(default_score: f64) -> Self {
        Self {
            default_score,
            ..Self::default()
        }
    }

    fn insert(map: &mut HashMap<(String, String), f64>, a: &str, b: &str, score: f64) {
        map.insert((a.to_string(), b.to_string()), score);
        map.insert((b.to_string(), a.to_string()), score);
    }

    /// Precise-alignment score for the pair, both directions.
    pub fn with_score(mut self, a: &str, b: &str, score: f64) -> Self {
        Self::insert(&mut self.scores, a, b, score);
        self
    }

    /// Fast-alignment score overriding the precise one for tier 1.
    pub fn with_fast_score(mut self, a: &str, b: &str, score: f64) -> Self {
        Self::insert(&mut self.fast_scores, a, b, score);
        self
    }

    /// Pre-filter score; falls back to the precise score when absent.
    pub fn with_prefilter_score(mut self, a: &str, b: &str, score: f64) -> Self {
        Self::insert(&mut self.prefilter_scores, a, b, score);
        self
    }

    /// Marks the pair as failing every alignment call.
    pub fn with_failure(mut self, a: &str, b: &str) -> Self {
        self.failing.insert((a.to_string(), b.to_string()));
        self.failing.insert((b.to_string(), a.to_string()));
        self
    }

    fn lookup(&self, map: &HashMap<(String, String), f64>, q: &str, c: &str) -> Option<f64> {
        map.get(&(q.to_string(), c.to_string())).copied()
    }

    fn record(&self, q: &str, c: &str, kind: CallKind) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((q.to_string(), c.to_string(), kind));
        }
    }

    fn check_failure(&self, q: &str, c: &str) -> Result<(), AlignError> {
        if self.failing.contains(&(q.to_string(), c.to_string())) {
            return Err(AlignError::DegenerateGeometry("scripted failure"));
        }
        Ok(())
    }

    pub fn calls_of_kind(&self, kind: CallKind) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|(_, _, k)| *k == kind)
                    .map(|(q, c, _)| (q.clone(), c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl StructureAligner for ScriptedAligner {
    fn tm_align(
        &self,
        query: ChainView<'_>,
        candidate: ChainView<'_>,
        _params: &AlignParams,
        fast: bool,
    ) -> Result<TmPair, AlignError> {
        self.record(query.id, candidate.id, CallKind::Full { fast });
        self.check_failure(query.id, candidate.id)?;
        let score = fast
            .then(|| self.lookup(&self.fast_scores, query.id, candidate.id))
            .flatten()
            .or_else(|| self.lookup(&self.scores, query.id, candidate.id))
            .unwrap_or(self.default_score);
        Ok(TmPair {
            by_query: score,
            by_candidate: score,
        })
    }

    fn hw_rmsd(
        &self,
        query: ChainView<'_>,
        candidate: ChainView<'_>,
        _params: &AlignParams,
    ) -> Result<TmPair, AlignError> {
        self.record(query.id, candidate.id, CallKind::Prefilter);
        self.check_failure(query.id, candidate.id)?;
        let score = self
            .lookup(&self.prefilter_scores, query.id, candidate.id)
            .or_else(|| self.lookup(&self.scores, query.id, candidate.id))
            .unwrap_or(self.default_score);
        Ok(TmPair {
            by_query: score,
            by_candidate: score,
        })
    }
}
