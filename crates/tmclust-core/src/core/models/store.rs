use super::chain::{ChainRecord, ChainView};

/// In-memory collection of all loaded chains.
///
/// Append-only during load, read-only during a query. The only
/// post-load mutation is the release of a member's residue data after
/// it has been assigned to an existing cluster.
#[derive(Debug, Default)]
pub struct StructureStore {
    chains: Vec<ChainRecord>,
}

impl StructureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chains(chains: Vec<ChainRecord>) -> Self {
        Self { chains }
    }

    /// Appends a chain and returns its index.
    pub fn push(&mut self, chain: ChainRecord) -> usize {
        self.chains.push(chain);
        self.chains.len() - 1
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn chain(&self, index: usize) -> &ChainRecord {
        &self.chains[index]
    }

    pub fn view(&self, index: usize) -> Option<ChainView<'_>> {
        self.chains[index].view()
    }

    pub fn release_residues(&mut self, index: usize) {
        self.chains[index].release_residues();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainRecord> {
        self.chains.iter()
    }

    /// Chain indices sorted by residue count, longest first. The sort is
    /// stable: equal lengths keep load order, which makes the whole scan
    /// deterministic for a given input ordering.
    pub fn length_index(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.chains.len()).collect();
        order.sort_by(|&a, &b| self.chains[b].len().cmp(&self.chains[a].len()));
        order
    }
}
