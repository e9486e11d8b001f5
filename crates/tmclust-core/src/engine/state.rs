//! Mutable cluster state of the scan, and the final partition.

use std::collections::HashMap;

/// Cluster bookkeeping while the scan runs.
///
/// Representatives are append-only (position in the list is the cluster
/// id) and membership is write-once per chain: a chain is either a
/// representative of its own cluster or a member of exactly one
/// earlier-founded cluster.
#[derive(Debug, Default)]
pub struct ClusterState {
    repr_list: Vec<usize>,
    member_of: Vec<Option<usize>>,
    repr_to_cluster: HashMap<usize, usize>,
    /// Non-representative members per cluster, in assignment order.
    members: Vec<Vec<usize>>,
}

impl ClusterState {
    pub fn new(chain_count: usize) -> Self {
        Self {
            repr_list: Vec::new(),
            member_of: vec![None; chain_count],
            repr_to_cluster: HashMap::new(),
            members: Vec::new(),
        }
    }

    /// Founds a new cluster with `chain` as representative and sole
    /// member; returns the cluster id.
    pub fn new_cluster(&mut self, chain: usize) -> usize {
        debug_assert!(self.member_of[chain].is_none());
        let cluster = self.repr_list.len();
        self.repr_list.push(chain);
        self.member_of[chain] = Some(cluster);
        self.repr_to_cluster.insert(chain, cluster);
        self.members.push(Vec::new());
        cluster
    }

    /// Adds `chain` to an existing cluster.
    pub fn assign(&mut self, chain: usize, cluster: usize) {
        debug_assert!(self.member_of[chain].is_none());
        debug_assert!(cluster < self.repr_list.len());
        self.member_of[chain] = Some(cluster);
        self.members[cluster].push(chain);
    }

    pub fn cluster_count(&self) -> usize {
        self.repr_list.len()
    }

    /// Representatives in founding order; iterate in reverse for the
    /// newest-first candidate scan.
    pub fn representatives(&self) -> &[usize] {
        &self.repr_list
    }

    pub fn cluster_of_representative(&self, chain: usize) -> Option<usize> {
        self.repr_to_cluster.get(&chain).copied()
    }

    pub fn membership(&self, chain: usize) -> Option<usize> {
        self.member_of.get(chain).copied().flatten()
    }

    pub fn into_clustering(self) -> Clustering {
        let clusters = self
            .repr_list
            .into_iter()
            .zip(self.members)
            .map(|(representative, members)| Cluster {
                representative,
                members,
            })
            .collect();
        Clustering { clusters }
    }
}

/// One cluster of the final partition. `members` excludes the
/// representative and preserves assignment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub representative: usize,
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len() + 1
    }
}

/// The finished partition, clusters in founding order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
}

impl Clustering {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// (chain, cluster id) pairs over all chains in the partition.
    pub fn assignments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.clusters.iter().enumerate().flat_map(|(id, cluster)| {
            std::iter::once((cluster.representative, id))
                .chain(cluster.members.iter().map(move |&m| (m, id)))
        })
    }
}
