// cluster.rs - Paralog filtering by single-linkage clustering of consensus sequences

use crate::core::distance::sequence_distance;
use crate::data::lists::Blacklist;
use crate::data::locus::{Catalog, Locus, LocusId};
use crate::error::{FilterError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Maximum mismatches tolerated between two sequences of length `seq_len`
/// that are at least `similarity` identical
pub fn mismatch_budget(seq_len: usize, similarity: f64) -> usize {
    let matches = (similarity * seq_len as f64).round() as usize;
    seq_len.saturating_sub(matches)
}

/// Clustering work item: one locus and its within-budget neighbours
#[derive(Debug, Clone)]
struct Tag<'a> {
    id: LocusId,
    seq: &'a [u8],
    polymorphic: bool,
    /// (tag index, distance) for every later tag within budget, self included
    neighbours: Vec<(usize, usize)>,
}

impl<'a> Tag<'a> {
    fn from_locus(locus: &'a Locus) -> Self {
        Self {
            id: locus.id,
            seq: locus.consensus.as_bytes(),
            polymorphic: locus.is_polymorphic(),
            neighbours: Vec::new(),
        }
    }
}

/// Disjoint sets over tag indices
#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }

    fn component_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }
}

/// Counts reported in the run log's cluster block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterStats {
    pub total_loci: usize,
    pub non_clustered: usize,
    pub clustered: usize,
    /// Components with more than one member
    pub clusters: usize,
    /// Clustered loci carrying at least one polymorphic site
    pub polymorphic_clustered: usize,
    pub fixed_clustered: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ClusterOutcome {
    pub blacklist: Blacklist,
    /// Non-clustered loci in catalog order
    pub retained: Vec<LocusId>,
    pub stats: ClusterStats,
}

/// Groups loci whose consensus sequences are within the mismatch budget of
/// each other and blacklists every locus that ends up in a multi-member cluster.
#[derive(Debug, Clone)]
pub struct ParalogClusterer {
    similarity: f64,
    show_progress: bool,
}

impl ParalogClusterer {
    pub fn new(similarity: f64) -> Self {
        Self {
            similarity,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn cluster(&self, catalog: &Catalog) -> Result<ClusterOutcome> {
        let mut tags: Vec<Tag> = catalog.iter().map(Tag::from_locus).collect();
        let Some(first) = tags.first() else {
            return Ok(ClusterOutcome::default());
        };

        let seq_len = first.seq.len();
        if let Some(odd) = tags.iter().find(|t| t.seq.len() != seq_len) {
            return Err(FilterError::consistency(format!(
                "consensus of locus {} has length {} but clustering requires every locus to have length {}",
                odd.id,
                odd.seq.len(),
                seq_len
            )));
        }

        let budget = mismatch_budget(seq_len, self.similarity);
        log::info!(
            "Clustering {} loci for paralog filtering (similarity {}, up to {} mismatches over {} bp)",
            tags.len(),
            self.similarity,
            budget,
            seq_len
        );

        let rows = self.neighbour_rows(&tags, budget);
        for (tag, row) in tags.iter_mut().zip(rows) {
            tag.neighbours = row;
        }

        let mut sets = UnionFind::new(tags.len());
        for (i, tag) in tags.iter().enumerate() {
            for &(j, _) in &tag.neighbours {
                sets.union(i, j);
            }
        }

        let mut outcome = ClusterOutcome::default();
        let mut roots = std::collections::BTreeSet::new();
        for (i, tag) in tags.iter().enumerate() {
            if sets.component_size(i) == 1 {
                outcome.retained.push(tag.id);
            } else {
                outcome.blacklist.insert(tag.id);
                roots.insert(sets.find(i));
                if tag.polymorphic {
                    outcome.stats.polymorphic_clustered += 1;
                }
            }
        }

        let stats = &mut outcome.stats;
        stats.total_loci = tags.len();
        stats.non_clustered = outcome.retained.len();
        stats.clustered = outcome.blacklist.len();
        stats.clusters = roots.len();
        stats.fixed_clustered = stats.clustered - stats.polymorphic_clustered;

        log::info!(
            "Paralog clustering: {} non-clustered loci retained, {} loci in {} clusters removed",
            stats.non_clustered,
            stats.clustered,
            stats.clusters
        );
        Ok(outcome)
    }

    /// Row `i` lists every `j >= i` within `budget` of tag `i`
    fn neighbour_rows(&self, tags: &[Tag], budget: usize) -> Vec<Vec<(usize, usize)>> {
        let n = tags.len();
        let start = Instant::now();

        let pb = if self.show_progress {
            ProgressBar::new(n as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let update_interval = std::cmp::max(1, n / 100);
        let progress_counter = AtomicUsize::new(0);

        let rows: Vec<Vec<(usize, usize)>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let a = tags[i].seq;
                let row = (i..n)
                    .filter_map(|j| {
                        if i == j {
                            return Some((j, 0));
                        }
                        sequence_distance(a, tags[j].seq, budget).map(|d| (j, d))
                    })
                    .collect();

                let count = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
                if count % update_interval == 0 {
                    pb.set_position(count as u64);
                }
                row
            })
            .collect();

        pb.finish_and_clear();
        log::debug!(
            "Pairwise distances for {} loci computed in {:.2}s",
            n,
            start.elapsed().as_secs_f64()
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(seqs: &[(LocusId, &str)]) -> Catalog {
        Catalog::from_loci(seqs.iter().map(|&(id, s)| Locus::new(id, s))).unwrap()
    }

    fn clusterer(similarity: f64) -> ParalogClusterer {
        ParalogClusterer::new(similarity).with_progress(false)
    }

    #[test]
    fn test_mismatch_budget() {
        assert_eq!(mismatch_budget(100, 0.95), 5);
        assert_eq!(mismatch_budget(10, 1.0), 0);
        assert_eq!(mismatch_budget(10, 0.0), 10);
        assert_eq!(mismatch_budget(0, 0.9), 0);
    }

    #[test]
    fn test_identical_loci_clustered() {
        let seq = "ACGT".repeat(25);
        let outcome = clusterer(0.95)
            .cluster(&catalog(&[(1, &seq), (2, &seq)]))
            .unwrap();

        assert_eq!(outcome.blacklist.into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(outcome.retained.is_empty());
        assert_eq!(outcome.stats.clusters, 1);
        assert_eq!(outcome.stats.clustered, 2);
        assert_eq!(outcome.stats.fixed_clustered, 2);
    }

    #[test]
    fn test_single_linkage_chain() {
        // 1~2 and 2~3 are within one mismatch, 1 and 3 are two apart
        let outcome = clusterer(0.9)
            .cluster(&catalog(&[
                (1, "AAAAAAAAAA"),
                (2, "AAAAAAAAAT"),
                (3, "AAAAAAAATT"),
                (4, "GGGGGGGGGG"),
            ]))
            .unwrap();

        assert_eq!(outcome.blacklist.len(), 3);
        assert_eq!(outcome.retained, vec![4]);
        assert_eq!(outcome.stats.clusters, 1);
        assert_eq!(outcome.stats.non_clustered, 1);
    }

    #[test]
    fn test_partition_and_polymorphic_stats() {
        let mut loci = vec![
            Locus::new(1, "ACGTACGTAC").with_sites(&[3]),
            Locus::new(2, "ACGTACGTAC"),
            Locus::new(3, "TTTTGGGGCC").with_sites(&[1]),
            Locus::new(5, "GGGGCCCCAA"),
        ];
        loci[1].consensus = "ACGTACGTAA".to_string();
        let catalog = Catalog::from_loci(loci).unwrap();

        let outcome = clusterer(0.9).cluster(&catalog).unwrap();
        let stats = outcome.stats;

        assert_eq!(stats.total_loci, 4);
        assert_eq!(stats.non_clustered + stats.clustered, stats.total_loci);
        assert_eq!(stats.polymorphic_clustered, 1);
        assert_eq!(stats.fixed_clustered, 1);
        for id in &outcome.retained {
            assert!(!outcome.blacklist.contains(id));
        }
        assert_eq!(outcome.retained, vec![3, 5]);
    }

    #[test]
    fn test_idempotent_on_survivors() {
        let mut catalog = catalog(&[
            (1, "AAAAAAAAAA"),
            (2, "AAAAAAAAAA"),
            (3, "CCCCCCCCCC"),
            (4, "GGGGGGGGGG"),
        ]);
        let first = clusterer(0.9).cluster(&catalog).unwrap();
        catalog.retain(|l| !first.blacklist.contains(&l.id));

        let second = clusterer(0.9).cluster(&catalog).unwrap();
        assert!(second.blacklist.is_empty());
        assert_eq!(second.retained, first.retained);
    }

    #[test]
    fn test_empty_catalog() {
        let outcome = clusterer(0.9).cluster(&Catalog::new()).unwrap();
        assert!(outcome.blacklist.is_empty());
        assert_eq!(outcome.stats, ClusterStats::default());
    }

    #[test]
    fn test_unequal_lengths_rejected() {
        let result = clusterer(0.9).cluster(&catalog(&[(1, "ACGT"), (2, "ACGTA")]));
        assert!(matches!(result, Err(FilterError::DataConsistency(_))));
    }

    #[test]
    fn test_union_find_path_compression() {
        let mut sets = UnionFind::new(5);
        sets.union(0, 1);
        sets.union(1, 2);
        sets.union(3, 4);
        assert_eq!(sets.find(2), sets.find(0));
        assert_ne!(sets.find(0), sets.find(3));
        assert_eq!(sets.component_size(2), 3);
        assert_eq!(sets.component_size(4), 2);
        let root = sets.find(2);
        assert_eq!(sets.parent[2], root);
    }
}
