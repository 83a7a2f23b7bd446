//! Preferential attachment.
//!
//! [`barabasi_albert`] grows a scale-free graph one node at a time. Each new
//! node links to `m` distinct existing nodes picked with probability
//! proportional to their current degree.
//!
//! Degrees live in a [`DegreeSampler`], a Fenwick tree over node weights, so
//! a weighted pick is a prefix-sum descent in `O(log n)`. Targets already
//! picked in the current step are taken out of the tree until the step ends,
//! which makes every draw land on a fresh target without retrying.

use rand::Rng;
use rand::seq::SliceRandom;

// ---------------------------------------------------------------------------
// DegreeSampler
// ---------------------------------------------------------------------------

/// Fenwick tree of non-negative integer weights with weighted sampling.
#[derive(Debug, Clone)]
pub struct DegreeSampler {
    /// 1-indexed partial sums.
    tree: Vec<u64>,
    weights: Vec<u64>,
    total: u64,
}

impl DegreeSampler {
    /// A sampler over `len` slots, all with weight zero.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            tree: vec![0; len + 1],
            weights: vec![0; len],
            total: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Current weight of slot `index`.
    #[must_use]
    pub fn weight(&self, index: usize) -> u64 {
        self.weights.get(index).copied().unwrap_or(0)
    }

    /// Increase the weight of slot `index` by `delta`.
    pub fn add(&mut self, index: usize, delta: u64) {
        if index >= self.weights.len() || delta == 0 {
            return;
        }
        self.weights[index] += delta;
        self.total += delta;
        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += lowest_bit(i);
        }
    }

    /// Zero slot `index` and return the weight it had.
    pub fn take(&mut self, index: usize) -> u64 {
        let weight = self.weight(index);
        if weight == 0 {
            return 0;
        }
        self.weights[index] = 0;
        self.total -= weight;
        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] -= weight;
            i += lowest_bit(i);
        }
        weight
    }

    /// Give slot `index` back a weight previously removed by [`take`](Self::take).
    pub fn put(&mut self, index: usize, weight: u64) {
        self.add(index, weight);
    }

    /// Slot whose cumulative weight range contains `target`.
    ///
    /// Returns the smallest `i` with `weight(0) + .. + weight(i) > target`.
    /// Slots with weight zero are never returned. `target` must be below
    /// [`total`](Self::total); larger values resolve to the last slot.
    #[must_use]
    pub fn find(&self, target: u64) -> usize {
        if self.is_empty() {
            return 0;
        }
        let len = self.len();
        let mut remaining = target;
        let mut pos = 0;
        let mut step = 1 << (usize::BITS - 1 - len.leading_zeros());
        while step > 0 {
            let next = pos + step;
            if next <= len && self.tree[next] <= remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }
        pos.min(len - 1)
    }

    /// Draw a slot with probability proportional to its weight.
    ///
    /// Returns `None` when every weight is zero.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        Some(self.find(rng.gen_range(0..self.total)))
    }
}

const fn lowest_bit(i: usize) -> usize {
    i & i.wrapping_neg()
}

// ---------------------------------------------------------------------------
// Barabási–Albert
// ---------------------------------------------------------------------------

/// Number of edges [`barabasi_albert`] produces for `nodes` and `m`.
#[must_use]
pub const fn expected_edge_count(nodes: usize, m: usize) -> usize {
    if m == 0 || nodes < m {
        return 0;
    }
    m * (m - 1) / 2 + (nodes - m) * m
}

/// Edges of a Barabási–Albert graph on `nodes` local ids.
///
/// Starts from a clique on nodes `0..m`, then attaches every later node to
/// `m` distinct earlier nodes by degree. When all earlier nodes still have
/// degree zero (only the first attachment with `m = 1`) the pick is uniform.
/// Each edge is returned once as `(earlier, later)`.
///
/// Callers validate `1 <= m < nodes`; out-of-range input yields a clique on
/// whatever nodes exist and nothing more.
pub fn barabasi_albert(nodes: usize, m: usize, rng: &mut impl Rng) -> Vec<(usize, usize)> {
    let seed = m.min(nodes);
    let mut edges = Vec::with_capacity(expected_edge_count(nodes, m));
    let mut sampler = DegreeSampler::new(nodes);

    for a in 0..seed {
        for b in (a + 1)..seed {
            edges.push((a, b));
            sampler.add(a, 1);
            sampler.add(b, 1);
        }
    }

    let mut chosen: Vec<usize> = Vec::with_capacity(m);
    let mut removed: Vec<(usize, u64)> = Vec::with_capacity(m);
    for source in seed..nodes {
        chosen.clear();
        removed.clear();

        for _ in 0..m {
            let target = match sampler.sample(rng) {
                Some(target) => target,
                None => match uniform_unchosen(source, &chosen, rng) {
                    Some(target) => target,
                    None => break,
                },
            };
            removed.push((target, sampler.take(target)));
            chosen.push(target);
        }

        for &(target, weight) in &removed {
            sampler.put(target, weight);
        }
        for &target in &chosen {
            edges.push((target, source));
            sampler.add(target, 1);
        }
        sampler.add(source, chosen.len() as u64);
    }

    edges
}

fn uniform_unchosen(source: usize, chosen: &[usize], rng: &mut impl Rng) -> Option<usize> {
    let candidates: Vec<usize> = (0..source).filter(|n| !chosen.contains(n)).collect();
    candidates.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seird_core::DeterministicRng;
    use std::collections::HashSet;

    #[test]
    fn find_walks_prefix_sums() {
        let mut sampler = DegreeSampler::new(5);
        sampler.add(0, 2);
        sampler.add(2, 3);
        sampler.add(4, 1);
        assert_eq!(sampler.total(), 6);
        assert_eq!(sampler.find(0), 0);
        assert_eq!(sampler.find(1), 0);
        assert_eq!(sampler.find(2), 2);
        assert_eq!(sampler.find(4), 2);
        assert_eq!(sampler.find(5), 4);
    }

    #[test]
    fn take_and_put_restore_weights() {
        let mut sampler = DegreeSampler::new(4);
        for i in 0..4 {
            sampler.add(i, 1);
        }
        let w = sampler.take(1);
        assert_eq!(w, 1);
        assert_eq!(sampler.total(), 3);
        assert_eq!(sampler.find(1), 2);
        sampler.put(1, w);
        assert_eq!(sampler.total(), 4);
        assert_eq!(sampler.find(1), 1);
    }

    #[test]
    fn zero_weight_slots_are_never_sampled() {
        let mut sampler = DegreeSampler::new(6);
        sampler.add(1, 4);
        sampler.add(5, 4);
        let mut rng = DeterministicRng::new(1);
        for _ in 0..500 {
            let slot = sampler.sample(&mut rng).expect("non-empty");
            assert!(slot == 1 || slot == 5, "slot {slot}");
        }
    }

    #[test]
    fn empty_sampler_yields_none() {
        let sampler = DegreeSampler::new(3);
        let mut rng = DeterministicRng::new(1);
        assert!(sampler.sample(&mut rng).is_none());

        let none = DegreeSampler::new(0);
        assert!(none.is_empty());
        assert_eq!(none.find(5), 0);
        assert!(none.sample(&mut rng).is_none());
    }

    #[test]
    fn heavy_slot_dominates() {
        let mut sampler = DegreeSampler::new(3);
        sampler.add(0, 1);
        sampler.add(1, 98);
        sampler.add(2, 1);
        let mut rng = DeterministicRng::new(5);
        let hits = (0..10_000)
            .filter(|_| sampler.sample(&mut rng) == Some(1))
            .count();
        assert!(hits > 9_500, "hits={hits}");
    }

    #[test]
    fn edge_count_matches_formula() {
        let mut rng = DeterministicRng::new(3);
        for (n, m) in [(10, 2), (50, 1), (30, 5), (4, 3)] {
            let edges = barabasi_albert(n, m, &mut rng);
            assert_eq!(edges.len(), expected_edge_count(n, m), "n={n} m={m}");
        }
    }

    #[test]
    fn no_duplicate_or_self_edges() {
        let mut rng = DeterministicRng::new(9);
        let edges = barabasi_albert(200, 4, &mut rng);
        let mut seen = HashSet::new();
        for &(a, b) in &edges {
            assert!(a < b, "edge ({a}, {b}) not ordered earlier-later");
            assert!(seen.insert((a, b)), "duplicate edge ({a}, {b})");
        }
    }

    #[test]
    fn every_later_node_gets_m_edges_to_earlier_nodes() {
        let mut rng = DeterministicRng::new(4);
        let m = 3;
        let edges = barabasi_albert(40, m, &mut rng);
        for source in m..40 {
            let back = edges.iter().filter(|&&(_, b)| b == source).count();
            assert_eq!(back, m, "node {source}");
        }
    }

    #[test]
    fn density_one_builds_a_tree() {
        let mut rng = DeterministicRng::new(2);
        let edges = barabasi_albert(25, 1, &mut rng);
        assert_eq!(edges.len(), 24);
        assert_eq!(edges[0], (0, 1));
    }

    #[test]
    fn same_seed_same_edges() {
        let a = barabasi_albert(100, 3, &mut DeterministicRng::new(77));
        let b = barabasi_albert(100, 3, &mut DeterministicRng::new(77));
        assert_eq!(a, b);
    }
}
