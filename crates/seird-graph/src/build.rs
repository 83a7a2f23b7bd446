//! Contact graph construction.
//!
//! # Layout
//!
//! Communities are laid out back to back in list order: community `i` owns
//! the node range `[offset_i, offset_i + population_i)`. Each node's weight
//! in the underlying [`UnGraph`] is the index of its community, so
//! node → community lookup is a single indexed read.
//!
//! ## Edges
//!
//! - **Intra-community**: a Barabási–Albert process per community with
//!   `m = density`, relabelled by the community's offset.
//! - **Bridges**: after community `i` is placed, `inter_region_edge_count`
//!   edges join a uniform node of `i` to a uniform node of `i + 1`. A bridge
//!   that already exists is skipped, so the graph stays simple.
//!
//! [`Topology::Ring`] also bridges the last community back to the first
//! when there are at least three communities.
//!
//! ## Content Hash
//!
//! BLAKE3 over the sorted, normalised edge list. Two graphs with the same
//! hash have identical edges, which is what replaying a seed relies on.

#![allow(clippy::module_name_repetitions)]

use std::ops::Range;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::Rng;
use seird_core::{Community, ConfigError, Topology, total_population, validate_communities};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::attach::{barabasi_albert, expected_edge_count};

// ---------------------------------------------------------------------------
// CommunityRange
// ---------------------------------------------------------------------------

/// Where one community's nodes sit in the global index space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityRange {
    pub name: String,
    pub offset: usize,
    pub population: usize,
}

impl CommunityRange {
    /// Global node ids owned by this community.
    #[must_use]
    pub const fn nodes(&self) -> Range<usize> {
        self.offset..self.offset + self.population
    }

    #[must_use]
    pub const fn contains(&self, node: usize) -> bool {
        node >= self.offset && node < self.offset + self.population
    }
}

// ---------------------------------------------------------------------------
// ContactGraph
// ---------------------------------------------------------------------------

/// Undirected simple contact graph over every community's nodes.
///
/// Built once and read-only afterwards; the simulator only ever borrows it.
#[derive(Debug, Clone)]
pub struct ContactGraph {
    graph: UnGraph<u32, ()>,
    communities: Vec<CommunityRange>,
    content_hash: String,
}

impl ContactGraph {
    /// Build the multi-community graph.
    ///
    /// All randomness comes from `rng`: the same community table, bridge
    /// count, topology and RNG state always produce the same graph.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the community table is empty, has a
    /// duplicate name, or a density outside `1..population`.
    #[instrument(skip(communities, rng), fields(communities = communities.len()))]
    pub fn build(
        communities: &[Community],
        inter_region_edge_count: usize,
        topology: Topology,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        validate_communities(communities)?;

        let node_total = total_population(communities);
        let intra_total: usize = communities
            .iter()
            .map(|c| expected_edge_count(c.population, c.density))
            .sum();
        let bridge_pairs = bridge_pair_count(communities.len(), topology);
        let mut graph = UnGraph::<u32, ()>::with_capacity(
            node_total,
            intra_total + bridge_pairs * inter_region_edge_count,
        );
        let ranges = place_nodes(&mut graph, communities);

        let mut bridges = 0;
        for (index, (community, range)) in communities.iter().zip(&ranges).enumerate() {
            for (a, b) in barabasi_albert(community.population, community.density, rng) {
                graph.add_edge(node(range.offset + a), node(range.offset + b), ());
            }
            if let Some(next) = ranges.get(index + 1) {
                bridges += add_bridges(&mut graph, range, next, inter_region_edge_count, rng);
            }
        }

        if topology == Topology::Ring && ranges.len() >= 3 {
            if let (Some(last), Some(first)) = (ranges.last(), ranges.first()) {
                bridges += add_bridges(&mut graph, last, first, inter_region_edge_count, rng);
            }
        }

        let content_hash = compute_edge_hash(&graph);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            bridges,
            %topology,
            hash = %content_hash,
            "built contact graph"
        );

        Ok(Self {
            graph,
            communities: ranges,
            content_hash,
        })
    }

    /// Build a graph from an explicit edge list over the given communities.
    ///
    /// Duplicate edges collapse to one. Used for fixtures and replays.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEdge`] for self-loops or endpoints past
    /// the node count, plus every error [`validate_communities`] reports.
    pub fn from_edges(
        communities: &[Community],
        edges: &[(usize, usize)],
    ) -> Result<Self, ConfigError> {
        validate_communities(communities)?;

        let node_count = total_population(communities);
        let mut graph = UnGraph::<u32, ()>::with_capacity(node_count, edges.len());
        let ranges = place_nodes(&mut graph, communities);

        for &(from, to) in edges {
            if from == to || from >= node_count || to >= node_count {
                return Err(ConfigError::InvalidEdge {
                    from,
                    to,
                    node_count,
                });
            }
            graph.update_edge(node(from), node(to), ());
        }

        let content_hash = compute_edge_hash(&graph);
        debug!(nodes = node_count, edges = graph.edge_count(), "graph from edge list");
        Ok(Self {
            graph,
            communities: ranges,
            content_hash,
        })
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Neighbours of `node`. Empty for ids outside the graph.
    pub fn neighbors(&self, node_id: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors(node(node_id)).map(NodeIndex::index)
    }

    #[must_use]
    pub fn degree(&self, node_id: usize) -> usize {
        self.neighbors(node_id).count()
    }

    /// Index of the community owning `node`.
    #[must_use]
    pub fn community_of(&self, node_id: usize) -> Option<usize> {
        self.graph
            .node_weight(node(node_id))
            .and_then(|&c| usize::try_from(c).ok())
    }

    #[must_use]
    pub fn community_name(&self, node_id: usize) -> Option<&str> {
        self.community_of(node_id)
            .and_then(|c| self.communities.get(c))
            .map(|range| range.name.as_str())
    }

    /// Community ranges in list order.
    #[must_use]
    pub fn communities(&self) -> &[CommunityRange] {
        &self.communities
    }

    /// `blake3:<hex>` digest of the edge set.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Every edge once, as `(lower id, higher id)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph.edge_references().map(|e| {
            let (a, b) = (e.source().index(), e.target().index());
            (a.min(b), a.max(b))
        })
    }

    /// Whether an edge joins two different communities.
    #[must_use]
    pub fn is_bridge(&self, a: usize, b: usize) -> bool {
        self.community_of(a) != self.community_of(b)
    }

    /// The underlying petgraph graph. Node weights are community indices.
    #[must_use]
    pub const fn graph(&self) -> &UnGraph<u32, ()> {
        &self.graph
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn node(id: usize) -> NodeIndex {
    NodeIndex::new(id)
}

/// Number of community pairs that receive bridges.
const fn bridge_pair_count(communities: usize, topology: Topology) -> usize {
    match topology {
        Topology::Ring if communities >= 3 => communities,
        _ => communities.saturating_sub(1),
    }
}

/// Add every node up front, tagged with its community index.
fn place_nodes(graph: &mut UnGraph<u32, ()>, communities: &[Community]) -> Vec<CommunityRange> {
    let mut ranges = Vec::with_capacity(communities.len());
    let mut offset = 0;
    for (index, community) in communities.iter().enumerate() {
        let tag = u32::try_from(index).unwrap_or(u32::MAX);
        for _ in 0..community.population {
            graph.add_node(tag);
        }
        ranges.push(CommunityRange {
            name: community.name.clone(),
            offset,
            population: community.population,
        });
        offset += community.population;
    }
    ranges
}

/// Add up to `count` uniform bridges between two communities.
///
/// Returns how many were new edges.
fn add_bridges(
    graph: &mut UnGraph<u32, ()>,
    from: &CommunityRange,
    to: &CommunityRange,
    count: usize,
    rng: &mut impl Rng,
) -> usize {
    let before = graph.edge_count();
    for _ in 0..count {
        let a = from.offset + rng.gen_range(0..from.population);
        let b = to.offset + rng.gen_range(0..to.population);
        if graph.find_edge(node(a), node(b)).is_none() {
            graph.add_edge(node(a), node(b), ());
        }
    }
    let added = graph.edge_count() - before;
    debug!(from = %from.name, to = %to.name, requested = count, added, "bridged communities");
    added
}

/// Compute a BLAKE3 hash of the sorted edge list.
fn compute_edge_hash(graph: &UnGraph<u32, ()>) -> String {
    let mut edges: Vec<(usize, usize)> = graph
        .edge_references()
        .map(|e| {
            let (a, b) = (e.source().index(), e.target().index());
            (a.min(b), a.max(b))
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    hasher.update(&(graph.node_count() as u64).to_le_bytes());
    for (a, b) in edges {
        hasher.update(&(a as u64).to_le_bytes());
        hasher.update(&(b as u64).to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
