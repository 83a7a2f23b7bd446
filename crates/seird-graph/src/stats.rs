//! Summary statistics for a contact graph.
//!
//! # Statistics Provided
//!
//! - **node_count** / **edge_count**: graph totals.
//! - **intra_edge_count** / **bridge_edge_count**: edges inside one
//!   community versus edges joining two communities.
//! - **density**: `edge_count / (n * (n - 1) / 2)`, zero for graphs with
//!   fewer than two nodes.
//! - **mean_degree** / **max_degree**: over all nodes.
//! - **isolated_node_count**: nodes with no contacts at all.
//! - **component_count**: connected components. With a positive bridge
//!   count every community is reachable, so this is normally 1.
//! - **communities**: per-community node, edge and degree figures.

use petgraph::algo::connected_components;
use serde::Serialize;

use crate::build::ContactGraph;

/// Per-community slice of [`GraphStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityStats {
    pub name: String,
    pub offset: usize,
    pub population: usize,
    pub intra_edges: usize,
    /// Bridge edges with one endpoint in this community.
    pub bridge_edges: usize,
    pub max_degree: usize,
}

/// Summary statistics for a [`ContactGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub intra_edge_count: usize,
    pub bridge_edge_count: usize,
    pub density: f64,
    pub mean_degree: f64,
    pub max_degree: usize,
    pub isolated_node_count: usize,
    pub component_count: usize,
    pub content_hash: String,
    pub communities: Vec<CommunityStats>,
}

impl GraphStats {
    /// Compute statistics for `graph`.
    #[must_use]
    pub fn from_graph(graph: &ContactGraph) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let mut communities: Vec<CommunityStats> = graph
            .communities()
            .iter()
            .map(|range| CommunityStats {
                name: range.name.clone(),
                offset: range.offset,
                population: range.population,
                intra_edges: 0,
                bridge_edges: 0,
                max_degree: 0,
            })
            .collect();

        let mut bridge_edge_count = 0;
        for (a, b) in graph.edges() {
            let (Some(ca), Some(cb)) = (graph.community_of(a), graph.community_of(b)) else {
                continue;
            };
            if graph.is_bridge(a, b) {
                bridge_edge_count += 1;
                communities[ca].bridge_edges += 1;
                communities[cb].bridge_edges += 1;
            } else {
                communities[ca].intra_edges += 1;
            }
        }

        let mut max_degree = 0;
        let mut isolated_node_count = 0;
        for node in 0..node_count {
            let degree = graph.degree(node);
            max_degree = max_degree.max(degree);
            if degree == 0 {
                isolated_node_count += 1;
            }
            if let Some(stats) = graph.community_of(node).and_then(|c| communities.get_mut(c)) {
                stats.max_degree = stats.max_degree.max(degree);
            }
        }

        Self {
            node_count,
            edge_count,
            intra_edge_count: edge_count - bridge_edge_count,
            bridge_edge_count,
            density: compute_density(node_count, edge_count),
            mean_degree: compute_mean_degree(node_count, edge_count),
            max_degree,
            isolated_node_count,
            component_count: connected_components(graph.graph()),
            content_hash: graph.content_hash().to_string(),
            communities,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let n = node_count as f64;
    edge_count as f64 / (n * (n - 1.0) / 2.0)
}

#[allow(clippy::cast_precision_loss)]
fn compute_mean_degree(node_count: usize, edge_count: usize) -> f64 {
    if node_count == 0 {
        return 0.0;
    }
    2.0 * edge_count as f64 / node_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use seird_core::Community;

    fn fixture() -> ContactGraph {
        // a: 0-1-2 path, b: 3-4 edge, one bridge 2-3, c: 5-6 on its own
        let communities = vec![
            Community::new("a", 3, 1),
            Community::new("b", 2, 1),
            Community::new("c", 2, 1),
        ];
        ContactGraph::from_edges(&communities, &[(0, 1), (1, 2), (3, 4), (2, 3), (5, 6)])
            .expect("fixture")
    }

    #[test]
    fn splits_intra_and_bridge_edges() {
        let stats = GraphStats::from_graph(&fixture());
        assert_eq!(stats.node_count, 7);
        assert_eq!(stats.edge_count, 5);
        assert_eq!(stats.bridge_edge_count, 1);
        assert_eq!(stats.intra_edge_count, 4);
        assert_eq!(stats.communities[0].intra_edges, 2);
        assert_eq!(stats.communities[0].bridge_edges, 1);
        assert_eq!(stats.communities[1].bridge_edges, 1);
        assert_eq!(stats.communities[2].bridge_edges, 0);
    }

    #[test]
    fn degrees_and_components() {
        let stats = GraphStats::from_graph(&fixture());
        assert_eq!(stats.max_degree, 2);
        assert_eq!(stats.isolated_node_count, 0);
        assert_eq!(stats.component_count, 2);
        assert!((stats.mean_degree - 10.0 / 7.0).abs() < 1e-12);
        assert_eq!(stats.communities[2].max_degree, 1);
    }

    #[test]
    fn density_of_complete_graph_is_one() {
        let communities = vec![Community::new("k", 3, 1)];
        let graph = ContactGraph::from_edges(&communities, &[(0, 1), (1, 2), (0, 2)]).expect("k3");
        let stats = GraphStats::from_graph(&graph);
        assert!((stats.density - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn isolated_nodes_counted() {
        let communities = vec![Community::new("a", 4, 1)];
        let graph = ContactGraph::from_edges(&communities, &[(0, 1)]).expect("graph");
        let stats = GraphStats::from_graph(&graph);
        assert_eq!(stats.isolated_node_count, 2);
        assert_eq!(stats.component_count, 3);
    }

    #[test]
    fn serializes_to_json() {
        let stats = GraphStats::from_graph(&fixture());
        let json = serde_json::to_value(&stats).expect("json");
        assert_eq!(json["bridge_edge_count"], 1);
        assert_eq!(json["communities"][1]["name"], "b");
    }
}
