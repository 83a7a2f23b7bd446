use proptest::prelude::*;
use seird_core::{Community, DeterministicRng, Region, Topology};
use seird_graph::attach::expected_edge_count;
use seird_graph::{ContactGraph, GraphStats};

/// 1..=6 communities, each with a valid density for its population.
fn arb_communities() -> impl Strategy<Value = Vec<Community>> {
    prop::collection::vec(
        (2_usize..40).prop_flat_map(|population| (Just(population), 1..population)),
        1..=6,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (population, density))| Community::new(format!("c{i}"), population, density))
            .collect()
    })
}

fn arb_topology() -> impl Strategy<Value = Topology> {
    prop_oneof![Just(Topology::Chain), Just(Topology::Ring)]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn node_ranges_are_contiguous_and_disjoint(
        communities in arb_communities(),
        bridges in 0_usize..30,
        topology in arb_topology(),
        seed in any::<u64>(),
    ) {
        let graph = ContactGraph::build(&communities, bridges, topology, &mut DeterministicRng::new(seed))
            .expect("valid table");

        let total: usize = communities.iter().map(|c| c.population).sum();
        prop_assert_eq!(graph.node_count(), total);

        let mut expected_offset = 0;
        for (range, community) in graph.communities().iter().zip(&communities) {
            prop_assert_eq!(&range.name, &community.name);
            prop_assert_eq!(range.offset, expected_offset);
            prop_assert_eq!(range.population, community.population);
            expected_offset += community.population;
        }

        for node in 0..graph.node_count() {
            let owner = graph.community_of(node).expect("every node has a community");
            prop_assert!(graph.communities()[owner].contains(node));
            let others = graph
                .communities()
                .iter()
                .filter(|range| range.contains(node))
                .count();
            prop_assert_eq!(others, 1);
        }
    }

    #[test]
    fn intra_edges_match_attachment_formula(
        communities in arb_communities(),
        bridges in 0_usize..30,
        seed in any::<u64>(),
    ) {
        let graph = ContactGraph::build(&communities, bridges, Topology::Chain, &mut DeterministicRng::new(seed))
            .expect("valid table");
        let stats = GraphStats::from_graph(&graph);

        for (community, per) in communities.iter().zip(&stats.communities) {
            prop_assert_eq!(per.intra_edges, expected_edge_count(community.population, community.density));
        }
        let pairs = communities.len().saturating_sub(1);
        prop_assert!(stats.bridge_edge_count <= pairs * bridges);
        if bridges > 0 {
            prop_assert_eq!(stats.component_count, 1);
        }
    }

    #[test]
    fn chain_only_couples_neighbours(
        communities in arb_communities(),
        bridges in 1_usize..30,
        seed in any::<u64>(),
    ) {
        let graph = ContactGraph::build(&communities, bridges, Topology::Chain, &mut DeterministicRng::new(seed))
            .expect("valid table");
        for (a, b) in graph.edges() {
            let ca = graph.community_of(a).expect("a");
            let cb = graph.community_of(b).expect("b");
            prop_assert!(ca.abs_diff(cb) <= 1, "edge {}-{} couples {} and {}", a, b, ca, cb);
        }
    }

    #[test]
    fn ring_adds_only_the_closing_pair(
        communities in arb_communities(),
        bridges in 1_usize..30,
        seed in any::<u64>(),
    ) {
        let graph = ContactGraph::build(&communities, bridges, Topology::Ring, &mut DeterministicRng::new(seed))
            .expect("valid table");
        let last = communities.len() - 1;
        for (a, b) in graph.edges() {
            let ca = graph.community_of(a).expect("a");
            let cb = graph.community_of(b).expect("b");
            let closing = last >= 2 && ca.min(cb) == 0 && ca.max(cb) == last;
            prop_assert!(ca.abs_diff(cb) <= 1 || closing);
        }
    }

    #[test]
    fn same_seed_same_graph(communities in arb_communities(), seed in any::<u64>()) {
        let a = ContactGraph::build(&communities, 5, Topology::Chain, &mut DeterministicRng::new(seed))
            .expect("a");
        let b = ContactGraph::build(&communities, 5, Topology::Chain, &mut DeterministicRng::new(seed))
            .expect("b");
        prop_assert_eq!(a.content_hash(), b.content_hash());
        prop_assert_eq!(a.edges().collect::<Vec<_>>(), b.edges().collect::<Vec<_>>());
    }
}

#[test]
fn vancouver_preset_builds() {
    let region = Region::Vancouver;
    let graph = ContactGraph::build(
        &region.communities(),
        region.inter_region_edge_count(),
        Topology::Chain,
        &mut DeterministicRng::new(2024),
    )
    .expect("preset graph");
    let stats = GraphStats::from_graph(&graph);

    assert_eq!(graph.node_count(), 6649);
    assert_eq!(stats.communities.len(), 22);
    assert_eq!(stats.component_count, 1);
    assert_eq!(stats.isolated_node_count, 0);
    // 21 bridged pairs with at most 55 bridges each
    assert!(stats.bridge_edge_count <= 21 * 55);
    assert!(stats.bridge_edge_count > 21 * 50);
}

#[test]
fn scale_free_hubs_emerge() {
    let communities = vec![Community::new("big", 3000, 2)];
    let graph = ContactGraph::build(&communities, 0, Topology::Chain, &mut DeterministicRng::new(1))
        .expect("graph");
    let stats = GraphStats::from_graph(&graph);
    // Uniform attachment would keep the max degree near the mean (4).
    assert!(stats.max_degree > 40, "max degree {}", stats.max_degree);
}
