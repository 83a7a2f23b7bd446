use proptest::prelude::*;
use seird_core::{Community, DeterministicRng, Region, Scenario, SimulationParams, Topology};
use seird_graph::ContactGraph;
use seird_sim::{HealthState, Simulation, StateStore, check_report, run_scenario};

use HealthState::{Dead, Exposed, Infectious, Recovered, Susceptible};

fn two_communities(seed: u64) -> ContactGraph {
    let communities = vec![Community::new("west", 10, 2), Community::new("east", 10, 2)];
    ContactGraph::build(&communities, 1, Topology::Chain, &mut DeterministicRng::new(seed))
        .expect("graph")
}

fn certain_spread() -> SimulationParams {
    SimulationParams {
        initial_infection_rate: 1.0,
        recovery_rate: 1.0,
        mortality_rate: 0.0,
        incubation_period: 1,
        mutation_weeks: Vec::new(),
        total_weeks: 2,
        seed: Some(42),
        ..SimulationParams::default()
    }
}

fn only(node: usize, state: HealthState, len: usize) -> StateStore {
    let mut states = vec![Susceptible; len];
    states[node] = state;
    StateStore::from_states(states)
}

#[test]
fn single_infectious_node_exposes_every_neighbour_then_recovers() {
    let graph = two_communities(1);
    let neighbours: Vec<usize> = graph.neighbors(0).collect();
    assert!(!neighbours.is_empty());

    let store = only(0, Infectious, graph.node_count());
    let mut sim = Simulation::from_store(&graph, certain_spread(), store).expect("sim");
    assert_eq!(sim.cumulative_cases(), 1);

    let day1 = sim.step_day();
    assert_eq!(day1.new_cases, 0);
    assert_eq!(sim.store().state(0), Some(Recovered));
    for &n in &neighbours {
        assert_eq!(sim.store().state(n), Some(Exposed), "neighbour {n}");
    }
    let untouched = (1..graph.node_count())
        .filter(|n| !neighbours.contains(n))
        .all(|n| sim.store().state(n) == Some(Susceptible));
    assert!(untouched);

    let day2 = sim.step_day();
    assert_eq!(day2.new_cases, neighbours.len());
    for &n in &neighbours {
        assert_eq!(sim.store().state(n), Some(Infectious), "neighbour {n}");
    }
    assert_eq!(sim.cumulative_cases(), 1 + neighbours.len());
    assert_eq!(sim.ledger().total(), neighbours.len());
}

#[test]
fn exposed_seed_becomes_a_case_after_incubation() {
    let graph = two_communities(2);
    let store = only(0, Exposed, graph.node_count());
    let mut sim = Simulation::from_store(&graph, certain_spread(), store).expect("sim");

    let day1 = sim.step_day();
    assert_eq!(day1.new_cases, 1);
    assert_eq!(day1.cases_by_community, vec![1, 0]);
    assert_eq!(sim.store().state(0), Some(Infectious));
    assert_eq!(sim.ledger().get("west"), Some(1));

    sim.step_day();
    assert_eq!(sim.store().state(0), Some(Recovered));
    assert!(graph.neighbors(0).all(|n| sim.store().state(n) == Some(Exposed)));
}

#[test]
fn certain_spread_reaches_the_other_community() {
    let graph = two_communities(3);
    let store = only(0, Infectious, graph.node_count());
    let params = SimulationParams {
        total_weeks: 3,
        ..certain_spread()
    };
    let report = Simulation::from_store(&graph, params, store).expect("sim").run();

    // Two days per hop; 21 days cover any path in this graph.
    assert_eq!(report.final_counts.susceptible, 0);
    assert!(report.ledger.get("east").is_some_and(|cases| cases > 0));
    assert!(check_report(&report, graph.node_count()).passed);
}

#[test]
fn zero_infection_never_spreads() {
    let graph = two_communities(4);
    let params = SimulationParams {
        initial_infection_rate: 0.0,
        initial_infected: 5,
        total_weeks: 4,
        seed: Some(9),
        ..SimulationParams::default()
    };
    let report = Simulation::new(&graph, params).expect("sim").run();

    assert!(report.total_new_cases() <= report.initial_infected);
    assert_eq!(report.initial_counts.exposed, 5);
    let mut previous = report.initial_counts.exposed;
    for week in &report.weeks {
        assert!(week.counts.exposed <= previous, "week {}", week.week);
        assert_eq!(week.counts.susceptible, 15);
        previous = week.counts.exposed;
    }
}

#[test]
fn certain_mortality_leaves_no_survivors() {
    let graph = two_communities(5);
    let params = SimulationParams {
        initial_infection_rate: 0.5,
        recovery_rate: 1.0,
        mortality_rate: 1.0,
        incubation_period: 2,
        initial_infected: 3,
        total_weeks: 3,
        seed: Some(11),
        ..SimulationParams::default()
    };
    let mut sim = Simulation::new(&graph, params).expect("sim");

    for _ in 0..21 {
        let before = sim.store().states().to_vec();
        let outcome = sim.step_day();
        let after = sim.store().states();
        assert!(after.iter().all(|&s| s != Recovered));
        for (node, &state) in before.iter().enumerate() {
            if state == Infectious {
                assert_eq!(after[node], Dead, "node {node} day {}", sim.day());
            }
        }
        let died = before
            .iter()
            .filter(|&&s| s == Infectious)
            .count();
        assert_eq!(outcome.deaths, died);
    }
    let report = sim.into_report();
    assert_eq!(report.final_counts.recovered, 0);
    assert_eq!(report.final_counts.dead, report.total_deaths());
}

#[test]
fn preset_region_runs_clean() {
    let mut scenario = Scenario::from_region(Region::Vancouver);
    scenario.params.total_weeks = 3;
    scenario.params.seed = Some(2024);
    let report = run_scenario(&scenario).expect("run");

    assert_eq!(report.node_count, Region::Vancouver.population());
    assert_eq!(report.ledger.entries().len(), Region::Vancouver.community_count());
    assert_eq!(report.weeks.len(), 3);
    let result = check_report(&report, report.node_count);
    assert!(result.passed, "{:?}", result.violations);
}

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    (
        prop::collection::vec((5_usize..40, 1_usize..4), 1..4),
        0_usize..6,
        0.0_f64..=1.0,
        0.0_f64..=1.0,
        0.0_f64..=0.2,
        1_u32..6,
        1_u32..5,
        any::<u64>(),
    )
        .prop_map(
            |(rows, bridges, infection, recovery, mortality, incubation, weeks, seed)| {
                let communities: Vec<Community> = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, (population, density))| {
                        Community::new(format!("c{i}"), population, density.min(population - 1))
                    })
                    .collect();
                Scenario {
                    communities,
                    params: SimulationParams {
                        initial_infection_rate: infection,
                        recovery_rate: recovery,
                        mortality_rate: mortality,
                        incubation_period: incubation,
                        mutation_weeks: vec![1, 3],
                        mutation_multiplier: 1.5,
                        inter_region_edge_count: bridges,
                        total_weeks: weeks,
                        initial_infected: 3,
                        seed: Some(seed),
                        ..SimulationParams::default()
                    },
                }
            },
        )
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn same_seed_replays_and_reports_are_consistent(scenario in arb_scenario()) {
        let first = run_scenario(&scenario).expect("run");
        let second = run_scenario(&scenario).expect("replay");
        prop_assert_eq!(&first, &second);

        let result = check_report(&first, first.node_count);
        prop_assert!(result.passed, "{:?}", result.violations);
        prop_assert!(first.final_counts.ever_infected() >= first.initial_infected);
    }
}
