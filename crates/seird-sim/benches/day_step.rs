//! Day-step throughput on the preset regions.
//!
//! Run with:
//! ```sh
//! cargo bench --bench day_step
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use seird_core::{Region, Scenario, SimulationParams};
use seird_sim::{Simulation, build_graph};

const SEED: u64 = 0x5E1D;

fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph.build");
    group.sample_size(10);

    for region in [Region::Vancouver, Region::Bc] {
        let scenario = Scenario::from_region(region);
        group.throughput(Throughput::Elements(region.population() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(region.as_str()),
            &scenario,
            |b, scenario| {
                b.iter(|| {
                    let graph = build_graph(scenario, SEED).expect("preset builds");
                    black_box(graph.edge_count())
                });
            },
        );
    }

    group.finish();
}

fn bench_week(c: &mut Criterion) {
    let mut group = c.benchmark_group("sim.week");

    for region in [Region::Vancouver, Region::Bc] {
        let scenario = Scenario::from_region(region);
        let graph = build_graph(&scenario, SEED).expect("preset builds");
        let params = SimulationParams {
            initial_infection_rate: 0.3,
            initial_infected: 200,
            seed: Some(SEED),
            retain_snapshots: false,
            ..scenario.params.clone()
        };
        group.throughput(Throughput::Elements(graph.node_count() as u64 * 7));
        group.bench_with_input(
            BenchmarkId::from_parameter(region.as_str()),
            &params,
            |b, params| {
                b.iter(|| {
                    let mut sim = Simulation::new(&graph, params.clone()).expect("valid params");
                    black_box(sim.step_week().new_cases)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_graph_build, bench_week);
criterion_main!(benches);
