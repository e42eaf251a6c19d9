//! End-to-end simulation tests.
//!
//! These tests pin the documented scenarios, check reproducibility under a
//! seeded rng, and verify the run invariants over random graphs.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use worm_defense::graph::{barabasi_albert, erdos_renyi, Network};
use worm_defense::simulation::{
    run, HistoryRecord, NodeState, Simulation, SimulationParams, Termination,
};
use worm_defense::{NonConvergenceReason, WormError};

fn path(n: u32) -> Network<u32> {
    Network::from_edges((1..n).map(|i| (i, i + 1))).unwrap()
}

/// Scenario A: both processes start on the same node. Inoculation is
/// applied second and clears the infection, so the run ends before the
/// first period.
#[test]
fn test_coinciding_start_nodes() {
    let network = Network::from_edges([(1, 2)]).unwrap();
    let params = SimulationParams::defense(1, 1.0, 1, 0.0);
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let report = run(&network, &params, &mut rng).unwrap();

    assert_eq!(report.termination, Termination::Extinguished);
    assert_eq!(report.periods, 0);
    assert_eq!(report.history.records(), &[HistoryRecord::new(0, 0, 1)]);
    assert_eq!(report.state_of(&1), Some(NodeState::Inoculated));
    assert_eq!(report.state_of(&2), Some(NodeState::Susceptible));
}

/// Scenario B: the worm is walled off by an inoculated node that can never
/// spread, so the infected count is stuck at 2 of 3.
#[test]
fn test_walled_off_worm_is_reported_as_stalled() {
    let network = path(3);
    let params = SimulationParams::defense(1, 1.0, 3, 0.0);

    let mut sim = Simulation::new(&network, &params).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(sim.node_state(&1).unwrap(), NodeState::Infected);
    assert_eq!(sim.node_state(&3).unwrap(), NodeState::Inoculated);

    let first = sim.step(&mut rng).unwrap();
    assert_eq!(first.newly_infected, 1);
    assert_eq!(sim.node_state(&2).unwrap(), NodeState::Infected);
    assert_eq!(sim.termination(), None);

    let second = sim.step(&mut rng).unwrap();
    assert!(second.is_quiet());
    assert!(!sim.can_progress());

    // The cut-off run keeps its trace and final states
    let report = run(&network, &params.with_max_periods(1_000), &mut rng).unwrap();
    assert_eq!(
        report.termination,
        Termination::NotConverged(NonConvergenceReason::Stalled)
    );
    assert_eq!(report.periods, 2);
    assert_eq!(
        report.history.records(),
        &[
            HistoryRecord::new(0, 1, 1),
            HistoryRecord::new(1, 2, 1),
            HistoryRecord::new(2, 2, 1),
        ]
    );
    assert_eq!(report.state_of(&1), Some(NodeState::Infected));
    assert_eq!(report.state_of(&2), Some(NodeState::Infected));
    assert_eq!(report.state_of(&3), Some(NodeState::Inoculated));

    match report.into_converged().unwrap_err() {
        WormError::NonConvergence {
            periods,
            infected,
            reason,
        } => {
            assert_eq!(periods, 2);
            assert_eq!(infected, 2);
            assert_eq!(reason, NonConvergenceReason::Stalled);
        },
        other => panic!("unexpected error: {other}"),
    }
}

/// Scenario C: a single isolated node terminates immediately with one record.
#[test]
fn test_isolated_node() {
    let mut network: Network<u32> = Network::new();
    network.add_node(1);
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let report = run(&network, &SimulationParams::defense(1, 0.7, 1, 0.3), &mut rng).unwrap();
    assert_eq!(report.termination, Termination::Extinguished);
    assert_eq!(report.history.records(), &[HistoryRecord::new(0, 0, 1)]);
    assert_eq!(report.state_of(&1), Some(NodeState::Inoculated));

    // Without inoculation the lone infected node is already total saturation
    let report = run(&network, &SimulationParams::new(1, 0.7), &mut rng).unwrap();
    assert_eq!(report.termination, Termination::Saturated);
    assert_eq!(report.history.records(), &[HistoryRecord::new(0, 1, 0)]);
}

#[test]
fn test_propagation_only_saturates_connected_graph() {
    let network = barabasi_albert(40, 2, &mut StdRng::seed_from_u64(15)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let report = run(&network, &SimulationParams::new(0, 0.5), &mut rng).unwrap();
    assert_eq!(report.termination, Termination::Saturated);
    assert_eq!(report.final_infected(), 40);
    assert_eq!(report.final_inoculated(), 0);

    // Infection never recedes without inoculation
    let counts: Vec<_> = report.history.iter().map(|r| r.infected).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_defense_on_connected_graph_extinguishes() {
    let network = barabasi_albert(40, 2, &mut StdRng::seed_from_u64(15)).unwrap();
    let params = SimulationParams::defense(0, 0.4, 39, 0.6).with_max_periods(10_000);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let report = run(&network, &params, &mut rng).unwrap();
    assert_eq!(report.termination, Termination::Extinguished);
    assert_eq!(report.final_infected(), 0);
    assert!(report.final_inoculated() >= 1);
    assert_eq!(report.nodes_in(NodeState::Infected).len(), 0);
}

#[test]
fn test_seeded_runs_are_identical() {
    let network = barabasi_albert(40, 2, &mut StdRng::seed_from_u64(15)).unwrap();
    let params = SimulationParams::defense(0, 0.3, 20, 0.3).with_max_periods(10_000);

    let a = run(&network, &params, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    let b = run(&network, &params, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();

    assert_eq!(a.history, b.history);
    assert_eq!(a.final_states, b.final_states);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_report_json_shape() {
    let network = path(3);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let report = run(&network, &SimulationParams::new(2, 1.0), &mut rng).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["termination"], "saturated");
    assert_eq!(json["node_count"], 3);
    assert_eq!(json["periods"], 1);
    assert_eq!(json["history"][0]["infected"], 1);
    assert_eq!(json["history"][1]["infected"], 3);
    assert_eq!(json["final_states"][0]["state"], "infected");
}

/// A cut-off run serializes its reason alongside the partial history.
#[test]
fn test_not_converged_report_json() {
    let network = path(3);
    let params = SimulationParams::defense(1, 0.0, 3, 0.0);
    let report = run(&network, &params, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["termination"]["not_converged"], "stalled");
    assert_eq!(json["history"].as_array().map(Vec::len), Some(2));
}

fn random_network(n: usize, p: f64, seed: u64) -> Network<usize> {
    erdos_renyi(n, p, &mut StdRng::seed_from_u64(seed)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Periods are consecutive from 0, there is one record per period plus
    /// the final snapshot, and counts never exceed the node total.
    #[test]
    fn prop_history_invariants(
        n in 1usize..25,
        edge_p in 0.0f64..=1.0,
        graph_seed in any::<u64>(),
        run_seed in any::<u64>(),
        p_inf in 0.0f64..=1.0,
        p_inoc in 0.0f64..=1.0,
        starts in (0usize..25, 0usize..25),
    ) {
        let network = random_network(n, edge_p, graph_seed);
        let params = SimulationParams::defense(starts.0 % n, p_inf, starts.1 % n, p_inoc)
            .with_max_periods(2_000);
        let mut rng = ChaCha8Rng::seed_from_u64(run_seed);

        match run(&network, &params, &mut rng) {
            Ok(report) => {
                prop_assert_eq!(report.history.len(), report.periods + 1);
                for (i, record) in report.history.iter().enumerate() {
                    prop_assert_eq!(record.period, i);
                    prop_assert!(record.infected + record.inoculated <= n);
                }

                let infected = report.nodes_in(NodeState::Infected).len();
                let inoculated = report.nodes_in(NodeState::Inoculated).len();
                prop_assert_eq!(report.final_infected(), infected);
                prop_assert_eq!(report.final_inoculated(), inoculated);

                match report.termination {
                    Termination::Extinguished => prop_assert_eq!(infected, 0),
                    Termination::Saturated => {
                        prop_assert_eq!(infected, n);
                        prop_assert_eq!(inoculated, 0);
                    },
                    Termination::NotConverged(_) => {
                        prop_assert!(infected > 0 && infected < n);
                    },
                }
            },
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// Once inoculated, a node stays inoculated for the rest of the run.
    #[test]
    fn prop_inoculation_is_absorbing(
        n in 2usize..20,
        edge_p in 0.1f64..=1.0,
        graph_seed in any::<u64>(),
        run_seed in any::<u64>(),
        p_inf in 0.0f64..=1.0,
        p_inoc in 0.0f64..=1.0,
    ) {
        let network = random_network(n, edge_p, graph_seed);
        let params = SimulationParams::defense(0, p_inf, n - 1, p_inoc);
        let mut sim = Simulation::new(&network, &params).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(run_seed);

        for _ in 0..200 {
            if sim.termination().is_some() {
                break;
            }
            let before = sim.state().states().inoculated_nodes();
            let outcome = sim.step(&mut rng).unwrap();

            let states = sim.state().states();
            for idx in &before {
                prop_assert_eq!(states.get(*idx), NodeState::Inoculated);
            }
            prop_assert_eq!(
                states.inoculated_count(),
                before.len() + outcome.newly_inoculated
            );
            prop_assert!(states.infected_count() + states.inoculated_count() <= n);
        }
    }
}
