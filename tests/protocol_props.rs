// Property-based tests for the round protocol
//
// Invariants:
// 1. Every round collects exactly one report per reaction before `update`
// 2. `update` fires exactly once per round
// 3. Committed levels never leave [0, MAX_LEVELS]
// 4. Delay tables survive compilation and re-parsing unchanged

#![allow(clippy::unwrap_used)]

use levelnet::protocol::{Coordinator, CoordinatorState, Report, SubstrateCell};
use levelnet::{compile, Delay, DelayTable, ExecutorConfig, Increment, LevelResult, Model, RoundExecutor};
use proptest::prelude::*;

fn delay_strategy() -> impl Strategy<Value = Delay> {
    prop_oneof![
        1 => Just(Delay::Never),
        3 => (0u32..20).prop_map(Delay::Finite),
    ]
}

fn increment_strategy() -> impl Strategy<Value = Increment> {
    prop_oneof![Just(Increment::Up), Just(Increment::Down)]
}

/// A random model with substrates `S0..Sn`, one degradation per substrate
/// and catalyzed transitions between distinct ordered pairs.
fn model_strategy() -> impl Strategy<Value = Model> {
    (1u32..4, 1usize..4).prop_flat_map(|(levels, n)| {
        let side = levels as usize + 1;
        let initial = prop::collection::vec(0..=levels, n);
        let degradations = prop::collection::vec(
            (increment_strategy(), prop::collection::vec(delay_strategy(), side)),
            n,
        );
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|c| (0..n).filter(move |&t| t != c).map(move |t| (c, t)))
            .collect();
        let catalyzed = prop::collection::vec(
            (
                any::<bool>(),
                increment_strategy(),
                prop::collection::vec(prop::collection::vec(delay_strategy(), side), side),
            ),
            pairs.len(),
        );
        (Just(levels), initial, degradations, Just(pairs), catalyzed).prop_map(
            |(levels, initial, degradations, pairs, catalyzed)| {
                let mut builder = Model::builder().levels(levels);
                for (i, level) in initial.iter().enumerate() {
                    builder = builder.substrate(format!("S{i}"), *level);
                }
                for (i, (inc, delays)) in degradations.into_iter().enumerate() {
                    builder = builder.degradation(&format!("d{i}"), format!("S{i}"), inc, DelayTable::vector(delays));
                }
                for (k, ((c, t), (present, inc, rows))) in pairs.into_iter().zip(catalyzed).enumerate() {
                    if present {
                        builder = builder.catalyzed(
                            &format!("c{k}"),
                            format!("S{c}"),
                            format!("S{t}"),
                            inc,
                            DelayTable::matrix(rows),
                        );
                    }
                }
                builder.build().unwrap()
            },
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn coordinator_counts_one_report_per_reaction(
        total in 1usize..12,
        rounds in prop::collection::vec(prop::collection::vec(any::<bool>(), 0..12), 1..6),
    ) {
        let mut coord = Coordinator::new(total);
        for (done, mut fired) in rounds.into_iter().enumerate() {
            fired.resize(total, false);
            fired[0] = true;
            // Firing reactions report first, as only `reacting` opens a round.
            fired.sort_unstable_by(|a, b| b.cmp(a));

            let mut reacting = 0;
            let mut not_reacting = 0;
            for &f in &fired {
                prop_assert!(coord.broadcast().is_err());
                let report = if f { Report::Reacting } else { Report::NotReacting };
                coord.report(report).unwrap();
                if f { reacting += 1 } else { not_reacting += 1 }
                prop_assert!(coord.counter() <= total);
            }
            prop_assert_eq!(reacting + not_reacting, total);
            prop_assert_eq!(coord.state(), CoordinatorState::ReadyToBroadcast);
            prop_assert!(coord.report(Report::Reacting).is_err());
            prop_assert_eq!(coord.broadcast().unwrap(), done as u64 + 1);
            prop_assert!(coord.broadcast().is_err());
        }
    }

    #[test]
    fn commit_clamps_to_nearest_bound(
        max in 1u32..10,
        initial in 0u32..10,
        deltas in prop::collection::vec(-3i64..=3, 0..20),
    ) {
        let mut cell = SubstrateCell::new(initial.min(max), max);
        let mut expected = i64::from(cell.official());
        for d in &deltas {
            cell.apply(*d);
            expected += d;
        }
        cell.commit();
        prop_assert_eq!(i64::from(cell.official()), expected.clamp(0, i64::from(max)));
        prop_assert_eq!(cell.shadow(), i64::from(cell.official()));
    }

    #[test]
    fn executed_levels_stay_in_range(model in model_strategy()) {
        let levels = model.levels().unwrap();
        let config = ExecutorConfig { horizon: 200, max_rounds: 500 };
        let report = RoundExecutor::new(&model, config).unwrap().run().unwrap();
        prop_assert!(report.rounds <= 500);
        for sample in report.trace.samples() {
            prop_assert_eq!(sample.levels.len(), model.substrates().len());
            prop_assert!(sample.levels.values().all(|&l| l <= levels));
        }
        let result = LevelResult::new(report.trace);
        prop_assert_eq!(result.reactant_ids().len(), model.substrates().len());
    }

    #[test]
    fn compiled_tables_round_trip(model in model_strategy()) {
        let network = compile(&model).unwrap();
        let parsed = network.parse_delay_constants().unwrap();
        prop_assert_eq!(parsed.len(), model.reactions().len());
        for (reaction, (_, table)) in model.reactions().iter().zip(parsed) {
            prop_assert_eq!(&table, reaction.table());
        }
    }
}
