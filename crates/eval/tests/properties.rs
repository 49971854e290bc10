// Property-based tests for the evaluation pipeline.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use sificc_eval::config::EvalConfig;
use sificc_eval::engine::run;
use sificc_eval::model::{ReconMeta, ReconTable, ReconstructedCandidate, TruthEvent, Vec3};
use sificc_eval::MemoryTruthSource;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (-20.0f64..20.0, -20.0f64..20.0, -20.0f64..20.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_truth() -> impl Strategy<Value = TruthEvent> {
    (any::<bool>(), any::<bool>(), arb_vec3(), arb_vec3(), 0.1f64..5.0, 0.1f64..5.0).prop_map(
        |(distributed, ideal, e, p, ee, pe)| TruthEvent {
            is_distributed_clusters: distributed,
            is_ideal_compton: ideal,
            real_e_position: e,
            real_p_position: p,
            real_e_energy: ee,
            real_p_energy: pe,
        },
    )
}

/// Truth events plus candidates at a random subset of their identifiers.
fn arb_run() -> impl Strategy<Value = (Vec<TruthEvent>, Vec<ReconstructedCandidate>)> {
    prop::collection::vec(arb_truth(), 0..60).prop_flat_map(|events| {
        let n = events.len();
        let cands = prop::collection::vec(
            (any::<bool>(), arb_vec3(), arb_vec3(), 0.1f64..5.0, 0.1f64..5.0),
            n,
        );
        (Just(events), cands).prop_map(|(events, picks)| {
            let candidates = picks
                .into_iter()
                .enumerate()
                .filter(|(_, (keep, ..))| *keep)
                .map(|(i, (_, e, p, ee, pe))| ReconstructedCandidate {
                    global_event_number: i as i64,
                    e_position: e,
                    p_position: p,
                    e_energy: ee,
                    p_energy: pe,
                })
                .collect();
            (events, candidates)
        })
    })
}

fn table(n: usize, candidates: Vec<ReconstructedCandidate>) -> ReconTable {
    ReconTable {
        meta: ReconMeta {
            input_filename: None,
            start_event: 0,
            stop_event: n as i64 - 1,
            total_sim_nev: n as i64,
        },
        candidates,
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn counters_are_nested((events, candidates) in arb_run()) {
        let n = events.len();
        let report = run(&EvalConfig::default(), table(n, candidates), MemoryTruthSource::new(events)).unwrap();
        let s = report.stats;
        prop_assert_eq!(s.processed, n as u64);
        prop_assert!(s.matches <= s.compton);
        prop_assert!(s.compton <= s.valid);
        prop_assert!(s.valid <= s.processed);
        prop_assert!(s.missing <= s.compton);
    }

    #[test]
    fn ratios_within_unit_interval((events, candidates) in arb_run()) {
        let n = events.len();
        let report = run(&EvalConfig::default(), table(n, candidates), MemoryTruthSource::new(events)).unwrap();
        let s = report.stats;
        if let Some(e) = s.efficiency {
            prop_assert!((0.0..=1.0).contains(&e));
        } else {
            prop_assert_eq!(s.compton, 0);
        }
        if let Some(p) = s.purity {
            prop_assert!((0.0..=1.0).contains(&p));
        } else {
            prop_assert_eq!(s.recon_total, 0);
        }
        if let Some(mean) = s.euclidean_mean {
            prop_assert!(mean >= 0.0);
            prop_assert!(s.euclidean_std.unwrap() >= 0.0);
        }
        for (_, m) in s.mismatches.iter() {
            prop_assert!(*m <= s.recon_total);
        }
    }

    #[test]
    fn non_distributed_events_never_counted((events, candidates) in arb_run()) {
        let excluded: Vec<TruthEvent> = events
            .into_iter()
            .map(|mut e| { e.is_distributed_clusters = false; e })
            .collect();
        let n = excluded.len();
        let recon_total = candidates.len() as u64;
        let report = run(&EvalConfig::default(), table(n, candidates), MemoryTruthSource::new(excluded)).unwrap();
        let s = report.stats;
        prop_assert_eq!(s.valid, 0);
        prop_assert_eq!(s.compton, 0);
        prop_assert_eq!(s.matches, 0);
        prop_assert_eq!(s.distance_samples, 0);
        for (_, f) in s.criterion_failures.iter() {
            prop_assert_eq!(*f, 0);
        }
        for (_, m) in s.mismatches.iter() {
            prop_assert_eq!(*m, recon_total);
        }
    }

    #[test]
    fn runs_are_deterministic((events, candidates) in arb_run()) {
        let n = events.len();
        let config = EvalConfig::default();
        let a = run(&config, table(n, candidates.clone()), MemoryTruthSource::new(events.clone())).unwrap();
        let b = run(&config, table(n, candidates), MemoryTruthSource::new(events)).unwrap();
        prop_assert_eq!(a.stats, b.stats);
    }
}
