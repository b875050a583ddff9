//! Property-based tests for the aggregation and comparison core
//!
//! Core properties tested:
//! 1. Per-group counts add up and success rates stay within [0, 100]
//! 2. Percentiles are monotone and hit the sample extremes
//! 3. Groups without successes report all-zero latency figures
//! 4. Comparisons cover the union of backends, zero-filling absent ones
//! 5. Ingestion never panics on arbitrary input

use lbscope::compare::{compare, SharedHistogram};
use lbscope::ingest::{read_observations, LogSchema};
use lbscope::observation::{Observation, ProbeStatus};
use lbscope::percentile::percentile;
use lbscope::stats::aggregate;
use proptest::prelude::*;

fn probe_strategy() -> impl Strategy<Value = Observation> {
    (
        0i64..1_000_000,
        1i64..6,
        any::<bool>(),
        0.0f64..500.0,
    )
        .prop_map(|(ts, backend, ok, rtt)| {
            let port = 8080 + backend as u16;
            if ok {
                Observation::probe(ts, backend, port, ProbeStatus::Success, Some(rtt))
            } else {
                Observation::probe(ts, backend, port, ProbeStatus::Failure, None)
            }
        })
}

fn request_strategy() -> impl Strategy<Value = Observation> {
    (0i64..1_000_000, 1i64..8, 0.0f64..1000.0)
        .prop_map(|(ts, backend, ms)| Observation::request(ts, backend, ms))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_group_counts_are_consistent(obs in prop::collection::vec(probe_strategy(), 0..200)) {
        let agg = aggregate(&obs);
        let mut total = 0;
        for stat in &agg.groups {
            prop_assert_eq!(stat.success_count + stat.failure_count, stat.total_count);
            prop_assert!((0.0..=100.0).contains(&stat.success_rate));
            prop_assert_eq!(stat.latency.count, stat.success_count);
            total += stat.total_count;
        }
        prop_assert_eq!(total, obs.len());
        prop_assert_eq!(agg.global.total_count, obs.len());
        prop_assert_eq!(
            agg.global.success_count + agg.global.failure_count,
            agg.global.total_count
        );
        prop_assert!((0.0..=100.0).contains(&agg.global.success_rate));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_group_percentiles_are_monotone(obs in prop::collection::vec(probe_strategy(), 1..200)) {
        let agg = aggregate(&obs);
        for stat in &agg.groups {
            let l = &stat.latency;
            if stat.success_count > 0 {
                prop_assert!(l.min <= l.median);
                prop_assert!(l.median <= l.p95);
                prop_assert!(l.p95 <= l.p99);
                prop_assert!(l.p99 <= l.max);
            } else {
                prop_assert_eq!(l.mean, 0.0);
                prop_assert_eq!(l.median, 0.0);
                prop_assert_eq!(l.std_dev, 0.0);
                prop_assert_eq!(l.p95, 0.0);
                prop_assert_eq!(l.p99, 0.0);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_percentile_endpoints(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..100)) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(percentile(&values, 0.0), Some(min));
        prop_assert_eq!(percentile(&values, 100.0), Some(max));
    }

    #[test]
    fn prop_percentile_is_monotone_in_p(
        values in prop::collection::vec(0.0f64..1000.0, 1..100),
        p in 0.0f64..100.0,
        q in 0.0f64..100.0,
    ) {
        let (lo, hi) = if p <= q { (p, q) } else { (q, p) };
        let a = percentile(&values, lo).unwrap();
        let b = percentile(&values, hi).unwrap();
        prop_assert!(a <= b);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_comparison_zero_fills_absent_groups(
        a in prop::collection::vec(request_strategy(), 0..100),
        b in prop::collection::vec(request_strategy(), 0..100),
    ) {
        let report = compare(&a, &b, "A", "B");

        for group in &report.groups {
            let in_a = a.iter().any(|o| o.group_key == group.group_key);
            let in_b = b.iter().any(|o| o.group_key == group.group_key);
            prop_assert!(in_a || in_b);
            if !in_a {
                prop_assert_eq!(group.count_a, 0);
                prop_assert_eq!(group.percentage_a, 0.0);
            }
            if !in_b {
                prop_assert_eq!(group.count_b, 0);
                prop_assert_eq!(group.percentage_b, 0.0);
            }
        }

        let count_a: usize = report.groups.iter().map(|g| g.count_a).sum();
        let count_b: usize = report.groups.iter().map(|g| g.count_b).sum();
        prop_assert_eq!(count_a, a.len());
        prop_assert_eq!(count_b, b.len());

        let keys: Vec<_> = report.groups.iter().map(|g| g.group_key.clone()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn prop_histogram_counts_every_sample(
        a in prop::collection::vec(0.0f64..1000.0, 0..100),
        b in prop::collection::vec(0.0f64..1000.0, 0..100),
        bins in 1usize..50,
    ) {
        let histogram = SharedHistogram::build(&a, &b, bins);
        prop_assert_eq!(histogram.counts_a.iter().sum::<usize>(), a.len());
        prop_assert_eq!(histogram.counts_b.iter().sum::<usize>(), b.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_ingest_never_panics(body in ".{0,200}") {
        let input = format!("timestamp_ms,status,backend_id,port,rtt_ms\n{body}");
        let _ = read_observations(input.as_bytes(), LogSchema::HealthCheck, "fuzz");
        let _ = read_observations(body.as_bytes(), LogSchema::Metrics, "fuzz");
    }
}
