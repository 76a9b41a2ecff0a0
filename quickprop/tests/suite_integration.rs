//! Suites of named properties run sequentially and on a thread pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quickprop::{
    CheckConfig, DefaultFormatter, NonZero, ParallelConfig, Suite, TestOutputFormatter,
    VerboseFormatter, for_all, for_all2,
};

fn arithmetic_suite(seed: u64) -> Suite {
    Suite::new(CheckConfig::default().with_seed(seed))
        .with("addition commutes", for_all2(|a: i32, b: i32| a + b == b + a))
        .with("multiplication commutes", for_all2(|a: i32, b: i32| a * b == b * a))
        .with(
            "division round trip",
            for_all2(|a: i32, NonZero(b): NonZero<i32>| (a / b) * b + a % b == a),
        )
        .with("subtraction commutes", for_all2(|a: i32, b: i32| a - b == b - a))
}

#[test]
fn test_suite_finds_the_false_law() {
    let report = arithmetic_suite(8).run();
    assert_eq!(report.members.len(), 4);
    assert_eq!(report.passed(), 3);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "subtraction commutes");
    let witness = failures[0].report.counterexample().unwrap();
    assert_eq!(witness.len(), 2);
    assert_ne!(witness[0], witness[1]);
}

#[test]
fn test_parallel_suite_preserves_order_and_results() {
    let suite = arithmetic_suite(99);
    let parallel = suite.run_parallel(&ParallelConfig::with_threads(4));
    let names: Vec<&str> = parallel.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, suite.names().collect::<Vec<_>>());
    assert_eq!(parallel, suite.run());
}

#[test]
fn test_parallel_suite_runs_every_member_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut suite = Suite::new(CheckConfig::default().with_seed(5).with_max_tests(10));
    for index in 0..12 {
        let runs = Arc::clone(&runs);
        suite.add(
            format!("member {}", index),
            for_all(move |_: u8| {
                runs.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );
    }
    let report = suite.run_parallel(&ParallelConfig::with_threads(3));
    assert!(report.all_passed());
    assert_eq!(runs.load(Ordering::SeqCst), 120);
}

#[test]
fn test_disabled_parallelism_falls_back_to_sequential() {
    let suite = arithmetic_suite(1);
    let config = ParallelConfig {
        num_threads: 8,
        enabled: false,
    };
    assert_eq!(suite.run_parallel(&config), suite.run());
}

#[test]
fn test_formatters_render_suites() {
    let report = arithmetic_suite(8).run();
    let plain = DefaultFormatter.format_suite(&report);
    assert_eq!(plain.matches("ok (100 tests)").count(), 3);
    assert_eq!(plain.matches("FAILED").count(), 1);

    let verbose = VerboseFormatter.format_suite(&report);
    assert!(verbose.contains("✓ addition commutes"));
    assert!(verbose.contains("✗ subtraction commutes"));
    assert!(report.to_string().ends_with("3 of 4 properties passed.\n"));
}
