//! End-to-end tests running complete properties through the driver.

use quickprop::{
    Arbitrary, CheckConfig, Report, Strategy, Testable, check_with_config, for_all, for_all_with,
    for_all2, implies,
};

fn seeded(seed: u64) -> CheckConfig {
    CheckConfig::default().with_seed(seed)
}

/// Prime sieve that never strikes `n` itself off the list
fn buggy_sieve(n: i32) -> Vec<i32> {
    if n < 2 {
        return Vec::new();
    }
    let n = n as usize;
    let mut composite = vec![false; n + 1];
    for p in 2..n {
        if !composite[p] {
            let mut multiple = 2 * p;
            while multiple < n {
                composite[multiple] = true;
                multiple += p;
            }
        }
    }
    (2..=n)
        .filter(|&i| !composite[i])
        .map(|i| i as i32)
        .collect()
}

fn is_prime(n: i32) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

#[test]
fn test_reflexive_equality_passes_with_seed_42() {
    let report = check_with_config(for_all(|i: i64| i == i), seeded(42));
    assert_eq!(report.verdict(), "passed");
    assert_eq!(report.tests_run(), 100);
    assert_eq!(report.seed(), 42);
    assert_eq!(report.to_string(), "+++ OK, passed 100 tests.\n");
}

#[test]
fn test_double_reverse_is_identity() {
    for seed in [0, 1, 42, 1234] {
        let report = check_with_config(
            for_all(|xs: Vec<i32>| {
                let mut twice = xs.clone();
                twice.reverse();
                twice.reverse();
                twice == xs
            }),
            seeded(seed).with_max_size(200),
        );
        assert!(report.is_passed(), "seed {}: {}", seed, report);
    }
}

#[test]
fn test_buggy_sieve_shrinks_to_four() {
    let property = for_all(|n: i32| {
        let primes = buggy_sieve(n);
        let filtered: Vec<i32> = primes.iter().copied().filter(|&p| is_prime(p)).collect();
        (filtered == primes).counterexample(format!("sieve({}) = {:?}", n, primes))
    });
    let report = check_with_config(property, seeded(7));

    let falsification = report.falsification().expect("sieve property must fail");
    let original: i32 = falsification.witness[0].parse().unwrap();
    assert!(original >= 4 && !is_prime(original));
    assert_eq!(falsification.shrunk_witness, vec!["4"]);
    assert_eq!(falsification.notes, vec!["sieve(4) = [2, 3, 4]"]);
    assert!(report.to_string().starts_with("*** Failed! Falsifiable"));
}

#[test]
fn test_unsatisfiable_filter_gives_up() {
    let strategy = Strategy::from_gen(i32::arbitrary().such_that(|_| false));
    let report = check_with_config(for_all_with(strategy, |_: i32| true), seeded(3));
    match &report {
        Report::GaveUp {
            tests_run,
            discarded,
            discard_ratio,
            ..
        } => {
            assert_eq!(*tests_run, 0);
            assert_eq!(*discarded, 1000);
            assert_eq!(*discard_ratio, 1000.0);
        }
        other => panic!("expected give up, got {}", other),
    }
    assert_eq!(
        report.to_string(),
        "*** Gave up! Passed only 0 tests; 1000 discarded tests.\n"
    );
}

#[test]
fn test_precondition_discards_are_reported() {
    let property = for_all2(|a: u8, b: u8| implies(a < b, move || a < b));
    let report = check_with_config(property, seeded(11));
    assert!(report.is_passed());
    assert!(report.discarded() > 0);
    assert!(report.to_string().contains("discarded"));
}

#[test]
fn test_label_table_in_report() {
    let property = for_all(|x: i32| {
        true.classify(x < 0, "negative")
            .classify(x == 0, "zero")
            .classify(x > 0, "positive")
    });
    let report = check_with_config(property, seeded(5));
    let labels = report.labels().unwrap();
    assert_eq!(labels.counted, 100);
    let total: usize = labels.rows.iter().map(|row| row.count).sum();
    assert_eq!(total, 100);
    assert!(labels.count("positive") > 0);
    assert!(labels.count("negative") > 0);
}

#[test]
fn test_failure_reason_from_result_body() {
    let property = for_all(|x: u16| {
        if x > 60 {
            Err(format!("{} is too large", x))
        } else {
            Ok(())
        }
    });
    let report = check_with_config(property, seeded(9));
    let falsification = report.falsification().unwrap();
    assert_eq!(falsification.shrunk_witness, vec!["61"]);
    assert_eq!(falsification.reason.as_deref(), Some("61 is too large"));
}

#[test]
fn test_panicking_body_is_shrunk() {
    let property = for_all(|v: Vec<u8>| {
        assert!(v.len() < 4, "vector too long");
        true
    });
    let report = check_with_config(property, seeded(12));
    let falsification = report.falsification().unwrap();
    assert_eq!(falsification.shrunk_witness, vec!["[0, 0, 0, 0]"]);
    assert_eq!(
        falsification.reason.as_deref(),
        Some("panicked: vector too long")
    );
}
