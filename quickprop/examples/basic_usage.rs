//! Basic usage: checking properties, reading reports and replaying failures.

use quickprop::{
    CheckConfig, NonZero, Report, Strategy, Testable, check, check_with_config, choose, for_all,
    for_all_with, for_all2, implies,
};

// Example 1: a law that holds
fn example_1_basic_property() {
    println!("=== Example 1: Basic Property ===");
    let report = check(for_all2(|a: i32, b: i32| a.wrapping_add(b) == b.wrapping_add(a)));
    print!("{}", report);
}

// Example 2: a law that does not hold, shrunk to a small counterexample
fn example_2_falsified() -> Report {
    println!("\n=== Example 2: Falsified Property ===");
    let report = check_with_config(
        for_all(|v: Vec<u8>| {
            let mut sorted = v.clone();
            sorted.sort();
            (sorted == v).counterexample(format!("sorted: {:?}", sorted))
        }),
        CheckConfig::default().with_seed(2024),
    );
    print!("{}", report);
    report
}

// Example 3: re-running exactly the failing case
fn example_3_replay(report: &Report) {
    println!("\n=== Example 3: Replay ===");
    if let Some(replay) = report.replay() {
        let config = CheckConfig::default().with_replay(replay);
        let again = check_with_config(
            for_all(|v: Vec<u8>| {
                let mut sorted = v.clone();
                sorted.sort();
                sorted == v
            }),
            config,
        );
        print!("{}", again);
    }
}

// Example 4: preconditions and explicit strategies
fn example_4_preconditions() {
    println!("\n=== Example 4: Preconditions ===");
    let report = check(for_all2(|a: i32, NonZero(b): NonZero<i32>| {
        (a / b) * b + a % b == a
    }));
    print!("{}", report);

    let report = check(for_all_with(
        Strategy::shrinking(choose(0u32, 1000)),
        |n: u32| implies(n % 2 == 0, move || (n / 2) * 2 == n),
    ));
    print!("{}", report);
}

fn main() {
    example_1_basic_property();
    let report = example_2_falsified();
    example_3_replay(&report);
    example_4_preconditions();
}
