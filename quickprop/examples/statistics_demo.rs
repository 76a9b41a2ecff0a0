//! Labels, coverage requirements and parallel suites.

use quickprop::{
    CheckConfig, ParallelConfig, Suite, Testable, VerboseFormatter, TestOutputFormatter,
    check_with_config, for_all,
};

fn main() {
    println!("=== Label distribution ===");
    let report = check_with_config(
        for_all(|v: Vec<i16>| {
            let mut twice = v.clone();
            twice.reverse();
            twice.reverse();
            (twice == v)
                .classify(v.is_empty(), "empty")
                .classify(v.len() > 50, "long")
                .cover(v.len() > 1, 75.0, "non-trivial")
        }),
        CheckConfig::default().with_seed(7),
    );
    print!("{}", report);

    println!("\n=== Parallel suite ===");
    let suite = Suite::new(CheckConfig::default())
        .with("abs is non-negative", for_all(|x: i32| x.abs() >= 0))
        .with("square is non-negative", for_all(|x: i32| x * x >= 0))
        .with("halving shrinks", for_all(|x: i64| (x / 2).abs() < x.abs()));
    let report = suite.run_parallel(&ParallelConfig::default());
    println!("{}", VerboseFormatter.format_suite(&report));
}
