#![allow(clippy::type_complexity)]

//! # quickprop - Property-Based Testing for Rust
//!
//! quickprop checks a *property*, a statement about randomly generated
//! inputs, against many samples of increasing size. When a sample falsifies
//! the property the failing input is shrunk to a locally minimal
//! counterexample. Runs are deterministic under a fixed seed, and every
//! failure carries a replay token that reproduces the failing case alone.
//!
//! ## Quick Start
//!
//! ```rust
//! use quickprop::{CheckConfig, check_with_config, for_all};
//!
//! let report = check_with_config(
//!     for_all(|v: Vec<u32>| {
//!         let mut twice = v.clone();
//!         twice.reverse();
//!         twice.reverse();
//!         twice == v
//!     }),
//!     CheckConfig::default().with_seed(42),
//! );
//! assert!(report.is_passed());
//! assert_eq!(report.tests_run(), 100);
//! ```
//!
//! A failing property is shrunk before it is reported:
//!
//! ```rust
//! use quickprop::{check, for_all};
//!
//! let report = check(for_all(|x: u32| x < 50));
//! assert_eq!(report.counterexample(), Some(&["50".to_string()][..]));
//! ```
//!
//! ## Building blocks
//!
//! - [`Gen`] and the free functions in [`generator`] compose random value
//!   generators.
//! - [`Shrinkable`] and [`Arbitrary`] give a type its default shrinker and
//!   generator; [`Strategy`] pairs any generator with a shrinker explicitly.
//! - [`Property`] and the [`Testable`] combinators (`and`, `or`, `label`,
//!   `cover`, ...) describe what is checked.
//! - [`PropertyTest`] drives a run and produces a [`Report`]; [`Suite`] runs
//!   many properties, optionally in parallel.

// Public modules
pub mod arbitrary;
pub mod config;
pub mod error;
pub mod execution;
pub mod generator;
pub mod modifiers;
pub mod outcome;
pub mod property;
pub mod registry;
pub mod report;
pub mod rng;
pub mod shrink;
pub mod statistics;
pub mod strategy;
pub mod suite;
pub mod test_runner;

// Re-export the main public API
pub use arbitrary::Arbitrary;
pub use config::{CheckConfig, GeneratorConfig, Replay, SizeSchedule};
pub use error::{ConfigError, DefinitionError, GenerationExhausted};
pub use execution::{CancellationToken, PropertyTest, check, check_with_config};
pub use generator::{Gen, choose, elements, frequency, one_of, pure, sized};
pub use modifiers::{NonEmpty, NonNegative, NonZero, Positive};
pub use outcome::{Evaluation, Outcome};
pub use property::{
    Property, Testable, for_all, for_all_in, for_all_with, for_all2, for_all3, implies,
};
pub use registry::StrategyRegistry;
pub use report::{Falsification, Report};
pub use rng::RandomSource;
pub use shrink::{ShrinkResult, ShrinkSearch, Shrinkable};
pub use statistics::{CoverageShortfall, LabelTable, StatisticsCollector};
pub use strategy::Strategy;
pub use suite::{ParallelConfig, Suite, SuiteReport};
#[cfg(feature = "serde")]
pub use test_runner::JsonFormatter;
pub use test_runner::{
    DefaultFormatter, TestOutputFormatter, VerboseFormatter, assert_property, quick_check,
};
