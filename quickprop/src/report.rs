//! Final reports produced by the driver.

use crate::config::Replay;
use crate::statistics::{CoverageShortfall, LabelTable};

/// Details of a falsified property
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Falsification {
    /// Counted tests, including the failing one
    pub tests_run: usize,
    pub discarded: usize,
    /// Arguments of the first failing case, outermost first
    pub witness: Vec<String>,
    /// Arguments after shrinking
    pub shrunk_witness: Vec<String>,
    pub reason: Option<String>,
    pub notes: Vec<String>,
    /// Label frequencies over the counted tests
    pub labels: LabelTable,
    /// Labels carried by the shrunk failing case
    pub failing_labels: Vec<String>,
    pub shrink_steps: usize,
    pub shrink_attempts: usize,
    pub seed: u64,
    /// Reproduces the failing case on its own
    pub replay: Replay,
}

/// Verdict of a property run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "verdict", rename_all = "snake_case"))]
pub enum Report {
    Passed {
        tests_run: usize,
        discarded: usize,
        labels: LabelTable,
        /// Coverage requirements that were not met
        coverage: Vec<CoverageShortfall>,
        seed: u64,
    },
    Falsified(Box<Falsification>),
    /// Too many cases were discarded before enough tests ran
    GaveUp {
        tests_run: usize,
        discarded: usize,
        labels: LabelTable,
        /// Discarded cases per counted test
        discard_ratio: f64,
        seed: u64,
    },
    /// The property was expected to fail but every test passed
    NoExpectedFailure {
        tests_run: usize,
        discarded: usize,
        labels: LabelTable,
        seed: u64,
    },
    Cancelled {
        tests_run: usize,
        discarded: usize,
        seed: u64,
    },
}

impl Report {
    /// Short tag of the verdict
    pub fn verdict(&self) -> &'static str {
        match self {
            Report::Passed { .. } => "passed",
            Report::Falsified(_) => "falsified",
            Report::GaveUp { .. } => "gave_up",
            Report::NoExpectedFailure { .. } => "no_expected_failure",
            Report::Cancelled { .. } => "cancelled",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Report::Passed { .. })
    }

    pub fn is_falsified(&self) -> bool {
        matches!(self, Report::Falsified(_))
    }

    pub fn gave_up(&self) -> bool {
        matches!(self, Report::GaveUp { .. })
    }

    pub fn tests_run(&self) -> usize {
        match self {
            Report::Passed { tests_run, .. }
            | Report::GaveUp { tests_run, .. }
            | Report::NoExpectedFailure { tests_run, .. }
            | Report::Cancelled { tests_run, .. } => *tests_run,
            Report::Falsified(falsification) => falsification.tests_run,
        }
    }

    pub fn discarded(&self) -> usize {
        match self {
            Report::Passed { discarded, .. }
            | Report::GaveUp { discarded, .. }
            | Report::NoExpectedFailure { discarded, .. }
            | Report::Cancelled { discarded, .. } => *discarded,
            Report::Falsified(falsification) => falsification.discarded,
        }
    }

    pub fn seed(&self) -> u64 {
        match self {
            Report::Passed { seed, .. }
            | Report::GaveUp { seed, .. }
            | Report::NoExpectedFailure { seed, .. }
            | Report::Cancelled { seed, .. } => *seed,
            Report::Falsified(falsification) => falsification.seed,
        }
    }

    pub fn labels(&self) -> Option<&LabelTable> {
        match self {
            Report::Passed { labels, .. }
            | Report::GaveUp { labels, .. }
            | Report::NoExpectedFailure { labels, .. } => Some(labels),
            Report::Falsified(falsification) => Some(&falsification.labels),
            Report::Cancelled { .. } => None,
        }
    }

    pub fn falsification(&self) -> Option<&Falsification> {
        match self {
            Report::Falsified(falsification) => Some(falsification),
            _ => None,
        }
    }

    /// Shrunk witness of a falsified run
    pub fn counterexample(&self) -> Option<&[String]> {
        self.falsification()
            .map(|falsification| falsification.shrunk_witness.as_slice())
    }

    pub fn replay(&self) -> Option<Replay> {
        self.falsification().map(|falsification| falsification.replay)
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Report::Passed {
                tests_run,
                discarded,
                labels,
                coverage,
                ..
            } => {
                write!(f, "+++ OK, passed {}", plural(*tests_run, "test"))?;
                if *discarded > 0 {
                    write!(f, "; {} discarded", discarded)?;
                }
                writeln!(f, ".")?;
                write!(f, "{}", labels)?;
                for shortfall in coverage {
                    writeln!(f, "Warning: {}", shortfall)?;
                }
                Ok(())
            }
            Report::Falsified(falsification) => {
                writeln!(
                    f,
                    "*** Failed! Falsifiable (after {} and {}):",
                    plural(falsification.tests_run, "test"),
                    plural(falsification.shrink_steps, "shrink")
                )?;
                for argument in &falsification.shrunk_witness {
                    writeln!(f, "{}", argument)?;
                }
                if let Some(reason) = &falsification.reason {
                    writeln!(f, "Reason: {}", reason)?;
                }
                for note in &falsification.notes {
                    writeln!(f, "{}", note)?;
                }
                writeln!(f, "Replay: {}", falsification.replay)
            }
            Report::GaveUp {
                tests_run,
                discarded,
                ..
            } => writeln!(
                f,
                "*** Gave up! Passed only {}; {} discarded tests.",
                plural(*tests_run, "test"),
                discarded
            ),
            Report::NoExpectedFailure { tests_run, .. } => writeln!(
                f,
                "*** Failed! Passed {} (expected failure).",
                plural(*tests_run, "test")
            ),
            Report::Cancelled { tests_run, .. } => {
                writeln!(f, "*** Cancelled after {}.", plural(*tests_run, "test"))
            }
        }
    }
}
