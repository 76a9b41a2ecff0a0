//! The driver: repeated evaluation, discard accounting and shrink search.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, trace, warn};

use crate::config::{CheckConfig, Replay};
use crate::error::ConfigError;
use crate::outcome::{Evaluation, Failure, Outcome};
use crate::property::{Property, Testable, panic_message};
use crate::report::{Falsification, Report};
use crate::rng::RandomSource;
use crate::shrink::ShrinkSearch;
use crate::statistics::StatisticsCollector;

/// Cooperative cancellation flag checked before every test
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters and stream position of a run in progress
struct Progress {
    tests_run: usize,
    discarded: usize,
    expect_failure: bool,
    source: RandomSource,
    statistics: StatisticsCollector,
}

enum DriverState {
    Running(Progress),
    Finished(Report),
}

/// One run of a property under a configuration
pub struct PropertyTest {
    property: Property,
    config: CheckConfig,
    name: Option<String>,
    cancellation: Option<CancellationToken>,
}

impl PropertyTest {
    pub fn new<P: Testable>(property: P, config: CheckConfig) -> Self {
        Self {
            property: property.property(),
            config,
            name: None,
            cancellation: None,
        }
    }

    /// Name used in log events
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("property")
    }

    /// Run to a verdict.
    ///
    /// # Panics
    ///
    /// Panics with the [`ConfigError`] if the configuration does not
    /// validate. Use [`PropertyTest::try_run`] to handle it instead.
    pub fn run(self) -> Report {
        match self.try_run() {
            Ok(report) => report,
            Err(error) => panic!("invalid check configuration: {}", error),
        }
    }

    /// Validate the configuration, then run to a verdict
    pub fn try_run(self) -> Result<Report, ConfigError> {
        self.config.validate()?;
        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(
            name = self.name(),
            seed,
            max_tests = self.config.max_tests,
            "starting property run"
        );

        let report = match self.config.replay {
            Some(replay) => self.replay_case(replay),
            None => {
                let mut state = DriverState::Running(Progress {
                    tests_run: 0,
                    discarded: 0,
                    expect_failure: false,
                    source: RandomSource::from_seed(seed),
                    statistics: StatisticsCollector::new(),
                });
                loop {
                    state = match state {
                        DriverState::Running(progress) => self.step(progress, seed),
                        DriverState::Finished(report) => break report,
                    };
                }
            }
        };

        info!(
            name = self.name(),
            verdict = report.verdict(),
            tests_run = report.tests_run(),
            discarded = report.discarded(),
            "property run finished"
        );
        Ok(report)
    }

    fn step(&self, mut progress: Progress, seed: u64) -> DriverState {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return DriverState::Finished(Report::Cancelled {
                tests_run: progress.tests_run,
                discarded: progress.discarded,
                seed,
            });
        }

        if progress.tests_run >= self.config.max_tests {
            return DriverState::Finished(self.finish(progress, seed));
        }

        if progress.discarded >= self.config.max_discards() {
            warn!(
                name = self.name(),
                tests_run = progress.tests_run,
                discarded = progress.discarded,
                "giving up after too many discarded tests"
            );
            return DriverState::Finished(Report::GaveUp {
                tests_run: progress.tests_run,
                discarded: progress.discarded,
                labels: progress.statistics.table(),
                discard_ratio: progress.discarded as f64 / progress.tests_run.max(1) as f64,
                seed,
            });
        }

        let size = self.config.size_schedule.size_for(
            progress.tests_run,
            progress.discarded,
            self.config.max_tests,
            self.config.max_size,
        );
        let (case_source, rest) = progress.source.split();
        progress.source = rest;
        let replay = Replay::new(case_source.seed(), size);
        let evaluation = self.evaluate_case(case_source, size);
        trace!(
            test = progress.tests_run,
            size,
            case_seed = replay.seed,
            success = evaluation.outcome.is_success(),
            discard = evaluation.outcome.is_discard(),
            "evaluated test case"
        );
        progress.expect_failure |= evaluation.directives.expect_failure;

        match &evaluation.outcome {
            Outcome::Success { .. } => {
                progress
                    .statistics
                    .record(&evaluation.outcome, &evaluation.directives);
                progress.tests_run += 1;
                if evaluation.directives.once {
                    DriverState::Finished(self.finish(progress, seed))
                } else {
                    DriverState::Running(progress)
                }
            }
            Outcome::Discard => {
                progress.discarded += 1;
                DriverState::Running(progress)
            }
            Outcome::Failure(_) => {
                progress
                    .statistics
                    .record(&evaluation.outcome, &evaluation.directives);
                progress.tests_run += 1;
                DriverState::Finished(self.falsify(progress, evaluation, seed, replay))
            }
        }
    }

    fn evaluate_case(&self, source: RandomSource, size: usize) -> Evaluation {
        let config = self.config.generator_config(size);
        match catch_unwind(AssertUnwindSafe(|| self.property.evaluate(source, &config))) {
            Ok(evaluation) => evaluation,
            Err(payload) => Evaluation::new(Outcome::failure_with_reason(format!(
                "panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    /// Verdict once the test budget is spent without a failure
    fn finish(&self, progress: Progress, seed: u64) -> Report {
        let labels = progress.statistics.table();
        if progress.expect_failure {
            return Report::NoExpectedFailure {
                tests_run: progress.tests_run,
                discarded: progress.discarded,
                labels,
                seed,
            };
        }

        let coverage = progress.statistics.coverage_shortfalls();
        for shortfall in &coverage {
            warn!(
                name = self.name(),
                label = %shortfall.label,
                required = shortfall.required,
                actual = shortfall.actual,
                "insufficient coverage"
            );
        }
        Report::Passed {
            tests_run: progress.tests_run,
            discarded: progress.discarded,
            labels,
            coverage,
            seed,
        }
    }

    fn falsify(&self, progress: Progress, failing: Evaluation, seed: u64, replay: Replay) -> Report {
        if progress.expect_failure {
            debug!(name = self.name(), "property failed as expected");
            return Report::Passed {
                tests_run: progress.tests_run,
                discarded: progress.discarded,
                labels: progress.statistics.table(),
                coverage: Vec::new(),
                seed,
            };
        }

        let original = failing
            .outcome
            .as_failure()
            .map(|failure| failure.witness.clone())
            .unwrap_or_default();
        let result = ShrinkSearch::with_max_steps(self.config.max_shrink_steps).run(failing);
        debug!(
            name = self.name(),
            shrink_steps = result.shrink_steps,
            attempts = result.attempts,
            completed = result.completed,
            "shrinking finished"
        );

        let failure = match result.minimal.outcome {
            Outcome::Failure(failure) => failure,
            _ => Failure::default(),
        };
        for callback in &failure.callbacks {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback.call())) {
                warn!(
                    name = self.name(),
                    panic = %panic_message(payload.as_ref()),
                    "failure callback panicked"
                );
            }
        }

        Report::Falsified(Box::new(Falsification {
            tests_run: progress.tests_run,
            discarded: progress.discarded,
            witness: original,
            shrunk_witness: failure.witness,
            reason: failure.reason,
            notes: failure.notes,
            labels: progress.statistics.table(),
            failing_labels: failure.labels.into_iter().collect(),
            shrink_steps: result.shrink_steps,
            shrink_attempts: result.attempts,
            seed,
            replay,
        }))
    }

    /// Evaluate exactly the recorded case
    fn replay_case(&self, replay: Replay) -> Report {
        let evaluation = self.evaluate_case(RandomSource::from_seed(replay.seed), replay.size);
        let mut statistics = StatisticsCollector::new();
        statistics.record(&evaluation.outcome, &evaluation.directives);
        let progress = Progress {
            tests_run: usize::from(!evaluation.outcome.is_discard()),
            discarded: usize::from(evaluation.outcome.is_discard()),
            expect_failure: evaluation.directives.expect_failure,
            source: RandomSource::from_seed(replay.seed),
            statistics,
        };
        match evaluation.outcome {
            Outcome::Failure(_) => self.falsify(progress, evaluation, replay.seed, replay),
            Outcome::Discard => Report::GaveUp {
                tests_run: 0,
                discarded: 1,
                labels: progress.statistics.table(),
                discard_ratio: 1.0,
                seed: replay.seed,
            },
            Outcome::Success { .. } => self.finish(progress, replay.seed),
        }
    }
}

/// Check a property with the default configuration
pub fn check<P: Testable>(property: P) -> Report {
    check_with_config(property, CheckConfig::default())
}

/// Check a property with a custom configuration.
///
/// # Panics
///
/// Panics if `config` does not validate.
pub fn check_with_config<P: Testable>(property: P, config: CheckConfig) -> Report {
    PropertyTest::new(property, config).run()
}
