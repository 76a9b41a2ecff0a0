//! Configuration types for controlling driver behavior and generation parameters.

use std::str::FromStr;

use tracing::debug;

pub use crate::error::ConfigError;

/// Default number of successful tests before a property passes
pub const DEFAULT_MAX_TESTS: usize = 100;
/// Default number of discards allowed per requested test
pub const DEFAULT_MAX_DISCARD_RATIO: usize = 10;
/// Default upper bound of the size parameter
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default number of draws a filtered generator makes before giving up
pub const DEFAULT_MAX_FILTER_ATTEMPTS: usize = 100;

/// Environment variable overriding [`CheckConfig::max_tests`]
pub const ENV_TESTS: &str = "QUICKPROP_TESTS";
/// Environment variable overriding [`CheckConfig::seed`]
pub const ENV_SEED: &str = "QUICKPROP_SEED";
/// Environment variable overriding [`CheckConfig::max_size`]
pub const ENV_MAX_SIZE: &str = "QUICKPROP_MAX_SIZE";
/// Environment variable overriding [`CheckConfig::max_discard_ratio`]
pub const ENV_MAX_DISCARD_RATIO: &str = "QUICKPROP_MAX_DISCARD_RATIO";

/// Parameters handed to every generator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Magnitude hint: integer bounds, collection lengths, recursion budget
    pub size: usize,
    /// Draws a `such_that` generator makes before signalling exhaustion
    pub max_filter_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size: 10,
            max_filter_attempts: DEFAULT_MAX_FILTER_ATTEMPTS,
        }
    }
}

impl GeneratorConfig {
    /// Create a generator configuration with validation
    pub fn new(size: usize, max_filter_attempts: usize) -> Result<Self, ConfigError> {
        let config = Self {
            size,
            max_filter_attempts,
        };
        config.validate()?;
        Ok(config)
    }

    /// Same configuration with a different size
    pub fn with_size(&self, size: usize) -> Self {
        Self {
            size,
            max_filter_attempts: self.max_filter_attempts,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_filter_attempts == 0 {
            return Err(ConfigError::InvalidFilterAttempts(self.max_filter_attempts));
        }
        Ok(())
    }
}

/// How the driver grows the size parameter across a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeSchedule {
    /// `min(max_size, tests_run * max_size / max_tests + discarded / 10)`
    #[default]
    Linear,
    /// Every test runs at the same size (still capped by `max_size`)
    Fixed(usize),
}

impl SizeSchedule {
    /// Size for the next test given the counters so far.
    ///
    /// Monotonic in both counters, and one success never raises the size by
    /// more than `ceil(max_size / max_tests)`.
    pub fn size_for(
        &self,
        tests_run: usize,
        discarded: usize,
        max_tests: usize,
        max_size: usize,
    ) -> usize {
        match *self {
            SizeSchedule::Linear => {
                let grown = tests_run.saturating_mul(max_size) / max_tests.max(1) + discarded / 10;
                grown.min(max_size)
            }
            SizeSchedule::Fixed(size) => size.min(max_size),
        }
    }
}

/// Token reproducing one test case: the per-test seed and the size it ran at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Replay {
    pub seed: u64,
    pub size: usize,
}

impl Replay {
    pub fn new(seed: u64, size: usize) -> Self {
        Self { seed, size }
    }
}

impl std::fmt::Display for Replay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seed {} at size {}", self.seed, self.size)
    }
}

/// Configuration for one driver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Number of successful tests required to pass
    pub max_tests: usize,
    /// Discards allowed per requested test before giving up
    pub max_discard_ratio: usize,
    /// Upper bound of the size parameter
    pub max_size: usize,
    /// Size growth across the run
    pub size_schedule: SizeSchedule,
    /// Retry bound for filtered generators
    pub max_filter_attempts: usize,
    /// Optional cap on successful shrink steps; unbounded when `None`
    pub max_shrink_steps: Option<usize>,
    /// Seed for the run; drawn from entropy when `None`
    pub seed: Option<u64>,
    /// Run exactly the recorded test case instead of a fresh search
    pub replay: Option<Replay>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_tests: DEFAULT_MAX_TESTS,
            max_discard_ratio: DEFAULT_MAX_DISCARD_RATIO,
            max_size: DEFAULT_MAX_SIZE,
            size_schedule: SizeSchedule::Linear,
            max_filter_attempts: DEFAULT_MAX_FILTER_ATTEMPTS,
            max_shrink_steps: None,
            seed: None,
            replay: None,
        }
    }
}

impl CheckConfig {
    /// Create a check configuration with validation
    pub fn new(
        max_tests: usize,
        max_discard_ratio: usize,
        max_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            max_tests,
            max_discard_ratio,
            max_size,
            seed,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `QUICKPROP_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `QUICKPROP_*` environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(tests) = env_override(ENV_TESTS)? {
            self.max_tests = tests;
        }
        if let Some(seed) = env_override(ENV_SEED)? {
            self.seed = Some(seed);
        }
        if let Some(max_size) = env_override(ENV_MAX_SIZE)? {
            self.max_size = max_size;
        }
        if let Some(ratio) = env_override(ENV_MAX_DISCARD_RATIO)? {
            self.max_discard_ratio = ratio;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn with_max_tests(mut self, max_tests: usize) -> Self {
        self.max_tests = max_tests;
        self
    }

    pub fn with_max_discard_ratio(mut self, ratio: usize) -> Self {
        self.max_discard_ratio = ratio;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_size_schedule(mut self, schedule: SizeSchedule) -> Self {
        self.size_schedule = schedule;
        self
    }

    pub fn with_max_filter_attempts(mut self, attempts: usize) -> Self {
        self.max_filter_attempts = attempts;
        self
    }

    pub fn with_max_shrink_steps(mut self, steps: usize) -> Self {
        self.max_shrink_steps = Some(steps);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_replay(mut self, replay: Replay) -> Self {
        self.replay = Some(replay);
        self
    }

    /// Number of discards at which the driver gives up
    pub fn max_discards(&self) -> usize {
        self.max_discard_ratio.saturating_mul(self.max_tests)
    }

    /// Generator configuration for a test at the given size
    pub fn generator_config(&self, size: usize) -> GeneratorConfig {
        GeneratorConfig {
            size,
            max_filter_attempts: self.max_filter_attempts,
        }
    }

    /// Validate the check configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tests == 0 {
            return Err(ConfigError::InvalidMaxTests(self.max_tests));
        }
        if self.max_discard_ratio == 0 {
            return Err(ConfigError::InvalidDiscardRatio(self.max_discard_ratio));
        }
        if self.max_filter_attempts == 0 {
            return Err(ConfigError::InvalidFilterAttempts(self.max_filter_attempts));
        }
        if self.max_shrink_steps == Some(0) {
            return Err(ConfigError::InvalidShrinkSteps(0));
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => {
            let parsed = value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidEnvVar {
                    name: name.to_string(),
                    value: value.clone(),
                })?;
            debug!(variable = name, value = %value, "applied environment override");
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}
