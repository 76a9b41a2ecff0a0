//! Error types for generator definition, generation and configuration.

use thiserror::Error;

/// A filtered generator could not satisfy its predicate within the retry bound.
///
/// This is a data condition, not a bug: properties observe it as a discarded
/// test case and the driver counts it toward the give-up bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("generation exhausted after {attempts} attempts")]
pub struct GenerationExhausted {
    /// Number of candidate values drawn and rejected
    pub attempts: usize,
}

impl GenerationExhausted {
    pub fn new(attempts: usize) -> Self {
        Self { attempts }
    }
}

/// A generator was defined with arguments that can never produce a value.
///
/// These indicate a broken test rather than bad data, so the panicking
/// constructors in [`crate::generator`] fail fast with them at definition time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// `frequency` was given no alternatives or a zero weight
    #[error("malformed weights: {0}")]
    MalformedWeights(String),

    /// `choose` was given a lower bound above its upper bound
    #[error("empty range: low {low} is greater than high {high}")]
    EmptyRange { low: String, high: String },

    /// `one_of` or `elements` was given nothing to choose from
    #[error("no alternatives to choose from")]
    NoAlternatives,
}

impl DefinitionError {
    pub fn malformed_weights(message: impl Into<String>) -> Self {
        Self::MalformedWeights(message.into())
    }

    pub fn empty_range(low: impl std::fmt::Debug, high: impl std::fmt::Debug) -> Self {
        Self::EmptyRange {
            low: format!("{:?}", low),
            high: format!("{:?}", high),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid number of tests (must be > 0)
    #[error("invalid max_tests: {0} (must be > 0)")]
    InvalidMaxTests(usize),

    /// Invalid discard ratio (must be > 0)
    #[error("invalid max_discard_ratio: {0} (must be > 0)")]
    InvalidDiscardRatio(usize),

    /// Invalid filter retry bound (must be > 0)
    #[error("invalid max_filter_attempts: {0} (must be > 0)")]
    InvalidFilterAttempts(usize),

    /// Invalid shrink step cap (must be > 0 when set)
    #[error("invalid max_shrink_steps: {0} (must be > 0)")]
    InvalidShrinkSteps(usize),

    /// An environment override could not be parsed
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnvVar { name: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_exhausted_display() {
        let error = GenerationExhausted::new(100);
        assert_eq!(error.to_string(), "generation exhausted after 100 attempts");
    }

    #[test]
    fn test_definition_error_display() {
        let error = DefinitionError::malformed_weights("weight list is empty");
        assert_eq!(error.to_string(), "malformed weights: weight list is empty");

        let error = DefinitionError::empty_range(10, 1);
        assert_eq!(
            error.to_string(),
            "empty range: low 10 is greater than high 1"
        );

        assert_eq!(
            DefinitionError::NoAlternatives.to_string(),
            "no alternatives to choose from"
        );
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::InvalidMaxTests(0).to_string(),
            "invalid max_tests: 0 (must be > 0)"
        );

        let error = ConfigError::InvalidEnvVar {
            name: "QUICKPROP_TESTS".to_string(),
            value: "many".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "invalid value \"many\" for environment variable QUICKPROP_TESTS"
        );
    }
}
