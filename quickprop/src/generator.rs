//! Composable generator algebra.
//!
//! A [`Gen<T>`] is a recipe turning a [`RandomSource`] and a
//! [`GeneratorConfig`] into a `T`. Generators are immutable values: every
//! combinator returns a new generator and leaves its inputs untouched, so a
//! generator can be stored, cloned and shared between threads.

use std::fmt::Debug;
use std::sync::Arc;

use rand::Rng;
use rand::distributions::uniform::SampleUniform;
use tracing::trace;

use crate::config::GeneratorConfig;
use crate::error::{DefinitionError, GenerationExhausted};
use crate::rng::{RandomSource, SourceRng};

type GenFn<T> =
    dyn Fn(RandomSource, &GeneratorConfig) -> Result<T, GenerationExhausted> + Send + Sync;

/// A composable random value generator
pub struct Gen<T> {
    run: Arc<GenFn<T>>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> std::fmt::Debug for Gen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gen<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> Gen<T> {
    /// Build a generator from a function of the source and configuration
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(RandomSource, &GeneratorConfig) -> Result<T, GenerationExhausted>
            + Send
            + Sync
            + 'static,
    {
        Self { run: Arc::new(f) }
    }

    /// Build an infallible leaf generator that samples through a `rand` cursor
    pub fn from_rng<F>(f: F) -> Self
    where
        F: Fn(&mut SourceRng, &GeneratorConfig) -> T + Send + Sync + 'static,
    {
        Self::new(move |source, config| {
            let mut rng = source.into_rng();
            Ok(f(&mut rng, config))
        })
    }

    /// Run the generator
    pub fn generate(
        &self,
        source: RandomSource,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationExhausted> {
        (self.run)(source, config)
    }

    /// Run the generator from a seed at the given size
    pub fn sample(&self, seed: u64, size: usize) -> Result<T, GenerationExhausted> {
        let config = GeneratorConfig {
            size,
            ..GeneratorConfig::default()
        };
        self.generate(RandomSource::from_seed(seed), &config)
    }

    /// Produce `count` values from one seed, each from its own split source
    pub fn samples(
        &self,
        seed: u64,
        count: usize,
        size: usize,
    ) -> Result<Vec<T>, GenerationExhausted> {
        let config = GeneratorConfig {
            size,
            ..GeneratorConfig::default()
        };
        RandomSource::from_seed(seed)
            .split_n(count)
            .into_iter()
            .map(|source| self.generate(source, &config))
            .collect()
    }

    /// Transform every generated value
    pub fn map<U, F>(&self, f: F) -> Gen<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.clone();
        Gen::new(move |source, config| inner.generate(source, config).map(&f))
    }

    /// Choose the next generator from a generated value
    pub fn bind<U, F>(&self, f: F) -> Gen<U>
    where
        U: 'static,
        F: Fn(T) -> Gen<U> + Send + Sync + 'static,
    {
        let inner = self.clone();
        Gen::new(move |source, config| {
            let (left, right) = source.split();
            let value = inner.generate(left, config)?;
            f(value).generate(right, config)
        })
    }

    /// Keep only values satisfying `predicate`.
    ///
    /// Each attempt draws from a fresh split source. After
    /// `config.max_filter_attempts` rejections the generator reports
    /// [`GenerationExhausted`].
    pub fn such_that<P>(&self, predicate: P) -> Gen<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let inner = self.clone();
        Gen::new(move |source, config| {
            let mut source = source;
            for _ in 0..config.max_filter_attempts {
                let (attempt, rest) = source.split();
                source = rest;
                let value = inner.generate(attempt, config)?;
                if predicate(&value) {
                    return Ok(value);
                }
            }
            trace!(
                attempts = config.max_filter_attempts,
                size = config.size,
                "filtered generator exhausted"
            );
            Err(GenerationExhausted::new(config.max_filter_attempts))
        })
    }

    /// Run with a fixed size, ignoring the size handed in
    pub fn resize(&self, size: usize) -> Gen<T> {
        let inner = self.clone();
        Gen::new(move |source, config| inner.generate(source, &config.with_size(size)))
    }

    /// Run with the size transformed by `f`
    pub fn scale<F>(&self, f: F) -> Gen<T>
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        let inner = self.clone();
        Gen::new(move |source, config| inner.generate(source, &config.with_size(f(config.size))))
    }

    /// Generate a pair from two independent sources
    pub fn zip<U: 'static>(&self, other: &Gen<U>) -> Gen<(T, U)> {
        let left_gen = self.clone();
        let right_gen = other.clone();
        Gen::new(move |source, config| {
            let (left, right) = source.split();
            Ok((
                left_gen.generate(left, config)?,
                right_gen.generate(right, config)?,
            ))
        })
    }

    /// Vectors whose length is drawn from `0..=size`
    pub fn vec_of(&self) -> Gen<Vec<T>> {
        let element = self.clone();
        Gen::new(move |source, config| {
            let (length_source, rest) = source.split();
            let length = length_source.into_rng().gen_range(0..=config.size);
            rest.split_n(length)
                .into_iter()
                .map(|source| element.generate(source, config))
                .collect()
        })
    }

    /// Vectors of exactly `length` elements
    pub fn vec_of_len(&self, length: usize) -> Gen<Vec<T>> {
        let element = self.clone();
        Gen::new(move |source, config| {
            source
                .split_n(length)
                .into_iter()
                .map(|source| element.generate(source, config))
                .collect()
        })
    }

    /// `None` one time in four, otherwise `Some` of a generated value
    pub fn option_of(&self) -> Gen<Option<T>> {
        let inner = self.clone();
        Gen::new(move |source, config| {
            let (pick, rest) = source.split();
            if pick.into_rng().gen_range(0..4u32) == 0 {
                Ok(None)
            } else {
                inner.generate(rest, config).map(Some)
            }
        })
    }
}

/// Always produce `value`
pub fn pure<T>(value: T) -> Gen<T>
where
    T: Clone + Send + Sync + 'static,
{
    Gen::new(move |_, _| Ok(value.clone()))
}

/// Uniform value in the inclusive range `low..=high`.
///
/// # Panics
///
/// Panics with [`DefinitionError::EmptyRange`] when `low > high`.
pub fn choose<T>(low: T, high: T) -> Gen<T>
where
    T: SampleUniform + PartialOrd + Copy + Debug + Send + Sync + 'static,
{
    match try_choose(low, high) {
        Ok(generator) => generator,
        Err(error) => panic!("{}", error),
    }
}

/// Fallible form of [`choose`]
pub fn try_choose<T>(low: T, high: T) -> Result<Gen<T>, DefinitionError>
where
    T: SampleUniform + PartialOrd + Copy + Debug + Send + Sync + 'static,
{
    if low > high {
        return Err(DefinitionError::empty_range(low, high));
    }
    Ok(Gen::from_rng(move |rng, _| rng.gen_range(low..=high)))
}

/// Pick one of the generators uniformly and run it.
///
/// # Panics
///
/// Panics with [`DefinitionError::NoAlternatives`] on an empty list.
pub fn one_of<T: 'static>(generators: Vec<Gen<T>>) -> Gen<T> {
    match try_one_of(generators) {
        Ok(generator) => generator,
        Err(error) => panic!("{}", error),
    }
}

/// Fallible form of [`one_of`]
pub fn try_one_of<T: 'static>(generators: Vec<Gen<T>>) -> Result<Gen<T>, DefinitionError> {
    if generators.is_empty() {
        return Err(DefinitionError::NoAlternatives);
    }
    Ok(Gen::new(move |source, config| {
        let (pick, rest) = source.split();
        let index = pick.into_rng().gen_range(0..generators.len());
        generators[index].generate(rest, config)
    }))
}

/// Pick a generator with probability proportional to its weight.
///
/// # Panics
///
/// Panics with [`DefinitionError::MalformedWeights`] on an empty list or a
/// zero weight.
pub fn frequency<T: 'static>(weighted: Vec<(u32, Gen<T>)>) -> Gen<T> {
    match try_frequency(weighted) {
        Ok(generator) => generator,
        Err(error) => panic!("{}", error),
    }
}

/// Fallible form of [`frequency`]
pub fn try_frequency<T: 'static>(
    mut weighted: Vec<(u32, Gen<T>)>,
) -> Result<Gen<T>, DefinitionError> {
    if let Some(position) = weighted.iter().position(|(weight, _)| *weight == 0) {
        return Err(DefinitionError::malformed_weights(format!(
            "weight at index {} is zero",
            position
        )));
    }
    let total: u64 = weighted.iter().map(|(weight, _)| u64::from(*weight)).sum();
    let Some((_, last)) = weighted.pop() else {
        return Err(DefinitionError::malformed_weights("weight list is empty"));
    };
    Ok(Gen::new(move |source, config| {
        let (pick, rest) = source.split();
        let mut target = pick.into_rng().gen_range(0..total);
        for (weight, generator) in &weighted {
            let weight = u64::from(*weight);
            if target < weight {
                return generator.generate(rest, config);
            }
            target -= weight;
        }
        last.generate(rest, config)
    }))
}

/// Pick one of the values uniformly.
///
/// # Panics
///
/// Panics with [`DefinitionError::NoAlternatives`] on an empty list.
pub fn elements<T>(values: Vec<T>) -> Gen<T>
where
    T: Clone + Send + Sync + 'static,
{
    match try_elements(values) {
        Ok(generator) => generator,
        Err(error) => panic!("{}", error),
    }
}

/// Fallible form of [`elements`]
pub fn try_elements<T>(values: Vec<T>) -> Result<Gen<T>, DefinitionError>
where
    T: Clone + Send + Sync + 'static,
{
    if values.is_empty() {
        return Err(DefinitionError::NoAlternatives);
    }
    Ok(Gen::from_rng(move |rng, _| {
        values[rng.gen_range(0..values.len())].clone()
    }))
}

/// Build a generator from the current size
pub fn sized<T, F>(f: F) -> Gen<T>
where
    T: 'static,
    F: Fn(usize) -> Gen<T> + Send + Sync + 'static,
{
    Gen::new(move |source, config| f(config.size).generate(source, config))
}
