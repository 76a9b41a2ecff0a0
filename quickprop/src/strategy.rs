//! Explicit generator/shrinker pairs.
//!
//! A [`Strategy`] is what `for_all_with` samples from: a [`Gen`] for fresh
//! values and a shrink function for minimising failing ones. Strategies let a
//! property use a non-default distribution for a type, or restrict shrinking,
//! without touching the type's [`Arbitrary`] instance.

use std::fmt::Debug;
use std::sync::Arc;

use crate::arbitrary::Arbitrary;
use crate::generator::Gen;
use crate::shrink::{Shrinkable, strategies};

type ShrinkFn<T> = dyn Fn(&T) -> Box<dyn Iterator<Item = T>> + Send + Sync;

/// A generator paired with a shrinker
pub struct Strategy<T> {
    generator: Gen<T>,
    shrinker: Arc<ShrinkFn<T>>,
}

impl<T> Clone for Strategy<T> {
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            shrinker: Arc::clone(&self.shrinker),
        }
    }
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Strategy<{}>", std::any::type_name::<T>())
    }
}

impl<T: Arbitrary> Strategy<T> {
    /// The type's default generator and shrinker
    pub fn arbitrary() -> Self {
        Self::new(T::arbitrary(), T::shrink)
    }
}

impl<T: Shrinkable + 'static> Strategy<T> {
    /// A custom generator with the type's own shrinker
    pub fn shrinking(generator: Gen<T>) -> Self {
        Self::new(generator, T::shrink)
    }
}

impl<T: 'static> Strategy<T> {
    pub fn new<S>(generator: Gen<T>, shrinker: S) -> Self
    where
        S: Fn(&T) -> Box<dyn Iterator<Item = T>> + Send + Sync + 'static,
    {
        Self {
            generator,
            shrinker: Arc::new(shrinker),
        }
    }

    /// A generator whose values are never shrunk
    pub fn from_gen(generator: Gen<T>) -> Self {
        Self::new(generator, |_| Box::new(std::iter::empty()))
    }

    pub fn generator(&self) -> &Gen<T> {
        &self.generator
    }

    pub fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        (self.shrinker)(value)
    }

    /// Filter generated values and shrink candidates alike
    pub fn such_that<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let filter = Arc::clone(&predicate);
        let shrinker = Arc::clone(&self.shrinker);
        Self::new(
            self.generator.such_that(move |value| predicate(value)),
            move |value: &T| {
                let filter = Arc::clone(&filter);
                Box::new(shrinker(value).filter(move |candidate| filter(candidate)))
            },
        )
    }

    pub fn resize(&self, size: usize) -> Self {
        Self {
            generator: self.generator.resize(size),
            shrinker: Arc::clone(&self.shrinker),
        }
    }

    pub fn scale<F>(&self, f: F) -> Self
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        Self {
            generator: self.generator.scale(f),
            shrinker: Arc::clone(&self.shrinker),
        }
    }

    /// Keep generation, drop shrinking
    pub fn no_shrink(&self) -> Self {
        Self::from_gen(self.generator.clone())
    }

    /// Map values both ways so shrinking still works on the mapped type
    pub fn map_invertible<U, F, G>(&self, forward: F, backward: G) -> Strategy<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
        G: Fn(&U) -> T + Send + Sync + 'static,
    {
        let forward = Arc::new(forward);
        let shrink_forward = Arc::clone(&forward);
        let shrinker = Arc::clone(&self.shrinker);
        Strategy::new(
            self.generator.map(move |value| forward(value)),
            move |value: &U| {
                let forward = Arc::clone(&shrink_forward);
                Box::new(shrinker(&backward(value)).map(move |candidate| forward(candidate)))
            },
        )
    }
}

impl<T: Clone + 'static> Strategy<T> {
    /// Vectors of this strategy's values, shrunk by chunk removal and then
    /// element-wise with this strategy's shrinker
    pub fn vec_of(&self) -> Strategy<Vec<T>> {
        let shrinker = Arc::clone(&self.shrinker);
        Strategy::new(self.generator.vec_of(), move |values: &Vec<T>| {
            let shrinker = Arc::clone(&shrinker);
            strategies::vec_shrink_with(values, move |element| shrinker(element))
        })
    }

    pub fn option_of(&self) -> Strategy<Option<T>> {
        let shrinker = Arc::clone(&self.shrinker);
        Strategy::new(self.generator.option_of(), move |value: &Option<T>| {
            strategies::option_shrink_with(value, |inner| shrinker(inner))
        })
    }

    /// Pairs, shrinking the first component before the second
    pub fn zip<U: Clone + 'static>(&self, other: &Strategy<U>) -> Strategy<(T, U)> {
        let left = Arc::clone(&self.shrinker);
        let right = Arc::clone(&other.shrinker);
        Strategy::new(self.generator.zip(&other.generator), move |(a, b): &(T, U)| {
            let first = {
                let b = b.clone();
                left(a).map(move |a| (a, b.clone()))
            };
            let a = a.clone();
            let second = right(b).map(move |b| (a.clone(), b));
            Box::new(first.chain(second))
        })
    }
}

impl<T: Arbitrary> Default for Strategy<T> {
    fn default() -> Self {
        Self::arbitrary()
    }
}

/// Render a value the way witnesses record it
pub(crate) fn render<T: Debug>(value: &T) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{choose, pure};

    #[test]
    fn test_arbitrary_strategy_uses_type_shrinker() {
        let strategy = Strategy::<i32>::arbitrary();
        let candidates: Vec<i32> = strategy.shrink(&3).collect();
        assert_eq!(candidates, vec![0, 1, 2]);
        assert!(strategy.generator().samples(1, 50, 5).unwrap().iter().all(|v| v.abs() <= 5));
    }

    #[test]
    fn test_from_gen_does_not_shrink() {
        let strategy = Strategy::from_gen(pure(10u32));
        assert_eq!(strategy.shrink(&10).count(), 0);
        assert_eq!(Strategy::<u32>::arbitrary().no_shrink().shrink(&10).count(), 0);
    }

    #[test]
    fn test_such_that_filters_shrinks() {
        let even = Strategy::shrinking(choose(0u32, 100)).such_that(|x| x % 2 == 0);
        assert!(even.generator().samples(2, 50, 10).unwrap().iter().all(|x| x % 2 == 0));
        let candidates: Vec<u32> = even.shrink(&6).collect();
        assert_eq!(candidates, vec![0, 2, 4]);
    }

    #[test]
    fn test_vec_of_uses_element_shrinker() {
        let strategy = Strategy::new(choose(0u8, 9), |x: &u8| {
            if *x > 5 {
                Box::new(std::iter::once(5))
            } else {
                Box::new(std::iter::empty())
            }
        })
        .vec_of();
        let candidates: Vec<Vec<u8>> = strategy.shrink(&vec![9]).collect();
        assert_eq!(candidates, vec![vec![], vec![5]]);
    }

    #[test]
    fn test_option_and_zip() {
        let strategy = Strategy::<u8>::arbitrary().option_of();
        let candidates: Vec<Option<u8>> = strategy.shrink(&Some(1)).collect();
        assert_eq!(candidates, vec![None, Some(0)]);

        let pair = Strategy::<u8>::arbitrary().zip(&Strategy::<bool>::arbitrary());
        let candidates: Vec<(u8, bool)> = pair.shrink(&(2, true)).collect();
        assert_eq!(candidates, vec![(0, true), (1, true), (2, false)]);
    }

    #[test]
    fn test_map_invertible() {
        let strategy = Strategy::<u32>::arbitrary().map_invertible(|x| x.to_string(), |s| {
            s.parse().unwrap_or(0)
        });
        let candidates: Vec<String> = strategy.shrink(&"3".to_string()).collect();
        assert_eq!(candidates, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_resize() {
        let strategy = Strategy::<Vec<u8>>::arbitrary().resize(2);
        assert!(strategy.generator().samples(3, 50, 100).unwrap().iter().all(|v| v.len() <= 2));
    }
}
