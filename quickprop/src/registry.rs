//! Type-indexed registry of strategies.
//!
//! A [`StrategyRegistry`] is an explicit, constructible context: properties
//! built with [`for_all_in`](crate::property::for_all_in) look their argument
//! strategy up here and fall back to the type's [`Arbitrary`] instance.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::arbitrary::Arbitrary;
use crate::strategy::Strategy;

/// Type-safe map from a value type to the strategy used to sample it
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the strategy for `T`, replacing any earlier one
    pub fn register<T: 'static>(&mut self, strategy: Strategy<T>) -> &mut Self {
        self.strategies.insert(TypeId::of::<T>(), Box::new(strategy));
        self
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<T: 'static>(mut self, strategy: Strategy<T>) -> Self {
        self.register(strategy);
        self
    }

    pub fn get<T: 'static>(&self) -> Option<&Strategy<T>> {
        self.strategies
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<Strategy<T>>())
    }

    /// The registered strategy for `T`, or its arbitrary one
    pub fn resolve<T: Arbitrary>(&self) -> Strategy<T> {
        self.get::<T>().cloned().unwrap_or_else(Strategy::arbitrary)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.strategies.contains_key(&TypeId::of::<T>())
    }

    pub fn remove<T: 'static>(&mut self) -> bool {
        self.strategies.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{choose, pure};

    #[test]
    fn test_registry_basic_operations() {
        let mut registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains::<i32>());

        registry.register(Strategy::from_gen(pure(42i32)));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains::<i32>());
        assert!(!registry.contains::<u32>());

        let strategy = registry.get::<i32>().unwrap();
        assert_eq!(strategy.generator().sample(1, 10), Ok(42));

        assert!(registry.remove::<i32>());
        assert!(!registry.remove::<i32>());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let registry = StrategyRegistry::new()
            .with(Strategy::from_gen(pure(1u8)))
            .with(Strategy::from_gen(pure(2u8)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve::<u8>().generator().sample(0, 0), Ok(2));
    }

    #[test]
    fn test_resolve_falls_back_to_arbitrary() {
        let registry =
            StrategyRegistry::new().with(Strategy::shrinking(choose(1000i64, 2000)));
        let registered = registry.resolve::<i64>();
        assert!(
            registered
                .generator()
                .samples(5, 50, 10)
                .unwrap()
                .iter()
                .all(|v| (1000..=2000).contains(v))
        );

        let fallback = registry.resolve::<i32>();
        assert!(
            fallback
                .generator()
                .samples(5, 50, 10)
                .unwrap()
                .iter()
                .all(|v| v.abs() <= 10)
        );
    }
}
