//! Wrapper types that restrict generation and shrinking.
//!
//! Taking `Positive<i32>` instead of `i32` as a `for_all` argument keeps the
//! property body free of preconditions, and the shrinker never leaves the
//! restricted domain.

use crate::arbitrary::Arbitrary;
use crate::generator::{Gen, choose, sized};
use crate::shrink::{Shrinkable, strategies};

/// An integer strictly greater than zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Positive<T>(pub T);

/// An integer greater than or equal to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonNegative<T>(pub T);

/// An integer other than zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonZero<T>(pub T);

/// A vector with at least one element
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmpty<T>(pub Vec<T>);

impl<T> Positive<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> NonNegative<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> NonZero<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> NonEmpty<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    /// First element; `None` only for a hand-built empty wrapper
    pub fn first(&self) -> Option<&T> {
        self.0.first()
    }
}

macro_rules! impl_int_modifiers {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for Positive<$t> {
                fn arbitrary() -> Gen<Self> {
                    sized(|size| {
                        let bound = <$t>::try_from(size.max(1)).unwrap_or(<$t>::MAX);
                        choose(1, bound).map(Positive)
                    })
                }
            }

            impl Shrinkable for Positive<$t> {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    Box::new(strategies::int_shrink(self.0).filter(|v| *v != 0).map(Positive))
                }
            }

            impl Arbitrary for NonNegative<$t> {
                fn arbitrary() -> Gen<Self> {
                    sized(|size| {
                        let bound = <$t>::try_from(size).unwrap_or(<$t>::MAX);
                        choose(0, bound).map(NonNegative)
                    })
                }
            }

            impl Shrinkable for NonNegative<$t> {
                // Shrinking a non-negative integer never crosses zero
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    Box::new(strategies::int_shrink(self.0).map(NonNegative))
                }
            }

            impl Arbitrary for NonZero<$t> {
                fn arbitrary() -> Gen<Self> {
                    sized(|size| {
                        let bound = <$t>::try_from(size.max(1)).unwrap_or(<$t>::MAX);
                        let low = (0 as $t).saturating_sub(bound);
                        choose(low, bound).such_that(|v| *v != 0).map(NonZero)
                    })
                }
            }

            impl Shrinkable for NonZero<$t> {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    Box::new(strategies::int_shrink(self.0).filter(|v| *v != 0).map(NonZero))
                }
            }
        )*
    };
}

impl_int_modifiers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T: Arbitrary> Arbitrary for NonEmpty<T> {
    fn arbitrary() -> Gen<Self> {
        sized(|size| {
            choose(1, size.max(1)).bind(|length| T::arbitrary().vec_of_len(length))
        })
        .map(NonEmpty)
    }
}

impl<T: Shrinkable + Clone + 'static> Shrinkable for NonEmpty<T> {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(
            strategies::vec_shrink_with(&self.0, |element: &T| element.shrink())
                .filter(|candidate| !candidate.is_empty())
                .map(NonEmpty),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_generation_and_shrinking() {
        for size in [0, 1, 5, 100] {
            let values = Positive::<i32>::arbitrary().samples(3, 50, size).unwrap();
            assert!(values.iter().all(|Positive(v)| *v >= 1 && *v as usize <= size.max(1)));
        }
        let shrunk: Vec<i32> = Positive(5i32).shrink().map(Positive::into_inner).collect();
        assert_eq!(shrunk, vec![1, 2, 3, 4]);
        assert_eq!(Positive(1u8).shrink().count(), 0);
    }

    #[test]
    fn test_non_negative_includes_zero() {
        let values = NonNegative::<i64>::arbitrary().samples(8, 200, 3).unwrap();
        assert!(values.iter().all(|NonNegative(v)| (0..=3).contains(v)));
        assert!(values.contains(&NonNegative(0)));
        assert_eq!(NonNegative(0i64).shrink().count(), 0);
    }

    #[test]
    fn test_non_zero_takes_both_signs() {
        let values = NonZero::<i16>::arbitrary().samples(21, 200, 10).unwrap();
        assert!(values.iter().all(|NonZero(v)| *v != 0));
        assert!(values.iter().any(|NonZero(v)| *v < 0));
        assert!(values.iter().any(|NonZero(v)| *v > 0));

        let unsigned = NonZero::<u32>::arbitrary().samples(21, 50, 0).unwrap();
        assert!(unsigned.iter().all(|NonZero(v)| *v == 1));

        let shrunk: Vec<i16> = NonZero(-3i16).shrink().map(NonZero::into_inner).collect();
        assert_eq!(shrunk, vec![3, -1, -2]);
    }

    #[test]
    fn test_non_empty_vectors() {
        let values = NonEmpty::<u8>::arbitrary().samples(4, 50, 0).unwrap();
        assert!(values.iter().all(|NonEmpty(v)| v.len() == 1));

        let values = NonEmpty::<u8>::arbitrary().samples(4, 50, 20).unwrap();
        assert!(values.iter().all(|NonEmpty(v)| !v.is_empty() && v.len() <= 20));

        let single = NonEmpty(vec![0u8]);
        assert_eq!(single.shrink().count(), 0);
        assert_eq!(single.first(), Some(&0));
        assert_eq!(NonEmpty::<u8>(Vec::new()).first(), None);

        let candidates: Vec<Vec<u8>> = NonEmpty(vec![1u8, 0]).shrink().map(NonEmpty::into_inner).collect();
        assert_eq!(candidates, vec![vec![0], vec![1], vec![0, 0]]);
    }
}
