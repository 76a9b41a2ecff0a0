//! Shrinking: per-type candidate orders and the shrink search over failing
//! evaluations.
//!
//! Every [`Shrinkable`] implementation yields candidates that are strictly
//! simpler than the input under a well-founded measure (magnitude toward zero,
//! length toward empty, and so on), so following any chain of candidates
//! terminates. Candidate lists are produced lazily, one level at a time.

use tracing::debug;

use crate::outcome::Evaluation;

/// Values with an ordered sequence of simpler candidates
pub trait Shrinkable {
    /// Candidates simpler than `self`, most aggressive first. Never yields
    /// `self`.
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>>;
}

/// Integers with magnitude up to this bound offer every value closer to zero
pub const EXHAUSTIVE_INT_SHRINK_LIMIT: u8 = 16;

/// Per-type candidate orders, usable on their own to build custom strategies
pub mod strategies {
    use std::rc::Rc;

    use num_traits::{Float, NumCast, PrimInt};

    use super::EXHAUSTIVE_INT_SHRINK_LIMIT;

    /// Integer candidates toward zero.
    ///
    /// Negative values first offer their negation. Small magnitudes offer
    /// every value closer to zero; larger ones offer `0` followed by
    /// `v - v/2, v - v/4, ..., v - 1`.
    pub fn int_shrink<T: PrimInt + 'static>(value: T) -> Box<dyn Iterator<Item = T>> {
        let zero = T::zero();
        if value == zero {
            return Box::new(std::iter::empty());
        }

        let mut candidates = Vec::new();
        if value < zero
            && let Some(negated) = zero.checked_sub(&value)
        {
            candidates.push(negated);
        }

        let limit = <T as NumCast>::from(EXHAUSTIVE_INT_SHRINK_LIMIT).unwrap_or_else(T::max_value);
        let lower = zero.checked_sub(&limit).unwrap_or(zero);
        if value <= limit && value >= lower {
            let step = if value > zero { T::one() } else { zero - T::one() };
            let mut current = zero;
            while current != value {
                candidates.push(current);
                current = current + step;
            }
        } else {
            candidates.push(zero);
            let two = T::one() + T::one();
            let mut delta = value / two;
            while delta != zero {
                candidates.push(value - delta);
                delta = delta / two;
            }
        }

        Box::new(candidates.into_iter())
    }

    /// Float candidates: `0.0`, then truncation, then halving.
    ///
    /// NaN and the infinities shrink straight to `0.0`.
    pub fn float_shrink<T: Float + 'static>(value: T) -> Box<dyn Iterator<Item = T>> {
        let zero = T::zero();
        if !value.is_finite() {
            return Box::new(std::iter::once(zero));
        }
        if value == zero {
            return Box::new(std::iter::empty());
        }

        let mut candidates = Vec::new();
        if value < zero {
            candidates.push(-value);
        }
        candidates.push(zero);
        let truncated = value.trunc();
        if truncated != value && truncated != zero {
            candidates.push(truncated);
        }
        let halved = value / (T::one() + T::one());
        if halved != value && halved != zero && halved != truncated {
            candidates.push(halved);
        }
        Box::new(candidates.into_iter())
    }

    pub fn bool_shrink(value: bool) -> Box<dyn Iterator<Item = bool>> {
        if value {
            Box::new(std::iter::once(false))
        } else {
            Box::new(std::iter::empty())
        }
    }

    /// `'a'` first, then code points halving the distance toward `' '`
    pub fn char_shrink(c: char) -> Box<dyn Iterator<Item = char>> {
        if c == 'a' {
            return Box::new(std::iter::empty());
        }

        let mut candidates = vec!['a'];
        let code = c as u32;
        let base = ' ' as u32;
        if code > base {
            let mut delta = code - base;
            while delta > 0 {
                if let Some(candidate) = char::from_u32(code - delta)
                    && candidate != 'a'
                {
                    candidates.push(candidate);
                }
                delta /= 2;
            }
        }
        Box::new(candidates.into_iter())
    }

    /// Chunk sizes `n, n/2, ..., 1`
    fn chunk_sizes(n: usize) -> impl Iterator<Item = usize> {
        std::iter::successors((n > 0).then_some(n), |k| (*k > 1).then(|| k / 2))
    }

    /// Sequence candidates: remove contiguous chunks of decreasing size, then
    /// shrink each element in place with `shrink_element`.
    pub fn vec_shrink_with<T, F>(values: &[T], shrink_element: F) -> Box<dyn Iterator<Item = Vec<T>>>
    where
        T: Clone + 'static,
        F: Fn(&T) -> Box<dyn Iterator<Item = T>> + 'static,
    {
        let items: Rc<Vec<T>> = Rc::new(values.to_vec());
        let n = items.len();

        let removals = {
            let items = Rc::clone(&items);
            chunk_sizes(n).flat_map(move |k| {
                let items = Rc::clone(&items);
                (0..=n - k).step_by(k).map(move |offset| {
                    let mut candidate = Vec::with_capacity(n - k);
                    candidate.extend_from_slice(&items[..offset]);
                    candidate.extend_from_slice(&items[offset + k..]);
                    candidate
                })
            })
        };

        let shrink_element = Rc::new(shrink_element);
        let in_place = (0..n).flat_map(move |index| {
            let items = Rc::clone(&items);
            let shrunk = shrink_element(&items[index]);
            shrunk.map(move |element| {
                let mut candidate = (*items).clone();
                candidate[index] = element;
                candidate
            })
        });

        Box::new(removals.chain(in_place))
    }

    /// String candidates: the `char` sequence shrunk like a vector
    pub fn string_shrink(s: &str) -> Box<dyn Iterator<Item = String>> {
        let chars: Vec<char> = s.chars().collect();
        Box::new(
            vec_shrink_with(&chars, |c| char_shrink(*c))
                .map(|candidate| candidate.into_iter().collect()),
        )
    }

    /// `None` first, then `Some` of each shrunk payload
    pub fn option_shrink_with<T, F>(value: &Option<T>, shrink_inner: F) -> Box<dyn Iterator<Item = Option<T>>>
    where
        T: 'static,
        F: Fn(&T) -> Box<dyn Iterator<Item = T>>,
    {
        match value {
            None => Box::new(std::iter::empty()),
            Some(inner) => Box::new(std::iter::once(None).chain(shrink_inner(inner).map(Some))),
        }
    }
}

impl Shrinkable for bool {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        strategies::bool_shrink(*self)
    }
}

impl Shrinkable for char {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        strategies::char_shrink(*self)
    }
}

impl Shrinkable for String {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        strategies::string_shrink(self)
    }
}

impl Shrinkable for () {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(std::iter::empty())
    }
}

macro_rules! impl_shrinkable_int {
    ($($t:ty),*) => {
        $(
            impl Shrinkable for $t {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    strategies::int_shrink(*self)
                }
            }
        )*
    };
}

macro_rules! impl_shrinkable_float {
    ($($t:ty),*) => {
        $(
            impl Shrinkable for $t {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    strategies::float_shrink(*self)
                }
            }
        )*
    };
}

impl_shrinkable_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_shrinkable_float!(f32, f64);

impl<T: Shrinkable + Clone + 'static> Shrinkable for Vec<T> {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        strategies::vec_shrink_with(self, T::shrink)
    }
}

impl<T: Shrinkable + 'static> Shrinkable for Option<T> {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        strategies::option_shrink_with(self, T::shrink)
    }
}

impl<A, B> Shrinkable for (A, B)
where
    A: Shrinkable + Clone + 'static,
    B: Shrinkable + Clone + 'static,
{
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (a, b) = self.clone();
        let first = {
            let b = b.clone();
            a.shrink().map(move |a| (a, b.clone()))
        };
        let second = b.shrink().map(move |b| (a.clone(), b));
        Box::new(first.chain(second))
    }
}

impl<A, B, C> Shrinkable for (A, B, C)
where
    A: Shrinkable + Clone + 'static,
    B: Shrinkable + Clone + 'static,
    C: Shrinkable + Clone + 'static,
{
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (a, b, c) = self.clone();
        let first = {
            let (b, c) = (b.clone(), c.clone());
            a.shrink().map(move |a| (a, b.clone(), c.clone()))
        };
        let second = {
            let (a, c) = (a.clone(), c.clone());
            b.shrink().map(move |b| (a.clone(), b, c.clone()))
        };
        let third = c.shrink().map(move |c| (a.clone(), b.clone(), c));
        Box::new(first.chain(second).chain(third))
    }
}

/// Result of a shrink search
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// Last failing value or evaluation found
    pub minimal: T,
    /// Number of successful descents
    pub shrink_steps: usize,
    /// Number of candidates evaluated, failing or not
    pub attempts: usize,
    /// False when the step cap stopped the search early
    pub completed: bool,
}

/// Eager-descent shrink search.
///
/// Candidates are tried in order; the first one that still fails becomes the
/// new current value and its siblings are dropped. The search stops when no
/// candidate fails, or when the optional step cap is reached.
#[derive(Debug, Clone, Default)]
pub struct ShrinkSearch {
    max_steps: Option<usize>,
}

impl ShrinkSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `max_steps` successful descents
    pub fn with_max_steps(max_steps: Option<usize>) -> Self {
        Self { max_steps }
    }

    /// Shrink a failing evaluation through its lazily produced candidates
    pub fn run(&self, failing: Evaluation) -> ShrinkResult<Evaluation> {
        self.descend(failing, Evaluation::candidates, |evaluation| {
            evaluation.outcome.is_failure()
        })
    }

    /// Shrink a plain value while `still_fails` holds
    pub fn minimize<T, F>(&self, value: T, still_fails: F) -> ShrinkResult<T>
    where
        T: Shrinkable,
        F: Fn(&T) -> bool,
    {
        self.descend(value, T::shrink, still_fails)
    }

    fn descend<T, C, I, F>(&self, start: T, candidates: C, still_fails: F) -> ShrinkResult<T>
    where
        C: Fn(&T) -> I,
        I: Iterator<Item = T>,
        F: Fn(&T) -> bool,
    {
        let mut current = start;
        let mut shrink_steps = 0;
        let mut attempts = 0;

        loop {
            if self.max_steps.is_some_and(|max| shrink_steps >= max) {
                debug!(shrink_steps, attempts, "shrink step cap reached");
                return ShrinkResult {
                    minimal: current,
                    shrink_steps,
                    attempts,
                    completed: false,
                };
            }

            let mut next = None;
            for candidate in candidates(&current) {
                attempts += 1;
                if still_fails(&candidate) {
                    next = Some(candidate);
                    break;
                }
            }

            match next {
                Some(candidate) => {
                    shrink_steps += 1;
                    debug!(shrink_steps, attempts, "found smaller failing case");
                    current = candidate;
                }
                None => break,
            }
        }

        ShrinkResult {
            minimal: current,
            shrink_steps,
            attempts,
            completed: true,
        }
    }
}
