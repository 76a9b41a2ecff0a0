//! The `Arbitrary` capability: a default generator paired with the type's
//! shrinker.

use std::fmt::Debug;

use rand::Rng;

use crate::generator::{Gen, choose, frequency, pure, sized};
use crate::shrink::Shrinkable;

/// Types with a default generator.
///
/// Together with [`Shrinkable`] this is everything `for_all` needs to sample
/// and minimise arguments of the type.
pub trait Arbitrary: Shrinkable + Clone + Debug + Send + Sync + 'static {
    /// Default generator, scaled by the size parameter
    fn arbitrary() -> Gen<Self>;
}

macro_rules! impl_arbitrary_signed {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary() -> Gen<Self> {
                    sized(|size| {
                        let bound = <$t>::try_from(size).unwrap_or(<$t>::MAX);
                        choose(-bound, bound)
                    })
                }
            }
        )*
    };
}

macro_rules! impl_arbitrary_unsigned {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary() -> Gen<Self> {
                    sized(|size| {
                        let bound = <$t>::try_from(size).unwrap_or(<$t>::MAX);
                        choose(0, bound)
                    })
                }
            }
        )*
    };
}

macro_rules! impl_arbitrary_float {
    ($($t:ty),*) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary() -> Gen<Self> {
                    Gen::from_rng(|rng, config| {
                        let bound = config.size as $t;
                        rng.gen_range(-bound..=bound)
                    })
                }
            }
        )*
    };
}

impl_arbitrary_signed!(i8, i16, i32, i64, i128, isize);
impl_arbitrary_unsigned!(u8, u16, u32, u64, u128, usize);
impl_arbitrary_float!(f32, f64);

impl Arbitrary for bool {
    fn arbitrary() -> Gen<Self> {
        Gen::from_rng(|rng, _| rng.r#gen())
    }
}

impl Arbitrary for char {
    /// Printable ASCII three times in four, otherwise any scalar value
    fn arbitrary() -> Gen<Self> {
        frequency(vec![
            (3, choose(' ', '~')),
            (1, Gen::from_rng(|rng, _| rng.r#gen::<char>())),
        ])
    }
}

impl Arbitrary for String {
    fn arbitrary() -> Gen<Self> {
        char::arbitrary()
            .vec_of()
            .map(|chars| chars.into_iter().collect())
    }
}

impl Arbitrary for () {
    fn arbitrary() -> Gen<Self> {
        pure(())
    }
}

impl<T: Arbitrary> Arbitrary for Vec<T> {
    fn arbitrary() -> Gen<Self> {
        T::arbitrary().vec_of()
    }
}

impl<T: Arbitrary> Arbitrary for Option<T> {
    fn arbitrary() -> Gen<Self> {
        T::arbitrary().option_of()
    }
}

impl<A: Arbitrary, B: Arbitrary> Arbitrary for (A, B) {
    fn arbitrary() -> Gen<Self> {
        A::arbitrary().zip(&B::arbitrary())
    }
}

impl<A: Arbitrary, B: Arbitrary, C: Arbitrary> Arbitrary for (A, B, C) {
    fn arbitrary() -> Gen<Self> {
        A::arbitrary()
            .zip(&B::arbitrary().zip(&C::arbitrary()))
            .map(|(a, (b, c))| (a, b, c))
    }
}
