//! Splittable, seedable random source and its `rand` integration.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A pure, splittable pseudo-random bit source.
///
/// Every operation consumes the source and hands back its successor, so the
/// same seed driven through the same sequence of operations always yields the
/// same values. Sources produced by [`split`](Self::split) are seeded afresh
/// and therefore fully described by [`seed`](Self::seed).
#[derive(Clone)]
pub struct RandomSource {
    seed: u64,
    stream: ChaCha8Rng,
}

impl RandomSource {
    /// Create a source from an explicit seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            stream: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a source from a seed drawn from the operating system
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    /// Seed this source was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Offset into the stream, in 32-bit words
    pub fn position(&self) -> u128 {
        self.stream.get_word_pos()
    }

    /// Draw one value and return the advanced source
    pub fn next(mut self) -> (u64, Self) {
        let value = self.stream.next_u64();
        (value, self)
    }

    /// Derive two independent sources
    pub fn split(mut self) -> (Self, Self) {
        let left = self.stream.next_u64();
        let right = self.stream.next_u64();
        (Self::from_seed(left), Self::from_seed(right))
    }

    /// Derive `n` independent sources
    pub fn split_n(mut self, n: usize) -> Vec<Self> {
        (0..n)
            .map(|_| Self::from_seed(self.stream.next_u64()))
            .collect()
    }

    /// Turn the source into a [`RngCore`] cursor for leaf sampling
    pub fn into_rng(self) -> SourceRng {
        SourceRng { inner: self.stream }
    }
}

impl PartialEq for RandomSource {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed && self.position() == other.position()
    }
}

impl Eq for RandomSource {}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource")
            .field("seed", &self.seed)
            .field("position", &self.position())
            .finish()
    }
}

/// Mutable cursor over a [`RandomSource`] stream, usable with any `rand` API
#[derive(Debug, Clone)]
pub struct SourceRng {
    inner: ChaCha8Rng,
}

impl RngCore for SourceRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn draw(source: RandomSource, n: usize) -> Vec<u64> {
        let mut values = Vec::with_capacity(n);
        let mut source = source;
        for _ in 0..n {
            let (value, next) = source.next();
            values.push(value);
            source = next;
        }
        values
    }

    #[test]
    fn test_same_seed_same_stream() {
        assert_eq!(
            draw(RandomSource::from_seed(42), 16),
            draw(RandomSource::from_seed(42), 16)
        );
        assert_ne!(
            draw(RandomSource::from_seed(42), 16),
            draw(RandomSource::from_seed(43), 16)
        );
    }

    #[test]
    fn test_next_advances_position() {
        let source = RandomSource::from_seed(7);
        assert_eq!(source.position(), 0);
        let (_, source) = source.next();
        assert_eq!(source.position(), 2);
        assert_eq!(source.seed(), 7);
    }

    #[test]
    fn test_split_is_deterministic() {
        let (a1, b1) = RandomSource::from_seed(1).split();
        let (a2, b2) = RandomSource::from_seed(1).split();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
        assert_ne!(a1.seed(), b1.seed());
        assert_ne!(draw(a1, 8), draw(b1, 8));
    }

    #[test]
    fn test_split_child_is_described_by_its_seed() {
        let (child, _) = RandomSource::from_seed(99).split();
        let rebuilt = RandomSource::from_seed(child.seed());
        assert_eq!(draw(child, 8), draw(rebuilt, 8));
    }

    #[test]
    fn test_split_n() {
        let sources = RandomSource::from_seed(5).split_n(4);
        assert_eq!(sources.len(), 4);
        let seeds: std::collections::BTreeSet<u64> = sources.iter().map(|s| s.seed()).collect();
        assert_eq!(seeds.len(), 4);
        assert!(RandomSource::from_seed(5).split_n(0).is_empty());
    }

    #[test]
    fn test_source_rng_matches_stream() {
        let (expected, _) = RandomSource::from_seed(12345).next();
        let mut rng = RandomSource::from_seed(12345).into_rng();
        assert_eq!(rng.next_u64(), expected);

        let mut rng = RandomSource::from_seed(12345).into_rng();
        let value: u32 = rng.gen_range(10..=20);
        assert!((10..=20).contains(&value));

        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        let mut other = [0u8; 32];
        RandomSource::from_seed(777).into_rng().fill_bytes(&mut first);
        RandomSource::from_seed(777).into_rng().fill_bytes(&mut second);
        RandomSource::from_seed(778).into_rng().fill_bytes(&mut other);
        assert_eq!(first, second);
        assert_ne!(first, [0u8; 32]);
        assert_ne!(first, other);
    }

    #[test]
    fn test_split_sources_across_threads() {
        let sources = RandomSource::from_seed(2024).split_n(4);
        let expected: Vec<Vec<u64>> = sources.iter().cloned().map(|s| draw(s, 4)).collect();

        let results = crossbeam::scope(|scope| {
            let handles: Vec<_> = sources
                .into_iter()
                .map(|source| scope.spawn(move |_| draw(source, 4)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        })
        .unwrap();

        assert_eq!(results, expected);
    }
}
