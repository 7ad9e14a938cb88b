use rand::prelude::*;

/// Source of randomness for shuffling the deck and drawing cards.
pub trait RandomSource {
    /// Returns an index in `0..len`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;

    /// Fisher-Yates shuffle driven by [`RandomSource::index`].
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }
}

/// Seeded source backed by [`SmallRng`], reproducible for a given seed.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Replays a fixed list of indices, wrapping each into range. Falls back to 0 once exhausted.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    picks: alloc::collections::VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn index(&mut self, len: usize) -> usize {
        self.picks.pop_front().map_or(0, |pick| pick % len)
    }
}
