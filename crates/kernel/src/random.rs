use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Source of uniform samples for world generation.
///
/// Injected wherever randomness is needed so generation can be replayed
/// from a seed or driven by a fixed script in tests.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Portable seeded source used for reproducible worlds.
pub type SeededSource = RngSource<Pcg64Mcg>;

/// Adapts any `rand` generator into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<Pcg64Mcg> {
    /// PCG stream that reproduces the same world for the same seed on every platform.
    pub fn seeded(seed: u64) -> Self {
        Self(Pcg64Mcg::seed_from_u64(seed))
    }

    /// PCG stream seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self(Pcg64Mcg::from_rng(&mut rand::rng()))
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// An empty script yields `0.0` forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Number of samples handed out so far.
    pub fn draws_taken(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}
