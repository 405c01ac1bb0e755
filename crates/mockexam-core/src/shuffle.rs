//! Question bank shuffling.
//!
//! Fisher–Yates over one of two uniform sources: the thread-local RNG, or a
//! seeded mulberry32 generator whose permutations are reproducible.

use crate::model::Question;

/// mulberry32: a 32-bit mixing PRNG.
///
/// The state advances by a fixed odd increment on every call, so a given seed
/// always yields the same sequence.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    const INCREMENT: u32 = 0x6D2B_79F5;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

/// How the bank is shuffled when an exam is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuffleMode {
    /// Global uniform RNG.
    #[default]
    Random,
    /// mulberry32. Without an explicit seed, one is derived from the current
    /// time mixed with a random value.
    Seeded { seed: Option<u32> },
}

impl ShuffleMode {
    /// Build the shuffler for this mode. `now_ms` feeds the derived seed.
    pub fn shuffler(&self, now_ms: i64) -> Shuffler {
        match *self {
            ShuffleMode::Random => Shuffler::Random,
            ShuffleMode::Seeded { seed: Some(seed) } => Shuffler::seeded(seed),
            ShuffleMode::Seeded { seed: None } => Shuffler::seeded(derive_seed(now_ms)),
        }
    }
}

/// Seed from the low 32 bits of the wall clock XOR a random value.
pub fn derive_seed(now_ms: i64) -> u32 {
    (now_ms as u32) ^ rand::random::<u32>()
}

/// A source of uniform floats driving Fisher–Yates.
#[derive(Debug, Clone)]
pub enum Shuffler {
    Random,
    Seeded(Mulberry32),
}

impl Shuffler {
    pub fn seeded(seed: u32) -> Self {
        Shuffler::Seeded(Mulberry32::new(seed))
    }

    fn next_f64(&mut self) -> f64 {
        match self {
            Shuffler::Random => rand::random::<f64>(),
            Shuffler::Seeded(rng) => rng.next_f64(),
        }
    }

    /// In-place Fisher–Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64).floor() as usize;
            items.swap(i, j.min(i));
        }
    }
}

/// Shuffle the full bank and keep at most `limit` questions.
pub fn prepare_bank(
    mut questions: Vec<Question>,
    shuffler: &mut Shuffler,
    limit: usize,
) -> Vec<Question> {
    shuffler.shuffle(&mut questions);
    questions.truncate(limit);
    questions
}
