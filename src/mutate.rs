//! Deterministic mutation primitives for the fuzz categories.
//!
//! Everything here is pure: the same seed always yields the same bytes, so a
//! failing size or shuffle round can be replayed in isolation when filing a
//! bug report.

/// Width of a shuffle word in bytes.
pub const WORD_WIDTH: usize = std::mem::size_of::<u64>();

/// Linear congruential generator (Numerical Recipes constants).
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform-ish value in `0..bound`; returns 0 for an empty bound.
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }
}

/// `size` pseudo-random bytes over the full 0–255 alphabet.
pub fn random_bytes(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = Lcg::new(seed);
    // Low LCG bits have short periods; take a middle byte instead.
    (0..size).map(|_| (rng.next_u64() >> 32) as u8).collect()
}

/// In-place Fisher–Yates permutation seeded by `seed`.
pub fn shuffle_words(words: &mut [u64], seed: u64) {
    let mut rng = Lcg::new(seed);
    for i in (1..words.len()).rev() {
        let j = rng.next_below(i + 1);
        words.swap(i, j);
    }
}

/// Reinterpret the longest whole-word prefix of `bytes` as little-endian
/// words. Trailing bytes that do not fill a word are dropped.
pub fn split_words(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks_exact(WORD_WIDTH)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// Repack words into the byte buffer they came from.
pub fn pack_words(words: &[u64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * WORD_WIDTH);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}
