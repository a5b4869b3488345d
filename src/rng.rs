use rand::RngCore;

/// SplitMix64 generator shared by negative draws and batch permutation.
///
/// The whole generator state is one `u64`, so sessions can checkpoint and
/// resume the exact sample stream. Independent streams over one seed (the
/// pointwise session and the pairwise sampler) come from [`with_stream`].
///
/// [`with_stream`]: DeterministicRng::with_stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterministicRng {
    state: u64,
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

impl DeterministicRng {
    /// Seed a new generator.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generator for the named `stream` of `seed`.
    ///
    /// Stream `0` is the plain seeded generator; other streams start
    /// `stream` positions of state away from it.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        Self::new(seed.wrapping_add(stream))
    }

    /// Rebuild a generator from a previously captured [`DeterministicRng::state`].
    pub fn from_state(state: u64) -> Self {
        Self { state }
    }

    /// Current internal state.
    pub fn state(&self) -> u64 {
        self.state
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let word = self.step().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}
