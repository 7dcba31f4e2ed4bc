use rand::prelude::{SeedableRng, StdRng};

/// Creates an independent, reproducible generator for one stream of work (for
/// example a single rollout) derived from a shared base seed.
pub fn create_rng(seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(stream.wrapping_mul(STREAM_STRIDE)))
}

const STREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;
