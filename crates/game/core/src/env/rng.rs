//! RNG oracle for deterministic random number generation.
//!
//! Random draws are used for target tie-breaking and instance selection. Every
//! draw is derived from the game seed, the turn, the creature and a context
//! value, so a whole simulation replays identically from its seed.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Pick an index in `0..len`. Returns 0 for empty or single-element sets.
    fn pick_index(&self, seed: u64, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_u32(seed) as usize) % len
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = (max - min).saturating_add(1);
        min + (self.next_u32(seed) % range)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG is a family of simple, fast, space-efficient RNGs with excellent
/// statistical quality. This implementation uses PCG-XSH-RR, which produces
/// 32-bit output from 64-bit state.
///
/// # Properties
///
/// - **Deterministic**: Same seed always produces same output
/// - **Fast**: Single multiply + xorshift + rotate
/// - **Small state**: Only 64 bits
/// - **Good quality**: Passes statistical tests (PractRand, TestU01)
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
/// - Implementation based on PCG-XSH-RR variant
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the PCG state by one step.
    ///
    /// Uses LCG (Linear Congruential Generator) formula:
    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    ///
    /// This is where the "permutation" happens - transforms the LCG state
    /// into high-quality random output.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        // XOR upper bits with lower bits, shift right
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;

        // Use upper bits to determine rotation amount
        let rot = (state >> 59) as u32;

        // Random rotation provides the final permutation
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Compute deterministic seed from simulation components.
///
/// # Arguments
///
/// * `game_seed` - Base seed set when the world is created
/// * `turn` - Current game turn
/// * `creature` - Creature making the draw
/// * `context` - Distinguishes independent draws by the same creature in one turn
///
/// # Context Values
///
/// - `0`: target tie-break
/// - `1`: instance selection
/// - `2`: wander destination
pub fn compute_seed(game_seed: u64, turn: u64, creature: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= turn.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (creature as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Seed contexts used by the engine.
pub mod seed_context {
    pub const TARGET_TIE_BREAK: u32 = 0;
    pub const INSTANCE_CHOICE: u32 = 1;
    pub const WANDER: u32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_give_same_draw() {
        let rng = PcgRng;
        let seed = compute_seed(42, 7, 3, seed_context::TARGET_TIE_BREAK);
        assert_eq!(rng.next_u32(seed), rng.next_u32(seed));
        assert_ne!(seed, compute_seed(42, 7, 4, seed_context::TARGET_TIE_BREAK));
    }

    #[test]
    fn range_and_pick_stay_in_bounds() {
        let rng = PcgRng;
        for turn in 0..64 {
            let seed = compute_seed(1, turn, 1, seed_context::WANDER);
            let value = rng.range(seed, 10, 20);
            assert!((10..=20).contains(&value));
            assert!(rng.pick_index(seed, 3) < 3);
        }
        assert_eq!(rng.pick_index(5, 0), 0);
    }
}
