//! Runtime entropy for the procedural fallback. The core generator takes an
//! explicit seed; this is the only place non-determinism enters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(std::process::id());
    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    mix_seed(entropy)
}

fn mix_seed(value: u64) -> u64 {
    let mut mixed = value ^ 0x9E37_79B9_7F4A_7C15;
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_seeds_differ_even_within_one_clock_tick() {
        let first = runtime_seed();
        let second = runtime_seed();
        assert_ne!(first, second);
    }

    #[test]
    fn mixer_spreads_small_input_deltas() {
        assert_ne!(mix_seed(0), mix_seed(1));
        assert_ne!(mix_seed(1), mix_seed(2));
    }
}
