// Small seeded PRNG for weight initialization.
//
// NOT cryptographically secure. Only used so that a run with a given seed is
// reproducible.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

const ZERO_STATE_REPLACEMENT: u64 = 0x9E37_79B9_7F4A_7C15;

impl Prng {
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the zero state.
        let state = if seed == 0 { ZERO_STATE_REPLACEMENT } else { seed };
        Self { state }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn next_f32_01(&mut self) -> f32 {
        // 24 mantissa bits keep the result strictly below 1.0.
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    #[inline]
    pub fn gen_range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32_01()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Prng::new(42);
        let mut b = Prng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut p = Prng::new(0);
        assert_ne!(p.state, 0);
        assert_ne!(p.next_u32(), p.next_u32());
    }

    #[test]
    fn unit_interval_is_half_open() {
        let mut p = Prng::new(7);
        for _ in 0..10_000 {
            let x = p.next_f32_01();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
