use ONE_MINUS_EPSILON;
use Point2f;

const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// Per-sample source of random decisions handed to a `SampleRenderer`.
///
/// The context is seeded by the sample's global sequence index, so the
/// sub-sample decisions made inside the renderer are reproducible for a given
/// sample and statistically independent between samples, no matter which
/// generator thread evaluates them.
pub struct SamplingContext {
    state: u64,
    inc: u64,
    instance: u64,
}

impl SamplingContext {
    pub fn new(instance: u64) -> SamplingContext {
        // PCG sequence selection: every instance gets its own stream.
        let mut ctx = SamplingContext {
            state: 0,
            inc: (instance << 1) | 1,
            instance,
        };
        ctx.next_u32();
        ctx.state = ctx.state.wrapping_add(PCG32_DEFAULT_STATE);
        ctx.next_u32();
        ctx
    }

    /// The global sequence index this context was seeded with.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn next_1d(&mut self) -> f32 {
        (self.next_u32() as f32 * 2.328_306_4e-10).min(ONE_MINUS_EPSILON)
    }

    pub fn next_2d(&mut self) -> Point2f {
        Point2f::new(self.next_1d(), self.next_1d())
    }

    fn next_u32(&mut self) -> u32 {
        let oldstate = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted = (((oldstate >> 18) ^ oldstate) >> 27) as u32;
        let rot = (oldstate >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproducible_for_a_given_instance() {
        let a: Vec<f32> = {
            let mut ctx = SamplingContext::new(42);
            (0..16).map(|_| ctx.next_1d()).collect()
        };
        let b: Vec<f32> = {
            let mut ctx = SamplingContext::new(42);
            (0..16).map(|_| ctx.next_1d()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn different_instances_differ() {
        let mut a = SamplingContext::new(0);
        let mut b = SamplingContext::new(1);
        let va: Vec<f32> = (0..8).map(|_| a.next_1d()).collect();
        let vb: Vec<f32> = (0..8).map(|_| b.next_1d()).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn draws_stay_in_unit_interval() {
        let mut ctx = SamplingContext::new(7);
        for _ in 0..10_000 {
            let p = ctx.next_2d();
            assert!(p.x >= 0.0 && p.x < 1.0);
            assert!(p.y >= 0.0 && p.y < 1.0);
        }
    }
}
