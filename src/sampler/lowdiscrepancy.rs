//! Deterministic low-discrepancy point generation.
//!
//! Everything here is a pure function of its arguments so it can be called
//! concurrently from any number of generator threads without shared state,
//! and the sequence can be restarted from any index.

use Point2f;

/// Compute the radical inverse of `a` in the prime base selected by
/// `base_index`. Base 2 uses a bit reversal fast path.
pub fn radical_inverse(base_index: u32, a: u64) -> f32 {
    match base_index {
        0 => reverse_bits_64(a) as f32 * 5.421_010_862_427_522e-20,
        1 => radical_inverse_specialized(3, a),
        2 => radical_inverse_specialized(5, a),
        3 => radical_inverse_specialized(7, a),
        4 => radical_inverse_specialized(11, a),
        5 => radical_inverse_specialized(13, a),
        _ => unimplemented!(),
    }
}

/// Map a global sample index to a 2D low-discrepancy coordinate in `[0,1)^2`
/// using the coprime bases (2, 3).
pub fn halton_2d(index: u64) -> Point2f {
    Point2f::new(radical_inverse(0, index), radical_inverse(1, index))
}

fn reverse_bits_32(n: u32) -> u32 {
    let mut n = n;
    n = (n << 16) | (n >> 16);
    n = ((n & 0x00ff_00ff) << 8) | ((n & 0xff00_ff00) >> 8);
    n = ((n & 0x0f0f_0f0f) << 4) | ((n & 0xf0f0_f0f0) >> 4);
    n = ((n & 0x3333_3333) << 2) | ((n & 0xcccc_cccc) >> 2);
    n = ((n & 0x5555_5555) << 1) | ((n & 0xaaaa_aaaa) >> 1);
    n
}

fn reverse_bits_64(n: u64) -> u64 {
    let n0 = reverse_bits_32(n as u32);
    let n1 = reverse_bits_32((n >> 32) as u32);
    (u64::from(n0) << 32) | u64::from(n1)
}

fn radical_inverse_specialized(base: u32, a: u64) -> f32 {
    let inv_base = 1.0 / base as f32;
    let mut a = a;
    let mut reversed_digits: u64 = 0;
    let mut inv_base_n = 1.0;
    while a != 0 {
        let next = a / u64::from(base);
        let digit = a - next * u64::from(base);
        reversed_digits = reversed_digits * u64::from(base) + digit;
        inv_base_n *= inv_base;
        a = next;
    }
    (reversed_digits as f32 * inv_base_n).min(::ONE_MINUS_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_2_prefix() {
        // Van der Corput sequence in base 2.
        let expected = [0.0, 0.5, 0.25, 0.75, 0.125, 0.625, 0.375, 0.875];
        for (i, e) in expected.iter().enumerate() {
            assert_relative_eq!(radical_inverse(0, i as u64), *e, epsilon = 1e-7);
        }
    }

    #[test]
    fn base_3_prefix() {
        let expected = [
            0.0,
            1.0 / 3.0,
            2.0 / 3.0,
            1.0 / 9.0,
            4.0 / 9.0,
            7.0 / 9.0,
        ];
        for (i, e) in expected.iter().enumerate() {
            assert_relative_eq!(radical_inverse(1, i as u64), *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn values_stay_in_unit_interval() {
        for i in 0..10_000u64 {
            let p = halton_2d(i);
            assert!(p.x >= 0.0 && p.x < 1.0, "u out of range at {}: {}", i, p.x);
            assert!(p.y >= 0.0 && p.y < 1.0, "v out of range at {}: {}", i, p.y);
        }
    }

    #[test]
    fn deterministic_and_restartable() {
        for i in (0..5_000u64).rev() {
            assert_eq!(halton_2d(i), halton_2d(i));
        }
    }
}
