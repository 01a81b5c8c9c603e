use fixed::types::I32F32;

use crate::id::BlockPos;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// A point in world space (entity positions, drop locations).
pub type Vec3 = [Fixed64; 3];

/// Convert an f64 to Fixed64. Use only for initialization, never in the tick loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// The minimum corner of a block, in world space.
pub fn block_corner(pos: BlockPos) -> Vec3 {
    [
        Fixed64::from_num(pos.x),
        Fixed64::from_num(pos.y),
        Fixed64::from_num(pos.z),
    ]
}

/// Ratio `part / whole`, clamped to [0, 1]. Zero when `whole` is zero.
pub fn ratio(part: u32, whole: u32) -> Fixed64 {
    if whole == 0 {
        return Fixed64::ZERO;
    }
    let part = u64::from(part.min(whole));
    // part <= whole, so the quotient is at most 1 << 32 and fits.
    Fixed64::from_bits(((part << 32) / u64::from(whole)) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_round_trip() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn block_corner_matches_position() {
        let corner = block_corner(BlockPos::new(3, -2, 10));
        assert_eq!(corner[0], Fixed64::from_num(3));
        assert_eq!(corner[1], Fixed64::from_num(-2));
        assert_eq!(corner[2], Fixed64::from_num(10));
    }

    #[test]
    fn ratio_clamps_and_handles_zero() {
        assert_eq!(ratio(5, 0), Fixed64::ZERO);
        assert_eq!(ratio(5, 10), f64_to_fixed64(0.5));
        assert_eq!(ratio(20, 10), Fixed64::ONE);
        assert_eq!(ratio(u32::MAX, u32::MAX), Fixed64::ONE);
        assert_eq!(ratio(u32::MAX / 2, u32::MAX - 1), f64_to_fixed64(0.5));
    }
}
