use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. Used for every
/// yield, capacity and banked remainder so settlement is exact.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of scheduler time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in the tick loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert an f64 to Fixed64, or `None` when it is NaN or outside the Q32.32
/// range. Level data goes through this so oversized values are rejected
/// instead of wrapping.
#[inline]
pub fn checked_f64_to_fixed64(v: f64) -> Option<Fixed64> {
    Fixed64::checked_from_num(v)
}

/// Convert an f64 to Fixed64, clamping to the representable range. NaN maps
/// to zero.
#[inline]
pub fn saturating_f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        return Fixed64::ZERO;
    }
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Split a non-negative amount into its whole-unit part and the fractional
/// remainder. Negative input is treated as zero.
#[inline]
pub fn split_whole(v: Fixed64) -> (u32, Fixed64) {
    if v <= Fixed64::ZERO {
        return (0, Fixed64::ZERO);
    }
    let whole = v.floor();
    let units = whole.to_num::<i64>().clamp(0, u32::MAX as i64) as u32;
    (units, v - whole)
}
