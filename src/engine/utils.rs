/// Bounds a frame delta to `[0, max]`; non-finite input counts as no time.
pub(super) fn clamp_delta(dt: f32, max: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max)
}

/// Points for the `nth` ghost caught in one power period, counting from 1.
pub(super) fn chain_points(base: u32, nth: u32) -> u32 {
    let doublings = nth.saturating_sub(1);
    base.saturating_mul(2u32.saturating_pow(doublings))
}
