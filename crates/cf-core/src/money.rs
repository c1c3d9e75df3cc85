//! Rounding conventions shared by cost and budget accounting
//!
//! The spec fixes three distinct precisions: cost estimates round to the
//! nearest tenth of a cent, budget snapshots round to the nearest
//! micro-USD, and percentages round to the nearest hundredth of a percent.
//! Centralizing them here keeps `cf-costbook` and `cf-budget` from drifting
//! apart on how a dollar amount gets rounded.

/// Round a value to `decimals` fractional digits using standard
/// round-half-away-from-zero semantics
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round a USD amount to the nearest tenth of a cent ($0.001)
#[must_use]
pub fn round_tenth_cent(value: f64) -> f64 {
    round_to(value, 3)
}

/// Round a USD amount to the nearest micro-dollar ($0.000001)
#[must_use]
pub fn round_micro_usd(value: f64) -> f64 {
    round_to(value, 6)
}

/// Round a percentage to the nearest hundredth of a percent (0.01%)
#[must_use]
pub fn round_percent(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_tenth_cent() {
        assert!((round_tenth_cent(0.123_45) - 0.123).abs() < f64::EPSILON);
        assert!((round_tenth_cent(0.123_55) - 0.124).abs() < 1e-9);
    }

    #[test]
    fn rounds_to_micro_usd() {
        assert!((round_micro_usd(1.234_567_8) - 1.234_568).abs() < 1e-9);
    }

    #[test]
    fn rounds_to_basis_points_of_percent() {
        assert!((round_percent(42.369) - 42.37).abs() < 1e-9);
    }
}
