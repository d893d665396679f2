//! XP progression rules.
//!
//! # Responsibility
//! - Derive level and in-level progress from a cumulative XP counter.
//!
//! # Invariants
//! - Level is `xp / XP_PER_LEVEL + 1`, so it is always >= 1 and never
//!   decreases as XP grows.
//! - `xp_into_level` is always strictly below `XP_PER_LEVEL`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed XP span of every level.
pub const XP_PER_LEVEL: u64 = 1000;

/// Progress snapshot derived from cumulative XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u64,
    pub xp_into_level: u64,
    pub xp_needed_for_next_level: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionError {
    /// XP counters cannot be negative.
    InvalidXp(i64),
}

impl Display for ProgressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidXp(value) => write!(f, "invalid xp value: {value}"),
        }
    }
}

impl Error for ProgressionError {}

/// Computes progression for signed input coming from untyped callers.
///
/// # Errors
/// - Returns `ProgressionError::InvalidXp` when `xp` is negative.
pub fn progression_for_xp(xp: i64) -> Result<Progression, ProgressionError> {
    let xp = u64::try_from(xp).map_err(|_| ProgressionError::InvalidXp(xp))?;
    Ok(progression(xp))
}

/// Computes progression for an already non-negative counter.
pub fn progression(xp: u64) -> Progression {
    let level = level_for_xp(xp);
    Progression {
        level,
        xp_into_level: xp - (level - 1) * XP_PER_LEVEL,
        xp_needed_for_next_level: XP_PER_LEVEL,
    }
}

pub fn level_for_xp(xp: u64) -> u64 {
    xp / XP_PER_LEVEL + 1
}

/// Cumulative XP at which `level` ends and the next one begins.
pub fn xp_threshold_for_level(level: u64) -> u64 {
    level.saturating_mul(XP_PER_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::{
        level_for_xp, progression, progression_for_xp, xp_threshold_for_level,
        ProgressionError, XP_PER_LEVEL,
    };

    #[test]
    fn level_boundaries_follow_fixed_span() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(999), 1);
        assert_eq!(level_for_xp(1000), 2);
        assert_eq!(level_for_xp(2750), 3);
    }

    #[test]
    fn progression_splits_xp_into_level_and_remainder() {
        let snapshot = progression(2750);
        assert_eq!(snapshot.level, 3);
        assert_eq!(snapshot.xp_into_level, 750);
        assert_eq!(snapshot.xp_needed_for_next_level, XP_PER_LEVEL);
    }

    #[test]
    fn negative_xp_is_rejected() {
        assert_eq!(
            progression_for_xp(-1).unwrap_err(),
            ProgressionError::InvalidXp(-1)
        );
    }

    #[test]
    fn level_is_monotonic_over_a_range() {
        let mut previous = level_for_xp(0);
        for xp in (0..20_000).step_by(37) {
            let level = level_for_xp(xp);
            assert!(level >= 1);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn max_xp_does_not_overflow() {
        let snapshot = progression(u64::MAX);
        assert!(snapshot.xp_into_level < XP_PER_LEVEL);
    }

    #[test]
    fn threshold_matches_next_level_start() {
        assert_eq!(xp_threshold_for_level(2), 2000);
        assert_eq!(level_for_xp(xp_threshold_for_level(2)), 3);
    }
}
