//! Player profile model.
//!
//! # Invariants
//! - `level` always equals `level_for_xp(xp)`; only `grant` mutates progress.
//! - XP and coins never decrease.
//! - XP and coins never exceed `MAX_COUNTER`, the largest value SQLite
//!   `INTEGER` can hold, so every store accepts every profile.

use crate::progression::{level_for_xp, progression, Progression};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type UserId = String;

/// Upper bound for XP and coin counters.
pub const MAX_COUNTER: u64 = i64::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub business_name: Option<String>,
    pub xp: u64,
    /// Derived from `xp`; persisted for read convenience only.
    pub level: u64,
    pub coins: u64,
}

impl UserProfile {
    /// Creates a fresh level-1 profile with no XP or coins.
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            business_name: None,
            xp: 0,
            level: level_for_xp(0),
            coins: 0,
        }
    }

    /// Creates a profile with a generated id, used by guest login.
    pub fn guest(display_name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), display_name)
    }

    pub fn with_business_name(mut self, business_name: impl Into<String>) -> Self {
        self.business_name = Some(business_name.into());
        self
    }

    /// Sets starting totals, used by fixtures and imports. Values above
    /// `MAX_COUNTER` are capped.
    pub fn with_totals(mut self, xp: u64, coins: u64) -> Self {
        self.xp = xp.min(MAX_COUNTER);
        self.coins = coins.min(MAX_COUNTER);
        self.level = level_for_xp(self.xp);
        self
    }

    /// Adds a reward and recomputes the derived level.
    ///
    /// Saturates at `MAX_COUNTER` instead of overflowing.
    pub fn grant(&mut self, xp: u64, coins: u64) {
        self.xp = self.xp.saturating_add(xp).min(MAX_COUNTER);
        self.coins = self.coins.saturating_add(coins).min(MAX_COUNTER);
        self.level = level_for_xp(self.xp);
    }

    pub fn progression(&self) -> Progression {
        progression(self.xp)
    }

    /// Validates profile invariants before persistence.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.id.trim().is_empty() {
            return Err(ProfileValidationError::EmptyId);
        }
        if self.display_name.trim().is_empty() {
            return Err(ProfileValidationError::EmptyDisplayName);
        }
        let expected = level_for_xp(self.xp);
        if self.level != expected {
            return Err(ProfileValidationError::LevelMismatch {
                xp: self.xp,
                level: self.level,
                expected,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyId,
    EmptyDisplayName,
    LevelMismatch { xp: u64, level: u64, expected: u64 },
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id cannot be empty"),
            Self::EmptyDisplayName => write!(f, "display name cannot be empty"),
            Self::LevelMismatch {
                xp,
                level,
                expected,
            } => write!(
                f,
                "level {level} does not match xp {xp} (expected level {expected})"
            ),
        }
    }
}

impl Error for ProfileValidationError {}

#[cfg(test)]
mod tests {
    use super::{ProfileValidationError, UserProfile, MAX_COUNTER};

    #[test]
    fn guest_profiles_get_distinct_valid_ids() {
        let first = UserProfile::guest("Misafir");
        let second = UserProfile::guest("Misafir");
        assert_ne!(first.id, second.id);
        assert!(first.validate().is_ok());
        assert_eq!(first.level, 1);
    }

    #[test]
    fn grant_recomputes_level() {
        let mut user = UserProfile::new("user-1", "Ayse").with_totals(1200, 450);
        assert_eq!(user.level, 2);

        user.grant(50, 25);
        assert_eq!(user.xp, 1250);
        assert_eq!(user.coins, 475);
        assert_eq!(user.level, 2);

        user.grant(750, 0);
        assert_eq!(user.level, 3);
    }

    #[test]
    fn grant_saturates_at_storage_limit() {
        let mut user = UserProfile::new("user-1", "Ayse").with_totals(MAX_COUNTER - 1, u64::MAX);
        assert_eq!(user.coins, MAX_COUNTER);
        user.grant(10, 10);
        assert_eq!(user.xp, MAX_COUNTER);
        assert_eq!(user.coins, MAX_COUNTER);
        assert_eq!(user.level, MAX_COUNTER / 1000 + 1);
    }

    #[test]
    fn validate_detects_stale_level() {
        let mut user = UserProfile::new("user-1", "Ayse");
        user.xp = 5000;
        assert!(matches!(
            user.validate(),
            Err(ProfileValidationError::LevelMismatch { expected: 6, .. })
        ));
    }
}
