//! Ledger use-case service.
//!
//! # Responsibility
//! - Complete tasks and achievements, crediting rewards to the profile.
//! - Expose read snapshots of the ledger and profile.
//! - Grant the fixed daily bonus.
//!
//! # Invariants
//! - `NotFound` and `AlreadyCompleted` always reach the caller.
//! - A rejected completion leaves XP and coins unchanged.
//! - Service layer remains storage-agnostic.

use crate::model::ledger_item::{Achievement, LedgerItem, LedgerItemKind, Task};
use crate::model::profile::UserProfile;
use crate::repo::ledger_repo::{Completion, LedgerRepository, LedgerSeed, RepoError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DAILY_BONUS_XP: u64 = 50;
pub const DAILY_BONUS_COINS: u64 = 25;

#[derive(Debug)]
pub enum LedgerError {
    NotFound { kind: LedgerItemKind, id: String },
    AlreadyCompleted { kind: LedgerItemKind, id: String },
    InvalidInput(String),
    Repo(RepoError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::AlreadyCompleted { kind, id } => write!(f, "{kind} already completed: {id}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::AlreadyCompleted { kind, id } => Self::AlreadyCompleted { kind, id },
            other => Self::Repo(other),
        }
    }
}

impl LedgerError {
    /// Stable machine-readable code for FFI and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyCompleted { .. } => "already_completed",
            Self::InvalidInput(_) => "invalid_input",
            Self::Repo(_) => "storage_error",
        }
    }
}

/// Reward credited by `claim_daily_bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBonus {
    pub xp: u64,
    pub coins: u64,
}

/// Ledger facade over repository implementations.
pub struct LedgerService<R: LedgerRepository> {
    repo: R,
}

impl<R: LedgerRepository> LedgerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Wraps `repo` after seeding it when empty.
    pub fn with_seed(mut repo: R, seed: &LedgerSeed) -> Result<Self, LedgerError> {
        if repo.seed(seed)? {
            info!(
                "event=ledger_seed module=ledger status=ok items={}",
                seed.items.len()
            );
        }
        Ok(Self { repo })
    }

    /// Completes one daily task.
    ///
    /// # Errors
    /// - `LedgerError::NotFound` for unknown ids.
    /// - `LedgerError::AlreadyCompleted` when the task was completed before;
    ///   no reward is granted in that case.
    pub fn complete_task(&mut self, task_id: &str) -> Result<Completion, LedgerError> {
        self.complete(LedgerItemKind::Task, task_id)
    }

    /// Unlocks one achievement with the same semantics as `complete_task`.
    pub fn complete_achievement(
        &mut self,
        achievement_id: &str,
    ) -> Result<Completion, LedgerError> {
        self.complete(LedgerItemKind::Achievement, achievement_id)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, LedgerError> {
        Ok(self.repo.list_items(LedgerItemKind::Task)?)
    }

    pub fn list_achievements(&self) -> Result<Vec<Achievement>, LedgerError> {
        Ok(self.repo.list_items(LedgerItemKind::Achievement)?)
    }

    pub fn get_item(
        &self,
        kind: LedgerItemKind,
        id: &str,
    ) -> Result<Option<LedgerItem>, LedgerError> {
        Ok(self.repo.get_item(kind, id.trim())?)
    }

    pub fn get_user(&self) -> Result<UserProfile, LedgerError> {
        Ok(self.repo.load_profile()?)
    }

    /// Replaces the profile display name.
    pub fn update_display_name(&mut self, display_name: &str) -> Result<UserProfile, LedgerError> {
        let trimmed = display_name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidInput(
                "display name cannot be empty".to_string(),
            ));
        }
        let mut profile = self.repo.load_profile()?;
        profile.display_name = trimmed.to_string();
        self.repo.save_profile(&profile)?;
        Ok(profile)
    }

    /// Credits the fixed daily bonus and returns it with the updated profile.
    pub fn claim_daily_bonus(&mut self) -> Result<(DailyBonus, UserProfile), LedgerError> {
        let bonus = DailyBonus {
            xp: DAILY_BONUS_XP,
            coins: DAILY_BONUS_COINS,
        };
        let profile = self.repo.grant_reward(bonus.xp, bonus.coins)?;
        info!(
            "event=daily_bonus module=ledger status=ok xp={} coins={} level={}",
            bonus.xp, bonus.coins, profile.level
        );
        Ok((bonus, profile))
    }

    /// Adds a new item, e.g. a mission published by the business owner.
    pub fn add_item(&mut self, item: &LedgerItem) -> Result<(), LedgerError> {
        if item.completed {
            return Err(LedgerError::InvalidInput(format!(
                "new {} `{}` cannot start completed",
                item.kind, item.id
            )));
        }
        Ok(self.repo.insert_item(item)?)
    }

    fn complete(&mut self, kind: LedgerItemKind, id: &str) -> Result<Completion, LedgerError> {
        let id = id.trim();
        match self.repo.complete_item(kind, id) {
            Ok(completion) => {
                info!(
                    "event=ledger_complete module=ledger status=ok kind={kind} xp_reward={} coin_reward={} level={}",
                    completion.item.xp_reward, completion.item.coin_reward, completion.profile.level
                );
                Ok(completion)
            }
            Err(err) => {
                let err = LedgerError::from(err);
                warn!(
                    "event=ledger_complete module=ledger status=error kind={kind} error_code={}",
                    err.code()
                );
                Err(err)
            }
        }
    }
}
