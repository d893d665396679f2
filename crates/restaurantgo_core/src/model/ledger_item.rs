//! Task and achievement records.
//!
//! # Responsibility
//! - Define the single record shape shared by daily tasks and achievements.
//! - Own the one-way completion transition and its reward grant.
//!
//! # Invariants
//! - `completed` only ever moves from `false` to `true`.
//! - A reward is granted exactly once, at the moment of completion.
//! - `due_date`, when set, is an ISO `YYYY-MM-DD` date string.

use crate::model::profile::UserProfile;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});

pub type LedgerItemId = String;

/// Ledger category. Tasks are daily missions; achievements are permanent
/// unlocks. Both share the same record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerItemKind {
    Task,
    Achievement,
}

impl LedgerItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Achievement => "achievement",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "task" => Some(Self::Task),
            "achievement" => Some(Self::Achievement),
            _ => None,
        }
    }
}

impl Display for LedgerItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerItem {
    pub id: LedgerItemId,
    pub kind: LedgerItemKind,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub xp_reward: u64,
    pub coin_reward: u64,
    /// Meaningful for tasks only.
    pub due_date: Option<String>,
    /// UI icon name. Meaningful for achievements only.
    pub icon: Option<String>,
}

/// Alias kept for call sites that only deal with daily missions.
pub type Task = LedgerItem;
/// Alias kept for call sites that only deal with unlocks.
pub type Achievement = LedgerItem;

impl LedgerItem {
    /// Creates an open task.
    pub fn task(
        id: impl Into<LedgerItemId>,
        title: impl Into<String>,
        description: impl Into<String>,
        xp_reward: u64,
        coin_reward: u64,
    ) -> Self {
        Self::open(
            LedgerItemKind::Task,
            id.into(),
            title.into(),
            description.into(),
            xp_reward,
            coin_reward,
        )
    }

    /// Creates a locked achievement.
    pub fn achievement(
        id: impl Into<LedgerItemId>,
        title: impl Into<String>,
        description: impl Into<String>,
        xp_reward: u64,
        coin_reward: u64,
    ) -> Self {
        Self::open(
            LedgerItemKind::Achievement,
            id.into(),
            title.into(),
            description.into(),
            xp_reward,
            coin_reward,
        )
    }

    fn open(
        kind: LedgerItemKind,
        id: LedgerItemId,
        title: String,
        description: String,
        xp_reward: u64,
        coin_reward: u64,
    ) -> Self {
        Self {
            id,
            kind,
            title,
            description,
            completed: false,
            xp_reward,
            coin_reward,
            due_date: None,
            icon: None,
        }
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Marks an item as already completed, used when seeding history.
    pub fn already_completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Completes this item and grants its reward to `user`.
    ///
    /// # Errors
    /// - Returns `CompletionError::AlreadyCompleted` and leaves both values
    ///   untouched when the item is already complete.
    pub fn complete_for(&mut self, user: &mut UserProfile) -> Result<(), CompletionError> {
        if self.completed {
            return Err(CompletionError::AlreadyCompleted {
                kind: self.kind,
                id: self.id.clone(),
            });
        }
        self.completed = true;
        user.grant(self.xp_reward, self.coin_reward);
        Ok(())
    }

    /// Validates record shape before persistence.
    pub fn validate(&self) -> Result<(), LedgerItemValidationError> {
        if self.id.trim().is_empty() {
            return Err(LedgerItemValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(LedgerItemValidationError::EmptyTitle(self.id.clone()));
        }
        if let Some(due_date) = self.due_date.as_deref() {
            if !ISO_DATE_RE.is_match(due_date) {
                return Err(LedgerItemValidationError::InvalidDueDate(
                    due_date.to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    AlreadyCompleted {
        kind: LedgerItemKind,
        id: LedgerItemId,
    },
}

impl Display for CompletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyCompleted { kind, id } => write!(f, "{kind} already completed: {id}"),
        }
    }
}

impl Error for CompletionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerItemValidationError {
    EmptyId,
    EmptyTitle(LedgerItemId),
    InvalidDueDate(String),
}

impl Display for LedgerItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "ledger item id cannot be empty"),
            Self::EmptyTitle(id) => write!(f, "ledger item `{id}` has an empty title"),
            Self::InvalidDueDate(value) => {
                write!(f, "due_date must be YYYY-MM-DD, got `{value}`")
            }
        }
    }
}

impl Error for LedgerItemValidationError {}
