//! Ledger repository contracts with in-memory and SQLite implementations.
//!
//! # Responsibility
//! - Persist the single player profile and its task/achievement ledger.
//! - Apply completion and reward writes atomically.
//!
//! # Invariants
//! - A store holds at most one profile; writes for another id are rejected.
//! - `(kind, id)` is unique; listing preserves insertion order.
//! - Completing an item and crediting its reward is all-or-nothing.
//! - Write paths validate records before mutation; read paths reject invalid
//!   persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::ledger_item::{
    CompletionError, LedgerItem, LedgerItemKind, LedgerItemValidationError,
};
use crate::model::profile::{ProfileValidationError, UserProfile};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    kind,
    id,
    title,
    description,
    completed,
    xp_reward,
    coin_reward,
    due_date,
    icon
FROM ledger_items";

const PROFILE_SELECT_SQL: &str = "SELECT
    id,
    display_name,
    business_name,
    xp,
    level,
    coins
FROM user_profile
ORDER BY rowid ASC
LIMIT 1;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for ledger persistence and completion.
#[derive(Debug)]
pub enum RepoError {
    InvalidProfile(ProfileValidationError),
    InvalidItem(LedgerItemValidationError),
    Db(DbError),
    NotFound {
        kind: LedgerItemKind,
        id: String,
    },
    AlreadyCompleted {
        kind: LedgerItemKind,
        id: String,
    },
    Duplicate {
        kind: LedgerItemKind,
        id: String,
    },
    ProfileMissing,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProfile(err) => write!(f, "{err}"),
            Self::InvalidItem(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::AlreadyCompleted { kind, id } => write!(f, "{kind} already completed: {id}"),
            Self::Duplicate { kind, id } => write!(f, "{kind} already exists: {id}"),
            Self::ProfileMissing => write!(f, "no user profile has been stored"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidProfile(err) => Some(err),
            Self::InvalidItem(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProfileValidationError> for RepoError {
    fn from(value: ProfileValidationError) -> Self {
        Self::InvalidProfile(value)
    }
}

impl From<LedgerItemValidationError> for RepoError {
    fn from(value: LedgerItemValidationError) -> Self {
        Self::InvalidItem(value)
    }
}

impl From<CompletionError> for RepoError {
    fn from(value: CompletionError) -> Self {
        match value {
            CompletionError::AlreadyCompleted { kind, id } => Self::AlreadyCompleted { kind, id },
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Initial state written into an empty store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSeed {
    pub profile: UserProfile,
    pub items: Vec<LedgerItem>,
}

/// Result of one successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub item: LedgerItem,
    pub profile: UserProfile,
}

/// Repository interface for the profile + ledger store.
pub trait LedgerRepository {
    /// Writes `seed` when the store holds no profile yet.
    ///
    /// Returns `true` when seeding happened.
    fn seed(&mut self, seed: &LedgerSeed) -> RepoResult<bool>;
    fn load_profile(&self) -> RepoResult<UserProfile>;
    fn save_profile(&mut self, profile: &UserProfile) -> RepoResult<()>;
    fn insert_item(&mut self, item: &LedgerItem) -> RepoResult<()>;
    fn get_item(&self, kind: LedgerItemKind, id: &str) -> RepoResult<Option<LedgerItem>>;
    /// Lists items of one kind in insertion order.
    fn list_items(&self, kind: LedgerItemKind) -> RepoResult<Vec<LedgerItem>>;
    /// Completes one item and credits its reward in a single atomic write.
    fn complete_item(&mut self, kind: LedgerItemKind, id: &str) -> RepoResult<Completion>;
    /// Credits a reward that is not tied to a ledger item.
    fn grant_reward(&mut self, xp: u64, coins: u64) -> RepoResult<UserProfile>;
}

/// Transient store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerRepository {
    profile: Option<UserProfile>,
    items: Vec<LedgerItem>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store already populated from `seed`.
    pub fn from_seed(seed: &LedgerSeed) -> RepoResult<Self> {
        let mut repo = Self::new();
        repo.seed(seed)?;
        Ok(repo)
    }
}

impl LedgerRepository for InMemoryLedgerRepository {
    fn seed(&mut self, seed: &LedgerSeed) -> RepoResult<bool> {
        if self.profile.is_some() {
            return Ok(false);
        }

        seed.profile.validate()?;
        let mut staged: Vec<LedgerItem> = Vec::with_capacity(seed.items.len());
        for item in &seed.items {
            item.validate()?;
            if staged
                .iter()
                .any(|existing| existing.kind == item.kind && existing.id == item.id)
            {
                return Err(RepoError::Duplicate {
                    kind: item.kind,
                    id: item.id.clone(),
                });
            }
            staged.push(item.clone());
        }

        self.profile = Some(seed.profile.clone());
        self.items = staged;
        Ok(true)
    }

    fn load_profile(&self) -> RepoResult<UserProfile> {
        self.profile.clone().ok_or(RepoError::ProfileMissing)
    }

    fn save_profile(&mut self, profile: &UserProfile) -> RepoResult<()> {
        profile.validate()?;
        if let Some(existing) = self.profile.as_ref() {
            ensure_same_owner(existing, profile)?;
        }
        self.profile = Some(profile.clone());
        Ok(())
    }

    fn insert_item(&mut self, item: &LedgerItem) -> RepoResult<()> {
        item.validate()?;
        if self.get_item(item.kind, &item.id)?.is_some() {
            return Err(RepoError::Duplicate {
                kind: item.kind,
                id: item.id.clone(),
            });
        }
        self.items.push(item.clone());
        Ok(())
    }

    fn get_item(&self, kind: LedgerItemKind, id: &str) -> RepoResult<Option<LedgerItem>> {
        Ok(self
            .items
            .iter()
            .find(|item| item.kind == kind && item.id == id)
            .cloned())
    }

    fn list_items(&self, kind: LedgerItemKind) -> RepoResult<Vec<LedgerItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.kind == kind)
            .cloned()
            .collect())
    }

    fn complete_item(&mut self, kind: LedgerItemKind, id: &str) -> RepoResult<Completion> {
        let index = self
            .items
            .iter()
            .position(|item| item.kind == kind && item.id == id)
            .ok_or_else(|| RepoError::NotFound {
                kind,
                id: id.to_string(),
            })?;
        let profile = self.profile.as_mut().ok_or(RepoError::ProfileMissing)?;
        let item = &mut self.items[index];

        item.complete_for(profile)?;

        Ok(Completion {
            item: item.clone(),
            profile: profile.clone(),
        })
    }

    fn grant_reward(&mut self, xp: u64, coins: u64) -> RepoResult<UserProfile> {
        let profile = self.profile.as_mut().ok_or(RepoError::ProfileMissing)?;
        profile.grant(xp, coins);
        Ok(profile.clone())
    }
}

/// SQLite-backed store for on-device persistence.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - Returns `RepoError::InvalidData` when the connection has not been
    ///   migrated to the latest schema.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn seed(&mut self, seed: &LedgerSeed) -> RepoResult<bool> {
        seed.profile.validate()?;
        for item in &seed.items {
            item.validate()?;
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if query_profile(&tx)?.is_some() {
            return Ok(false);
        }

        write_profile(&tx, &seed.profile)?;
        for item in &seed.items {
            write_new_item(&tx, item)?;
        }
        tx.commit()?;
        Ok(true)
    }

    fn load_profile(&self) -> RepoResult<UserProfile> {
        query_profile(self.conn)?.ok_or(RepoError::ProfileMissing)
    }

    fn save_profile(&mut self, profile: &UserProfile) -> RepoResult<()> {
        profile.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if let Some(existing) = query_profile(&tx)? {
            ensure_same_owner(&existing, profile)?;
        }
        write_profile(&tx, profile)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_item(&mut self, item: &LedgerItem) -> RepoResult<()> {
        item.validate()?;
        write_new_item(self.conn, item)
    }

    fn get_item(&self, kind: LedgerItemKind, id: &str) -> RepoResult<Option<LedgerItem>> {
        query_item(self.conn, kind, id)
    }

    fn list_items(&self, kind: LedgerItemKind) -> RepoResult<Vec<LedgerItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE kind = ?1
             ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([kind.as_str()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn complete_item(&mut self, kind: LedgerItemKind, id: &str) -> RepoResult<Completion> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut item = query_item(&tx, kind, id)?.ok_or_else(|| RepoError::NotFound {
            kind,
            id: id.to_string(),
        })?;
        let mut profile = query_profile(&tx)?.ok_or(RepoError::ProfileMissing)?;

        item.complete_for(&mut profile)?;

        let changed = tx.execute(
            "UPDATE ledger_items
             SET
                completed = 1,
                completed_at = (strftime('%s', 'now') * 1000)
             WHERE kind = ?1
               AND id = ?2
               AND completed = 0;",
            params![kind.as_str(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::AlreadyCompleted {
                kind,
                id: id.to_string(),
            });
        }
        write_profile(&tx, &profile)?;
        tx.commit()?;

        Ok(Completion { item, profile })
    }

    fn grant_reward(&mut self, xp: u64, coins: u64) -> RepoResult<UserProfile> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut profile = query_profile(&tx)?.ok_or(RepoError::ProfileMissing)?;
        profile.grant(xp, coins);
        write_profile(&tx, &profile)?;
        tx.commit()?;
        Ok(profile)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if version != latest_version() {
        return Err(RepoError::InvalidData(format!(
            "connection schema version {version} does not match expected {}",
            latest_version()
        )));
    }
    Ok(())
}

fn ensure_same_owner(existing: &UserProfile, incoming: &UserProfile) -> RepoResult<()> {
    if existing.id != incoming.id {
        return Err(RepoError::InvalidData(format!(
            "store belongs to profile `{}`; refusing to write profile `{}`",
            existing.id, incoming.id
        )));
    }
    Ok(())
}

fn query_profile(conn: &Connection) -> RepoResult<Option<UserProfile>> {
    let row = conn
        .query_row(PROFILE_SELECT_SQL, [], |row| {
            Ok((
                row.get::<_, String>("id")?,
                row.get::<_, String>("display_name")?,
                row.get::<_, Option<String>>("business_name")?,
                row.get::<_, i64>("xp")?,
                row.get::<_, i64>("level")?,
                row.get::<_, i64>("coins")?,
            ))
        })
        .optional()?;

    let Some((id, display_name, business_name, xp, level, coins)) = row else {
        return Ok(None);
    };

    let profile = UserProfile {
        id,
        display_name,
        business_name,
        xp: from_db_int(xp, "user_profile.xp")?,
        level: from_db_int(level, "user_profile.level")?,
        coins: from_db_int(coins, "user_profile.coins")?,
    };
    profile.validate()?;
    Ok(Some(profile))
}

fn write_profile(conn: &Connection, profile: &UserProfile) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO user_profile (id, display_name, business_name, xp, level, coins)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            display_name = excluded.display_name,
            business_name = excluded.business_name,
            xp = excluded.xp,
            level = excluded.level,
            coins = excluded.coins,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![
            profile.id.as_str(),
            profile.display_name.as_str(),
            profile.business_name.as_deref(),
            to_db_int(profile.xp, "xp")?,
            to_db_int(profile.level, "level")?,
            to_db_int(profile.coins, "coins")?,
        ],
    )?;
    Ok(())
}

fn query_item(conn: &Connection, kind: LedgerItemKind, id: &str) -> RepoResult<Option<LedgerItem>> {
    let mut stmt = conn.prepare(&format!(
        "{ITEM_SELECT_SQL}
         WHERE kind = ?1
           AND id = ?2;"
    ))?;
    let mut rows = stmt.query(params![kind.as_str(), id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_item_row(row)?));
    }
    Ok(None)
}

fn write_new_item(conn: &Connection, item: &LedgerItem) -> RepoResult<()> {
    if query_item(conn, item.kind, &item.id)?.is_some() {
        return Err(RepoError::Duplicate {
            kind: item.kind,
            id: item.id.clone(),
        });
    }

    conn.execute(
        "INSERT INTO ledger_items (
            kind,
            id,
            title,
            description,
            completed,
            xp_reward,
            coin_reward,
            due_date,
            icon
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            item.kind.as_str(),
            item.id.as_str(),
            item.title.as_str(),
            item.description.as_str(),
            bool_to_int(item.completed),
            to_db_int(item.xp_reward, "xp_reward")?,
            to_db_int(item.coin_reward, "coin_reward")?,
            item.due_date.as_deref(),
            item.icon.as_deref(),
        ],
    )?;
    Ok(())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<LedgerItem> {
    let kind_text: String = row.get("kind")?;
    let kind = LedgerItemKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in ledger_items.kind"))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in ledger_items.completed"
            )));
        }
    };

    let item = LedgerItem {
        id: row.get("id")?,
        kind,
        title: row.get("title")?,
        description: row.get("description")?,
        completed,
        xp_reward: from_db_int(row.get("xp_reward")?, "ledger_items.xp_reward")?,
        coin_reward: from_db_int(row.get("coin_reward")?, "ledger_items.coin_reward")?,
        due_date: row.get("due_date")?,
        icon: row.get("icon")?,
    };
    item.validate()?;
    Ok(item)
}

fn to_db_int(value: u64, column: &'static str) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("{column} value {value} exceeds storage range")))
}

fn from_db_int(value: i64, column: &'static str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative value `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
