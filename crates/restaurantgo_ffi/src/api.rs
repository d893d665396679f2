//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Flatten core results into envelopes the UI can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every envelope carries `ok` and a human-readable `message`.
//! - Numeric totals cross the boundary as `i64`.

use log::warn;
use restaurantgo_core::db::open_db;
use restaurantgo_core::fixtures::demo_seed;
use restaurantgo_core::{
    core_version as core_version_inner, distance_km, init_logging as init_logging_inner,
    ping as ping_inner, progression_for_xp as progression_for_xp_inner, GeoCoordinate,
    KeyValueStore, KvError, LedgerError, LedgerItem, LedgerService, SqliteKvStore,
    SqliteLedgerRepository, UserProfile,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const STORE_DB_FILE_NAME: &str = "restaurantgo.sqlite3";
const STORE_DB_PATH_ENV: &str = "RESTAURANTGO_DB_PATH";
const STORAGE_ERROR_CODE: &str = "storage_error";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the on-device database file used by ledger and key-value calls.
///
/// Must run before the first storage call; afterwards only the same path is
/// accepted. Without it the path comes from `RESTAURANTGO_DB_PATH` or the
/// system temp directory.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "store already bound to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Distance response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceResponse {
    pub ok: bool,
    /// Great-circle distance; `0.0` when `ok` is false.
    pub distance_km: f64,
    pub message: String,
}

/// Great-circle distance between two points in kilometers.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Invalid coordinates produce `ok=false`, never a panic.
#[flutter_rust_bridge::frb(sync)]
pub fn geo_distance_km(
    from_latitude: f64,
    from_longitude: f64,
    to_latitude: f64,
    to_longitude: f64,
) -> DistanceResponse {
    let from = GeoCoordinate::new(from_latitude, from_longitude);
    let to = GeoCoordinate::new(to_latitude, to_longitude);
    match distance_km(&from, &to) {
        Ok(distance_km) => DistanceResponse {
            ok: true,
            distance_km,
            message: String::new(),
        },
        Err(err) => DistanceResponse {
            ok: false,
            distance_km: 0.0,
            message: format!("geo_distance_km failed: {err}"),
        },
    }
}

/// Level breakdown for one XP total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionResponse {
    pub ok: bool,
    pub level: i64,
    pub xp_into_level: i64,
    pub xp_needed_for_next_level: i64,
    pub message: String,
}

/// Computes level progress for `xp`.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Negative XP produces `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn progression_for_xp(xp: i64) -> ProgressionResponse {
    match progression_for_xp_inner(xp) {
        Ok(progress) => ProgressionResponse {
            ok: true,
            level: to_ffi_int(progress.level),
            xp_into_level: to_ffi_int(progress.xp_into_level),
            xp_needed_for_next_level: to_ffi_int(progress.xp_needed_for_next_level),
            message: String::new(),
        },
        Err(err) => ProgressionResponse {
            ok: false,
            level: 0,
            xp_into_level: 0,
            xp_needed_for_next_level: 0,
            message: format!("progression_for_xp failed: {err}"),
        },
    }
}

/// Task or achievement as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerItemView {
    pub id: String,
    /// `task|achievement`.
    pub kind: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub xp_reward: i64,
    pub coin_reward: i64,
    /// `YYYY-MM-DD` when the item has a deadline.
    pub due_date: Option<String>,
    pub icon: Option<String>,
}

/// Player profile as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: String,
    pub display_name: String,
    pub business_name: Option<String>,
    pub xp: i64,
    pub level: i64,
    pub coins: i64,
}

/// List response envelope for task and achievement screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerListResponse {
    pub ok: bool,
    pub items: Vec<LedgerItemView>,
    pub message: String,
}

/// Action response envelope for completion and bonus flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerActionResponse {
    pub ok: bool,
    /// `not_found|already_completed|invalid_input|storage_error` on failure.
    pub error_code: Option<String>,
    /// Completed item; absent for the daily bonus.
    pub item: Option<LedgerItemView>,
    /// Profile after the reward was credited.
    pub user: Option<UserView>,
    pub message: String,
}

impl LedgerActionResponse {
    fn success(message: impl Into<String>, item: Option<&LedgerItem>, user: &UserProfile) -> Self {
        Self {
            ok: true,
            error_code: None,
            item: item.map(to_item_view),
            user: Some(to_user_view(user)),
            message: message.into(),
        }
    }

    fn failure(failure: FfiFailure) -> Self {
        Self {
            ok: false,
            error_code: Some(failure.code.to_string()),
            item: None,
            user: None,
            message: failure.message,
        }
    }
}

/// Profile response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub ok: bool,
    pub user: Option<UserView>,
    pub message: String,
}

/// Lists daily tasks in display order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Seeds the store on first use.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_list_tasks() -> LedgerListResponse {
    to_list_response(
        "ledger_list_tasks",
        with_ledger_service(|service| service.list_tasks()),
    )
}

/// Lists achievements in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_list_achievements() -> LedgerListResponse {
    to_list_response(
        "ledger_list_achievements",
        with_ledger_service(|service| service.list_achievements()),
    )
}

/// Completes one daily task and credits its reward.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Completing twice returns `ok=false` with `error_code=already_completed`
///   and credits nothing.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_complete_task(task_id: String) -> LedgerActionResponse {
    match with_ledger_service(|service| service.complete_task(&task_id)) {
        Ok(completion) => LedgerActionResponse::success(
            "Task completed.",
            Some(&completion.item),
            &completion.profile,
        ),
        Err(failure) => LedgerActionResponse::failure(failure.log("ledger_complete_task")),
    }
}

/// Unlocks one achievement and credits its reward.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_complete_achievement(achievement_id: String) -> LedgerActionResponse {
    match with_ledger_service(|service| service.complete_achievement(&achievement_id)) {
        Ok(completion) => LedgerActionResponse::success(
            "Achievement unlocked.",
            Some(&completion.item),
            &completion.profile,
        ),
        Err(failure) => LedgerActionResponse::failure(failure.log("ledger_complete_achievement")),
    }
}

/// Credits the fixed daily bonus.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_claim_daily_bonus() -> LedgerActionResponse {
    match with_ledger_service(|service| service.claim_daily_bonus()) {
        Ok((bonus, profile)) => LedgerActionResponse::success(
            format!("Daily bonus: +{} XP, +{} coins.", bonus.xp, bonus.coins),
            None,
            &profile,
        ),
        Err(failure) => LedgerActionResponse::failure(failure.log("ledger_claim_daily_bonus")),
    }
}

/// Reads the current player profile.
#[flutter_rust_bridge::frb(sync)]
pub fn user_get() -> UserResponse {
    match with_ledger_service(|service| service.get_user()) {
        Ok(profile) => UserResponse {
            ok: true,
            user: Some(to_user_view(&profile)),
            message: String::new(),
        },
        Err(failure) => UserResponse {
            ok: false,
            user: None,
            message: failure.log("user_get").message,
        },
    }
}

/// Key-value response envelope. Values cross the boundary as JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvResponse {
    pub ok: bool,
    /// Stored JSON for `kv_get`; `None` when missing or on failure.
    pub value_json: Option<String>,
    /// `kv_remove` only: whether the key existed.
    pub existed: bool,
    pub message: String,
}

impl KvResponse {
    fn success(value_json: Option<String>, existed: bool) -> Self {
        Self {
            ok: true,
            value_json,
            existed,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value_json: None,
            existed: false,
            message: message.into(),
        }
    }
}

/// Reads one preference value.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Missing key is `ok=true` with `value_json=None`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn kv_get(key: String) -> KvResponse {
    match with_kv_store(|store| store.get(&key)) {
        Ok(value) => KvResponse::success(value.map(|value| value.to_string()), false),
        Err(err) => KvResponse::failure(format!("kv_get failed: {err}")),
    }
}

/// Stores one preference value given as JSON text.
#[flutter_rust_bridge::frb(sync)]
pub fn kv_set(key: String, value_json: String) -> KvResponse {
    let value: serde_json::Value = match serde_json::from_str(&value_json) {
        Ok(value) => value,
        Err(err) => return KvResponse::failure(format!("kv_set failed: invalid JSON: {err}")),
    };
    match with_kv_store(|store| store.set(&key, &value)) {
        Ok(()) => KvResponse::success(None, false),
        Err(err) => KvResponse::failure(format!("kv_set failed: {err}")),
    }
}

/// Removes one preference value.
#[flutter_rust_bridge::frb(sync)]
pub fn kv_remove(key: String) -> KvResponse {
    match with_kv_store(|store| store.remove(&key)) {
        Ok(existed) => KvResponse::success(None, existed),
        Err(err) => KvResponse::failure(format!("kv_remove failed: {err}")),
    }
}

/// Removes every preference value.
#[flutter_rust_bridge::frb(sync)]
pub fn kv_clear() -> KvResponse {
    match with_kv_store(|store| store.clear()) {
        Ok(()) => KvResponse::success(None, false),
        Err(err) => KvResponse::failure(format!("kv_clear failed: {err}")),
    }
}

struct FfiFailure {
    code: &'static str,
    message: String,
}

impl FfiFailure {
    fn storage(message: String) -> Self {
        Self {
            code: STORAGE_ERROR_CODE,
            message,
        }
    }

    fn log(self, call: &str) -> Self {
        warn!("event=ffi_call module=ffi status=error call={call} error_code={}", self.code);
        Self {
            code: self.code,
            message: format!("{call} failed: {}", self.message),
        }
    }
}

impl From<LedgerError> for FfiFailure {
    fn from(value: LedgerError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DB_FILE_NAME)
        })
        .clone()
}

fn with_ledger_service<T>(
    f: impl FnOnce(&mut LedgerService<SqliteLedgerRepository<'_>>) -> Result<T, LedgerError>,
) -> Result<T, FfiFailure> {
    let db_path = resolve_store_db_path();
    let mut conn = open_db(&db_path)
        .map_err(|err| FfiFailure::storage(format!("store DB open failed: {err}")))?;
    let repo = SqliteLedgerRepository::try_new(&mut conn)
        .map_err(|err| FfiFailure::storage(format!("ledger repo init failed: {err}")))?;
    let mut service = LedgerService::with_seed(repo, &demo_seed())?;
    Ok(f(&mut service)?)
}

fn with_kv_store<T>(
    f: impl FnOnce(&mut SqliteKvStore<'_>) -> Result<T, KvError>,
) -> Result<T, String> {
    let db_path = resolve_store_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("store DB open failed: {err}"))?;
    let mut store = SqliteKvStore::new(&conn);
    f(&mut store).map_err(|err| err.to_string())
}

fn to_list_response(
    call: &str,
    result: Result<Vec<LedgerItem>, FfiFailure>,
) -> LedgerListResponse {
    match result {
        Ok(items) => {
            let items = items.iter().map(to_item_view).collect::<Vec<_>>();
            let message = format!("Found {} item(s).", items.len());
            LedgerListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(failure) => LedgerListResponse {
            ok: false,
            items: Vec::new(),
            message: failure.log(call).message,
        },
    }
}

fn to_item_view(item: &LedgerItem) -> LedgerItemView {
    LedgerItemView {
        id: item.id.clone(),
        kind: item.kind.as_str().to_string(),
        title: item.title.clone(),
        description: item.description.clone(),
        completed: item.completed,
        xp_reward: to_ffi_int(item.xp_reward),
        coin_reward: to_ffi_int(item.coin_reward),
        due_date: item.due_date.clone(),
        icon: item.icon.clone(),
    }
}

fn to_user_view(profile: &UserProfile) -> UserView {
    UserView {
        id: profile.id.clone(),
        display_name: profile.display_name.clone(),
        business_name: profile.business_name.clone(),
        xp: to_ffi_int(profile.xp),
        level: to_ffi_int(profile.level),
        coins: to_ffi_int(profile.coins),
    }
}

/// Saturates at `i64::MAX`; Dart ints are signed 64-bit.
fn to_ffi_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        configure_store, core_version, geo_distance_km, init_logging, kv_clear, kv_get,
        kv_remove, kv_set, ledger_claim_daily_bonus, ledger_complete_achievement,
        ledger_complete_task, ledger_list_achievements, ledger_list_tasks, ping,
        progression_for_xp, to_ffi_int, user_get,
    };
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    static TEST_STORE_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
    static STORE_LOCK: Mutex<()> = Mutex::new(());

    fn test_store_path() -> PathBuf {
        let dir = TEST_STORE_DIR.get_or_init(|| tempfile::tempdir().expect("create temp dir"));
        dir.path().join("ffi_test.sqlite3")
    }

    /// Binds every storage test in this process to one fresh database file.
    /// Hold the guard for the whole test; the store is shared.
    fn use_test_store() -> MutexGuard<'static, ()> {
        let guard = STORE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let error = configure_store(test_store_path().to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
        guard
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_store_is_idempotent_and_rejects_switch() {
        let _store = use_test_store();
        let path = test_store_path();
        assert!(configure_store(path.to_string_lossy().into_owned()).is_empty());
        assert!(configure_store("   ".to_string()).contains("empty"));
        assert!(configure_store("/elsewhere/other.sqlite3".to_string()).contains("refusing"));
    }

    #[test]
    fn geo_distance_reports_invalid_input() {
        let same = geo_distance_km(41.0082, 28.9784, 41.0082, 28.9784);
        assert!(same.ok);
        assert_eq!(same.distance_km, 0.0);

        let invalid = geo_distance_km(91.0, 0.0, 0.0, 0.0);
        assert!(!invalid.ok);
        assert!(invalid.message.contains("latitude"));
    }

    #[test]
    fn progression_maps_levels_and_rejects_negative_xp() {
        let progress = progression_for_xp(2750);
        assert!(progress.ok);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.xp_into_level, 750);
        assert_eq!(progress.xp_needed_for_next_level, 1000);

        assert!(!progression_for_xp(-1).ok);
    }

    #[test]
    fn ledger_lists_seeded_items() {
        let _store = use_test_store();
        let tasks = ledger_list_tasks();
        assert!(tasks.ok, "{}", tasks.message);
        assert_eq!(tasks.items.len(), 3);
        assert!(tasks.items.iter().all(|item| item.kind == "task"));

        let achievements = ledger_list_achievements();
        assert!(achievements.ok, "{}", achievements.message);
        assert_eq!(achievements.items[0].id, "ach-1");
        assert!(achievements.items[0].completed);
    }

    #[test]
    fn completing_task_twice_reports_already_completed() {
        let _store = use_test_store();
        let first = ledger_complete_task("task-2".to_string());
        assert!(first.ok, "{}", first.message);
        assert!(first.item.as_ref().is_some_and(|item| item.completed));

        let before = user_get().user.expect("user");
        let second = ledger_complete_task("task-2".to_string());
        assert!(!second.ok);
        assert_eq!(second.error_code.as_deref(), Some("already_completed"));
        assert!(second.user.is_none());
        let after = user_get().user.expect("user");
        assert_eq!(after.xp, before.xp);
        assert_eq!(after.coins, before.coins);
        assert_eq!(after.level, before.level);
    }

    #[test]
    fn unknown_achievement_is_not_found() {
        let _store = use_test_store();
        let response = ledger_complete_achievement("ach-404".to_string());
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("not_found"));
        assert!(response.user.is_none());
    }

    #[test]
    fn daily_bonus_credits_fixed_reward() {
        let _store = use_test_store();
        let before = user_get().user.expect("user");
        let response = ledger_claim_daily_bonus();
        assert!(response.ok, "{}", response.message);
        assert!(response.item.is_none());
        let after = response.user.expect("user");
        assert_eq!(after.xp, before.xp + 50);
        assert_eq!(after.coins, before.coins + 25);
    }

    #[test]
    fn kv_round_trip_invalid_json_and_clear() {
        let _store = use_test_store();
        let set = kv_set("ffi_theme".to_string(), r#"{"mode":"dark"}"#.to_string());
        assert!(set.ok, "{}", set.message);

        let got = kv_get("ffi_theme".to_string());
        assert!(got.ok);
        assert_eq!(got.value_json.as_deref(), Some(r#"{"mode":"dark"}"#));

        assert!(!kv_set("ffi_theme".to_string(), "{oops".to_string()).ok);
        assert!(!kv_get("   ".to_string()).ok);

        assert!(kv_remove("ffi_theme".to_string()).existed);
        assert!(!kv_remove("ffi_theme".to_string()).existed);
        assert_eq!(kv_get("ffi_theme".to_string()).value_json, None);

        assert!(kv_set("ffi_onboarded".to_string(), "true".to_string()).ok);
        assert!(kv_clear().ok);
        assert_eq!(kv_get("ffi_onboarded".to_string()).value_json, None);
    }

    #[test]
    fn ffi_ints_saturate() {
        assert_eq!(to_ffi_int(7), 7);
        assert_eq!(to_ffi_int(u64::MAX), i64::MAX);
    }
}
