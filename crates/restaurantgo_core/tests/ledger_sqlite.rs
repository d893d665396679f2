use restaurantgo_core::db::{open_db, open_db_in_memory};
use restaurantgo_core::fixtures::{demo_seed, DEMO_USER_ID};
use restaurantgo_core::model::profile::MAX_COUNTER;
use restaurantgo_core::{
    InMemoryLedgerRepository, LedgerError, LedgerItem, LedgerItemKind, LedgerRepository,
    LedgerSeed, LedgerService, RepoError, SqliteLedgerRepository, UserProfile,
};
use rusqlite::Connection;

fn seeded(conn: &mut Connection) -> LedgerService<SqliteLedgerRepository<'_>> {
    let repo = SqliteLedgerRepository::try_new(conn).unwrap();
    LedgerService::with_seed(repo, &demo_seed()).unwrap()
}

#[test]
fn completing_task_credits_reward_and_levels_up() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded(&mut conn);

    let before = service.get_user().unwrap();
    assert_eq!((before.xp, before.level, before.coins), (1200, 2, 450));

    let completion = service.complete_task("task-1").unwrap();
    assert!(completion.item.completed);
    assert_eq!(completion.profile.xp, 1250);
    assert_eq!(completion.profile.coins, 475);
    assert_eq!(completion.profile.level, 2);

    let stored = service.get_user().unwrap();
    assert_eq!(stored, completion.profile);
    let task = service
        .get_item(LedgerItemKind::Task, "task-1")
        .unwrap()
        .unwrap();
    assert!(task.completed);
}

#[test]
fn second_completion_is_rejected_without_reward() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded(&mut conn);

    service.complete_task("task-2").unwrap();
    let after_first = service.get_user().unwrap();

    let err = service.complete_task("task-2").unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyCompleted { .. }));
    assert_eq!(service.get_user().unwrap(), after_first);
}

#[test]
fn seeded_completed_achievement_cannot_be_reclaimed() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded(&mut conn);
    let before = service.get_user().unwrap();

    let err = service.complete_achievement("ach-1").unwrap_err();
    assert_eq!(err.code(), "already_completed");
    assert_eq!(service.get_user().unwrap(), before);
}

#[test]
fn unknown_ids_are_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded(&mut conn);

    assert!(matches!(
        service.complete_task("task-404"),
        Err(LedgerError::NotFound { .. })
    ));
    // Ids are scoped by kind.
    assert!(matches!(
        service.complete_achievement("task-1"),
        Err(LedgerError::NotFound { .. })
    ));
}

#[test]
fn achievement_crossing_threshold_raises_level() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded(&mut conn);

    service.complete_achievement("ach-2").unwrap();
    let completion = service.complete_achievement("ach-3").unwrap();
    assert_eq!(completion.profile.xp, 1700);
    assert_eq!(completion.profile.level, 2);

    for task_id in ["task-1", "task-2", "task-3"] {
        service.complete_task(task_id).unwrap();
    }
    let profile = service.get_user().unwrap();
    assert_eq!(profile.xp, 1860);
    assert_eq!(profile.level, 2);

    let (_, profile) = service.claim_daily_bonus().unwrap();
    assert_eq!(profile.xp, 1910);
    assert_eq!(profile.coins, 450 + 150 + 100 + 25 + 15 + 40 + 25);
}

#[test]
fn lists_keep_insertion_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = seeded(&mut conn);
    service
        .add_item(&LedgerItem::task("task-4", "Post a menu photo", "", 20, 10))
        .unwrap();

    let ids: Vec<_> = service
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec!["task-1", "task-2", "task-3", "task-4"]);

    let achievement_ids: Vec<_> = service
        .list_achievements()
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(achievement_ids, vec!["ach-1", "ach-2", "ach-3"]);
}

#[test]
fn duplicate_item_insert_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteLedgerRepository::try_new(&mut conn).unwrap();
    repo.seed(&demo_seed()).unwrap();

    let err = repo
        .insert_item(&LedgerItem::task("task-1", "Again", "", 1, 1))
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate { .. }));
}

#[test]
fn progress_survives_reopen_and_seed_runs_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let mut conn = open_db(&path).unwrap();
        let mut service = seeded(&mut conn);
        service.complete_task("task-3").unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    let service = seeded(&mut conn);
    let profile = service.get_user().unwrap();
    assert_eq!(profile.id, DEMO_USER_ID);
    assert_eq!(profile.xp, 1280);
    assert_eq!(profile.coins, 490);
    let task = service
        .get_item(LedgerItemKind::Task, "task-3")
        .unwrap()
        .unwrap();
    assert!(task.completed);
}

#[test]
fn foreign_profile_write_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteLedgerRepository::try_new(&mut conn).unwrap();
    repo.seed(&demo_seed()).unwrap();

    let stranger = UserProfile::new("user-2", "Mehmet");
    assert!(matches!(
        repo.save_profile(&stranger),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteLedgerRepository::try_new(&mut conn),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn backends_agree_at_counter_limit() {
    let seed = LedgerSeed {
        profile: UserProfile::new("user-max", "Max").with_totals(MAX_COUNTER - 10, MAX_COUNTER),
        items: vec![LedgerItem::task("task-big", "Big reward", "", 50, 50)],
    };

    let mut memory = InMemoryLedgerRepository::from_seed(&seed).unwrap();
    let from_memory = memory
        .complete_item(LedgerItemKind::Task, "task-big")
        .unwrap();

    let mut conn = open_db_in_memory().unwrap();
    let mut sqlite = SqliteLedgerRepository::try_new(&mut conn).unwrap();
    sqlite.seed(&seed).unwrap();
    let from_sqlite = sqlite
        .complete_item(LedgerItemKind::Task, "task-big")
        .unwrap();

    assert_eq!(from_memory.profile.xp, MAX_COUNTER);
    assert_eq!(from_memory.profile.coins, MAX_COUNTER);
    assert_eq!(from_memory, from_sqlite);
    assert_eq!(sqlite.load_profile().unwrap(), from_memory.profile);
}
