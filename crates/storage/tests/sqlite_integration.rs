use storage::repository::{LocalStore, Storage, StoreScope};
use storage::sqlite::SqliteRepository;
use survey_core::model::{AnswerSet, PersistedSessionRecord, RECORD_KEY, SessionTiming};
use survey_core::time::fixed_now;

#[tokio::test]
async fn sqlite_scopes_are_isolated() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_scopes?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // migrations are idempotent
    repo.migrate().await.expect("migrate twice");

    let local = repo.store(StoreScope::Local);
    let session = repo.store(StoreScope::Session);

    local.set_item("k", "local value").await.unwrap();
    session.set_item("k", "session value").await.unwrap();

    assert_eq!(local.get_item("k").await.unwrap().as_deref(), Some("local value"));
    assert_eq!(
        session.get_item("k").await.unwrap().as_deref(),
        Some("session value")
    );

    local.set_item("k", "replaced").await.unwrap();
    assert_eq!(local.get_item("k").await.unwrap().as_deref(), Some("replaced"));

    session.clear().await.unwrap();
    assert!(session.get_item("k").await.unwrap().is_none());
    assert!(local.get_item("k").await.unwrap().is_some());

    local.remove_item("k").await.unwrap();
    local.remove_item("missing").await.unwrap();
    assert!(local.get_item("k").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_storage_keeps_record_but_resets_session_on_reopen() {
    let url = "sqlite:file:memdb_reopen?mode=memory&cache=shared";
    // Hold one connection open so the shared in-memory database survives.
    let keeper = SqliteRepository::connect(url).await.expect("connect");
    keeper.migrate().await.expect("migrate");

    let storage = Storage::sqlite(url).await.expect("storage");
    let answers: AnswerSet = [("department", "人事部"), ("position", "シニア")]
        .into_iter()
        .collect();
    let record = PersistedSessionRecord::new(answers, Some(fixed_now()));
    storage.save_record(&record).await.unwrap();
    storage
        .save_timing(&SessionTiming::starting_at(fixed_now()))
        .await
        .unwrap();

    let reopened = Storage::sqlite(url).await.expect("reopen");
    assert_eq!(reopened.load_record().await.unwrap(), Some(record));
    assert!(reopened.load_timing().await.unwrap().is_none());

    let raw = keeper
        .store(StoreScope::Local)
        .get_item(RECORD_KEY)
        .await
        .unwrap()
        .expect("raw record");
    assert!(raw.contains("\"last_updated\""));
}
