use phonebook_database::{Database, Migration};
use phonebook_persons::gate::{Mode, admit};
use phonebook_persons::{
    Field, MIGRATION, PersonPayload, PersonService, PersonStore, RejectionKind, StoreError,
    SurrealPersonStore,
};

/// A later schema revision that only admits capitalised names.
const CAPITALISED_NAMES: Migration = Migration::new(
    "persons",
    "0002",
    "DEFINE FIELD OVERWRITE name ON person TYPE string ASSERT $value = /^[A-Z]/;",
);

async fn store(name: &str) -> SurrealPersonStore {
    store_with(name, &[MIGRATION]).await
}

async fn store_with(name: &str, migrations: &[Migration]) -> SurrealPersonStore {
    let db = migrations
        .iter()
        .fold(Database::builder().url("mem://").session("test_ns", name), |builder, m| {
            builder.migration(*m)
        })
        .init()
        .await
        .expect("in-memory database");
    SurrealPersonStore::new(db)
}

#[tokio::test]
async fn crud_round_trip() {
    let store = store("crud").await;

    let ada = admit(&store, &PersonPayload::new("Ada Lovelace", "3944532352"), Mode::Create)
        .await
        .expect("admitted");
    let ada = store.insert(&ada).await.expect("insert");
    assert_eq!(ada.id.get(), 1);
    assert_eq!(ada.name, "Ada Lovelace");

    let dan = admit(&store, &PersonPayload::new("Dan Abramov", "1243234345"), Mode::Create)
        .await
        .expect("admitted");
    let dan = store.insert(&dan).await.expect("insert");
    assert_eq!(dan.id.get(), 2);

    let ids: Vec<u64> = store.list().await.expect("list").iter().map(|p| p.id.get()).collect();
    assert_eq!(ids, [1, 2]);
    assert_eq!(store.count().await.expect("count"), 2);

    let found = store.find_by_name("Ada Lovelace", None).await.expect("find");
    assert_eq!(found.as_ref().map(|p| p.id), Some(ada.id));
    let excluded = store.find_by_name("Ada Lovelace", Some(ada.id)).await.expect("find");
    assert!(excluded.is_none());

    let removed = store.delete(ada.id).await.expect("delete");
    assert_eq!(removed, Some(ada.clone()));
    assert!(store.get(ada.id).await.expect("get").is_none());
    assert!(store.delete(ada.id).await.expect("delete").is_none());
}

#[tokio::test]
async fn unique_index_closes_the_race() {
    let store = store("race").await;

    let first = admit(&store, &PersonPayload::new("Ada", "0123456789"), Mode::Create)
        .await
        .expect("admitted");
    let racing = admit(&store, &PersonPayload::new("Bob", "0123456789"), Mode::Create)
        .await
        .expect("admitted before the first write");

    store.insert(&first).await.expect("insert");
    let err = store.insert(&racing).await.expect_err("index violation");
    assert!(matches!(err, StoreError::Conflict { field: Field::Number, .. }), "{err}");
}

#[tokio::test]
async fn service_reports_taxonomy_over_surreal() {
    let service = PersonService::new(store("service").await);
    service.create(&PersonPayload::new("Ada", "0123456789")).await.expect("create");

    let err = service.create(&PersonPayload::new("Ada", "1111111111")).await.expect_err("dup");
    assert_eq!(err.kind(), RejectionKind::DuplicateName);

    let updated =
        service.update("1", &PersonPayload::new("Ada King", "0123456789")).await.expect("update");
    assert_eq!(updated.name, "Ada King");

    assert_eq!(service.get("7").await.expect_err("absent").kind(), RejectionKind::NotFound);
    service.delete("1").await.expect("delete");
    assert_eq!(service.delete("1").await.expect_err("gone").kind(), RejectionKind::AlreadyDeleted);
}

#[tokio::test]
async fn letter_numbers_pass_gate_and_schema() {
    let store = store("letter_numbers").await;

    let approved = admit(&store, &PersonPayload::new("Louis Ⅻ", "0123456789"), Mode::Create)
        .await
        .expect("admitted");
    let stored = store.insert(&approved).await.expect("schema agrees with the gate");
    assert_eq!(stored.name, "Louis Ⅻ");
}

#[tokio::test]
async fn schema_assertion_reports_format_error() {
    let service = PersonService::new(store_with("assertion", &[MIGRATION, CAPITALISED_NAMES]).await);

    let err = service
        .create(&PersonPayload::new("ada lovelace", "3944532352"))
        .await
        .expect_err("field assertion");
    assert_eq!(err.kind(), RejectionKind::FormatValidationFailed, "{}", err.chain());
    assert_eq!(err.invalid_fields(), Some([Field::Name].as_slice()));
    assert_eq!(service.count().await.expect("count"), 0);
}
