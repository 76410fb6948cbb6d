use phonebook_database::*;
use phonebook_domain::config::DatabaseConfig;
use serde::Deserialize;

const NOTES_V1: Migration = Migration::new(
    "notes",
    "0001",
    "DEFINE TABLE IF NOT EXISTS note SCHEMAFULL;
     DEFINE FIELD IF NOT EXISTS body ON note TYPE string;",
);

#[derive(Debug, Deserialize)]
struct Note {
    body: String,
}

#[tokio::test]
async fn connect_from_config_section() {
    let cfg = DatabaseConfig {
        namespace: "test_ns".to_owned(),
        database: "test_db".to_owned(),
        ..DatabaseConfig::default()
    };
    let db = Database::builder().config(&cfg).init().await.expect("connect to mem://");

    assert!(db.is_healthy().await);
    assert_eq!(db.engine(), Engine::Memory);
    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "test_db");
}

#[tokio::test]
async fn missing_settings_are_named() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::MissingSetting { setting: "url" }));

    let err = Database::builder().url("mem://").init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::MissingSetting { setting: "namespace" }));
}

#[tokio::test]
async fn unknown_scheme_is_unreachable() {
    let err = Database::builder().url("memory").session("ns", "db").init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Unreachable { .. }));
}

#[tokio::test]
async fn migrations_define_schema() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "migrations")
        .migration(NOTES_V1)
        .init()
        .await
        .expect("connect with migrations");

    let mut response = db
        .query("CREATE note CONTENT { body: $body } RETURN NONE; SELECT body FROM note;")
        .bind(("body", "hello"))
        .await
        .expect("query");
    let notes: Vec<Note> = response.take(1).expect("take notes");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "hello");

    let applied: Vec<String> = db
        .query("SELECT VALUE version FROM migration WHERE slice = 'notes'")
        .await
        .expect("query migrations")
        .take(0)
        .expect("take versions");
    assert_eq!(applied, vec!["0001".to_owned()]);
}

#[tokio::test]
async fn empty_migration_is_rejected() {
    let err = Database::builder()
        .url("mem://")
        .session("test_ns", "empty")
        .migration(Migration::new("broken", "0001", "   "))
        .init()
        .await
        .unwrap_err();

    assert!(matches!(&err, DatabaseError::Migration { migration, .. } if migration == "broken:0001"));
}
