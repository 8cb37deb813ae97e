//! Corpus providers behind `--corpus`.

use creator_search::app::corpus_provider;
use creator_search::core::creator::Platform;
use creator_search::error::ErrorCode;
use creator_search::test_utils::fixtures::{fitness_corpus, write_corpus_file};
use rusqlite::{Connection, params};
use tempfile::TempDir;

fn create_db(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE creators (
            id TEXT PRIMARY KEY,
            name TEXT,
            handle TEXT,
            platform TEXT,
            followers INTEGER,
            engagement_rate REAL,
            categories TEXT,
            demographics TEXT,
            content_style TEXT,
            language TEXT,
            location TEXT,
            collaboration_rate TEXT,
            response_rate INTEGER,
            embedding TEXT
        );",
    )
    .unwrap();
    conn.execute(
        "INSERT INTO creators VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            "db_1",
            "Dana Brooks",
            "@DanaCooks",
            "youtube",
            120_000_i64,
            5.5_f64,
            r#"["Food", "cooking"]"#,
            r#"{"age_group": "25-34"}"#,
            "weeknight recipes",
            "English",
            "Portland, OR",
            "$1,500",
            92_i64,
            "not json",
        ],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO creators (id, name, platform) VALUES (?1, ?2, ?3)",
        params!["db_2", "Sparse Row", "Twitch"],
    )
    .unwrap();
}

#[tokio::test]
async fn sqlite_rows_become_creators() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("creators.db");
    create_db(&path);

    let corpus = corpus_provider(Some(&path)).unwrap().snapshot().await.unwrap();

    assert_eq!(corpus.len(), 2);
    let dana = corpus.get("db_1").unwrap();
    assert_eq!(dana.platform, Platform::YouTube);
    assert_eq!(dana.followers, 120_000);
    assert!(dana.has_category("food"));
    assert_eq!(dana.demographics.age_group.as_deref(), Some("25-34"));
    assert_eq!(dana.response_rate, 92);
    assert!(dana.embedding.is_none());

    let sparse = corpus.get("db_2").unwrap();
    assert_eq!(sparse.followers, 0);
    assert!(sparse.categories.is_empty());
}

#[tokio::test]
async fn missing_database_is_corpus_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = corpus_provider(Some(&dir.path().join("absent.sqlite")))
        .unwrap()
        .snapshot()
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CorpusUnavailable);
}

#[tokio::test]
async fn json_corpus_file_round_trips_fixture() {
    let dir = TempDir::new().unwrap();
    let creators = fitness_corpus().creators().to_vec();
    let path = write_corpus_file(dir.path(), "creators.json", &creators);

    let corpus = corpus_provider(Some(&path)).unwrap().snapshot().await.unwrap();
    assert_eq!(corpus.len(), creators.len());
    assert_eq!(corpus.get("fit_2").unwrap().location, "Denver, CO");
}

#[tokio::test]
async fn default_provider_is_demo_corpus() {
    let corpus = corpus_provider(None).unwrap().snapshot().await.unwrap();
    assert_eq!(corpus.len(), 5);
}
