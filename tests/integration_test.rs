//! Integration tests for dexa-rs.

#![allow(clippy::expect_used)]

use dexa_rs::agent::{AgentLoop, LoopConfig, ScriptedProvider};
use dexa_rs::core::{ActionRecord, Chunk, Observation, Outcome};
use dexa_rs::embedding::{DEFAULT_DIMENSIONS, HashEmbedder};
use dexa_rs::index::{EmbeddingIndex, Retriever};
use dexa_rs::io::dataset_from_reader;
use dexa_rs::session::Session;
use dexa_rs::splitter::TextSplitter;
use dexa_rs::storage::{BlobStore, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

const DIABETES_CSV: &str = "\
Glucose,BMI,Outcome
148,33.6,1
85,26.6,0
183,23.3,1
89,28.1,0
137,43.1,1
";

const NOTES: &str = "Glucose is measured after fasting. High glucose with a positive \
outcome suggests follow-up. Insulin and skin thickness columns carry zeros that stand \
in for missing measurements. Replacing those zeros with the column median is the \
standard imputation here. Body mass index groups differ between outcomes.";

/// Helper to create an initialized on-disk store.
fn create_test_store() -> (SqliteStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let mut store = SqliteStore::open(&db_path).expect("Failed to create store");
    store.init().expect("Failed to init store");
    (store, temp_dir)
}

#[test]
fn test_split_embed_persist_reload_query_identical() {
    let (mut store, _temp) = create_test_store();
    let embedder = HashEmbedder::new(DEFAULT_DIMENSIONS);

    let splitter = TextSplitter::with_size(80);
    let chunks = splitter.split("notes", NOTES).expect("split failed");
    assert!(chunks.len() > 1);

    let index = EmbeddingIndex::build(&embedder, chunks).expect("build failed");
    index.persist(&mut store, "notes").expect("persist failed");

    let reloaded = EmbeddingIndex::load(&store, "notes").expect("load failed");
    assert_eq!(reloaded, index);

    for query in ["zeros imputation median", "glucose fasting", "body mass index"] {
        let before = index.query(&embedder, query, 3).expect("query failed");
        let after = reloaded.query(&embedder, query, 3).expect("query failed");

        assert_eq!(before.len(), after.len());
        for ((c1, s1), (c2, s2)) in before.iter().zip(after.iter()) {
            assert_eq!(c1, c2, "chunks diverged for {query}");
            assert!((s1 - s2).abs() == 0.0, "scores diverged for {query}");
        }
    }
}

#[test]
fn test_full_agent_run_over_csv_and_index() {
    let (mut store, temp) = create_test_store();
    let embedder = HashEmbedder::new(DEFAULT_DIMENSIONS);

    // Dataset from CSV text
    let dataset =
        dataset_from_reader("diabetes.csv", DIABETES_CSV.as_bytes()).expect("decode failed");
    assert_eq!(dataset.row_count(), 5);
    assert_eq!(dataset.column_count(), 3);

    // Retrieval index from the notes document
    let chunks = TextSplitter::with_size(100)
        .split("notes", NOTES)
        .expect("split failed");
    let index = EmbeddingIndex::build(&embedder, chunks).expect("build failed");
    index.persist(&mut store, "notes").expect("persist failed");

    let retriever = Retriever::new(
        Arc::new(EmbeddingIndex::load(&store, "notes").expect("load failed")),
        Arc::new(embedder),
        2,
    );

    let mut session = Session::new()
        .with_builtin_tools()
        .expect("builtin registration failed")
        .with_dataset(dataset)
        .with_chart_dir(temp.path())
        .with_retriever(retriever);

    // Scripted conversation: quality check, frequency, then answer
    let provider = ScriptedProvider::from_slices(&[
        r#"{"action": "tool", "tool": "missing_values", "args": {"count_zeros": true}}"#,
        r#"{"action": "tool", "tool": "value_counts", "args": {"column": "Outcome"}}"#,
        r#"{"action": "final", "answer": "3 of 5 patients (60%) tested positive."}"#,
    ]);

    let agent = AgentLoop::new(&provider).with_config(LoopConfig::new(10));
    let transcript = agent
        .run(&session, "What share of patients tested positive?")
        .expect("run failed");

    assert_eq!(transcript.turn_count(), 3);
    assert_eq!(
        transcript.answer(),
        Some("3 of 5 patients (60%) tested positive.")
    );

    // First observation is the data-quality report
    let quality = transcript.turns[0].observation.render();
    assert!(quality.contains("per_column"));

    // Second observation carries the 60/40 split
    let counts = transcript.turns[1].observation.render();
    assert!(counts.contains("60.0"));

    session.record(transcript);
    assert_eq!(session.transcripts().len(), 1);
}

#[test]
fn test_chart_tool_writes_into_session_chart_dir() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dataset =
        dataset_from_reader("diabetes.csv", DIABETES_CSV.as_bytes()).expect("decode failed");

    let session = Session::new()
        .with_builtin_tools()
        .expect("builtin registration failed")
        .with_dataset(dataset)
        .with_chart_dir(temp.path());

    let provider = ScriptedProvider::from_slices(&[
        r#"{"action": "tool", "tool": "histogram", "args": {"column": "Glucose", "group_by": "Outcome", "bins": 4}}"#,
        r#"{"action": "final", "answer": "See the chart."}"#,
    ]);

    let agent = AgentLoop::new(&provider);
    let transcript = agent
        .run(&session, "Plot glucose by outcome")
        .expect("run failed");

    let Observation::Chart { path, summary } = &transcript.turns[0].observation else {
        unreachable!("histogram produces a chart observation");
    };
    assert!(path.exists(), "chart file must exist on disk");
    assert!(path.starts_with(temp.path()));
    assert!(summary.contains("histogram of Glucose"));

    let svg = std::fs::read_to_string(path).expect("chart must be readable");
    assert!(svg.starts_with("<svg"));
}

#[test]
fn test_limit_and_repair_bounds_hold_end_to_end() {
    let dataset =
        dataset_from_reader("d.csv", DIABETES_CSV.as_bytes()).expect("decode failed");
    let session = Session::new()
        .with_builtin_tools()
        .expect("builtin registration failed")
        .with_dataset(dataset);

    // Adversarial: endless tool calls, then two malformed replies
    let mut script = vec![r#"{"action": "tool", "tool": "row_count", "args": {}}"#.to_string(); 2];
    script.push(r#"{"action": "bogus"}"#.to_string());
    script.push("{not json".to_string());
    script.push(r#"{"action": "final", "answer": "unreachable"}"#.to_string());

    let provider = ScriptedProvider::new(script);
    let agent = AgentLoop::new(&provider).with_config(LoopConfig::new(10));

    let transcript = agent.run(&session, "q").expect("run failed");

    // 2 tool turns + 1 repaired malformed + 1 terminal malformed
    assert_eq!(transcript.turn_count(), 4);
    assert!(transcript.turn_count() <= 10 + 1);
    assert!(matches!(transcript.outcome, Outcome::MalformedAction { .. }));
    assert!(matches!(
        transcript.turns[2].action,
        ActionRecord::Malformed { .. }
    ));
}

#[test]
fn test_store_survives_reopen() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp.path().join("state.db");

    {
        let mut store = SqliteStore::open(&db_path).expect("open failed");
        store.init().expect("init failed");

        let embedder = HashEmbedder::new(DEFAULT_DIMENSIONS);
        let index = EmbeddingIndex::build(
            &embedder,
            vec![Chunk::new("doc", 0, "persistent entry".to_string())],
        )
        .expect("build failed");
        index.persist(&mut store, "docs").expect("persist failed");
    }

    let store = SqliteStore::open(&db_path).expect("reopen failed");
    let index = EmbeddingIndex::load(&store, "docs").expect("load failed");
    assert_eq!(index.len(), 1);

    let keys = store.list_keys().expect("list failed");
    assert_eq!(keys, vec!["index/docs".to_string()]);
}
