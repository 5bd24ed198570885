//! Consecutive CLI sessions over one rows file and one state file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pager_cli::session::{Action, SessionOptions, run_session};
use pager_cli::settings::Settings;
use pager_core::{LabelTable, SeedSource, SortOrder};
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_rows(dir: &Path, count: usize) -> PathBuf {
    let rows: Vec<Value> = (0..count)
        .map(|n| {
            json!({
                "id": n,
                "name": format!("user-{n:02}"),
                "gender": if n % 2 == 0 { "female" } else { "male" },
                "birthDate": format!("19{:02}-01-01", 99 - n),
            })
        })
        .collect();
    let path = dir.join("rows.json");
    std::fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();
    path
}

fn options(dir: &TempDir, query: &str) -> SessionOptions {
    SessionOptions {
        rows: write_rows(dir.path(), 23),
        query: query.to_owned(),
        state: Some(dir.path().join("state.json")),
        settings: Settings::default(),
        latency: Duration::ZERO,
    }
}

fn ids(rows: &[Value]) -> Vec<u64> {
    rows.iter().filter_map(|row| row["id"].as_u64()).collect()
}

#[tokio::test]
async fn test_state_survives_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let first = run_session(&options(&dir, ""), &Action::Page(2)).await.unwrap();
    assert_eq!(first.page.page_index, 2);
    assert_eq!(first.query, "page=2&size=10");
    assert_eq!(ids(&first.rows), (10..20).collect::<Vec<_>>());

    let reload = run_session(&options(&dir, ""), &Action::Show).await.unwrap();
    assert_eq!(reload.seed_source, SeedSource::Storage);
    assert_eq!(reload.page.page_index, 2);
}

#[tokio::test]
async fn test_query_overrides_stored_state() {
    let dir = tempfile::tempdir().unwrap();
    run_session(&options(&dir, ""), &Action::Page(2)).await.unwrap();

    let linked = run_session(&options(&dir, "page=1&size=5"), &Action::Show)
        .await
        .unwrap();
    assert_eq!(linked.seed_source, SeedSource::Url);
    assert_eq!(linked.rows.len(), 5);
    assert_eq!(linked.page_count, 5);
}

#[tokio::test]
async fn test_out_of_range_page_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run_session(&options(&dir, "page=9&size=10"), &Action::Show)
        .await
        .unwrap();
    assert_eq!(outcome.page.page_index, 3);
    assert_eq!(ids(&outcome.rows), [20, 21, 22]);
    assert_eq!(outcome.query, "page=3&size=10");
}

#[tokio::test]
async fn test_forget_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    run_session(&options(&dir, ""), &Action::Size(20)).await.unwrap();
    run_session(&options(&dir, ""), &Action::Forget).await.unwrap();

    let fresh = run_session(&options(&dir, ""), &Action::Show).await.unwrap();
    assert_eq!(fresh.seed_source, SeedSource::Defaults);
    assert_eq!(fresh.page.page_size, 10);
}

#[tokio::test]
async fn test_single_value_filter_runs_at_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let action = Action::Filter {
        key: "gender".into(),
        values: vec!["male".into()],
    };
    let outcome = run_session(&options(&dir, ""), &action).await.unwrap();
    assert_eq!(outcome.total, 11);
    assert!(outcome.rows.iter().all(|row| row["gender"] == "male"));
    assert_eq!(outcome.query, "page=1&size=10&f.gender=male");
}

#[tokio::test]
async fn test_unsortable_field_sorts_the_page_client_side() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(&dir, "");
    opts.settings.view.date_fields = vec!["birthDate".into()];
    let action = Action::Sort {
        key: "birthDate".into(),
        order: SortOrder::Ascending,
    };
    let outcome = run_session(&opts, &action).await.unwrap();

    // Only the first page's ten rows are reordered.
    assert_eq!(ids(&outcome.rows), (0..10).rev().collect::<Vec<_>>());
    assert_eq!(
        outcome.query,
        "page=1&size=10&sort=birthDate&order=ascend"
    );
}

#[tokio::test]
async fn test_sortable_field_sorts_the_whole_set() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(&dir, "");
    opts.settings.view.sortable = vec!["id".into()];
    let action = Action::Sort {
        key: "id".into(),
        order: SortOrder::Descending,
    };
    let outcome = run_session(&opts, &action).await.unwrap();
    assert_eq!(ids(&outcome.rows)[0], 22);
}

#[tokio::test]
async fn test_labels_are_displayed() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(&dir, "page=1&size=5");
    opts.settings.view.label_field = Some("gender".into());
    opts.settings.view.labels = LabelTable::new()
        .with_label("gender", "male", "M")
        .with_label("gender", "female", "F");
    let outcome = run_session(&opts, &Action::Show).await.unwrap();
    assert_eq!(outcome.rows[0]["gender"], "F");
    assert_eq!(outcome.rows[1]["gender"], "M");
}

#[tokio::test(start_paused = true)]
async fn test_latency_does_not_change_the_result() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(&dir, "page=2&size=20");
    opts.latency = Duration::from_millis(250);
    let outcome = run_session(&opts, &Action::Show).await.unwrap();
    assert_eq!(ids(&outcome.rows), [20, 21, 22]);
}

#[tokio::test]
async fn test_missing_rows_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(&dir, "");
    opts.rows = dir.path().join("missing.json");
    let error = run_session(&opts, &Action::Show).await.unwrap_err();
    assert!(error.to_string().contains("failed to read rows file"));
}
