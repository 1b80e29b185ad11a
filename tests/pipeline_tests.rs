//! Integration tests over a small Enron-style corpus in `tests/fixtures/enron`.

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::*;

use mailkv::config::{Config, MailboxConfig};
use mailkv::error::MailKvError;
use mailkv::model::column::ColumnKey;
use mailkv::parser::file::parse_email_file;
use mailkv::pipeline;
use mailkv::store::{snapshot, Catalog, Scan, Table};

fn corpus_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("enron")
}

fn fixture(family: &str, n: u32) -> PathBuf {
    corpus_root().join(family).join(format!("{n}."))
}

/// Default table and queries over the fixture corpus, writing into `output_dir`.
fn fixture_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.corpus.root = corpus_root();
    config.corpus.mailboxes = vec![
        MailboxConfig {
            family: "allen-p".to_string(),
            files: vec!["1-3".to_string()],
        },
        MailboxConfig {
            family: "meyers-a".to_string(),
            files: vec!["1-3".to_string()],
        },
    ];
    config.output.dir = output_dir.to_path_buf();
    config.store.snapshot = Some(output_dir.join("lf-emails.mailkv"));
    config
}

fn keys(rows: &[(Vec<u8>, mailkv::model::column::Row)]) -> Vec<String> {
    rows.iter()
        .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
        .collect()
}

// ─── Parsing fixture files ──────────────────────────────────────────

#[test]
fn test_parse_multiline_recipients() {
    let email = parse_email_file(fixture("allen-p", 2)).unwrap();
    assert_eq!(email.date, "20011231022451");
    assert_eq!(email.sender, "phillip.allen@enron.com");
    assert_eq!(
        email.recipients,
        " tim.belden@enron.com, mike.grigsby@enron.com, \tkeith.holst@enron.com"
    );
}

#[test]
fn test_quoted_headers_stay_in_body() {
    let email = parse_email_file(fixture("allen-p", 2)).unwrap();
    assert!(email
        .body
        .starts_with("\nALLEN-2 Positions are flat going into the new year.\n\n"));
    assert!(email.body.ends_with("Subject:\tyear end positions"));
}

#[test]
fn test_parse_without_recipients() {
    let email = parse_email_file(fixture("allen-p", 3)).unwrap();
    assert_eq!(email.date, "20011212140000");
    assert_eq!(email.recipients, "");
    assert_eq!(email.body, "\nALLEN-3 Note to self: call the gas desk.");
}

#[test]
fn test_pdt_offset_date() {
    let email = parse_email_file(fixture("meyers-a", 1)).unwrap();
    assert_eq!(email.date, "20010911101232");
}

// ─── Table behavior over ingested fixtures ──────────────────────────

#[test]
fn test_ingest_counts_and_shared_row() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixture_config(tmp.path());
    let mut catalog = Catalog::new();

    let report = pipeline::ingest(&mut catalog, &config, false, None).unwrap();
    assert_eq!(report.files(), 6);
    assert!(report.bytes() > 0);
    assert_eq!(
        report.bytes(),
        report.mailboxes[0].bytes + report.mailboxes[1].bytes
    );
    // allen-p/3 and meyers-a/2 share a timestamp.
    assert_eq!(report.rows, 5);

    let table = catalog.table("lf-emails").unwrap();
    let shared = table.row(b"20011212140000").unwrap();
    assert_eq!(shared.len(), 6);
    assert!(shared.contains_key(&ColumnKey::body("allen-p")));
    assert!(shared.contains_key(&ColumnKey::body("meyers-a")));
}

#[test]
fn test_bracketing_range_returns_ascending() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixture_config(tmp.path());
    let mut catalog = Catalog::new();
    pipeline::ingest(&mut catalog, &config, false, None).unwrap();

    let table = catalog.table("lf-emails").unwrap();
    let rows = table
        .scan(&Scan::range("20011101000000", "20011231235959"))
        .unwrap();
    assert_eq!(
        keys(&rows),
        ["20011105091500", "20011212140000", "20011231022451"]
    );
}

#[test]
fn test_prefix_scan_matches_only_prefix() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixture_config(tmp.path());
    let mut catalog = Catalog::new();
    pipeline::ingest(&mut catalog, &config, false, None).unwrap();

    let table = catalog.table("lf-emails").unwrap();
    let rows = table.scan(&Scan::prefix("200112")).unwrap();
    assert_eq!(keys(&rows), ["20011212140000", "20011231022451"]);
    let rows = table.scan(&Scan::prefix("2002")).unwrap();
    assert_eq!(keys(&rows), ["20020206205713"]);
}

#[test]
fn test_second_ingest_requires_replace() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixture_config(tmp.path());
    let mut catalog = Catalog::new();
    pipeline::ingest(&mut catalog, &config, false, None).unwrap();

    let err = pipeline::ingest(&mut catalog, &config, false, None).unwrap_err();
    assert!(matches!(err, MailKvError::TableExists(_)));

    let report = pipeline::ingest(&mut catalog, &config, true, None).unwrap();
    assert_eq!(report.rows, 5);
}

#[test]
fn test_missing_file_aborts_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = fixture_config(tmp.path());
    config.corpus.mailboxes[1].files = vec!["1-4".to_string()];
    let mut catalog = Catalog::new();

    let err = pipeline::ingest(&mut catalog, &config, false, None).unwrap_err();
    assert!(matches!(err, MailKvError::FileNotFound(_)));
}

#[test]
fn test_progress_reports_every_file() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixture_config(tmp.path());
    let mut catalog = Catalog::new();
    let calls = std::cell::RefCell::new(Vec::new());

    pipeline::ingest(
        &mut catalog,
        &config,
        false,
        Some(&|done, total| calls.borrow_mut().push((done, total))),
    )
    .unwrap();

    let calls = calls.into_inner();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls.last(), Some(&(6, 6)));
}

// ─── Canned queries ─────────────────────────────────────────────────

#[test]
fn test_full_batch_writes_three_outputs() {
    let out = assert_fs::TempDir::new().unwrap();
    let config = fixture_config(out.path());
    let mut catalog = Catalog::new();

    let (_report, results) = pipeline::run(&mut catalog, &config, false, None).unwrap();
    assert_eq!(results.len(), 3);

    // Range: start included, stop (meyers-a/3) excluded.
    out.child("output1.txt").assert(
        "\nMEYERS-1 Here is the real time schedule for tomorrow.\
         \nMEYERS-2 Can we swap shifts on Friday?",
    );

    out.child("output2.txt").assert(
        predicate::str::contains("ALLEN-3")
            .and(predicate::str::contains("MEYERS-2"))
            .and(predicate::str::contains("ALLEN-2"))
            .and(predicate::str::contains("ALLEN-1").not())
            .and(predicate::str::contains("MEYERS-1").not())
            .and(predicate::str::contains("MEYERS-3").not()),
    );

    out.child("output3.txt").assert(
        "\nALLEN-1 The forecast for the west desk is attached.\n\nPhillip",
    );
}

#[test]
fn test_december_output_order() {
    let out = assert_fs::TempDir::new().unwrap();
    let config = fixture_config(out.path());
    let mut catalog = Catalog::new();
    pipeline::run(&mut catalog, &config, false, None).unwrap();

    let text = std::fs::read_to_string(out.child("output2.txt").path()).unwrap();
    let pos = |needle: &str| text.find(needle).unwrap();
    // Key order first, then allen-p before meyers-a within a row.
    assert!(pos("ALLEN-3") < pos("MEYERS-2"));
    assert!(pos("MEYERS-2") < pos("ALLEN-2"));
}

#[test]
fn test_snapshot_then_single_query() {
    let out = assert_fs::TempDir::new().unwrap();
    let config = fixture_config(out.path());
    let snapshot_path = config.store.snapshot.clone().unwrap();

    let mut catalog = Catalog::new();
    pipeline::ingest(&mut catalog, &config, false, None).unwrap();
    snapshot::save(&catalog, &snapshot_path).unwrap();
    out.child("lf-emails.mailkv").assert(predicate::path::exists());

    let loaded = snapshot::load(&snapshot_path).unwrap().unwrap();
    let results =
        pipeline::run_queries(&loaded, &config, Some("allen-p-november-2001")).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rows, 1);
    out.child("output3.txt")
        .assert(predicate::str::starts_with("\nALLEN-1"));
    out.child("output1.txt").assert(predicate::path::missing());
}

#[test]
fn test_unknown_query_name() {
    let tmp = tempfile::tempdir().unwrap();
    let config = fixture_config(tmp.path());
    let mut catalog = Catalog::new();
    pipeline::ingest(&mut catalog, &config, false, None).unwrap();

    let err = pipeline::run_queries(&catalog, &config, Some("nope")).unwrap_err();
    assert!(matches!(err, MailKvError::InvalidConfig(_)));
}
