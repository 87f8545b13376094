mod common;

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use ocr_server::config::EngineConfig;
use ocr_server::engine::EngineHandle;
use ocr_server::error::OcrError;
use ocr_server::lookup::{lookup, lookup_with_engine};
use ocr_server::LookupOutcome;

use common::{EchoEngine, ScriptedEngine};

fn echo_handle() -> EngineHandle {
    EngineHandle::from_engine(
        EchoEngine {
            delay: Duration::ZERO,
        },
        &EngineConfig::default(),
    )
}

#[tokio::test]
async fn test_lookup_reads_file_and_joins_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all("Zażółć gęślą jaźń\nsecond line".as_bytes())
        .unwrap();

    let outcome = lookup_with_engine(&echo_handle(), file.path()).await;
    assert_eq!(
        outcome,
        LookupOutcome::Text("Zażółć gęślą jaźń\nsecond line".to_string())
    );
}

#[tokio::test]
async fn test_lookup_missing_file_skips_engine_init() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nonexistent.png");
    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);

    let outcome = lookup(&path, &EngineConfig::default(), move |config| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(EngineHandle::from_engine(ScriptedEngine::new(&["x"]), config))
    })
    .await;

    assert!(matches!(outcome, LookupOutcome::NotFound(_)));
    let rendered = outcome.to_string();
    assert!(rendered.contains("not found"));
    assert!(rendered.contains(&path.display().to_string()));
    assert_eq!(inits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_lookup_corrupt_image_reports_cause() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xff, 0xfe, 0x00, 0x81]).unwrap();

    let outcome = lookup_with_engine(&echo_handle(), file.path()).await;
    match &outcome {
        LookupOutcome::Failure(cause) => assert!(cause.contains("not an image")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(outcome
        .to_string()
        .starts_with("An unexpected error occurred: "));
}

#[tokio::test]
async fn test_lookup_empty_file_is_failure() {
    let file = tempfile::NamedTempFile::new().unwrap();

    let outcome = lookup_with_engine(&echo_handle(), file.path()).await;
    assert!(matches!(outcome, LookupOutcome::Failure(_)));
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_lookup_init_failure_is_failure() {
    let file = tempfile::NamedTempFile::new().unwrap();

    let outcome = lookup(file.path(), &EngineConfig::default(), |_| {
        Err(OcrError::Initialization("no traineddata for pol".to_string()))
    })
    .await;

    match outcome {
        LookupOutcome::Failure(cause) => assert!(cause.contains("no traineddata for pol")),
        other => panic!("expected failure, got {other:?}"),
    }
}
