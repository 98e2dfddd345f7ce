//! End-to-end cycles against the JSON history log on disk, with the network
//! collaborators faked.

use std::path::Path;
use std::sync::Arc;

use history_rewritten::testing::{
    published_record, sample_event, MockEventGenerator, MockImageGenerator, MockPublisher,
};
use history_rewritten::{
    CycleDeps, CycleError, CycleSettings, HistoryError, HistoryRecord, HistoryStore,
    IllustrationStore, JsonHistoryStore, Orchestrator, Stage,
};

fn orchestrator(
    dir: &Path,
    generator: MockEventGenerator,
    illustrator: MockImageGenerator,
    publisher: MockPublisher,
) -> (Orchestrator, Arc<JsonHistoryStore>) {
    orchestrator_with_log(
        dir,
        &dir.join("history_log.json"),
        generator,
        illustrator,
        publisher,
    )
}

fn orchestrator_with_log(
    dir: &Path,
    log: &Path,
    generator: MockEventGenerator,
    illustrator: MockImageGenerator,
    publisher: MockPublisher,
) -> (Orchestrator, Arc<JsonHistoryStore>) {
    let store = Arc::new(JsonHistoryStore::new(log));
    let deps = CycleDeps::builder()
        .generator(Arc::new(generator))
        .illustrator(Arc::new(illustrator))
        .publisher(Arc::new(publisher))
        .history(store.clone())
        .illustrations(IllustrationStore::new(dir.join("generated_images")).unwrap())
        .build();
    (Orchestrator::new(deps, CycleSettings::default()), store)
}

fn seed(path: &Path, records: &[HistoryRecord]) {
    std::fs::write(path, serde_json::to_string_pretty(records).unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Successful cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn published_event_is_appended_to_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, store) = orchestrator(
        dir.path(),
        MockEventGenerator::new(vec![sample_event("The Printing Press of Timbuktu")]),
        MockImageGenerator::new(b"png-bytes".to_vec()),
        MockPublisher::confirming(),
    );

    assert!(orchestrator.run().await);

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &json[0];
    assert_eq!(entry["title"], "The Printing Press of Timbuktu");
    assert_eq!(entry["hash"].as_str().unwrap().len(), 40);
    assert!(entry["image_path"]
        .as_str()
        .unwrap()
        .ends_with(".png"));

    let records = store.load();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fingerprint, records[0].recomputed_fingerprint());
    assert!(store.verify().unwrap().is_empty());

    let images: Vec<_> = std::fs::read_dir(dir.path().join("generated_images"))
        .unwrap()
        .collect();
    assert_eq!(images.len(), 1);
}

#[tokio::test]
async fn existing_entries_are_preserved_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let older = published_record(&sample_event("The Lighthouse Treaty"));
    seed(&dir.path().join("history_log.json"), &[older.clone()]);

    let (orchestrator, store) = orchestrator(
        dir.path(),
        MockEventGenerator::new(vec![sample_event("A Comet Over Kyoto")]),
        MockImageGenerator::new(b"png-bytes".to_vec()),
        MockPublisher::confirming(),
    );

    let report = orchestrator.run_cycle().await.unwrap();
    let records = store.load();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], older);
    assert_eq!(records[1], report.record);
}

// ---------------------------------------------------------------------------
// Rejections and failures leave the log untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_twice_leaves_log_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("history_log.json");
    let past = sample_event("The Silent Armada");
    seed(&log, &[published_record(&past)]);
    let before = std::fs::read_to_string(&log).unwrap();

    let (orchestrator, _store) = orchestrator(
        dir.path(),
        MockEventGenerator::new(vec![past.clone(), past]),
        MockImageGenerator::new(b"png-bytes".to_vec()),
        MockPublisher::confirming(),
    );

    let err = orchestrator.run_cycle().await.unwrap_err();
    assert!(matches!(err, CycleError::NoveltyExhausted { attempts: 2 }));
    assert_eq!(err.stage(), Stage::Gate);
    assert_eq!(std::fs::read_to_string(&log).unwrap(), before);
}

#[tokio::test]
async fn image_failure_skips_publish_and_record() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, store) = orchestrator(
        dir.path(),
        MockEventGenerator::new(vec![sample_event("The Glass Republic")]),
        MockImageGenerator::failing(),
        MockPublisher::confirming(),
    );

    let err = orchestrator.run_cycle().await.unwrap_err();
    assert_eq!(err.stage(), Stage::Illustrate);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn publish_failure_skips_record() {
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, store) = orchestrator(
        dir.path(),
        MockEventGenerator::new(vec![sample_event("The Glass Republic")]),
        MockImageGenerator::new(b"png-bytes".to_vec()),
        MockPublisher::failing(),
    );

    assert!(!orchestrator.run().await);
    assert!(store.load().is_empty());
}

#[tokio::test]
async fn unwritable_log_fails_record_stage_after_publish() {
    let dir = tempfile::tempdir().unwrap();
    // The log's parent is a regular file, so neither read nor write can succeed.
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();
    let log = blocker.join("history_log.json");

    let (orchestrator, _store) = orchestrator_with_log(
        dir.path(),
        &log,
        MockEventGenerator::new(vec![sample_event("The Paper Throne")]),
        MockImageGenerator::new(b"png-bytes".to_vec()),
        MockPublisher::confirming(),
    );

    let err = orchestrator.run_cycle().await.unwrap_err();
    assert_eq!(err.stage(), Stage::Record);
    assert!(matches!(err, CycleError::Record(HistoryError::Io { .. })));
    assert!(!log.exists());
}

#[tokio::test]
async fn unwritable_log_makes_run_report_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();

    let (orchestrator, _store) = orchestrator_with_log(
        dir.path(),
        &blocker.join("history_log.json"),
        MockEventGenerator::new(vec![sample_event("The Paper Throne")]),
        MockImageGenerator::new(b"png-bytes".to_vec()),
        MockPublisher::confirming(),
    );

    assert!(!orchestrator.run().await);
}

// ---------------------------------------------------------------------------
// Corrupt log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_log_is_quarantined_before_append() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("history_log.json");
    std::fs::write(&log, "{ not json").unwrap();

    let (orchestrator, store) = orchestrator(
        dir.path(),
        MockEventGenerator::new(vec![sample_event("The Second Sun")]),
        MockImageGenerator::new(b"png-bytes".to_vec()),
        MockPublisher::confirming(),
    );

    assert!(orchestrator.run().await);
    assert_eq!(store.load().len(), 1);

    let quarantined: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("history_log.json.corrupt-")
        })
        .collect();
    assert_eq!(quarantined.len(), 1);
    assert_eq!(
        std::fs::read_to_string(quarantined[0].path()).unwrap(),
        "{ not json"
    );
}
