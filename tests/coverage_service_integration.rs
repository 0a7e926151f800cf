//! End-to-end assessment runs against a file-backed model store

use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};
use tm_coverage::{
    AssessOptions, CoverageEngine, CoverageService, CoverageStatus, ModelStore, PersistOutcome,
    TmModel,
};

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn seed_models() -> Vec<TmModel> {
    vec![
        TmModel::new("Cash Structuring")
            .with_covered(["structuring", "cash deposit"])
            .with_partially_covered(["smurfing"]),
        TmModel::new("Wire Monitoring")
            .with_covered(["wire transfer", "cross-border"])
            .with_not_covered(["hawala"]),
    ]
}

fn write_models(dir: &Path, name: &str, models: &[TmModel]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(models).unwrap()).unwrap();
    path
}

fn service_for(path: &Path) -> CoverageService {
    CoverageService::new(CoverageEngine::default(), ModelStore::new(path))
}

fn backups_in(dir: &TempDir) -> Vec<PathBuf> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().contains("_backup_"))
        .collect()
}

const UPDATE_NO_SEMANTIC: AssessOptions = AssessOptions {
    semantic_enabled: false,
    auto_update: true,
};

#[test]
fn test_new_gap_persisted_once_across_runs() {
    let dir = tempdir().unwrap();
    let path = write_models(dir.path(), "tm_models.json", &seed_models());
    let service = service_for(&path);

    let input = phrases(&["Structuring", "trade misinvoicing"]);

    let first = service.run(&input, UPDATE_NO_SEMANTIC).unwrap();
    assert!(first.updated);
    assert!(matches!(first.persist, PersistOutcome::Saved { .. }));

    let second = service.run(&input, UPDATE_NO_SEMANTIC).unwrap();
    assert!(!second.updated);
    assert!(matches!(second.persist, PersistOutcome::NotNeeded));

    let stored = ModelStore::new(&path).load().unwrap();
    for model in &stored {
        let count = model
            .not_covered_risks
            .iter()
            .filter(|r| *r == "trade misinvoicing")
            .count();
        assert_eq!(count, 1, "model {}", model.model_name);
    }

    // Still reported as unmatched on the second run
    assert_eq!(second.results[0].newly_added_not_covered, "trade misinvoicing");
    assert_eq!(second.results[0].coverage_status, CoverageStatus::PartiallyCovered);
}

#[test]
fn test_no_save_without_auto_update() {
    let dir = tempdir().unwrap();
    let path = write_models(dir.path(), "tm_models.json", &seed_models());
    let before = std::fs::read_to_string(&path).unwrap();
    let service = service_for(&path);

    let options = AssessOptions {
        semantic_enabled: false,
        auto_update: false,
    };
    let first = service.run(&phrases(&["bribery", "wire transfer"]), options).unwrap();
    let second = service.run(&phrases(&["bribery", "wire transfer"]), options).unwrap();

    let statuses = |r: &tm_coverage::CoverageReport| {
        r.results.iter().map(|x| x.coverage_status).collect::<Vec<_>>()
    };
    assert_eq!(statuses(&first), statuses(&second));
    assert!(matches!(first.persist, PersistOutcome::NotNeeded));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert!(backups_in(&dir).is_empty());
}

#[test]
fn test_backup_holds_saved_collection() {
    let dir = tempdir().unwrap();
    let path = write_models(dir.path(), "tm_models.json", &seed_models());
    let service = service_for(&path);

    let report = service.run(&phrases(&["sanctions evasion"]), UPDATE_NO_SEMANTIC).unwrap();

    let PersistOutcome::Saved { backup_path } = report.persist else {
        panic!("expected a save, got {:?}", report.persist);
    };
    assert_eq!(backup_path.parent(), Some(dir.path()));
    assert_eq!(
        ModelStore::load_from(&backup_path).unwrap(),
        ModelStore::new(&path).load().unwrap()
    );
}

#[test]
fn test_missing_store_aborts_run() {
    let dir = tempdir().unwrap();
    let service = service_for(&dir.path().join("missing.json"));

    let err = service.run(&phrases(&["fraud"]), AssessOptions::default()).unwrap_err();
    assert!(err.is_read_error());
}

#[test]
fn test_malformed_store_aborts_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tm_models.json");
    std::fs::write(&path, r#"{"model_name": "not a list"}"#).unwrap();

    let err = service_for(&path)
        .run(&phrases(&["fraud"]), AssessOptions::default())
        .unwrap_err();
    assert!(err.is_read_error());
}

#[test]
fn test_write_failure_keeps_results() {
    let dir = tempdir().unwrap();
    // Long enough that the derived backup name exceeds the filesystem limit
    let name = format!("{}.json", "m".repeat(240));
    let path = write_models(dir.path(), &name, &seed_models());

    let report = service_for(&path)
        .run(&phrases(&["Cash Deposit", "crypto mixer"]), UPDATE_NO_SEMANTIC)
        .unwrap();

    assert!(report.updated);
    let PersistOutcome::Failed(err) = &report.persist else {
        panic!("expected a failed save, got {:?}", report.persist);
    };
    assert!(err.is_write_error());

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].matched_risks, "Cash Deposit");
    assert_eq!(report.results[0].newly_added_not_covered, "crypto mixer");

    // Primary left as it was
    let stored = ModelStore::new(&path).load().unwrap();
    assert_eq!(stored, seed_models());
}

#[test]
fn test_empty_phrase_list_is_not_an_error() {
    let dir = tempdir().unwrap();
    let path = write_models(dir.path(), "tm_models.json", &seed_models());

    let report = service_for(&path).run(&[], AssessOptions::default()).unwrap();
    assert!(report
        .results
        .iter()
        .all(|r| r.coverage_status == CoverageStatus::NoRisksFound
            && r.matched_risks == "None"
            && r.newly_added_not_covered == "None"));
}

#[test]
fn test_fallback_semantic_matches_recorded_gap() {
    let dir = tempdir().unwrap();
    let path = write_models(dir.path(), "tm_models.json", &seed_models());

    let report = service_for(&path)
        .run(&phrases(&["Hawala networks"]), AssessOptions::default())
        .unwrap();

    // Only the wire model already knows the gap
    assert_eq!(report.results[0].coverage_status, CoverageStatus::NotCovered);
    assert_eq!(report.results[1].matched_risks, "Hawala networks (sim=1.00)");
    assert_eq!(report.results[1].coverage_status, CoverageStatus::PartiallyCovered);
}
