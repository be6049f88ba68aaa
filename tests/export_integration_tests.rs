//! End-to-end tests for the export loop driven through the orchestrator.

mod common;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use common::{ScriptedEngine, TestProgress};
use gridbin::services::DetachedEngine;
use gridbin::{CancelFlag, RunConfig, RunOrchestrator, RunOutcome};

fn base_config(root: &TempDir) -> RunConfig {
    let mut config = RunConfig::default();
    config.export_root = Utf8PathBuf::try_from(root.path().to_path_buf()).unwrap();
    config.x_start = 1;
    config.x_end = 2;
    config.y_start = 1;
    config.y_end = 1;
    config.z_start = 6;
    config.z_step = 3;
    config.z_end = 6;
    config.wall_widths = vec![1.2];
    config.divisions_start = 1;
    config.divisions_end = 2;
    config.create_images = false;
    config
}

fn run(config: RunConfig, engine: &mut ScriptedEngine, progress: &TestProgress) -> RunOutcome {
    RunOrchestrator::new(config, CancelFlag::new())
        .run(engine, progress)
        .unwrap()
}

#[test]
fn test_fresh_run_generates_every_variant() {
    let tmp = TempDir::new().unwrap();
    let config = base_config(&tmp);
    let mut engine = ScriptedEngine::default();
    let progress = TestProgress::new();

    let outcome = run(config, &mut engine, &progress);
    match outcome {
        RunOutcome::Completed(report) => {
            assert_eq!(report.total, 4);
            assert_eq!(report.generated, 4);
            assert_eq!(report.skipped, 0);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(engine.export_calls, 4);
    // the backend settles twice after every parameter change
    assert_eq!(engine.settle_calls, 8);
    assert_eq!(progress.max(), 4);
    assert_eq!(progress.value(), 4);
}

#[test]
fn test_rerun_skips_existing_without_touching_engine() {
    let tmp = TempDir::new().unwrap();
    let config = base_config(&tmp);

    let mut engine = ScriptedEngine::default();
    run(config.clone(), &mut engine, &TestProgress::new());

    let mut second = ScriptedEngine::default();
    let outcome = run(config, &mut second, &TestProgress::new());
    match outcome {
        RunOutcome::Completed(report) => {
            assert_eq!(report.generated, 0);
            assert_eq!(report.skipped, 4);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(second.set_parameters_calls, 0);
    assert_eq!(second.export_calls, 0);
}

#[test]
fn test_cancellation_stops_after_current_variant() {
    let tmp = TempDir::new().unwrap();
    let mut config = base_config(&tmp);
    config.x_end = 10;
    config.divisions_end = 1;

    let mut engine = ScriptedEngine::default();
    let progress = TestProgress::cancelling_after(3);
    let outcome = run(config, &mut engine, &progress);
    match outcome {
        RunOutcome::Cancelled(report) => {
            assert_eq!(report.total, 10);
            assert_eq!(report.generated + report.skipped, 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(engine.export_calls, 3);
}

#[test]
fn test_useless_combination_never_reaches_engine() {
    let tmp = TempDir::new().unwrap();
    let mut config = base_config(&tmp);
    config.x_end = 1;
    // a one-unit-wide bin cannot hold three dividers
    config.divisions_start = 3;
    config.divisions_end = 3;

    let mut engine = ScriptedEngine::default();
    let outcome = run(config, &mut engine, &TestProgress::new());
    match outcome {
        RunOutcome::Completed(report) => {
            assert_eq!(report.generated, 0);
            assert_eq!(report.skipped, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(engine.set_parameters_calls, 0);
    assert_eq!(engine.export_calls, 0);
}

#[test]
fn test_previews_captured_for_first_wall_only() {
    let tmp = TempDir::new().unwrap();
    let mut config = base_config(&tmp);
    config.wall_widths = vec![1.5, 1.2];
    config.divisions_end = 1;
    config.create_images = true;
    config.gif_complete = true;

    let mut engine = ScriptedEngine::default();
    let progress = TestProgress::declining();
    let outcome = run(config.clone(), &mut engine, &progress);
    assert!(matches!(outcome, RunOutcome::Completed(_)));

    // two widths at the first wall, none at the second
    assert_eq!(engine.capture_calls, 2);
    assert_eq!(engine.camera_resets, 2);

    let run_folder = config.export_root.join(config.run_folder_name());
    let screenshots: Vec<_> = std::fs::read_dir(run_folder.join("screenshots").as_std_path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(screenshots.len(), 2);
    assert!(screenshots.iter().all(|name| name.contains("_w1.5")));
}

#[test]
fn test_full_pipeline_writes_gifs_and_archives() {
    let tmp = TempDir::new().unwrap();
    let mut config = base_config(&tmp);
    config.divisions_end = 1;
    config.create_images = true;
    config.gif_complete = true;
    config.gif_per_height = true;
    config.create_zip = true;

    let mut engine = ScriptedEngine::default();
    let outcome = run(config.clone(), &mut engine, &TestProgress::new());
    let report = match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("unexpected outcome: {other:?}"),
    };
    // one complete animation plus one per height layer
    assert_eq!(report.gifs_expected, 2);
    assert_eq!(report.gifs_written, 2);
    assert_eq!(report.archives_expected, 1);
    assert_eq!(report.archives_written, 1);

    let run_folder = config.export_root.join(config.run_folder_name());
    let gifs = std::fs::read_dir(run_folder.join("gif").as_std_path())
        .unwrap()
        .count();
    assert_eq!(gifs, 2);
    assert!(run_folder
        .join("zip/Gridfinity_Bin1.2_Z06WW1.2_D01.zip")
        .is_file());
}

#[test]
fn test_detached_engine_fails_on_fresh_export() {
    let tmp = TempDir::new().unwrap();
    let config = base_config(&tmp);
    let result = RunOrchestrator::new(config, CancelFlag::new())
        .run(&mut DetachedEngine, &TestProgress::new());
    assert!(result.is_err());
}

#[test]
fn test_detached_engine_resumes_finished_run() {
    let tmp = TempDir::new().unwrap();
    let config = base_config(&tmp);

    let mut engine = ScriptedEngine::default();
    run(config.clone(), &mut engine, &TestProgress::new());

    let outcome = RunOrchestrator::new(config, CancelFlag::new())
        .run(&mut DetachedEngine, &TestProgress::new())
        .unwrap();
    match outcome {
        RunOutcome::Completed(report) => {
            assert_eq!(report.generated, 0);
            assert_eq!(report.skipped, 4);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
