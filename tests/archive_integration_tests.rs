//! Integration tests for ZIP packaging and upload staging.

mod common;

use std::fs::File;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use common::TestProgress;
use gridbin::models::{RunConfig, RunState};
use gridbin::services::naming::variant_folder;
use gridbin::services::{ArchivePackager, VariantSpace};

fn config_for(root: &TempDir) -> RunConfig {
    let mut config = RunConfig::default();
    config.export_root = Utf8PathBuf::try_from(root.path().to_path_buf()).unwrap();
    config.x_start = 1;
    config.x_end = 2;
    config.y_start = 1;
    config.y_end = 1;
    config.z_start = 6;
    config.z_step = 6;
    config.z_end = 12;
    config.wall_widths = vec![1.2];
    config.divisions_start = 1;
    config.divisions_end = 1;
    config
}

fn seed_meshes(state: &RunState, names: &[&str]) {
    let folder = variant_folder(&state.export_folder, 1.2, 1);
    std::fs::create_dir_all(&folder).unwrap();
    for name in names {
        std::fs::write(folder.join(name), b"solid\n").unwrap();
    }
}

fn zip_entries(path: &Utf8PathBuf) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path.as_std_path()).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_archives_grouped_by_height() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_for(&tmp);
    config.create_zip = true;
    let state = RunState::new(config.export_root.join("run"));
    seed_meshes(
        &state,
        &[
            "gfbin1.2_01x01x06_w1.2d01.stl",
            "gfbin1.2_02x01x06_w1.2d01.stl",
            "gfbin1.2_01x01x12_w1.2d01.stl",
        ],
    );

    let space = VariantSpace::new(&config);
    let packager = ArchivePackager::new(&config, &state);
    let (written, expected) = packager.run(&space, &TestProgress::new());
    assert_eq!(written, 2);
    assert_eq!(expected, 2);

    let z06 = state.zip_folder().join("Gridfinity_Bin1.2_Z06WW1.2_D01.zip");
    let z12 = state.zip_folder().join("Gridfinity_Bin1.2_Z12WW1.2_D01.zip");
    assert_eq!(
        zip_entries(&z06),
        vec![
            "gfbin1.2_01x01x06_w1.2d01.stl".to_string(),
            "gfbin1.2_02x01x06_w1.2d01.stl".to_string(),
        ]
    );
    assert_eq!(
        zip_entries(&z12),
        vec!["gfbin1.2_01x01x12_w1.2d01.stl".to_string()]
    );
}

#[test]
fn test_height_without_meshes_still_gets_empty_archive() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_for(&tmp);
    config.create_zip = true;
    let state = RunState::new(config.export_root.join("run"));
    // only z=06 meshes exist; the z=12 archive is written empty
    seed_meshes(&state, &["gfbin1.2_01x01x06_w1.2d01.stl"]);

    let space = VariantSpace::new(&config);
    let packager = ArchivePackager::new(&config, &state);
    let (written, expected) = packager.run(&space, &TestProgress::new());
    assert_eq!(written, 2);
    assert_eq!(expected, 2);

    let z12 = state.zip_folder().join("Gridfinity_Bin1.2_Z12WW1.2_D01.zip");
    assert!(zip_entries(&z12).is_empty());
}

#[test]
fn test_missing_source_folder_yields_no_archives() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_for(&tmp);
    config.create_zip = true;
    let state = RunState::new(config.export_root.join("run"));

    let space = VariantSpace::new(&config);
    let packager = ArchivePackager::new(&config, &state);
    let (written, expected) = packager.run(&space, &TestProgress::new());
    assert_eq!(written, 0);
    assert_eq!(expected, 2);
    assert!(!state.zip_folder().exists());
}

#[test]
fn test_non_mesh_files_are_not_packaged() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_for(&tmp);
    config.create_zip = true;
    config.z_end = 6;
    let state = RunState::new(config.export_root.join("run"));
    seed_meshes(
        &state,
        &[
            "gfbin1.2_01x01x06_w1.2d01.stl",
            "gfbin1.2_01x01x06_w1.2d01.step",
            "notes.txt",
        ],
    );

    let space = VariantSpace::new(&config);
    let packager = ArchivePackager::new(&config, &state);
    let (written, _) = packager.run(&space, &TestProgress::new());
    assert_eq!(written, 1);

    let z06 = state.zip_folder().join("Gridfinity_Bin1.2_Z06WW1.2_D01.zip");
    assert_eq!(
        zip_entries(&z06),
        vec!["gfbin1.2_01x01x06_w1.2d01.stl".to_string()]
    );
}

#[test]
fn test_upload_staging_copies_small_bins_only() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_for(&tmp);
    config.copy_upload_worthy = true;
    let state = RunState::new(config.export_root.join("run"));
    seed_meshes(
        &state,
        &[
            "gfbin1.2_01x01x06_w1.2d01.stl",
            "gfbin1.2_06x02x12_w1.2d01.stl",
            "gfbin1.2_07x01x06_w1.2d01.stl",
            "gfbin1.2_01x08x06_w1.2d01.stl",
        ],
    );

    let space = VariantSpace::new(&config);
    let packager = ArchivePackager::new(&config, &state);
    let (written, expected) = packager.run(&space, &TestProgress::new());
    // staging mode produces no archives
    assert_eq!((written, expected), (0, 0));
    assert!(!state.zip_folder().exists());

    let target = variant_folder(&state.upload_folder(), 1.2, 1);
    let mut staged: Vec<String> = std::fs::read_dir(target.as_std_path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    staged.sort();
    assert_eq!(
        staged,
        vec![
            "gfbin1.2_01x01x06_w1.2d01.stl".to_string(),
            "gfbin1.2_06x02x12_w1.2d01.stl".to_string(),
        ]
    );
}

#[test]
fn test_cancelled_packaging_stops_early() {
    let tmp = TempDir::new().unwrap();
    let mut config = config_for(&tmp);
    config.create_zip = true;
    let state = RunState::new(config.export_root.join("run"));
    seed_meshes(&state, &["gfbin1.2_01x01x06_w1.2d01.stl"]);

    let progress = TestProgress::new();
    progress.cancel();
    let space = VariantSpace::new(&config);
    let packager = ArchivePackager::new(&config, &state);
    let (written, _) = packager.run(&space, &progress);
    assert_eq!(written, 0);
}
