/*!
 * Unit tests for file system utilities
 */

use std::time::Duration;

use doctrans::file_utils::FileManager;

use crate::common;

#[test]
fn test_generateOutputPath_shouldPrefixOriginalFilename() {
    let path = FileManager::generate_output_path("/data/out", "report.docx");
    assert_eq!(path.to_string_lossy(), "/data/out/translated_report.docx");
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested).unwrap();
    assert!(FileManager::dir_exists(&nested));
}

#[test]
fn test_scratchDir_shouldNamespaceByJobId() {
    let dir = common::create_temp_dir().unwrap();

    let scratch = FileManager::scratch_dir(dir.path(), "job-42").unwrap();
    let name = scratch
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    assert!(name.starts_with("job-job-42-"));
    assert!(FileManager::dir_exists(scratch.path()));

    let path = scratch.path().to_path_buf();
    drop(scratch);
    assert!(!path.exists());
}

#[test]
fn test_scratchDir_shouldKeepConcurrentJobsApart() {
    let dir = common::create_temp_dir().unwrap();

    let first = FileManager::scratch_dir(dir.path(), "job-a").unwrap();
    let second = FileManager::scratch_dir(dir.path(), "job-b").unwrap();

    assert_ne!(first.path(), second.path());
}

#[test]
fn test_findDocuments_shouldOnlyMatchDocxFiles() {
    let dir = common::create_temp_dir().unwrap();
    std::fs::write(dir.path().join("one.docx"), b"x").unwrap();
    std::fs::write(dir.path().join("two.DOCX"), b"x").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

    let mut found = FileManager::find_documents(dir.path()).unwrap();
    found.sort();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| {
        p.extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case("docx"))
            .unwrap_or(false)
    }));
}

#[test]
fn test_cleanupOldFiles_shouldKeepRecentFiles() {
    let dir = common::create_temp_dir().unwrap();
    std::fs::write(dir.path().join("fresh.tmp"), b"x").unwrap();

    let removed =
        FileManager::cleanup_old_files(dir.path(), Duration::from_secs(24 * 60 * 60)).unwrap();

    assert_eq!(removed, 0);
    assert!(dir.path().join("fresh.tmp").exists());
}

#[test]
fn test_cleanupOldFiles_shouldRemoveStaleFiles() {
    let dir = common::create_temp_dir().unwrap();
    std::fs::write(dir.path().join("stale.tmp"), b"x").unwrap();

    // A zero max-age makes every existing file stale
    let removed = FileManager::cleanup_old_files(dir.path(), Duration::from_secs(0)).unwrap();

    assert_eq!(removed, 1);
    assert!(!dir.path().join("stale.tmp").exists());
}

#[test]
fn test_cleanupOldFiles_shouldHandleMissingDirectory() {
    let dir = common::create_temp_dir().unwrap();
    let missing = dir.path().join("never-created");

    let removed = FileManager::cleanup_old_files(&missing, Duration::from_secs(60)).unwrap();
    assert_eq!(removed, 0);
}

#[test]
fn test_copyFile_shouldCreateTargetDirectory() {
    let dir = common::create_temp_dir().unwrap();
    let source = dir.path().join("source.bin");
    std::fs::write(&source, b"payload").unwrap();

    let target = dir.path().join("nested").join("copy.bin");
    FileManager::copy_file(&source, &target).unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), b"payload");
}

#[test]
fn test_copyFile_shouldFailForMissingSource() {
    let dir = common::create_temp_dir().unwrap();
    let result = FileManager::copy_file(dir.path().join("absent.bin"), dir.path().join("c.bin"));
    assert!(result.is_err());
}
