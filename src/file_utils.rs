use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a translated document
    // @params: output_dir, original_filename
    pub fn generate_output_path<P: AsRef<Path>>(output_dir: P, original_filename: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("translated_{}", original_filename))
    }

    /// Create a job-scoped scratch directory under the given work directory.
    ///
    /// The directory name carries the job identifier so concurrently running
    /// jobs never collide, and the returned `TempDir` removes the directory
    /// on drop - on success, failure, and cancellation alike.
    pub fn scratch_dir<P: AsRef<Path>>(work_dir: P, job_id: &str) -> Result<TempDir> {
        Self::ensure_dir(work_dir.as_ref())?;

        tempfile::Builder::new()
            .prefix(&format!("job-{}-", job_id))
            .tempdir_in(work_dir.as_ref())
            .with_context(|| format!("Failed to create scratch directory for job {}", job_id))
    }

    /// Find Word documents in a directory (recursive)
    pub fn find_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case("docx") {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        // Ensure the target directory exists
        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        // Perform the copy
        fs::copy(from, to)?;

        Ok(())
    }

    /// Remove files in a directory that are older than the given age.
    ///
    /// Used to keep the work directory from accumulating abandoned scratch
    /// output; entries that cannot be inspected or removed are skipped.
    pub fn cleanup_old_files<P: AsRef<Path>>(dir: P, max_age: Duration) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(0);
        }

        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut removed = 0;

        for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(_) => continue,
            };

            if modified >= cutoff {
                continue;
            }

            let result = if entry.file_type().is_dir() {
                fs::remove_dir(entry.path())
            } else {
                fs::remove_file(entry.path())
            };

            if result.is_ok() {
                removed += 1;
            }
        }

        Ok(removed)
    }
}
