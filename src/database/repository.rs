/*!
 * Repository layer for job record operations.
 *
 * This module provides a high-level API for job persistence, abstracting
 * away the SQL details and providing type-safe access. It is the single
 * write path for job state: status-transition and progress invariants are
 * enforced here, under the connection lock, so a polling reader can never
 * observe a job moving backward.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{JobRecord, JobStatus, JobUpdate};
use crate::errors::JobError;

/// Repository for job record operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Insert a new job record
    pub async fn create_job(&self, job: &JobRecord) -> Result<()> {
        let job = job.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO jobs (
                        id, original_filename, file_path, translated_file_path,
                        status, progress, message, source_language, target_language,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    "#,
                    params![
                        job.id,
                        job.original_filename,
                        job.file_path,
                        job.translated_file_path,
                        job.status.to_string(),
                        job.progress,
                        job.message,
                        job.source_language,
                        job.target_language,
                        job.created_at,
                        job.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: &str) -> Result<Option<JobRecord>> {
        let job_id = job_id.to_string();

        self.db
            .execute_async(move |conn| Self::get_job_sync(conn, &job_id))
            .await
    }

    /// Get a job by ID (synchronous version for use under the connection lock)
    fn get_job_sync(conn: &Connection, job_id: &str) -> Result<Option<JobRecord>> {
        let result = conn
            .query_row(
                r#"
                SELECT id, original_filename, file_path, translated_file_path,
                       status, progress, message, source_language, target_language,
                       created_at, updated_at
                FROM jobs WHERE id = ?1
                "#,
                [job_id],
                Self::map_job_row,
            )
            .optional()?;

        Ok(result)
    }

    /// Apply a partial update to a job in one atomic write.
    ///
    /// Enforces the job-state invariants at the single write point:
    /// terminal states are never overwritten, status only moves forward,
    /// and progress never decreases within a run. Returns `Ok(true)` when
    /// the update was applied, `Ok(false)` when it was skipped by a guard.
    pub async fn apply_update(&self, job_id: &str, update: JobUpdate) -> Result<bool> {
        let job_id = job_id.to_string();

        self.db
            .execute_async(move |conn| {
                let current = Self::get_job_sync(conn, &job_id)?
                    .ok_or_else(|| JobError::NotFound(job_id.clone()))?;

                if current.status.is_terminal() {
                    debug!(
                        "Ignoring update for job {} in terminal state {}",
                        job_id, current.status
                    );
                    return Ok(false);
                }

                if let Some(next) = update.status {
                    if !current.status.can_transition_to(next) {
                        debug!(
                            "Ignoring illegal transition {} -> {} for job {}",
                            current.status, next, job_id
                        );
                        return Ok(false);
                    }
                }

                // Progress never moves backward within a run
                let progress = update.progress.filter(|p| *p >= current.progress);

                let now = chrono::Utc::now().to_rfc3339();
                conn.execute(
                    r#"
                    UPDATE jobs SET
                        status = COALESCE(?2, status),
                        progress = COALESCE(?3, progress),
                        message = COALESCE(?4, message),
                        translated_file_path = COALESCE(?5, translated_file_path),
                        updated_at = ?6
                    WHERE id = ?1
                    "#,
                    params![
                        job_id,
                        update.status.map(|s| s.to_string()),
                        progress,
                        update.message,
                        update.translated_file_path,
                        now,
                    ],
                )?;

                Ok(true)
            })
            .await
    }

    /// List all jobs, newest first
    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, original_filename, file_path, translated_file_path,
                           status, progress, message, source_language, target_language,
                           created_at, updated_at
                    FROM jobs
                    ORDER BY created_at DESC
                    "#,
                )?;

                let jobs = stmt
                    .query_map([], Self::map_job_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(jobs)
            })
            .await
    }

    /// Map a SELECT row to a job record
    fn map_job_row(row: &rusqlite::Row<'_>) -> std::result::Result<JobRecord, rusqlite::Error> {
        Ok(JobRecord {
            id: row.get(0)?,
            original_filename: row.get(1)?,
            file_path: row.get(2)?,
            translated_file_path: row.get(3)?,
            status: row
                .get::<_, String>(4)?
                .parse()
                .unwrap_or(JobStatus::Pending),
            progress: row.get(5)?,
            message: row.get(6)?,
            source_language: row.get(7)?,
            target_language: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}
