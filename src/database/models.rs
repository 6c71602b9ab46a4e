/*!
 * Job entity models and DTOs.
 *
 * These structures map directly to database rows and define the external
 * JSON shapes used for status polling and history listing.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Translation job status enumeration
///
/// Transitions only ever move forward:
/// `pending -> processing -> {completed, failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job created, not yet picked up by a worker
    Pending,
    /// A worker is translating the document
    Processing,
    /// Translated document written and recorded
    Completed,
    /// Unrecoverable error occurred
    Failed,
}

impl JobStatus {
    /// True for states no transition leaves
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether moving to `next` is a legal forward transition
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match self {
            JobStatus::Pending => next == JobStatus::Processing,
            JobStatus::Processing => {
                next == JobStatus::Completed || next == JobStatus::Failed
            }
            JobStatus::Completed | JobStatus::Failed => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// Translation job record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique job identifier (UUID)
    pub id: String,
    /// Filename as provided by the client
    pub original_filename: String,
    /// Path to the source document
    pub file_path: String,
    /// Path to the translated document, once completed
    pub translated_file_path: Option<String>,
    /// Current job status
    pub status: JobStatus,
    /// Completion percentage (0.0 - 100.0)
    pub progress: f64,
    /// Human-readable status message
    pub message: Option<String>,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
}

impl JobRecord {
    /// Create a new pending job record
    pub fn new(
        original_filename: String,
        file_path: String,
        source_language: String,
        target_language: String,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_filename,
            file_path,
            translated_file_path: None,
            status: JobStatus::Pending,
            progress: 0.0,
            message: None,
            source_language,
            target_language,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The status-polling view of this record
    pub fn status_view(&self) -> JobStatusView {
        JobStatusView {
            status: self.status,
            progress: self.progress,
            message: self.message.clone(),
        }
    }

    /// The history-listing view of this record
    pub fn history_entry(&self) -> JobHistoryEntry {
        JobHistoryEntry {
            id: self.id.clone(),
            original_filename: self.original_filename.clone(),
            status: self.status,
            progress: self.progress,
            created_at: self.created_at.clone(),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
        }
    }
}

/// Partial update applied to a job record in one atomic write
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    /// New status, if changing
    pub status: Option<JobStatus>,
    /// New progress value, if changing
    pub progress: Option<f64>,
    /// New status message, if changing
    pub message: Option<String>,
    /// Output document path, once known
    pub translated_file_path: Option<String>,
}

impl JobUpdate {
    /// Update that only moves the status
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Update that only moves the progress
    pub fn progress(progress: f64) -> Self {
        Self {
            progress: Some(progress),
            ..Default::default()
        }
    }

    /// Attach a progress value
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attach a status message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the output document path
    pub fn with_translated_path(mut self, path: impl Into<String>) -> Self {
        self.translated_file_path = Some(path.into());
        self
    }
}

/// External shape for status polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusView {
    /// Current status
    pub status: JobStatus,
    /// Completion percentage
    pub progress: f64,
    /// Human-readable message
    pub message: Option<String>,
}

/// External shape for history listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHistoryEntry {
    /// Job identifier
    pub id: String,
    /// Filename as provided by the client
    pub original_filename: String,
    /// Current status
    pub status: JobStatus,
    /// Completion percentage
    pub progress: f64,
    /// Creation timestamp
    pub created_at: String,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
}
