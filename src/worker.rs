/*!
 * Job processing worker.
 *
 * One worker task processes one job, sequentially, in document order. The
 * loop never touches the job store directly: it emits `JobEvent` messages
 * over a channel, and a single applier task owns every repository write for
 * the job. A polling client and an in-progress worker therefore never share
 * mutable state.
 *
 * Every failure inside the loop is converted to a `failed` status at the
 * loop boundary; the caller of `spawn` never observes an error directly.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::database::{JobRecord, JobStatus, JobUpdate, Repository};
use crate::document_processor::DocxPackage;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::translation::{TranslationRequest, Translator};

/// Status-change messages emitted by the processing loop
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Processing began
    Started,
    /// Fraction of nodes processed, as a percentage
    Progress(f64),
    /// Document translated and the output archive written
    Completed {
        /// Where the translated document was placed
        translated_path: String,
        /// Success message for the job record
        message: String,
    },
    /// Processing aborted; no output artifact exists
    Failed {
        /// Failure description for the job record
        message: String,
    },
}

/// Cooperative cancellation flag, polled between node iterations
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to a spawned processing task
///
/// Makes the job lifecycle explicit: the spawner can cancel, await
/// completion, or drop the handle and let the job run to its end.
pub struct JobHandle {
    job_id: String,
    cancel: CancelFlag,
    task: JoinHandle<()>,
    applier: JoinHandle<()>,
}

impl JobHandle {
    /// Identifier of the job this handle controls
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Request cancellation; the job fails at the next node boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until processing has finished and every status update has been
    /// persisted. Processing outcomes are reported through the job record,
    /// not through this result; it only errors if a task panicked.
    pub async fn await_completion(self) -> anyhow::Result<()> {
        self.task.await.context("Processing task panicked")?;
        self.applier.await.context("Status applier panicked")?;
        Ok(())
    }
}

/// Worker that drives the node translation loop for jobs
#[derive(Clone)]
pub struct JobWorker {
    /// Job record store
    repository: Repository,
    /// Translation capability, substitutable in tests
    translator: Arc<dyn Translator>,
    /// Parent directory for per-job scratch areas
    work_dir: PathBuf,
    /// Directory where translated documents are placed
    output_dir: PathBuf,
}

impl JobWorker {
    /// Create a new worker
    pub fn new(
        repository: Repository,
        translator: Arc<dyn Translator>,
        work_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            translator,
            work_dir: work_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Start processing a job. Returns immediately; job state advances
    /// asynchronously and is observed by polling the job record.
    pub fn spawn(&self, job_id: &str) -> JobHandle {
        let (events, receiver) = mpsc::unbounded_channel();
        let applier = Self::spawn_applier(self.repository.clone(), job_id.to_string(), receiver);

        let cancel = CancelFlag::new();
        let worker = self.clone();
        let flag = cancel.clone();
        let id = job_id.to_string();

        let task = tokio::spawn(async move {
            worker.process(&id, &events, &flag).await;
        });

        JobHandle {
            job_id: job_id.to_string(),
            cancel,
            task,
            applier,
        }
    }

    /// Run the full pipeline for a job, converting every failure into a
    /// status event at this boundary.
    pub async fn process(
        &self,
        job_id: &str,
        events: &mpsc::UnboundedSender<JobEvent>,
        cancel: &CancelFlag,
    ) {
        let job = match self.repository.get_job(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                warn!("Job {} not found, nothing to process", job_id);
                return;
            }
            Err(e) => {
                error!("Failed to load job {}: {}", job_id, e);
                return;
            }
        };

        let _ = events.send(JobEvent::Started);

        match self.translate_document(&job, events, cancel).await {
            Ok(translated_path) => {
                info!("Job {} completed: {:?}", job_id, translated_path);
                let _ = events.send(JobEvent::Completed {
                    translated_path: translated_path.to_string_lossy().into_owned(),
                    message: "Translation completed successfully".to_string(),
                });
            }
            Err(AppError::Cancelled) => {
                warn!("Job {} cancelled", job_id);
                let _ = events.send(JobEvent::Failed {
                    message: "Job was cancelled".to_string(),
                });
            }
            Err(e) => {
                error!("Job {} failed: {}", job_id, e);
                let _ = events.send(JobEvent::Failed {
                    message: format!("Translation failed: {}", e),
                });
            }
        }
    }

    /// The node translation loop (spec'd order: extract, translate node by
    /// node with progress after each, reassemble).
    async fn translate_document(
        &self,
        job: &JobRecord,
        events: &mpsc::UnboundedSender<JobEvent>,
        cancel: &CancelFlag,
    ) -> Result<PathBuf, AppError> {
        // Scratch area lives for exactly this run; removal on drop covers
        // success, failure, and cancellation alike.
        let scratch = FileManager::scratch_dir(&self.work_dir, &job.id)?;

        let mut package = DocxPackage::open(&job.file_path)?;
        let total = package.tree().node_count();
        debug!("Job {}: {} text runs to translate", job.id, total);

        for index in 0..total {
            if cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            if !package.tree().nodes()[index].is_whitespace() {
                let text = package
                    .tree()
                    .node_text(index)
                    .unwrap_or_default()
                    .to_string();

                let request = TranslationRequest::new(
                    text,
                    job.source_language.clone(),
                    job.target_language.clone(),
                );
                let translated = self.translator.translate(&request).await?;
                package.tree_mut().set_node_text(index, translated)?;
            }

            // Skipped nodes still advance the denominator
            let progress = (index + 1) as f64 / total as f64 * 100.0;
            let _ = events.send(JobEvent::Progress(progress));
        }

        // A document with no text runs completes immediately
        if total == 0 {
            let _ = events.send(JobEvent::Progress(100.0));
        }

        // Reassemble in the scratch area first so a failed write never
        // leaves a partial file at the output path.
        let scratch_output = scratch
            .path()
            .join(format!("translated_{}", job.original_filename));
        package.write(&scratch_output)?;

        FileManager::ensure_dir(&self.output_dir)?;
        let output_path = FileManager::generate_output_path(&self.output_dir, &job.original_filename);
        FileManager::copy_file(&scratch_output, &output_path)?;

        Ok(output_path)
    }

    /// Single owner of job-store writes: applies loop events in order.
    fn spawn_applier(
        repository: Repository,
        job_id: String,
        mut receiver: mpsc::UnboundedReceiver<JobEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                let update = match event {
                    JobEvent::Started => {
                        JobUpdate::status(JobStatus::Processing).with_progress(0.0)
                    }
                    JobEvent::Progress(progress) => JobUpdate::progress(progress),
                    JobEvent::Completed {
                        translated_path,
                        message,
                    } => JobUpdate::status(JobStatus::Completed)
                        .with_message(message)
                        .with_translated_path(translated_path),
                    JobEvent::Failed { message } => {
                        JobUpdate::status(JobStatus::Failed).with_message(message)
                    }
                };

                if let Err(e) = repository.apply_update(&job_id, update).await {
                    error!("Failed to persist update for job {}: {}", job_id, e);
                }
            }
        })
    }
}
