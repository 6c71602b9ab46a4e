/*!
 * Unit tests for the job processing worker
 */

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use doctrans::database::{JobRecord, JobStatus, Repository};
use doctrans::translation::Translator;
use doctrans::worker::{CancelFlag, JobEvent, JobWorker};

use crate::common::{self, mock_translators::RecordingTranslator};

/// Create a pending job for the given document
async fn create_job(repository: &Repository, input: &Path, target: &str) -> JobRecord {
    let job = JobRecord::new(
        input.file_name().unwrap().to_string_lossy().into_owned(),
        input.to_string_lossy().into_owned(),
        "en".to_string(),
        target.to_string(),
    );
    repository.create_job(&job).await.unwrap();
    job
}

/// Run the processing loop directly and collect the emitted events
async fn run_and_collect(worker: &JobWorker, job_id: &str) -> Vec<JobEvent> {
    let (events, mut receiver) = mpsc::unbounded_channel();
    let cancel = CancelFlag::new();

    worker.process(job_id, &events, &cancel).await;
    drop(events);

    let mut collected = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        collected.push(event);
    }
    collected
}

fn progress_values(events: &[JobEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_process_shouldEmitExactProgressSequence() {
    let dir = common::create_temp_dir().unwrap();
    let input =
        common::create_simple_docx(dir.path(), "input.docx", &["one", "two", "three", "four"])
            .unwrap();

    let repository = Repository::new_in_memory().unwrap();
    let job = create_job(&repository, &input, "es").await;

    let translator = Arc::new(RecordingTranslator::working());
    let worker = JobWorker::new(
        repository.clone(),
        translator as Arc<dyn Translator>,
        dir.path().join("work"),
        dir.path().join("out"),
    );

    let events = run_and_collect(&worker, &job.id).await;

    assert_eq!(events.first(), Some(&JobEvent::Started));
    assert!(matches!(events.last(), Some(JobEvent::Completed { .. })));

    let expected: Vec<f64> = (1..=4).map(|i| i as f64 / 4.0 * 100.0).collect();
    assert_eq!(progress_values(&events), expected);
    assert_eq!(progress_values(&events).last(), Some(&100.0));
}

#[tokio::test]
async fn test_spawn_shouldCompleteJobAndWriteOutput() {
    let dir = common::create_temp_dir().unwrap();
    let media = b"media payload".as_slice();
    let input = common::create_test_docx(
        dir.path(),
        "report.docx",
        &common::document_xml(&["Hello world", "Second paragraph"]),
        &[("word/media/image1.png", media)],
    )
    .unwrap();

    let repository = Repository::new_in_memory().unwrap();
    let job = create_job(&repository, &input, "es").await;

    let work_dir = dir.path().join("work");
    let output_dir = dir.path().join("out");
    let translator = Arc::new(RecordingTranslator::working());
    let worker = JobWorker::new(
        repository.clone(),
        translator as Arc<dyn Translator>,
        &work_dir,
        &output_dir,
    );

    worker.spawn(&job.id).await_completion().await.unwrap();

    let finished = repository.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.progress, 100.0);
    assert!(finished
        .message
        .as_deref()
        .unwrap()
        .contains("completed successfully"));

    let output_path = finished.translated_file_path.expect("output path recorded");
    assert_eq!(
        output_path,
        output_dir
            .join("translated_report.docx")
            .to_string_lossy()
            .into_owned()
    );
    assert!(Path::new(&output_path).exists());

    // Pass-through parts survive byte-for-byte; the body is translated
    assert_eq!(
        common::archive_entry_bytes(Path::new(&output_path), "word/media/image1.png").unwrap(),
        media
    );
    let body = String::from_utf8(
        common::archive_entry_bytes(Path::new(&output_path), "word/document.xml").unwrap(),
    )
    .unwrap();
    assert!(body.contains("[es] Hello world"));
    assert!(body.contains("[es] Second paragraph"));

    // The scratch area is gone once the run is over
    let leftovers: Vec<_> = std::fs::read_dir(&work_dir)
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_process_shouldSkipWhitespaceOnlyNodes() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_simple_docx(
        dir.path(),
        "input.docx",
        &["Hello", "   ", "", "World"],
    )
    .unwrap();

    let repository = Repository::new_in_memory().unwrap();
    let job = create_job(&repository, &input, "fr").await;

    let translator = Arc::new(RecordingTranslator::working());
    let worker = JobWorker::new(
        repository.clone(),
        Arc::clone(&translator) as Arc<dyn Translator>,
        dir.path().join("work"),
        dir.path().join("out"),
    );

    let events = run_and_collect(&worker, &job.id).await;

    // Only real text reaches the translator
    assert_eq!(translator.calls(), vec!["Hello".to_string(), "World".to_string()]);

    // Whitespace-only nodes still advance the denominator
    let expected: Vec<f64> = (1..=4).map(|i| i as f64 / 4.0 * 100.0).collect();
    assert_eq!(progress_values(&events), expected);
    assert!(matches!(events.last(), Some(JobEvent::Completed { .. })));
}

#[tokio::test]
async fn test_spawn_shouldFailJobOnTranslationError() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_simple_docx(
        dir.path(),
        "input.docx",
        &["one", "two", "three", "four", "five"],
    )
    .unwrap();

    let repository = Repository::new_in_memory().unwrap();
    let job = create_job(&repository, &input, "es").await;

    let work_dir = dir.path().join("work");
    let output_dir = dir.path().join("out");
    let translator = Arc::new(RecordingTranslator::failing_on_call(3));
    let worker = JobWorker::new(
        repository.clone(),
        Arc::clone(&translator) as Arc<dyn Translator>,
        &work_dir,
        &output_dir,
    );

    worker.spawn(&job.id).await_completion().await.unwrap();

    let finished = repository.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Failed);
    assert!(finished.message.as_deref().unwrap().contains("Translation failed"));

    // Progress reflects the two nodes that finished before the failure
    assert_eq!(finished.progress, 2.0 / 5.0 * 100.0);

    // No output artifact is produced or referenced
    assert!(finished.translated_file_path.is_none());
    assert!(!output_dir.exists() || std::fs::read_dir(&output_dir).unwrap().next().is_none());

    // The scratch area is released on failure too
    let leftovers: Vec<_> = std::fs::read_dir(&work_dir)
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_process_shouldCompleteEmptyDocumentImmediately() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_simple_docx(dir.path(), "empty.docx", &[]).unwrap();

    let repository = Repository::new_in_memory().unwrap();
    let job = create_job(&repository, &input, "es").await;

    let translator = Arc::new(RecordingTranslator::working());
    let worker = JobWorker::new(
        repository.clone(),
        Arc::clone(&translator) as Arc<dyn Translator>,
        dir.path().join("work"),
        dir.path().join("out"),
    );

    worker.spawn(&job.id).await_completion().await.unwrap();

    let finished = repository.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.progress, 100.0);
    assert!(translator.calls().is_empty());

    // The output decompresses to the same entry set as the input
    let output = finished.translated_file_path.unwrap();
    let mut input_names = common::archive_entry_names(&input).unwrap();
    let mut output_names = common::archive_entry_names(Path::new(&output)).unwrap();
    input_names.sort();
    output_names.sort();
    assert_eq!(input_names, output_names);
}

#[tokio::test]
async fn test_process_shouldDoNothingForUnknownJob() {
    let dir = common::create_temp_dir().unwrap();
    let repository = Repository::new_in_memory().unwrap();

    let translator = Arc::new(RecordingTranslator::working());
    let worker = JobWorker::new(
        repository.clone(),
        translator as Arc<dyn Translator>,
        dir.path().join("work"),
        dir.path().join("out"),
    );

    let events = run_and_collect(&worker, "no-such-job").await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_cancel_shouldFailJobWithDistinctMessage() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_simple_docx(dir.path(), "input.docx", &["text"]).unwrap();

    let repository = Repository::new_in_memory().unwrap();
    let job = create_job(&repository, &input, "es").await;

    let translator = Arc::new(RecordingTranslator::working());
    let worker = JobWorker::new(
        repository.clone(),
        Arc::clone(&translator) as Arc<dyn Translator>,
        dir.path().join("work"),
        dir.path().join("out"),
    );

    // Cancellation is checked between node iterations
    let (events, mut receiver) = mpsc::unbounded_channel();
    let cancel = CancelFlag::new();
    cancel.cancel();
    worker.process(&job.id, &events, &cancel).await;
    drop(events);

    let mut collected = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        collected.push(event);
    }

    assert_eq!(collected.first(), Some(&JobEvent::Started));
    assert_eq!(
        collected.last(),
        Some(&JobEvent::Failed {
            message: "Job was cancelled".to_string()
        })
    );
    assert!(translator.calls().is_empty());
}
