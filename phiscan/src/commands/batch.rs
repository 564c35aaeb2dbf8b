//! `phiscan batch`: analyse every `.txt` document in a directory.
//!
//! Documents are processed by a bounded set of tokio tasks. Within a document,
//! structured detection and recognition run on separate blocking threads and
//! the recognizer is given a deadline; when it expires the document is
//! reported with structured matches only. A timed-out recognizer call keeps
//! its slot until it really returns, so at most `jobs` recognizer calls are
//! ever running. Each report is appended to the violations log as soon as it
//! is ready.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info, warn};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task;
use tokio::time::timeout;

use phiscan_core::{DocumentReport, JsonlSink, PhiEngine, Recognition, RecognizerStatus, ReportSink};

use crate::cli::BatchCommand;
use crate::commands::build_engine;
use crate::ui::output_format;
use crate::ui::report_view::verdict_line;
use crate::ui::theme::ThemeMap;
use crate::utils::cleanup::clean_text;
use crate::utils::paths::{default_log_path, document_name, list_text_documents};

/// Counts reported once the batch is finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub scanned: usize,
    pub with_phi: usize,
    pub failed: usize,
}

/// Per-document settings shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct WorkerOptions {
    pub recognizer_deadline: Duration,
    pub raw: bool,
}

/// Analyses one document and appends its report to the sink.
///
/// Only I/O and sink failures are errors; a slow or failing recognizer only
/// degrades the report.
pub async fn process_document(
    engine: Arc<PhiEngine>,
    sink: Arc<dyn ReportSink>,
    recognizer_slots: Arc<Semaphore>,
    path: PathBuf,
    options: WorkerOptions,
) -> Result<DocumentReport> {
    let document = document_name(&path);

    let read_path = path.clone();
    let text: Arc<str> = task::spawn_blocking(move || std::fs::read_to_string(&read_path))
        .await
        .map_err(|e| anyhow!("Reader task for '{}' failed: {}", document, e))?
        .with_context(|| format!("Failed to read {}", path.display()))
        .map(|raw| if options.raw { raw } else { clean_text(&raw) })?
        .into();

    let structured_task = {
        let engine = Arc::clone(&engine);
        let text = Arc::clone(&text);
        task::spawn_blocking(move || engine.detect_structured(&text))
    };
    let recognizer_task = {
        let engine = Arc::clone(&engine);
        let text = Arc::clone(&text);
        async move {
            // Waiting for a slot counts against the deadline.
            let slot = recognizer_slots.acquire_owned().await.ok()?;
            Some(task::spawn_blocking(move || recognize_in_slot(&engine, &text, slot)).await)
        }
    };

    let (structured, recognition) = tokio::join!(
        structured_task,
        timeout(options.recognizer_deadline, recognizer_task)
    );

    let structured = structured.map_err(|e| anyhow!("Pattern detection for '{}' failed: {}", document, e))?;
    let recognition = match recognition {
        Ok(Some(Ok(recognition))) => recognition,
        Ok(None) => {
            warn!("Recognizer pool closed before '{}'; using structured patterns only.", document);
            Recognition::degraded(RecognizerStatus::Failed)
        }
        Ok(Some(Err(e))) => {
            warn!("Recognizer task for '{}' failed: {}; using structured patterns only.", document, e);
            Recognition::degraded(RecognizerStatus::Failed)
        }
        Err(_) => {
            // A started call keeps running and keeps its slot; its result is discarded.
            warn!(
                "Recognizer exceeded {:?} on '{}'; using structured patterns only.",
                options.recognizer_deadline, document
            );
            Recognition::degraded(RecognizerStatus::TimedOut)
        }
    };

    let report = engine.assemble(&text, structured, recognition);

    let record = report.clone();
    let name = document.clone();
    task::spawn_blocking(move || sink.append(&name, &record))
        .await
        .map_err(|e| anyhow!("Sink task for '{}' failed: {}", document, e))??;

    debug!("Finished '{}'.", document);
    Ok(report)
}

/// Runs the recognizer while holding `slot`; the slot is released only when
/// the call returns, even if the waiting document has already timed out.
fn recognize_in_slot(engine: &PhiEngine, text: &str, slot: OwnedSemaphorePermit) -> Recognition {
    let recognition = engine.recognize(text);
    drop(slot);
    recognition
}

/// Runs every document through the engine with at most `jobs` in flight.
///
/// Results are returned in document order, whatever order they finish in.
pub async fn run_documents(
    engine: Arc<PhiEngine>,
    sink: Arc<dyn ReportSink>,
    documents: Vec<PathBuf>,
    jobs: usize,
    options: WorkerOptions,
) -> Vec<(String, Result<DocumentReport>)> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let recognizer_slots = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(documents.len());

    for path in documents {
        let engine = Arc::clone(&engine);
        let sink = Arc::clone(&sink);
        let semaphore = Arc::clone(&semaphore);
        let recognizer_slots = Arc::clone(&recognizer_slots);
        let name = document_name(&path);
        let handle = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| anyhow!("Worker pool closed"))?;
            process_document(engine, sink, recognizer_slots, path, options).await
        });
        handles.push((name, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(anyhow!("Worker for '{}' panicked: {}", name, e)),
        };
        results.push((name, outcome));
    }
    results
}

fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn resolve_log_path(cmd: &BatchCommand) -> Result<PathBuf> {
    match &cmd.log {
        Some(path) => Ok(path.clone()),
        None => default_log_path(),
    }
}

/// Entry point for `phiscan batch`.
pub async fn run_batch(cmd: &BatchCommand, theme: &ThemeMap, quiet: bool) -> Result<BatchSummary> {
    let documents = list_text_documents(&cmd.dir)?;
    let stderr_supports_color = std::io::stderr().is_terminal();

    if documents.is_empty() {
        if !quiet {
            let _ = output_format::print_warn_message(
                &mut std::io::stderr(),
                &format!("No .txt documents found in {}", cmd.dir.display()),
                theme,
                stderr_supports_color,
            );
        }
        return Ok(BatchSummary::default());
    }

    let engine = Arc::new(build_engine(&cmd.engine)?);
    let log_path = resolve_log_path(cmd)?;
    let sink: Arc<dyn ReportSink> = Arc::new(JsonlSink::new(&log_path)?);
    let jobs = cmd.jobs.unwrap_or_else(default_jobs);
    let options = WorkerOptions {
        recognizer_deadline: Duration::from_secs(cmd.timeout_secs),
        raw: cmd.raw,
    };

    info!(
        "Scanning {} document(s) from {} with {} worker(s); run id {}.",
        documents.len(),
        cmd.dir.display(),
        jobs,
        engine.run_id()
    );

    let results = run_documents(engine, sink, documents, jobs, options).await;
    let summary = print_results(&results, &log_path, theme, quiet, stderr_supports_color);
    Ok(summary)
}

fn print_results(
    results: &[(String, Result<DocumentReport>)],
    log_path: &Path,
    theme: &ThemeMap,
    quiet: bool,
    stderr_supports_color: bool,
) -> BatchSummary {
    let stdout_supports_color = std::io::stdout().is_terminal();
    let mut summary = BatchSummary::default();

    for (document, outcome) in results {
        summary.scanned += 1;
        match outcome {
            Ok(report) => {
                if report.binary_phi {
                    summary.with_phi += 1;
                }
                println!("{}", verdict_line(document, report, theme, stdout_supports_color));
            }
            Err(e) => {
                summary.failed += 1;
                let _ = output_format::print_error_message(
                    &mut std::io::stderr(),
                    &format!("{}: {:#}", document, e),
                    theme,
                    stderr_supports_color,
                );
            }
        }
    }

    if !quiet {
        let msg = format!(
            "Scanned {} document(s): {} with PHI, {} failed. Log: {}",
            summary.scanned,
            summary.with_phi,
            summary.failed,
            log_path.display()
        );
        let mut stderr = std::io::stderr();
        let _ = if summary.failed == 0 {
            output_format::print_success_message(&mut stderr, &msg, theme, stderr_supports_color)
        } else {
            output_format::print_warn_message(&mut stderr, &msg, theme, stderr_supports_color)
        };
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use phiscan_core::{Candidate, DetectionConfig, EntityRecognizer, PhiscanError, RecognizerError};

    struct SlowRecognizer(Duration);

    impl EntityRecognizer for SlowRecognizer {
        fn name(&self) -> &str {
            "slow"
        }

        fn detect(&self, _text: &str) -> Result<Vec<Candidate>, RecognizerError> {
            std::thread::sleep(self.0);
            Ok(vec![Candidate::new("Dr. Alan Green", "PERSON", 0.99)])
        }
    }

    /// Sleeps in `detect` and records the most calls ever running at once.
    #[derive(Default)]
    struct CountingRecognizer {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl EntityRecognizer for CountingRecognizer {
        fn name(&self) -> &str {
            "counting"
        }

        fn detect(&self, _text: &str) -> Result<Vec<Candidate>, RecognizerError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(200));
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn append(&self, document: &str, _report: &DocumentReport) -> Result<(), PhiscanError> {
            Err(PhiscanError::SinkWriteFailure(document.to_string(), "disk full".to_string()))
        }
    }

    fn engine(recognizer: Option<Arc<dyn EntityRecognizer>>) -> Arc<PhiEngine> {
        let config = DetectionConfig::load_default_rules().unwrap();
        Arc::new(PhiEngine::new(&config, recognizer).unwrap())
    }

    fn write_docs(dir: &Path, docs: &[(&str, &str)]) -> Vec<PathBuf> {
        docs.iter()
            .map(|(name, text)| {
                let path = dir.join(name);
                std::fs::write(&path, text).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn slow_recognizer_times_out_but_patterns_survive() {
        let dir = tempfile::tempdir().unwrap();
        let docs = write_docs(dir.path(), &[("a.txt", "Dr. Alan Green SSN 123-45-6789")]);
        let sink: Arc<dyn ReportSink> = Arc::new(JsonlSink::new(dir.path().join("v.log")).unwrap());
        let slow: Arc<dyn EntityRecognizer> = Arc::new(SlowRecognizer(Duration::from_millis(500)));
        let options = WorkerOptions { recognizer_deadline: Duration::from_millis(20), raw: false };

        let results = run_documents(engine(Some(slow)), sink, docs, 2, options).await;
        let report = results[0].1.as_ref().unwrap();
        assert_eq!(report.recognizer, RecognizerStatus::TimedOut);
        assert!(report.binary_phi);
        assert!(report.grouped_entities.get(phiscan_core::PhiLabel::Person).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn timed_out_calls_still_count_against_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..6).map(|i| format!("{}.txt", i)).collect();
        let docs: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "SSN 123-45-6789")).collect();
        let docs = write_docs(dir.path(), &docs);
        let sink: Arc<dyn ReportSink> = Arc::new(JsonlSink::new(dir.path().join("v.log")).unwrap());
        let counting = Arc::new(CountingRecognizer::default());
        let handle: Arc<dyn EntityRecognizer> = counting.clone();
        let options = WorkerOptions { recognizer_deadline: Duration::from_millis(10), raw: false };

        let results = run_documents(engine(Some(handle)), sink, docs, 1, options).await;

        assert_eq!(results.len(), 6);
        for (_, outcome) in &results {
            assert_eq!(outcome.as_ref().unwrap().recognizer, RecognizerStatus::TimedOut);
        }
        assert!(counting.peak.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test]
    async fn results_keep_document_order_and_sink_gets_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let docs = write_docs(
            dir.path(),
            &[("a.txt", "SSN 123-45-6789"), ("b.txt", "nothing"), ("c.txt", "a@b.com")],
        );
        let log = dir.path().join("v.log");
        let sink: Arc<dyn ReportSink> = Arc::new(JsonlSink::new(&log).unwrap());
        let options = WorkerOptions { recognizer_deadline: Duration::from_secs(5), raw: false };

        let results = run_documents(engine(None), sink, docs, 3, options).await;
        let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        assert!(!results[1].1.as_ref().unwrap().binary_phi);
        assert_eq!(std::fs::read_to_string(&log).unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn sink_failure_fails_only_that_document() {
        let dir = tempfile::tempdir().unwrap();
        let docs = write_docs(dir.path(), &[("a.txt", "SSN 123-45-6789")]);
        let options = WorkerOptions { recognizer_deadline: Duration::from_secs(5), raw: false };

        let results = run_documents(engine(None), Arc::new(FailingSink), docs, 1, options).await;
        let err = results[0].1.as_ref().unwrap_err();
        assert!(format!("{:#}", err).contains("disk full"));
    }
}
