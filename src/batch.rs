//! Directory batch processing.
//!
//! Every `*.pdf` directly inside an input directory is run through its own
//! pipeline and written as `<stem>.json` into the output directory. A file
//! that fails is reported and skipped; it never aborts the batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use rayon::prelude::*;

use crate::error::Result;
use crate::render::{to_json, JsonFormat};
use crate::Extractor;

/// Result of processing one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Outline written to `output`
    Written {
        input: PathBuf,
        output: PathBuf,
        headings: usize,
        has_title: bool,
    },
    /// The file could not be processed; nothing was written
    Failed {
        input: PathBuf,
        error: String,
        /// The input itself was unreadable, as opposed to an output failure
        input_error: bool,
    },
}

impl BatchOutcome {
    /// Input file this outcome belongs to.
    pub fn input(&self) -> &Path {
        match self {
            BatchOutcome::Written { input, .. } | BatchOutcome::Failed { input, .. } => input,
        }
    }

    /// Whether the file failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }
}

/// Progress notifications sent while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Discovery finished; `total` files will be processed
    Started { total: usize },
    /// One file finished (in completion order)
    Processed(BatchOutcome),
    /// All files finished
    Finished { succeeded: usize, failed: usize },
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-file outcomes, in input path order
    pub outcomes: Vec<BatchOutcome>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of files written.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Whether any file failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(BatchOutcome::is_failure)
    }

    /// The failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

/// Runs an [`Extractor`] over many files.
pub struct BatchRunner<'a> {
    extractor: &'a Extractor,
    format: JsonFormat,
    events: Option<Sender<BatchEvent>>,
}

impl<'a> BatchRunner<'a> {
    /// Create a runner writing pretty JSON.
    pub fn new(extractor: &'a Extractor) -> Self {
        Self {
            extractor,
            format: JsonFormat::Pretty,
            events: None,
        }
    }

    /// Set the JSON format of output files.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Send progress events to `sender`.
    pub fn with_events(mut self, sender: Sender<BatchEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Process every PDF in `input_dir`, writing results to `output_dir`.
    ///
    /// Fails only if the input directory cannot be listed or the output
    /// directory cannot be created; per-file problems end up in the report.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        let files = discover_pdfs(input_dir)?;
        fs::create_dir_all(output_dir)?;
        Ok(self.run_files(&files, output_dir))
    }

    /// Process the given files, writing results to an existing `output_dir`.
    pub fn run_files(&self, files: &[PathBuf], output_dir: &Path) -> BatchReport {
        let start = Instant::now();
        self.emit(BatchEvent::Started { total: files.len() });
        log::info!("Processing {} file(s) into {}", files.len(), output_dir.display());

        let process = |input: &PathBuf| {
            let outcome = self.process_file(input, output_dir);
            self.emit(BatchEvent::Processed(outcome.clone()));
            outcome
        };

        // Each file gets an independent pipeline run; nothing is shared.
        let outcomes: Vec<BatchOutcome> = if self.extractor.parse_options().parallel {
            files.par_iter().map(process).collect()
        } else {
            files.iter().map(process).collect()
        };

        let report = BatchReport {
            outcomes,
            elapsed: start.elapsed(),
        };
        self.emit(BatchEvent::Finished {
            succeeded: report.succeeded(),
            failed: report.failed(),
        });
        log::info!(
            "Batch finished: {} succeeded, {} failed in {:.2?}",
            report.succeeded(),
            report.failed(),
            report.elapsed
        );
        report
    }

    fn process_file(&self, input: &Path, output_dir: &Path) -> BatchOutcome {
        let output = output_path(output_dir, input);
        let result = self
            .extractor
            .extract_file(input)
            .and_then(|outline| {
                let json = to_json(&outline, self.format)?;
                fs::write(&output, json)?;
                Ok(outline)
            });

        match result {
            Ok(outline) => {
                log::info!(
                    "{} -> {} ({} heading(s))",
                    input.display(),
                    output.display(),
                    outline.headings.len()
                );
                BatchOutcome::Written {
                    input: input.to_path_buf(),
                    output,
                    headings: outline.headings.len(),
                    has_title: outline.title.is_some(),
                }
            }
            Err(e) => {
                let input_error = e.is_input_error();
                if input_error {
                    log::warn!("Skipping {}: {}", input.display(), e);
                } else {
                    log::error!("{}: {}", input.display(), e);
                }
                BatchOutcome::Failed {
                    input: input.to_path_buf(),
                    error: e.to_string(),
                    input_error,
                }
            }
        }
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = sender.send(event);
        }
    }
}

/// List the PDF files directly inside `dir`, sorted by path.
///
/// The extension check is case-insensitive; subdirectories are not entered.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    log::debug!("Found {} PDF file(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Output file for `input`: `<output_dir>/<stem>.json`.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}
