use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::transaction::{import_file, ImportOutcome};
use crate::schema::SchemaRegistry;
use crate::ui::{Phase, Ui};
use crate::writer::Database;
use crate::Result;

/// Aggregate of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<ImportOutcome>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Mean wall time per file, zero for an empty batch
    pub fn average(&self) -> Duration {
        match u32::try_from(self.outcomes.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.elapsed / n,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {:.2}s total, {:.2}s per file",
            self.succeeded(),
            self.failed(),
            self.elapsed.as_secs_f64(),
            self.average().as_secs_f64()
        )
    }
}

/// Case-insensitive extension match; `extension` may carry a leading dot
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

/// `input` itself when it is a file, otherwise every matching file directly
/// inside the directory, sorted by name
pub fn collect_source_files(input: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }
    files.sort();

    tracing::debug!("Found {} .{} files in {}", files.len(), extension, input.display());
    Ok(files)
}

/// Import every file in order, one transaction each. A failed file never
/// stops the batch.
pub fn run_batch(
    db: &mut Database,
    registry: &SchemaRegistry,
    files: &[PathBuf],
    ui: &mut impl Ui,
) -> BatchSummary {
    let start = Instant::now();
    let mut outcomes = Vec::with_capacity(files.len());

    ui.set_phase(Phase::Importing);

    for (idx, path) in files.iter().enumerate() {
        ui.file_started(idx + 1, files.len(), &path.display().to_string());
        let outcome = import_file(db, registry, path);
        ui.file_finished(&outcome);
        outcomes.push(outcome);
    }

    let summary = BatchSummary {
        outcomes,
        elapsed: start.elapsed(),
    };

    tracing::info!("Batch finished: {}", summary);
    ui.set_phase(Phase::Complete);
    ui.summary(&summary);

    summary
}
