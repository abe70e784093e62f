//! Line-oriented progress output
//!
//! The batch driver reports through the [`Ui`] trait so the binary can print
//! one line per file while tests and library callers stay silent.

use std::fmt;

use crate::importer::{BatchSummary, ImportOutcome};

/// Run phases, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Preparing,
    Resetting,
    Importing,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Preparing => write!(f, "Preparing database"),
            Phase::Resetting => write!(f, "Resetting tables"),
            Phase::Importing => write!(f, "Importing files"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Trait for UI implementations - allows both console and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn file_started(&mut self, current: usize, total: usize, file: &str);
    fn file_finished(&mut self, outcome: &ImportOutcome);
    fn summary(&mut self, summary: &BatchSummary);
    fn log(&mut self, message: impl Into<String>);
}

/// Prints one line per file and a final tally to stdout
#[derive(Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        println!("\n{}...", phase);
    }

    fn file_started(&mut self, current: usize, total: usize, file: &str) {
        tracing::debug!("[{}/{}] {}", current, total, file);
    }

    fn file_finished(&mut self, outcome: &ImportOutcome) {
        match &outcome.error {
            None => println!(
                "  [ok]     {} ({} records) in {:.2}s",
                outcome.file_name(),
                outcome.records,
                outcome.elapsed.as_secs_f64()
            ),
            Some(error) => println!(
                "  [failed] {} after {:.2}s: {}",
                outcome.file_name(),
                outcome.elapsed.as_secs_f64(),
                error
            ),
        }
    }

    fn summary(&mut self, summary: &BatchSummary) {
        println!("\n{}", summary);
    }

    fn log(&mut self, message: impl Into<String>) {
        println!("{}", message.into());
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn file_started(&mut self, _current: usize, _total: usize, _file: &str) {}
    fn file_finished(&mut self, _outcome: &ImportOutcome) {}
    fn summary(&mut self, _summary: &BatchSummary) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
