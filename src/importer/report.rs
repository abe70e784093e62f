//! JSON report of a batch run

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use super::batch::BatchSummary;
use crate::Result;

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub success: bool,
    pub records: usize,
    pub elapsed_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub total_secs: f64,
    pub average_secs: f64,
    pub files: Vec<FileReport>,
}

impl From<&BatchSummary> for BatchReport {
    fn from(summary: &BatchSummary) -> Self {
        let files = summary
            .outcomes
            .iter()
            .map(|o| FileReport {
                file: o.file.display().to_string(),
                success: o.is_success(),
                records: o.records,
                elapsed_secs: o.elapsed.as_secs_f64(),
                error: o.error.clone(),
            })
            .collect();

        Self {
            succeeded: summary.succeeded(),
            failed: summary.failed(),
            total_secs: summary.elapsed.as_secs_f64(),
            average_secs: summary.average().as_secs_f64(),
            files,
        }
    }
}

pub fn write_report(path: &Path, summary: &BatchSummary) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &BatchReport::from(summary)).map_err(std::io::Error::from)?;
    Ok(())
}
