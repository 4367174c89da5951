//! Replays a labelled dataset through a prediction service and scores it.
//!
//! Expected CSV layout: a header row naming the four feature columns and
//! `Label` (any order, extra columns ignored), then one sample per record.
//! Quoted cells may contain commas and line breaks.

use std::{fmt, time::Duration};

use serde::Deserialize;
use shared::{
    domain::{Feature, Verdict, LABEL_COLUMN},
    protocol::PredictionRequest,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{PredictionService, SubmitError};

pub const MISMATCH_PREVIEW_LIMIT: usize = 20;

/// Per-row request limit for dataset replays, so one hung request cannot stall
/// the run. Interactive submissions carry no timeout.
pub const EVALUATION_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("dataset is empty")]
    Empty,
    #[error("dataset header is missing column '{0}'")]
    MissingColumn(String),
    #[error("line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
    #[error("failed to read dataset: {0}")]
    Read(String),
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(position) => DatasetError::InvalidRow {
                line: position.line() as usize,
                reason: err.to_string(),
            },
            None => DatasetError::Read(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelledRow {
    /// 1-based line the record starts on; the header is line 1.
    pub line: usize,
    pub request: PredictionRequest,
    pub expected: Verdict,
}

/// One dataset record, matched to the header by column name. Other columns
/// are ignored.
#[derive(Debug, Deserialize)]
struct DatasetRecord {
    #[serde(rename = "Inbound Rate(bit/s)")]
    inbound_rate: f64,
    #[serde(rename = "Outbound Rate(bit/s)")]
    outbound_rate: f64,
    #[serde(rename = "Inbound Bandwidth Utilization(%)")]
    inbound_util: f64,
    #[serde(rename = "Outbound Bandwidth Utilization(%)")]
    outbound_util: f64,
    #[serde(rename = "Label")]
    label: f64,
}

pub fn parse_dataset(text: &str) -> Result<Vec<LabelledRow>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(DatasetError::Empty);
    }
    let required = Feature::ALL
        .iter()
        .map(|feature| feature.dataset_column())
        .chain([LABEL_COLUMN]);
    for name in required {
        if !headers.iter().any(|cell| cell == name) {
            return Err(DatasetError::MissingColumn(name.to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line() as usize);
        let parsed: DatasetRecord = record
            .deserialize(Some(&headers))
            .map_err(|err| DatasetError::InvalidRow {
                line,
                reason: err.to_string(),
            })?;

        let expected = parse_label(parsed.label).ok_or_else(|| DatasetError::InvalidRow {
            line,
            reason: format!("label must be 0 or 1, found {}", parsed.label),
        })?;

        rows.push(LabelledRow {
            line,
            request: PredictionRequest {
                inbound_rate: parsed.inbound_rate,
                outbound_rate: parsed.outbound_rate,
                inbound_util: parsed.inbound_util,
                outbound_util: parsed.outbound_util,
            },
            expected,
        });
    }

    Ok(rows)
}

fn parse_label(value: f64) -> Option<Verdict> {
    if value == 0.0 {
        Some(Verdict::Normal)
    } else if value == 1.0 {
        Some(Verdict::Anomaly)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Wrong {
        line: usize,
        expected: Verdict,
        /// Raw service answer, truncated toward zero.
        predicted: i64,
        request: PredictionRequest,
    },
    Failed {
        line: usize,
        expected: Verdict,
        error: SubmitError,
    },
}

impl Mismatch {
    pub fn line(&self) -> usize {
        match self {
            Mismatch::Wrong { line, .. } | Mismatch::Failed { line, .. } => *line,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Wrong {
                line,
                expected,
                predicted,
                request,
            } => write!(
                f,
                "Row {line}: true={}, pred={predicted}, payload=[{}, {}, {}, {}]",
                label_value(*expected),
                request.inbound_rate,
                request.outbound_rate,
                request.inbound_util,
                request.outbound_util
            ),
            Mismatch::Failed {
                line,
                expected,
                error,
            } => write!(
                f,
                "Row {line}: true={}, pred=none, error={error}",
                label_value(*expected)
            ),
        }
    }
}

fn label_value(verdict: Verdict) -> i64 {
    i64::from(verdict.is_anomaly())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    pub mismatches: Vec<Mismatch>,
}

impl EvaluationReport {
    /// Percentage of rows predicted correctly; 0 for an empty dataset.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.correct as f64 / self.total as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total rows tested: {}", self.total)?;
        writeln!(f, "Correct: {}", self.correct)?;
        writeln!(f, "Accuracy: {:.2}%", self.accuracy())?;

        if self.mismatches.is_empty() {
            return write!(f, "\nAll predictions matched the dataset labels.");
        }

        write!(f, "\nMismatches/errors (first {MISMATCH_PREVIEW_LIMIT}):")?;
        for mismatch in self.mismatches.iter().take(MISMATCH_PREVIEW_LIMIT) {
            write!(f, "\n  {mismatch}")?;
        }
        if self.mismatches.len() > MISMATCH_PREVIEW_LIMIT {
            write!(
                f,
                "\n  ... and {} more",
                self.mismatches.len() - MISMATCH_PREVIEW_LIMIT
            )?;
        }
        Ok(())
    }
}

/// Sends every row, one request at a time, in file order.
pub async fn evaluate<S: PredictionService + ?Sized>(
    service: &S,
    rows: &[LabelledRow],
) -> EvaluationReport {
    let mut report = EvaluationReport {
        total: rows.len(),
        ..EvaluationReport::default()
    };

    for row in rows {
        match service.predict(&row.request).await {
            Ok(prediction) => {
                // Scored on the raw answer: a 2 is wrong even where the form
                // would show it as normal.
                let predicted = prediction.prediction.trunc() as i64;
                if predicted == label_value(row.expected) {
                    report.correct += 1;
                    continue;
                }
                debug!(line = row.line, predicted, "prediction disagrees with dataset label");
                report.mismatches.push(Mismatch::Wrong {
                    line: row.line,
                    expected: row.expected,
                    predicted,
                    request: row.request,
                });
            }
            Err(error) => {
                debug!(line = row.line, %error, "prediction request failed");
                report.mismatches.push(Mismatch::Failed {
                    line: row.line,
                    expected: row.expected,
                    error,
                });
            }
        }
    }

    info!(
        total = report.total,
        correct = report.correct,
        accuracy = report.accuracy(),
        "dataset evaluation finished"
    );
    report
}

#[cfg(test)]
#[path = "tests/evaluate_tests.rs"]
mod tests;
