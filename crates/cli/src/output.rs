//! Notifier and label printer used by the commands.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use packline_core::{LabelPrinter, LabelRecord, Notifier, PrintError, PrintJob, Severity};

/// Label output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One JSON object per print job, one job per line
    Json,
    /// Tab-separated barcode, name and quantity, one label per line
    Text,
}

/// Reports notifications as log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!(%severity, "{message}"),
            Severity::Warning => tracing::warn!(%severity, "{message}"),
            Severity::Error => tracing::error!(%severity, "{message}"),
        }
    }
}

/// Writes label batches to a file or stdout.
///
/// A file target is opened in append mode for every job, so jobs printed
/// during one run accumulate.
#[derive(Debug, Clone)]
pub struct LabelWriter {
    format: Format,
    target: Option<PathBuf>,
}

impl LabelWriter {
    /// Write to `target`, or stdout when `None`.
    #[must_use]
    pub const fn new(format: Format, target: Option<PathBuf>) -> Self {
        Self { format, target }
    }

    /// Truncate the target file so a run starts with an empty output.
    ///
    /// # Errors
    ///
    /// Returns `PrintError::Io` when the file cannot be created.
    pub fn reset(&self) -> Result<(), PrintError> {
        if let Some(path) = &self.target {
            std::fs::File::create(path)?;
        }
        Ok(())
    }

    /// The output file, if any.
    #[must_use]
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }
}

impl LabelPrinter for LabelWriter {
    fn print(&self, job: &PrintJob) -> Result<(), PrintError> {
        if job.is_empty() {
            return Ok(());
        }

        let rendered = render(self.format, job)?;

        match &self.target {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(rendered.as_bytes())?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes())?;
                stdout.flush()?;
            }
        }

        tracing::debug!(labels = job.label_count, "Print job written");
        Ok(())
    }
}

/// Render a print job in the given format, newline-terminated.
///
/// # Errors
///
/// Returns `PrintError::Render` if the job cannot be serialized.
pub fn render(format: Format, job: &PrintJob) -> Result<String, PrintError> {
    match format {
        Format::Json => {
            let mut line =
                serde_json::to_string(job).map_err(|e| PrintError::Render(e.to_string()))?;
            line.push('\n');
            Ok(line)
        }
        Format::Text => Ok(job.records.iter().map(text_line).collect()),
    }
}

fn text_line(record: &LabelRecord) -> String {
    format!(
        "{}\t{}\t{} {}\n",
        record.barcode,
        record.display_name,
        record.net_quantity.normalize(),
        record.unit.label()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use packline_core::Unit;
    use rust_decimal::Decimal;

    use super::*;

    fn job() -> PrintJob {
        PrintJob::new(vec![
            LabelRecord {
                barcode: "PK-1".to_string(),
                display_name: "Rod Grade: A Size: 10mm".to_string(),
                net_quantity: Decimal::new(2250, 2),
                unit: Unit::Kg,
            },
            LabelRecord {
                barcode: "PK-2".to_string(),
                display_name: "Rod Grade: A Size: 10mm".to_string(),
                net_quantity: Decimal::new(225, 1),
                unit: Unit::Kg,
            },
        ])
    }

    #[test]
    fn test_render_text() {
        assert_eq!(
            render(Format::Text, &job()).unwrap(),
            "PK-1\tRod Grade: A Size: 10mm\t22.5 Kg\nPK-2\tRod Grade: A Size: 10mm\t22.5 Kg\n"
        );
    }

    #[test]
    fn test_render_json_line() {
        let rendered = render(Format::Json, &job()).unwrap();
        assert!(rendered.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(rendered.trim_end()).unwrap();
        assert_eq!(value["labelCount"], 2);
        assert_eq!(value["records"][0]["displayName"], "Rod Grade: A Size: 10mm");
    }

    #[test]
    fn test_file_target_accumulates_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        let writer = LabelWriter::new(Format::Text, Some(path.clone()));

        writer.reset().unwrap();
        writer.print(&job()).unwrap();
        writer.print(&job()).unwrap();
        writer.print(&PrintJob::new(Vec::new())).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 4);
        assert_eq!(writer.target(), Some(path.as_path()));
    }

    #[test]
    fn test_reset_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.jsonl");
        std::fs::write(&path, "stale\n").unwrap();

        LabelWriter::new(Format::Json, Some(path.clone()))
            .reset()
            .unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().is_empty());
    }
}
