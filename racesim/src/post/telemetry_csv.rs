use crate::interfaces::telemetry::TelemetryRecord;
use anyhow::Context;
use std::fs::File;
use std::path::Path;

/// TelemetryCsvWriter writes telemetry records as rows of a CSV file, the header is derived from
/// the record fields.
pub struct TelemetryCsvWriter {
    writer: csv::Writer<File>,
    no_records: usize,
}

impl TelemetryCsvWriter {
    pub fn create(path: &Path) -> anyhow::Result<TelemetryCsvWriter> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context(format!(
                    "Failed to create output directory {}!",
                    parent.display()
                ))?;
            }
        }

        let writer = csv::Writer::from_path(path)
            .context(format!("Failed to create telemetry file {}!", path.display()))?;

        Ok(TelemetryCsvWriter {
            writer,
            no_records: 0,
        })
    }

    pub fn write(&mut self, record: &TelemetryRecord) -> anyhow::Result<()> {
        self.writer
            .serialize(record)
            .context("Failed to write telemetry record!")?;
        self.no_records += 1;
        Ok(())
    }

    pub fn finish(mut self) -> anyhow::Result<usize> {
        self.writer.flush().context("Failed to flush telemetry file!")?;
        Ok(self.no_records)
    }
}
