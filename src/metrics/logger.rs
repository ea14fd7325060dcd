use super::MetricSample;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::path::Path;

/// Streams samples to a CSV file as the run produces them.
pub struct MetricsLogger {
    writer: Writer<File>,
}

impl MetricsLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log(&mut self, sample: &MetricSample) -> Result<()> {
        self.writer.serialize(sample)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn log_batch(&mut self, samples: &[MetricSample]) -> Result<()> {
        for sample in samples {
            self.writer.serialize(sample)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads a run back from a CSV written by [`MetricsLogger`].
pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<MetricSample>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut samples = Vec::new();
    for record in reader.deserialize() {
        let sample: MetricSample =
            record.with_context(|| format!("bad record in {}", path.display()))?;
        samples.push(sample);
    }
    Ok(samples)
}
