use std::path::Path;

use anyhow::{Context, Result};

use crate::events::AttemptRecord;

/// Write attempt records to a CSV file, one row per attempt, with a header
/// derived from the record fields.
pub fn write_attempts_csv(path: &Path, attempts: &[AttemptRecord]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create CSV file at {}", path.display()))?;

    for attempt in attempts {
        writer.serialize(attempt).context("failed to serialize attempt row")?;
    }
    writer.flush().context("failed to flush CSV file")?;

    Ok(attempts.len())
}
