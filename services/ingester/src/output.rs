//! JSON hand-off of converted observations.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use obs_common::ObservationSet;

/// Write `obs` as JSON to `path`, or to stdout when `path` is `None`.
pub fn write_observations(obs: &ObservationSet, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            write_json(obs, BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => write_json(obs, io::stdout().lock()),
    }
}

fn write_json<W: Write>(obs: &ObservationSet, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, obs)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
