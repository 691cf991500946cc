// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Writes the tables of a sweep as comma separated files

use crate::sweep::{SweepResult, Table};
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// The default output directory, timestamped so successive runs never collide
pub(crate) fn default_output_directory() -> PathBuf {
    PathBuf::from("results").join(chrono::Local::now().format("%Y%m%d-%H%M%S").to_string())
}

/// Write `table` to `path`, empty cells mark failed points
pub(crate) fn write_table(path: &Path, table: &Table) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", table.columns.iter().join(","))?;
    for row in &table.rows {
        let line = row
            .iter()
            .map(|cell| cell.map(|value| format!("{value:e}")).unwrap_or_default())
            .join(",");
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}

/// Write one file `<symbol>.csv` per exported property, returning the paths written
#[tracing::instrument(name = "Export", level = "info", skip(result))]
pub(crate) fn write_tables(output: &Path, result: &SweepResult) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output)?;
    let mut written = Vec::new();
    for (grid, table) in result.tables() {
        let suffix = if grid.request.full_tensor { "_tensor" } else { "" };
        let path = output.join(format!("{}{suffix}.csv", grid.request.property.symbol()));
        write_table(&path, &table)?;
        tracing::info!("Wrote {} rows to {}", table.rows.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
