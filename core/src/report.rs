// CSV trace of the FAT sizing iterations

use crate::solver::IterationRow;
use crate::FatCountError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Fixed output file, relative to the working directory
pub const OUTPUT_FILE: &str = "fat_count.csv";

pub const CSV_HEADER: [&str; 4] = ["i", "Cluster Space", "Both FAT Size", "Cluster Count"];

/// Write the header and one line per row, in iteration order.
pub fn write_csv<W: Write>(rows: &[IterationRow], mut writer: W) -> Result<(), FatCountError> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{}",
            row.i, row.cluster_space, row.both_fat_size, row.cluster_count
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Create or truncate `path` and write the trace into it.
pub fn write_csv_file(path: &Path, rows: &[IterationRow]) -> Result<(), FatCountError> {
    let file = File::create(path)?;
    write_csv(rows, BufWriter::new(file))?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote FAT sizing trace");
    Ok(())
}
