//! CSV loading and writing shared by every stage.

use crate::error::{PipelineError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load a CSV file with a header row, inferring the schema from the whole
/// file so late thousands-separated values do not break numeric inference.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    debug!(
        "Loaded {} ({} rows x {} cols)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Write a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let bytes = csv_bytes(df)?;
    write_outputs(&[(path, bytes.as_slice())])?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Render a DataFrame as CSV in memory, header included.
pub fn csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;
    Ok(buf)
}

/// Write every `(path, contents)` pair, or none of them.
///
/// Parent directories are created and every destination is checked before
/// the first write. If a later write fails, files already written by this
/// call are removed.
pub fn write_outputs(outputs: &[(&Path, &[u8])]) -> Result<()> {
    for (path, _) in outputs {
        ensure_parent_dir(path)?;
        if path.is_dir() {
            return Err(PipelineError::Io(io::Error::other(format!(
                "output path {} is a directory",
                path.display()
            ))));
        }
    }

    for (idx, (path, contents)) in outputs.iter().enumerate() {
        if let Err(e) = fs::write(path, contents) {
            for (written, _) in &outputs[..idx] {
                if fs::remove_file(written).is_err() {
                    warn!("Could not remove partial output {}", written.display());
                }
            }
            return Err(PipelineError::Io(e).with_context(format!("Failed to write {}", path.display())));
        }
    }
    Ok(())
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let err = load_csv(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_write_then_load_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut df = df![
            "name" => ["Maruti Swift Dzire VDI", "Honda City"],
            "km_driven" => [70000i64, 50000],
        ]
        .unwrap();
        write_csv(&mut df, &path).unwrap();

        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.shape(), (2, 2));
        assert_eq!(loaded.column("km_driven").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_load_quoted_thousands_stay_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "name,selling_price\nA B,\"1,20,000\"\nC D,45000\n").unwrap();

        let df = load_csv(&path).unwrap();
        assert_eq!(df.column("selling_price").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_write_outputs_all_or_nothing() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("data").join("clean.csv");
        let log = dir.path().join("reports");
        std::fs::create_dir_all(&log).unwrap();

        let err = write_outputs(&[(csv.as_path(), &b"a\n1\n"[..]), (log.as_path(), &b"log"[..])]).unwrap_err();
        assert_eq!(err.error_code(), "IO_FAILURE");
        assert!(!csv.exists());
    }

    #[test]
    fn test_csv_bytes_match_written_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut df = df!["year" => [2014i64, 2019]].unwrap();

        let bytes = csv_bytes(&mut df).unwrap();
        write_csv(&mut df, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        assert_eq!(bytes, b"year\n2014\n2019\n".to_vec());
    }
}
