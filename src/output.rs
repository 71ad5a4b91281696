// Artifact writing and console report

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::script::Conversion;

/// Error type for emitting the conversion result
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize summary: {0}")]
    Summary(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OutputError>;

/// Summary record printed after the script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub parts: usize,
}

impl Summary {
    pub fn of(conversion: &Conversion) -> Self {
        Self {
            parts: conversion.parts(),
        }
    }
}

/// Write the script text as the whole file, no trailing newline.
pub fn write_script(path: &Path, script: &str) -> Result<()> {
    std::fs::write(path, script).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote {} bytes to {}", script.len(), path.display());
    Ok(())
}

/// Print the script line followed by the JSON summary line
pub fn print_report<W: Write>(out: &mut W, script: &str, summary: &Summary) -> Result<()> {
    let summary_json = serde_json::to_string(summary)?;
    writeln!(out, "{}", script)
        .and_then(|_| writeln!(out, "{}", summary_json))
        .map_err(|source| OutputError::Write {
            path: PathBuf::from("<stdout>"),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lines() {
        let mut buf = Vec::new();
        print_report(&mut buf, "!speed@100|!stop@0|X@1", &Summary { parts: 3 }).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "!speed@100|!stop@0|X@1\n{\"parts\":3}\n"
        );
    }

    #[test]
    fn test_write_script_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.🗿");
        write_script(&path, "!speed@1|!stop@0|X@0").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "!speed@1|!stop@0|X@0");
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(
            write_script(&path, "x"),
            Err(OutputError::Write { .. })
        ));
    }
}
