// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Routing of successful output.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{BinError, BinResult};

/// Where successful output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Standard output.
    Stdout,
    /// A file, created or overwritten.
    File(PathBuf),
}

impl OutputSink {
    /// The file when `target` is set, stdout otherwise.
    pub fn from_target(target: Option<&Path>) -> Self {
        match target {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Stdout,
        }
    }

    /// Writes `output` followed by a newline. Empty output writes nothing
    /// to stdout and truncates a file.
    pub async fn write(&self, output: &str) -> BinResult<()> {
        let mut text = String::with_capacity(output.len() + 1);
        if !output.is_empty() {
            text.push_str(output);
            text.push('\n');
        }

        match self {
            Self::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(text.as_bytes()).await?;
                stdout.flush().await?;
            }
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        BinError::io(format!("cannot create {}: {}", parent.display(), e))
                    })?;
                }
                tokio::fs::write(path, text.as_bytes()).await.map_err(|e| {
                    BinError::io(format!("cannot write {}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), bytes = text.len(), "Output written");
            }
        }

        Ok(())
    }
}

impl fmt::Display for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        let sink = OutputSink::from_target(Some(path.as_path()));

        sink.write("first").await.unwrap();
        sink.write("i=85\ni=86").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "i=85\ni=86\n");
    }

    #[tokio::test]
    async fn test_empty_output_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale").unwrap();

        OutputSink::File(path.clone()).write("").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_from_target() {
        assert_eq!(OutputSink::from_target(None), OutputSink::Stdout);
        assert_eq!(OutputSink::Stdout.to_string(), "stdout");
    }
}
