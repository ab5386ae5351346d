use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("output path has no file name: {0}")]
    NoFileName(String),
    #[error("could not serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` if missing and checks that a file can be created inside it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes files under one directory through a temp file and a rename, so a
/// reader never sees a half-written JSON document.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writer for the directory holding `path`, plus the file name to write.
    pub fn for_path(path: &Path) -> Result<(Self, String), PersistError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PersistError::NoFileName(path.display().to_string()))?
            .to_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((Self::new(dir), name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        filename: &str,
        value: &T,
    ) -> Result<PathBuf, PersistError> {
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        self.write(filename, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_path_splits_directory_and_name() {
        let (writer, name) = AtomicFileWriter::for_path(Path::new("out/tree.json")).unwrap();
        assert_eq!(writer.dir(), Path::new("out"));
        assert_eq!(name, "tree.json");

        let (writer, name) = AtomicFileWriter::for_path(Path::new("tree.json")).unwrap();
        assert_eq!(writer.dir(), Path::new("."));
        assert_eq!(name, "tree.json");
    }

    #[test]
    fn for_path_rejects_paths_without_a_file_name() {
        assert!(matches!(
            AtomicFileWriter::for_path(Path::new("/")),
            Err(PersistError::NoFileName(_))
        ));
    }
}
