use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::mpsc::Receiver;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("invalid target filename: {0:?}")]
    InvalidName(String),
    #[error("transfer ended before the last chunk")]
    Interrupted,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// One message of a download handed to [`AtomicFileWriter::write_stream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Data(Bytes),
    /// Sent once the whole body arrived; the file is only committed after it.
    End,
}

/// Creates `dir` when missing and rejects a path that exists but is not a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::OutputDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))
        }
        Err(err) => Err(PersistError::OutputDir(err.to_string())),
    }
}

/// Writes downloads into `{dir}/{filename}` through a temp file that is renamed
/// into place on commit, so a failed transfer never leaves a partial file.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn begin(&self, filename: &str) -> Result<PendingFile, PersistError> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\'])
        {
            return Err(PersistError::InvalidName(filename.to_string()));
        }
        ensure_output_dir(&self.dir)?;
        let tmp = NamedTempFile::new_in(&self.dir)?;
        Ok(PendingFile {
            tmp,
            target: self.dir.join(filename),
            written: 0,
        })
    }

    /// Drains `chunks` into `filename` and commits on [`StreamChunk::End`].
    ///
    /// Blocks the calling thread, so run it with `spawn_blocking`. If the
    /// sender goes away before `End` the partial data is discarded.
    pub fn write_stream(
        &self,
        filename: &str,
        mut chunks: Receiver<StreamChunk>,
    ) -> Result<PathBuf, PersistError> {
        let mut pending = self.begin(filename)?;
        while let Some(chunk) = chunks.blocking_recv() {
            match chunk {
                StreamChunk::Data(data) => pending.write_chunk(&data)?,
                StreamChunk::End => return pending.commit(),
            }
        }
        Err(PersistError::Interrupted)
    }
}

/// A download in progress. Dropping it without [`PendingFile::commit`] discards the data.
pub struct PendingFile {
    tmp: NamedTempFile,
    target: PathBuf,
    written: u64,
}

impl PendingFile {
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.tmp.write_all(chunk)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn commit(mut self) -> Result<PathBuf, PersistError> {
        self.tmp.flush()?;
        self.tmp.as_file_mut().sync_all()?;

        // An earlier download of the same artifact is overwritten.
        if self.target.exists() {
            fs::remove_file(&self.target)?;
        }
        self.tmp
            .persist(&self.target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(self.target)
    }
}
