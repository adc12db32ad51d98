use crate::core::path::ensure_dir;
use crate::core::AuditResult;
use crate::corpus::segment::CorpusSegment;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sole owner of the corpus file.
///
/// Each segment is rendered in memory, appended in one write and flushed, so
/// the file on disk only ever holds whole segments.
pub struct CorpusWriter {
    path: PathBuf,
    out: BufWriter<File>,
    segments_written: usize,
}

impl CorpusWriter {
    /// Create the corpus file, truncating any previous contents
    pub fn create(path: &Path) -> AuditResult<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            ensure_dir(dir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            segments_written: 0,
        })
    }

    pub fn append(&mut self, segment: &CorpusSegment) -> AuditResult<()> {
        self.out.write_all(&segment.render())?;
        self.out.flush()?;
        self.segments_written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn segments_written(&self) -> usize {
        self.segments_written
    }

    /// Flush and sync to disk
    pub fn finish(mut self) -> AuditResult<PathBuf> {
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        Ok(self.path)
    }
}
