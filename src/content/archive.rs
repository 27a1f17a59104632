//! Read-only access to the bundled exercise archive.
//!
//! The archive is reopened for every request; nothing holds a reader across
//! requests, so concurrent handlers never share zip state.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use zip::result::ZipError;
use zip::ZipArchive;

/// Error opening or reading the archive.
///
/// Any of these means the feature is non-functional until the archive is fixed.
#[derive(Debug)]
pub enum ArchiveError {
    Open(String),
    Read(String),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::Open(e) => write!(f, "Cannot open exercise archive: {}", e),
            ArchiveError::Read(e) => write!(f, "Cannot read exercise archive: {}", e),
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Identity of an archive file on disk, used as a cache invalidation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveVersion {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Handle to the zip file on disk.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
}

impl ArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh reader over the archive.
    pub fn open(&self) -> Result<ZipArchive<BufReader<File>>, ArchiveError> {
        let file = File::open(&self.path)
            .map_err(|e| ArchiveError::Open(format!("{}: {}", self.path.display(), e)))?;
        ZipArchive::new(BufReader::new(file))
            .map_err(|e| ArchiveError::Open(format!("{}: {}", self.path.display(), e)))
    }

    /// Current on-disk version of the archive.
    pub fn version(&self) -> Result<ArchiveVersion, ArchiveError> {
        let meta = std::fs::metadata(&self.path)
            .map_err(|e| ArchiveError::Open(format!("{}: {}", self.path.display(), e)))?;
        Ok(ArchiveVersion {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    /// Read a single entry. `Ok(None)` when the entry does not exist or is a directory.
    pub fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut archive = self.open()?;
        read_entry_from(&mut archive, name)
    }
}

/// Read an entry from an already opened archive.
pub fn read_entry_from<R: std::io::Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, ArchiveError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ArchiveError::Read(format!("{}: {}", name, e))),
    };

    if entry.is_dir() {
        return Ok(None);
    }

    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ArchiveError::Read(format!("{}: {}", name, e)))?;
    Ok(Some(bytes))
}
