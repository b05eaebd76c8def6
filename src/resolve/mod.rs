//! Path resolution module
//!
//! Turns a raw request path into a filesystem entry under the root:
//! decode, normalize, guard, then a single lookup whose outcome is an `Entry`.
//! The root is canonicalized once at construction; every candidate is
//! canonicalized again so symlinks cannot lead outside it.

mod decode;
mod normalize;

pub use decode::{decode_path, DecodeError};
pub use normalize::{EscapesRoot, RelativePath, SEGMENT};

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};

use crate::error::StartupError;

/// Outcome of looking up one candidate path
#[derive(Debug)]
pub enum Entry {
    NotFound,
    PermissionDenied,
    /// Exists, but its physical location is outside the root
    Outside,
    /// Regular file, already open; `size` comes from the open handle
    File { size: u64, handle: File },
    Directory { path: PathBuf },
    /// Any other I/O failure
    Failed(io::Error),
}

impl From<io::Error> for Entry {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Failed(e),
        }
    }
}

/// Maps normalized request paths onto entries below a fixed root
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    index_files: Vec<String>,
}

impl Resolver {
    /// Fails if `root` does not exist or is not a directory.
    pub fn new(root: &Path, index_files: Vec<String>) -> Result<Self, StartupError> {
        let canonical = root.canonicalize().map_err(|source| StartupError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(StartupError::RootNotDirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: canonical,
            index_files,
        })
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_files(&self) -> &[String] {
        &self.index_files
    }

    pub async fn lookup(&self, rel: &RelativePath) -> Entry {
        self.lookup_path(&rel.join_onto(&self.root)).await
    }

    /// First configured index file inside `dir`, with its name.
    /// Index names that are missing, directories, or outside the root are skipped;
    /// any other outcome (including errors) is returned as is.
    pub async fn find_index(&self, dir: &Path) -> Option<(&str, Entry)> {
        for name in &self.index_files {
            match self.lookup_path(&dir.join(name)).await {
                Entry::NotFound | Entry::Directory { .. } | Entry::Outside => {}
                entry => return Some((name.as_str(), entry)),
            }
        }
        None
    }

    async fn lookup_path(&self, candidate: &Path) -> Entry {
        let physical = match self.confine(candidate).await {
            Ok(p) => p,
            Err(entry) => return entry,
        };

        let meta = match fs::metadata(&physical).await {
            Ok(m) => m,
            Err(e) => return e.into(),
        };
        if meta.is_dir() {
            return Entry::Directory { path: physical };
        }
        // Sockets, FIFOs and devices are never served.
        if !meta.is_file() {
            return Entry::NotFound;
        }

        let handle = match File::open(&physical).await {
            Ok(f) => f,
            Err(e) => return e.into(),
        };
        let opened = match handle.metadata().await {
            Ok(m) => m,
            Err(e) => return e.into(),
        };

        // A component may have been swapped for a symlink since `confine`;
        // the open handle must still be the file found under the root.
        let current = match self.confine(candidate).await {
            Ok(p) => p,
            Err(entry) => return entry,
        };
        match fs::metadata(&current).await {
            Ok(m) if opened.is_file() && same_file(&opened, &m) => Entry::File {
                size: opened.len(),
                handle,
            },
            Ok(_) => Entry::Outside,
            Err(e) => e.into(),
        }
    }

    /// Canonical form of `candidate`, or `Outside` if it resolves beyond the root
    async fn confine(&self, candidate: &Path) -> Result<PathBuf, Entry> {
        let physical = fs::canonicalize(candidate).await?;
        if physical.starts_with(&self.root) {
            Ok(physical)
        } else {
            Err(Entry::Outside)
        }
    }
}

#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    a.len() == b.len() && a.modified().ok() == b.modified().ok()
}
