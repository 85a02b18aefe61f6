//! Bounded file access.
//!
//! Inputs are attacker-adjacent (downloaded or user-supplied files), so
//! the whole file is memory-mapped once behind a size cap instead of read
//! through unbounded allocation. Typical inputs are dependency DLLs of
//! modest size; streaming would be needless complexity.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::trace;

use crate::error::{PeError, Result};

/// Resource limits for opening candidate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoLimits {
    /// Absolute maximum file size that will be mapped.
    pub max_file_size: u64,
}

impl Default for IoLimits {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// A read-only, size-capped memory mapping of one candidate file.
#[derive(Debug)]
pub struct MappedFile {
    // None for zero-length files; memmap cannot map empty files.
    mmap: Option<Mmap>,
}

impl MappedFile {
    pub fn open<P: AsRef<Path>>(path: P, limits: &IoLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        if size > limits.max_file_size {
            return Err(PeError::FileTooLarge {
                size,
                limit: limits.max_file_size,
            });
        }

        let mmap = if size == 0 {
            None
        } else {
            // Safety: the mapping is read-only and private to this process.
            Some(unsafe { Mmap::map(&file)? })
        };

        trace!(path = %path.display(), size, "mapped candidate file");
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}
