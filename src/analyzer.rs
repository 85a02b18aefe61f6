//! Analysis orchestration: one file in, one immutable result out.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PeError, Result};
use crate::image::PeImage;
use crate::io::{IoLimits, MappedFile};
use crate::types::{ExportEntry, ImportedModule, Machine, ParseLimits};

/// Everything downstream reporting needs about one native image.
///
/// Produced once per call and never mutated; the caller owns it outright.
/// Exports are ordered by ascending ordinal, imports by descriptor order
/// with functions in thunk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_name: String,
    pub file_path: PathBuf,
    pub machine: Machine,
    pub is_64bit: bool,
    pub is_dll: bool,
    /// Header-only managed-runtime classification.
    pub is_managed: bool,
    pub exports: Vec<ExportEntry>,
    pub imports: Vec<ImportedModule>,
    /// False when the export walk stopped early on corrupt data.
    pub exports_complete: bool,
    /// False when the import walk stopped early on corrupt data.
    pub imports_complete: bool,
}

/// Three-way outcome: not a PE at all, a parsed image, or (via `Err`) a
/// structural failure. Callers scanning mixed directories silently skip
/// `NotAPeImage` instead of surfacing noise.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Image(AnalysisResult),
    NotAPeImage,
}

impl AnalysisOutcome {
    pub fn into_image(self) -> Option<AnalysisResult> {
        match self {
            Self::Image(result) => Some(result),
            Self::NotAPeImage => None,
        }
    }
}

/// Analyze the file at `path` with default limits.
pub fn analyze_path<P: AsRef<Path>>(path: P) -> Result<AnalysisOutcome> {
    analyze_path_with(path, &IoLimits::default(), &ParseLimits::default())
}

/// Analyze the file at `path`.
///
/// Bad or missing signatures (including plain DOS executables and
/// arbitrary non-binary files) come back as `NotAPeImage`; unreadable
/// files surface the underlying I/O error; anything else that fails at
/// the header stage is a hard error. Corruption inside the export or
/// import tables degrades to a partial result instead.
pub fn analyze_path_with<P: AsRef<Path>>(
    path: P,
    io_limits: &IoLimits,
    parse_limits: &ParseLimits,
) -> Result<AnalysisOutcome> {
    let path = path.as_ref();
    let mapped = MappedFile::open(path, io_limits)?;

    let image = match PeImage::parse(mapped.bytes()) {
        Ok(image) => image,
        Err(PeError::InvalidFormat) => {
            debug!(path = %path.display(), "not a PE image, skipping");
            return Ok(AnalysisOutcome::NotAPeImage);
        }
        Err(err) => return Err(err),
    };

    let exports = image.exports(parse_limits);
    let imports = image.imports(parse_limits);

    let result = AnalysisResult {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_path: path.to_path_buf(),
        machine: image.machine(),
        is_64bit: image.is_64bit(),
        is_dll: image.is_dll(),
        is_managed: image.is_managed(),
        exports: exports.entries,
        imports: imports.modules,
        exports_complete: exports.complete,
        imports_complete: imports.complete,
    };

    debug!(
        path = %path.display(),
        machine = %result.machine,
        is_64bit = result.is_64bit,
        is_dll = result.is_dll,
        is_managed = result.is_managed,
        exports = result.exports.len(),
        imports = result.imports.len(),
        "image analyzed"
    );
    Ok(AnalysisOutcome::Image(result))
}
