//! Native PE image analysis.
//!
//! Answers, from raw bytes alone, whether a file is a valid PE image, what
//! CPU it targets, whether it is 32- or 64-bit, what it exports, what it
//! imports, and whether it is a managed-runtime container rather than
//! native code. Built for dependency reporting over attacker-adjacent
//! input: every read is bounds-checked, malformed headers fail cleanly,
//! and corrupt export/import tables degrade to partial results instead of
//! discarding the whole analysis.
//!
//! ```no_run
//! use peprobe::{analyze_path, AnalysisOutcome};
//!
//! match analyze_path("deps/native.dll")? {
//!     AnalysisOutcome::Image(result) => {
//!         println!("{} ({}): {} exports", result.file_name, result.machine,
//!             result.exports.len());
//!     }
//!     AnalysisOutcome::NotAPeImage => {} // silently skip non-binaries
//! }
//! # Ok::<(), peprobe::PeError>(())
//! ```

pub mod analyzer;
pub mod cursor;
pub mod directories;
pub mod error;
pub mod headers;
pub mod image;
pub mod io;
pub mod logging;
pub mod sections;
pub mod types;

pub use analyzer::{analyze_path, analyze_path_with, AnalysisOutcome, AnalysisResult};
pub use error::{PeError, Result};
pub use image::PeImage;
pub use io::IoLimits;
pub use types::{DataDirectory, ExportEntry, ImportedFunction, ImportedModule, Machine, ParseLimits};
