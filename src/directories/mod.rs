//! Data-directory readers: exports, imports, and the managed-runtime
//! classifier.

pub mod clr;
pub mod export;
pub mod import;
