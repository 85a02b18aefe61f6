//! Core PE data types and constants.

use std::fmt;

use serde::{Deserialize, Serialize};

// PE constants
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: u32 = 0x0000_4550; // "PE\0\0"
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

/// Offset of the `e_lfanew` field in the legacy DOS stub.
pub const DOS_LFANEW_OFFSET: usize = 0x3C;

/// File-header characteristics bit marking a DLL image.
pub const IMAGE_FILE_DLL: u16 = 0x2000;

// Data directory indices consumed by this crate. The full table has up to
// 16 slots; everything else is irrelevant to dependency analysis.
pub const DIRECTORY_ENTRY_EXPORT: usize = 0;
pub const DIRECTORY_ENTRY_IMPORT: usize = 1;
pub const DIRECTORY_ENTRY_CLR: usize = 14;

/// Upper bound on data-directory entries; the conventional table size.
pub const MAX_DATA_DIRECTORIES: usize = 16;

/// Target CPU architecture from the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Machine {
    X86,   // 0x014c
    X64,   // 0x8664
    Arm,   // 0x01c0
    Arm64, // 0xaa64
    Ia64,  // 0x0200
    Other(u16),
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        match value {
            0x014c => Self::X86,
            0x8664 => Self::X64,
            0x01c0 => Self::Arm,
            0xaa64 => Self::Arm64,
            0x0200 => Self::Ia64,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86 => write!(f, "x86"),
            Self::X64 => write!(f, "x64"),
            Self::Arm => write!(f, "arm"),
            Self::Arm64 => write!(f, "arm64"),
            Self::Ia64 => write!(f, "ia64"),
            Self::Other(raw) => write!(f, "unknown({raw:#06x})"),
        }
    }
}

/// One data-directory slot: an RVA and a byte size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

impl DataDirectory {
    pub fn is_present(&self) -> bool {
        self.virtual_address != 0 && self.size != 0
    }
}

/// One exported symbol. `ordinal` is already base-adjusted; `name` is
/// `None` for ordinal-only exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub ordinal: u32,
    pub name: Option<String>,
    pub address: u32,
}

/// One imported symbol, exactly one of by-ordinal or by-name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportedFunction {
    ByOrdinal { ordinal: u16 },
    ByName { name: String },
}

/// One referenced module with its imports in thunk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedModule {
    pub name: String,
    pub functions: Vec<ImportedFunction>,
}

/// Caps on table walks so hostile images cannot force unbounded work.
/// Hitting a cap truncates the table and clears its `complete` flag.
#[derive(Debug, Clone)]
pub struct ParseLimits {
    /// Maximum export address-table slots walked.
    pub max_exports: usize,
    /// Maximum imported functions across all modules.
    pub max_imports: usize,
    /// Maximum bytes of any single symbol or module name.
    pub max_string_len: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_exports: 10_000,
            max_imports: 10_000,
            max_string_len: 512,
        }
    }
}
