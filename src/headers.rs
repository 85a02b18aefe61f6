//! PE header validation and parsing.
//!
//! Walks the fixed part of the image: legacy stub, image signature, file
//! header, the size-dependent optional header, and the data-directory
//! table. Any failure here aborts the whole analysis; no table walk can be
//! trusted without a valid header chain.

use crate::cursor::ByteCursor;
use crate::error::{PeError, Result};
use crate::types::{
    DataDirectory, Machine, DOS_LFANEW_OFFSET, DOS_SIGNATURE, IMAGE_FILE_DLL,
    MAX_DATA_DIRECTORIES, PE32PLUS_MAGIC, PE32_MAGIC, PE_SIGNATURE,
};

/// File-header fields the analyzer consumes (20-byte COFF header).
#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    pub machine: Machine,
    pub number_of_sections: u16,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

impl FileHeader {
    pub fn is_dll(&self) -> bool {
        self.characteristics & IMAGE_FILE_DLL != 0
    }
}

/// Everything the header chain yields before the section table.
#[derive(Debug, Clone)]
pub struct ImageHeaders {
    pub file_header: FileHeader,
    /// Derived from the optional-header magic, not from `machine`.
    pub is_64bit: bool,
    pub data_directories: Vec<DataDirectory>,
    /// File offset of the first 40-byte section descriptor.
    pub section_table_offset: usize,
}

impl ImageHeaders {
    /// Directory slot by well-known index; missing slots read as `(0, 0)`.
    pub fn data_directory(&self, index: usize) -> DataDirectory {
        self.data_directories
            .get(index)
            .copied()
            .unwrap_or_default()
    }
}

// Byte distance from the optional-header start to the directory array,
// which begins right after `number_of_rva_and_sizes`. The 64-bit layout
// widens four size fields and drops `base_of_data`, shifting it by 16.
const DIRECTORIES_START_PE32: usize = 96;
const DIRECTORIES_START_PE32PLUS: usize = 112;

/// Validate the header chain and extract machine, bitness, and the
/// data-directory table.
///
/// Signature failures (including a `e_lfanew` pointing outside the file,
/// the mark of a plain DOS executable) report `InvalidFormat` so callers
/// can silently skip non-PE files; everything after a valid signature
/// fails hard.
pub fn parse_headers(cur: &ByteCursor) -> Result<ImageHeaders> {
    // The legacy stub is 64 bytes; anything shorter is not an image.
    if cur.len() < 64 {
        return Err(PeError::InvalidFormat);
    }
    if cur.read_u16(0)? != DOS_SIGNATURE {
        return Err(PeError::InvalidFormat);
    }

    let pe_offset = cur.read_u32(DOS_LFANEW_OFFSET)? as usize;
    let signature = cur.read_u32(pe_offset).map_err(|_| PeError::InvalidFormat)?;
    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidFormat);
    }

    let coff_offset = pe_offset + 4;
    let file_header = FileHeader {
        machine: Machine::from(cur.read_u16(coff_offset)?),
        number_of_sections: cur.read_u16(coff_offset + 2)?,
        size_of_optional_header: cur.read_u16(coff_offset + 16)?,
        characteristics: cur.read_u16(coff_offset + 18)?,
    };

    let opt_offset = coff_offset + 20;
    let magic = cur.read_u16(opt_offset)?;
    let (is_64bit, dir_start) = match magic {
        PE32_MAGIC => (false, DIRECTORIES_START_PE32),
        PE32PLUS_MAGIC => (true, DIRECTORIES_START_PE32PLUS),
        magic => return Err(PeError::UnsupportedImage { magic }),
    };

    if (file_header.size_of_optional_header as usize) < dir_start {
        return Err(PeError::TruncatedFile {
            expected: opt_offset + dir_start,
            actual: opt_offset + file_header.size_of_optional_header as usize,
        });
    }

    // `number_of_rva_and_sizes` is the last fixed field, immediately
    // before the directory array.
    let declared = cur.read_u32(opt_offset + dir_start - 4)?;
    let count = (declared as usize).min(MAX_DATA_DIRECTORIES);

    let mut data_directories = Vec::with_capacity(count);
    for i in 0..count {
        let off = opt_offset + dir_start + i * 8;
        // Declared table extends past the file: stop early. Consumers
        // treat missing slots as empty.
        let Ok(virtual_address) = cur.read_u32(off) else {
            break;
        };
        let Ok(size) = cur.read_u32(off + 4) else {
            break;
        };
        data_directories.push(DataDirectory {
            virtual_address,
            size,
        });
    }

    Ok(ImageHeaders {
        file_header,
        is_64bit,
        data_directories,
        section_table_offset: opt_offset + file_header.size_of_optional_header as usize,
    })
}
