//! Unified PE image parser.
//!
//! `PeImage` validates the header chain and section table once, then hands
//! out the table readers on demand. It holds no mutable state and caches
//! nothing, so one buffer can back any number of independent reads.

use crate::cursor::ByteCursor;
use crate::directories::clr::is_managed_image;
use crate::directories::export::{read_exports, ExportTable};
use crate::directories::import::{read_imports, ImportTable};
use crate::error::{PeError, Result};
use crate::headers::{parse_headers, ImageHeaders};
use crate::sections::SectionTable;
use crate::types::{
    DataDirectory, Machine, ParseLimits, DIRECTORY_ENTRY_EXPORT, DIRECTORY_ENTRY_IMPORT,
};

/// A validated PE image over a borrowed byte buffer.
pub struct PeImage<'data> {
    cursor: ByteCursor<'data>,
    headers: ImageHeaders,
    sections: SectionTable,
}

impl<'data> PeImage<'data> {
    /// Validate headers and read the section table.
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let cursor = ByteCursor::new(data);
        let headers = parse_headers(&cursor)?;
        let sections = SectionTable::parse(
            &cursor,
            headers.section_table_offset,
            headers.file_header.number_of_sections,
        )?;
        Ok(Self {
            cursor,
            headers,
            sections,
        })
    }

    pub fn machine(&self) -> Machine {
        self.headers.file_header.machine
    }

    /// From the optional-header magic, never from the machine field.
    pub fn is_64bit(&self) -> bool {
        self.headers.is_64bit
    }

    pub fn is_dll(&self) -> bool {
        self.headers.file_header.is_dll()
    }

    /// Header-only managed-runtime classification; advisory, never fails.
    pub fn is_managed(&self) -> bool {
        is_managed_image(&self.headers)
    }

    /// Directory slot by well-known index; missing slots read as `(0, 0)`.
    pub fn data_directory(&self, index: usize) -> DataDirectory {
        self.headers.data_directory(index)
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        self.sections.rva_to_offset(rva)
    }

    /// Read a NUL-terminated string at a virtual address.
    pub fn read_string_at_rva(&self, rva: u32, max_len: usize) -> Result<String> {
        let offset = self
            .rva_to_offset(rva)
            .ok_or(PeError::CorruptDirectory { rva })?;
        self.cursor.read_cstring(offset, max_len)
    }

    /// Walk the export directory. Corrupt table data degrades to a partial
    /// table; see [`ExportTable::complete`].
    pub fn exports(&self, limits: &ParseLimits) -> ExportTable {
        read_exports(
            &self.cursor,
            &self.sections,
            self.data_directory(DIRECTORY_ENTRY_EXPORT),
            limits,
        )
    }

    /// Walk the import directory. Corrupt table data degrades to a partial
    /// table; see [`ImportTable::complete`].
    pub fn imports(&self, limits: &ParseLimits) -> ImportTable {
        read_imports(
            &self.cursor,
            &self.sections,
            self.data_directory(DIRECTORY_ENTRY_IMPORT),
            self.is_64bit(),
            limits,
        )
    }
}
