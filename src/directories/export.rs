//! Export table parsing.
//!
//! Failure policy differs from the header stage: a corrupt or truncated
//! export directory degrades to whatever entries were already built, with
//! `complete` cleared. Dependency reporting is more useful with partial
//! data than with none.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cursor::ByteCursor;
use crate::sections::SectionTable;
use crate::types::{DataDirectory, ExportEntry, ParseLimits};

/// All exports of one image, in ascending ordinal order.
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    /// The module's own name from the export directory, best effort.
    pub dll_name: Option<String>,
    pub ordinal_base: u32,
    pub entries: Vec<ExportEntry>,
    /// Cleared when the walk stopped early on corrupt or truncated data.
    pub complete: bool,
}

impl ExportTable {
    fn empty(complete: bool) -> Self {
        Self {
            complete,
            ..Self::default()
        }
    }

    pub fn named_count(&self) -> usize {
        self.entries.iter().filter(|e| e.name.is_some()).count()
    }
}

/// Walk the export data directory.
///
/// An absent directory (`size == 0`) is the common case for executables
/// and import-only DLLs and yields an empty, complete table.
pub fn read_exports(
    cur: &ByteCursor,
    sections: &SectionTable,
    dir: DataDirectory,
    limits: &ParseLimits,
) -> ExportTable {
    if !dir.is_present() {
        return ExportTable::empty(true);
    }

    let Some(dir_offset) = sections.rva_to_offset(dir.virtual_address) else {
        warn!(rva = dir.virtual_address, "export directory RVA not mapped");
        return ExportTable::empty(false);
    };

    // Export directory record: 40 bytes of which we need the name RVA,
    // ordinal base, both counts, and the three table RVAs.
    let record = (
        cur.read_u32(dir_offset + 12), // name RVA
        cur.read_u32(dir_offset + 16), // ordinal base
        cur.read_u32(dir_offset + 20), // number of functions
        cur.read_u32(dir_offset + 24), // number of names
        cur.read_u32(dir_offset + 28), // address table RVA
        cur.read_u32(dir_offset + 32), // name pointer table RVA
        cur.read_u32(dir_offset + 36), // name ordinal table RVA
    );
    let (Ok(name_rva), Ok(ordinal_base), Ok(function_count), Ok(name_count),
        Ok(address_table_rva), Ok(name_table_rva), Ok(ordinal_table_rva)) = record
    else {
        warn!(offset = dir_offset, "export directory record truncated");
        return ExportTable::empty(false);
    };

    let mut table = ExportTable {
        ordinal_base,
        complete: true,
        ..ExportTable::default()
    };

    if name_rva != 0 {
        if let Some(offset) = sections.rva_to_offset(name_rva) {
            table.dll_name = cur.read_cstring(offset, limits.max_string_len).ok();
        }
    }

    let function_count = if (function_count as usize) > limits.max_exports {
        warn!(
            declared = function_count,
            cap = limits.max_exports,
            "export address table capped"
        );
        table.complete = false;
        limits.max_exports
    } else {
        function_count as usize
    };

    // Address table: one RVA per ordinal slot.
    let Some(address_offset) = sections.rva_to_offset(address_table_rva) else {
        warn!(rva = address_table_rva, "export address table RVA not mapped");
        table.complete = false;
        return table;
    };
    let mut addresses = Vec::with_capacity(function_count);
    for i in 0..function_count {
        match cur.read_u32(address_offset + i * 4) {
            Ok(rva) => addresses.push(rva),
            Err(_) => {
                table.complete = false;
                break;
            }
        }
    }

    // Name tables: parallel arrays mapping name strings to ordinal
    // indices. Absence of either table means every export is by ordinal.
    let mut names_by_index: HashMap<usize, String> = HashMap::new();
    if name_count > 0 && name_table_rva != 0 && ordinal_table_rva != 0 {
        let name_count = (name_count as usize).min(limits.max_exports);
        match (
            sections.rva_to_offset(name_table_rva),
            sections.rva_to_offset(ordinal_table_rva),
        ) {
            (Some(name_offset), Some(ordinal_offset)) => {
                for j in 0..name_count {
                    let (Ok(string_rva), Ok(ordinal_index)) = (
                        cur.read_u32(name_offset + j * 4),
                        cur.read_u16(ordinal_offset + j * 2),
                    ) else {
                        table.complete = false;
                        break;
                    };
                    if string_rva == 0 {
                        continue;
                    }
                    let Some(string_offset) = sections.rva_to_offset(string_rva) else {
                        table.complete = false;
                        continue;
                    };
                    match cur.read_cstring(string_offset, limits.max_string_len) {
                        Ok(name) => {
                            names_by_index.insert(ordinal_index as usize, name);
                        }
                        Err(_) => table.complete = false,
                    }
                }
            }
            _ => {
                warn!("export name tables not mapped");
                table.complete = false;
            }
        }
    }

    for (i, &address) in addresses.iter().enumerate() {
        if address == 0 {
            // Unused ordinal slot, never emitted.
            continue;
        }
        table.entries.push(ExportEntry {
            ordinal: ordinal_base.wrapping_add(i as u32),
            name: names_by_index.remove(&i),
            address,
        });
    }

    debug!(
        exports = table.entries.len(),
        named = table.named_count(),
        complete = table.complete,
        "export table parsed"
    );
    table
}
