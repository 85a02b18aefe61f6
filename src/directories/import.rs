//! Import table parsing.
//!
//! Descriptor records are walked until the all-zero sentinel; each module's
//! thunk array is walked until its zero terminator. As with exports,
//! corrupt data degrades to the modules parsed so far instead of failing
//! the analysis.

use tracing::{debug, warn};

use crate::cursor::ByteCursor;
use crate::sections::SectionTable;
use crate::types::{DataDirectory, ImportedFunction, ImportedModule, ParseLimits};

/// Size of one import descriptor record.
const DESCRIPTOR_SIZE: usize = 20;

/// All imported modules of one image, in descriptor order.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    pub modules: Vec<ImportedModule>,
    /// Cleared when the walk stopped early on corrupt or truncated data.
    pub complete: bool,
}

impl ImportTable {
    fn empty(complete: bool) -> Self {
        Self {
            modules: Vec::new(),
            complete,
        }
    }

    pub fn function_count(&self) -> usize {
        self.modules.iter().map(|m| m.functions.len()).sum()
    }
}

/// Walk the import data directory. An absent directory yields an empty,
/// complete table; statically import-free images are legitimate.
pub fn read_imports(
    cur: &ByteCursor,
    sections: &SectionTable,
    dir: DataDirectory,
    is_64bit: bool,
    limits: &ParseLimits,
) -> ImportTable {
    if !dir.is_present() {
        return ImportTable::empty(true);
    }

    let Some(mut offset) = sections.rva_to_offset(dir.virtual_address) else {
        warn!(rva = dir.virtual_address, "import directory RVA not mapped");
        return ImportTable::empty(false);
    };

    let mut table = ImportTable::empty(true);
    let mut total_functions = 0usize;

    loop {
        let Ok(descriptor) = cur.bytes(offset, DESCRIPTOR_SIZE) else {
            warn!(offset, "import descriptor list truncated");
            table.complete = false;
            break;
        };
        if descriptor.iter().all(|&b| b == 0) {
            break; // sentinel terminator
        }

        // Fields of interest: lookup table RVA, module name RVA, address
        // table RVA. Bounds already checked by the record read above.
        let lookup_table_rva = u32::from_le_bytes(descriptor[0..4].try_into().unwrap());
        let name_rva = u32::from_le_bytes(descriptor[12..16].try_into().unwrap());
        let address_table_rva = u32::from_le_bytes(descriptor[16..20].try_into().unwrap());

        offset += DESCRIPTOR_SIZE;

        if name_rva == 0 {
            continue;
        }
        let Some(name_offset) = sections.rva_to_offset(name_rva) else {
            warn!(rva = name_rva, "import module name RVA not mapped");
            table.complete = false;
            break;
        };
        let Ok(name) = cur.read_cstring(name_offset, limits.max_string_len) else {
            table.complete = false;
            break;
        };

        // Bound import descriptors zero the lookup table; fall back to the
        // address table, which holds the same thunks before binding.
        let thunk_rva = if lookup_table_rva != 0 {
            lookup_table_rva
        } else {
            address_table_rva
        };

        let budget = limits.max_imports.saturating_sub(total_functions);
        let functions = read_thunks(cur, sections, thunk_rva, is_64bit, budget, limits, &mut table);
        total_functions += functions.len();

        table.modules.push(ImportedModule { name, functions });

        if total_functions >= limits.max_imports {
            warn!(cap = limits.max_imports, "import count capped");
            table.complete = false;
            break;
        }
    }

    debug!(
        modules = table.modules.len(),
        functions = table.function_count(),
        complete = table.complete,
        "import table parsed"
    );
    table
}

/// Walk one thunk array until its zero entry, emitting functions in thunk
/// order. Top bit set means ordinal import; otherwise the masked value is
/// the RVA of a `{hint: u16, name: ASCII}` record.
fn read_thunks(
    cur: &ByteCursor,
    sections: &SectionTable,
    thunk_rva: u32,
    is_64bit: bool,
    budget: usize,
    limits: &ParseLimits,
    table: &mut ImportTable,
) -> Vec<ImportedFunction> {
    let mut functions = Vec::new();
    if thunk_rva == 0 {
        return functions;
    }

    let Some(mut offset) = sections.rva_to_offset(thunk_rva) else {
        warn!(rva = thunk_rva, "import thunk array RVA not mapped");
        table.complete = false;
        return functions;
    };

    let entry_size = if is_64bit { 8 } else { 4 };
    let ordinal_bit = if is_64bit { 1u64 << 63 } else { 1u64 << 31 };
    let rva_mask = if is_64bit {
        (1u64 << 63) - 1
    } else {
        (1u64 << 31) - 1
    };

    while functions.len() < budget {
        let value = if is_64bit {
            cur.read_u64(offset)
        } else {
            cur.read_u32(offset).map(u64::from)
        };
        let Ok(value) = value else {
            table.complete = false;
            break;
        };
        if value == 0 {
            break;
        }
        offset += entry_size;

        if value & ordinal_bit != 0 {
            functions.push(ImportedFunction::ByOrdinal {
                ordinal: (value & 0xFFFF) as u16,
            });
            continue;
        }

        let hint_name_rva = (value & rva_mask) as u32;
        let Some(record_offset) = sections.rva_to_offset(hint_name_rva) else {
            warn!(rva = hint_name_rva, "import hint/name RVA not mapped");
            table.complete = false;
            break;
        };
        // Skip the 2-byte hint; only the name identifies the import.
        match cur.read_cstring(record_offset + 2, limits.max_string_len) {
            Ok(name) => functions.push(ImportedFunction::ByName { name }),
            Err(_) => {
                table.complete = false;
                break;
            }
        }
    }

    functions
}
