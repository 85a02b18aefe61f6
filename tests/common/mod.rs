//! Synthetic PE images for integration tests.
//!
//! Builds a minimal but well-formed image in memory: header chain, one
//! section at RVA 0x1000 (file offset 0x200), and optionally an export
//! table (Foo @1, unnamed @2, Bar @3, one unused slot), an import table
//! (KERNEL32.DLL: CreateFileW, CloseHandle, ordinal 5), and a CLR
//! directory entry.

use std::io::Write;

use tempfile::NamedTempFile;

pub const SECTION_RVA: u32 = 0x1000;
pub const SECTION_FILE_OFFSET: usize = 0x200;
pub const EXPORT_DIR_RVA: u32 = 0x1000;
pub const IMPORT_DIR_RVA: u32 = 0x1100;

#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub is_64bit: bool,
    pub dll: bool,
    pub with_exports: bool,
    pub with_imports: bool,
    pub with_clr: bool,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            is_64bit: false,
            dll: true,
            with_exports: true,
            with_imports: true,
            with_clr: false,
        }
    }
}

fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(data: &mut [u8], offset: usize, value: u64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn put_str(data: &mut [u8], offset: usize, value: &[u8]) {
    data[offset..offset + value.len()].copy_from_slice(value);
}

pub fn build_sample(opts: &SampleOptions) -> Vec<u8> {
    let mut data = vec![0u8; SECTION_FILE_OFFSET + 0x1000];

    let pe_offset = 0x80usize;
    let opt_offset = pe_offset + 24;
    let (machine, opt_size, dir_start) = if opts.is_64bit {
        (0x8664u16, 240usize, 112usize)
    } else {
        (0x014cu16, 224usize, 96usize)
    };

    // Legacy stub and image signature.
    put_u16(&mut data, 0, 0x5A4D);
    put_u32(&mut data, 0x3C, pe_offset as u32);
    put_u32(&mut data, pe_offset, 0x0000_4550);

    // File header.
    put_u16(&mut data, pe_offset + 4, machine);
    put_u16(&mut data, pe_offset + 6, 1); // sections
    put_u16(&mut data, pe_offset + 20, opt_size as u16);
    let characteristics = 0x0002u16 | if opts.dll { 0x2000 } else { 0 };
    put_u16(&mut data, pe_offset + 22, characteristics);

    // Optional header: magic and directory count are all the parser needs.
    put_u16(
        &mut data,
        opt_offset,
        if opts.is_64bit { 0x20B } else { 0x10B },
    );
    put_u32(&mut data, opt_offset + dir_start - 4, 16);

    // Data directories.
    let dir = |index: usize| opt_offset + dir_start + index * 8;
    if opts.with_exports {
        put_u32(&mut data, dir(0), EXPORT_DIR_RVA);
        put_u32(&mut data, dir(0) + 4, 0x100);
    }
    if opts.with_imports {
        put_u32(&mut data, dir(1), IMPORT_DIR_RVA);
        put_u32(&mut data, dir(1) + 4, 0xA0);
    }
    if opts.with_clr {
        put_u32(&mut data, dir(14), 0x2000);
        put_u32(&mut data, dir(14) + 4, 0x48);
    }

    // Single section covering RVA 0x1000..0x2000 at file offset 0x200.
    let section = opt_offset + opt_size;
    put_str(&mut data, section, b".rdata");
    put_u32(&mut data, section + 8, 0x1000); // virtual size
    put_u32(&mut data, section + 12, SECTION_RVA);
    put_u32(&mut data, section + 16, 0x1000); // raw size
    put_u32(&mut data, section + 20, SECTION_FILE_OFFSET as u32);

    if opts.with_exports {
        write_export_table(&mut data);
    }
    if opts.with_imports {
        write_import_table(&mut data, opts.is_64bit);
    }

    data
}

/// Export directory at RVA 0x1000: ordinal base 1, four address slots
/// (Foo, unnamed, Bar, unused zero slot), two names.
fn write_export_table(data: &mut [u8]) {
    let base = SECTION_FILE_OFFSET;
    put_u32(data, base + 12, SECTION_RVA + 0x4C); // "SAMPLE.DLL"
    put_u32(data, base + 16, 1); // ordinal base
    put_u32(data, base + 20, 4); // number of functions
    put_u32(data, base + 24, 2); // number of names
    put_u32(data, base + 28, SECTION_RVA + 0x28); // address table
    put_u32(data, base + 32, SECTION_RVA + 0x38); // name pointer table
    put_u32(data, base + 36, SECTION_RVA + 0x40); // name ordinal table

    put_u32(data, base + 0x28, 0x4111); // Foo
    put_u32(data, base + 0x2C, 0x4222); // unnamed
    put_u32(data, base + 0x30, 0x4333); // Bar
    put_u32(data, base + 0x34, 0); // unused slot

    put_u32(data, base + 0x38, SECTION_RVA + 0x44); // -> "Foo"
    put_u32(data, base + 0x3C, SECTION_RVA + 0x48); // -> "Bar"
    put_u16(data, base + 0x40, 0); // Foo is slot 0
    put_u16(data, base + 0x42, 2); // Bar is slot 2

    put_str(data, base + 0x44, b"Foo\0");
    put_str(data, base + 0x48, b"Bar\0");
    put_str(data, base + 0x4C, b"SAMPLE.DLL\0");
}

/// Import directory at RVA 0x1100: one KERNEL32.DLL descriptor, thunks
/// CreateFileW, CloseHandle, ordinal 5, then terminators.
fn write_import_table(data: &mut [u8], is_64bit: bool) {
    let base = SECTION_FILE_OFFSET + 0x100;
    put_u32(data, base, SECTION_RVA + 0x140); // lookup table RVA
    put_u32(data, base + 12, SECTION_RVA + 0x128); // name RVA
    put_u32(data, base + 16, SECTION_RVA + 0x180); // address table RVA
    // All-zero descriptor at base + 20 terminates the list.

    put_str(data, base + 0x28, b"KERNEL32.DLL\0");

    let thunks = SECTION_FILE_OFFSET + 0x140;
    if is_64bit {
        put_u64(data, thunks, u64::from(SECTION_RVA + 0x160));
        put_u64(data, thunks + 8, u64::from(SECTION_RVA + 0x170));
        put_u64(data, thunks + 16, (1u64 << 63) | 5);
    } else {
        put_u32(data, thunks, SECTION_RVA + 0x160);
        put_u32(data, thunks + 4, SECTION_RVA + 0x170);
        put_u32(data, thunks + 8, (1u32 << 31) | 5);
    }

    // Hint/name records: 2-byte hint then the name.
    put_str(data, SECTION_FILE_OFFSET + 0x160, b"\x02\x00CreateFileW\0");
    put_str(data, SECTION_FILE_OFFSET + 0x170, b"\x07\x00CloseHandle\0");
}

/// Write `content` to a fresh temp file and return its guard.
pub fn write_temp_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content).expect("write temp file");
    file
}
