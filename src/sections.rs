//! Section table and RVA resolution.

use crate::cursor::ByteCursor;
use crate::error::Result;

/// One 40-byte section descriptor, reduced to the fields RVA resolution
/// needs.
#[derive(Debug, Clone)]
pub struct SectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
}

impl SectionHeader {
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(8);
        String::from_utf8_lossy(&self.name[..end]).to_string()
    }

    pub fn contains_rva(&self, rva: u32) -> bool {
        let size = self.virtual_size.max(self.size_of_raw_data);
        rva >= self.virtual_address && (rva - self.virtual_address) < size
    }
}

/// Ordered section list; the order is the file's own, so overlapping
/// sections in malformed images resolve to whichever descriptor comes
/// first.
#[derive(Debug, Clone)]
pub struct SectionTable {
    sections: Vec<SectionHeader>,
}

impl SectionTable {
    /// Read exactly `count` descriptors starting at `offset`. Truncation
    /// here is fatal: without a complete section table no RVA can be
    /// trusted.
    pub fn parse(cur: &ByteCursor, offset: usize, count: u16) -> Result<Self> {
        let mut sections = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let base = offset + i * 40;
            let mut name = [0u8; 8];
            name.copy_from_slice(cur.bytes(base, 8)?);
            sections.push(SectionHeader {
                name,
                virtual_size: cur.read_u32(base + 8)?,
                virtual_address: cur.read_u32(base + 12)?,
                size_of_raw_data: cur.read_u32(base + 16)?,
                pointer_to_raw_data: cur.read_u32(base + 20)?,
            });
        }
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[SectionHeader] {
        &self.sections
    }

    /// Map a virtual address to a file offset through the first section
    /// containing it, or `None` if no section maps it.
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        let section = self.sections.iter().find(|s| s.contains_rva(rva))?;
        Some((section.pointer_to_raw_data as usize) + (rva - section.virtual_address) as usize)
    }

    /// Inverse mapping, used to cross-check resolved offsets.
    pub fn offset_to_rva(&self, offset: usize) -> Option<u32> {
        for section in &self.sections {
            let start = section.pointer_to_raw_data as usize;
            let end = start + section.size_of_raw_data as usize;
            if offset >= start && offset < end {
                return Some(section.virtual_address + (offset - start) as u32);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteCursor;

    fn section(name: &str, va: u32, vsize: u32, raw: u32, rsize: u32) -> SectionHeader {
        let mut name_bytes = [0u8; 8];
        let len = name.len().min(8);
        name_bytes[..len].copy_from_slice(&name.as_bytes()[..len]);
        SectionHeader {
            name: name_bytes,
            virtual_size: vsize,
            virtual_address: va,
            size_of_raw_data: rsize,
            pointer_to_raw_data: raw,
        }
    }

    fn table(sections: Vec<SectionHeader>) -> SectionTable {
        SectionTable { sections }
    }

    #[test]
    fn test_rva_to_offset() {
        let t = table(vec![
            section(".text", 0x1000, 0x1000, 0x400, 0x1000),
            section(".data", 0x2000, 0x1000, 0x1400, 0x1000),
        ]);

        assert_eq!(t.rva_to_offset(0x1000), Some(0x400));
        assert_eq!(t.rva_to_offset(0x1500), Some(0x900));
        assert_eq!(t.rva_to_offset(0x2000), Some(0x1400));
        assert_eq!(t.rva_to_offset(0x2FFF), Some(0x23FF));

        // Unmapped RVAs are not an error here, only None.
        assert_eq!(t.rva_to_offset(0x500), None);
        assert_eq!(t.rva_to_offset(0x3000), None);
    }

    #[test]
    fn test_virtual_size_uses_larger_extent() {
        // Virtual size smaller than raw size: raw extent still maps.
        let t = table(vec![section(".data", 0x1000, 0x200, 0x400, 0x1000)]);
        assert_eq!(t.rva_to_offset(0x1800), Some(0xC00));
        assert_eq!(t.rva_to_offset(0x2000), None);
    }

    #[test]
    fn test_overlap_resolves_first_match() {
        let t = table(vec![
            section(".a", 0x1000, 0x1000, 0x400, 0x1000),
            section(".b", 0x1800, 0x1000, 0x2000, 0x1000),
        ]);
        // 0x1900 is inside both; the first descriptor wins.
        assert_eq!(t.rva_to_offset(0x1900), Some(0x400 + 0x900));
    }

    #[test]
    fn test_round_trip_consistency() {
        let t = table(vec![
            section(".text", 0x1000, 0x1000, 0x400, 0x1000),
            section(".rdata", 0x2000, 0x800, 0x1400, 0x800),
        ]);
        for rva in [0x1000u32, 0x1234, 0x1FFF, 0x2000, 0x27FF] {
            let offset = t.rva_to_offset(rva).unwrap();
            assert_eq!(t.offset_to_rva(offset), Some(rva));
        }
    }

    #[test]
    fn test_parse_section_table() {
        let mut data = vec![0u8; 120];
        data[0..5].copy_from_slice(b".text");
        data[8..12].copy_from_slice(&0x1000u32.to_le_bytes()); // virtual size
        data[12..16].copy_from_slice(&0x1000u32.to_le_bytes()); // virtual address
        data[16..20].copy_from_slice(&0x200u32.to_le_bytes()); // raw size
        data[20..24].copy_from_slice(&0x400u32.to_le_bytes()); // raw pointer
        data[40..46].copy_from_slice(b".rdata");
        data[52..56].copy_from_slice(&0x2000u32.to_le_bytes());

        let t = SectionTable::parse(&ByteCursor::new(&data), 0, 2).unwrap();
        assert_eq!(t.sections().len(), 2);
        assert_eq!(t.sections()[0].name(), ".text");
        assert_eq!(t.sections()[1].name(), ".rdata");
        assert_eq!(t.rva_to_offset(0x1100), Some(0x500));
    }

    #[test]
    fn test_parse_truncated_table_fails() {
        let data = vec![0u8; 50]; // room for one descriptor, not two
        assert!(SectionTable::parse(&ByteCursor::new(&data), 0, 2).is_err());
    }
}
