use loader::{ImageLoader, LoadError};
use mwboot_core::{
    PhysAddr,
    mem::{Memory, MemoryError},
};

const PT_NULL: u32 = 0;
const PT_LOAD: u32 = 1;
const PT_NOTE: u32 = 4;

#[test]
fn loadable_segment_copied_and_tail_zeroed() {
    // The canonical scenario: three program headers, one loadable with
    // filesz=100, memsz=150, vaddr=0x1000, extracted against base 0x2000.
    let data: Vec<u8> = (0..100).map(|i| i as u8 ^ 0x5A).collect();
    let image = build_elf(
        0x1234,
        &[
            SegmentSpec {
                kind: PT_NOTE,
                vaddr: 0,
                data: vec![9; 16],
                mem_size: 16,
            },
            SegmentSpec {
                kind: PT_LOAD,
                vaddr: 0x1000,
                data: data.clone(),
                mem_size: 150,
            },
            SegmentSpec {
                kind: PT_NULL,
                vaddr: 0,
                data: vec![],
                mem_size: 0,
            },
        ],
    );

    let mut mem = MemWindow::new(0x2000, 0x2000);
    let loaded = ImageLoader::load(&image, PhysAddr::new(0x2000), &mut mem).expect("load ok");

    assert_eq!(mem.slice(0x3000, 100), &data[..]);
    assert_eq!(mem.slice(0x3064, 50), &[0u8; 50]);
    // Nothing before or after the segment footprint was touched.
    assert_eq!(mem.slice(0x2FFF, 1), &[0xAA]);
    assert_eq!(mem.slice(0x3096, 1), &[0xAA]);

    // One copy and one zero fill; the non-loadable entries produced nothing.
    assert_eq!(mem.copies, 1);
    assert_eq!(mem.zero_fills, 1);

    assert_eq!(loaded.loadable_segments, 1);
    assert_eq!(loaded.entry_point, PhysAddr::new(0x2000 + 0x1234));
}

#[test]
fn bad_magic_is_rejected_without_writes() {
    let mut image = build_elf(
        0x10,
        &[SegmentSpec {
            kind: PT_LOAD,
            vaddr: 0x100,
            data: vec![1, 2, 3, 4],
            mem_size: 4,
        }],
    );
    image[0] = 0x7E;

    let mut mem = MemWindow::new(0, 0x1000);
    let err = ImageLoader::load(&image, PhysAddr::new(0), &mut mem).unwrap_err();

    assert_eq!(err, LoadError::InvalidFormat);
    assert_eq!(mem.copies, 0);
    assert_eq!(mem.zero_fills, 0);
}

#[test]
fn equal_file_and_memory_size_skips_zero_fill() {
    let image = build_elf(
        0,
        &[SegmentSpec {
            kind: PT_LOAD,
            vaddr: 0x40,
            data: vec![7; 32],
            mem_size: 32,
        }],
    );

    let mut mem = MemWindow::new(0, 0x1000);
    ImageLoader::load(&image, PhysAddr::new(0), &mut mem).expect("load ok");

    assert_eq!(mem.copies, 1);
    assert_eq!(mem.zero_fills, 0);
    assert_eq!(mem.slice(0x40, 32), &[7u8; 32]);
}

#[test]
fn truncated_segment_is_rejected() {
    let mut image = build_elf(
        0,
        &[SegmentSpec {
            kind: PT_LOAD,
            vaddr: 0x100,
            data: vec![5; 64],
            mem_size: 64,
        }],
    );
    // Point the segment's file offset past the end of the buffer.
    let phdr = 0x40;
    image[phdr + 8..phdr + 16].copy_from_slice(&u64::MAX.to_le_bytes());

    let mut mem = MemWindow::new(0, 0x1000);
    let err = ImageLoader::load(&image, PhysAddr::new(0), &mut mem).unwrap_err();

    assert_eq!(err, LoadError::Truncated);
    assert_eq!(mem.copies, 0);
}

#[test]
fn destination_failure_propagates() {
    let image = build_elf(
        0,
        &[SegmentSpec {
            kind: PT_LOAD,
            vaddr: 0x100,
            data: vec![5; 64],
            mem_size: 64,
        }],
    );

    // A window too small for the segment's destination range.
    let mut mem = MemWindow::new(0, 0x80);
    let err = ImageLoader::load(&image, PhysAddr::new(0), &mut mem).unwrap_err();

    assert_eq!(err, LoadError::Memory(MemoryError::OutOfBounds));
}

#[test]
fn entry_point_is_rebased_onto_destination() {
    let image = build_elf(
        0x40,
        &[SegmentSpec {
            kind: PT_LOAD,
            vaddr: 0,
            data: vec![0; 128],
            mem_size: 128,
        }],
    );

    let mut mem = MemWindow::new(0x8000, 0x1000);
    let loaded = ImageLoader::load(&image, PhysAddr::new(0x8000), &mut mem).expect("load ok");

    assert_eq!(loaded.entry_point, PhysAddr::new(0x8040));
}

/// A bounded destination window pre-filled with `0xAA` so zero fills are
/// observable, recording how many operations of each kind were issued.
struct MemWindow {
    base: u64,
    bytes: Vec<u8>,
    copies: usize,
    zero_fills: usize,
}

impl MemWindow {
    fn new(base: u64, len: usize) -> Self {
        Self {
            base,
            bytes: vec![0xAA; len],
            copies: 0,
            zero_fills: 0,
        }
    }

    fn range(&self, addr: u64, len: usize) -> Result<core::ops::Range<usize>, MemoryError> {
        let start = addr
            .checked_sub(self.base)
            .and_then(|off| usize::try_from(off).ok())
            .ok_or(MemoryError::OutOfBounds)?;
        let end = start.checked_add(len).ok_or(MemoryError::OutOfBounds)?;
        if end > self.bytes.len() {
            return Err(MemoryError::OutOfBounds);
        }
        Ok(start..end)
    }

    fn slice(&self, addr: u64, len: usize) -> &[u8] {
        let range = self.range(addr, len).expect("in window");
        &self.bytes[range]
    }
}

impl Memory for MemWindow {
    fn copy_to(&mut self, dest: PhysAddr, src: &[u8]) -> Result<(), MemoryError> {
        let range = self.range(dest.as_u64(), src.len())?;
        self.bytes[range].copy_from_slice(src);
        self.copies += 1;
        Ok(())
    }

    fn zero(&mut self, dest: PhysAddr, len: u64) -> Result<(), MemoryError> {
        let len = usize::try_from(len).map_err(|_| MemoryError::OutOfBounds)?;
        let range = self.range(dest.as_u64(), len)?;
        self.bytes[range].fill(0);
        self.zero_fills += 1;
        Ok(())
    }
}

struct SegmentSpec {
    kind: u32,
    vaddr: u64,
    data: Vec<u8>,
    mem_size: u64,
}

/// Build a minimal little-endian ELF64 image: header, program-header table,
/// then each segment's file data appended in order.
fn build_elf(entry: u64, segments: &[SegmentSpec]) -> Vec<u8> {
    let phoff = 0x40u64;
    let phentsize = 56u16;
    let phnum = segments.len() as u16;

    let ph_table_end = phoff as usize + usize::from(phnum) * usize::from(phentsize);
    let mut elf = vec![0u8; ph_table_end];

    elf[0..4].copy_from_slice(&[0x7F, b'E', b'L', b'F']);
    elf[4] = 2; // 64-bit
    elf[5] = 1; // little-endian
    elf[6] = 1; // version

    write_u16(&mut elf, 0x10, 2); // ET_EXEC
    write_u16(&mut elf, 0x12, 21); // EM_PPC64: the payload targets the soft core
    write_u32(&mut elf, 0x14, 1); // version
    write_u64(&mut elf, 0x18, entry);
    write_u64(&mut elf, 0x20, phoff);
    write_u16(&mut elf, 0x34, 64); // ehsize
    write_u16(&mut elf, 0x36, phentsize);
    write_u16(&mut elf, 0x38, phnum);

    let mut cursor = ph_table_end as u64;
    for (idx, seg) in segments.iter().enumerate() {
        assert!(seg.mem_size >= seg.data.len() as u64 || seg.data.is_empty());

        let base = phoff as usize + idx * usize::from(phentsize);
        write_u32(&mut elf, base, seg.kind);
        write_u32(&mut elf, base + 4, 0x4); // PF_R
        write_u64(&mut elf, base + 8, cursor);
        write_u64(&mut elf, base + 16, seg.vaddr);
        write_u64(&mut elf, base + 24, seg.vaddr);
        write_u64(&mut elf, base + 32, seg.data.len() as u64);
        write_u64(&mut elf, base + 40, seg.mem_size);
        write_u64(&mut elf, base + 48, 8);

        elf.extend_from_slice(&seg.data);
        cursor += seg.data.len() as u64;
    }

    elf
}

fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
