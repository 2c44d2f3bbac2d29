//! The pluggable memory backend and its reference mock implementation.
//!
//! Grounded on the teacher's `hardware/memory.rs` trait-of-accessors design
//! and `hardware/bus.rs`'s dispatch-by-address-range pattern, generalized
//! from the teacher's fixed GBA memory map to the spec's arbitrary,
//! caller-registered ranges (`cmdis/mock_cpu.py`'s `MockCpuModelDelegate`).

use byteorder::{ByteOrder, LittleEndian};
use log::warn;

/// Size, in bits, of a memory or register access. Mirrors the teacher's
/// `Rom8`/`Rom16`/`Rom32` trait split, collapsed into one parameterized
/// trait method per spec.md's external-interface description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSize {
    /// 8 bits.
    Byte,
    /// 16 bits.
    Halfword,
    /// 32 bits.
    Word,
}

impl AccessSize {
    /// Width in bytes.
    pub fn bytes(self) -> usize {
        match self {
            AccessSize::Byte => 1,
            AccessSize::Halfword => 2,
            AccessSize::Word => 4,
        }
    }
}

/// A pluggable backend for register- and memory-mapped I/O that instruction
/// semantics read and write. Accesses never fail: an out-of-range read
/// yields `0`, an out-of-range write is silently dropped, matching the
/// architecture's treatment of reserved/unimplemented address space at this
/// crate's level of fidelity.
pub trait MemoryBackend {
    /// Reads a memory-mapped register (as opposed to a `Cpu` core register).
    fn read_register(&self, index: u32) -> u32;

    /// Writes a memory-mapped register.
    fn write_register(&mut self, index: u32, value: u32);

    /// Reads `size` from `address`, little-endian.
    fn read_memory(&self, address: u32, size: AccessSize) -> u32;

    /// Writes `value` to `address`, little-endian, truncated to `size`.
    fn write_memory(&mut self, address: u32, size: AccessSize, value: u32);

    /// Bulk read of `len` bytes starting at `address`. The default
    /// implementation repeatedly calls [`MemoryBackend::read_memory`] a byte
    /// at a time; backends with a real linear buffer should override this.
    fn read_block(&self, address: u32, len: u32) -> Vec<u8> {
        (0..len).map(|i| self.read_memory(address.wrapping_add(i), AccessSize::Byte) as u8).collect()
    }

    /// Bulk write of `data` starting at `address`. See [`MemoryBackend::read_block`].
    fn write_block(&mut self, address: u32, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.write_memory(address.wrapping_add(i as u32), AccessSize::Byte, *byte as u32);
        }
    }
}

/// One caller-registered span of backing storage.
struct Range {
    start: u32,
    data: Vec<u8>,
}

/// A reference [`MemoryBackend`] over a handful of disjoint byte ranges,
/// each backed by a plain `Vec<u8>`. Lookup is `O(#ranges)`, matching
/// `cmdis/mock_cpu.py`'s linear `_find_mem` scan.
#[derive(Default)]
pub struct MockMemory {
    ranges: Vec<Range>,
    registers: std::collections::HashMap<u32, u32>,
}

impl MockMemory {
    /// Builds an empty mock memory with no registered ranges.
    pub fn new() -> MockMemory {
        MockMemory::default()
    }

    /// Registers `length` zero-initialized bytes starting at `start`.
    /// Ranges must not overlap an existing one; later registrations replace
    /// any that do (last-registration-wins), matching the teacher's policy
    /// of trusting the caller to set up a sane address map.
    pub fn add_range(&mut self, start: u32, length: u32) {
        self.ranges.push(Range { start, data: vec![0u8; length as usize] });
    }

    /// Registers a range pre-populated with `bytes`, e.g. to load a code
    /// image for disassembly/execution.
    pub fn add_range_with_data(&mut self, start: u32, bytes: Vec<u8>) {
        self.ranges.push(Range { start, data: bytes });
    }

    fn find(&self, address: u32) -> Option<(&Range, usize)> {
        for range in &self.ranges {
            let len = range.data.len() as u32;
            if address >= range.start && address < range.start.wrapping_add(len) {
                return Some((range, (address - range.start) as usize));
            }
        }
        None
    }

    fn find_mut(&mut self, address: u32) -> Option<(&mut Range, usize)> {
        for range in &mut self.ranges {
            let len = range.data.len() as u32;
            if address >= range.start && address < range.start.wrapping_add(len) {
                let offset = (address - range.start) as usize;
                return Some((range, offset));
            }
        }
        None
    }
}

impl MemoryBackend for MockMemory {
    fn read_register(&self, index: u32) -> u32 {
        *self.registers.get(&index).unwrap_or(&0)
    }

    fn write_register(&mut self, index: u32, value: u32) {
        self.registers.insert(index, value);
    }

    fn read_memory(&self, address: u32, size: AccessSize) -> u32 {
        if size != AccessSize::Byte && address % size.bytes() as u32 != 0 {
            warn!("misaligned {:?} read at {:#010x}", size, address);
        }
        let nbytes = size.bytes();
        match self.find(address) {
            Some((range, offset)) if offset + nbytes <= range.data.len() => {
                let slice = &range.data[offset..offset + nbytes];
                match size {
                    AccessSize::Byte => slice[0] as u32,
                    AccessSize::Halfword => LittleEndian::read_u16(slice) as u32,
                    AccessSize::Word => LittleEndian::read_u32(slice),
                }
            }
            _ => 0,
        }
    }

    fn write_memory(&mut self, address: u32, size: AccessSize, value: u32) {
        if size != AccessSize::Byte && address % size.bytes() as u32 != 0 {
            warn!("misaligned {:?} write at {:#010x}", size, address);
        }
        let nbytes = size.bytes();
        if let Some((range, offset)) = self.find_mut(address) {
            if offset + nbytes <= range.data.len() {
                let slice = &mut range.data[offset..offset + nbytes];
                match size {
                    AccessSize::Byte => slice[0] = value as u8,
                    AccessSize::Halfword => LittleEndian::write_u16(slice, value as u16),
                    AccessSize::Word => LittleEndian::write_u32(slice, value),
                }
            }
        }
    }

    fn read_block(&self, address: u32, len: u32) -> Vec<u8> {
        if let Some((range, offset)) = self.find(address) {
            let end = (offset + len as usize).min(range.data.len());
            if offset < end {
                let mut out = range.data[offset..end].to_vec();
                out.resize(len as usize, 0);
                return out;
            }
        }
        vec![0u8; len as usize]
    }

    fn write_block(&mut self, address: u32, data: &[u8]) {
        if let Some((range, offset)) = self.find_mut(address) {
            let end = (offset + data.len()).min(range.data.len());
            if offset < end {
                range.data[offset..end].copy_from_slice(&data[..end - offset]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_read_is_zero() {
        let mem = MockMemory::new();
        assert_eq!(mem.read_memory(0x1000, AccessSize::Word), 0);
    }

    #[test]
    fn out_of_range_write_is_dropped() {
        let mut mem = MockMemory::new();
        mem.write_memory(0x1000, AccessSize::Word, 0xDEADBEEF);
        assert_eq!(mem.read_memory(0x1000, AccessSize::Word), 0);
    }

    #[test]
    fn roundtrip_within_range() {
        let mut mem = MockMemory::new();
        mem.add_range(0x2000_0000, 0x100);
        mem.write_memory(0x2000_0010, AccessSize::Word, 0x12345678);
        assert_eq!(mem.read_memory(0x2000_0010, AccessSize::Word), 0x12345678);
        assert_eq!(mem.read_memory(0x2000_0010, AccessSize::Halfword), 0x5678);
        assert_eq!(mem.read_memory(0x2000_0012, AccessSize::Halfword), 0x1234);
    }

    #[test]
    fn register_storage_is_independent_of_memory() {
        let mut mem = MockMemory::new();
        mem.write_register(3, 42);
        assert_eq!(mem.read_register(3), 42);
        assert_eq!(mem.read_register(4), 0);
    }

    #[test]
    fn block_read_write() {
        let mut mem = MockMemory::new();
        mem.add_range(0, 16);
        mem.write_block(4, &[1, 2, 3, 4]);
        assert_eq!(mem.read_block(4, 4), vec![1, 2, 3, 4]);
        assert_eq!(mem.read_block(0, 4), vec![0, 0, 0, 0]);
    }
}
