use crate::bus::{AccessSize, CacheControl, Sh2Memory};
use crate::cpu::CpuId;

/// Big-endian RAM mapped at `base`, shared by both CPUs.
///
/// Accesses outside the window read as zero and drop writes. Cache invalidations are recorded
/// so harnesses can assert on them.
#[derive(Debug, Clone)]
pub struct FlatMemory {
    base: u32,
    data: Vec<u8>,
    invalidations: Vec<(CpuId, u32, AccessSize)>,
}

impl FlatMemory {
    pub fn new(base: u32, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
            invalidations: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            if let Some(slot) = self.slot(addr.wrapping_add(i as u32)) {
                self.data[slot] = *byte;
            }
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn invalidations(&self) -> &[(CpuId, u32, AccessSize)] {
        &self.invalidations
    }

    fn slot(&self, addr: u32) -> Option<usize> {
        let offset = addr.checked_sub(self.base)? as usize;
        (offset < self.data.len()).then_some(offset)
    }

    fn range(&self, addr: u32, size: AccessSize) -> Option<std::ops::Range<usize>> {
        let start = self.slot(addr)?;
        let end = start + size.bytes() as usize;
        (end <= self.data.len()).then_some(start..end)
    }
}

impl Sh2Memory for FlatMemory {
    fn read(&mut self, _cpu: CpuId, addr: u32, size: AccessSize) -> u32 {
        match self.range(addr, size) {
            Some(range) => self.data[range]
                .iter()
                .fold(0u32, |acc, b| (acc << 8) | u32::from(*b)),
            None => 0,
        }
    }

    fn write(&mut self, cpu: CpuId, addr: u32, size: AccessSize, value: u32) {
        let Some(range) = self.range(addr, size) else {
            tracing::trace!(cpu = %cpu, addr, ?size, "write outside flat memory dropped");
            return;
        };
        let be = value.to_be_bytes();
        let width = size.bytes() as usize;
        self.data[range].copy_from_slice(&be[4 - width..]);
    }
}

impl CacheControl for FlatMemory {
    fn invalidate(&mut self, cpu: CpuId, addr: u32, size: AccessSize) {
        self.invalidations.push((cpu, addr, size));
    }
}
