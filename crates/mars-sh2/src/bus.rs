use crate::context::Sh2Context;
use crate::cpu::CpuId;
use crate::fetch::{BlockRef, FetchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessSize {
    Byte,
    Word,
    Long,
}

impl AccessSize {
    pub const fn bytes(self) -> u32 {
        match self {
            AccessSize::Byte => 1,
            AccessSize::Word => 2,
            AccessSize::Long => 4,
        }
    }

    /// Clears the address bits below natural alignment; SH2 drives the bus this way on
    /// misaligned accesses before the interpreter raises the address error.
    #[inline]
    pub const fn align(self, addr: u32) -> u32 {
        addr & !(self.bytes() - 1)
    }

    #[inline]
    const fn mask(self) -> u32 {
        match self {
            AccessSize::Byte => 0xFF,
            AccessSize::Word => 0xFFFF,
            AccessSize::Long => 0xFFFF_FFFF,
        }
    }
}

/// Minimal capability a system bus implements for the SH2 pair.
///
/// Reads and writes carry the requesting CPU because the 32X maps per-CPU on-chip registers at
/// the same addresses. Reads take `&mut self` since register reads can have side effects.
pub trait Sh2Memory {
    fn read(&mut self, cpu: CpuId, addr: u32, size: AccessSize) -> u32;
    fn write(&mut self, cpu: CpuId, addr: u32, size: AccessSize, value: u32);
}

/// Receives cache invalidation requests (cache purge writes and DMA into cached regions).
pub trait CacheControl {
    fn invalidate(&mut self, cpu: CpuId, addr: u32, size: AccessSize);
}

/// Typed accessors and instruction fetch built on an [`Sh2Memory`].
pub struct Sh2Bus<M> {
    memory: M,
    invalidate: Option<fn(&mut M, CpuId, u32, AccessSize)>,
}

impl<M: Sh2Memory> Sh2Bus<M> {
    pub fn new(memory: M) -> Self {
        Self {
            memory,
            invalidate: None,
        }
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn into_inner(self) -> M {
        self.memory
    }

    pub fn read8(&mut self, cpu: CpuId, addr: u32) -> u8 {
        self.read(cpu, addr, AccessSize::Byte) as u8
    }

    pub fn read16(&mut self, cpu: CpuId, addr: u32) -> u16 {
        self.read(cpu, addr, AccessSize::Word) as u16
    }

    pub fn read32(&mut self, cpu: CpuId, addr: u32) -> u32 {
        self.read(cpu, addr, AccessSize::Long)
    }

    pub fn write8(&mut self, cpu: CpuId, addr: u32, value: u8) {
        self.write(cpu, addr, AccessSize::Byte, u32::from(value));
    }

    pub fn write16(&mut self, cpu: CpuId, addr: u32, value: u16) {
        self.write(cpu, addr, AccessSize::Word, u32::from(value));
    }

    pub fn write32(&mut self, cpu: CpuId, addr: u32, value: u32) {
        self.write(cpu, addr, AccessSize::Long, value);
    }

    /// Fetches the instruction at `ctx.pc` into `ctx.opcode` and the context's fetch holder.
    pub fn fetch(&mut self, ctx: &mut Sh2Context) -> u16 {
        let pc = ctx.pc;
        let opcode = self.read16(ctx.cpu(), pc);
        ctx.opcode = opcode;
        ctx.fetch = FetchResult {
            pc,
            opcode,
            block: BlockRef::INVALID,
        };
        opcode
    }

    /// Fetches the delay slot instruction at `pc` into `ctx.opcode`.
    ///
    /// `delay_pc` holds the pending branch target and belongs to the interpreter, so it is left
    /// alone. The fetch holder keeps describing the branch.
    pub fn fetch_delay_slot(&mut self, ctx: &mut Sh2Context, pc: u32) -> u16 {
        let opcode = self.read16(ctx.cpu(), pc);
        ctx.opcode = opcode;
        opcode
    }

    /// Forwards an invalidation to the memory when it was built with [`Sh2Bus::with_cache`].
    /// Returns whether anyone received it.
    pub fn invalidate(&mut self, cpu: CpuId, addr: u32, size: AccessSize) -> bool {
        match self.invalidate {
            Some(invalidate) => {
                invalidate(&mut self.memory, cpu, size.align(addr), size);
                true
            }
            None => false,
        }
    }

    fn read(&mut self, cpu: CpuId, addr: u32, size: AccessSize) -> u32 {
        self.memory.read(cpu, size.align(addr), size) & size.mask()
    }

    fn write(&mut self, cpu: CpuId, addr: u32, size: AccessSize, value: u32) {
        self.memory
            .write(cpu, size.align(addr), size, value & size.mask());
    }
}

impl<M: Sh2Memory + CacheControl> Sh2Bus<M> {
    pub fn with_cache(memory: M) -> Self {
        Self {
            memory,
            invalidate: Some(<M as CacheControl>::invalidate),
        }
    }
}
