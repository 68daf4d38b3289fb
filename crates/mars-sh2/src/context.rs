use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::cpu::CpuId;
use crate::fetch::FetchResult;

/// SR value after power-on reset: interrupt mask I3..I0 all set.
pub const SR_POWER_ON: u32 = 0x0000_00F0;

/// Opaque handle to the per-CPU device block (FRT, DMAC, DIVU, ...) owned by the emulator.
#[derive(Clone)]
pub struct DeviceHandle(Arc<dyn Any + Send + Sync>);

impl DeviceHandle {
    pub fn new<T: Any + Send + Sync>(devices: Arc<T>) -> Self {
        Self(devices)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether both handles point at the same device block.
    pub fn same_as(&self, other: &DeviceHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceHandle({:p})", Arc::as_ptr(&self.0))
    }
}

/// Execution state of one SH2 core.
///
/// Equality and hashing only look at the named control registers, the delay-slot flag and the
/// CPU identity. The general purpose registers, cycle counters and fetch state are ignored, so
/// two contexts compare equal whenever they sit at the same control state regardless of data.
#[derive(Debug, Clone)]
pub struct Sh2Context {
    pub regs: [u32; 16],
    pub gbr: u32,
    pub vbr: u32,
    pub sr: u32,
    pub mach: u32,
    pub macl: u32,
    pub pr: u32,
    pub pc: u32,

    pub opcode: u16,
    pub delay_pc: u32,
    pub delay_slot: bool,

    /// Cycles granted for the current slice.
    pub cycles: i32,
    /// Cycles consumed so far in the current slice.
    pub cycles_ran: i32,

    pub devices: Option<DeviceHandle>,
    pub fetch: FetchResult,

    cpu: CpuId,
    type_code: char,
    debug: bool,
}

impl Sh2Context {
    pub fn new(cpu: CpuId) -> Self {
        Self::with_debug(cpu, false)
    }

    pub fn with_debug(cpu: CpuId, debug: bool) -> Self {
        Self {
            regs: [0; 16],
            gbr: 0,
            vbr: 0,
            sr: 0,
            mach: 0,
            macl: 0,
            pr: 0,
            pc: 0,
            opcode: 0,
            delay_pc: 0,
            delay_slot: false,
            cycles: 0,
            cycles_ran: 0,
            devices: None,
            fetch: FetchResult::invalid(),
            cpu,
            type_code: cpu.type_code(),
            debug,
        }
    }

    #[inline]
    pub fn cpu(&self) -> CpuId {
        self.cpu
    }

    #[inline]
    pub fn type_code(&self) -> char {
        self.type_code
    }

    #[inline]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Reads `Rn`. Only the low four bits of `n` are used, as in the instruction encoding.
    #[inline]
    pub fn reg(&self, n: usize) -> u32 {
        self.regs[n & 0xF]
    }

    #[inline]
    pub fn set_reg(&mut self, n: usize, value: u32) {
        self.regs[n & 0xF] = value;
    }

    /// Applies the power-on/manual reset register state. The vectors are supplied by the caller,
    /// which has already read them through the bus.
    pub fn reset(&mut self, pc: u32, sp: u32) {
        self.regs = [0; 16];
        self.regs[15] = sp;
        self.pc = pc;
        self.vbr = 0;
        self.sr = SR_POWER_ON;
        self.opcode = 0;
        self.delay_pc = 0;
        self.delay_slot = false;
        self.cycles = 0;
        self.cycles_ran = 0;
        self.fetch = FetchResult::invalid();
        if self.debug {
            tracing::debug!(cpu = %self.cpu, pc, sp, "sh2 reset");
        }
    }

    /// Starts a new slice with `cycles` to spend.
    pub fn grant(&mut self, cycles: i32) {
        self.cycles = cycles;
        self.cycles_ran = 0;
    }

    /// Cycles still to spend in this slice. Saturates instead of wrapping when the counters
    /// hold extreme values.
    #[inline]
    pub fn cycles_left(&self) -> i32 {
        self.cycles.saturating_sub(self.cycles_ran)
    }

    pub fn attach_devices(&mut self, devices: DeviceHandle) {
        self.devices = Some(devices);
    }
}

impl PartialEq for Sh2Context {
    fn eq(&self, other: &Self) -> bool {
        self.gbr == other.gbr
            && self.vbr == other.vbr
            && self.sr == other.sr
            && self.mach == other.mach
            && self.macl == other.macl
            && self.pr == other.pr
            && self.pc == other.pc
            && self.delay_slot == other.delay_slot
            && self.cpu == other.cpu
            && self.type_code == other.type_code
    }
}

impl Eq for Sh2Context {}

impl Hash for Sh2Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.gbr.hash(state);
        self.vbr.hash(state);
        self.sr.hash(state);
        self.mach.hash(state);
        self.macl.hash(state);
        self.pr.hash(state);
        self.pc.hash(state);
        self.delay_slot.hash(state);
        self.cpu.hash(state);
        self.type_code.hash(state);
    }
}

impl fmt::Display for Sh2Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}SH2 cpu={} debug={}",
            self.type_code, self.cpu, self.debug
        )?;
        for (row, chunk) in self.regs.chunks(4).enumerate() {
            for (col, value) in chunk.iter().enumerate() {
                let n = row * 4 + col;
                if col != 0 {
                    f.write_str(" ")?;
                }
                write!(f, "R{n:<2}={value:08x}")?;
            }
            f.write_str("\n")?;
        }
        writeln!(
            f,
            "PC={:08x} PR={:08x} SR={:08x} GBR={:08x} VBR={:08x} MACH={:08x} MACL={:08x}",
            self.pc, self.pr, self.sr, self.gbr, self.vbr, self.mach, self.macl
        )?;
        writeln!(
            f,
            "opcode={:04x} delay_slot={} delay_pc={:08x} cycles={} cycles_ran={}",
            self.opcode, self.delay_slot, self.delay_pc, self.cycles, self.cycles_ran
        )?;
        match self.fetch.block.table_index() {
            Some(index) => write!(
                f,
                "fetch pc={:08x} opcode={:04x} block={index}",
                self.fetch.pc, self.fetch.opcode
            )?,
            None => write!(
                f,
                "fetch pc={:08x} opcode={:04x} block=<invalid>",
                self.fetch.pc, self.fetch.opcode
            )?,
        }
        if self.devices.is_some() {
            f.write_str(" devices=attached")?;
        }
        Ok(())
    }
}
