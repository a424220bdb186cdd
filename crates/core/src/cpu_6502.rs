//! MOS 6502 bus and CPU seams
//!
//! Systems built around a 6502 implement [`Memory6502`] for their main bus and
//! are driven by any core implementing [`Cpu6502Core`]. Interrupt lines are
//! owned by the bus side so that bus handlers (e.g. an interrupt acknowledge
//! port) can change them in the middle of an instruction.

/// Memory interface trait for the 6502 CPU
///
/// Systems using the 6502 must implement this trait to provide memory access.
pub trait Memory6502 {
    /// Read a byte from memory at the given address
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to memory at the given address
    fn write(&mut self, addr: u16, val: u8);

    /// Level of the maskable IRQ input. The core samples it between
    /// instructions and honours the I flag.
    fn irq_line(&self) -> bool {
        false
    }

    /// Consume a pending NMI edge. Returns true at most once per pulse.
    fn take_nmi(&self) -> bool {
        false
    }
}

/// Instruction-level 6502 core.
///
/// The core does not own the bus; the system lends it for every call so the
/// system can inspect bus state between instructions.
pub trait Cpu6502Core<M: Memory6502> {
    /// Power-on/reset: load PC from the reset vector at $FFFC.
    fn reset(&mut self, memory: &mut M);

    /// Service pending interrupts, execute one instruction and return the
    /// cycles used.
    fn step(&mut self, memory: &mut M) -> u32;
}

/// Named interrupt inputs of the 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InputLine {
    Irq,
    Nmi,
}

/// Read the little-endian vector stored at `addr`.
pub fn read_vector<M: Memory6502 + ?Sized>(memory: &M, addr: u16) -> u16 {
    let lo = memory.read(addr) as u16;
    let hi = memory.read(addr.wrapping_add(1)) as u16;
    (hi << 8) | lo
}

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
