//! Scripted 6502 stand-in for driver tests.
//!
//! Runs a fixed list of bus operations in a loop and services interrupts the
//! way a 6502 would: NMI always, IRQ only while unmasked.

use emu_core::cpu_6502::{
    read_vector, Cpu6502Core, Memory6502, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(u16),
    Write(u16, u8),
    /// Unmask IRQ
    Cli,
    Idle(u32),
}

#[derive(Debug, Default)]
pub struct ScriptedCpu {
    pub script: Vec<Op>,
    pos: usize,
    pub irq_masked: bool,
    /// Port the IRQ handler reads to acknowledge. Without one the handler
    /// spins forever with IRQ masked.
    pub irq_ack: Option<u16>,
    in_handler: bool,
    pub irqs: u32,
    pub nmis: u32,
    pub resets: u32,
    pub reset_vector: u16,
    /// Handler addresses fetched by the last NMI and IRQ
    pub nmi_vector: u16,
    pub irq_vector: u16,
    pub reads: Vec<(u16, u8)>,
}

impl ScriptedCpu {
    pub fn new(script: Vec<Op>) -> Self {
        Self {
            script,
            irq_masked: true,
            ..Self::default()
        }
    }

    pub fn with_irq_ack(mut self, addr: u16) -> Self {
        self.irq_ack = Some(addr);
        self
    }
}

impl<M: Memory6502> Cpu6502Core<M> for ScriptedCpu {
    fn reset(&mut self, memory: &mut M) {
        self.resets += 1;
        self.reset_vector = read_vector(memory, RESET_VECTOR);
        self.irq_masked = true;
        self.in_handler = false;
        self.pos = 0;
    }

    fn step(&mut self, memory: &mut M) -> u32 {
        if memory.take_nmi() {
            self.nmis += 1;
            self.nmi_vector = read_vector(memory, NMI_VECTOR);
            return 7;
        }
        if !self.irq_masked && memory.irq_line() {
            self.irqs += 1;
            self.irq_vector = read_vector(memory, IRQ_VECTOR);
            match self.irq_ack {
                Some(addr) => {
                    let value = memory.read(addr);
                    self.reads.push((addr, value));
                }
                None => {
                    self.irq_masked = true;
                    self.in_handler = true;
                }
            }
            return 7;
        }
        if self.in_handler {
            return 2;
        }

        let Some(&op) = self.script.get(self.pos) else {
            return 2;
        };
        self.pos = (self.pos + 1) % self.script.len();
        match op {
            Op::Read(addr) => {
                let value = memory.read(addr);
                self.reads.push((addr, value));
                4
            }
            Op::Write(addr, value) => {
                memory.write(addr, value);
                4
            }
            Op::Cli => {
                self.irq_masked = false;
                2
            }
            Op::Idle(cycles) => cycles,
        }
    }
}
