//! Main CPU interrupt generation
//!
//! VBlank asserts IRQ and holds it until the game touches the interrupt
//! clear port ($C070). Coin inputs are wired to NMI, so each coin drop pulses
//! NMI once at the next VBlank.

use emu_core::cpu_6502::InputLine;
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Interrupt inputs of the main CPU. Cells let the bus clear IRQ from a
/// read access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterruptLines {
    irq: Cell<bool>,
    nmi_pending: Cell<bool>,
}

impl InterruptLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Once-per-frame VBlank callback.
    pub fn vblank(&self, coin_active: bool) {
        if coin_active {
            log(LogCategory::Interrupts, LogLevel::Debug, || {
                "coin input active, pulsing NMI".to_string()
            });
            self.nmi_pending.set(true);
        }
        self.irq.set(true);
    }

    /// Interrupt acknowledge. Leaves IRQ clear whatever its previous state.
    pub fn clear(&self) {
        if self.irq.replace(false) {
            log(LogCategory::Interrupts, LogLevel::Trace, || {
                "IRQ cleared".to_string()
            });
        }
    }

    pub fn line(&self, line: InputLine) -> bool {
        match line {
            InputLine::Irq => self.irq.get(),
            InputLine::Nmi => self.nmi_pending.get(),
        }
    }

    /// Hand a pending NMI pulse to the CPU.
    pub fn take_nmi(&self) -> bool {
        self.nmi_pending.replace(false)
    }

    pub fn reset(&self) {
        self.irq.set(false);
        self.nmi_pending.set(false);
    }
}
