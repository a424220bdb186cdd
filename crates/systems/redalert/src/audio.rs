//! Sound board command interface
//!
//! The main CPU talks to the sound hardware only through command latches.
//! The sound CPUs themselves run on the host's sound-board emulation, which
//! drains the latches and interrupt pulses recorded here.

use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

use crate::config::AudioBoard;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundBoard {
    board: AudioBoard,
    /// Byte presented to port A of the AY-3-8910
    sound_latch: u8,
    /// Four-bit voice sample select
    voice_latch: u8,
    /// Audio CPU NMI pulses not yet taken by the sound board
    audio_nmi_pulses: u32,
    /// Voice CPU RST 7.5 line level
    voice_irq: bool,
}

impl SoundBoard {
    pub fn new(board: AudioBoard) -> Self {
        Self {
            board,
            sound_latch: 0,
            voice_latch: 0,
            audio_nmi_pulses: 0,
            voice_irq: false,
        }
    }

    pub fn board(&self) -> AudioBoard {
        self.board
    }

    /// Red Alert sound command. D7 low fires the audio CPU NMI through a
    /// 74121 one-shot.
    pub fn redalert_audio_command(&mut self, data: u8) {
        self.latch(data);
        if data & 0x80 == 0 {
            self.audio_nmi_pulses += 1;
        }
    }

    /// Red Alert voice command: D3-D6 select the sample, D7 low raises the
    /// voice CPU interrupt.
    pub fn voice_command(&mut self, data: u8) {
        self.voice_latch = (data & 0x78) >> 3;
        self.voice_irq = data & 0x80 == 0;
        log(LogCategory::Audio, LogLevel::Trace, || {
            format!(
                "voice command {:02X}: sample {} irq {}",
                data, self.voice_latch, self.voice_irq
            )
        });
    }

    /// Demoneye-X sound command: every write interrupts the audio CPU.
    pub fn demoneye_audio_command(&mut self, data: u8) {
        self.latch(data);
        self.audio_nmi_pulses += 1;
    }

    fn latch(&mut self, data: u8) {
        log(LogCategory::Audio, LogLevel::Trace, || {
            format!("sound command {:02X}", data)
        });
        self.sound_latch = data;
    }

    pub fn sound_latch(&self) -> u8 {
        self.sound_latch
    }

    pub fn voice_latch(&self) -> u8 {
        self.voice_latch
    }

    pub fn voice_irq(&self) -> bool {
        self.voice_irq
    }

    /// Take one pending audio CPU NMI pulse.
    pub fn take_audio_nmi(&mut self) -> bool {
        if self.audio_nmi_pulses == 0 {
            return false;
        }
        self.audio_nmi_pulses -= 1;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.board);
    }
}
