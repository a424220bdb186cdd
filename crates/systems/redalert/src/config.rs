//! Machine configuration: CPU clock, screen timing and the video/sound boards
//! each game pairs with the main board.

use serde::{Deserialize, Serialize};

/// Main PCB crystal
pub const MAIN_PCB_CLOCK: u32 = 12_500_000;
/// The 6502 runs from the PCB clock divided by 16
pub const MAIN_CPU_CLOCK: u32 = MAIN_PCB_CLOCK / 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuConfig {
    pub kind: &'static str,
    pub clock_hz: u32,
}

/// Raster timing. Visible bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenConfig {
    pub refresh_hz: u32,
    pub total_width: u32,
    pub total_lines: u32,
    pub visible_x: (u32, u32),
    pub visible_y: (u32, u32),
}

impl ScreenConfig {
    pub fn visible_width(&self) -> u32 {
        self.visible_x.1 - self.visible_x.0 + 1
    }

    pub fn visible_height(&self) -> u32 {
        self.visible_y.1 - self.visible_y.0 + 1
    }

    /// Beam line after `elapsed` of the frame's `frame_cycles` cycles
    pub fn scanline_at(&self, elapsed: u64, frame_cycles: u64) -> u16 {
        if frame_cycles == 0 {
            return 0;
        }
        let line = elapsed * self.total_lines as u64 / frame_cycles;
        line.min(self.total_lines as u64 - 1) as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoBoard {
    /// M-27Sb / M-42-S sub boards, 4K character RAM
    RedAlert,
    /// Prototype board with 8K character RAM
    Demoneye,
}

impl VideoBoard {
    pub fn charmap_size(self) -> usize {
        match self {
            VideoBoard::RedAlert => 0x1000,
            VideoBoard::Demoneye => 0x2000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioBoard {
    /// 6502 + AY-3-8910 sound board and an 8085 voice board
    RedAlert,
    /// Prototype 6802 + 6821 + two AY-3-8910 board
    Demoneye,
}

impl AudioBoard {
    pub fn description(self) -> &'static str {
        match self {
            AudioBoard::RedAlert => "M6502 + AY-3-8910 sound, I8085 voice",
            AudioBoard::Demoneye => "M6802 + M6821 + 2x AY-3-8910",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MachineConfig {
    pub cpu: CpuConfig,
    pub screen: ScreenConfig,
    pub video: VideoBoard,
    pub audio: AudioBoard,
}

impl MachineConfig {
    /// Total CPU cycles elapsed at the end of `frames` frames. Working from
    /// absolute totals keeps the fractional cycles per frame from drifting.
    pub fn cycles_at_frame(&self, frames: u64) -> u64 {
        frames * self.cpu.clock_hz as u64 / self.screen.refresh_hz as u64
    }
}

const SCREEN: ScreenConfig = ScreenConfig {
    refresh_hz: 60,
    total_width: 32 * 8,
    total_lines: 32 * 8,
    visible_x: (0, 32 * 8 - 1),
    visible_y: (8, 31 * 8 - 1),
};

const MAIN_CPU: CpuConfig = CpuConfig {
    kind: "M6502",
    clock_hz: MAIN_CPU_CLOCK,
};

pub static REDALERT_MACHINE: MachineConfig = MachineConfig {
    cpu: MAIN_CPU,
    screen: SCREEN,
    video: VideoBoard::RedAlert,
    audio: AudioBoard::RedAlert,
};

pub static DEMONEYE_MACHINE: MachineConfig = MachineConfig {
    cpu: MAIN_CPU,
    screen: SCREEN,
    video: VideoBoard::Demoneye,
    audio: AudioBoard::Demoneye,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_clock() {
        assert_eq!(MAIN_CPU_CLOCK, 781_250);
        assert_eq!(REDALERT_MACHINE.cpu.clock_hz, DEMONEYE_MACHINE.cpu.clock_hz);
    }

    #[test]
    fn test_visible_area() {
        assert_eq!(SCREEN.visible_width(), 256);
        assert_eq!(SCREEN.visible_height(), 240);
    }

    #[test]
    fn test_frame_cycles_do_not_drift() {
        let m = &REDALERT_MACHINE;
        assert_eq!(m.cycles_at_frame(1), 13_020);
        assert_eq!(m.cycles_at_frame(60), 781_250);
        assert_eq!(m.cycles_at_frame(6000), 78_125_000);
    }

    #[test]
    fn test_scanline_mapping() {
        assert_eq!(SCREEN.scanline_at(0, 13_020), 0);
        assert_eq!(SCREEN.scanline_at(13_020 / 2, 13_020), 128);
        assert_eq!(SCREEN.scanline_at(13_019, 13_020), 255);
        // Overshoot past the frame end stays on the last line.
        assert_eq!(SCREEN.scanline_at(13_030, 13_020), 255);
        assert_eq!(SCREEN.scanline_at(5, 0), 0);
    }

    #[test]
    fn test_charmap_sizes() {
        assert_eq!(VideoBoard::RedAlert.charmap_size(), 0x1000);
        assert_eq!(VideoBoard::Demoneye.charmap_size(), 0x2000);
    }
}
