//! Main CPU bus
//!
//! Every access is decoded through the game's address map, then dispatched
//! to work RAM, the video board, the sound latches, the input ports, program
//! ROM or the interrupt clear port. Unmapped addresses read 0 and swallow
//! writes.

use emu_core::address_map::{AddressMap, ReadOp, WriteOp};
use emu_core::cpu_6502::Memory6502;
use emu_core::input::{DipSelection, InputError, InputPorts};
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

use crate::audio::SoundBoard;
use crate::games::GameDriver;
use crate::interrupts::InterruptLines;
use crate::memory_map::{Target, MAIN_CPU_REGION};
use crate::video::Video;

pub const MAIN_RAM_SIZE: usize = 0x2000;
pub const MAIN_REGION_SIZE: usize = 0x10000;

#[derive(Debug)]
pub struct MainBus {
    map: AddressMap<Target>,
    pub ram: Vec<u8>,
    pub video: Video,
    pub sound: SoundBoard,
    pub inputs: InputPorts,
    pub interrupts: InterruptLines,
    program: Vec<u8>,
    scanline: Cell<u16>,
}

/// Serializable part of the bus (everything but ROM and the map)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainBusState {
    pub ram: Vec<u8>,
    pub video: Video,
    pub sound: SoundBoard,
    pub interrupts: InterruptLines,
    pub dips: DipSelection,
}

impl MainBus {
    pub fn new(game: &'static GameDriver, map: AddressMap<Target>) -> Self {
        Self {
            map,
            ram: vec![0; MAIN_RAM_SIZE],
            video: Video::new(game.machine.video),
            sound: SoundBoard::new(game.machine.audio),
            inputs: InputPorts::new(game.input_ports),
            interrupts: InterruptLines::new(),
            program: vec![0; MAIN_REGION_SIZE],
            scanline: Cell::new(0),
        }
    }

    pub fn map(&self) -> &AddressMap<Target> {
        &self.map
    }

    /// Replace the program region image.
    pub fn set_program(&mut self, region: &[u8]) {
        self.program.clear();
        self.program.extend_from_slice(region);
        self.program.resize(MAIN_REGION_SIZE, 0);
    }

    /// Beam position reported by the interrupt clear port
    pub fn set_scanline(&self, line: u16) {
        self.scanline.set(line);
    }

    pub fn scanline(&self) -> u16 {
        self.scanline.get()
    }

    /// Board reset: latches and interrupt lines drop, memory survives.
    pub fn reset(&mut self) {
        self.interrupts.reset();
        self.sound.reset();
        self.inputs.release_all();
        self.scanline.set(0);
    }

    /// Power-on: also clears RAM and video memory.
    pub fn power_on(&mut self) {
        self.reset();
        self.ram.fill(0);
        self.video.clear();
    }

    pub fn snapshot(&self) -> MainBusState {
        MainBusState {
            ram: self.ram.clone(),
            video: self.video.clone(),
            sound: self.sound.clone(),
            interrupts: self.interrupts.clone(),
            dips: self.inputs.selection(),
        }
    }

    /// Restore a snapshot. The bus is untouched if the snapshot does not fit
    /// this machine.
    pub fn restore(&mut self, state: MainBusState) -> Result<(), RestoreError> {
        if state.ram.len() != MAIN_RAM_SIZE {
            return Err(RestoreError::Shape("ram"));
        }
        if state.video.board() != self.video.board() || !state.video.is_consistent() {
            return Err(RestoreError::Shape("video"));
        }
        if state.sound.board() != self.sound.board() {
            return Err(RestoreError::Shape("sound"));
        }
        let mut inputs = self.inputs.clone();
        inputs.reset_dips();
        inputs.apply(&state.dips)?;

        self.ram = state.ram;
        self.video = state.video;
        self.sound = state.sound;
        self.interrupts = state.interrupts;
        self.inputs = inputs;
        Ok(())
    }

    fn read_handler(&self, target: Target, offset: u16) -> u8 {
        match target {
            Target::MainRam => self.ram.get(offset as usize).copied().unwrap_or(0),
            Target::BitmapVideoRam => self.video.read_bitmap(offset),
            Target::CharmapVideoRam => self.video.read_charmap(offset),
            Target::InterruptClear => {
                self.interrupts.clear();
                // Games ignore the value; real hardware puts the beam line on the bus.
                self.scanline.get() as u8
            }
            Target::AudioCommand
            | Target::DemoneyeAudioCommand
            | Target::VoiceCommand
            | Target::VideoControl
            | Target::BitmapColor => 0,
        }
    }

    fn write_handler(&mut self, target: Target, offset: u16, val: u8) {
        match target {
            Target::MainRam => {
                if let Some(cell) = self.ram.get_mut(offset as usize) {
                    *cell = val;
                }
            }
            Target::BitmapVideoRam => self.video.write_bitmap(offset, val),
            Target::CharmapVideoRam => self.video.write_charmap(offset, val),
            Target::AudioCommand => self.sound.redalert_audio_command(val),
            Target::DemoneyeAudioCommand => self.sound.demoneye_audio_command(val),
            Target::VoiceCommand => self.sound.voice_command(val),
            Target::VideoControl => self.video.write_control(val),
            Target::BitmapColor => self.video.write_bitmap_color(val),
            Target::InterruptClear => self.interrupts.clear(),
        }
    }

    fn read_rom(&self, region: &str, index: u32) -> u8 {
        if region != MAIN_CPU_REGION {
            log(LogCategory::Stubs, LogLevel::Warn, || {
                format!("read from unsupported ROM region {region}")
            });
            return 0;
        }
        self.program.get(index as usize).copied().unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("saved {0} does not match this machine")]
    Shape(&'static str),
    #[error(transparent)]
    Dips(#[from] InputError),
}

impl Memory6502 for MainBus {
    fn read(&self, addr: u16) -> u8 {
        let Some(resolved) = self.map.resolve(addr) else {
            log(LogCategory::Stubs, LogLevel::Trace, || {
                format!("unmapped read {addr:04X}")
            });
            return 0;
        };
        match self.map.range(resolved.index).read {
            ReadOp::Nop => 0,
            ReadOp::Rom { region, base } => self.read_rom(region, base + resolved.offset as u32),
            ReadOp::Port(tag) => self.inputs.read(tag).unwrap_or(0),
            ReadOp::Handler(target) => self.read_handler(target, resolved.offset),
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        let Some(resolved) = self.map.resolve(addr) else {
            log(LogCategory::Stubs, LogLevel::Trace, || {
                format!("unmapped write {addr:04X} = {val:02X}")
            });
            return;
        };
        match self.map.range(resolved.index).write {
            WriteOp::Nop => {}
            WriteOp::Handler(target) => self.write_handler(target, resolved.offset, val),
        }
    }

    fn irq_line(&self) -> bool {
        self.interrupts.line(emu_core::cpu_6502::InputLine::Irq)
    }

    fn take_nmi(&self) -> bool {
        self.interrupts.take_nmi()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{DEMONEYE, REDALERT};
    use crate::inputs::{DIP_PORT, P1_PORT};
    use emu_core::input::{Control, InputType};

    fn bus_for(game: &'static GameDriver) -> MainBus {
        let map = AddressMap::build(game.memory_map).unwrap();
        MainBus::new(game, map)
    }

    #[test]
    fn test_ram_read_write() {
        let mut bus = bus_for(&REDALERT);
        bus.write(0x0000, 0x12);
        bus.write(0x1FFF, 0x34);
        assert_eq!(bus.read(0x0000), 0x12);
        assert_eq!(bus.read(0x1FFF), 0x34);
        assert_eq!(bus.ram[0x1FFF], 0x34);
    }

    #[test]
    fn test_bitmap_write_goes_through_video() {
        let mut bus = bus_for(&REDALERT);
        bus.write(0xC050, 0x06); // bitmap colour register
        bus.write(0x2010, 0xFF);
        assert_eq!(bus.read(0x2010), 0xFF);
        assert_eq!(bus.video.bitmap_colorram()[2], 0x06);
        // Register is write-only.
        assert_eq!(bus.read(0xC050), 0x00);
    }

    #[test]
    fn test_charmap_window_per_variant() {
        let mut red = bus_for(&REDALERT);
        red.write(0x4FFF, 0x11);
        assert_eq!(red.video.read_charmap(0x0FFF), 0x11);

        let mut demon = bus_for(&DEMONEYE);
        demon.write(0x5FFF, 0x22);
        assert_eq!(demon.video.read_charmap(0x1FFF), 0x22);
    }

    #[test]
    fn test_rom_mapping_and_vectors() {
        let mut bus = bus_for(&REDALERT);
        let mut region = vec![0u8; MAIN_REGION_SIZE];
        region[0x5000] = 0xA9;
        region[0xBFFF] = 0x60;
        region[0x8FFC] = 0x00;
        region[0x8FFD] = 0x50;
        bus.set_program(&region);

        assert_eq!(bus.read(0x5000), 0xA9);
        assert_eq!(bus.read(0xBFFF), 0x60);
        assert_eq!(emu_core::cpu_6502::read_vector(&bus, 0xFFFC), 0x5000);

        // ROM ignores writes.
        bus.write(0x5000, 0x00);
        assert_eq!(bus.read(0x5000), 0xA9);
    }

    #[test]
    fn test_ports_and_mirrors() {
        let mut bus = bus_for(&REDALERT);
        assert_eq!(bus.read(0xC000), 0x50);
        bus.inputs.press(Control::p1(InputType::Start1));
        for addr in [0xC010u16, 0xC110, 0xCF1F, 0xC09A] {
            assert_eq!(bus.read(addr), 0x01, "addr {addr:04X}");
        }
        assert_eq!(bus.inputs.read(P1_PORT), Some(0x01));
        bus.inputs.set_dip(DIP_PORT, "Lives", "5").unwrap();
        assert_eq!(bus.read(0xCA8F), 0x52);
    }

    #[test]
    fn test_interrupt_clear_on_read_and_write() {
        let mut bus = bus_for(&REDALERT);
        bus.interrupts.vblank(false);
        assert!(bus.irq_line());
        bus.set_scanline(200);
        assert_eq!(bus.read(0xC070), 200);
        assert!(!bus.irq_line());

        bus.interrupts.vblank(false);
        bus.write(0xC77F, 0x00);
        assert!(!bus.irq_line());

        // Clearing an already clear line is harmless.
        bus.write(0xC070, 0x00);
        assert!(!bus.irq_line());
    }

    #[test]
    fn test_sound_commands_per_variant() {
        let mut red = bus_for(&REDALERT);
        red.write(0xC030, 0x05);
        red.write(0xC060, 0x18);
        assert_eq!(red.sound.sound_latch(), 0x05);
        assert!(red.sound.take_audio_nmi());
        assert_eq!(red.sound.voice_latch(), 0x03);

        let mut demon = bus_for(&DEMONEYE);
        demon.write(0xC030, 0x85);
        assert_eq!(demon.sound.sound_latch(), 0x85);
        assert!(demon.sound.take_audio_nmi());
        // $C060 is an unknown port on the prototype.
        demon.write(0xC060, 0x18);
        assert_eq!(demon.sound.voice_latch(), 0x00);
        assert_eq!(demon.read(0xC062), 0x00);
    }

    #[test]
    fn test_unmapped_space() {
        let mut bus = bus_for(&REDALERT);
        bus.write(0xD000, 0x55);
        assert_eq!(bus.read(0xD000), 0x00);
        assert_eq!(bus.read(0xEFFF), 0x00);

        let demon = bus_for(&DEMONEYE);
        assert_eq!(demon.read(0xC063), 0x00);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut bus = bus_for(&REDALERT);
        bus.write(0x0100, 0xAB);
        bus.write(0xC040, 0x08);
        bus.inputs.set_dip(DIP_PORT, "Coinage", "Free Play").unwrap();
        bus.interrupts.vblank(false);
        let state = bus.snapshot();

        let mut other = bus_for(&REDALERT);
        other.restore(state).unwrap();
        assert_eq!(other.read(0x0100), 0xAB);
        assert_eq!(other.video.control(), 0x08);
        assert_eq!(other.read(0xC000), 0x40);
        assert!(other.irq_line());
    }

    #[test]
    fn test_restore_rejects_other_variant() {
        let red = bus_for(&REDALERT);
        let mut demon = bus_for(&DEMONEYE);
        demon.write(0x0000, 0x77);
        assert!(matches!(
            demon.restore(red.snapshot()),
            Err(RestoreError::Shape("video"))
        ));
        assert_eq!(demon.read(0x0000), 0x77);
    }

    #[test]
    fn test_power_on_clears_memory() {
        let mut bus = bus_for(&REDALERT);
        bus.write(0x0010, 1);
        bus.write(0x2000, 1);
        bus.interrupts.vblank(true);
        bus.power_on();
        assert_eq!(bus.read(0x0010), 0);
        assert_eq!(bus.read(0x2000), 0);
        assert!(!bus.irq_line());
        assert!(!bus.take_nmi());
    }
}
