//! Irem Red Alert / Demoneye-X main board.
//!
//! Both games run on the same 6502 main board (M-27M-C) and differ only in
//! the video and sound boards plugged into it. The driver wires the board's
//! address decoding, interrupt generation and input ports around a host
//! supplied 6502 core; the sound CPUs are reached only through command
//! latches.

pub mod audio;
pub mod bus;
pub mod config;
pub mod games;
pub mod inputs;
pub mod interrupts;
pub mod memory_map;
pub mod roms;
pub mod video;

#[cfg(test)]
mod test_cpu;

use std::collections::{HashMap, HashSet};

use bus::{MainBus, MainBusState};
use emu_core::address_map::{AddressMap, AddressMapError};
use emu_core::cpu_6502::Cpu6502Core;
use emu_core::input::{Control, DipSelection, InputError};
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::rom::{RomDiagnostic, RomEntry, RomError, RomSet, RomSource};
use emu_core::{types::Frame, MountPointInfo, System};
use games::{GameDriver, GameFlags};
use inputs::COIN_PORT;
use memory_map::MAIN_CPU_REGION;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum RedAlertError {
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),
    #[error("Address map error: {0}")]
    AddressMap(#[from] AddressMapError),
    #[error("Input error: {0}")]
    Input(#[from] InputError),
    #[error("Required ROMs not loaded: {0}")]
    MissingRoms(String),
    #[error("Invalid mount point: {0}")]
    InvalidMountPoint(String),
    #[error("Unknown game: {0}")]
    UnknownGame(String),
}

const SAVE_STATE_VERSION: u64 = 1;

#[derive(Serialize, Deserialize)]
struct SaveState {
    system: String,
    version: u64,
    frames: u64,
    cycles: u64,
    bus: MainBusState,
}

/// One Red Alert class machine driven by the 6502 core `C`.
pub struct RedAlertSystem<C> {
    game: &'static GameDriver,
    cpu: C,
    bus: MainBus,
    regions: HashMap<&'static str, Vec<u8>>,
    /// ROM files currently present, by table name
    mounted: HashSet<&'static str>,
    /// Checksum warnings for the ROM data currently loaded
    diagnostics: Vec<RomDiagnostic>,
    frames: u64,
    /// Main CPU cycles since power-on
    cycles: u64,
    /// Program ROM changed since the CPU last fetched its reset vector
    needs_reset: bool,
}

impl<C: Cpu6502Core<MainBus>> RedAlertSystem<C> {
    pub fn new(game: &'static GameDriver, cpu: C) -> Result<Self, RedAlertError> {
        game.roms.validate()?;
        for port in game.input_ports {
            port.validate()?;
        }
        let map = AddressMap::build(game.memory_map)?;
        log(LogCategory::Bus, LogLevel::Debug, || {
            format!(
                "{}: {} ranges, {} unmapped addresses",
                game.name,
                map.ranges().len(),
                map.unmapped_count()
            )
        });

        let regions = game
            .roms
            .regions
            .iter()
            .map(|r| (r.tag, vec![0u8; r.size as usize]))
            .collect();

        Ok(Self {
            game,
            cpu,
            bus: MainBus::new(game, map),
            regions,
            mounted: HashSet::new(),
            diagnostics: Vec::new(),
            frames: 0,
            cycles: 0,
            needs_reset: true,
        })
    }

    /// Build the machine for a game by short name.
    pub fn for_game(name: &str, cpu: C) -> Result<Self, RedAlertError> {
        let game =
            games::find_game(name).ok_or_else(|| RedAlertError::UnknownGame(name.to_string()))?;
        Self::new(game, cpu)
    }

    /// Load every file of the game's ROM set. Returns checksum warnings.
    pub fn load_rom_set(
        &mut self,
        source: &dyn RomSource,
    ) -> Result<Vec<RomDiagnostic>, RedAlertError> {
        let loaded = self.game.roms.load(source)?;
        self.regions = loaded.regions;
        self.mounted = self.game.roms.entries().map(|(_, e)| e.name).collect();
        self.sync_program();
        log(LogCategory::Rom, LogLevel::Info, || {
            format!(
                "{}: ROM set loaded ({} warnings)",
                self.game.name,
                loaded.diagnostics.len()
            )
        });
        self.diagnostics = loaded.diagnostics.clone();
        Ok(loaded.diagnostics)
    }

    /// Checksum warnings for every ROM file currently mounted.
    pub fn diagnostics(&self) -> &[RomDiagnostic] {
        &self.diagnostics
    }

    fn forget_diagnostic(&mut self, name: &str) {
        self.diagnostics.retain(|d| match d {
            RomDiagnostic::BadChecksum { name: file, .. } => file.as_str() != name,
        });
    }

    fn sync_program(&mut self) {
        if let Some(program) = self.regions.get(MAIN_CPU_REGION) {
            self.bus.set_program(program);
        }
        self.needs_reset = true;
    }

    /// Main CPU ROM files not yet loaded
    pub fn missing_program_roms(&self) -> Vec<&'static str> {
        self.game
            .roms
            .region(MAIN_CPU_REGION)
            .map(|r| {
                r.entries
                    .iter()
                    .map(|e| e.name)
                    .filter(|name| !self.mounted.contains(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn region(&self, tag: &str) -> Option<&[u8]> {
        self.regions.get(tag).map(Vec::as_slice)
    }

    pub fn game(&self) -> &'static GameDriver {
        self.game
    }

    pub fn bus(&self) -> &MainBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MainBus {
        &mut self.bus
    }

    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn press(&mut self, control: Control) {
        self.bus.inputs.press(control);
    }

    pub fn release(&mut self, control: Control) {
        self.bus.inputs.release(control);
    }

    /// Single control panel: the cocktail side follows player one.
    pub fn set_shared_controls(&mut self, shared: bool) {
        self.bus.inputs.set_shared_controls(shared);
    }

    pub fn set_dip(&mut self, port: &str, dip: &str, label: &str) -> Result<(), RedAlertError> {
        Ok(self.bus.inputs.set_dip(port, dip, label)?)
    }

    /// Apply saved DIP settings. Nothing changes if any entry is invalid.
    pub fn apply_settings(&mut self, settings: &DipSelection) -> Result<(), RedAlertError> {
        Ok(self.bus.inputs.apply(settings)?)
    }

    pub fn dip_selection(&self) -> DipSelection {
        self.bus.inputs.selection()
    }

    fn reset_cpu(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.needs_reset = false;
    }

    fn lookup(&self, id: &str) -> Result<(&'static str, &'static RomEntry), RedAlertError> {
        self.game
            .roms
            .find(id)
            .map(|(region, entry)| (region.tag, entry))
            .ok_or_else(|| RedAlertError::InvalidMountPoint(id.to_string()))
    }
}

impl<C: Cpu6502Core<MainBus>> System for RedAlertSystem<C> {
    type Error = RedAlertError;

    fn reset(&mut self) {
        self.bus.power_on();
        self.frames = 0;
        self.cycles = 0;
        self.reset_cpu();
    }

    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        let missing = self.missing_program_roms();
        if !missing.is_empty() {
            return Err(RedAlertError::MissingRoms(missing.join(", ")));
        }
        if self.needs_reset {
            self.reset_cpu();
        }

        let machine = self.game.machine;
        let frame_start = self.cycles;
        let target = machine.cycles_at_frame(self.frames + 1);
        let frame_cycles = target.saturating_sub(frame_start);
        while self.cycles < target {
            self.bus
                .set_scanline(machine.screen.scanline_at(self.cycles - frame_start, frame_cycles));
            // Zero-cycle steps would never reach the target.
            self.cycles += self.cpu.step(&mut self.bus).max(1) as u64;
        }

        let coin_active = self.bus.inputs.read(COIN_PORT).unwrap_or(0) != 0;
        self.bus.interrupts.vblank(coin_active);
        self.bus.inputs.end_frame();
        self.frames += 1;

        Ok(self.bus.video.frame(&machine.screen, self.game.rotation))
    }

    fn save_state(&self) -> Value {
        serde_json::json!({
            "system": self.game.name,
            "version": SAVE_STATE_VERSION,
            "frames": self.frames,
            "cycles": self.cycles,
            "bus": self.bus.snapshot(),
        })
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        use serde::de::Error as _;

        let state = SaveState::deserialize(v)?;
        if state.version != SAVE_STATE_VERSION {
            return Err(serde_json::Error::custom(format!(
                "unsupported save state version {}",
                state.version
            )));
        }
        if state.system != self.game.name {
            return Err(serde_json::Error::custom(format!(
                "save state is for {}, not {}",
                state.system, self.game.name
            )));
        }
        self.bus.restore(state.bus).map_err(serde_json::Error::custom)?;
        self.frames = state.frames;
        self.cycles = state.cycles;
        Ok(())
    }

    fn supports_save_states(&self) -> bool {
        self.game.flags.contains(GameFlags::SUPPORTS_SAVE)
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        self.game
            .roms
            .entries()
            .map(|(region, entry)| MountPointInfo {
                id: entry.name.to_string(),
                name: format!("{} ({})", entry.name, region.tag),
                extensions: vec![],
                required: true,
            })
            .collect()
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        let (tag, entry) = self.lookup(mount_point_id)?;
        let diagnostic = RomSet::verify(entry, data)?;
        self.forget_diagnostic(entry.name);
        self.diagnostics.extend(diagnostic);
        if let Some(region) = self.regions.get_mut(tag) {
            let start = entry.offset as usize;
            region[start..start + data.len()].copy_from_slice(data);
        }
        self.mounted.insert(entry.name);
        if tag == MAIN_CPU_REGION {
            self.sync_program();
        }
        Ok(())
    }

    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error> {
        let (tag, entry) = self.lookup(mount_point_id)?;
        if let Some(region) = self.regions.get_mut(tag) {
            let start = entry.offset as usize;
            region[start..start + entry.length as usize].fill(0);
        }
        self.mounted.remove(entry.name);
        self.forget_diagnostic(entry.name);
        if tag == MAIN_CPU_REGION {
            self.sync_program();
        }
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        self.game
            .roms
            .find(mount_point_id)
            .is_some_and(|(_, entry)| self.mounted.contains(entry.name))
    }
}
