//! Game definitions

use bitflags::bitflags;
use emu_core::address_map::AddressRange;
use emu_core::input::InputPortDef;
use emu_core::rom::RomSet;
use emu_core::types::Rotation;

use crate::config::{MachineConfig, DEMONEYE_MACHINE, REDALERT_MACHINE};
use crate::inputs::{DEMONEYE_PORTS, REDALERT_PORTS};
use crate::memory_map::{Target, DEMONEYE_MAP, REDALERT_MAP};
use crate::roms::{DEMONEYE_ROMS, REDALERT_ROMS};

bitflags! {
    /// Emulation status
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GameFlags: u32 {
        const NOT_WORKING = 1 << 0;
        const IMPERFECT_SOUND = 1 << 1;
        const IMPERFECT_GRAPHICS = 1 << 2;
        const SUPPORTS_SAVE = 1 << 3;
    }
}

#[derive(Debug)]
pub struct GameDriver {
    /// Short name, also the ROM set name
    pub name: &'static str,
    pub year: u16,
    pub manufacturer: &'static str,
    pub description: &'static str,
    pub rotation: Rotation,
    pub flags: GameFlags,
    pub machine: &'static MachineConfig,
    pub memory_map: &'static [AddressRange<Target>],
    pub input_ports: &'static [InputPortDef],
    pub roms: &'static RomSet,
}

pub static REDALERT: GameDriver = GameDriver {
    name: "redalert",
    year: 1981,
    manufacturer: "Irem + GDI",
    description: "Red Alert",
    rotation: Rotation::Rot270,
    flags: GameFlags::IMPERFECT_SOUND.union(GameFlags::SUPPORTS_SAVE),
    machine: &REDALERT_MACHINE,
    memory_map: &REDALERT_MAP,
    input_ports: &REDALERT_PORTS,
    roms: &REDALERT_ROMS,
};

pub static DEMONEYE: GameDriver = GameDriver {
    name: "demoneye",
    year: 1981,
    manufacturer: "Irem",
    description: "Demoneye-X",
    rotation: Rotation::Rot270,
    flags: GameFlags::NOT_WORKING
        .union(GameFlags::IMPERFECT_GRAPHICS)
        .union(GameFlags::IMPERFECT_SOUND)
        .union(GameFlags::SUPPORTS_SAVE),
    machine: &DEMONEYE_MACHINE,
    memory_map: &DEMONEYE_MAP,
    input_ports: &DEMONEYE_PORTS,
    roms: &DEMONEYE_ROMS,
};

pub static GAMES: [&GameDriver; 2] = [&REDALERT, &DEMONEYE];

/// Look up a game by short name (case-insensitive).
pub fn find_game(name: &str) -> Option<&'static GameDriver> {
    GAMES
        .iter()
        .copied()
        .find(|g| g.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_game() {
        assert_eq!(find_game("redalert").unwrap().description, "Red Alert");
        assert_eq!(find_game("DEMONEYE").unwrap().manufacturer, "Irem");
        assert!(find_game("galaxian").is_none());
    }

    #[test]
    fn test_flags() {
        assert!(!REDALERT.flags.contains(GameFlags::NOT_WORKING));
        assert!(REDALERT.flags.contains(GameFlags::SUPPORTS_SAVE));
        assert!(DEMONEYE.flags.contains(
            GameFlags::NOT_WORKING | GameFlags::IMPERFECT_GRAPHICS | GameFlags::IMPERFECT_SOUND
        ));
    }

    #[test]
    fn test_games_share_vblank_hardware() {
        for game in GAMES {
            assert_eq!(game.rotation, Rotation::Rot270);
            assert_eq!(game.year, 1981);
            assert_eq!(game.machine.screen.refresh_hz, 60);
        }
    }
}
