//! Input port definitions
//!
//! "C000" is the DIP bank, "C010" the player one panel and "C020" the far
//! side of a cocktail table. Coins never reach a readable port: the COIN
//! lines drive the main CPU's NMI (and the service coin also RDY), so the
//! game counts credits in its NMI handler.

use emu_core::input::{dip, DipSetting, DipSwitch, InputBit, InputPortDef, InputType};

pub const DIP_PORT: &str = "C000";
pub const P1_PORT: &str = "C010";
pub const P2_PORT: &str = "C020";
pub const COIN_PORT: &str = "COIN";

const LIVES: [DipSetting; 4] = [dip(0x00, "3"), dip(0x01, "4"), dip(0x02, "5"), dip(0x03, "6")];
const BONUS_LIFE: [DipSetting; 2] = [dip(0x00, "5000"), dip(0x08, "7000")];
const COINAGE: [DipSetting; 4] = [
    dip(0x30, "2 Coins/1 Credit"),
    dip(0x10, "1 Coin/1 Credit"),
    dip(0x20, "1 Coin/2 Credits"),
    dip(0x00, "Free Play"),
];
const CABINET: [DipSetting; 2] = [dip(0x40, "Upright"), dip(0x00, "Cocktail")];

static REDALERT_DIPS: [DipSwitch; 6] = [
    DipSwitch {
        name: "Lives",
        mask: 0x03,
        default: 0x00,
        location: Some("SW:1,2"),
        settings: &LIVES,
    },
    DipSwitch {
        name: "Cabinet in Service Mode",
        mask: 0x04,
        default: 0x00,
        location: Some("SW:3"),
        settings: &[dip(0x00, "Upright"), dip(0x04, "Cocktail")],
    },
    DipSwitch {
        name: "Bonus Life",
        mask: 0x08,
        default: 0x00,
        location: Some("SW:4"),
        settings: &BONUS_LIFE,
    },
    DipSwitch {
        name: "Coinage",
        mask: 0x30,
        default: 0x10,
        location: Some("SW:5,6"),
        settings: &COINAGE,
    },
    DipSwitch {
        name: "Cabinet",
        mask: 0x40,
        default: 0x40,
        location: Some("SW:7"),
        settings: &CABINET,
    },
    DipSwitch {
        name: "Service Mode",
        mask: 0x80,
        default: 0x00,
        location: Some("SW:8"),
        settings: &[dip(0x00, "Off"), dip(0x80, "On")],
    },
];

static DEMONEYE_DIPS: [DipSwitch; 6] = [
    DipSwitch {
        name: "Lives",
        mask: 0x03,
        default: 0x00,
        location: None,
        settings: &LIVES,
    },
    DipSwitch {
        name: "Unknown",
        mask: 0x04,
        default: 0x00,
        location: None,
        settings: &[dip(0x00, "Off"), dip(0x04, "On")],
    },
    DipSwitch {
        name: "Bonus Life",
        mask: 0x08,
        default: 0x00,
        location: None,
        settings: &BONUS_LIFE,
    },
    DipSwitch {
        name: "Coinage",
        mask: 0x30,
        default: 0x10,
        location: None,
        settings: &COINAGE,
    },
    DipSwitch {
        name: "Cabinet",
        mask: 0x40,
        default: 0x40,
        location: None,
        settings: &CABINET,
    },
    DipSwitch {
        name: "Unknown",
        mask: 0x80,
        default: 0x00,
        location: None,
        settings: &[dip(0x00, "Off"), dip(0x80, "On")],
    },
];

use InputBit as B;
use InputType::*;

static REDALERT_P1: [InputBit; 8] = [
    B::active_high(0x01, Start1),
    B::active_high(0x02, Start2),
    B::active_high(0x04, Button1),
    B::active_high(0x08, Unused).note("pin 35 - N.C."),
    B::active_high(0x10, Unused).note("pin 36 - N.C."),
    B::active_high(0x20, JoystickLeft),
    B::active_high(0x40, JoystickRight),
    B::active_high(0x80, Unknown).note("meter"),
];

static REDALERT_P2: [InputBit; 8] = [
    B::active_high(0x01, Unknown),
    B::active_high(0x02, Unknown).note("meter"),
    B::active_high(0x04, Button1).cocktail(),
    B::active_high(0x08, Unused).note("pin 33 - N.C."),
    B::active_high(0x10, Unused).note("pin 34 - N.C."),
    B::active_high(0x20, JoystickLeft).cocktail(),
    B::active_high(0x40, JoystickRight).cocktail(),
    B::active_high(0x80, Unknown).note("meter"),
];

// The prototype leaves the not-connected pins undocumented.
static DEMONEYE_P1: [InputBit; 8] = [
    B::active_high(0x01, Start1),
    B::active_high(0x02, Start2),
    B::active_high(0x04, Button1),
    B::active_high(0x08, Unknown),
    B::active_high(0x10, Unknown),
    B::active_high(0x20, JoystickLeft),
    B::active_high(0x40, JoystickRight),
    B::active_high(0x80, Unknown).note("meter"),
];

static DEMONEYE_P2: [InputBit; 8] = [
    B::active_high(0x01, Unknown),
    B::active_high(0x02, Unknown).note("meter"),
    B::active_high(0x04, Button1).cocktail(),
    B::active_high(0x08, Unknown),
    B::active_high(0x10, Unknown),
    B::active_high(0x20, JoystickLeft).cocktail(),
    B::active_high(0x40, JoystickRight).cocktail(),
    B::active_high(0x80, Unknown).note("meter"),
];

static COIN: [InputBit; 4] = [
    B::active_high(0x01, Coin1).impulse(1),
    B::active_high(0x02, Coin2).impulse(1),
    B::active_high(0x04, Service1).impulse(1),
    B::active_high(0xF8, Unused),
];

pub static REDALERT_PORTS: [InputPortDef; 4] = [
    InputPortDef {
        tag: DIP_PORT,
        bits: &[],
        dips: &REDALERT_DIPS,
    },
    InputPortDef {
        tag: P1_PORT,
        bits: &REDALERT_P1,
        dips: &[],
    },
    InputPortDef {
        tag: P2_PORT,
        bits: &REDALERT_P2,
        dips: &[],
    },
    InputPortDef {
        tag: COIN_PORT,
        bits: &COIN,
        dips: &[],
    },
];

pub static DEMONEYE_PORTS: [InputPortDef; 4] = [
    InputPortDef {
        tag: DIP_PORT,
        bits: &[],
        dips: &DEMONEYE_DIPS,
    },
    InputPortDef {
        tag: P1_PORT,
        bits: &DEMONEYE_P1,
        dips: &[],
    },
    InputPortDef {
        tag: P2_PORT,
        bits: &DEMONEYE_P2,
        dips: &[],
    },
    InputPortDef {
        tag: COIN_PORT,
        bits: &COIN,
        dips: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::input::{Control, InputPorts};

    #[test]
    fn test_tables_validate() {
        for port in REDALERT_PORTS.iter().chain(DEMONEYE_PORTS.iter()) {
            port.validate().unwrap();
        }
    }

    #[test]
    fn test_dip_defaults_within_mask() {
        for port in REDALERT_PORTS.iter().chain(DEMONEYE_PORTS.iter()) {
            for dip in port.dips {
                assert_eq!(dip.default & !dip.mask, 0, "{}", dip.name);
            }
        }
    }

    #[test]
    fn test_default_dip_bank() {
        // 3 lives, 5000 bonus, 1 coin/1 credit, upright, service off
        assert_eq!(REDALERT_PORTS[0].default_value(), 0x50);
        assert_eq!(DEMONEYE_PORTS[0].default_value(), 0x50);
    }

    #[test]
    fn test_coinage_selection() {
        let mut ports = InputPorts::new(&REDALERT_PORTS);
        ports.set_dip(DIP_PORT, "Coinage", "Free Play").unwrap();
        ports.set_dip(DIP_PORT, "Lives", "6").unwrap();
        ports.set_dip(DIP_PORT, "Service Mode", "On").unwrap();
        assert_eq!(ports.read(DIP_PORT), Some(0x80 | 0x40 | 0x03));
    }

    #[test]
    fn test_demoneye_unknown_dips_are_distinct() {
        let mut ports = InputPorts::new(&DEMONEYE_PORTS);
        ports.set_dip(DIP_PORT, "Unknown (0x04)", "On").unwrap();
        assert_eq!(ports.read(DIP_PORT), Some(0x54));
        ports.set_dip(DIP_PORT, "Unknown (0x80)", "On").unwrap();
        assert_eq!(ports.read(DIP_PORT), Some(0xD4));
    }

    #[test]
    fn test_player_panels() {
        let mut ports = InputPorts::new(&REDALERT_PORTS);
        ports.press(Control::p1(Start1));
        ports.press(Control::p1(JoystickRight));
        ports.press(Control::p2(Button1));
        ports.press(Control::p2(JoystickLeft));
        assert_eq!(ports.read(P1_PORT), Some(0x41));
        assert_eq!(ports.read(P2_PORT), Some(0x24));
    }

    #[test]
    fn test_coins_are_single_frame_pulses() {
        let mut ports = InputPorts::new(&REDALERT_PORTS);
        ports.press(Control::p1(Service1));
        assert_eq!(ports.read(COIN_PORT), Some(0x04));
        ports.end_frame();
        assert_eq!(ports.read(COIN_PORT), Some(0x00));
    }
}
