//! Input port tables
//!
//! A port is an 8-bit value read by the CPU. Drivers describe each port as a
//! static [`InputPortDef`]: single bits wired to logical controls and groups of
//! bits set by DIP switches. [`InputPorts`] holds the runtime state (held
//! controls, coin impulses, current DIP settings) and assembles port values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Logical control a port bit is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    Start1,
    Start2,
    Button1,
    JoystickLeft,
    JoystickRight,
    Coin1,
    Coin2,
    Service1,
    /// Connected to something not yet identified (meters, test points)
    Unknown,
    /// Not connected
    Unused,
}

impl InputType {
    pub fn name(self) -> &'static str {
        match self {
            InputType::Start1 => "1 Player Start",
            InputType::Start2 => "2 Players Start",
            InputType::Button1 => "Button 1",
            InputType::JoystickLeft => "Joystick Left",
            InputType::JoystickRight => "Joystick Right",
            InputType::Coin1 => "Coin 1",
            InputType::Coin2 => "Coin 2",
            InputType::Service1 => "Service 1",
            InputType::Unknown => "Unknown",
            InputType::Unused => "Unused",
        }
    }

    /// Whether a player can drive this bit at all
    pub fn is_control(self) -> bool {
        !matches!(self, InputType::Unknown | InputType::Unused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

/// Which control panel a bit belongs to. Player two is the far side of a
/// cocktail table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

/// A control on a specific panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    pub kind: InputType,
    pub player: Player,
}

impl Control {
    pub const fn p1(kind: InputType) -> Self {
        Self {
            kind,
            player: Player::One,
        }
    }

    pub const fn p2(kind: InputType) -> Self {
        Self {
            kind,
            player: Player::Two,
        }
    }
}

/// One bit of a port wired to a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputBit {
    pub mask: u8,
    pub polarity: Polarity,
    pub kind: InputType,
    pub player: Player,
    /// Frames a press stays visible; 0 = level input
    pub impulse: u8,
    pub note: Option<&'static str>,
}

impl InputBit {
    pub const fn active_high(mask: u8, kind: InputType) -> Self {
        Self {
            mask,
            polarity: Polarity::ActiveHigh,
            kind,
            player: Player::One,
            impulse: 0,
            note: None,
        }
    }

    pub const fn active_low(mask: u8, kind: InputType) -> Self {
        let mut bit = Self::active_high(mask, kind);
        bit.polarity = Polarity::ActiveLow;
        bit
    }

    pub const fn cocktail(mut self) -> Self {
        self.player = Player::Two;
        self
    }

    pub const fn impulse(mut self, frames: u8) -> Self {
        self.impulse = frames;
        self
    }

    pub const fn note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    pub fn control(&self) -> Control {
        Control {
            kind: self.kind,
            player: self.player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DipSetting {
    pub value: u8,
    pub label: &'static str,
}

pub const fn dip(value: u8, label: &'static str) -> DipSetting {
    DipSetting { value, label }
}

/// A group of switch bits with a discrete set of labelled settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DipSwitch {
    pub name: &'static str,
    pub mask: u8,
    pub default: u8,
    /// Physical switch positions, e.g. "SW:1,2"
    pub location: Option<&'static str>,
    pub settings: &'static [DipSetting],
}

impl DipSwitch {
    pub fn setting(&self, value: u8) -> Option<&DipSetting> {
        self.settings.iter().find(|s| s.value == value)
    }

    pub fn setting_by_label(&self, label: &str) -> Option<&DipSetting> {
        self.settings
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputPortDef {
    pub tag: &'static str,
    pub bits: &'static [InputBit],
    pub dips: &'static [DipSwitch],
}

impl InputPortDef {
    /// Name a DIP is addressed by: its label, qualified by mask when the
    /// label is shared with another DIP of the same port.
    pub fn dip_key(&self, dip: &DipSwitch) -> String {
        let shared = self.dips.iter().filter(|d| d.name == dip.name).count() > 1;
        if shared {
            format!("{} ({:#04x})", dip.name, dip.mask)
        } else {
            dip.name.to_string()
        }
    }

    pub fn find_dip(&self, key: &str) -> Option<usize> {
        self.dips
            .iter()
            .position(|d| self.dip_key(d).eq_ignore_ascii_case(key))
    }

    /// Port value with every DIP at its default and no control active
    pub fn default_value(&self) -> u8 {
        let dips = self.dips.iter().fold(0, |acc, d| acc | d.default);
        self.bits
            .iter()
            .filter(|b| b.polarity == Polarity::ActiveLow)
            .fold(dips, |acc, b| acc | b.mask)
    }

    /// Check the table: DIP defaults and settings inside their masks, the
    /// default one of the settings, and no bit claimed twice.
    pub fn validate(&self) -> Result<(), InputError> {
        let mut claimed = 0u8;
        let masks = self
            .bits
            .iter()
            .map(|b| b.mask)
            .chain(self.dips.iter().map(|d| d.mask));
        for mask in masks {
            if mask == 0 || claimed & mask != 0 {
                return Err(InputError::OverlappingBits {
                    port: self.tag.to_string(),
                    mask,
                });
            }
            claimed |= mask;
        }

        for dip in self.dips {
            let key = self.dip_key(dip);
            if dip.default & !dip.mask != 0 {
                return Err(InputError::DefaultOutsideMask {
                    port: self.tag.to_string(),
                    dip: key,
                });
            }
            if dip.setting(dip.default).is_none() {
                return Err(InputError::UnlistedDefault {
                    port: self.tag.to_string(),
                    dip: key,
                });
            }
            if let Some(bad) = dip.settings.iter().find(|s| s.value & !dip.mask != 0) {
                return Err(InputError::SettingOutsideMask {
                    port: self.tag.to_string(),
                    dip: key,
                    label: bad.label.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown input port {0}")]
    UnknownPort(String),
    #[error("port {port} has no DIP switch named {dip}")]
    UnknownDip { port: String, dip: String },
    #[error("DIP {dip} on port {port} has no setting {label:?}")]
    UnknownSetting {
        port: String,
        dip: String,
        label: String,
    },
    #[error("port {port}: bits {mask:#04x} are empty or claimed twice")]
    OverlappingBits { port: String, mask: u8 },
    #[error("port {port}: default of DIP {dip} lies outside its mask")]
    DefaultOutsideMask { port: String, dip: String },
    #[error("port {port}: default of DIP {dip} is not one of its settings")]
    UnlistedDefault { port: String, dip: String },
    #[error("port {port}: setting {label:?} of DIP {dip} lies outside its mask")]
    SettingOutsideMask {
        port: String,
        dip: String,
        label: String,
    },
}

/// Persistent DIP configuration: port tag -> DIP key -> setting label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DipSelection(pub BTreeMap<String, BTreeMap<String, String>>);

impl DipSelection {
    pub fn set(&mut self, port: &str, dip: &str, label: &str) {
        self.0
            .entry(port.to_string())
            .or_default()
            .insert(dip.to_string(), label.to_string());
    }

    pub fn get(&self, port: &str, dip: &str) -> Option<&str> {
        self.0.get(port)?.get(dip).map(String::as_str)
    }
}

/// Runtime state of a machine's input ports
#[derive(Debug, Clone)]
pub struct InputPorts {
    defs: &'static [InputPortDef],
    /// Current value of each DIP, indexed [port][dip]
    dips: Vec<Vec<u8>>,
    held: HashSet<Control>,
    /// Remaining visible frames of impulse controls
    impulses: HashMap<Control, u8>,
    shared_controls: bool,
}

impl InputPorts {
    pub fn new(defs: &'static [InputPortDef]) -> Self {
        let dips = defs
            .iter()
            .map(|p| p.dips.iter().map(|d| d.default).collect())
            .collect();
        Self {
            defs,
            dips,
            held: HashSet::new(),
            impulses: HashMap::new(),
            shared_controls: false,
        }
    }

    pub fn defs(&self) -> &'static [InputPortDef] {
        self.defs
    }

    fn port_index(&self, tag: &str) -> Result<usize, InputError> {
        self.defs
            .iter()
            .position(|p| p.tag == tag)
            .ok_or_else(|| InputError::UnknownPort(tag.to_string()))
    }

    /// Single control panel: player-two bits follow the player-one controls.
    pub fn set_shared_controls(&mut self, shared: bool) {
        self.shared_controls = shared;
    }

    pub fn shared_controls(&self) -> bool {
        self.shared_controls
    }

    fn impulse_frames(&self, control: Control) -> u8 {
        self.defs
            .iter()
            .flat_map(|p| p.bits.iter())
            .filter(|b| b.control() == control)
            .map(|b| b.impulse)
            .max()
            .unwrap_or(0)
    }

    /// Pressing an Unused or Unknown input does nothing.
    pub fn press(&mut self, control: Control) {
        if !control.kind.is_control() || !self.held.insert(control) {
            return;
        }
        let frames = self.impulse_frames(control);
        if frames > 0 {
            self.impulses.insert(control, frames);
        }
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
        self.impulses.clear();
    }

    /// Advance impulse timers by one frame.
    pub fn end_frame(&mut self) {
        self.impulses.retain(|_, frames| {
            *frames -= 1;
            *frames > 0
        });
    }

    fn is_active(&self, bit: &InputBit) -> bool {
        if !bit.kind.is_control() {
            return false;
        }
        let mut control = bit.control();
        if self.shared_controls && control.player == Player::Two {
            control.player = Player::One;
        }
        if bit.impulse > 0 {
            self.impulses.contains_key(&control)
        } else {
            self.held.contains(&control)
        }
    }

    fn value_at(&self, index: usize) -> u8 {
        let def = &self.defs[index];
        let dips = self.dips[index].iter().fold(0, |acc, v| acc | v);
        def.bits.iter().fold(dips, |acc, bit| {
            let level = self.is_active(bit) ^ (bit.polarity == Polarity::ActiveLow);
            if level {
                acc | bit.mask
            } else {
                acc
            }
        })
    }

    /// Current value of the port named `tag`
    pub fn read(&self, tag: &str) -> Option<u8> {
        self.port_index(tag).ok().map(|i| self.value_at(i))
    }

    /// Select a DIP setting by its label.
    pub fn set_dip(&mut self, port: &str, dip: &str, label: &str) -> Result<(), InputError> {
        let defs = self.defs;
        let p = self.port_index(port)?;
        let def = &defs[p];
        let d = def.find_dip(dip).ok_or_else(|| InputError::UnknownDip {
            port: port.to_string(),
            dip: dip.to_string(),
        })?;
        let setting =
            def.dips[d]
                .setting_by_label(label)
                .ok_or_else(|| InputError::UnknownSetting {
                    port: port.to_string(),
                    dip: dip.to_string(),
                    label: label.to_string(),
                })?;
        self.dips[p][d] = setting.value;
        Ok(())
    }

    /// Current setting of a DIP
    pub fn dip(&self, port: &str, dip: &str) -> Option<&'static DipSetting> {
        let defs = self.defs;
        let p = self.port_index(port).ok()?;
        let def = &defs[p];
        let d = def.find_dip(dip)?;
        def.dips[d].setting(self.dips[p][d])
    }

    /// Current DIP configuration in persistent form
    pub fn selection(&self) -> DipSelection {
        let mut selection = DipSelection::default();
        for (p, def) in self.defs.iter().enumerate() {
            for (d, dip) in def.dips.iter().enumerate() {
                if let Some(setting) = dip.setting(self.dips[p][d]) {
                    selection.set(def.tag, &def.dip_key(dip), setting.label);
                }
            }
        }
        selection
    }

    /// Apply a stored configuration. Nothing changes if any entry is invalid.
    pub fn apply(&mut self, selection: &DipSelection) -> Result<(), InputError> {
        let mut staged = self.clone();
        for (port, dips) in &selection.0 {
            for (dip, label) in dips {
                staged.set_dip(port, dip, label)?;
            }
        }
        self.dips = staged.dips;
        Ok(())
    }

    pub fn reset_dips(&mut self) {
        for (p, def) in self.defs.iter().enumerate() {
            for (d, dip) in def.dips.iter().enumerate() {
                self.dips[p][d] = dip.default;
            }
        }
    }
}
