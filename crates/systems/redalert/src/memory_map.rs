//! Main CPU address maps
//!
//! ```text
//! $0000-$1FFF  work RAM
//! $2000-$3FFF  bitmap video RAM (writes also latch the bitmap colour)
//! $4000-$4FFF  character video RAM ($4000-$5FFF on Demoneye-X)
//! $5000-$BFFF  program ROM ($6000-$BFFF on Demoneye-X)
//! $C0n0        I/O slot n, A4-A6 decoded, everything else in $C000-$CFFF ignored
//! $F000-$FFFF  ROM image at $8000 (reset/IRQ vectors)
//! ```
//!
//! $D000-$EFFF is not decoded and reads as 0.

use emu_core::address_map::{AddressRange, ReadOp, WriteOp};
use serde::Serialize;

/// Region holding the main CPU program
pub const MAIN_CPU_REGION: &str = "maincpu";

/// I/O slots repeat every $100 bytes (and inside each page at A7 and A0-A3)
pub const IO_MIRROR: u16 = 0x0F8F;
/// The Demoneye-X unknown ports also decode A0-A3
const IO_MIRROR_FINE: u16 = 0x0F80;

/// Handlers the main bus implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    MainRam,
    BitmapVideoRam,
    CharmapVideoRam,
    AudioCommand,
    DemoneyeAudioCommand,
    VoiceCommand,
    VideoControl,
    BitmapColor,
    InterruptClear,
}

use ReadOp::{Handler as Rd, Nop as RdNop, Port, Rom};
use WriteOp::{Handler as Wr, Nop as WrNop};

const fn ram(start: u16, end: u16, target: Target) -> AddressRange<Target> {
    AddressRange::new(start, end, Rd(target), Wr(target))
}

const fn rom(start: u16, end: u16, base: u32) -> AddressRange<Target> {
    AddressRange::new(
        start,
        end,
        Rom {
            region: MAIN_CPU_REGION,
            base,
        },
        WrNop,
    )
}

const fn port(addr: u16, tag: &'static str) -> AddressRange<Target> {
    AddressRange::new(addr, addr, Port(tag), WrNop).mirrored(IO_MIRROR)
}

const fn io_write(addr: u16, target: Target) -> AddressRange<Target> {
    AddressRange::new(addr, addr, RdNop, Wr(target)).mirrored(IO_MIRROR)
}

const fn interrupt_clear(addr: u16) -> AddressRange<Target> {
    AddressRange::new(
        addr,
        addr,
        Rd(Target::InterruptClear),
        Wr(Target::InterruptClear),
    )
    .mirrored(IO_MIRROR)
}

const fn unknown(addr: u16) -> AddressRange<Target> {
    AddressRange::new(addr, addr, RdNop, WrNop)
        .mirrored(IO_MIRROR_FINE)
        .note("unknown")
}

pub static REDALERT_MAP: [AddressRange<Target>; 13] = [
    ram(0x0000, 0x1FFF, Target::MainRam),
    ram(0x2000, 0x3FFF, Target::BitmapVideoRam),
    ram(0x4000, 0x4FFF, Target::CharmapVideoRam),
    rom(0x5000, 0xBFFF, 0x5000),
    port(0xC000, "C000"),
    port(0xC010, "C010"),
    port(0xC020, "C020"),
    io_write(0xC030, Target::AudioCommand),
    io_write(0xC040, Target::VideoControl),
    io_write(0xC050, Target::BitmapColor),
    io_write(0xC060, Target::VoiceCommand),
    interrupt_clear(0xC070),
    rom(0xF000, 0xFFFF, 0x8000),
];

pub static DEMONEYE_MAP: [AddressRange<Target>; 15] = [
    ram(0x0000, 0x1FFF, Target::MainRam),
    ram(0x2000, 0x3FFF, Target::BitmapVideoRam),
    ram(0x4000, 0x5FFF, Target::CharmapVideoRam),
    rom(0x6000, 0xBFFF, 0x6000),
    port(0xC000, "C000"),
    port(0xC010, "C010"),
    port(0xC020, "C020"),
    io_write(0xC030, Target::DemoneyeAudioCommand),
    io_write(0xC040, Target::VideoControl),
    io_write(0xC050, Target::BitmapColor),
    unknown(0xC060),
    unknown(0xC061),
    unknown(0xC062),
    interrupt_clear(0xC070).note("probably not correct"),
    rom(0xF000, 0xFFFF, 0x8000),
];
