//! ROM sets

use emu_core::rom::{rom, RomEntry, RomRegion, RomSet};

use crate::memory_map::MAIN_CPU_REGION;

pub const AUDIO_CPU_REGION: &str = "audiocpu";
pub const VOICE_CPU_REGION: &str = "voicecpu";
pub const PROM_REGION: &str = "proms";
pub const USER_REGION: &str = "user1";

static REDALERT_MAIN: [RomEntry; 7] = [
    rom("rag5", 0x5000, 0x1000, 0xd7c9cdd6, "5ff5cdceaa00083b745cf5c74b096f7edfadf737"),
    rom("rag6", 0x6000, 0x1000, 0xcb2a308c, "9f3bc22bad31165e080e81d4a3fb0ec2aad235fe"),
    rom("rag7n", 0x7000, 0x1000, 0x82ab2dae, "f8328b048384afac245f1c16a2d0864ffe0b4741"),
    rom("rag8n", 0x8000, 0x1000, 0xb80eece9, "d986449bdb1d94832187c7f953f01330391ef4c9"),
    rom("rag9", 0x9000, 0x1000, 0x2b7d1295, "1498af0c55bd38fe79b91afc38921085102ebbc3"),
    rom("ragab", 0xa000, 0x1000, 0xab99f5ed, "a93713bb03d61cce64adc89b874b67adea7c53cd"),
    rom("ragb", 0xb000, 0x1000, 0x8e0d1661, "bff4ddca761ddd70113490f50777e62c66813685"),
];

static REDALERT_AUDIO: [RomEntry; 1] = [rom(
    "w3s1",
    0x7000,
    0x0800,
    0x4af956a5,
    "25368a40d7ebc60316fd2d78ec4c686e701b96dc",
)];

static REDALERT_VOICE: [RomEntry; 4] = [
    rom("ras1b", 0x0000, 0x1000, 0xec690845, "26a84738bd45ed21dac6c8383ebd9c3b9831024a"),
    rom("ras2", 0x1000, 0x1000, 0xfae94cfc, "2fd798706bb3afda3fb55bc877e597cc4e5d0c15"),
    rom("ras3", 0x2000, 0x1000, 0x20d56f3e, "5c32ee3365407e6d3f7ab5662e9ecbac437ed4cb"),
    rom("ras4", 0x3000, 0x1000, 0x130e66db, "385b8f889fee08fddbb2f75a691af569109eacd1"),
];

static REDALERT_PROM: [RomEntry; 1] = [rom(
    "m-257sc.1a",
    0x0000,
    0x0200,
    0xb1aca792,
    "db37f99b9880cc3c434e2a55a0bbb017d9a72aa3",
)];

static REDALERT_REGIONS: [RomRegion; 4] = [
    RomRegion {
        tag: MAIN_CPU_REGION,
        size: 0x10000,
        entries: &REDALERT_MAIN,
        note: None,
    },
    RomRegion {
        tag: AUDIO_CPU_REGION,
        size: 0x10000,
        entries: &REDALERT_AUDIO,
        note: None,
    },
    RomRegion {
        tag: VOICE_CPU_REGION,
        size: 0x10000,
        entries: &REDALERT_VOICE,
        note: None,
    },
    RomRegion {
        tag: PROM_REGION,
        size: 0x0200,
        entries: &REDALERT_PROM,
        note: Some("color PROM"),
    },
];

pub static REDALERT_ROMS: RomSet = RomSet {
    regions: &REDALERT_REGIONS,
};

static DEMONEYE_MAIN: [RomEntry; 6] = [
    rom("demoneye.6", 0x6000, 0x1000, 0xb03ee3a9, "66b6115fbb4e8097152702022c59c464e8211e5a"),
    rom("demoneye.7", 0x7000, 0x1000, 0x667a5de7, "c3ce7fbbc6c98250e9d5f85854e6887017ca5ff9"),
    rom("demoneye.8", 0x8000, 0x1000, 0x257484d7, "3937cce546462a471adbdc1da63ddfc20cfc7b79"),
    rom("demoneye.9", 0x9000, 0x1000, 0xbd8d79a8, "68c1443ef78b545eb9e612573b86515c3ad7f103"),
    rom("demoneye.a", 0xa000, 0x1000, 0xa27d08aa, "659ad22778e852fc58f3951d62bc01151c973d36"),
    rom("demoneye.b", 0xb000, 0x1000, 0x1fd3585b, "b1697b7b21b739499fda1e155530dbfab89f3358"),
];

static DEMONEYE_AUDIO: [RomEntry; 2] = [
    rom("demoneye.7s", 0x2000, 0x1000, 0x8fdc9364, "3fccb5b22f08d6a0cde85863c1ce5399c84f233e"),
    rom("demoneye.6s", 0x3000, 0x1000, 0x0a23def9, "b52f52be312ec7810e3c9cbd3913e887f983b1ee"),
];

static DEMONEYE_PROM: [RomEntry; 1] = [rom(
    "demoneye.1a2",
    0x0000,
    0x0200,
    0xeaf5a66e,
    "d8ebe05ba5d75fbf6ad45f710e5bd27b6afad44b",
)];

static DEMONEYE_USER: [RomEntry; 1] = [rom(
    "demoneye.1a",
    0x0000,
    0x0200,
    0xd03488ea,
    "11027f502ad2a9255b2e5611ab2eee16ede1d704",
)];

static DEMONEYE_REGIONS: [RomRegion; 4] = [
    RomRegion {
        tag: MAIN_CPU_REGION,
        size: 0x10000,
        entries: &DEMONEYE_MAIN,
        note: None,
    },
    RomRegion {
        tag: AUDIO_CPU_REGION,
        size: 0x10000,
        entries: &DEMONEYE_AUDIO,
        note: None,
    },
    RomRegion {
        tag: PROM_REGION,
        size: 0x0200,
        entries: &DEMONEYE_PROM,
        note: Some("color PROM"),
    },
    RomRegion {
        tag: USER_REGION,
        size: 0x0200,
        entries: &DEMONEYE_USER,
        note: Some("unknown"),
    },
];

pub static DEMONEYE_ROMS: RomSet = RomSet {
    regions: &DEMONEYE_REGIONS,
};
