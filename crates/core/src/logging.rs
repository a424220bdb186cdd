//! Per-category log filtering for the emulator.
//!
//! Each [`LogCategory`] carries its own [`LogLevel`], held in atomics so any
//! thread can change it while a machine is running. Messages are built lazily
//! and only when their category lets them through; they then go to the `log`
//! facade with an `emu::<category>` target. Where they end up is the front
//! end's business.
//!
//! # Usage
//!
//! ```rust
//! use emu_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Interrupts, LogLevel::Debug, || {
//!     format!("IRQ cleared at scanline {}", 42)
//! });
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }

    fn to_facade(self) -> Option<log::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(log::Level::Error),
            LogLevel::Warn => Some(log::Level::Warn),
            LogLevel::Info => Some(log::Level::Info),
            LogLevel::Debug => Some(log::Level::Debug),
            LogLevel::Trace => Some(log::Level::Trace),
        }
    }
}

/// Log category for different emulator components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// CPU execution
    CPU,
    /// Bus/memory access
    Bus,
    /// Video hardware registers and memory
    Video,
    /// Sound board commands
    Audio,
    /// Interrupts (IRQ, NMI)
    Interrupts,
    /// ROM loading and verification
    Rom,
    /// Unmapped or not-understood hardware
    Stubs,
}

impl LogCategory {
    pub const ALL: [LogCategory; 7] = [
        LogCategory::CPU,
        LogCategory::Bus,
        LogCategory::Video,
        LogCategory::Audio,
        LogCategory::Interrupts,
        LogCategory::Rom,
        LogCategory::Stubs,
    ];

    fn index(self) -> usize {
        match self {
            LogCategory::CPU => 0,
            LogCategory::Bus => 1,
            LogCategory::Video => 2,
            LogCategory::Audio => 3,
            LogCategory::Interrupts => 4,
            LogCategory::Rom => 5,
            LogCategory::Stubs => 6,
        }
    }

    /// Target name handed to the `log` facade
    pub fn target(self) -> &'static str {
        match self {
            LogCategory::CPU => "emu::cpu",
            LogCategory::Bus => "emu::bus",
            LogCategory::Video => "emu::video",
            LogCategory::Audio => "emu::audio",
            LogCategory::Interrupts => "emu::irq",
            LogCategory::Rom => "emu::rom",
            LogCategory::Stubs => "emu::stubs",
        }
    }

    /// Parse a category name as accepted on the command line
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpu" => Some(LogCategory::CPU),
            "bus" => Some(LogCategory::Bus),
            "video" => Some(LogCategory::Video),
            "audio" => Some(LogCategory::Audio),
            "irq" | "interrupts" => Some(LogCategory::Interrupts),
            "rom" => Some(LogCategory::Rom),
            "stubs" => Some(LogCategory::Stubs),
            _ => None,
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    /// Global log level (applies to all categories unless overridden)
    global_level: AtomicU8,
    /// Per-category overrides, indexed by `LogCategory::index`
    levels: [AtomicU8; 7],
}

impl LogConfig {
    /// Create a new LogConfig with all logging disabled except ROM warnings
    fn new() -> Self {
        let config = Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: Default::default(),
        };
        // Bad dumps should always be visible.
        config.set_level(LogCategory::Rom, LogLevel::Warn);
        config
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category-specific level wins; `Off` means "use the global level".
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }
}

/// Log a message with the specified category and level
///
/// The message is lazily evaluated, so formatting only happens when the
/// category and level are enabled.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    if !LogConfig::global().should_log(category, level) {
        return;
    }
    if let Some(facade_level) = level.to_facade() {
        log::log!(target: category.target(), facade_level, "{}", message_fn());
    }
}
