//! Core emulator primitives and traits.
//!
//! Drivers are written against these pieces: the 6502 bus and CPU seams,
//! declarative address maps, input port tables and ROM tables. CPU
//! instruction emulation itself is supplied by whichever core implements
//! [`cpu_6502::Cpu6502Core`].

pub mod address_map;
pub mod cpu_6502;
pub mod input;
pub mod logging;
pub mod rom;

pub mod types {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }
    }

    /// Screen orientation of a cabinet monitor, in degrees clockwise.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum Rotation {
        Rot0,
        Rot90,
        Rot180,
        Rot270,
    }

    impl Rotation {
        /// Whether the monitor is mounted on its side (width and height swap).
        pub fn swaps_axes(self) -> bool {
            matches!(self, Rotation::Rot90 | Rotation::Rot270)
        }
    }
}

use serde_json::Value;

/// Description of a mount point (media slot) that a system supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPointInfo {
    /// Unique identifier for this mount point (e.g., "rag5", "Cartridge")
    pub id: String,
    /// User-friendly name for display
    pub name: String,
    /// File extensions accepted by this mount point (empty = any)
    pub extensions: Vec<String>,
    /// Whether this mount point is required for the system to function
    pub required: bool,
}

/// A high-level System trait tying components together.
pub trait System {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset to initial power-on state
    fn reset(&mut self);

    /// Emulate until a frame is produced and return a framebuffer.
    fn step_frame(&mut self) -> Result<types::Frame, Self::Error>;

    /// Return a JSON-serializable save state.
    /// Save states do not include ROM data, only emulator state.
    fn save_state(&self) -> Value;

    /// Load a JSON save state.
    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error>;

    /// Check if this system supports save/load state functionality
    fn supports_save_states(&self) -> bool {
        false
    }

    /// Get the list of mount points this system supports
    fn mount_points(&self) -> Vec<MountPointInfo>;

    /// Load media into a specific mount point
    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Unload media from a specific mount point
    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error>;

    /// Check if a mount point has media loaded
    fn is_mounted(&self, mount_point_id: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_initialization() {
        let f = types::Frame::new(10, 10);
        assert_eq!(f.pixels.len(), 100);
        assert_eq!(f.width, 10);
        assert_eq!(f.height, 10);
    }

    #[test]
    fn rotation_axes() {
        assert!(types::Rotation::Rot270.swaps_axes());
        assert!(types::Rotation::Rot90.swaps_axes());
        assert!(!types::Rotation::Rot0.swaps_axes());
        assert!(!types::Rotation::Rot180.swaps_axes());
    }

    struct MockSystem {
        mounted: bool,
    }

    impl System for MockSystem {
        type Error = std::convert::Infallible;

        fn reset(&mut self) {}

        fn step_frame(&mut self) -> Result<types::Frame, Self::Error> {
            Ok(types::Frame::new(2, 2))
        }

        fn save_state(&self) -> serde_json::Value {
            serde_json::json!({"mock": true, "version": 1})
        }

        fn load_state(&mut self, _v: &serde_json::Value) -> Result<(), serde_json::Error> {
            Ok(())
        }

        fn mount_points(&self) -> Vec<MountPointInfo> {
            vec![MountPointInfo {
                id: "rom0".to_string(),
                name: "Program ROM 0".to_string(),
                extensions: vec![],
                required: true,
            }]
        }

        fn mount(&mut self, _mount_point_id: &str, _data: &[u8]) -> Result<(), Self::Error> {
            self.mounted = true;
            Ok(())
        }

        fn unmount(&mut self, _mount_point_id: &str) -> Result<(), Self::Error> {
            self.mounted = false;
            Ok(())
        }

        fn is_mounted(&self, _mount_point_id: &str) -> bool {
            self.mounted
        }
    }

    #[test]
    fn mock_system_save_load_roundtrip() {
        let sys = MockSystem { mounted: false };
        let v = sys.save_state();
        let s = serde_json::to_string(&v).expect("serialize");
        let v2: serde_json::Value = serde_json::from_str(&s).expect("deserialize");
        let mut sys2 = MockSystem { mounted: false };
        assert!(sys2.load_state(&v2).is_ok());
        assert!(!sys2.supports_save_states());
    }

    #[test]
    fn test_system_mount_operations() {
        let mut sys = MockSystem { mounted: false };
        assert_eq!(sys.mount_points()[0].id, "rom0");
        assert!(!sys.is_mounted("rom0"));
        assert!(sys.mount("rom0", &[1, 2, 3]).is_ok());
        assert!(sys.is_mounted("rom0"));
        assert!(sys.unmount("rom0").is_ok());
        assert!(!sys.is_mounted("rom0"));
    }
}
