//! Video board memory and registers
//!
//! The main CPU sees three things: a 1bpp bitmap layer, character RAM and two
//! write-only registers. Writing the bitmap also stores the current bitmap
//! colour register into a colour cell covering eight bitmap bytes. Turning
//! this memory into pixels is the renderer's job.

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::types::{Frame, Rotation};
use serde::{Deserialize, Serialize};

use crate::config::{ScreenConfig, VideoBoard};

pub const BITMAP_RAM_SIZE: usize = 0x2000;
pub const BITMAP_COLORRAM_SIZE: usize = BITMAP_RAM_SIZE >> 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    board: VideoBoard,
    bitmap_ram: Vec<u8>,
    bitmap_colorram: Vec<u8>,
    charmap_ram: Vec<u8>,
    control: u8,
    bitmap_color: u8,
}

impl Video {
    pub fn new(board: VideoBoard) -> Self {
        Self {
            board,
            bitmap_ram: vec![0; BITMAP_RAM_SIZE],
            bitmap_colorram: vec![0; BITMAP_COLORRAM_SIZE],
            charmap_ram: vec![0; board.charmap_size()],
            control: 0,
            bitmap_color: 0,
        }
    }

    pub fn board(&self) -> VideoBoard {
        self.board
    }

    /// Shape check for restored state.
    pub fn is_consistent(&self) -> bool {
        self.bitmap_ram.len() == BITMAP_RAM_SIZE
            && self.bitmap_colorram.len() == BITMAP_COLORRAM_SIZE
            && self.charmap_ram.len() == self.board.charmap_size()
    }

    pub fn read_bitmap(&self, offset: u16) -> u8 {
        self.bitmap_ram.get(offset as usize).copied().unwrap_or(0)
    }

    pub fn write_bitmap(&mut self, offset: u16, data: u8) {
        let offset = offset as usize;
        if offset >= BITMAP_RAM_SIZE {
            return;
        }
        self.bitmap_colorram[offset >> 3] = self.bitmap_color & 0x07;
        self.bitmap_ram[offset] = data;
    }

    pub fn read_charmap(&self, offset: u16) -> u8 {
        self.charmap_ram.get(offset as usize).copied().unwrap_or(0)
    }

    pub fn write_charmap(&mut self, offset: u16, data: u8) {
        if let Some(cell) = self.charmap_ram.get_mut(offset as usize) {
            *cell = data;
        }
    }

    pub fn write_control(&mut self, data: u8) {
        if data != self.control {
            log(LogCategory::Video, LogLevel::Debug, || {
                format!("video control {:02X} -> {:02X}", self.control, data)
            });
        }
        self.control = data;
    }

    pub fn write_bitmap_color(&mut self, data: u8) {
        self.bitmap_color = data;
    }

    pub fn control(&self) -> u8 {
        self.control
    }

    pub fn bitmap_color(&self) -> u8 {
        self.bitmap_color
    }

    pub fn bitmap_ram(&self) -> &[u8] {
        &self.bitmap_ram
    }

    pub fn bitmap_colorram(&self) -> &[u8] {
        &self.bitmap_colorram
    }

    pub fn charmap_ram(&self) -> &[u8] {
        &self.charmap_ram
    }

    /// Output surface for one frame, in monitor orientation.
    pub fn frame(&self, screen: &ScreenConfig, rotation: Rotation) -> Frame {
        let (w, h) = (screen.visible_width(), screen.visible_height());
        if rotation.swaps_axes() {
            Frame::new(h, w)
        } else {
            Frame::new(w, h)
        }
    }

    /// Power-on: memory and registers cleared.
    pub fn clear(&mut self) {
        *self = Self::new(self.board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REDALERT_MACHINE;

    #[test]
    fn test_bitmap_write_latches_color() {
        let mut video = Video::new(VideoBoard::RedAlert);
        video.write_bitmap_color(0xFD);
        video.write_bitmap(0x0009, 0xAA);
        assert_eq!(video.read_bitmap(0x0009), 0xAA);
        assert_eq!(video.bitmap_colorram()[1], 0x05);
        assert_eq!(video.bitmap_colorram()[0], 0x00);

        // Same colour cell, new colour: the cell follows the latest write.
        video.write_bitmap_color(0x02);
        video.write_bitmap(0x000F, 0x55);
        assert_eq!(video.bitmap_colorram()[1], 0x02);
    }

    #[test]
    fn test_charmap_size_by_board() {
        let mut red = Video::new(VideoBoard::RedAlert);
        let mut demon = Video::new(VideoBoard::Demoneye);
        red.write_charmap(0x1800, 1);
        demon.write_charmap(0x1800, 1);
        assert_eq!(red.read_charmap(0x1800), 0);
        assert_eq!(demon.read_charmap(0x1800), 1);
        assert_eq!(red.charmap_ram().len(), 0x1000);
        assert_eq!(demon.charmap_ram().len(), 0x2000);
    }

    #[test]
    fn test_frame_is_rotated() {
        let video = Video::new(VideoBoard::RedAlert);
        let screen = &REDALERT_MACHINE.screen;
        let frame = video.frame(screen, Rotation::Rot270);
        assert_eq!((frame.width, frame.height), (240, 256));
        let frame = video.frame(screen, Rotation::Rot0);
        assert_eq!((frame.width, frame.height), (256, 240));
    }

    #[test]
    fn test_clear_keeps_board() {
        let mut video = Video::new(VideoBoard::Demoneye);
        video.write_control(0x08);
        video.write_charmap(0x1FFF, 3);
        video.clear();
        assert_eq!(video.control(), 0);
        assert_eq!(video.read_charmap(0x1FFF), 0);
        assert!(video.is_consistent());
        assert_eq!(video.board(), VideoBoard::Demoneye);
    }
}
