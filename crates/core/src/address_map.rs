//! Declarative CPU address maps
//!
//! A driver describes its bus as a list of [`AddressRange`]s. Each range binds
//! an inclusive address window to a read operation and a write operation.
//! Incompletely decoded hardware is described with a `mirror` mask: every bit
//! set in the mask is ignored by the decoder, so the range repeats at each
//! combination of those bits.
//!
//! [`AddressMap::build`] checks the table once and precomputes a flat 64K
//! dispatch table, so a bus access is a single indexed load.

use serde::Serialize;
use thiserror::Error;

/// How a read is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadOp<T> {
    /// Returns 0, no side effect
    Nop,
    /// Byte from a loaded ROM region at `base + offset`
    Rom { region: &'static str, base: u32 },
    /// Current value of the named input port
    Port(&'static str),
    /// Driver-specific handler
    Handler(T),
}

/// How a write is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WriteOp<T> {
    /// Write is dropped
    Nop,
    /// Driver-specific handler
    Handler(T),
}

/// One entry of an address map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRange<T> {
    pub start: u16,
    pub end: u16,
    /// Address bits ignored by the decoder
    pub mirror: u16,
    pub read: ReadOp<T>,
    pub write: WriteOp<T>,
    pub note: Option<&'static str>,
}

impl<T> AddressRange<T> {
    pub const fn new(start: u16, end: u16, read: ReadOp<T>, write: WriteOp<T>) -> Self {
        Self {
            start,
            end,
            mirror: 0,
            read,
            write,
            note: None,
        }
    }

    pub const fn mirrored(mut self, mirror: u16) -> Self {
        self.mirror = mirror;
        self
    }

    pub const fn note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Offset of `addr` within this range, if the decoder selects it.
    pub fn offset_of(&self, addr: u16) -> Option<u16> {
        let base = addr & !self.mirror;
        (self.start..=self.end)
            .contains(&base)
            .then(|| base - self.start)
    }

    /// Number of bytes in one copy of the range
    pub fn size(&self) -> usize {
        (self.end - self.start) as usize + 1
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressMapError {
    #[error("range {index} is inverted: start {start:#06X} > end {end:#06X}")]
    Inverted { index: usize, start: u16, end: u16 },
    #[error("range {index} mirror mask {mirror:#06X} overlaps its own address bits")]
    BadMirror { index: usize, mirror: u16 },
    #[error("address {addr:#06X} claimed by ranges {first} and {second}")]
    Overlap { addr: u16, first: usize, second: usize },
    #[error("too many ranges in one map: {0}")]
    TooManyRanges(usize),
}

/// Result of decoding one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Index of the range in the map
    pub index: usize,
    /// Offset within the range after mirror bits are removed
    pub offset: u16,
}

const UNMAPPED: u16 = u16::MAX;

/// A validated address map with a precomputed dispatch table.
#[derive(Debug, Clone)]
pub struct AddressMap<T: 'static> {
    ranges: &'static [AddressRange<T>],
    table: Vec<u16>,
}

impl<T> AddressMap<T> {
    /// Validate `ranges` and build the dispatch table.
    pub fn build(ranges: &'static [AddressRange<T>]) -> Result<Self, AddressMapError> {
        if ranges.len() >= UNMAPPED as usize {
            return Err(AddressMapError::TooManyRanges(ranges.len()));
        }

        for (index, range) in ranges.iter().enumerate() {
            if range.start > range.end {
                return Err(AddressMapError::Inverted {
                    index,
                    start: range.start,
                    end: range.end,
                });
            }
            if range.mirror & (range.start | range.end) != 0 {
                return Err(AddressMapError::BadMirror {
                    index,
                    mirror: range.mirror,
                });
            }
        }

        let mut table = vec![UNMAPPED; 0x10000];
        for addr in 0..=u16::MAX {
            for (index, range) in ranges.iter().enumerate() {
                if range.offset_of(addr).is_none() {
                    continue;
                }
                let slot = &mut table[addr as usize];
                if *slot != UNMAPPED {
                    return Err(AddressMapError::Overlap {
                        addr,
                        first: *slot as usize,
                        second: index,
                    });
                }
                *slot = index as u16;
            }
        }

        Ok(Self { ranges, table })
    }

    /// Decode `addr`; `None` for addresses no range claims.
    #[inline]
    pub fn resolve(&self, addr: u16) -> Option<Resolved> {
        let index = self.table[addr as usize];
        if index == UNMAPPED {
            return None;
        }
        let index = index as usize;
        let range = &self.ranges[index];
        Some(Resolved {
            index,
            offset: (addr & !range.mirror) - range.start,
        })
    }

    #[inline]
    pub fn range(&self, index: usize) -> &AddressRange<T> {
        &self.ranges[index]
    }

    pub fn ranges(&self) -> &'static [AddressRange<T>] {
        self.ranges
    }

    /// Number of addresses in the 64K space no range claims
    pub fn unmapped_count(&self) -> usize {
        self.table.iter().filter(|&&i| i == UNMAPPED).count()
    }
}
