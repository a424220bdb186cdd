//! ROM tables, loading and verification
//!
//! A driver declares the dumps it expects as a [`RomSet`]: named memory
//! regions, each filled from one or more files at fixed offsets. Every file
//! carries the CRC32 and SHA-1 of a known-good dump.
//!
//! Loading follows the usual arcade-emulator rules: a missing file or a file
//! of the wrong size stops the load, while a checksum mismatch is reported as
//! a warning and the data is used anyway (the dump may simply be a different
//! revision or a hand-patched ROM).

use crate::logging::{log, LogCategory, LogLevel};
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One ROM file of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RomEntry {
    pub name: &'static str,
    /// Destination offset within the region
    pub offset: u32,
    pub length: u32,
    pub crc: u32,
    /// Lower-case hex SHA-1
    pub sha1: &'static str,
}

pub const fn rom(
    name: &'static str,
    offset: u32,
    length: u32,
    crc: u32,
    sha1: &'static str,
) -> RomEntry {
    RomEntry {
        name,
        offset,
        length,
        crc,
        sha1,
    }
}

/// A memory region filled from ROM files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RomRegion {
    pub tag: &'static str,
    pub size: u32,
    pub entries: &'static [RomEntry],
    pub note: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RomSet {
    pub regions: &'static [RomRegion],
}

/// Checksums of a block of data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RomHash {
    pub crc: u32,
    pub sha1: String,
}

impl RomHash {
    pub fn compute(data: &[u8]) -> Self {
        let crc = crc32fast::hash(data);
        let sha1 = hex::encode(Sha1::digest(data));
        Self { crc, sha1 }
    }

    pub fn matches(&self, entry: &RomEntry) -> bool {
        self.crc == entry.crc && self.sha1.eq_ignore_ascii_case(entry.sha1)
    }
}

#[derive(Debug, Error)]
pub enum RomError {
    #[error("{name}: not found")]
    Missing { name: String },
    #[error("{name}: has wrong length {actual:#x} (expected {expected:#x})")]
    WrongLength {
        name: String,
        expected: u32,
        actual: usize,
    },
    #[error("{name}: does not fit in region {region} (offset {offset:#x}, region size {size:#x})")]
    OutOfBounds {
        name: String,
        region: String,
        offset: u32,
        size: u32,
    },
    #[error("{first} and {second} overlap in region {region}")]
    Overlap {
        region: String,
        first: String,
        second: String,
    },
    #[error("{name}: malformed SHA-1 {sha1:?}")]
    BadSha1Format { name: String, sha1: String },
    #[error("no ROM named {0} in this set")]
    UnknownRom(String),
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Non-fatal load-time findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RomDiagnostic {
    BadChecksum {
        name: String,
        expected: RomHash,
        actual: RomHash,
    },
}

impl std::fmt::Display for RomDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RomDiagnostic::BadChecksum {
                name,
                expected,
                actual,
            } => write!(
                f,
                "{name}: wrong checksums: expected CRC({:08x}) SHA1({}), found CRC({:08x}) SHA1({})",
                expected.crc, expected.sha1, actual.crc, actual.sha1
            ),
        }
    }
}

/// Where ROM file contents come from
pub trait RomSource {
    /// Contents of the file called `name`, if present.
    fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, RomError>;
}

impl RomSource for HashMap<String, Vec<u8>> {
    fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, RomError> {
        Ok(self.get(name).cloned())
    }
}

/// Plain files in one directory. Names are matched exactly first, then
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn find(&self, name: &str) -> Result<Option<PathBuf>, RomError> {
        let exact = self.root.join(name);
        if exact.is_file() {
            return Ok(Some(exact));
        }
        let entries = fs::read_dir(&self.root).map_err(|source| RomError::Io {
            path: self.root.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

impl RomSource for DirectorySource {
    fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, RomError> {
        let Some(path) = self.find(name)? else {
            return Ok(None);
        };
        fs::read(&path)
            .map(Some)
            .map_err(|source| RomError::Io { path, source })
    }
}

/// Filled regions plus any warnings raised while loading
#[derive(Debug, Clone, Default)]
pub struct LoadedRoms {
    pub regions: HashMap<&'static str, Vec<u8>>,
    pub diagnostics: Vec<RomDiagnostic>,
}

impl LoadedRoms {
    pub fn region(&self, tag: &str) -> Option<&[u8]> {
        self.regions.get(tag).map(Vec::as_slice)
    }
}

/// Per-file audit outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AuditStatus {
    Good,
    BadChecksum(RomHash),
    WrongLength(usize),
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub region: &'static str,
    pub name: &'static str,
    pub status: AuditStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    /// All files present with the right size (checksums may still differ)
    pub fn is_playable(&self) -> bool {
        self.entries
            .iter()
            .all(|e| matches!(e.status, AuditStatus::Good | AuditStatus::BadChecksum(_)))
    }

    pub fn is_perfect(&self) -> bool {
        self.entries.iter().all(|e| e.status == AuditStatus::Good)
    }
}

impl RomSet {
    pub fn region(&self, tag: &str) -> Option<&'static RomRegion> {
        self.regions.iter().find(|r| r.tag == tag)
    }

    /// Region and entry describing the file called `name`
    pub fn find(&self, name: &str) -> Option<(&'static RomRegion, &'static RomEntry)> {
        self.regions.iter().find_map(|region| {
            region
                .entries
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(name))
                .map(|e| (region, e))
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static RomRegion, &'static RomEntry)> {
        self.regions
            .iter()
            .flat_map(|r| r.entries.iter().map(move |e| (r, e)))
    }

    /// Check the table itself: entries inside their regions, no two entries
    /// covering the same bytes, well-formed SHA-1 strings.
    pub fn validate(&self) -> Result<(), RomError> {
        for region in self.regions {
            for (i, entry) in region.entries.iter().enumerate() {
                if entry.sha1.len() != 40 || !entry.sha1.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(RomError::BadSha1Format {
                        name: entry.name.to_string(),
                        sha1: entry.sha1.to_string(),
                    });
                }
                let end = entry.offset as u64 + entry.length as u64;
                if end > region.size as u64 {
                    return Err(RomError::OutOfBounds {
                        name: entry.name.to_string(),
                        region: region.tag.to_string(),
                        offset: entry.offset,
                        size: region.size,
                    });
                }
                for other in &region.entries[i + 1..] {
                    let other_end = other.offset as u64 + other.length as u64;
                    if (entry.offset as u64) < other_end && (other.offset as u64) < end {
                        return Err(RomError::Overlap {
                            region: region.tag.to_string(),
                            first: entry.name.to_string(),
                            second: other.name.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Fetch one file and check it against its entry. Wrong length is an
    /// error; a checksum mismatch is returned as a diagnostic.
    pub fn verify(
        entry: &RomEntry,
        data: &[u8],
    ) -> Result<Option<RomDiagnostic>, RomError> {
        if data.len() != entry.length as usize {
            return Err(RomError::WrongLength {
                name: entry.name.to_string(),
                expected: entry.length,
                actual: data.len(),
            });
        }
        let actual = RomHash::compute(data);
        if actual.matches(entry) {
            return Ok(None);
        }
        let diagnostic = RomDiagnostic::BadChecksum {
            name: entry.name.to_string(),
            expected: RomHash {
                crc: entry.crc,
                sha1: entry.sha1.to_string(),
            },
            actual,
        };
        log(LogCategory::Rom, LogLevel::Warn, || diagnostic.to_string());
        Ok(Some(diagnostic))
    }

    /// Build every region from `source`.
    pub fn load(&self, source: &dyn RomSource) -> Result<LoadedRoms, RomError> {
        self.validate()?;
        let mut loaded = LoadedRoms::default();
        for region in self.regions {
            let mut bytes = vec![0u8; region.size as usize];
            for entry in region.entries {
                let data = source.fetch(entry.name)?.ok_or_else(|| RomError::Missing {
                    name: entry.name.to_string(),
                })?;
                if let Some(diagnostic) = Self::verify(entry, &data)? {
                    loaded.diagnostics.push(diagnostic);
                }
                let start = entry.offset as usize;
                bytes[start..start + data.len()].copy_from_slice(&data);
                log(LogCategory::Rom, LogLevel::Debug, || {
                    format!(
                        "loaded {} into {} at {:#06x}",
                        entry.name, region.tag, entry.offset
                    )
                });
            }
            loaded.regions.insert(region.tag, bytes);
        }
        Ok(loaded)
    }

    /// Check every file without building regions.
    pub fn audit(&self, source: &dyn RomSource) -> Result<AuditReport, RomError> {
        let mut entries = Vec::new();
        for (region, entry) in self.entries() {
            let status = match source.fetch(entry.name)? {
                None => AuditStatus::Missing,
                Some(data) if data.len() != entry.length as usize => {
                    AuditStatus::WrongLength(data.len())
                }
                Some(data) => {
                    let hash = RomHash::compute(&data);
                    if hash.matches(entry) {
                        AuditStatus::Good
                    } else {
                        AuditStatus::BadChecksum(hash)
                    }
                }
            };
            entries.push(AuditEntry {
                region: region.tag,
                name: entry.name,
                status,
            });
        }
        Ok(AuditReport { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Standard check values: CRC-32 of "123456789" and SHA-1 of "abc".
    const CHECK_CRC: u32 = 0xCBF4_3926;
    const ABC_SHA1: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

    #[test]
    fn test_hash_reference_vectors() {
        assert_eq!(RomHash::compute(b"123456789").crc, CHECK_CRC);
        assert_eq!(RomHash::compute(b"abc").sha1, ABC_SHA1);
    }

    fn sample_set() -> (RomSet, HashMap<String, Vec<u8>>) {
        let low = vec![0x11u8; 4];
        let high = vec![0x22u8; 4];
        let low_hash = RomHash::compute(&low);
        let high_hash = RomHash::compute(&high);
        let entries: &'static [RomEntry] = Box::leak(
            vec![
                rom("low.bin", 0, 4, low_hash.crc, Box::leak(low_hash.sha1.into_boxed_str())),
                rom("high.bin", 4, 4, high_hash.crc, Box::leak(high_hash.sha1.into_boxed_str())),
            ]
            .into_boxed_slice(),
        );
        let regions: &'static [RomRegion] = Box::leak(
            vec![RomRegion {
                tag: "maincpu",
                size: 16,
                entries,
                note: None,
            }]
            .into_boxed_slice(),
        );
        let mut files = HashMap::new();
        files.insert("low.bin".to_string(), low);
        files.insert("high.bin".to_string(), high);
        (RomSet { regions }, files)
    }

    #[test]
    fn test_load_places_files_and_pads_region() {
        let (set, files) = sample_set();
        let loaded = set.load(&files).unwrap();
        assert!(loaded.diagnostics.is_empty());
        let region = loaded.region("maincpu").unwrap();
        assert_eq!(region.len(), 16);
        assert_eq!(&region[0..4], &[0x11; 4]);
        assert_eq!(&region[4..8], &[0x22; 4]);
        assert_eq!(&region[8..], &[0; 8]);
    }

    #[test]
    fn test_bad_checksum_is_a_warning() {
        let (set, mut files) = sample_set();
        files.insert("high.bin".to_string(), vec![0x23; 4]);
        let loaded = set.load(&files).unwrap();
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(matches!(
            &loaded.diagnostics[0],
            RomDiagnostic::BadChecksum { name, .. } if name == "high.bin"
        ));
        assert_eq!(&loaded.region("maincpu").unwrap()[4..8], &[0x23; 4]);
    }

    #[test]
    fn test_missing_and_wrong_length_are_errors() {
        let (set, mut files) = sample_set();
        files.insert("high.bin".to_string(), vec![0x22; 5]);
        assert!(matches!(
            set.load(&files),
            Err(RomError::WrongLength { actual: 5, .. })
        ));

        files.remove("high.bin");
        assert!(matches!(set.load(&files), Err(RomError::Missing { .. })));
    }

    #[test]
    fn test_audit_reports_each_file() {
        let (set, mut files) = sample_set();
        let report = set.audit(&files).unwrap();
        assert!(report.is_perfect());

        files.insert("low.bin".to_string(), vec![0; 4]);
        files.remove("high.bin");
        let report = set.audit(&files).unwrap();
        assert!(!report.is_playable());
        assert!(matches!(report.entries[0].status, AuditStatus::BadChecksum(_)));
        assert_eq!(report.entries[1].status, AuditStatus::Missing);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        static OVERLAP: [RomEntry; 2] = [
            rom("a", 0x0000, 0x1000, 0, ABC_SHA1),
            rom("b", 0x0800, 0x1000, 0, ABC_SHA1),
        ];
        static OVERLAP_REGION: [RomRegion; 1] = [RomRegion {
            tag: "maincpu",
            size: 0x10000,
            entries: &OVERLAP,
            note: None,
        }];
        assert!(matches!(
            RomSet { regions: &OVERLAP_REGION }.validate(),
            Err(RomError::Overlap { .. })
        ));

        static OUTSIDE: [RomEntry; 1] = [rom("a", 0x0100, 0x0200, 0, ABC_SHA1)];
        static OUTSIDE_REGION: [RomRegion; 1] = [RomRegion {
            tag: "proms",
            size: 0x0200,
            entries: &OUTSIDE,
            note: None,
        }];
        assert!(matches!(
            RomSet { regions: &OUTSIDE_REGION }.validate(),
            Err(RomError::OutOfBounds { .. })
        ));

        static SHORT_SHA: [RomEntry; 1] = [rom("a", 0, 1, 0, "abc")];
        static SHORT_REGION: [RomRegion; 1] = [RomRegion {
            tag: "proms",
            size: 0x0200,
            entries: &SHORT_SHA,
            note: None,
        }];
        assert!(matches!(
            RomSet { regions: &SHORT_REGION }.validate(),
            Err(RomError::BadSha1Format { .. })
        ));
    }

    #[test]
    fn test_directory_source_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("RAG5"), [1, 2, 3]).unwrap();
        let source = DirectorySource::new(dir.path());
        assert_eq!(source.root(), dir.path());
        assert_eq!(source.fetch("rag5").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(source.fetch("rag6").unwrap(), None);
    }

    #[test]
    fn test_find_entry() {
        let (set, _) = sample_set();
        let (region, entry) = set.find("HIGH.BIN").unwrap();
        assert_eq!(region.tag, "maincpu");
        assert_eq!(entry.offset, 4);
        assert!(set.find("nope").is_none());
    }
}
