//! High score ledger
//!
//! Append-only list of finished runs with two ranked views. Persisted as a
//! small binary file where every record carries its own checksum, so a
//! damaged record is dropped without losing the rest.
//!
//! Layout (little-endian `i32`, numeric fields stored bit-inverted):
//! `!count`, then per record `!score`, `!level`, `!name_len`, the UTF-8 name
//! bytes and `count ^ score ^ level ^ name_len ^ sum(name bytes)`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: i32,
    /// Level reached
    pub level: u32,
}

/// High score ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    /// Insertion order
    pub entries: Vec<HighScoreEntry>,
}

/// Result of decoding a ledger file
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub scores: HighScores,
    /// Records dropped for a bad checksum or name
    pub dropped: usize,
    /// Records the header announced but the data did not contain
    pub missing: usize,
}

fn checksum(count: i32, score: i32, level: i32, name: &[u8]) -> i32 {
    let name_sum = name.iter().fold(0i32, |acc, &b| acc.wrapping_add(b as i32));
    count ^ score ^ level ^ name.len() as i32 ^ name_sum
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn i32(&mut self) -> Option<i32> {
        let raw: [u8; 4] = self.take(4)?.try_into().ok()?;
        Some(i32::from_le_bytes(raw))
    }

    /// `(score, level, name, checksum)` with the fields un-inverted
    fn record(&mut self) -> Option<(i32, i32, &'a [u8], i32)> {
        let score = !self.i32()?;
        let level = !self.i32()?;
        let len = usize::try_from(!self.i32()?).ok()?;
        let name = self.take(len)?;
        let sum = self.i32()?;
        Some((score, level, name, sum))
    }
}

impl HighScores {
    /// Create empty ledger
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Negative scores are never recorded
    pub fn qualifies(&self, score: i32) -> bool {
        score >= 0
    }

    /// Record a run; returns its 1-indexed position in the by-level view,
    /// or `None` if rejected
    pub fn add(&mut self, name: &str, score: i32, level: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        // Earlier entries win ties
        let ahead = self
            .entries
            .iter()
            .filter(|e| e.level > level || (e.level == level && e.score >= score))
            .count();
        self.entries.push(HighScoreEntry {
            name: name.to_string(),
            score,
            level,
        });
        log::info!("High score recorded: {} {} (level {})", name, score, level);
        Some(ahead + 1)
    }

    /// Entries by descending score
    pub fn by_score(&self) -> Vec<&HighScoreEntry> {
        let mut view: Vec<&HighScoreEntry> = self.entries.iter().collect();
        view.sort_by(|a, b| b.score.cmp(&a.score));
        view
    }

    /// Entries by descending level, then descending score
    pub fn by_level(&self) -> Vec<&HighScoreEntry> {
        let mut view: Vec<&HighScoreEntry> = self.entries.iter().collect();
        view.sort_by(|a, b| b.level.cmp(&a.level).then(b.score.cmp(&a.score)));
        view
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<i32> {
        self.entries.iter().map(|e| e.score).max()
    }

    pub fn encode(&self) -> Vec<u8> {
        let count = self.entries.len() as i32;
        let mut out = Vec::new();
        out.extend_from_slice(&(!count).to_le_bytes());
        for entry in &self.entries {
            let name = entry.name.as_bytes();
            let level = entry.level as i32;
            out.extend_from_slice(&(!entry.score).to_le_bytes());
            out.extend_from_slice(&(!level).to_le_bytes());
            out.extend_from_slice(&(!(name.len() as i32)).to_le_bytes());
            out.extend_from_slice(name);
            out.extend_from_slice(&checksum(count, entry.score, level, name).to_le_bytes());
        }
        out
    }

    /// Decode as many valid records as the data holds
    pub fn decode(bytes: &[u8]) -> Decoded {
        let mut cursor = Cursor { bytes, pos: 0 };
        let mut decoded = Decoded::default();
        let Some(count) = cursor.i32().map(|c| !c) else {
            return decoded;
        };
        let expected = count.max(0) as usize;

        for read in 0..expected {
            let Some((score, level, name, sum)) = cursor.record() else {
                decoded.missing = expected - read;
                break;
            };

            let valid_name = std::str::from_utf8(name).ok();
            let valid_level = u32::try_from(level).ok();
            match (valid_name, valid_level) {
                (Some(name), Some(level))
                    if sum == checksum(count, score, level as i32, name.as_bytes()) =>
                {
                    decoded.scores.entries.push(HighScoreEntry {
                        name: name.to_string(),
                        score,
                        level,
                    });
                }
                _ => {
                    log::warn!("Dropping corrupt high score record {}", read);
                    decoded.dropped += 1;
                }
            }
        }
        decoded
    }

    /// Load from disk; a missing file is an empty ledger
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let decoded = Self::decode(&bytes);
        if decoded.missing > 0 {
            let read = decoded.scores.len() + decoded.dropped;
            let err = LedgerError::Truncated {
                read,
                expected: read + decoded.missing,
            };
            log::warn!("{}", err);
        }
        log::info!("Loaded {} high scores", decoded.scores.len());
        Ok(decoded.scores)
    }

    /// Rewrite the whole file
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        fs::write(path, self.encode())?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HighScores {
        let mut scores = HighScores::new();
        scores.add("ada", 4200, 3);
        scores.add("bob", 9000, 2);
        scores.add("cy", 1500, 3);
        scores
    }

    #[test]
    fn test_add_rejects_negative() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add("neg", -1, 5), None);
        assert!(scores.is_empty());
        assert_eq!(scores.add("zero", 0, 1), Some(1));
    }

    #[test]
    fn test_add_returns_level_rank() {
        let mut scores = sample();
        // Level 3 with a score between the two level-3 entries
        assert_eq!(scores.add("dee", 2000, 3), Some(2));
        // Ties go behind existing entries
        assert_eq!(scores.add("eve", 9000, 2), Some(5));
        assert_eq!(scores.add("fin", 1, 10), Some(1));
    }

    #[test]
    fn test_views() {
        let scores = sample();
        let by_score: Vec<&str> = scores.by_score().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(by_score, vec!["bob", "ada", "cy"]);
        let by_level: Vec<&str> = scores.by_level().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(by_level, vec!["ada", "cy", "bob"]);
        assert_eq!(scores.top_score(), Some(9000));
    }

    #[test]
    fn test_encode_decode() {
        let mut scores = sample();
        scores.add("Zoë", 77, 1);
        let decoded = HighScores::decode(&scores.encode());
        assert_eq!(decoded.scores, scores);
        assert_eq!(decoded.dropped, 0);
        assert_eq!(decoded.missing, 0);
    }

    #[test]
    fn test_corrupt_checksum_drops_one_record() {
        let scores = sample();
        let mut bytes = scores.encode();
        // Header (4) + first record: 12 bytes of fields, "ada", then checksum
        let checksum_at = 4 + 12 + 3;
        bytes[checksum_at] ^= 0xFF;

        let decoded = HighScores::decode(&bytes);
        assert_eq!(decoded.dropped, 1);
        let names: Vec<&str> = decoded.scores.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["bob", "cy"]);
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let mut scores = HighScores::new();
        scores.add("ok", 10, 1);
        let mut bytes = scores.encode();
        // Replace "ok" with an invalid sequence of the same byte sum
        bytes[16] = 0xC0;
        bytes[17] = (b'o' as u16 + b'k' as u16 - 0xC0) as u8;
        let decoded = HighScores::decode(&bytes);
        assert!(decoded.scores.is_empty());
        assert_eq!(decoded.dropped, 1);
    }

    #[test]
    fn test_truncated_keeps_prefix() {
        let scores = sample();
        let bytes = scores.encode();
        let decoded = HighScores::decode(&bytes[..bytes.len() - 2]);
        assert_eq!(decoded.scores.len(), 2);
        assert_eq!(decoded.missing, 1);

        assert!(HighScores::decode(&[]).scores.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("space-rogues-ledger-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("highscores.bin");

        let scores = sample();
        scores.save(&path).unwrap();
        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded.by_score(), scores.by_score());

        let missing = HighScores::load(&dir.join("absent.bin")).unwrap();
        assert!(missing.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }
}
