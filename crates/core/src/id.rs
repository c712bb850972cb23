//! Identifiers for pratiche: opaque local ids and display numbers.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of random base-36 characters appended by [`gid`].
pub const GID_RANDOM_LEN: usize = 5;

/// Encode an unsigned integer in lowercase base 36.
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// Generate an opaque id: base-36 millisecond timestamp followed by
/// [`GID_RANDOM_LEN`] random base-36 characters.
///
/// Collisions are unlikely within one process but not impossible; the id is
/// meant for local identity before a record is persisted.
pub fn gid() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    gid_with(millis, &mut rand::thread_rng())
}

/// [`gid`] with an explicit clock reading and random source.
pub fn gid_with<R: Rng>(millis: u64, rng: &mut R) -> String {
    let mut id = to_base36(millis);
    for _ in 0..GID_RANDOM_LEN {
        id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
    }
    id
}

/// Format a case display number: `P-<year>-<seq>` with `seq` zero-padded to
/// four digits. Wider sequences are kept whole.
pub fn gen_pratica_num(year: i32, seq: u32) -> String {
    PraticaNum::new(year, seq).to_string()
}

/// Unique identifier for a Pratica
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PraticaId(String);

impl PraticaId {
    /// Generate a new PraticaId
    pub fn new() -> Self {
        Self(gid())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PraticaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PraticaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PraticaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PraticaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Human-readable case number, unique per calendar year.
///
/// The sequence is allocated by the storage layer; this type only formats
/// and parses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PraticaNum {
    /// Calendar year
    pub year: i32,

    /// Sequence within the year, starting at 1
    pub seq: u32,
}

impl PraticaNum {
    /// Create a display number.
    pub fn new(year: i32, seq: u32) -> Self {
        Self { year, seq }
    }
}

impl std::fmt::Display for PraticaNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P-{}-{:04}", self.year, self.seq)
    }
}

/// Error parsing a [`PraticaNum`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid case number: {0:?} (expected P-<year>-<seq>)")]
pub struct ParsePraticaNumError(String);

impl std::str::FromStr for PraticaNum {
    type Err = ParsePraticaNumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"^P-(\d{4})-(\d{4,})$").expect("case number pattern is valid")
        });

        let invalid = || ParsePraticaNumError(s.to_string());
        let caps = re.captures(s.trim()).ok_or_else(invalid)?;
        let year = caps[1].parse().map_err(|_| invalid())?;
        let seq = caps[2].parse().map_err(|_| invalid())?;
        Ok(Self { year, seq })
    }
}

impl TryFrom<String> for PraticaNum {
    type Error = ParsePraticaNumError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PraticaNum> for String {
    fn from(num: PraticaNum) -> Self {
        num.to_string()
    }
}
