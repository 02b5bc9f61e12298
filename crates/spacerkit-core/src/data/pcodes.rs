//! Work-offset (P-code) tables
//!
//! Each thickness has a fixture slot per operation side. Slots are physical,
//! so a missing key is an error rather than something to interpolate.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::lathes::{LatheClass, LatheId};
use crate::error::{GenerationError, GenerationResult};

/// Which side of the part is up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpSide {
    /// First operation, before the flip
    Op1,
    /// Second operation, after the flip
    Op2,
}

impl fmt::Display for OpSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op1 => write!(f, "OP1"),
            Self::Op2 => write!(f, "OP2"),
        }
    }
}

/// A `G154 P<n>` work offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PCode(pub u16);

impl fmt::Display for PCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Work offsets for both sides of one thickness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PCodePair {
    /// Op1 offset
    pub op1: PCode,
    /// Op2 offset
    pub op2: PCode,
}

impl PCodePair {
    /// Offset for one side
    pub fn for_side(&self, side: OpSide) -> PCode {
        match side {
            OpSide::Op1 => self.op1,
            OpSide::Op2 => self.op2,
        }
    }
}

const SMALL_PARTS_ENTRIES: &[(&str, u16, u16)] = &[
    ("10MM", 1, 2),
    ("11MM", 3, 4),
    ("12MM", 5, 6),
    ("13MM", 7, 8),
    ("14MM", 9, 10),
    ("15MM", 11, 12),
    ("16MM", 13, 14),
    ("17MM", 15, 16),
    ("18MM", 17, 18),
    ("19MM", 19, 20),
    ("0.50", 21, 22),
    ("0.75", 23, 24),
    ("1.00", 25, 26),
    ("1.25", 27, 28),
    ("1.50", 29, 30),
    ("1.75", 31, 32),
    ("2.00", 33, 34),
    ("2.25", 35, 36),
    ("2.50", 37, 38),
];

const LARGE_PARTS_ENTRIES: &[(&str, u16, u16)] = &[
    ("10MM", 13, 14),
    ("11MM", 15, 16),
    ("12MM", 17, 18),
    ("13MM", 19, 20),
    ("14MM", 21, 22),
    ("15MM", 23, 24),
    ("16MM", 25, 26),
    ("17MM", 27, 28),
    ("18MM", 29, 30),
    ("19MM", 31, 32),
    ("20MM", 33, 34),
    ("25MM", 35, 36),
    ("30MM", 37, 38),
    ("0.50", 39, 40),
    ("0.75", 41, 42),
    ("1.00", 43, 44),
    ("1.25", 45, 46),
    ("1.50", 47, 48),
    ("1.75", 49, 50),
    ("2.00", 51, 52),
    ("2.25", 53, 54),
    ("2.50", 55, 56),
    ("2.75", 57, 58),
    ("3.00", 59, 60),
    ("3.25", 61, 62),
    ("3.50", 63, 64),
    ("3.75", 65, 66),
    ("4.00", 67, 68),
];

fn build(entries: &[(&str, u16, u16)]) -> HashMap<String, PCodePair> {
    entries
        .iter()
        .map(|(key, op1, op2)| {
            (
                key.to_string(),
                PCodePair {
                    op1: PCode(*op1),
                    op2: PCode(*op2),
                },
            )
        })
        .collect()
}

/// Work-offset tables for both lathe classes
#[derive(Debug, Clone)]
pub struct PCodeTable {
    small_parts: HashMap<String, PCodePair>,
    large_parts: HashMap<String, PCodePair>,
}

impl PCodeTable {
    /// The shop's P-code tables, built once per process
    pub fn standard() -> &'static PCodeTable {
        static STANDARD: OnceLock<PCodeTable> = OnceLock::new();
        STANDARD.get_or_init(|| PCodeTable {
            small_parts: build(SMALL_PARTS_ENTRIES),
            large_parts: build(LARGE_PARTS_ENTRIES),
        })
    }

    fn table(&self, class: LatheClass) -> &HashMap<String, PCodePair> {
        match class {
            LatheClass::SmallParts => &self.small_parts,
            LatheClass::LargeParts => &self.large_parts,
        }
    }

    /// Both offsets for a thickness on a lathe
    pub fn get_pair(&self, lathe: LatheId, key: &str) -> GenerationResult<PCodePair> {
        let class = lathe.class();
        self.table(class)
            .get(key)
            .copied()
            .ok_or_else(|| GenerationError::lookup_miss(format!("P-code ({})", class), key))
    }

    /// Offset for one side of a thickness on a lathe
    pub fn get_pcode(&self, lathe: LatheId, key: &str, side: OpSide) -> GenerationResult<PCode> {
        self.get_pair(lathe, key).map(|pair| pair.for_side(side))
    }
}
