//! Lathe envelopes
//!
//! This module provides:
//! - Lathe identifiers and their parts class
//! - Per-machine limits (round sizes, spindle ceilings, chuck capacity)
//! - Turret tool assignments and machine home positions
//! - Round-size to lathe resolution

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Tolerance used when comparing round sizes
pub const ROUND_SIZE_EPSILON: f64 = 1e-3;

/// Lathe identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LatheId {
    /// Small-parts lathe
    L1,
    /// Large-parts lathe
    L2,
    /// Large-parts lathe with the big chuck
    L3,
}

impl LatheId {
    /// Get all lathes
    pub fn all() -> &'static [LatheId] {
        &[LatheId::L1, LatheId::L2, LatheId::L3]
    }

    /// Parts class the lathe belongs to
    pub fn class(&self) -> LatheClass {
        match self {
            Self::L1 => LatheClass::SmallParts,
            Self::L2 | Self::L3 => LatheClass::LargeParts,
        }
    }
}

impl fmt::Display for LatheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L3 => write!(f, "L3"),
        }
    }
}

impl FromStr for LatheId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L1" | "1" => Ok(Self::L1),
            "L2" | "2" => Ok(Self::L2),
            "L3" | "3" => Ok(Self::L3),
            _ => Err(format!("Unknown lathe: {}", s)),
        }
    }
}

/// Fixture family a lathe belongs to. Work-offset tables are per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatheClass {
    /// The small-parts lathe
    SmallParts,
    /// The large-parts family
    LargeParts,
}

impl fmt::Display for LatheClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallParts => write!(f, "small-parts"),
            Self::LargeParts => write!(f, "large-parts"),
        }
    }
}

/// Turret stations used by the spacer programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAssignments {
    /// Pilot drill
    pub drill: u16,
    /// Boring bar
    pub bore: u16,
    /// OD turning tool
    pub turn: u16,
    /// Bore chamfer tool
    pub chamfer: u16,
}

/// Machine envelope for one lathe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatheSpec {
    /// Lathe identifier
    pub id: LatheId,
    /// Round (stock OD) sizes the lathe is set up for, inches
    pub round_sizes: Vec<f64>,
    /// Spindle RPM ceiling
    pub max_rpm: u32,
    /// Constant surface speed ceiling (SFM)
    pub max_css: u32,
    /// Machine-coordinate X of the tool-change position
    pub home_x: f64,
    /// Machine-coordinate Z of the tool-change position
    pub home_z: f64,
    /// Largest round size the chuck can hold, inches
    pub chuck_capacity: f64,
    /// Turret stations
    pub tools: ToolAssignments,
}

impl LatheSpec {
    /// Whether the lathe is set up for the round size
    pub fn supports_round(&self, round_size: f64) -> bool {
        self.round_sizes
            .iter()
            .any(|r| (r - round_size).abs() < ROUND_SIZE_EPSILON)
    }
}

/// Result of resolving a round size to a lathe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatheMatch {
    /// Exactly one lathe runs the size
    Unique(LatheId),
    /// Several lathes run the size; the caller must pick one
    Ambiguous(Vec<LatheId>),
    /// No lathe runs the size
    Unsupported,
}

/// All lathe envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatheConfig {
    lathes: Vec<LatheSpec>,
}

impl LatheConfig {
    /// Build a configuration from explicit envelopes
    pub fn new(lathes: Vec<LatheSpec>) -> Self {
        Self { lathes }
    }

    /// The shop's lathe envelopes, built once per process
    pub fn standard() -> &'static LatheConfig {
        static STANDARD: OnceLock<LatheConfig> = OnceLock::new();
        STANDARD.get_or_init(|| LatheConfig::new(standard_lathes()))
    }

    /// Envelope for one lathe
    pub fn get(&self, id: LatheId) -> Option<&LatheSpec> {
        self.lathes.iter().find(|l| l.id == id)
    }

    /// All envelopes
    pub fn lathes(&self) -> &[LatheSpec] {
        &self.lathes
    }

    /// Which lathes run a round size
    pub fn lathes_for_round(&self, round_size: f64) -> LatheMatch {
        let ids: Vec<LatheId> = self
            .lathes
            .iter()
            .filter(|l| l.supports_round(round_size))
            .map(|l| l.id)
            .collect();
        match ids.len() {
            0 => LatheMatch::Unsupported,
            1 => LatheMatch::Unique(ids[0]),
            _ => LatheMatch::Ambiguous(ids),
        }
    }
}

fn standard_lathes() -> Vec<LatheSpec> {
    vec![
        LatheSpec {
            id: LatheId::L1,
            round_sizes: vec![5.75, 6.0, 6.25, 6.5],
            max_rpm: 3000,
            max_css: 1000,
            home_x: -1.0,
            home_z: -11.0,
            chuck_capacity: 7.0,
            tools: ToolAssignments {
                drill: 101,
                bore: 303,
                turn: 202,
                chamfer: 404,
            },
        },
        LatheSpec {
            id: LatheId::L2,
            round_sizes: vec![7.0, 7.5, 8.0, 8.5],
            max_rpm: 2500,
            max_css: 900,
            home_x: -1.5,
            home_z: -13.0,
            chuck_capacity: 9.0,
            tools: ToolAssignments {
                drill: 101,
                bore: 121,
                turn: 303,
                chamfer: 202,
            },
        },
        LatheSpec {
            id: LatheId::L3,
            round_sizes: vec![7.0, 7.5, 8.0, 8.5, 9.5, 10.25, 10.5, 13.0],
            max_rpm: 2000,
            max_css: 850,
            home_x: -2.0,
            home_z: -15.0,
            chuck_capacity: 13.5,
            tools: ToolAssignments {
                drill: 101,
                bore: 121,
                turn: 303,
                chamfer: 202,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lathe_id_parse() {
        assert_eq!("l2".parse::<LatheId>().unwrap(), LatheId::L2);
        assert_eq!(" L3 ".parse::<LatheId>().unwrap(), LatheId::L3);
        assert!("L9".parse::<LatheId>().is_err());
    }

    #[test]
    fn test_classes() {
        assert_eq!(LatheId::L1.class(), LatheClass::SmallParts);
        assert_eq!(LatheId::L2.class(), LatheClass::LargeParts);
        assert_eq!(LatheId::L3.class(), LatheClass::LargeParts);
    }

    #[test]
    fn test_round_resolution() {
        let config = LatheConfig::standard();
        assert_eq!(config.lathes_for_round(6.0), LatheMatch::Unique(LatheId::L1));
        assert_eq!(config.lathes_for_round(10.5), LatheMatch::Unique(LatheId::L3));
        assert_eq!(
            config.lathes_for_round(7.0),
            LatheMatch::Ambiguous(vec![LatheId::L2, LatheId::L3])
        );
        assert_eq!(config.lathes_for_round(4.0), LatheMatch::Unsupported);
    }

    #[test]
    fn test_chuck_holds_every_supported_round() {
        for lathe in LatheConfig::standard().lathes() {
            for round in &lathe.round_sizes {
                assert!(*round <= lathe.chuck_capacity, "{} {}", lathe.id, round);
            }
        }
    }
}
