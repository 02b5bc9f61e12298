//! Drill and profile depth table
//!
//! Maps a normalized thickness key to the op1 drill depth and the op1 OD
//! profile depth, both negative inches. Keys missing from the table fall back
//! to a formula on the thickness itself.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenerationError, GenerationResult};
use crate::thickness::ThicknessKey;

/// Default extra drill depth past the part bottom used by the fallback formula
pub const FALLBACK_BREAKTHROUGH: f64 = 0.15;

/// Drill and profile depth for one thickness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Depths {
    /// Op1 drill depth (negative inches)
    pub drill: f64,
    /// Op1 OD profile depth (negative inches)
    pub profile: f64,
}

/// Whether a depth came from the table or the fallback formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthSource {
    /// Exact table entry
    Table,
    /// Computed from the thickness
    Fallback,
}

const DEPTH_ENTRIES: &[(&str, f64, f64)] = &[
    ("10MM", -0.54, -0.1),
    ("11MM", -0.58, -0.1),
    ("12MM", -0.62, -0.1),
    ("13MM", -0.66, -0.1),
    ("14MM", -0.7, -0.1),
    ("15MM", -0.74, -0.1),
    ("16MM", -0.78, -0.1),
    ("17MM", -0.82, -0.1),
    ("18MM", -0.86, -0.1),
    ("19MM", -0.9, -0.1),
    ("20MM", -0.94, -0.39),
    ("25MM", -1.13, -0.49),
    ("30MM", -1.33, -0.62),
    ("0.50", -0.65, -0.1),
    ("0.75", -0.9, -0.1),
    ("1.00", -1.15, -0.5),
    ("1.25", -1.4, -0.656),
    ("1.50", -1.65, -0.788),
    ("1.75", -1.9, -0.919),
    ("2.00", -2.15, -1.05),
    ("2.25", -2.4, -1.181),
    ("2.50", -2.65, -1.312),
    ("2.75", -2.9, -1.444),
    ("3.00", -3.15, -1.575),
    ("3.25", -3.4, -1.706),
    ("3.50", -3.65, -1.838),
    ("3.75", -3.9, -1.969),
    ("4.00", -4.15, -2.1),
];

/// Static depth table
#[derive(Debug, Clone)]
pub struct DepthTable {
    entries: HashMap<String, Depths>,
}

impl DepthTable {
    /// The shop's depth table, built once per process
    pub fn standard() -> &'static DepthTable {
        static STANDARD: OnceLock<DepthTable> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let entries = DEPTH_ENTRIES
                .iter()
                .map(|(key, drill, profile)| {
                    (
                        key.to_string(),
                        Depths {
                            drill: *drill,
                            profile: *profile,
                        },
                    )
                })
                .collect();
            DepthTable { entries }
        })
    }

    /// Exact table entry, if any
    pub fn entry(&self, key: &str) -> Option<Depths> {
        self.entries.get(key).copied()
    }

    /// Depths for a thickness key, falling back to the formula
    pub fn get_depths(&self, key: &ThicknessKey) -> Depths {
        self.lookup(key.key(), Some(key.inches()))
            .map(|(depths, _)| depths)
            .unwrap_or_else(|_| fallback_depths(key.inches(), FALLBACK_BREAKTHROUGH))
    }

    /// Depths for a raw key with an optional thickness for the fallback.
    ///
    /// Fails with `LookupMiss` only when the key is absent and no usable
    /// thickness is available.
    pub fn lookup(
        &self,
        key: &str,
        thickness: Option<f64>,
    ) -> GenerationResult<(Depths, DepthSource)> {
        self.lookup_with_breakthrough(key, thickness, FALLBACK_BREAKTHROUGH)
    }

    /// Like [`DepthTable::lookup`], drilling `breakthrough` past the part
    /// bottom when the fallback formula is used. Table entries are unaffected.
    pub fn lookup_with_breakthrough(
        &self,
        key: &str,
        thickness: Option<f64>,
        breakthrough: f64,
    ) -> GenerationResult<(Depths, DepthSource)> {
        if let Some(depths) = self.entry(key) {
            return Ok((depths, DepthSource::Table));
        }

        let thickness = thickness
            .or_else(|| key.parse::<ThicknessKey>().ok().map(|k| k.inches()))
            .filter(|t| t.is_finite() && *t > 0.0)
            .ok_or_else(|| GenerationError::lookup_miss("depth", key))?;

        debug!(key, thickness, breakthrough, "depth table miss, using fallback formula");
        Ok((fallback_depths(thickness, breakthrough), DepthSource::Fallback))
    }

    /// Number of table entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Formula used when a thickness has no table entry
pub fn fallback_depths(thickness: f64, breakthrough: f64) -> Depths {
    let drill = -(thickness + breakthrough);
    let profile = if thickness <= 0.75 {
        -0.10
    } else if thickness <= 1.0 {
        -(thickness * 0.5)
    } else {
        -(thickness * 0.525)
    };
    Depths { drill, profile }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let table = DepthTable::standard();
        let (depths, source) = table.lookup("1.50", None).unwrap();
        assert_eq!(source, DepthSource::Table);
        assert_eq!(depths.drill, -1.65);
        assert_eq!(depths.profile, -0.788);

        let (depths, _) = table.lookup("15MM", None).unwrap();
        assert_eq!(depths.drill, -0.74);
    }

    #[test]
    fn test_fallback_bands() {
        let d = fallback_depths(0.6, FALLBACK_BREAKTHROUGH);
        assert!((d.drill + 0.75).abs() < 1e-12);
        assert_eq!(d.profile, -0.10);

        let d = fallback_depths(0.9, FALLBACK_BREAKTHROUGH);
        assert!((d.profile + 0.45).abs() < 1e-12);

        let d = fallback_depths(1.6, FALLBACK_BREAKTHROUGH);
        assert!((d.profile + 0.84).abs() < 1e-12);
    }

    #[test]
    fn test_fallback_from_key() {
        let table = DepthTable::standard();
        let (depths, source) = table.lookup("1.60", None).unwrap();
        assert_eq!(source, DepthSource::Fallback);
        assert!((depths.drill + 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_fallback_breakthrough_override() {
        let table = DepthTable::standard();
        let (depths, source) = table.lookup_with_breakthrough("1.60", None, 0.25).unwrap();
        assert_eq!(source, DepthSource::Fallback);
        assert!((depths.drill + 1.85).abs() < 1e-12);

        let (depths, source) = table.lookup_with_breakthrough("1.50", None, 0.25).unwrap();
        assert_eq!(source, DepthSource::Table);
        assert_eq!(depths.drill, -1.65);
    }

    #[test]
    fn test_lookup_miss_without_thickness() {
        let table = DepthTable::standard();
        let err = table.lookup("SPECIAL", None).unwrap_err();
        assert!(err.is_lookup_miss());
    }

    #[test]
    fn test_table_entries_are_ordered() {
        for (key, drill, profile) in DEPTH_ENTRIES {
            assert!(drill < profile && *profile < 0.0, "{}", key);
        }
    }
}
