//! Shop standards matrix
//!
//! Per-lathe limits used by feasibility checks: round sizes, chuck capacity,
//! thickness range, the deepest safe drill, and which spacer types the lathe
//! is allowed to run (each with its own sub-limits). A spacer type without a
//! rule is not allowed on that lathe.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::lathes::{LatheConfig, LatheId, LatheMatch, LatheSpec, ROUND_SIZE_EPSILON};
use crate::part::SpacerType;

/// Sub-limits for one spacer type on one lathe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceTypeRule {
    /// Spacer type the rule applies to
    pub spacer_type: SpacerType,
    /// Minimum body thickness, inches
    #[serde(default)]
    pub min_thickness: Option<f64>,
    /// Maximum body thickness, inches
    #[serde(default)]
    pub max_thickness: Option<f64>,
    /// Maximum hub height, inches
    #[serde(default)]
    pub max_hub_height: Option<f64>,
}

impl PieceTypeRule {
    /// A rule with no sub-limits
    pub fn allow(spacer_type: SpacerType) -> Self {
        Self {
            spacer_type,
            min_thickness: None,
            max_thickness: None,
            max_hub_height: None,
        }
    }

    fn min_thickness(mut self, value: f64) -> Self {
        self.min_thickness = Some(value);
        self
    }

    fn max_hub_height(mut self, value: f64) -> Self {
        self.max_hub_height = Some(value);
        self
    }
}

/// Standards record for one lathe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatheStandard {
    /// Lathe identifier
    pub lathe: LatheId,
    /// Supported round sizes, inches
    pub round_sizes: Vec<f64>,
    /// Largest stock OD the chuck holds, inches
    pub chuck_capacity: f64,
    /// Thinnest body the lathe runs, inches
    pub min_thickness: f64,
    /// Thickest body the lathe runs, inches
    pub max_thickness: f64,
    /// Deepest safe single-op drill, inches
    pub max_drill_depth: f64,
    /// Allowed spacer types
    #[serde(default)]
    pub piece_types: Vec<PieceTypeRule>,
}

impl LatheStandard {
    /// Whether the round size is in the supported set
    pub fn supports_round(&self, round_size: f64) -> bool {
        self.round_sizes
            .iter()
            .any(|r| (r - round_size).abs() < ROUND_SIZE_EPSILON)
    }

    /// Rule for a spacer type, `None` if the type is not allowed
    pub fn rule_for(&self, spacer_type: SpacerType) -> Option<&PieceTypeRule> {
        self.piece_types.iter().find(|r| r.spacer_type == spacer_type)
    }

    fn from_spec(
        spec: &LatheSpec,
        min_thickness: f64,
        max_thickness: f64,
        max_drill_depth: f64,
        piece_types: Vec<PieceTypeRule>,
    ) -> Self {
        Self {
            lathe: spec.id,
            round_sizes: spec.round_sizes.clone(),
            chuck_capacity: spec.chuck_capacity,
            min_thickness,
            max_thickness,
            max_drill_depth,
            piece_types,
        }
    }
}

/// Standards for every lathe
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandardsMatrix {
    /// Per-lathe records
    pub lathes: Vec<LatheStandard>,
}

impl StandardsMatrix {
    /// Build from explicit records
    pub fn new(lathes: Vec<LatheStandard>) -> Self {
        Self { lathes }
    }

    /// Built-in shop standards
    pub fn standard() -> &'static StandardsMatrix {
        static STANDARD: OnceLock<StandardsMatrix> = OnceLock::new();
        STANDARD.get_or_init(|| StandardsMatrix::from_lathe_config(LatheConfig::standard()))
    }

    /// Derive the default standards from the lathe envelopes
    pub fn from_lathe_config(config: &LatheConfig) -> Self {
        let lathes = config
            .lathes()
            .iter()
            .map(|spec| match spec.id {
                LatheId::L1 => LatheStandard::from_spec(
                    spec,
                    0.5,
                    2.5,
                    3.0,
                    vec![
                        PieceTypeRule::allow(SpacerType::Standard),
                        PieceTypeRule::allow(SpacerType::HubCentric).max_hub_height(1.0),
                        PieceTypeRule::allow(SpacerType::ThinLip)
                            .min_thickness(0.75)
                            .max_hub_height(0.75),
                        PieceTypeRule::allow(SpacerType::Step),
                        PieceTypeRule::allow(SpacerType::TwoPieceLug),
                        PieceTypeRule::allow(SpacerType::TwoPieceStud).max_hub_height(0.5),
                    ],
                ),
                LatheId::L2 => LatheStandard::from_spec(
                    spec,
                    0.5,
                    4.0,
                    4.5,
                    large_parts_rules(1.5),
                ),
                LatheId::L3 => LatheStandard::from_spec(
                    spec,
                    0.75,
                    4.0,
                    4.5,
                    large_parts_rules(2.0),
                ),
            })
            .collect();
        Self { lathes }
    }

    /// Envelopes for the lathes in this matrix: machine limits and tooling
    /// from `base`, round sizes and chuck capacity from the standards
    pub fn lathe_config(&self, base: &LatheConfig) -> LatheConfig {
        let lathes = self
            .lathes
            .iter()
            .filter_map(|record| {
                let mut spec = base.get(record.lathe)?.clone();
                spec.round_sizes = record.round_sizes.clone();
                spec.chuck_capacity = record.chuck_capacity;
                Some(spec)
            })
            .collect();
        LatheConfig::new(lathes)
    }

    /// Record for one lathe
    pub fn get(&self, lathe: LatheId) -> Option<&LatheStandard> {
        self.lathes.iter().find(|l| l.lathe == lathe)
    }

    /// Which lathes run a round size
    pub fn lathes_for_round(&self, round_size: f64) -> LatheMatch {
        let ids: Vec<LatheId> = self
            .lathes
            .iter()
            .filter(|l| l.supports_round(round_size))
            .map(|l| l.lathe)
            .collect();
        match ids.len() {
            0 => LatheMatch::Unsupported,
            1 => LatheMatch::Unique(ids[0]),
            _ => LatheMatch::Ambiguous(ids),
        }
    }
}

fn large_parts_rules(max_hub: f64) -> Vec<PieceTypeRule> {
    vec![
        PieceTypeRule::allow(SpacerType::Standard),
        PieceTypeRule::allow(SpacerType::HubCentric).max_hub_height(max_hub),
        PieceTypeRule::allow(SpacerType::ThinLip)
            .min_thickness(0.75)
            .max_hub_height(max_hub),
        PieceTypeRule::allow(SpacerType::Step),
        PieceTypeRule::allow(SpacerType::SteelRing).min_thickness(0.75),
        PieceTypeRule::allow(SpacerType::TwoPieceLug),
        PieceTypeRule::allow(SpacerType::TwoPieceStud).max_hub_height(0.5),
    ]
}
