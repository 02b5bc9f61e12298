//! Tunable shop constants
//!
//! Offsets and limits taken from historical programs. They are not derived
//! from first principles, so every value lives here where it can be
//! overridden from the settings file instead of being baked into the
//! generators and verifiers.

use serde::{Deserialize, Serialize};

use crate::data::FALLBACK_BREAKTHROUGH;

/// Constants consumed by the pass calculators and program generators.
/// All lengths are inches unless the field name says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorTuning {
    /// First boring diameter, just above the pilot drill
    pub safe_entry_diameter: f64,
    /// Largest diameter increase per roughing pass
    pub max_bore_step: f64,
    /// Slack allowed on the step check
    pub step_tolerance: f64,
    /// Pre-finish pass sits this far under the target
    pub pre_finish_offset: f64,
    /// 45° chamfer depth
    pub chamfer_depth: f64,
    /// Largest diameter the boring bar can reach
    pub max_bore_diameter: f64,
    /// OB - CB (mm) at or below which a hub-centric part is thin-lip
    pub thin_lip_threshold_mm: f64,
    /// Radial inset of the thin-lip safety shelf below CB
    pub thin_lip_shelf_inset: f64,
    /// Shelf Z offset above drill depth plus hub height
    pub thin_lip_shelf_offset: f64,
    /// Z step when turning a hub
    pub hub_z_increment: f64,
    /// Z step when turning a thin-lip hub
    pub thin_lip_z_increment: f64,
    /// Steel-ring shelf sits this far above drill depth
    pub steel_ring_step_offset: f64,
    /// Steel-ring shelf diameter is CB minus this
    pub steel_ring_step_inset: f64,
    /// Depth of the op2 steel-ring pocket
    pub ring_pocket_depth: f64,
    /// Default two-piece lug recess depth
    pub lug_recess_depth: f64,
    /// Default two-piece stud hub height
    pub stud_hub_height: f64,
    /// Added to CB (mm) when tolerancing is enabled
    pub cb_tolerance_mm: f64,
    /// Removed from OB (mm) when tolerancing is enabled
    pub ob_tolerance_mm: f64,
    /// Rapid approach height above the work face
    pub clearance_z: f64,
    /// Radial clearance outside the stock for turning approaches
    pub stock_clearance: f64,
    /// Extra drill depth past the part bottom for thicknesses missing from
    /// the depth table
    pub drill_breakthrough: f64,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            safe_entry_diameter: 2.3,
            max_bore_step: 0.3,
            step_tolerance: 0.005,
            pre_finish_offset: 0.1,
            chamfer_depth: 0.15,
            max_bore_diameter: 6.0,
            thin_lip_threshold_mm: 5.0,
            thin_lip_shelf_inset: 0.625,
            thin_lip_shelf_offset: 0.37,
            hub_z_increment: 0.2,
            thin_lip_z_increment: 0.1,
            steel_ring_step_offset: 0.15,
            steel_ring_step_inset: 0.175,
            ring_pocket_depth: 0.55,
            lug_recess_depth: 0.31,
            stud_hub_height: 0.25,
            cb_tolerance_mm: 0.1,
            ob_tolerance_mm: 0.1,
            clearance_z: 0.2,
            stock_clearance: 0.1,
            drill_breakthrough: FALLBACK_BREAKTHROUGH,
        }
    }
}

impl GeneratorTuning {
    /// Largest step the verifier accepts between roughing passes
    pub fn max_step_with_tolerance(&self) -> f64 {
        self.max_bore_step + self.step_tolerance
    }

    /// Names of fields that must be strictly positive but are not
    pub fn non_positive_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("safe_entry_diameter", self.safe_entry_diameter),
            ("max_bore_step", self.max_bore_step),
            ("chamfer_depth", self.chamfer_depth),
            ("max_bore_diameter", self.max_bore_diameter),
            ("hub_z_increment", self.hub_z_increment),
            ("thin_lip_z_increment", self.thin_lip_z_increment),
            ("ring_pocket_depth", self.ring_pocket_depth),
            ("lug_recess_depth", self.lug_recess_depth),
            ("stud_hub_height", self.stud_hub_height),
            ("clearance_z", self.clearance_z),
        ];
        fields
            .iter()
            .filter(|(_, v)| *v <= 0.0)
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Constants consumed by the verification passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierTuning {
    /// Lines searched for context such as a preceding feed rate
    pub lookahead_lines: usize,
    /// Lines searched after a work-offset change
    pub context_lines: usize,
    /// Feed used when no preceding F word is found (in/rev)
    pub default_safe_feed: f64,
    /// Feed moves below this depth count as boring passes
    pub bore_surface_depth: f64,
    /// Minimum rapid Z after selecting a work offset
    pub work_offset_min_clearance: f64,
    /// Z written by the work-offset clearance fix
    pub work_offset_clearance_z: f64,
    /// Allowed gap between a marked CB/OB and the expected value (mm)
    pub dimension_tolerance_mm: f64,
    /// Boring-step rules shared with the generator
    pub safe_entry_diameter: f64,
    /// Largest diameter increase per roughing pass
    pub max_bore_step: f64,
    /// Slack allowed on the step check
    pub step_tolerance: f64,
}

impl Default for VerifierTuning {
    fn default() -> Self {
        let gen = GeneratorTuning::default();
        Self {
            lookahead_lines: 100,
            context_lines: 20,
            default_safe_feed: 0.008,
            bore_surface_depth: 0.2,
            work_offset_min_clearance: 0.1,
            work_offset_clearance_z: 0.2,
            dimension_tolerance_mm: 0.15,
            safe_entry_diameter: gen.safe_entry_diameter,
            max_bore_step: gen.max_bore_step,
            step_tolerance: gen.step_tolerance,
        }
    }
}
