//! Part specification
//!
//! This module provides:
//! - The spacer-type tag and its variant payloads
//! - [`PartSpec`], the validated input to program generation
//! - [`PartSpecBuilder`], which turns loose operator or catalog fields into a
//!   `PartSpec` and rejects anything that would produce an unsafe program

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::data::lathes::LatheId;
use crate::error::{GenerationError, GenerationResult};
use crate::thickness::ThicknessKey;
use crate::tuning::GeneratorTuning;
use crate::units::mm_to_in;

/// Highest program number the controllers accept
pub const MAX_PROGRAM_NUMBER: u32 = 99_999;

/// Spacer family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacerType {
    /// Plain spacer, no hub
    Standard,
    /// Raised hub ring turned in op2
    HubCentric,
    /// Hub-centric with a thin CB/OB wall
    ThinLip,
    /// Counterbored step on the op1 side
    Step,
    /// Pocketed for a press-fit steel ring
    SteelRing,
    /// Two-piece set, lug half (recess side)
    TwoPieceLug,
    /// Two-piece set, stud half (hub side)
    TwoPieceStud,
}

impl SpacerType {
    /// Get all spacer types
    pub fn all() -> &'static [SpacerType] {
        &[
            SpacerType::Standard,
            SpacerType::HubCentric,
            SpacerType::ThinLip,
            SpacerType::Step,
            SpacerType::SteelRing,
            SpacerType::TwoPieceLug,
            SpacerType::TwoPieceStud,
        ]
    }

    /// Whether op2 turns a hub
    pub fn has_hub(&self) -> bool {
        matches!(self, Self::HubCentric | Self::ThinLip | Self::TwoPieceStud)
    }
}

impl fmt::Display for SpacerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::HubCentric => write!(f, "hub_centric"),
            Self::ThinLip => write!(f, "thin_lip"),
            Self::Step => write!(f, "step"),
            Self::SteelRing => write!(f, "steel_ring"),
            Self::TwoPieceLug => write!(f, "2pc_lug"),
            Self::TwoPieceStud => write!(f, "2pc_stud"),
        }
    }
}

impl FromStr for SpacerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "standard" | "std" => Ok(Self::Standard),
            "hub_centric" | "hubcentric" | "hc" => Ok(Self::HubCentric),
            "thin_lip" | "thinlip" => Ok(Self::ThinLip),
            "step" | "stepped" => Ok(Self::Step),
            "steel_ring" | "steelring" => Ok(Self::SteelRing),
            "2pc_lug" | "two_piece_lug" | "lug" => Ok(Self::TwoPieceLug),
            "2pc_stud" | "two_piece_stud" | "stud" => Ok(Self::TwoPieceStud),
            _ => Err(format!("Unknown spacer type: {}", s)),
        }
    }
}

/// Feed/speed source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Curated values proven on the floor
    #[default]
    Proven,
    /// Surface-speed formula
    Calculated,
}

impl FromStr for FeedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proven" => Ok(Self::Proven),
            "calculated" | "calc" => Ok(Self::Calculated),
            _ => Err(format!("Unknown feed mode: {}", s)),
        }
    }
}

/// Hub dimensions shared by hub-centric, thin-lip and stud parts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HubSpec {
    /// Nominal hub (outer bore) diameter, mm
    pub outer_bore_mm: f64,
    /// Tolerance-adjusted hub diameter, mm
    pub outer_bore_adjusted_mm: f64,
    /// Tolerance-adjusted hub diameter, inches
    pub outer_bore_in: f64,
    /// Hub height above the body, inches
    pub hub_height: f64,
}

/// A counterbored zone on the op1 side (step shelf or lug recess)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterboreSpec {
    /// Counterbore diameter, mm
    pub diameter_mm: f64,
    /// Counterbore diameter, inches
    pub diameter_in: f64,
    /// Depth below the op1 face, inches
    pub depth: f64,
}

/// Variant-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpacerVariant {
    /// Plain spacer
    Standard,
    /// Hub-centric spacer
    HubCentric(HubSpec),
    /// Thin-lip hub-centric spacer
    ThinLip(HubSpec),
    /// Stepped spacer
    Step(CounterboreSpec),
    /// Steel-ring spacer
    SteelRing,
    /// Lug half of a two-piece set
    TwoPieceLug(CounterboreSpec),
    /// Stud half of a two-piece set
    TwoPieceStud(HubSpec),
}

impl SpacerVariant {
    /// The tag for this payload
    pub fn spacer_type(&self) -> SpacerType {
        match self {
            Self::Standard => SpacerType::Standard,
            Self::HubCentric(_) => SpacerType::HubCentric,
            Self::ThinLip(_) => SpacerType::ThinLip,
            Self::Step(_) => SpacerType::Step,
            Self::SteelRing => SpacerType::SteelRing,
            Self::TwoPieceLug(_) => SpacerType::TwoPieceLug,
            Self::TwoPieceStud(_) => SpacerType::TwoPieceStud,
        }
    }

    /// Hub payload, if the variant has one
    pub fn hub(&self) -> Option<&HubSpec> {
        match self {
            Self::HubCentric(hub) | Self::ThinLip(hub) | Self::TwoPieceStud(hub) => Some(hub),
            _ => None,
        }
    }

    /// Counterbore payload, if the variant has one
    pub fn counterbore(&self) -> Option<&CounterboreSpec> {
        match self {
            Self::Step(cb) | Self::TwoPieceLug(cb) => Some(cb),
            _ => None,
        }
    }
}

/// Validated input to program generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    /// O-number
    pub program_number: u32,
    /// Title written in the program header
    pub title: String,
    /// Stock OD, inches
    pub round_size: f64,
    /// Body thickness (excluding any hub)
    pub thickness: ThicknessKey,
    /// Nominal center bore, mm
    pub cb_mm: f64,
    /// Tolerance-adjusted center bore, mm
    pub cb_adjusted_mm: f64,
    /// Tolerance-adjusted center bore, inches
    pub cb_in: f64,
    /// Assigned lathe
    pub lathe: LatheId,
    /// Whether CB/OB tolerances were applied
    pub tolerancing: bool,
    /// Feed/speed source
    pub feed_mode: FeedMode,
    /// Variant payload
    pub variant: SpacerVariant,
}

impl PartSpec {
    /// Spacer-type tag
    pub fn spacer_type(&self) -> SpacerType {
        self.variant.spacer_type()
    }

    /// Hub height, zero for hubless parts
    pub fn hub_height(&self) -> f64 {
        self.variant.hub().map(|h| h.hub_height).unwrap_or(0.0)
    }

    /// Body thickness plus hub, inches
    pub fn total_height(&self) -> f64 {
        self.thickness.inches() + self.hub_height()
    }
}

/// Loose part fields as they arrive from an operator or the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartSpecBuilder {
    /// O-number
    pub program_number: Option<u32>,
    /// Optional header title
    pub title: Option<String>,
    /// Stock OD, inches
    pub round_size: Option<f64>,
    /// Thickness key text, e.g. `1.50` or `15MM`
    pub thickness: Option<String>,
    /// Center bore, mm
    pub cb_mm: Option<f64>,
    /// Lathe id text
    pub lathe: Option<String>,
    /// Apply CB/OB tolerances
    pub tolerancing: bool,
    /// Feed/speed source
    pub feed_mode: FeedMode,
    /// Spacer-type tag
    pub spacer_type: Option<SpacerType>,
    /// Hub or stud diameter, mm
    pub outer_bore_mm: Option<f64>,
    /// Hub or stud height, inches
    pub hub_height: Option<f64>,
    /// Step or lug-recess diameter, mm
    pub counterbore_mm: Option<f64>,
    /// Step or lug-recess depth, inches
    pub counterbore_depth: Option<f64>,
}

fn required(value: Option<f64>, field: &str) -> GenerationResult<f64> {
    let value = value.ok_or_else(|| GenerationError::invalid(field, "required"))?;
    positive(value, field)
}

fn positive(value: f64, field: &str) -> GenerationResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GenerationError::invalid(field, format!("must be > 0, got {}", value)));
    }
    Ok(value)
}

impl PartSpecBuilder {
    /// Start an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the O-number
    pub fn program_number(mut self, number: u32) -> Self {
        self.program_number = Some(number);
        self
    }

    /// Set the header title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the stock OD
    pub fn round_size(mut self, inches: f64) -> Self {
        self.round_size = Some(inches);
        self
    }

    /// Set the thickness key text
    pub fn thickness(mut self, key: impl Into<String>) -> Self {
        self.thickness = Some(key.into());
        self
    }

    /// Set the center bore in mm
    pub fn cb_mm(mut self, mm: f64) -> Self {
        self.cb_mm = Some(mm);
        self
    }

    /// Set the lathe
    pub fn lathe(mut self, lathe: impl Into<String>) -> Self {
        self.lathe = Some(lathe.into());
        self
    }

    /// Enable or disable tolerancing
    pub fn tolerancing(mut self, enabled: bool) -> Self {
        self.tolerancing = enabled;
        self
    }

    /// Set the feed mode
    pub fn feed_mode(mut self, mode: FeedMode) -> Self {
        self.feed_mode = mode;
        self
    }

    /// Set the spacer type
    pub fn spacer_type(mut self, spacer_type: SpacerType) -> Self {
        self.spacer_type = Some(spacer_type);
        self
    }

    /// Set the hub (outer bore) diameter and height
    pub fn hub(mut self, outer_bore_mm: f64, hub_height: f64) -> Self {
        self.outer_bore_mm = Some(outer_bore_mm);
        self.hub_height = Some(hub_height);
        self
    }

    /// Set the counterbore diameter and depth
    pub fn counterbore(mut self, diameter_mm: f64, depth: f64) -> Self {
        self.counterbore_mm = Some(diameter_mm);
        self.counterbore_depth = Some(depth);
        self
    }

    /// Validate and build the part.
    ///
    /// Hub-centric parts whose OB - CB is within the thin-lip threshold are
    /// built as thin-lip.
    pub fn build(&self, tuning: &GeneratorTuning) -> GenerationResult<PartSpec> {
        let program_number = self
            .program_number
            .ok_or_else(|| GenerationError::invalid("program_number", "required"))?;
        if program_number == 0 || program_number > MAX_PROGRAM_NUMBER {
            return Err(GenerationError::invalid(
                "program_number",
                format!("must be 1..={}, got {}", MAX_PROGRAM_NUMBER, program_number),
            ));
        }

        let round_size = required(self.round_size, "round_size")?;
        let thickness: ThicknessKey = self
            .thickness
            .as_deref()
            .ok_or_else(|| GenerationError::invalid("thickness", "required"))?
            .parse()
            .map_err(|e: String| GenerationError::invalid("thickness", e))?;
        let cb_mm = required(self.cb_mm, "cb_mm")?;

        let lathe: LatheId = self
            .lathe
            .as_deref()
            .ok_or_else(|| GenerationError::invalid("lathe", "required"))?
            .parse()
            .map_err(|e: String| GenerationError::invalid("lathe", e))?;

        let cb_adjusted_mm = if self.tolerancing {
            cb_mm + tuning.cb_tolerance_mm
        } else {
            cb_mm
        };
        let cb_in = mm_to_in(cb_adjusted_mm);
        if cb_in >= round_size {
            return Err(GenerationError::invalid(
                "cb_mm",
                format!("center bore {:.4}in must be smaller than round size {}in", cb_in, round_size),
            ));
        }

        let spacer_type = self
            .spacer_type
            .ok_or_else(|| GenerationError::invalid("spacer_type", "required"))?;
        let variant = self.build_variant(spacer_type, round_size, &thickness, cb_mm, tuning)?;

        let title = self.title.clone().unwrap_or_else(|| {
            format!(
                "{} {} {}MM {} {}",
                round_size,
                thickness,
                cb_mm,
                variant.spacer_type().to_string().to_uppercase(),
                lathe
            )
        });

        Ok(PartSpec {
            program_number,
            title,
            round_size,
            thickness,
            cb_mm,
            cb_adjusted_mm,
            cb_in,
            lathe,
            tolerancing: self.tolerancing,
            feed_mode: self.feed_mode,
            variant,
        })
    }

    fn build_hub(
        &self,
        round_size: f64,
        cb_mm: f64,
        default_height: Option<f64>,
        tuning: &GeneratorTuning,
    ) -> GenerationResult<HubSpec> {
        let outer_bore_mm = required(self.outer_bore_mm, "outer_bore_mm")?;
        let hub_height = match (self.hub_height, default_height) {
            (Some(h), _) => positive(h, "hub_height")?,
            (None, Some(default)) => default,
            (None, None) => return Err(GenerationError::invalid("hub_height", "required")),
        };
        if outer_bore_mm <= cb_mm {
            return Err(GenerationError::invalid(
                "outer_bore_mm",
                format!("must be larger than CB {}mm, got {}mm", cb_mm, outer_bore_mm),
            ));
        }
        let outer_bore_adjusted_mm = if self.tolerancing {
            outer_bore_mm - tuning.ob_tolerance_mm
        } else {
            outer_bore_mm
        };
        let outer_bore_in = mm_to_in(outer_bore_adjusted_mm);
        if outer_bore_in >= round_size {
            return Err(GenerationError::invalid(
                "outer_bore_mm",
                format!("{:.4}in must be smaller than round size {}in", outer_bore_in, round_size),
            ));
        }
        Ok(HubSpec {
            outer_bore_mm,
            outer_bore_adjusted_mm,
            outer_bore_in,
            hub_height,
        })
    }

    fn build_counterbore(
        &self,
        thickness: &ThicknessKey,
        cb_mm: f64,
        default_depth: Option<f64>,
    ) -> GenerationResult<CounterboreSpec> {
        let diameter_mm = required(self.counterbore_mm, "counterbore_mm")?;
        let depth = match (self.counterbore_depth, default_depth) {
            (Some(d), _) => positive(d, "counterbore_depth")?,
            (None, Some(default)) => default,
            (None, None) => return Err(GenerationError::invalid("counterbore_depth", "required")),
        };
        if diameter_mm <= cb_mm {
            return Err(GenerationError::invalid(
                "counterbore_mm",
                format!("must be larger than CB {}mm, got {}mm", cb_mm, diameter_mm),
            ));
        }
        if depth >= thickness.inches() {
            return Err(GenerationError::invalid(
                "counterbore_depth",
                format!("{}in must be less than thickness {}in", depth, thickness.inches()),
            ));
        }
        Ok(CounterboreSpec {
            diameter_mm,
            diameter_in: mm_to_in(diameter_mm),
            depth,
        })
    }

    fn build_variant(
        &self,
        spacer_type: SpacerType,
        round_size: f64,
        thickness: &ThicknessKey,
        cb_mm: f64,
        tuning: &GeneratorTuning,
    ) -> GenerationResult<SpacerVariant> {
        Ok(match spacer_type {
            SpacerType::Standard => SpacerVariant::Standard,
            SpacerType::SteelRing => SpacerVariant::SteelRing,
            // A hub-centric lip at or under the threshold is promoted; an
            // explicit thin-lip request is kept at any lip width.
            SpacerType::HubCentric => {
                let hub = self.build_hub(round_size, cb_mm, None, tuning)?;
                let lip_mm = hub.outer_bore_mm - cb_mm;
                if lip_mm <= tuning.thin_lip_threshold_mm {
                    debug!(lip_mm, "thin lip, promoting hub-centric to thin-lip");
                    SpacerVariant::ThinLip(hub)
                } else {
                    SpacerVariant::HubCentric(hub)
                }
            }
            SpacerType::ThinLip => {
                SpacerVariant::ThinLip(self.build_hub(round_size, cb_mm, None, tuning)?)
            }
            SpacerType::TwoPieceStud => SpacerVariant::TwoPieceStud(self.build_hub(
                round_size,
                cb_mm,
                Some(tuning.stud_hub_height),
                tuning,
            )?),
            SpacerType::Step => {
                SpacerVariant::Step(self.build_counterbore(thickness, cb_mm, None)?)
            }
            SpacerType::TwoPieceLug => SpacerVariant::TwoPieceLug(self.build_counterbore(
                thickness,
                cb_mm,
                Some(tuning.lug_recess_depth),
            )?),
        })
    }
}
