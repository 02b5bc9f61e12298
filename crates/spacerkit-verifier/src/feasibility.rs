//! Machine feasibility
//!
//! Checks part dimensions against the assigned lathe's standards record.
//! Every field is optional; missing data turns a check into a
//! "cannot verify" recommendation instead of a failure.

use serde::{Deserialize, Serialize};
use spacerkit_core::{
    format_number, mm_to_in, Diagnostic, LatheId, LatheMatch, LatheStandard, PartSpec,
    SpacerType, StandardsMatrix,
};
use tracing::debug;

/// Fraction of the safe drill depth at which a height warning is raised
const DRILL_DEPTH_WARNING_RATIO: f64 = 0.9;
/// Thickness / OD below which a part risks warping
const MIN_ASPECT_RATIO: f64 = 0.08;
const EPSILON: f64 = 1e-9;

/// Part dimensions as known to the verifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartMetadata {
    /// Stock OD, inches
    pub round_size: Option<f64>,
    /// Body thickness without hub, inches
    pub thickness: Option<f64>,
    /// Center bore, mm
    pub cb_mm: Option<f64>,
    /// Outer bore (hub OD), mm
    pub ob_mm: Option<f64>,
    /// Hub height, inches
    pub hub_height: Option<f64>,
    /// Counterbore diameter, mm
    pub counterbore_mm: Option<f64>,
    /// Assigned lathe
    pub lathe: Option<LatheId>,
    /// Spacer type
    pub spacer_type: Option<SpacerType>,
}

impl PartMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the round size
    pub fn round_size(mut self, inches: f64) -> Self {
        self.round_size = Some(inches);
        self
    }

    /// Set the body thickness
    pub fn thickness(mut self, inches: f64) -> Self {
        self.thickness = Some(inches);
        self
    }

    /// Set the center bore
    pub fn cb_mm(mut self, mm: f64) -> Self {
        self.cb_mm = Some(mm);
        self
    }

    /// Set the hub
    pub fn hub(mut self, ob_mm: f64, height: f64) -> Self {
        self.ob_mm = Some(ob_mm);
        self.hub_height = Some(height);
        self
    }

    /// Set the lathe
    pub fn lathe(mut self, lathe: LatheId) -> Self {
        self.lathe = Some(lathe);
        self
    }

    /// Set the spacer type
    pub fn spacer_type(mut self, spacer_type: SpacerType) -> Self {
        self.spacer_type = Some(spacer_type);
        self
    }

    /// Body plus hub, if the thickness is known
    pub fn total_height(&self) -> Option<f64> {
        self.thickness.map(|t| t + self.hub_height.unwrap_or(0.0))
    }
}

impl From<&PartSpec> for PartMetadata {
    fn from(spec: &PartSpec) -> Self {
        let hub = spec.variant.hub();
        Self {
            round_size: Some(spec.round_size),
            thickness: Some(spec.thickness.inches()),
            cb_mm: Some(spec.cb_adjusted_mm),
            ob_mm: hub.map(|h| h.outer_bore_adjusted_mm),
            hub_height: hub.map(|h| h.hub_height),
            counterbore_mm: spec.variant.counterbore().map(|c| c.diameter_mm),
            lathe: Some(spec.lathe),
            spacer_type: Some(spec.spacer_type()),
        }
    }
}

/// Outcome of a feasibility check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    /// True when nothing critical was found
    pub feasible: bool,
    /// Blocking problems
    pub critical: Vec<Diagnostic>,
    /// Things to review
    pub warnings: Vec<Diagnostic>,
    /// Notes and unverifiable checks
    pub recommendations: Vec<Diagnostic>,
}

impl FeasibilityReport {
    fn push(&mut self, diagnostic: Diagnostic) {
        use spacerkit_core::Severity;
        match diagnostic.severity {
            Severity::Critical => self.critical.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
            Severity::Recommendation => self.recommendations.push(diagnostic),
        }
    }

    /// All findings, critical first
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.critical
            .iter()
            .chain(&self.warnings)
            .chain(&self.recommendations)
            .cloned()
            .collect()
    }
}

/// Feasibility checks against a standards matrix
#[derive(Debug, Clone)]
pub struct FeasibilityValidator<'a> {
    standards: &'a StandardsMatrix,
}

impl Default for FeasibilityValidator<'static> {
    fn default() -> Self {
        Self::new(StandardsMatrix::standard())
    }
}

fn cannot_verify(what: &str, missing: &str) -> Diagnostic {
    Diagnostic::recommendation(format!("cannot verify {}: {} not provided", what, missing))
}

fn list_sizes(sizes: &[f64]) -> String {
    sizes
        .iter()
        .map(|s| format_number(*s))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> FeasibilityValidator<'a> {
    /// Create a validator over a standards matrix
    pub fn new(standards: &'a StandardsMatrix) -> Self {
        Self { standards }
    }

    /// Run every check
    pub fn validate(&self, part: &PartMetadata) -> FeasibilityReport {
        let mut report = FeasibilityReport::default();

        match part.lathe {
            None => {
                report.push(cannot_verify("lathe limits", "lathe"));
                if let Some(round) = part.round_size {
                    report.push(self.candidate_lathes(round));
                }
            }
            Some(lathe) => match self.standards.get(lathe) {
                None => report.push(Diagnostic::recommendation(format!(
                    "cannot verify lathe limits: no standards record for {}",
                    lathe
                ))),
                Some(standard) => self.check_lathe(standard, part, &mut report),
            },
        }

        self.check_bores(part, &mut report);
        self.check_warnings(part, &mut report);

        report.feasible = report.critical.is_empty();
        debug!(
            feasible = report.feasible,
            critical = report.critical.len(),
            warnings = report.warnings.len(),
            "feasibility checked"
        );
        report
    }

    fn candidate_lathes(&self, round: f64) -> Diagnostic {
        match self.standards.lathes_for_round(round) {
            LatheMatch::Unique(id) => Diagnostic::recommendation(format!(
                "round size {} runs on {}",
                format_number(round),
                id
            )),
            LatheMatch::Ambiguous(ids) => Diagnostic::recommendation(format!(
                "round size {} runs on {}",
                format_number(round),
                ids.iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(" or ")
            )),
            LatheMatch::Unsupported => Diagnostic::critical(format!(
                "round size {} is not supported on any lathe",
                format_number(round)
            )),
        }
    }

    fn check_lathe(
        &self,
        standard: &LatheStandard,
        part: &PartMetadata,
        report: &mut FeasibilityReport,
    ) {
        let lathe = standard.lathe;

        match part.round_size {
            Some(round) => {
                if !standard.supports_round(round) {
                    report.push(Diagnostic::critical(format!(
                        "round size {} is not supported on {} (supported: {})",
                        format_number(round),
                        lathe,
                        list_sizes(&standard.round_sizes)
                    )));
                }
                if round > standard.chuck_capacity + EPSILON {
                    report.push(Diagnostic::critical(format!(
                        "stock OD {} exceeds the {} chuck capacity of {}",
                        format_number(round),
                        lathe,
                        format_number(standard.chuck_capacity)
                    )));
                }
            }
            None => report.push(cannot_verify("round size and chuck capacity", "round size")),
        }

        match part.thickness {
            Some(t) => {
                if t < standard.min_thickness - EPSILON || t > standard.max_thickness + EPSILON {
                    report.push(Diagnostic::critical(format!(
                        "thickness {} is outside the {} range {}-{}",
                        format_number(t),
                        lathe,
                        format_number(standard.min_thickness),
                        format_number(standard.max_thickness)
                    )));
                }
            }
            None => report.push(cannot_verify("thickness range", "thickness")),
        }

        let Some(spacer_type) = part.spacer_type else {
            report.push(cannot_verify("piece-type rules", "spacer type"));
            return;
        };
        let Some(rule) = standard.rule_for(spacer_type) else {
            report.push(Diagnostic::critical(format!(
                "{} spacers are not made on {}",
                spacer_type, lathe
            )));
            return;
        };
        if let Some(t) = part.thickness {
            if let Some(min) = rule.min_thickness {
                if t < min - EPSILON {
                    report.push(Diagnostic::critical(format!(
                        "{} on {} needs at least {} thickness, got {}",
                        spacer_type,
                        lathe,
                        format_number(min),
                        format_number(t)
                    )));
                }
            }
            if let Some(max) = rule.max_thickness {
                if t > max + EPSILON {
                    report.push(Diagnostic::critical(format!(
                        "{} on {} allows at most {} thickness, got {}",
                        spacer_type,
                        lathe,
                        format_number(max),
                        format_number(t)
                    )));
                }
            }
        }
        if let Some(max_hub) = rule.max_hub_height {
            match part.hub_height {
                Some(h) if h > max_hub + EPSILON => {
                    report.push(Diagnostic::critical(format!(
                        "{} hub height {} exceeds the {} limit of {}",
                        spacer_type,
                        format_number(h),
                        lathe,
                        format_number(max_hub)
                    )));
                }
                Some(_) => {}
                None => report.push(cannot_verify("hub height limit", "hub height")),
            }
        }
    }

    fn check_bores(&self, part: &PartMetadata, report: &mut FeasibilityReport) {
        let Some(round) = part.round_size else {
            return;
        };
        let bores = [
            ("CB", part.cb_mm),
            ("OB", part.ob_mm),
            ("counterbore", part.counterbore_mm),
        ];
        for (name, mm) in bores {
            if let Some(mm) = mm {
                if mm_to_in(mm) >= round {
                    report.push(Diagnostic::critical(format!(
                        "{} {}mm does not fit inside the {} round",
                        name,
                        format_number(mm),
                        format_number(round)
                    )));
                }
            }
        }
        if part.cb_mm.is_none() {
            report.push(cannot_verify("bore fit", "CB"));
        }
    }

    fn check_warnings(&self, part: &PartMetadata, report: &mut FeasibilityReport) {
        let standard = part.lathe.and_then(|l| self.standards.get(l));

        if let (Some(height), Some(standard)) = (part.total_height(), standard) {
            let limit = standard.max_drill_depth;
            if height > limit + EPSILON {
                report.push(Diagnostic::warning(format!(
                    "total height {} is past the {} safe drill depth of {}; drill from both sides",
                    format_number(height),
                    standard.lathe,
                    format_number(limit)
                )));
            } else if height >= limit * DRILL_DEPTH_WARNING_RATIO {
                report.push(Diagnostic::warning(format!(
                    "total height {} is near the {} safe drill depth of {}; consider two-operation drilling",
                    format_number(height),
                    standard.lathe,
                    format_number(limit)
                )));
            }
        }

        if let (Some(t), Some(round)) = (part.thickness, part.round_size) {
            if round > 0.0 && t / round < MIN_ASPECT_RATIO {
                report.push(Diagnostic::warning(format!(
                    "thickness {} is very thin for a {} round; risk of warping",
                    format_number(t),
                    format_number(round)
                )));
            }
        }

        match part.spacer_type {
            Some(SpacerType::ThinLip) => report.push(Diagnostic::warning(
                "thin-lip part: verify the safety shelf clears the hub wall",
            )),
            Some(SpacerType::HubCentric | SpacerType::TwoPieceStud) => {
                report.push(Diagnostic::recommendation(
                    "verify hub clearance against the turning tool before op2",
                ))
            }
            Some(SpacerType::SteelRing) => report.push(Diagnostic::warning(
                "steel ring part: confirm feeds and speeds for steel before running",
            )),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range_l2() -> PartMetadata {
        PartMetadata::new()
            .round_size(8.0)
            .thickness(1.5)
            .cb_mm(87.1)
            .lathe(LatheId::L2)
            .spacer_type(SpacerType::Standard)
    }

    #[test]
    fn test_unsupported_round() {
        let part = PartMetadata::new()
            .round_size(7.0)
            .thickness(1.0)
            .cb_mm(66.1)
            .lathe(LatheId::L1)
            .spacer_type(SpacerType::Standard);
        let report = FeasibilityValidator::default().validate(&part);
        assert!(!report.feasible);
        assert_eq!(report.critical.len(), 1);
        assert!(report.critical[0].message.contains("round size 7."));
    }

    #[test]
    fn test_thickness_just_over_max() {
        let part = in_range_l2().thickness(4.01);
        let report = FeasibilityValidator::default().validate(&part);
        assert!(!report.feasible);
        assert!(report.critical.iter().any(|d| d.message.contains("thickness 4.01")));
    }

    #[test]
    fn test_in_range() {
        let report = FeasibilityValidator::default().validate(&in_range_l2());
        assert!(report.feasible);
        assert!(report.critical.is_empty());
    }

    #[test]
    fn test_piece_type_rules() {
        let validator = FeasibilityValidator::default();

        let steel_on_l1 = PartMetadata::new()
            .round_size(6.0)
            .thickness(1.0)
            .lathe(LatheId::L1)
            .spacer_type(SpacerType::SteelRing);
        assert!(!validator.validate(&steel_on_l1).feasible);

        let tall_hub = in_range_l2()
            .spacer_type(SpacerType::HubCentric)
            .hub(93.1, 1.75);
        let report = validator.validate(&tall_hub);
        assert_eq!(report.critical.len(), 1);
        assert!(report.critical[0].message.contains("hub height 1.75"));
    }

    #[test]
    fn test_missing_data_downgrades() {
        let report = FeasibilityValidator::default().validate(&PartMetadata::new().round_size(8.0));
        assert!(report.feasible);
        assert!(report.critical.is_empty());
        assert!(report
            .recommendations
            .iter()
            .any(|d| d.message.contains("runs on L2 or L3")));
        assert!(report
            .recommendations
            .iter()
            .any(|d| d.message.starts_with("cannot verify lathe limits")));
    }

    #[test]
    fn test_secondary_warnings() {
        let validator = FeasibilityValidator::default();

        let deep = in_range_l2().thickness(3.5).hub(95.0, 0.75).spacer_type(SpacerType::HubCentric);
        let report = validator.validate(&deep);
        assert!(report.feasible);
        assert!(report.warnings.iter().any(|d| d.message.contains("drill")));

        let thin = PartMetadata::new()
            .round_size(8.0)
            .thickness(0.5)
            .lathe(LatheId::L2)
            .spacer_type(SpacerType::Standard);
        let report = validator.validate(&thin);
        assert!(report.warnings.iter().any(|d| d.message.contains("warping")));
    }
}
