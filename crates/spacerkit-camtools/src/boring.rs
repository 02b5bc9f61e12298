//! Boring-pass planning
//!
//! Turns a target bore diameter into an ordered list of passes that never
//! open the bore by more than the allowed step, starting just above the
//! pilot drill.

use serde::{Deserialize, Serialize};
use spacerkit_core::{GenerationError, GenerationResult, GeneratorTuning};

const EPSILON: f64 = 1e-6;

/// Role of a boring pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    /// Roughing (including the pre-finish pass)
    Rough,
    /// Finishing pass at the target diameter
    Finish,
    /// 45° edge break at the bore mouth
    Chamfer,
}

/// One boring pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoringPass {
    /// Diameter reached by the pass, inches
    pub diameter: f64,
    /// Bottom Z of the pass (non-positive)
    pub z: f64,
    /// Pass role
    pub kind: PassKind,
}

impl BoringPass {
    fn new(diameter: f64, z: f64, kind: PassKind) -> Self {
        Self {
            diameter: round4(diameter),
            z: round4(z),
            kind,
        }
    }

    /// Whether this is a chamfer pass
    pub fn is_chamfer(&self) -> bool {
        self.kind == PassKind::Chamfer
    }
}

/// Passes for a counterbored bore: the inner holder at full depth, then the
/// shelf zone at the shallower step depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoZonePlan {
    /// Inner holder passes
    pub inner: Vec<BoringPass>,
    /// Outer shelf passes
    pub shelf: Vec<BoringPass>,
}

impl TwoZonePlan {
    /// Both zones in cutting order
    pub fn passes(&self) -> impl Iterator<Item = &BoringPass> {
        self.inner.iter().chain(self.shelf.iter())
    }
}

/// Boring-pass calculator
#[derive(Debug, Clone)]
pub struct BoringPassCalculator {
    safe_entry: f64,
    max_step: f64,
    pre_finish_offset: f64,
    chamfer_depth: f64,
    max_diameter: f64,
}

impl Default for BoringPassCalculator {
    fn default() -> Self {
        Self::new(&GeneratorTuning::default())
    }
}

impl BoringPassCalculator {
    /// Create a calculator from the shop constants
    pub fn new(tuning: &GeneratorTuning) -> Self {
        Self {
            safe_entry: tuning.safe_entry_diameter,
            max_step: tuning.max_bore_step,
            pre_finish_offset: tuning.pre_finish_offset,
            chamfer_depth: tuning.chamfer_depth,
            max_diameter: tuning.max_bore_diameter,
        }
    }

    /// Chamfer depth used for chamfer passes
    pub fn chamfer_depth(&self) -> f64 {
        self.chamfer_depth
    }

    /// Plan the passes for a single-zone bore.
    ///
    /// Passes start at the safe entry diameter and open by at most the max
    /// step until the next step would reach the target. A pre-finish pass
    /// just under the target follows when it is still ahead of the last
    /// roughing pass, then the optional chamfer and the finishing pass.
    pub fn calculate_passes(
        &self,
        target_diameter: f64,
        drill_depth: f64,
        include_chamfer: bool,
    ) -> GenerationResult<Vec<BoringPass>> {
        self.validate_target("target_diameter", target_diameter)?;
        validate_depth("drill_depth", drill_depth)?;

        let mut passes = vec![BoringPass::new(self.safe_entry, drill_depth, PassKind::Rough)];
        self.open_to(&mut passes, self.safe_entry, target_diameter, drill_depth, include_chamfer);
        Ok(passes)
    }

    /// Plan a counterbored bore.
    ///
    /// The inner zone is bored to `holder_diameter` at `drill_depth`; the shelf
    /// zone continues from the holder to `counterbore_diameter` at
    /// `-step_depth`. The chamfer, if any, goes on the counterbore.
    pub fn calculate_two_zone(
        &self,
        holder_diameter: f64,
        counterbore_diameter: f64,
        drill_depth: f64,
        step_depth: f64,
        include_chamfer: bool,
    ) -> GenerationResult<TwoZonePlan> {
        self.validate_target("holder_diameter", holder_diameter)?;
        self.validate_target("counterbore_diameter", counterbore_diameter)?;
        validate_depth("drill_depth", drill_depth)?;
        if counterbore_diameter <= holder_diameter + EPSILON {
            return Err(GenerationError::invalid(
                "counterbore_diameter",
                format!(
                    "{} must be larger than holder diameter {}",
                    counterbore_diameter, holder_diameter
                ),
            ));
        }
        let shelf_z = -step_depth;
        if step_depth <= 0.0 || shelf_z <= drill_depth {
            return Err(GenerationError::invalid(
                "step_depth",
                format!("{} must be > 0 and shallower than drill depth {}", step_depth, drill_depth),
            ));
        }

        let inner = self.calculate_passes(holder_diameter, drill_depth, false)?;
        let mut shelf = Vec::new();
        self.open_to(&mut shelf, holder_diameter, counterbore_diameter, shelf_z, include_chamfer);
        Ok(TwoZonePlan { inner, shelf })
    }

    /// Continue opening a bore that already reaches `from`, ending at
    /// `target`. The returned passes exclude `from` itself.
    pub fn calculate_continuation(
        &self,
        from: f64,
        target: f64,
        z: f64,
        include_chamfer: bool,
    ) -> GenerationResult<Vec<BoringPass>> {
        validate_depth("z", z)?;
        if !from.is_finite() || target <= from + EPSILON || target > self.max_diameter {
            return Err(GenerationError::invalid(
                "target_diameter",
                format!("{} must be above {} and within {}", target, from, self.max_diameter),
            ));
        }
        let mut passes = Vec::new();
        self.open_to(&mut passes, from, target, z, include_chamfer);
        Ok(passes)
    }

    fn open_to(
        &self,
        passes: &mut Vec<BoringPass>,
        from: f64,
        target: f64,
        z: f64,
        include_chamfer: bool,
    ) {
        let target = round4(target);
        let mut current = round4(from);
        loop {
            let next = round4(current + self.max_step);
            if next >= target - EPSILON {
                break;
            }
            passes.push(BoringPass::new(next, z, PassKind::Rough));
            current = next;
        }

        let pre_finish = round4(target - self.pre_finish_offset);
        if pre_finish > current + EPSILON {
            passes.push(BoringPass::new(pre_finish, z, PassKind::Rough));
        }
        if include_chamfer {
            passes.push(BoringPass::new(
                target + 2.0 * self.chamfer_depth,
                -self.chamfer_depth,
                PassKind::Chamfer,
            ));
        }
        passes.push(BoringPass::new(target, z, PassKind::Finish));
    }

    fn validate_target(&self, field: &str, diameter: f64) -> GenerationResult<()> {
        if !diameter.is_finite() || diameter <= self.safe_entry {
            return Err(GenerationError::invalid(
                field,
                format!("{} must be larger than safe entry {}", diameter, self.safe_entry),
            ));
        }
        if diameter > self.max_diameter {
            return Err(GenerationError::invalid(
                field,
                format!("{} exceeds boring range {}", diameter, self.max_diameter),
            ));
        }
        Ok(())
    }
}

fn validate_depth(field: &str, depth: f64) -> GenerationResult<()> {
    if !depth.is_finite() || depth >= 0.0 {
        return Err(GenerationError::invalid(field, format!("must be < 0, got {}", depth)));
    }
    Ok(())
}

/// Diameters of the non-chamfer passes, in cutting order
pub fn bore_diameters(passes: &[BoringPass]) -> Vec<f64> {
    passes
        .iter()
        .filter(|p| !p.is_chamfer())
        .map(|p| p.diameter)
        .collect()
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sequence() {
        let calc = BoringPassCalculator::default();
        let passes = calc.calculate_passes(3.5, -1.65, false).unwrap();
        assert_eq!(bore_diameters(&passes), vec![2.3, 2.6, 2.9, 3.2, 3.4, 3.5]);
        assert_eq!(passes.last().unwrap().kind, PassKind::Finish);
        assert!(passes.iter().all(|p| p.z == -1.65));
    }

    #[test]
    fn test_pre_finish_skipped_when_behind() {
        let calc = BoringPassCalculator::default();
        let passes = calc.calculate_passes(2.35, -1.0, false).unwrap();
        assert_eq!(bore_diameters(&passes), vec![2.3, 2.35]);
    }

    #[test]
    fn test_chamfer_pass() {
        let calc = BoringPassCalculator::default();
        let passes = calc.calculate_passes(3.0, -1.0, true).unwrap();
        let chamfer = passes.iter().find(|p| p.is_chamfer()).unwrap();
        assert_eq!(chamfer.diameter, 3.3);
        assert_eq!(chamfer.z, -0.15);
        assert_eq!(passes.last().unwrap().diameter, 3.0);
    }

    #[test]
    fn test_validation() {
        let calc = BoringPassCalculator::default();
        assert!(calc.calculate_passes(2.3, -1.0, false).is_err());
        assert!(calc.calculate_passes(6.01, -1.0, false).is_err());
        assert!(calc.calculate_passes(3.0, 0.0, false).is_err());
        assert!(calc.calculate_passes(6.0, -1.0, false).is_ok());
    }

    #[test]
    fn test_two_zone() {
        let calc = BoringPassCalculator::default();
        let plan = calc.calculate_two_zone(3.0, 4.0, -1.4, 0.31, false).unwrap();
        assert_eq!(plan.inner.last().unwrap().diameter, 3.0);
        assert_eq!(plan.inner.last().unwrap().z, -1.4);
        assert_eq!(plan.shelf.first().unwrap().diameter, 3.3);
        assert!(plan.shelf.iter().all(|p| p.z == -0.31));
        assert_eq!(plan.shelf.last().unwrap().diameter, 4.0);

        assert!(calc.calculate_two_zone(3.0, 2.9, -1.4, 0.31, false).is_err());
        assert!(calc.calculate_two_zone(3.0, 4.0, -1.4, 1.5, false).is_err());
    }

    #[test]
    fn test_continuation() {
        let calc = BoringPassCalculator::default();
        let passes = calc.calculate_continuation(3.4, 3.575, -0.55, false).unwrap();
        assert_eq!(bore_diameters(&passes), vec![3.475, 3.575]);
        assert!(calc.calculate_continuation(3.4, 3.4, -0.55, false).is_err());
    }
}
