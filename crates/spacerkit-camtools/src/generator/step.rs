//! Step spacer: CB through, counterbore shelf on the op1 side

use spacerkit_core::{CounterboreSpec, GenerationResult, SpacerType};

use super::common::{self, GenerationContext};
use super::SpacerProgramGenerator;
use crate::boring::BoringPass;
use crate::program::Section;

/// Generator for stepped spacers
#[derive(Debug, Clone, Copy)]
pub struct StepGenerator {
    counterbore: CounterboreSpec,
}

impl StepGenerator {
    /// Generator for a counterbore
    pub fn new(counterbore: CounterboreSpec) -> Self {
        Self { counterbore }
    }
}

/// Inner holder at CB full depth, then the counterbore shelf. The chamfer
/// goes on the counterbore when the shelf is deeper than the chamfer.
pub fn counterbore_passes(
    ctx: &GenerationContext<'_>,
    counterbore: &CounterboreSpec,
) -> GenerationResult<Vec<BoringPass>> {
    let include_chamfer = counterbore.depth > ctx.boring.chamfer_depth();
    let plan = ctx.boring.calculate_two_zone(
        ctx.spec.cb_in,
        counterbore.diameter_in,
        ctx.depths.drill,
        counterbore.depth,
        include_chamfer,
    )?;
    Ok(plan.passes().copied().collect())
}

impl SpacerProgramGenerator for StepGenerator {
    fn spacer_type(&self) -> SpacerType {
        SpacerType::Step
    }

    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let passes = counterbore_passes(ctx, &self.counterbore)?;
        common::bore_section(ctx, &passes, ctx.spec.cb_in)
    }
}
