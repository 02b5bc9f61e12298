//! Standard spacer: no hub, op2 faces to a chamfer at CB

use spacerkit_core::{GenerationResult, SpacerType};

use super::common::{self, GenerationContext};
use super::SpacerProgramGenerator;
use crate::program::Section;

/// Generator for plain spacers
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardGenerator;

impl SpacerProgramGenerator for StandardGenerator {
    fn spacer_type(&self) -> SpacerType {
        SpacerType::Standard
    }

    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let passes = ctx
            .boring
            .calculate_passes(ctx.spec.cb_in, ctx.depths.drill, true)?;
        common::bore_section(ctx, &passes, ctx.spec.cb_in)
    }
}
