//! Two-piece spacer halves
//!
//! The lug half carries a counterbored recess on the op1 side that receives
//! the stud half's hub. Pairing a lug with its stud is a catalog concern.

use spacerkit_core::{CounterboreSpec, GenerationResult, HubSpec, SpacerType};

use super::common::{self, GenerationContext};
use super::hub_centric::hub_turn;
use super::step::counterbore_passes;
use super::SpacerProgramGenerator;
use crate::program::Section;

/// Generator for the lug half
#[derive(Debug, Clone, Copy)]
pub struct TwoPieceLugGenerator {
    recess: CounterboreSpec,
}

impl TwoPieceLugGenerator {
    /// Generator for a recess
    pub fn new(recess: CounterboreSpec) -> Self {
        Self { recess }
    }
}

impl SpacerProgramGenerator for TwoPieceLugGenerator {
    fn spacer_type(&self) -> SpacerType {
        SpacerType::TwoPieceLug
    }

    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let passes = counterbore_passes(ctx, &self.recess)?;
        common::bore_section(ctx, &passes, ctx.spec.cb_in)
    }
}

/// Generator for the stud half
#[derive(Debug, Clone, Copy)]
pub struct TwoPieceStudGenerator {
    hub: HubSpec,
}

impl TwoPieceStudGenerator {
    /// Generator for a stud hub
    pub fn new(hub: HubSpec) -> Self {
        Self { hub }
    }
}

impl SpacerProgramGenerator for TwoPieceStudGenerator {
    fn spacer_type(&self) -> SpacerType {
        SpacerType::TwoPieceStud
    }

    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let passes = ctx
            .boring
            .calculate_passes(ctx.spec.cb_in, ctx.depths.drill, true)?;
        common::bore_section(ctx, &passes, ctx.spec.cb_in)
    }

    fn op2_turn(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        hub_turn(ctx, &self.hub, ctx.tuning.hub_z_increment, "TURN STUD")
    }
}
