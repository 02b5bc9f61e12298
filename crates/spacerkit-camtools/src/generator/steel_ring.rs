//! Steel-ring spacer
//!
//! Op1 turns first, then drills and bores a seat for a press-fit ring: the
//! holder at `CB - inset` goes full depth and CB stops just above the drill
//! depth. Op2 cuts the ring pocket instead of a chamfer.

use spacerkit_core::{GenerationError, GenerationResult, OpSide, SpacerType};

use super::common::{self, GenerationContext};
use super::SpacerProgramGenerator;
use crate::boring::round4;
use crate::program::{Section, SectionKind};
use crate::speeds_feeds::Operation;

const STEEL_RING_ORDER: &[SectionKind] = &[
    SectionKind::Header,
    SectionKind::Op1Turn,
    SectionKind::Op1Drill,
    SectionKind::Op1Bore,
    SectionKind::Flip,
    SectionKind::Op2Turn,
    SectionKind::Op2Chamfer,
    SectionKind::Footer,
];

/// Generator for steel-ring spacers
#[derive(Debug, Clone, Copy, Default)]
pub struct SteelRingGenerator;

impl SteelRingGenerator {
    /// Holder diameter and shelf Z of the ring seat
    pub fn seat(&self, ctx: &GenerationContext<'_>) -> (f64, f64) {
        (
            round4(ctx.spec.cb_in - ctx.tuning.steel_ring_step_inset),
            round4(ctx.depths.drill + ctx.tuning.steel_ring_step_offset),
        )
    }
}

impl SpacerProgramGenerator for SteelRingGenerator {
    fn spacer_type(&self) -> SpacerType {
        SpacerType::SteelRing
    }

    fn section_order(&self) -> &'static [SectionKind] {
        STEEL_RING_ORDER
    }

    fn op1_turn(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        // nothing is drilled yet, so face to center
        common::op1_turn(ctx, 0.0)
    }

    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let (holder, step_z) = self.seat(ctx);
        let plan = ctx.boring.calculate_two_zone(
            holder,
            ctx.spec.cb_in,
            ctx.depths.drill,
            -step_z,
            true,
        )?;
        let passes: Vec<_> = plan.passes().copied().collect();
        common::bore_section(ctx, &passes, ctx.spec.cb_in)
    }

    fn op2_chamfer(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let depth = ctx.tuning.ring_pocket_depth;
        if depth >= ctx.spec.total_height() {
            return Err(GenerationError::invalid(
                "ring_pocket_depth",
                format!(
                    "{} must be less than part height {}",
                    depth,
                    ctx.spec.total_height()
                ),
            ));
        }
        let pocket = round4(ctx.spec.cb_in + ctx.tuning.steel_ring_step_inset);
        let passes = ctx
            .boring
            .calculate_continuation(ctx.spec.cb_in, pocket, -depth, false)?;

        let params = ctx.cutting(Operation::Bore, pocket, depth);
        let mut section = Section::new(SectionKind::Op2Chamfer);
        common::start_tool(
            &mut section,
            ctx,
            ctx.lathe.tools.bore,
            "RING POCKET",
            &params,
            OpSide::Op2,
        );
        common::write_passes(&mut section, ctx, &passes, &params, None, true);
        common::end_tool(&mut section, ctx);
        Ok(section)
    }
}
