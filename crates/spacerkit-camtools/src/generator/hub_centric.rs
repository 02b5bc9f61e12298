//! Hub-centric spacer
//!
//! Op1 bores straight to CB. Op2 turns the hub down to OB in fixed Z steps,
//! then breaks the hub corner and finishes the hub wall.

use spacerkit_core::{GenerationError, GenerationResult, HubSpec, OpSide, SpacerType};

use super::common::{self, GenerationContext, EDGE_BREAK};
use super::SpacerProgramGenerator;
use crate::boring::round4;
use crate::program::{DiameterMarker, Motion, Section, SectionKind};
use crate::speeds_feeds::Operation;

/// Radial stock left on the hub wall for the finishing pass
const HUB_FINISH_ALLOWANCE: f64 = 0.02;

/// Generator for hub-centric spacers
#[derive(Debug, Clone, Copy)]
pub struct HubCentricGenerator {
    hub: HubSpec,
}

impl HubCentricGenerator {
    /// Generator for a hub
    pub fn new(hub: HubSpec) -> Self {
        Self { hub }
    }
}

impl SpacerProgramGenerator for HubCentricGenerator {
    fn spacer_type(&self) -> SpacerType {
        SpacerType::HubCentric
    }

    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let passes = ctx
            .boring
            .calculate_passes(ctx.spec.cb_in, ctx.depths.drill, true)?;
        common::bore_section(ctx, &passes, ctx.spec.cb_in)
    }

    fn op2_turn(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        hub_turn(ctx, &self.hub, ctx.tuning.hub_z_increment, "TURN HUB")
    }
}

/// Z levels from the first increment down to exactly `-height`
pub fn hub_levels(height: f64, increment: f64) -> Vec<f64> {
    if height <= 0.0 || increment <= 0.0 {
        return Vec::new();
    }
    let count = ((height / increment) - 1e-9).ceil().max(1.0) as usize;
    (1..=count)
        .map(|i| -round4((i as f64 * increment).min(height)))
        .collect()
}

/// Op2 hub turning shared by hub-centric, thin-lip and stud parts.
///
/// Faces the hub top, roughs the shoulder level by level from outside the
/// stock in to OB plus the finish allowance, then finishes with a 45° break
/// at the hub corner and a straight pass down the hub wall.
pub fn hub_turn(
    ctx: &GenerationContext<'_>,
    hub: &HubSpec,
    increment: f64,
    comment: &str,
) -> GenerationResult<Section> {
    if increment <= 0.0 {
        return Err(GenerationError::invalid(
            "hub_z_increment",
            format!("must be > 0, got {}", increment),
        ));
    }
    let ob = hub.outer_bore_in;
    let clearance = ctx.clearance();
    let outside = ctx.outside_stock();
    let params = ctx.cutting(Operation::TurnOp2, ob, hub.hub_height);

    let mut section = Section::new(SectionKind::Op2Turn);
    common::start_tool(&mut section, ctx, ctx.lathe.tools.turn, comment, &params, OpSide::Op2);

    section
        .motion(Motion::rapid().x(outside).z(clearance))
        .motion(Motion::linear(params.feeds.finish).z(0.0))
        .motion(
            Motion::linear(params.feeds.rough)
                .x(round4(ctx.spec.cb_in - ctx.tuning.pre_finish_offset)),
        )
        .motion(Motion::rapid().z(clearance));

    let rough_x = round4(ob + HUB_FINISH_ALLOWANCE);
    for z in hub_levels(hub.hub_height, increment) {
        section
            .motion(Motion::rapid().x(outside))
            .motion(Motion::linear(params.feeds.rough).z(z))
            .motion(Motion::linear(params.feeds.rough).x(rough_x))
            .motion(Motion::rapid().z(clearance));
    }

    section
        .motion(Motion::rapid().x(round4(ob - 2.0 * EDGE_BREAK)))
        .motion(Motion::linear(params.feeds.chamfer).z(0.0))
        .motion(
            Motion::linear(params.feeds.chamfer)
                .x(ob)
                .z(-EDGE_BREAK)
                .marked(DiameterMarker::OuterBore),
        )
        .motion(Motion::linear(params.feeds.finish).z(-round4(hub.hub_height)))
        .motion(Motion::linear(params.feeds.finish).x(outside))
        .motion(Motion::rapid().z(clearance));

    common::end_tool(&mut section, ctx);
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_levels() {
        assert_eq!(hub_levels(0.5, 0.2), vec![-0.2, -0.4, -0.5]);
        assert_eq!(hub_levels(0.4, 0.2), vec![-0.2, -0.4]);
        assert_eq!(hub_levels(0.25, 0.1), vec![-0.1, -0.2, -0.25]);
        assert!(hub_levels(0.0, 0.2).is_empty());
    }
}
