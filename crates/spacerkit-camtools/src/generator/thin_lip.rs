//! Thin-lip spacer
//!
//! Same hub shape as hub-centric, but the CB/OB wall is thin enough that the
//! op2 hub pocket could break through. Op1 leaves a safety shelf: passes
//! wider than `CB - shelf inset` stop at a shallower Z. Op2 turns the hub in
//! finer Z steps, then clears the shelf from the op2 side and chamfers CB.

use spacerkit_core::{GenerationError, GenerationResult, HubSpec, OpSide, SpacerType};
use tracing::debug;

use super::common::{self, GenerationContext, EDGE_BREAK};
use super::hub_centric::hub_turn;
use super::SpacerProgramGenerator;
use crate::boring::{round4, BoringPass};
use crate::program::{Section, SectionKind};
use crate::speeds_feeds::Operation;

/// Generator for thin-lip spacers
#[derive(Debug, Clone, Copy)]
pub struct ThinLipGenerator {
    hub: HubSpec,
}

impl ThinLipGenerator {
    /// Generator for a hub
    pub fn new(hub: HubSpec) -> Self {
        Self { hub }
    }

    /// Z of the safety shelf floor
    pub fn shelf_z(&self, ctx: &GenerationContext<'_>) -> GenerationResult<f64> {
        let z = round4(ctx.depths.drill + self.hub.hub_height + ctx.tuning.thin_lip_shelf_offset);
        if z >= 0.0 {
            return Err(GenerationError::invalid(
                "thickness",
                format!("too thin for a thin-lip safety shelf (shelf Z {})", z),
            ));
        }
        Ok(z)
    }

    /// Diameter at and below which op1 bores full depth. Never below the
    /// safe entry: the entry pass always goes full depth.
    pub fn shelf_limit(&self, ctx: &GenerationContext<'_>) -> f64 {
        (ctx.spec.cb_in - ctx.tuning.thin_lip_shelf_inset).max(ctx.tuning.safe_entry_diameter)
    }

    fn op1_passes(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Vec<BoringPass>> {
        let shelf_z = self.shelf_z(ctx)?;
        let limit = self.shelf_limit(ctx);
        let passes = ctx
            .boring
            .calculate_passes(ctx.spec.cb_in, ctx.depths.drill, true)?
            .into_iter()
            .map(|mut pass| {
                if !pass.is_chamfer() && pass.diameter > limit {
                    pass.z = shelf_z;
                }
                pass
            })
            .collect();
        Ok(passes)
    }
}

impl SpacerProgramGenerator for ThinLipGenerator {
    fn spacer_type(&self) -> SpacerType {
        SpacerType::ThinLip
    }

    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let passes = self.op1_passes(ctx)?;
        debug!(
            shelf_z = self.shelf_z(ctx)?,
            limit = self.shelf_limit(ctx),
            "thin-lip safety shelf"
        );
        common::bore_section(ctx, &passes, ctx.spec.cb_in)
    }

    fn op2_turn(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        hub_turn(ctx, &self.hub, ctx.tuning.thin_lip_z_increment, "TURN HUB THIN LIP")
    }

    fn op2_chamfer(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        let shelf_z = self.shelf_z(ctx)?;
        let full_depth = self
            .op1_passes(ctx)?
            .iter()
            .filter(|p| !p.is_chamfer() && p.z < shelf_z)
            .map(|p| p.diameter)
            .reduce(f64::max)
            .ok_or_else(|| GenerationError::invalid("cb_mm", "no full-depth pass under the safety shelf"))?;

        // remaining ring measured from the op2 face, plus overlap into the shelf
        let ring_z = -round4(ctx.spec.total_height() + shelf_z + EDGE_BREAK);
        let cleanup = ctx
            .boring
            .calculate_continuation(full_depth, ctx.spec.cb_in, ring_z, false)?;

        let bore_params = ctx.cutting(Operation::Bore, ctx.spec.cb_in, ring_z);
        let mut section = Section::new(SectionKind::Op2Chamfer);
        common::start_tool(
            &mut section,
            ctx,
            ctx.lathe.tools.bore,
            "SHELF CLEANUP",
            &bore_params,
            OpSide::Op2,
        );
        common::write_passes(&mut section, ctx, &cleanup, &bore_params, None, true);
        common::end_tool(&mut section, ctx);

        let chamfer_params = ctx.cutting(Operation::Chamfer, ctx.spec.cb_in, ctx.boring.chamfer_depth());
        common::start_tool(
            &mut section,
            ctx,
            ctx.lathe.tools.chamfer,
            "BORE CHAMFER",
            &chamfer_params,
            OpSide::Op2,
        );
        common::write_bore_chamfer(&mut section, ctx, &chamfer_params, ctx.spec.cb_in, true);
        common::end_tool(&mut section, ctx);
        Ok(section)
    }
}
