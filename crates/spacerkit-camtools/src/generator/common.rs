//! Sections shared by every spacer variant

use spacerkit_core::{
    data::{DepthTable, Depths, PCodeTable},
    GenerationError, GenerationResult, GeneratorTuning, LatheSpec, OpSide, PCodePair, PartSpec,
};
use tracing::debug;

use crate::boring::{round4, BoringPass, BoringPassCalculator, PassKind};
use crate::program::{Block, DiameterMarker, Motion, Section, SectionKind};
use crate::speeds_feeds::{CuttingParams, FeedsSpeedsCalculator, Operation};
use crate::templates::{TemplateProvider, TemplateQuery};

/// 45° edge break on OD and hub corners
pub const EDGE_BREAK: f64 = 0.05;

/// Everything a variant needs to build its sections
pub struct GenerationContext<'a> {
    /// Part being generated
    pub spec: &'a PartSpec,
    /// Lathe envelope
    pub lathe: &'a LatheSpec,
    /// Shop constants
    pub tuning: &'a GeneratorTuning,
    /// Drill depth through the whole stock (hub included) and op1 profile depth
    pub depths: Depths,
    /// Work offsets
    pub pcodes: PCodePair,
    /// Boring-pass planner
    pub boring: BoringPassCalculator,
    feeds: FeedsSpeedsCalculator<'a>,
    templates: &'a dyn TemplateProvider,
}

impl<'a> GenerationContext<'a> {
    /// Resolve tables and calculators for a part
    pub fn new(
        spec: &'a PartSpec,
        lathe: &'a LatheSpec,
        tuning: &'a GeneratorTuning,
        templates: &'a dyn TemplateProvider,
    ) -> GenerationResult<Self> {
        let (table_depths, source) = DepthTable::standard().lookup_with_breakthrough(
            spec.thickness.key(),
            Some(spec.thickness.inches()),
            tuning.drill_breakthrough,
        )?;
        let depths = Depths {
            drill: round4(table_depths.drill - spec.hub_height()),
            profile: table_depths.profile,
        };
        let pcodes = PCodeTable::standard().get_pair(spec.lathe, spec.thickness.key())?;
        debug!(
            key = spec.thickness.key(),
            ?source,
            drill = depths.drill,
            profile = depths.profile,
            op1 = %pcodes.op1,
            op2 = %pcodes.op2,
            "resolved depths and work offsets"
        );

        Ok(Self {
            spec,
            lathe,
            tuning,
            depths,
            pcodes,
            boring: BoringPassCalculator::new(tuning),
            feeds: FeedsSpeedsCalculator::new(lathe, spec),
            templates,
        })
    }

    /// Feeds and speeds for an operation, preferring a matching template
    pub fn cutting(&self, operation: Operation, diameter: f64, depth: f64) -> CuttingParams {
        let query = TemplateQuery {
            round_size: self.spec.round_size,
            cb_mm: self.spec.cb_mm,
            operation,
        };
        match self.templates.lookup(&query) {
            Some(params) => {
                debug!(provider = self.templates.name(), %operation, "using template feeds");
                self.feeds.finish(params)
            }
            None => self.feeds.calculate(operation, diameter, depth),
        }
    }

    /// Rapid clearance height
    pub fn clearance(&self) -> f64 {
        self.tuning.clearance_z
    }

    /// X just outside the stock
    pub fn outside_stock(&self) -> f64 {
        round4(self.spec.round_size + self.tuning.stock_clearance)
    }
}

/// Open a tool section: tool, spindle, work offset, coolant
pub fn start_tool(
    section: &mut Section,
    ctx: &GenerationContext<'_>,
    tool: u16,
    comment: &str,
    params: &CuttingParams,
    side: OpSide,
) {
    section.push(Block::ToolChange {
        tool,
        comment: comment.to_string(),
    });
    match params.spindle.css {
        Some(css) => section.push(Block::ConstantSurfaceSpeed {
            max_rpm: params.spindle.max_rpm,
            css,
        }),
        None => section.push(Block::FixedRpm(params.spindle.rpm)),
    };
    section
        .push(Block::WorkOffset(ctx.pcodes.for_side(side)))
        .push(Block::CoolantOn);
}

/// Close a tool section: coolant off, home, optional stop
pub fn end_tool(section: &mut Section, ctx: &GenerationContext<'_>) {
    section
        .push(Block::CoolantOff)
        .push(Block::MachineHome {
            x: ctx.lathe.home_x,
            z: ctx.lathe.home_z,
        })
        .push(Block::OptionalStop);
}

/// Program start, number, title and setup notes
pub fn header(ctx: &GenerationContext<'_>) -> Section {
    let spec = ctx.spec;
    let mut section = Section::new(SectionKind::Header);
    section
        .push(Block::Percent)
        .push(Block::ProgramNumber {
            number: spec.program_number,
            title: spec.title.clone(),
        })
        .push(Block::Comment(format!(
            "{} SPACER {}",
            spec.spacer_type(),
            spec.lathe
        )))
        .push(Block::Comment(format!(
            "ROUND {} THK {} CB {}MM",
            spec.round_size, spec.thickness, spec.cb_mm
        )));
    if let Some(hub) = spec.variant.hub() {
        section.push(Block::Comment(format!(
            "OB {}MM HUB {}",
            hub.outer_bore_mm, hub.hub_height
        )));
    }
    if let Some(cb) = spec.variant.counterbore() {
        section.push(Block::Comment(format!(
            "COUNTERBORE {}MM DEPTH {}",
            cb.diameter_mm, cb.depth
        )));
    }
    section
}

/// Operator flip between op1 and op2
pub fn flip(ctx: &GenerationContext<'_>) -> Section {
    let mut section = Section::new(SectionKind::Flip);
    section
        .push(Block::MachineHome {
            x: ctx.lathe.home_x,
            z: ctx.lathe.home_z,
        })
        .push(Block::ProgramStop(Some(format!(
            "FLIP PART OP2 {}",
            ctx.pcodes.op2
        ))));
    section
}

/// Program end
pub fn footer() -> Section {
    let mut section = Section::new(SectionKind::Footer);
    section.push(Block::ProgramEnd).push(Block::Percent);
    section
}

/// Pilot drill through the whole stock
pub fn drill(ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
    let params = ctx.cutting(Operation::Drill, 0.0, ctx.depths.drill);
    let mut section = Section::new(SectionKind::Op1Drill);
    start_tool(&mut section, ctx, ctx.lathe.tools.drill, "DRILL", &params, OpSide::Op1);
    section
        .motion(Motion::rapid().x(0.0).z(ctx.clearance()))
        .motion(Motion::linear(params.feeds.rough).z(ctx.depths.drill))
        .motion(Motion::rapid().z(ctx.clearance()));
    end_tool(&mut section, ctx);
    Ok(section)
}

/// Write boring passes into a section that already has its tool started.
///
/// The first pass approaches with X and clearance Z together, since it is
/// the first Z after the work offset. The finishing pass at `marked_target`
/// carries the marker on its X approach.
pub fn write_passes(
    section: &mut Section,
    ctx: &GenerationContext<'_>,
    passes: &[BoringPass],
    params: &CuttingParams,
    marker: Option<(f64, DiameterMarker)>,
    first: bool,
) {
    let clearance = ctx.clearance();
    let mut first = first;
    for pass in passes {
        let mut approach = Motion::rapid();
        match pass.kind {
            PassKind::Chamfer => {
                approach = approach.x(pass.diameter);
                if first {
                    approach = approach.z(clearance);
                }
                section
                    .motion(approach)
                    .motion(Motion::linear(params.feeds.chamfer).z(0.0))
                    .motion(
                        Motion::linear(params.feeds.chamfer)
                            .x(round4(pass.diameter + 2.0 * pass.z))
                            .z(pass.z),
                    );
            }
            PassKind::Rough | PassKind::Finish => {
                approach = approach.x(pass.diameter);
                if first {
                    approach = approach.z(clearance);
                }
                if let Some((target, m)) = marker {
                    if pass.kind == PassKind::Finish && (pass.diameter - target).abs() < 1e-4 {
                        approach = approach.marked(m);
                    }
                }
                let feed = match pass.kind {
                    PassKind::Finish => params.feeds.finish,
                    _ => params.feeds.rough,
                };
                section
                    .motion(approach)
                    .motion(Motion::linear(feed).z(pass.z));
            }
        }
        section.motion(Motion::rapid().z(clearance));
        first = false;
    }
}

/// Op1 boring section for a list of passes
pub fn bore_section(
    ctx: &GenerationContext<'_>,
    passes: &[BoringPass],
    cb_target: f64,
) -> GenerationResult<Section> {
    if passes.is_empty() {
        return Err(GenerationError::invalid("target_diameter", "no boring passes"));
    }
    let params = ctx.cutting(Operation::Bore, cb_target, ctx.depths.drill);
    let mut section = Section::new(SectionKind::Op1Bore);
    start_tool(&mut section, ctx, ctx.lathe.tools.bore, "BORE", &params, OpSide::Op1);
    write_passes(
        &mut section,
        ctx,
        passes,
        &params,
        Some((cb_target, DiameterMarker::CenterBore)),
        true,
    );
    end_tool(&mut section, ctx);
    debug!(passes = passes.len(), target = cb_target, "op1 bore planned");
    Ok(section)
}

/// Face from outside the stock in to `face_to` at Z0, then break the OD
/// edge. Leaves the tool at clearance outside the stock.
fn face_and_break_od(
    section: &mut Section,
    ctx: &GenerationContext<'_>,
    params: &CuttingParams,
    face_to: f64,
) {
    let clearance = ctx.clearance();
    let round = ctx.spec.round_size;
    section
        .motion(Motion::rapid().x(ctx.outside_stock()).z(clearance))
        .motion(Motion::linear(params.feeds.finish).z(0.0))
        .motion(Motion::linear(params.feeds.rough).x(round4(face_to)))
        .motion(Motion::rapid().z(clearance))
        .motion(Motion::rapid().x(round4(round - 2.0 * EDGE_BREAK)))
        .motion(Motion::linear(params.feeds.chamfer).z(0.0))
        .motion(Motion::linear(params.feeds.chamfer).x(round).z(-EDGE_BREAK));
}

/// Op1 face, OD edge break and OD profile pass
pub fn op1_turn(ctx: &GenerationContext<'_>, face_to: f64) -> GenerationResult<Section> {
    let params = ctx.cutting(Operation::TurnOp1, ctx.spec.round_size, ctx.depths.profile);
    let mut section = Section::new(SectionKind::Op1Turn);
    start_tool(&mut section, ctx, ctx.lathe.tools.turn, "TURN OP1", &params, OpSide::Op1);
    face_and_break_od(&mut section, ctx, &params, face_to);
    section
        .motion(Motion::linear(params.feeds.rough).z(ctx.depths.profile))
        .motion(Motion::linear(params.feeds.rough).x(ctx.outside_stock()))
        .motion(Motion::rapid().z(ctx.clearance()));
    end_tool(&mut section, ctx);
    Ok(section)
}

/// Op2 face down to the bore and break the OD edge
pub fn op2_face(ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
    let params = ctx.cutting(Operation::TurnOp2, ctx.spec.round_size, EDGE_BREAK);
    let mut section = Section::new(SectionKind::Op2Turn);
    start_tool(&mut section, ctx, ctx.lathe.tools.turn, "TURN OP2", &params, OpSide::Op2);
    face_and_break_od(
        &mut section,
        ctx,
        &params,
        ctx.spec.cb_in - ctx.tuning.pre_finish_offset,
    );
    section
        .motion(Motion::linear(params.feeds.rough).x(ctx.outside_stock()))
        .motion(Motion::rapid().z(ctx.clearance()));
    end_tool(&mut section, ctx);
    Ok(section)
}

/// Append a 45° chamfer at `diameter` to a section with its tool started
pub fn write_bore_chamfer(
    section: &mut Section,
    ctx: &GenerationContext<'_>,
    params: &CuttingParams,
    diameter: f64,
    first: bool,
) {
    let depth = ctx.boring.chamfer_depth();
    let mut approach = Motion::rapid().x(round4(diameter + 2.0 * depth));
    if first {
        approach = approach.z(ctx.clearance());
    }
    section
        .motion(approach)
        .motion(Motion::linear(params.feeds.chamfer).z(0.0))
        .motion(Motion::linear(params.feeds.chamfer).x(round4(diameter)).z(-depth))
        .motion(Motion::rapid().z(ctx.clearance()));
}

/// Op2 chamfer of the center bore
pub fn op2_cb_chamfer(ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
    let params = ctx.cutting(Operation::Chamfer, ctx.spec.cb_in, ctx.boring.chamfer_depth());
    let mut section = Section::new(SectionKind::Op2Chamfer);
    start_tool(
        &mut section,
        ctx,
        ctx.lathe.tools.chamfer,
        "BORE CHAMFER",
        &params,
        OpSide::Op2,
    );
    write_bore_chamfer(&mut section, ctx, &params, ctx.spec.cb_in, true);
    end_tool(&mut section, ctx);
    Ok(section)
}
