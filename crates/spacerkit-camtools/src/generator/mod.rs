//! Spacer program generators
//!
//! One generator per spacer variant behind [`SpacerProgramGenerator`]. The
//! variant set is closed, so dispatch goes through [`VariantGenerator`]
//! rather than a lookup by name. [`ProgramGenerator`] is the entry point:
//! it validates the part, resolves tables and renders text.

pub mod common;
pub mod hub_centric;
pub mod standard;
pub mod steel_ring;
pub mod step;
pub mod thin_lip;
pub mod two_piece;

use spacerkit_core::{
    GenerationError, GenerationResult, GeneratorTuning, LatheConfig, PartSpec, SpacerType,
    SpacerVariant,
};
use tracing::{debug, info};

use crate::emitter::GCodeEmitter;
use crate::program::{Program, Section, SectionKind};
use crate::templates::{NoTemplates, TemplateProvider};

pub use common::GenerationContext;
pub use hub_centric::HubCentricGenerator;
pub use standard::StandardGenerator;
pub use steel_ring::SteelRingGenerator;
pub use step::StepGenerator;
pub use thin_lip::ThinLipGenerator;
pub use two_piece::{TwoPieceLugGenerator, TwoPieceStudGenerator};

/// Shared interface of the variant generators.
///
/// Every section has a default; a variant overrides only the sections whose
/// geometry differs.
pub trait SpacerProgramGenerator {
    /// Variant this generator builds
    fn spacer_type(&self) -> SpacerType;

    /// Sections in output order
    fn section_order(&self) -> &'static [SectionKind] {
        SectionKind::standard_order()
    }

    /// Op1 pilot drill
    fn op1_drill(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        common::drill(ctx)
    }

    /// Op1 boring
    fn op1_bore(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section>;

    /// Op1 facing and OD profile
    fn op1_turn(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        common::op1_turn(ctx, ctx.spec.cb_in - ctx.tuning.pre_finish_offset)
    }

    /// Op2 facing or hub turning
    fn op2_turn(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        common::op2_face(ctx)
    }

    /// Op2 chamfer
    fn op2_chamfer(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Section> {
        common::op2_cb_chamfer(ctx)
    }

    /// Build one section
    fn build_section(
        &self,
        kind: SectionKind,
        ctx: &GenerationContext<'_>,
    ) -> GenerationResult<Section> {
        match kind {
            SectionKind::Header => Ok(common::header(ctx)),
            SectionKind::Op1Drill => self.op1_drill(ctx),
            SectionKind::Op1Bore => self.op1_bore(ctx),
            SectionKind::Op1Turn => self.op1_turn(ctx),
            SectionKind::Flip => Ok(common::flip(ctx)),
            SectionKind::Op2Turn => self.op2_turn(ctx),
            SectionKind::Op2Chamfer => self.op2_chamfer(ctx),
            SectionKind::Footer => Ok(common::footer()),
        }
    }

    /// Build every section. Any failure aborts the whole program.
    fn generate(&self, ctx: &GenerationContext<'_>) -> GenerationResult<Program> {
        let sections = self
            .section_order()
            .iter()
            .map(|kind| {
                let section = self.build_section(*kind, ctx)?;
                debug!(section = %kind, blocks = section.blocks.len(), "section built");
                Ok(section)
            })
            .collect::<GenerationResult<Vec<_>>>()?;

        Ok(Program {
            number: ctx.spec.program_number,
            title: ctx.spec.title.clone(),
            sections,
        })
    }
}

/// Generator selected by the part's variant
#[derive(Debug, Clone)]
pub enum VariantGenerator {
    /// Plain spacer
    Standard(StandardGenerator),
    /// Hub-centric spacer
    HubCentric(HubCentricGenerator),
    /// Thin-lip spacer
    ThinLip(ThinLipGenerator),
    /// Stepped spacer
    Step(StepGenerator),
    /// Steel-ring spacer
    SteelRing(SteelRingGenerator),
    /// Lug half of a two-piece set
    TwoPieceLug(TwoPieceLugGenerator),
    /// Stud half of a two-piece set
    TwoPieceStud(TwoPieceStudGenerator),
}

impl VariantGenerator {
    /// Generator for a variant payload
    pub fn for_variant(variant: &SpacerVariant) -> Self {
        match *variant {
            SpacerVariant::Standard => Self::Standard(StandardGenerator),
            SpacerVariant::HubCentric(hub) => Self::HubCentric(HubCentricGenerator::new(hub)),
            SpacerVariant::ThinLip(hub) => Self::ThinLip(ThinLipGenerator::new(hub)),
            SpacerVariant::Step(cb) => Self::Step(StepGenerator::new(cb)),
            SpacerVariant::SteelRing => Self::SteelRing(SteelRingGenerator),
            SpacerVariant::TwoPieceLug(cb) => Self::TwoPieceLug(TwoPieceLugGenerator::new(cb)),
            SpacerVariant::TwoPieceStud(hub) => {
                Self::TwoPieceStud(TwoPieceStudGenerator::new(hub))
            }
        }
    }

    /// The generator behind the shared interface
    pub fn as_generator(&self) -> &dyn SpacerProgramGenerator {
        match self {
            Self::Standard(g) => g,
            Self::HubCentric(g) => g,
            Self::ThinLip(g) => g,
            Self::Step(g) => g,
            Self::SteelRing(g) => g,
            Self::TwoPieceLug(g) => g,
            Self::TwoPieceStud(g) => g,
        }
    }
}

/// Check the part invariants that generation relies on
pub fn validate_spec(spec: &PartSpec) -> GenerationResult<()> {
    let positive = |field: &str, value: f64| {
        if !value.is_finite() || value <= 0.0 {
            Err(GenerationError::invalid(field, format!("must be > 0, got {}", value)))
        } else {
            Ok(())
        }
    };
    positive("round_size", spec.round_size)?;
    positive("thickness", spec.thickness.inches())?;
    positive("cb_mm", spec.cb_mm)?;
    positive("cb_in", spec.cb_in)?;
    if spec.cb_in >= spec.round_size {
        return Err(GenerationError::invalid(
            "cb_mm",
            format!(
                "center bore {:.4}in must be smaller than round size {}in",
                spec.cb_in, spec.round_size
            ),
        ));
    }
    if let Some(hub) = spec.variant.hub() {
        positive("hub_height", hub.hub_height)?;
        if hub.outer_bore_in <= spec.cb_in || hub.outer_bore_in >= spec.round_size {
            return Err(GenerationError::invalid(
                "outer_bore_mm",
                format!(
                    "{:.4}in must lie between CB {:.4}in and round size {}in",
                    hub.outer_bore_in, spec.cb_in, spec.round_size
                ),
            ));
        }
    }
    if let Some(cb) = spec.variant.counterbore() {
        positive("counterbore_depth", cb.depth)?;
    }
    Ok(())
}

/// Entry point for program generation
pub struct ProgramGenerator {
    tuning: GeneratorTuning,
    lathes: LatheConfig,
    templates: Box<dyn TemplateProvider>,
    emitter: GCodeEmitter,
}

impl Default for ProgramGenerator {
    fn default() -> Self {
        Self::new(GeneratorTuning::default())
    }
}

impl ProgramGenerator {
    /// Generator with the shop lathes and no templates
    pub fn new(tuning: GeneratorTuning) -> Self {
        Self {
            tuning,
            lathes: LatheConfig::standard().clone(),
            templates: Box::new(NoTemplates),
            emitter: GCodeEmitter::new(),
        }
    }

    /// Use different lathe envelopes
    pub fn with_lathes(mut self, lathes: LatheConfig) -> Self {
        self.lathes = lathes;
        self
    }

    /// Consult a template provider for feeds and speeds
    pub fn with_templates(mut self, templates: Box<dyn TemplateProvider>) -> Self {
        self.templates = templates;
        self
    }

    /// Shop constants in use
    pub fn tuning(&self) -> &GeneratorTuning {
        &self.tuning
    }

    /// Build the program model for a part
    pub fn build_program(&self, spec: &PartSpec) -> GenerationResult<Program> {
        validate_spec(spec)?;
        let lathe = self
            .lathes
            .get(spec.lathe)
            .ok_or_else(|| GenerationError::invalid("lathe", format!("unknown lathe {}", spec.lathe)))?;

        info!(
            program = spec.program_number,
            spacer_type = %spec.spacer_type(),
            lathe = %spec.lathe,
            "generating program"
        );

        let ctx = GenerationContext::new(spec, lathe, &self.tuning, self.templates.as_ref())?;
        let generator = VariantGenerator::for_variant(&spec.variant);
        let program = generator.as_generator().generate(&ctx)?;

        info!(
            program = spec.program_number,
            sections = program.sections.len(),
            "program generated"
        );
        Ok(program)
    }

    /// Generate program text for a part
    pub fn generate(&self, spec: &PartSpec) -> GenerationResult<String> {
        let program = self.build_program(spec)?;
        Ok(self.emitter.emit(&program))
    }
}
