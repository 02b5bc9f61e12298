//! # SpacerKit CAM Tools
//!
//! Program generation for lathe spacers.
//!
//! ## Components
//!
//! - **Boring**: boring-pass planning with a bounded per-pass step
//! - **Feeds and speeds**: proven values or a surface-speed formula, clamped
//!   to the lathe
//! - **Program model**: named sections of blocks
//! - **Emitter**: renders a program to controller text
//! - **Generators**: one per spacer variant behind a shared interface
//! - **Templates**: optional read-only source of historical feeds

pub mod boring;
pub mod emitter;
pub mod generator;
pub mod program;
pub mod speeds_feeds;
pub mod templates;

pub use boring::{bore_diameters, BoringPass, BoringPassCalculator, PassKind, TwoZonePlan};
pub use emitter::GCodeEmitter;
pub use generator::{
    validate_spec, GenerationContext, ProgramGenerator, SpacerProgramGenerator, VariantGenerator,
};
pub use program::{Block, DiameterMarker, Motion, MotionMode, Program, Section, SectionKind};
pub use speeds_feeds::{CuttingParams, FeedRates, FeedsSpeedsCalculator, Operation, SpindleParams};
pub use templates::{InMemoryTemplates, NoTemplates, TemplateEntry, TemplateProvider, TemplateQuery};
