//! # SpacerKit Core
//!
//! Core types, lookup tables and diagnostics for SpacerKit.
//! Provides the part model, the shop's static tables, tunable constants,
//! numeric formatting and the error taxonomy shared by the generator and
//! the verifier.

pub mod data;
pub mod diagnostics;
pub mod error;
pub mod part;
pub mod thickness;
pub mod tuning;
pub mod units;

pub use data::{
    DepthSource, DepthTable, Depths, LatheClass, LatheConfig, LatheId, LatheMatch, LatheSpec,
    LatheStandard, OpSide, PCode, PCodePair, PCodeTable, PieceTypeRule, StandardsMatrix,
    ToolAssignments,
};

pub use diagnostics::{count_severity, Diagnostic, Severity};

pub use error::{Error, GenerationError, GenerationResult, Result};

pub use part::{
    CounterboreSpec, FeedMode, HubSpec, PartSpec, PartSpecBuilder, SpacerType, SpacerVariant,
};

pub use thickness::ThicknessKey;

pub use tuning::{GeneratorTuning, VerifierTuning};

pub use units::{format_number, in_to_mm, mm_to_in, parse_number, MAX_DECIMALS, MM_PER_INCH};
