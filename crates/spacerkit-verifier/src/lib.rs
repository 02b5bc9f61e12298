//! # SpacerKit Verifier
//!
//! Best-effort checks over lathe program text. Verification never fails on
//! malformed input: lines that do not parse are skipped and the scan
//! continues.
//!
//! ## Components
//!
//! - **Tokenizer**: splits lines into address words and comments
//! - **Modal state**: motion-mode state machine with explicit inheritance
//! - **Detectors**: rapid plunges, missing feeds, work-offset clearance and
//!   bare Z0 approaches, each with an in-place fix
//! - **Pipeline**: ordered chain of fix passes
//! - **Bore steps**: boring entry and step-size rules per tool block
//! - **Feasibility**: part dimensions against the lathe standards
//! - **Features**: program facts and marked CB/OB diameters

pub mod bore_steps;
pub mod detectors;
pub mod feasibility;
pub mod features;
pub mod modal;
pub mod pipeline;
pub mod report;
pub mod tokenizer;

pub use bore_steps::{intermediate_diameters, BoreBlock, BorePass, BorePassStepsValidator};
pub use detectors::{
    BareZ0Detector, MissingFeedDetector, PassOutput, RapidPlungeDetector,
    WorkOffsetClearanceDetector,
};
pub use feasibility::{FeasibilityReport, FeasibilityValidator, PartMetadata};
pub use features::{check_dimensions, extract_features, MarkedDiameter, ProgramFeatures, ToolUse};
pub use modal::{transition, LineStep, ModalEvent, ModalState, ModalStateSimulator, MotionState};
pub use pipeline::{FixPass, FixPassHandle, FixPipeline, PipelineReport};
pub use report::{verify_program, ProgramVerifier, VerificationReport};
pub use tokenizer::{tokenize, MotionWord, TokenizedLine, Word};
