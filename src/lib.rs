//! # SpacerKit
//!
//! G-code generation and verification for CNC lathe wheel spacers.
//!
//! ## Architecture
//!
//! SpacerKit is organized as a workspace with multiple crates:
//!
//! 1. **spacerkit-core** - Part model, lookup tables, units, diagnostics, errors
//! 2. **spacerkit-camtools** - Boring passes, feeds and speeds, program generators
//! 3. **spacerkit-verifier** - Crash detection, fix passes, bore steps, feasibility
//! 4. **spacerkit-settings** - Persisted constants and standards overrides
//! 5. **spacerkit** - CLI binary that integrates all crates

pub mod cli;

pub use spacerkit_camtools as camtools;
pub use spacerkit_core::data;
pub use spacerkit_settings as settings;
pub use spacerkit_verifier as verifier;

pub use spacerkit_camtools::{GCodeEmitter, Program, ProgramGenerator, SectionKind};
pub use spacerkit_core::{
    Diagnostic, Error, GenerationError, GeneratorTuning, LatheId, PartSpec, PartSpecBuilder,
    Result, Severity, SpacerType, StandardsMatrix, VerifierTuning,
};
pub use spacerkit_settings::Config;
pub use spacerkit_verifier::{verify_program, PartMetadata, ProgramVerifier, VerificationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support, defaulting to `default_level`
/// - Human-readable output on stderr, or JSON lines when `json` is set
///
/// Program text goes to stdout, so logs never mix with it.
pub fn init_logging(json: bool, default_level: tracing::Level) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
