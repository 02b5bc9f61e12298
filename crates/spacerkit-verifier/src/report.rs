//! Whole-program verification
//!
//! Runs the fix pipeline, bore-step validation, marker dimension checks and,
//! when part metadata is supplied, feasibility. Always returns a report.

use serde::{Deserialize, Serialize};
use spacerkit_core::{count_severity, Diagnostic, Severity, StandardsMatrix, VerifierTuning};
use tracing::info;

use crate::bore_steps::BorePassStepsValidator;
use crate::feasibility::{FeasibilityReport, FeasibilityValidator, PartMetadata};
use crate::features::{check_dimensions, extract_features, ProgramFeatures};
use crate::pipeline::FixPipeline;

/// Everything found in one program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Findings in pass order: fix passes, bore steps, dimensions,
    /// feasibility
    pub diagnostics: Vec<Diagnostic>,
    /// Corrected text when a fix pass rewrote a line
    pub fixed_text: Option<String>,
    /// Extracted program facts
    pub features: ProgramFeatures,
    /// Feasibility outcome, if metadata was given
    pub feasibility: Option<FeasibilityReport>,
}

impl VerificationReport {
    /// Number of findings with a severity
    pub fn count(&self, severity: Severity) -> usize {
        count_severity(&self.diagnostics, severity)
    }

    /// Whether anything critical was found
    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }
}

/// Verifier with its passes and standards
pub struct ProgramVerifier<'a> {
    tuning: VerifierTuning,
    pipeline: FixPipeline,
    bore_steps: BorePassStepsValidator,
    feasibility: FeasibilityValidator<'a>,
}

impl Default for ProgramVerifier<'static> {
    fn default() -> Self {
        Self::new(VerifierTuning::default(), StandardsMatrix::standard())
    }
}

impl<'a> ProgramVerifier<'a> {
    /// Create a verifier with the default fix chain
    pub fn new(tuning: VerifierTuning, standards: &'a StandardsMatrix) -> Self {
        Self {
            pipeline: FixPipeline::with_defaults(&tuning),
            bore_steps: BorePassStepsValidator::new(&tuning),
            feasibility: FeasibilityValidator::new(standards),
            tuning,
        }
    }

    /// Replace the fix chain
    pub fn with_pipeline(mut self, pipeline: FixPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Verify one program
    pub fn verify(&self, text: &str, metadata: Option<&PartMetadata>) -> VerificationReport {
        let fixes = self.pipeline.run(text);
        let mut diagnostics = fixes.diagnostics;
        diagnostics.extend(self.bore_steps.validate(text));

        let features = extract_features(text);
        let feasibility = metadata.map(|part| {
            diagnostics.extend(check_dimensions(
                &features,
                part.cb_mm,
                part.ob_mm,
                self.tuning.dimension_tolerance_mm,
            ));
            let report = self.feasibility.validate(part);
            diagnostics.extend(report.diagnostics());
            report
        });

        let report = VerificationReport {
            diagnostics,
            fixed_text: fixes.fixed_text,
            features,
            feasibility,
        };
        info!(
            program = ?report.features.program_number,
            critical = report.count(Severity::Critical),
            warnings = report.count(Severity::Warning),
            fixed = report.fixed_text.is_some(),
            "program verified"
        );
        report
    }
}

/// Verify a program with the built-in standards
pub fn verify_program(
    text: &str,
    metadata: Option<&PartMetadata>,
    tuning: &VerifierTuning,
) -> VerificationReport {
    ProgramVerifier::new(tuning.clone(), StandardsMatrix::standard()).verify(text, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_plunge() {
        let tuning = VerifierTuning::default();
        let report = verify_program("G00 X3.0 Z0.2\nZ-0.09\n", None, &tuning);
        assert!(report.has_critical());
        assert_eq!(report.diagnostics[0].line, Some(2));

        let report = verify_program("G00 X3.0 Z0.2\nG01 Z-0.09\n", None, &tuning);
        assert_eq!(report.count(Severity::Critical), 0);
    }

    #[test]
    fn test_malformed_text_never_fails() {
        let report = verify_program("((((\n@@@ X--\nG01\nT (BORE)\n\u{0}\n", None, &VerifierTuning::default());
        assert_eq!(report.count(Severity::Critical), 0);
        assert!(report.feasibility.is_none());
    }
}
