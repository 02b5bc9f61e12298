//! Fix pass pipeline and registry
//!
//! Passes run in registration order. Each pass sees the text as left by the
//! passes before it, so "apply all fixes" is just running the full chain.

use serde::{Deserialize, Serialize};
use spacerkit_core::{Diagnostic, VerifierTuning};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::detectors::{
    BareZ0Detector, MissingFeedDetector, PassOutput, RapidPlungeDetector,
    WorkOffsetClearanceDetector,
};
use crate::tokenizer::{tokenize_lines, TokenizedLine};

/// A verification pass that may rewrite lines
///
/// Implementations must return exactly one output line per input line.
pub trait FixPass: Send + Sync {
    /// Get the name/identifier of this pass
    fn name(&self) -> &str;

    /// Get a description of what this pass checks
    fn description(&self) -> &str;

    /// Scan the lines, returning fixed lines and findings
    fn apply(&self, lines: &[TokenizedLine]) -> PassOutput;

    /// Check if this pass is enabled
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Arc-wrapped pass for thread-safe sharing
pub type FixPassHandle = Arc<dyn FixPass>;

/// Result of running the pipeline over one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Findings from every pass, in pass order
    pub diagnostics: Vec<Diagnostic>,
    /// Corrected text, present only if some pass rewrote a line
    pub fixed_text: Option<String>,
}

/// Ordered chain of fix passes
#[derive(Clone, Default)]
pub struct FixPipeline {
    passes: Vec<FixPassHandle>,
}

impl FixPipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// The standard chain: plunge, missing feed, work-offset clearance, bare Z0
    pub fn with_defaults(tuning: &VerifierTuning) -> Self {
        let mut pipeline = Self::new();
        pipeline.register_all(vec![
            Arc::new(RapidPlungeDetector::new(tuning)),
            Arc::new(MissingFeedDetector::new(tuning)),
            Arc::new(WorkOffsetClearanceDetector::new(tuning)),
            Arc::new(BareZ0Detector::new(tuning)),
        ]);
        pipeline
    }

    /// Register a pass at the end of the chain
    pub fn register(&mut self, pass: FixPassHandle) -> &mut Self {
        self.passes.push(pass);
        self
    }

    /// Register multiple passes at once
    pub fn register_all(&mut self, passes: Vec<FixPassHandle>) -> &mut Self {
        self.passes.extend(passes);
        self
    }

    /// Get the number of registered passes
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// List all registered passes
    pub fn list_passes(&self) -> Vec<(&str, &str, bool)> {
        self.passes
            .iter()
            .map(|p| (p.name(), p.description(), p.is_enabled()))
            .collect()
    }

    /// Run every enabled pass over the text
    pub fn run(&self, text: &str) -> PipelineReport {
        let original: Vec<String> = text.lines().map(str::to_string).collect();
        let mut current = original.clone();
        let mut diagnostics = Vec::new();

        for pass in &self.passes {
            if !pass.is_enabled() {
                continue;
            }
            let tokens = tokenize_lines(&current);
            let output = pass.apply(&tokens);
            debug!(
                pass = pass.name(),
                findings = output.diagnostics.len(),
                "fix pass finished"
            );
            diagnostics.extend(output.diagnostics);

            if output.lines.len() != current.len() {
                warn!(
                    "Pass '{}' returned {} lines for {}; discarding its fixes",
                    pass.name(),
                    output.lines.len(),
                    current.len()
                );
                continue;
            }
            current = output.lines;
        }

        let fixed_text = if current != original {
            let mut fixed = current.join("\n");
            if text.ends_with('\n') {
                fixed.push('\n');
            }
            Some(fixed)
        } else {
            None
        };

        PipelineReport {
            diagnostics,
            fixed_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacerkit_core::{count_severity, Severity};

    struct DropEverything;

    impl FixPass for DropEverything {
        fn name(&self) -> &str {
            "drop_everything"
        }

        fn description(&self) -> &str {
            "Misbehaving pass"
        }

        fn apply(&self, _lines: &[TokenizedLine]) -> PassOutput {
            PassOutput {
                lines: Vec::new(),
                diagnostics: vec![Diagnostic::recommendation("dropped")],
            }
        }
    }

    #[test]
    fn test_default_chain() {
        let pipeline = FixPipeline::with_defaults(&VerifierTuning::default());
        assert_eq!(pipeline.pass_count(), 4);
        let names: Vec<&str> = pipeline.list_passes().iter().map(|p| p.0).collect();
        assert_eq!(
            names,
            vec!["rapid_plunge", "missing_feed", "work_offset_clearance", "bare_z0"]
        );
    }

    #[test]
    fn test_fixes_chain() {
        let text = "G154 P47\nG00 X3. Z0.05\nG01 Z-0.5\nG00 Z0.2\nZ-0.09\n";
        let report = FixPipeline::with_defaults(&VerifierTuning::default()).run(text);

        assert_eq!(count_severity(&report.diagnostics, Severity::Critical), 1);
        assert_eq!(count_severity(&report.diagnostics, Severity::Warning), 2);
        assert_eq!(
            report.fixed_text.as_deref(),
            Some("G154 P47\nG00 X3. Z0.2\nG01 Z-0.5 F0.008\nG00 Z0.2\nG01 Z-0.09 F0.008\n")
        );
    }

    #[test]
    fn test_clean_text_has_no_fix() {
        let text = "G00 X3. Z0.2\nG01 Z-0.5 F0.01\nG00 Z0.2";
        let report = FixPipeline::with_defaults(&VerifierTuning::default()).run(text);
        assert!(report.diagnostics.is_empty());
        assert!(report.fixed_text.is_none());
    }

    #[test]
    fn test_line_count_guard() {
        let mut pipeline = FixPipeline::new();
        pipeline.register(Arc::new(DropEverything));
        let report = pipeline.run("G00 X1.\nG00 Z1.");
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.fixed_text.is_none());
    }

    #[test]
    fn test_disabled_pass_skipped() {
        let tuning = VerifierTuning::default();
        let mut pipeline = FixPipeline::new();
        pipeline.register(Arc::new(RapidPlungeDetector::new(&tuning).disabled()));
        let report = pipeline.run("G00 X3. Z0.2\nZ-0.09");
        assert!(report.diagnostics.is_empty());
    }
}
