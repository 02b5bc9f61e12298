//! Bore pass step validation
//!
//! Checks roughing progression inside each boring tool block: the first
//! pass must be at or under the safe entry diameter, and no pass may open
//! the bore by more than one step over the largest diameter reached so far.

use serde::{Deserialize, Serialize};
use spacerkit_core::{Diagnostic, VerifierTuning};
use tracing::debug;

use crate::modal::ModalStateSimulator;
use crate::tokenizer::{tokenize, TokenizedLine};

/// One recorded boring cut
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorePass {
    /// 1-based line of the feed move
    pub line: usize,
    /// Diameter the cut runs at
    pub diameter: f64,
}

/// Boring cuts of one tool block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoreBlock {
    /// Line of the tool change
    pub tool_line: usize,
    /// Tool number
    pub tool: u32,
    /// Cuts in program order
    pub passes: Vec<BorePass>,
}

/// Step validator for boring tool blocks
#[derive(Debug, Clone)]
pub struct BorePassStepsValidator {
    safe_entry: f64,
    max_step: f64,
    tolerance: f64,
    surface_depth: f64,
}

impl Default for BorePassStepsValidator {
    fn default() -> Self {
        Self::new(&VerifierTuning::default())
    }
}

fn is_bore_tool(line: &TokenizedLine) -> bool {
    let comment = line.comment_upper();
    comment.contains("BORE") && !comment.contains("CHAMFER")
}

impl BorePassStepsValidator {
    /// Create a validator with the verifier limits
    pub fn new(tuning: &VerifierTuning) -> Self {
        Self {
            safe_entry: tuning.safe_entry_diameter,
            max_step: tuning.max_bore_step,
            tolerance: tuning.step_tolerance,
            surface_depth: tuning.bore_surface_depth,
        }
    }

    /// Collect the boring cuts of every bore block.
    ///
    /// A block starts at a tool change whose comment names a bore and ends at
    /// the next tool change or M30. A cut is a straight feed move below the
    /// surface depth; diagonal chamfer moves are skipped.
    pub fn collect_blocks(&self, lines: &[TokenizedLine]) -> Vec<BoreBlock> {
        let steps = ModalStateSimulator::new().run(lines);
        let mut blocks = Vec::new();
        let mut current: Option<BoreBlock> = None;

        for (line, step) in lines.iter().zip(&steps) {
            if let Some(tool) = line.tool() {
                blocks.extend(current.take());
                if is_bore_tool(line) {
                    current = Some(BoreBlock {
                        tool_line: line.number,
                        tool,
                        passes: Vec::new(),
                    });
                }
                continue;
            }
            if line.has_m(30) {
                blocks.extend(current.take());
                continue;
            }
            let Some(block) = current.as_mut() else {
                continue;
            };
            if !step.is_feed_move(line) || step.is_diagonal(line) {
                continue;
            }
            if let (Some(x), Some(z)) = (step.after.x, step.after.z) {
                if z < -self.surface_depth {
                    block.passes.push(BorePass {
                        line: line.number,
                        diameter: x,
                    });
                }
            }
        }
        blocks.extend(current);
        blocks
    }

    /// Check one block
    pub fn check_block(&self, block: &BoreBlock) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let Some(first) = block.passes.first() else {
            return diagnostics;
        };

        if first.diameter > self.safe_entry + self.tolerance {
            diagnostics.push(
                Diagnostic::critical(format!(
                    "T{} enters the bore at X{:.3}, above the {:.3} safe entry",
                    block.tool, first.diameter, self.safe_entry
                ))
                .at_line(first.line)
                .with_fix(format!("start boring at X{:.3}", self.safe_entry)),
            );
        }

        let mut reached = first.diameter;
        for pass in &block.passes[1..] {
            let gap = pass.diameter - reached;
            if gap > self.max_step + self.tolerance {
                let missing = intermediate_diameters(reached, pass.diameter, self.max_step);
                let listed = missing
                    .iter()
                    .map(|d| format!("X{:.3}", d))
                    .collect::<Vec<_>>()
                    .join(", ");
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "T{} steps {:.3} from X{:.3} to X{:.3}; missing {}",
                        block.tool, gap, reached, pass.diameter, listed
                    ))
                    .at_line(pass.line)
                    .with_fix(format!("insert passes at {}", listed)),
                );
            }
            reached = reached.max(pass.diameter);
        }
        diagnostics
    }

    /// Validate already tokenized lines
    pub fn validate_lines(&self, lines: &[TokenizedLine]) -> Vec<Diagnostic> {
        let blocks = self.collect_blocks(lines);
        let diagnostics: Vec<Diagnostic> =
            blocks.iter().flat_map(|b| self.check_block(b)).collect();
        debug!(
            blocks = blocks.len(),
            findings = diagnostics.len(),
            "bore steps checked"
        );
        diagnostics
    }

    /// Validate program text
    pub fn validate(&self, text: &str) -> Vec<Diagnostic> {
        self.validate_lines(&tokenize(text))
    }
}

/// Evenly spaced diameters strictly between `from` and `to`, enough that no
/// step exceeds `max_step`
pub fn intermediate_diameters(from: f64, to: f64, max_step: f64) -> Vec<f64> {
    let gap = to - from;
    if gap <= 0.0 || max_step <= 0.0 {
        return Vec::new();
    }
    let segments = ((gap / max_step) - 1e-6).ceil().max(1.0) as usize;
    let step = gap / segments as f64;
    (1..segments).map(|i| from + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacerkit_core::Severity;

    fn bore_program(diameters: &[f64]) -> String {
        let mut text = String::from("%\nT121 (BORE)\nG97 S1200 M03\nG154 P47\nM08\n");
        for (i, d) in diameters.iter().enumerate() {
            if i == 0 {
                text.push_str(&format!("G00 X{} Z0.2\n", d));
            } else {
                text.push_str(&format!("X{}\n", d));
            }
            text.push_str("G01 Z-1. F0.01\nG00 Z0.2\n");
        }
        text.push_str("M09\nG00 G53 X-1.5 Z-13.\nM30\n%\n");
        text
    }

    #[test]
    fn test_intermediates() {
        let mid = intermediate_diameters(2.3, 2.9, 0.3);
        assert_eq!(mid.len(), 1);
        assert!((mid[0] - 2.6).abs() < 1e-9);
        assert_eq!(intermediate_diameters(2.3, 3.5, 0.3).len(), 3);
        assert!(intermediate_diameters(2.3, 2.6, 0.3).is_empty());
    }

    #[test]
    fn test_large_steps_warn_with_midpoints() {
        let diags = BorePassStepsValidator::default().validate(&bore_program(&[2.3, 2.9, 3.5]));
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert!(diags[0].message.contains("X2.600"));
        assert!(diags[1].message.contains("X3.200"));
    }

    #[test]
    fn test_filled_steps_pass() {
        let diags = BorePassStepsValidator::default()
            .validate(&bore_program(&[2.3, 2.6, 2.9, 3.2, 3.5]));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_aggressive_entry() {
        let diags = BorePassStepsValidator::default().validate(&bore_program(&[2.6, 2.9]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Critical);
    }

    #[test]
    fn test_chamfer_tools_and_shallow_cuts_ignored() {
        let text = "T202 (BORE CHAMFER)\nG00 X4. Z0.2\nG01 Z-1. F0.01\n\
                    T121 (BORE)\nG00 X2.3 Z0.2\nG01 Z-0.1 F0.01\nG00 X3.4\n\
                    G01 X3.1 Z-0.15 F0.004\nG01 Z-1. F0.01\nM30";
        let validator = BorePassStepsValidator::default();
        let blocks = validator.collect_blocks(&tokenize(text));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tool, 121);
        assert_eq!(blocks[0].passes.len(), 1);
        assert!((blocks[0].passes[0].diameter - 3.1).abs() < 1e-9);
    }

    #[test]
    fn test_retreat_then_reopen_measures_from_largest() {
        let diags = BorePassStepsValidator::default()
            .validate(&bore_program(&[2.3, 2.6, 2.4, 2.9]));
        assert!(diags.is_empty());
    }
}
