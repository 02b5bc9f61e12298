//! Fixable defect detectors
//!
//! Every detector is a pure scan over tokenized lines that returns the
//! possibly corrected lines plus what it found. A fix rewrites a line in
//! place; no detector adds or removes lines, so line numbers stay valid
//! across a chain of detectors.

use spacerkit_core::{format_number, Diagnostic, VerifierTuning};

use crate::modal::{LineStep, ModalStateSimulator, MotionState};
use crate::pipeline::FixPass;
use crate::tokenizer::{
    insert_before_comment, prepend_word, replace_word, MotionWord, TokenizedLine,
};

/// Lines after a bare Z0 searched for the chamfer move it sets up
const BARE_Z0_LOOKAHEAD: usize = 3;

/// Output of one detector run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutput {
    /// Lines after fixes, same count as the input
    pub lines: Vec<String>,
    /// Findings
    pub diagnostics: Vec<Diagnostic>,
}

impl PassOutput {
    fn unchanged(lines: &[TokenizedLine]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.raw.clone()).collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Whether any line was rewritten
    pub fn changed(&self, original: &[TokenizedLine]) -> bool {
        self.lines
            .iter()
            .zip(original)
            .any(|(new, old)| *new != old.raw)
    }
}

/// Nearest F word above `index`, searching at most `window` lines back
pub fn preceding_feed(lines: &[TokenizedLine], index: usize, window: usize) -> Option<f64> {
    lines[..index.min(lines.len())]
        .iter()
        .rev()
        .take(window)
        .find_map(|l| l.feed())
}

fn feed_word(feed: f64) -> String {
    format!("F{}", format_number(feed))
}

/// Rapid moves that plunge into the part.
///
/// A rapid (explicit or inherited) that takes Z below zero and deeper than
/// the last tracked Z is a crash. When the rapid was only inherited, the fix
/// makes the line an explicit feed move using the nearest preceding feed.
#[derive(Debug, Clone)]
pub struct RapidPlungeDetector {
    lookahead_lines: usize,
    default_feed: f64,
    enabled: bool,
}

impl RapidPlungeDetector {
    /// Create a detector with the verifier windows
    pub fn new(tuning: &VerifierTuning) -> Self {
        Self {
            lookahead_lines: tuning.lookahead_lines,
            default_feed: tuning.default_safe_feed,
            enabled: true,
        }
    }

    /// Disable the detector inside a pipeline
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn is_plunge(step: &LineStep, line: &TokenizedLine) -> Option<f64> {
        if step.motion() != MotionState::Rapid || step.after.machine_coordinates {
            return None;
        }
        let z = line.z()?;
        if z >= 0.0 {
            return None;
        }
        match step.before.z {
            Some(previous) if z >= previous => None,
            _ => Some(z),
        }
    }

    /// Run the scan
    pub fn detect(&self, lines: &[TokenizedLine]) -> PassOutput {
        let steps = ModalStateSimulator::new().run(lines);
        let mut output = PassOutput::unchanged(lines);

        for (index, (line, step)) in lines.iter().zip(&steps).enumerate() {
            let Some(z) = Self::is_plunge(step, line) else {
                continue;
            };
            let feed = line
                .feed()
                .or_else(|| preceding_feed(lines, index, self.lookahead_lines))
                .unwrap_or(self.default_feed);
            let message = format!("rapid move into part at Z{}", format_number(z));

            if step.is_inherited() {
                let mut fixed = prepend_word(&line.raw, "G01");
                if line.feed().is_none() {
                    fixed = insert_before_comment(&fixed, &feed_word(feed));
                }
                output.diagnostics.push(
                    Diagnostic::critical(format!("{} (inherited G00)", message))
                        .at_line(line.number)
                        .with_fix(fixed.clone()),
                );
                output.lines[index] = fixed;
            } else {
                output.diagnostics.push(
                    Diagnostic::critical(message)
                        .at_line(line.number)
                        .with_fix(format!("replace G00 with G01 {}", feed_word(feed))),
                );
            }
        }
        output
    }
}

impl FixPass for RapidPlungeDetector {
    fn name(&self) -> &str {
        "rapid_plunge"
    }

    fn description(&self) -> &str {
        "Rapid moves that go below the work surface"
    }

    fn apply(&self, lines: &[TokenizedLine]) -> PassOutput {
        self.detect(lines)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// G01 lines that switch into feed mode without an F word
#[derive(Debug, Clone)]
pub struct MissingFeedDetector {
    lookahead_lines: usize,
    default_feed: f64,
    enabled: bool,
}

impl MissingFeedDetector {
    /// Create a detector with the verifier windows
    pub fn new(tuning: &VerifierTuning) -> Self {
        Self {
            lookahead_lines: tuning.lookahead_lines,
            default_feed: tuning.default_safe_feed,
            enabled: true,
        }
    }

    /// Disable the detector inside a pipeline
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Run the scan
    pub fn detect(&self, lines: &[TokenizedLine]) -> PassOutput {
        let steps = ModalStateSimulator::new().run(lines);
        let mut output = PassOutput::unchanged(lines);

        for (index, (line, step)) in lines.iter().zip(&steps).enumerate() {
            let switches_to_feed = line.motion_word() == Some(MotionWord::Linear)
                && !line.is_machine_coordinates()
                && step.before.motion != MotionState::Linear;
            if !switches_to_feed || line.feed().is_some() || !line.has_axis() {
                continue;
            }
            let feed = preceding_feed(lines, index, self.lookahead_lines)
                .unwrap_or(self.default_feed);
            let fixed = insert_before_comment(&line.raw, &feed_word(feed));
            output.diagnostics.push(
                Diagnostic::warning("G01 without a feed rate")
                    .at_line(line.number)
                    .with_fix(fixed.clone()),
            );
            output.lines[index] = fixed;
        }
        output
    }
}

impl FixPass for MissingFeedDetector {
    fn name(&self) -> &str {
        "missing_feed"
    }

    fn description(&self) -> &str {
        "Feed moves that start without an F word"
    }

    fn apply(&self, lines: &[TokenizedLine]) -> PassOutput {
        self.detect(lines)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// First rapid Z after a work-offset change sitting too close to the face
#[derive(Debug, Clone)]
pub struct WorkOffsetClearanceDetector {
    context_lines: usize,
    min_clearance: f64,
    clearance_z: f64,
    enabled: bool,
}

impl WorkOffsetClearanceDetector {
    /// Create a detector with the verifier windows
    pub fn new(tuning: &VerifierTuning) -> Self {
        Self {
            context_lines: tuning.context_lines,
            min_clearance: tuning.work_offset_min_clearance,
            clearance_z: tuning.work_offset_clearance_z,
            enabled: true,
        }
    }

    /// Disable the detector inside a pipeline
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Run the scan
    pub fn detect(&self, lines: &[TokenizedLine]) -> PassOutput {
        let steps = ModalStateSimulator::new().run(lines);
        let mut output = PassOutput::unchanged(lines);

        for (start, line) in lines.iter().enumerate() {
            if !line.has_g(154) {
                continue;
            }
            let window = lines
                .iter()
                .zip(&steps)
                .enumerate()
                .skip(start + 1)
                .take(self.context_lines);
            for (index, (candidate, step)) in window {
                if candidate.has_g(154) {
                    break;
                }
                let rapid_z = step.motion() == MotionState::Rapid
                    && !step.after.machine_coordinates
                    && candidate.z().is_some();
                if !rapid_z {
                    continue;
                }
                if let Some(z) = candidate.z() {
                    if (0.0..self.min_clearance).contains(&z) {
                        let fixed = replace_word(
                            &candidate.raw,
                            'Z',
                            &format!("Z{}", format_number(self.clearance_z)),
                        );
                        output.diagnostics.push(
                            Diagnostic::warning(format!(
                                "first rapid after G154 stops at Z{}, below the {} clearance",
                                format_number(z),
                                format_number(self.min_clearance)
                            ))
                            .at_line(candidate.number)
                            .with_fix(fixed.clone()),
                        );
                        output.lines[index] = fixed;
                    }
                }
                break;
            }
        }
        output
    }
}

impl FixPass for WorkOffsetClearanceDetector {
    fn name(&self) -> &str {
        "work_offset_clearance"
    }

    fn description(&self) -> &str {
        "Approach height after selecting a work offset"
    }

    fn apply(&self, lines: &[TokenizedLine]) -> PassOutput {
        self.detect(lines)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// A bare `Z0` under an inherited rapid, followed by a diagonal chamfer feed.
/// The approach to the face should itself be a feed move.
#[derive(Debug, Clone)]
pub struct BareZ0Detector {
    lookahead_lines: usize,
    default_feed: f64,
    enabled: bool,
}

impl BareZ0Detector {
    /// Create a detector with the verifier windows
    pub fn new(tuning: &VerifierTuning) -> Self {
        Self {
            lookahead_lines: tuning.lookahead_lines,
            default_feed: tuning.default_safe_feed,
            enabled: true,
        }
    }

    /// Disable the detector inside a pipeline
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn is_bare_z0(line: &TokenizedLine) -> bool {
        matches!(line.words.as_slice(), [w] if w.letter == 'Z' && w.value == 0.0)
    }

    /// Run the scan
    pub fn detect(&self, lines: &[TokenizedLine]) -> PassOutput {
        let steps = ModalStateSimulator::new().run(lines);
        let mut output = PassOutput::unchanged(lines);

        for (index, (line, step)) in lines.iter().zip(&steps).enumerate() {
            if !Self::is_bare_z0(line)
                || !step.is_inherited()
                || step.motion() != MotionState::Rapid
            {
                continue;
            }
            let chamfer = lines
                .iter()
                .zip(&steps)
                .skip(index + 1)
                .take(BARE_Z0_LOOKAHEAD)
                .find(|(next, next_step)| {
                    next.motion_word() == Some(MotionWord::Linear)
                        && next_step.is_diagonal(next)
                });
            let Some((chamfer_line, _)) = chamfer else {
                continue;
            };
            let feed = chamfer_line
                .feed()
                .or_else(|| preceding_feed(lines, index, self.lookahead_lines))
                .unwrap_or(self.default_feed);
            let mut fixed = format!("G01 Z0. {}", feed_word(feed));
            if let Some(comment) = &line.comment {
                fixed = format!("{} ({})", fixed, comment);
            }
            output.diagnostics.push(
                Diagnostic::warning(format!(
                    "bare Z0 rapids onto the face before the chamfer at line {}",
                    chamfer_line.number
                ))
                .at_line(line.number)
                .with_fix(fixed.clone()),
            );
            output.lines[index] = fixed;
        }
        output
    }
}

impl FixPass for BareZ0Detector {
    fn name(&self) -> &str {
        "bare_z0"
    }

    fn description(&self) -> &str {
        "Bare Z0 chamfer approaches left in rapid"
    }

    fn apply(&self, lines: &[TokenizedLine]) -> PassOutput {
        self.detect(lines)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use spacerkit_core::Severity;

    fn tuning() -> VerifierTuning {
        VerifierTuning::default()
    }

    #[test]
    fn test_inherited_rapid_plunge_is_fixed() {
        let lines = tokenize("G01 X2. Z-0.5 F0.012\nG00 X3. Z0.2\nZ-0.09 (CUT)\nX3.2");
        let out = RapidPlungeDetector::new(&tuning()).detect(&lines);

        assert_eq!(out.diagnostics.len(), 1);
        let diag = &out.diagnostics[0];
        assert_eq!(diag.severity, Severity::Critical);
        assert_eq!(diag.line, Some(3));
        assert!(diag.message.contains("Z-0.09"));
        assert_eq!(out.lines[2], "G01 Z-0.09 F0.012 (CUT)");
        assert_eq!(out.lines.len(), lines.len());
    }

    #[test]
    fn test_inherited_rapid_plunge_keeps_sequence_number_first() {
        let lines = tokenize("N10 G01 X2. Z-0.5 F0.012\nN20 G00 X3. Z0.2\nN30 Z-0.09 (CUT)");
        let out = RapidPlungeDetector::new(&tuning()).detect(&lines);

        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.lines[2], "N30 G01 Z-0.09 F0.012 (CUT)");
        assert_eq!(
            out.diagnostics[0].suggested_fix.as_deref(),
            Some("N30 G01 Z-0.09 F0.012 (CUT)")
        );
    }

    #[test]
    fn test_explicit_rapid_plunge_is_reported_only() {
        let lines = tokenize("G00 X3. Z0.2\nG00 Z-0.5");
        let out = RapidPlungeDetector::new(&tuning()).detect(&lines);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(!out.changed(&lines));
        assert_eq!(
            out.diagnostics[0].suggested_fix.as_deref(),
            Some("replace G00 with G01 F0.008")
        );
    }

    #[test]
    fn test_rapid_retract_and_home_are_fine() {
        let lines = tokenize("G01 Z-1. F0.01\nG00 Z0.2\nG00 G53 X-1. Z-11.\nG00 Z-0.5");
        let out = RapidPlungeDetector::new(&tuning()).detect(&lines);
        // G53 homes are not plunges
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].line, Some(4));
    }

    #[test]
    fn test_missing_feed() {
        let lines = tokenize("G01 X1. Z-1. F0.006\nG00 Z0.2\nG01 Z-0.4\nZ-0.8");
        let out = MissingFeedDetector::new(&tuning()).detect(&lines);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].severity, Severity::Warning);
        assert_eq!(out.lines[2], "G01 Z-0.4 F0.006");
        assert_eq!(out.lines[3], "Z-0.8");
    }

    #[test]
    fn test_missing_feed_defaults() {
        let lines = tokenize("T121 (BORE)\nG01 X2.3 Z0.2");
        let out = MissingFeedDetector::new(&tuning()).detect(&lines);
        assert_eq!(out.lines[1], "G01 X2.3 Z0.2 F0.008");
    }

    #[test]
    fn test_work_offset_clearance() {
        let lines = tokenize("G154 P47\nM08\nG00 X3. Z0.05\nG00 Z0.02");
        let out = WorkOffsetClearanceDetector::new(&tuning()).detect(&lines);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.lines[2], "G00 X3. Z0.2");
        assert_eq!(out.lines[3], "G00 Z0.02");

        let lines = tokenize("G154 P47\nG00 X3. Z0.2");
        assert!(WorkOffsetClearanceDetector::new(&tuning())
            .detect(&lines)
            .diagnostics
            .is_empty());
    }

    #[test]
    fn test_bare_z0_chamfer_approach() {
        let lines = tokenize("G00 X3.7 Z0.2\nZ0\nG01 X3.4 Z-0.15 F0.004");
        let out = BareZ0Detector::new(&tuning()).detect(&lines);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.lines[1], "G01 Z0. F0.004");

        // not followed by a chamfer
        let lines = tokenize("G00 X3.7 Z0.2\nZ0\nG00 Z0.2");
        assert!(BareZ0Detector::new(&tuning()).detect(&lines).diagnostics.is_empty());
    }
}
