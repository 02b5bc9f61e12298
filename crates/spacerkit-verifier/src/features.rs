//! Program feature extraction
//!
//! Pulls identifying facts out of program text: number, title, tools, work
//! offsets, deepest cut and the diameters flagged by `(X IS CB)` and
//! `(X IS OB)` markers.

use serde::{Deserialize, Serialize};
use spacerkit_core::{format_number, in_to_mm, Diagnostic};

use crate::modal::ModalStateSimulator;
use crate::tokenizer::{tokenize, TokenizedLine};

/// A tool change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    /// Line of the T word
    pub line: usize,
    /// Tool number
    pub tool: u32,
    /// Tool comment, if any
    pub comment: Option<String>,
}

/// A diameter marked on a line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkedDiameter {
    /// Marker line
    pub line: usize,
    /// Diameter, inches
    pub diameter: f64,
}

/// Facts extracted from one program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramFeatures {
    /// O-number
    pub program_number: Option<u32>,
    /// Header comment
    pub title: Option<String>,
    /// Tool changes in order
    pub tools: Vec<ToolUse>,
    /// Work offsets selected with G154, in order
    pub work_offsets: Vec<u32>,
    /// Deepest work-coordinate Z reached
    pub deepest_z: Option<f64>,
    /// Finished center bore from the first `(X IS CB)` marker
    pub center_bore: Option<MarkedDiameter>,
    /// Finished outer bore from the first `(X IS OB)` marker
    pub outer_bore: Option<MarkedDiameter>,
}

fn marker_of(line: &TokenizedLine) -> Option<&'static str> {
    let comment = line.comment_upper();
    if comment.contains("X IS CB") {
        Some("CB")
    } else if comment.contains("X IS OB") {
        Some("OB")
    } else {
        None
    }
}

/// Extract features from program text
pub fn extract_features(text: &str) -> ProgramFeatures {
    let lines = tokenize(text);
    let steps = ModalStateSimulator::new().run(&lines);
    let mut features = ProgramFeatures::default();

    for (line, step) in lines.iter().zip(&steps) {
        if features.program_number.is_none() && line.raw.trim_start().starts_with(['O', 'o']) {
            if let Some(number) = line.words.first().filter(|w| w.letter == 'O') {
                features.program_number = number.code();
                features.title = line.comment.clone();
            }
        }
        if let Some(tool) = line.tool() {
            features.tools.push(ToolUse {
                line: line.number,
                tool,
                comment: line.comment.clone(),
            });
        }
        if line.has_g(154) {
            if let Some(p) = line.words.iter().find(|w| w.letter == 'P').and_then(|w| w.code()) {
                features.work_offsets.push(p);
            }
        }
        if !step.after.machine_coordinates {
            if let Some(z) = line.z() {
                features.deepest_z = Some(features.deepest_z.map_or(z, |d| d.min(z)));
            }
        }
        if let Some(marker) = marker_of(line) {
            let Some(diameter) = line.x().or(step.after.x) else {
                continue;
            };
            let found = MarkedDiameter {
                line: line.number,
                diameter,
            };
            match marker {
                "CB" if features.center_bore.is_none() => features.center_bore = Some(found),
                "OB" if features.outer_bore.is_none() => features.outer_bore = Some(found),
                _ => {}
            }
        }
    }
    features
}

fn check_one(
    name: &str,
    found: Option<MarkedDiameter>,
    expected_mm: Option<f64>,
    tolerance_mm: f64,
) -> Option<Diagnostic> {
    let expected = expected_mm?;
    let Some(found) = found else {
        return Some(Diagnostic::recommendation(format!(
            "cannot verify {}: no (X IS {}) marker in the program",
            name, name
        )));
    };
    let found_mm = in_to_mm(found.diameter);
    let delta = (found_mm - expected).abs();
    if delta > tolerance_mm {
        Some(
            Diagnostic::warning(format!(
                "{} is X{} ({:.2}mm), expected {}mm",
                name,
                format_number(found.diameter),
                found_mm,
                format_number(expected)
            ))
            .at_line(found.line),
        )
    } else {
        None
    }
}

/// Compare marked diameters with the expected CB and OB in millimetres
pub fn check_dimensions(
    features: &ProgramFeatures,
    expected_cb_mm: Option<f64>,
    expected_ob_mm: Option<f64>,
    tolerance_mm: f64,
) -> Vec<Diagnostic> {
    [
        check_one("CB", features.center_bore, expected_cb_mm, tolerance_mm),
        check_one("OB", features.outer_bore, expected_ob_mm, tolerance_mm),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacerkit_core::Severity;

    const SAMPLE: &str = "%\n\
        O01234 (7.0 1.50 87.1MM HC L2)\n\
        T101 (DRILL)\n\
        G154 P47\n\
        G00 X0. Z0.2\n\
        G01 Z-2.15 F0.008\n\
        G00 G53 X-1.5 Z-13.\n\
        T121 (BORE)\n\
        G154 P47\n\
        G00 X3.4291 Z0.2 (X IS CB)\n\
        G01 Z-1.65 F0.004\n\
        M30\n\
        %\n";

    #[test]
    fn test_extract() {
        let f = extract_features(SAMPLE);
        assert_eq!(f.program_number, Some(1234));
        assert_eq!(f.title.as_deref(), Some("7.0 1.50 87.1MM HC L2"));
        assert_eq!(f.tools.len(), 2);
        assert_eq!(f.tools[1].comment.as_deref(), Some("BORE"));
        assert_eq!(f.work_offsets, vec![47, 47]);
        assert_eq!(f.deepest_z, Some(-2.15));
        assert_eq!(f.center_bore.map(|m| m.line), Some(10));
        assert!(f.outer_bore.is_none());
    }

    #[test]
    fn test_check_dimensions() {
        let f = extract_features(SAMPLE);
        assert!(check_dimensions(&f, Some(87.1), None, 0.15).is_empty());

        let diags = check_dimensions(&f, Some(87.5), Some(93.1), 0.15);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].line, Some(10));
        assert_eq!(diags[1].severity, Severity::Recommendation);
    }
}
