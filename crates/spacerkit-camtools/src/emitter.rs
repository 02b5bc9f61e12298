//! G-code emitter
//!
//! Renders a [`Program`] to controller text. Coordinates and feeds go through
//! [`format_number`]; spindle, tool and offset numbers are written as
//! integers.

use spacerkit_core::format_number;

use crate::program::{Block, Motion, MotionMode, Program};

/// Renders programs to text
#[derive(Debug, Clone, Default)]
pub struct GCodeEmitter;

impl GCodeEmitter {
    /// Create a new emitter
    pub fn new() -> Self {
        Self
    }

    /// Render a whole program, one block per line with a trailing newline
    pub fn emit(&self, program: &Program) -> String {
        let mut out = String::new();
        for section in &program.sections {
            for block in &section.blocks {
                for line in self.render_block(block) {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Render one block; spindle setup expands to two lines
    pub fn render_block(&self, block: &Block) -> Vec<String> {
        match block {
            Block::Percent => vec!["%".to_string()],
            Block::ProgramNumber { number, title } => {
                if title.is_empty() {
                    vec![format!("O{:05}", number)]
                } else {
                    vec![format!("O{:05} ({})", number, sanitize_comment(title))]
                }
            }
            Block::Comment(text) => vec![format!("({})", sanitize_comment(text))],
            Block::ToolChange { tool, comment } => {
                if comment.is_empty() {
                    vec![format!("T{}", tool)]
                } else {
                    vec![format!("T{} ({})", tool, sanitize_comment(comment))]
                }
            }
            Block::ConstantSurfaceSpeed { max_rpm, css } => vec![
                format!("G50 S{}", max_rpm),
                format!("G96 S{} M03", css),
            ],
            Block::FixedRpm(rpm) => vec![format!("G97 S{} M03", rpm)],
            Block::WorkOffset(pcode) => vec![format!("G154 {}", pcode)],
            Block::CoolantOn => vec!["M08".to_string()],
            Block::CoolantOff => vec!["M09".to_string()],
            Block::Motion(motion) => vec![self.render_motion(motion)],
            Block::MachineHome { x, z } => vec![format!(
                "G00 G53 X{} Z{}",
                format_number(*x),
                format_number(*z)
            )],
            Block::ProgramStop(Some(message)) => {
                vec![format!("M00 ({})", sanitize_comment(message))]
            }
            Block::ProgramStop(None) => vec!["M00".to_string()],
            Block::OptionalStop => vec!["M01".to_string()],
            Block::ProgramEnd => vec!["M30".to_string()],
        }
    }

    /// Render one motion line
    pub fn render_motion(&self, motion: &Motion) -> String {
        let mut words: Vec<String> = Vec::with_capacity(5);
        match motion.mode {
            Some(MotionMode::Rapid) => words.push("G00".to_string()),
            Some(MotionMode::Linear) => words.push("G01".to_string()),
            None => {}
        }
        if let Some(x) = motion.x {
            words.push(format!("X{}", format_number(x)));
        }
        if let Some(z) = motion.z {
            words.push(format!("Z{}", format_number(z)));
        }
        if let Some(f) = motion.feed {
            words.push(format!("F{}", format_number(f)));
        }
        if let Some(marker) = motion.marker {
            words.push(marker.to_string());
        }
        words.join(" ")
    }
}

/// Parentheses inside a comment would end it early
fn sanitize_comment(text: &str) -> String {
    text.replace(['(', ')'], "").to_uppercase()
}
