//! Modal-state simulator
//!
//! Replays motion-mode semantics line by line. A motion word sets the state;
//! a line without one inherits it, exactly as the controller does. Tool
//! changes and machine-coordinate moves reset tracking.
//!
//! The state machine is a pure function ([`transition`]) over a named state
//! enum, so the inheritance rule can be tested on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tokenizer::{MotionWord, TokenizedLine};

/// Motion mode in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionState {
    /// Nothing established yet, or reset
    #[default]
    Unknown,
    /// G00
    Rapid,
    /// G01
    Linear,
    /// G02/G03
    Arc,
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Rapid => write!(f, "rapid"),
            Self::Linear => write!(f, "linear-feed"),
            Self::Arc => write!(f, "arc"),
        }
    }
}

/// What a line does to the motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    /// G53 machine-coordinate move
    MachineCoordinates,
    /// T word
    ToolChange,
    /// Explicit motion word
    Motion(MotionWord),
    /// No motion word; the state is inherited
    Inherit,
}

impl ModalEvent {
    /// Classify a line. Machine coordinates win over a tool change, which
    /// wins over a motion word.
    pub fn of(line: &TokenizedLine) -> Self {
        if line.is_machine_coordinates() {
            Self::MachineCoordinates
        } else if line.tool().is_some() {
            Self::ToolChange
        } else if let Some(word) = line.motion_word() {
            Self::Motion(word)
        } else {
            Self::Inherit
        }
    }
}

/// Transition table of the motion-mode machine
pub fn transition(state: MotionState, event: ModalEvent) -> MotionState {
    match (state, event) {
        (_, ModalEvent::MachineCoordinates) => MotionState::Unknown,
        (_, ModalEvent::ToolChange) => MotionState::Unknown,
        (_, ModalEvent::Motion(MotionWord::Rapid)) => MotionState::Rapid,
        (_, ModalEvent::Motion(MotionWord::Linear)) => MotionState::Linear,
        (_, ModalEvent::Motion(MotionWord::ArcCw | MotionWord::ArcCcw)) => MotionState::Arc,
        (current, ModalEvent::Inherit) => current,
    }
}

/// Scan state carried between lines
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModalState {
    /// Motion mode
    pub motion: MotionState,
    /// Active tool
    pub tool: Option<u32>,
    /// Last tracked X (diameter)
    pub x: Option<f64>,
    /// Last tracked Z
    pub z: Option<f64>,
    /// Last F word seen
    pub feed: Option<f64>,
    /// Whether the last line was a machine-coordinate move
    pub machine_coordinates: bool,
}

/// Effect of one line on the scan state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStep {
    /// Event the line produced
    pub event: ModalEvent,
    /// State before the line
    pub before: ModalState,
    /// State after the line
    pub after: ModalState,
}

impl LineStep {
    /// Motion mode the line executes in
    pub fn motion(&self) -> MotionState {
        self.after.motion
    }

    /// Whether the mode came from an earlier line
    pub fn is_inherited(&self) -> bool {
        self.event == ModalEvent::Inherit
    }

    /// Whether the line is a feed move (G01 in effect and an axis word)
    pub fn is_feed_move(&self, line: &TokenizedLine) -> bool {
        self.after.motion == MotionState::Linear
            && !self.after.machine_coordinates
            && line.has_axis()
    }

    /// Whether the line moves X and Z together away from the tracked
    /// position
    pub fn is_diagonal(&self, line: &TokenizedLine) -> bool {
        let moved = |new: Option<f64>, old: Option<f64>| match (new, old) {
            (Some(n), Some(o)) => (n - o).abs() > 1e-9,
            (Some(_), None) => true,
            _ => false,
        };
        moved(line.x(), self.before.x) && moved(line.z(), self.before.z)
    }
}

impl ModalState {
    /// Apply one line and return the step
    pub fn apply(&mut self, line: &TokenizedLine) -> LineStep {
        let before = *self;
        let event = ModalEvent::of(line);
        self.motion = transition(self.motion, event);
        self.machine_coordinates = event == ModalEvent::MachineCoordinates;

        match event {
            ModalEvent::MachineCoordinates => {}
            ModalEvent::ToolChange => {
                self.tool = line.tool();
                self.x = None;
                self.z = None;
            }
            ModalEvent::Motion(_) | ModalEvent::Inherit => {
                if let Some(x) = line.x() {
                    self.x = Some(x);
                }
                if let Some(z) = line.z() {
                    self.z = Some(z);
                }
            }
        }
        if let Some(f) = line.feed() {
            self.feed = Some(f);
        }

        LineStep {
            event,
            before,
            after: *self,
        }
    }
}

/// Runs the state machine over a whole program
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalStateSimulator;

impl ModalStateSimulator {
    /// Create a new simulator
    pub fn new() -> Self {
        Self
    }

    /// One step per line, in order
    pub fn run(&self, lines: &[TokenizedLine]) -> Vec<LineStep> {
        let mut state = ModalState::default();
        lines.iter().map(|line| state.apply(line)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_transition_table() {
        use MotionState::*;
        assert_eq!(transition(Unknown, ModalEvent::Motion(MotionWord::Rapid)), Rapid);
        assert_eq!(transition(Rapid, ModalEvent::Inherit), Rapid);
        assert_eq!(transition(Linear, ModalEvent::Inherit), Linear);
        assert_eq!(transition(Rapid, ModalEvent::Motion(MotionWord::ArcCcw)), Arc);
        assert_eq!(transition(Linear, ModalEvent::ToolChange), Unknown);
        assert_eq!(transition(Rapid, ModalEvent::MachineCoordinates), Unknown);
    }

    #[test]
    fn test_inheritance_and_reset() {
        let lines = tokenize("G00 X3. Z0.2\nZ-0.09\nG00 G53 X-1. Z-11.\nT303 (TURN)\nX2.");
        let steps = ModalStateSimulator::new().run(&lines);

        assert_eq!(steps[1].motion(), MotionState::Rapid);
        assert!(steps[1].is_inherited());
        assert_eq!(steps[1].before.z, Some(0.2));
        assert_eq!(steps[1].after.z, Some(-0.09));

        assert_eq!(steps[2].motion(), MotionState::Unknown);
        assert_eq!(steps[2].after.z, Some(-0.09));

        assert_eq!(steps[3].after.tool, Some(303));
        assert_eq!(steps[3].after.z, None);
        assert_eq!(steps[4].motion(), MotionState::Unknown);
    }

    #[test]
    fn test_diagonal() {
        let lines = tokenize("G00 X3.7 Z0.2\nG01 Z0. F0.004\nG01 X3.4 Z-0.15 F0.004\nG01 X3.4 Z-1. F0.01");
        let steps = ModalStateSimulator::new().run(&lines);
        assert!(!steps[1].is_diagonal(&lines[1]));
        assert!(steps[2].is_diagonal(&lines[2]));
        assert!(!steps[3].is_diagonal(&lines[3]));
        assert!(steps[3].is_feed_move(&lines[3]));
    }
}
