//! Program model
//!
//! Generators build a [`Program`] out of named [`Section`]s, each a list of
//! [`Block`]s. Nothing here knows about text; the emitter renders it.

use serde::{Deserialize, Serialize};
use spacerkit_core::PCode;
use std::fmt;

/// Named program section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Program start, number and title
    Header,
    /// Op1 pilot drill
    Op1Drill,
    /// Op1 boring
    Op1Bore,
    /// Op1 facing and OD profile
    Op1Turn,
    /// Operator flips the part
    Flip,
    /// Op2 facing and hub turning
    Op2Turn,
    /// Op2 chamfer or ring pocket
    Op2Chamfer,
    /// Program end
    Footer,
}

impl SectionKind {
    /// Standard section order
    pub fn standard_order() -> &'static [SectionKind] {
        &[
            SectionKind::Header,
            SectionKind::Op1Drill,
            SectionKind::Op1Bore,
            SectionKind::Op1Turn,
            SectionKind::Flip,
            SectionKind::Op2Turn,
            SectionKind::Op2Chamfer,
            SectionKind::Footer,
        ]
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Op1Drill => write!(f, "op1-drill"),
            Self::Op1Bore => write!(f, "op1-bore"),
            Self::Op1Turn => write!(f, "op1-turn"),
            Self::Flip => write!(f, "flip"),
            Self::Op2Turn => write!(f, "op2-turn"),
            Self::Op2Chamfer => write!(f, "op2-chamfer"),
            Self::Footer => write!(f, "footer"),
        }
    }
}

/// Motion word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    /// G00
    Rapid,
    /// G01
    Linear,
}

/// Semantic marker comment on a motion line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiameterMarker {
    /// `(X IS CB)`
    CenterBore,
    /// `(X IS OB)`
    OuterBore,
}

impl fmt::Display for DiameterMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CenterBore => write!(f, "(X IS CB)"),
            Self::OuterBore => write!(f, "(X IS OB)"),
        }
    }
}

/// One motion line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Explicit motion word, `None` to inherit
    pub mode: Option<MotionMode>,
    /// X (diameter)
    pub x: Option<f64>,
    /// Z
    pub z: Option<f64>,
    /// Feed, in/rev
    pub feed: Option<f64>,
    /// Marker comment
    pub marker: Option<DiameterMarker>,
}

impl Motion {
    /// Rapid move
    pub fn rapid() -> Self {
        Self {
            mode: Some(MotionMode::Rapid),
            x: None,
            z: None,
            feed: None,
            marker: None,
        }
    }

    /// Linear feed move
    pub fn linear(feed: f64) -> Self {
        Self {
            mode: Some(MotionMode::Linear),
            x: None,
            z: None,
            feed: Some(feed),
            marker: None,
        }
    }

    /// Set X
    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    /// Set Z
    pub fn z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Attach a marker comment
    pub fn marked(mut self, marker: DiameterMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Whether the move feeds (G01)
    pub fn is_feed(&self) -> bool {
        self.mode == Some(MotionMode::Linear)
    }
}

/// One program line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// `%`
    Percent,
    /// `O#### (title)`
    ProgramNumber {
        /// O-number
        number: u32,
        /// Title comment
        title: String,
    },
    /// `(comment)`
    Comment(String),
    /// `T### (comment)`
    ToolChange {
        /// Turret station
        tool: u16,
        /// Tool comment
        comment: String,
    },
    /// `G50 S..` followed by `G96 S.. M03`
    ConstantSurfaceSpeed {
        /// RPM ceiling
        max_rpm: u32,
        /// Surface speed
        css: u32,
    },
    /// `G97 S.. M03`
    FixedRpm(u32),
    /// `G154 P#`
    WorkOffset(PCode),
    /// `M08`
    CoolantOn,
    /// `M09`
    CoolantOff,
    /// Motion line
    Motion(Motion),
    /// `G00 G53 X.. Z..`
    MachineHome {
        /// Machine X
        x: f64,
        /// Machine Z
        z: f64,
    },
    /// `M00` with an optional operator message
    ProgramStop(Option<String>),
    /// `M01`
    OptionalStop,
    /// `M30`
    ProgramEnd,
}

/// A named run of blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section name
    pub kind: SectionKind,
    /// Lines in order
    pub blocks: Vec<Block>,
}

impl Section {
    /// Empty section
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
        }
    }

    /// Append a block
    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Append a motion line
    pub fn motion(&mut self, motion: Motion) -> &mut Self {
        self.push(Block::Motion(motion))
    }

    /// Motion lines in order
    pub fn motions(&self) -> impl Iterator<Item = &Motion> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Motion(m) => Some(m),
            _ => None,
        })
    }

    /// Deepest Z reached by any motion in the section
    pub fn deepest_z(&self) -> Option<f64> {
        self.motions()
            .filter_map(|m| m.z)
            .fold(None, |acc: Option<f64>, z| Some(acc.map_or(z, |a| a.min(z))))
    }

    /// Largest X reached by a feed move below `z_limit`
    pub fn max_feed_x_below(&self, z_limit: f64) -> Option<f64> {
        let mut x = None;
        let mut best: Option<f64> = None;
        for m in self.motions() {
            if let Some(nx) = m.x {
                x = Some(nx);
            }
            let below = m.z.is_some_and(|z| z < z_limit);
            if m.is_feed() && below {
                if let Some(cx) = x {
                    best = Some(best.map_or(cx, |b| b.max(cx)));
                }
            }
        }
        best
    }
}

/// A complete program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// O-number
    pub number: u32,
    /// Title
    pub title: String,
    /// Sections in output order
    pub sections: Vec<Section>,
}

impl Program {
    /// First section of a kind
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Section kinds in output order
    pub fn order(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepest_z() {
        let mut section = Section::new(SectionKind::Op2Turn);
        section
            .motion(Motion::rapid().x(7.1).z(0.2))
            .motion(Motion::linear(0.01).z(-0.2))
            .motion(Motion::linear(0.01).z(-0.5));
        assert_eq!(section.deepest_z(), Some(-0.5));
        assert_eq!(Section::new(SectionKind::Header).deepest_z(), None);
    }

    #[test]
    fn test_max_feed_x_below() {
        let mut section = Section::new(SectionKind::Op1Bore);
        section
            .motion(Motion::rapid().x(2.3).z(0.2))
            .motion(Motion::linear(0.01).z(-1.0))
            .motion(Motion::rapid().z(0.2))
            .motion(Motion::rapid().x(3.4))
            .motion(Motion::linear(0.01).z(-1.0));
        assert_eq!(section.max_feed_x_below(-0.2), Some(3.4));
    }
}
