//! Feeds and speeds
//!
//! Two sources: curated values that are known to run well on the floor,
//! banded by round size and thickness, and a surface-speed formula. Either
//! way the result is clamped to the lathe's spindle ceilings, so the
//! calculator always returns something runnable.

use serde::{Deserialize, Serialize};
use spacerkit_core::{FeedMode, LatheSpec, PartSpec, SpacerType};
use std::f64::consts::PI;
use std::fmt;

/// Lowest spindle speed the formula will produce
pub const MIN_RPM: u32 = 400;

const THIN_LIP_FEED_FACTOR: f64 = 0.7;
const THIN_LIP_RPM_FACTOR: f64 = 0.9;

/// Machining operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Pilot drilling
    Drill,
    /// Boring
    Bore,
    /// Op1 facing and OD profile
    TurnOp1,
    /// Op2 facing and hub turning
    TurnOp2,
    /// Edge chamfers
    Chamfer,
}

impl Operation {
    /// Get all operations
    pub fn all() -> &'static [Operation] {
        &[
            Operation::Drill,
            Operation::Bore,
            Operation::TurnOp1,
            Operation::TurnOp2,
            Operation::Chamfer,
        ]
    }

    /// Surface speed used by the formula, ft/min
    pub fn surface_speed(&self) -> f64 {
        match self {
            Self::Drill => 300.0,
            Self::Bore => 600.0,
            Self::TurnOp1 | Self::TurnOp2 => 750.0,
            Self::Chamfer => 500.0,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drill => write!(f, "drill"),
            Self::Bore => write!(f, "bore"),
            Self::TurnOp1 => write!(f, "turn-op1"),
            Self::TurnOp2 => write!(f, "turn-op2"),
            Self::Chamfer => write!(f, "chamfer"),
        }
    }
}

/// Spindle setup for one operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpindleParams {
    /// G50 ceiling
    pub max_rpm: u32,
    /// Running RPM (fixed-RPM operations, or the RPM at the cut diameter)
    pub rpm: u32,
    /// Constant surface speed; `None` means fixed RPM (G97)
    pub css: Option<u32>,
}

/// Feed rates, inches per revolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedRates {
    /// Roughing feed
    pub rough: f64,
    /// Finishing feed
    pub finish: f64,
    /// Chamfer feed
    pub chamfer: f64,
}

/// Spindle and feeds for one operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuttingParams {
    /// Spindle setup
    pub spindle: SpindleParams,
    /// Feed rates
    pub feeds: FeedRates,
}

impl CuttingParams {
    /// Scale feeds and speeds by the given factors
    pub fn scaled(&self, feed_factor: f64, rpm_factor: f64) -> Self {
        Self {
            spindle: SpindleParams {
                max_rpm: self.spindle.max_rpm,
                rpm: scale_u32(self.spindle.rpm, rpm_factor),
                css: self.spindle.css.map(|c| scale_u32(c, rpm_factor)),
            },
            feeds: FeedRates {
                rough: round_feed(self.feeds.rough * feed_factor),
                finish: round_feed(self.feeds.finish * feed_factor),
                chamfer: round_feed(self.feeds.chamfer * feed_factor),
            },
        }
    }

    /// Clamp spindle values to the lathe ceilings
    pub fn clamped_to(&self, lathe: &LatheSpec) -> Self {
        let max_rpm = self.spindle.max_rpm.min(lathe.max_rpm);
        Self {
            spindle: SpindleParams {
                max_rpm,
                rpm: self.spindle.rpm.min(max_rpm),
                css: self.spindle.css.map(|c| c.min(lathe.max_css)),
            },
            feeds: self.feeds,
        }
    }
}

fn scale_u32(value: u32, factor: f64) -> u32 {
    (value as f64 * factor).round() as u32
}

fn round_feed(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Round-size band used by the proven values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundBand {
    Small,
    Medium,
    Large,
}

impl RoundBand {
    fn of(round_size: f64) -> Self {
        if round_size <= 6.5 {
            Self::Small
        } else if round_size <= 8.5 {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// Feeds and speeds for one part on one lathe
#[derive(Debug, Clone)]
pub struct FeedsSpeedsCalculator<'a> {
    lathe: &'a LatheSpec,
    mode: FeedMode,
    round_size: f64,
    thickness: f64,
    thin_lip: bool,
}

impl<'a> FeedsSpeedsCalculator<'a> {
    /// Calculator for a part on its lathe
    pub fn new(lathe: &'a LatheSpec, spec: &PartSpec) -> Self {
        Self {
            lathe,
            mode: spec.feed_mode,
            round_size: spec.round_size,
            thickness: spec.total_height(),
            thin_lip: spec.spacer_type() == SpacerType::ThinLip,
        }
    }

    /// Calculator from raw values
    pub fn with_values(
        lathe: &'a LatheSpec,
        mode: FeedMode,
        round_size: f64,
        thickness: f64,
        thin_lip: bool,
    ) -> Self {
        Self {
            lathe,
            mode,
            round_size,
            thickness,
            thin_lip,
        }
    }

    /// Feed/speed source in use
    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    /// Parameters for an operation cutting at `diameter` down to `depth`
    /// (depth as a positive length)
    pub fn calculate(&self, operation: Operation, diameter: f64, depth: f64) -> CuttingParams {
        let base = match self.mode {
            FeedMode::Proven => self.proven(operation, diameter),
            FeedMode::Calculated => self.calculated(operation, diameter, depth.abs()),
        };
        self.finish(base)
    }

    /// Apply the thin-lip reduction and the machine ceilings to any
    /// parameters, including ones taken from a template
    pub fn finish(&self, params: CuttingParams) -> CuttingParams {
        let params = if self.thin_lip {
            params.scaled(THIN_LIP_FEED_FACTOR, THIN_LIP_RPM_FACTOR)
        } else {
            params
        };
        params.clamped_to(self.lathe)
    }

    fn proven(&self, operation: Operation, diameter: f64) -> CuttingParams {
        let band = RoundBand::of(self.round_size);
        let heavy = self.thickness > 2.0;

        let (max_rpm, css, rough, finish, chamfer) = match (operation, band) {
            (Operation::Drill, RoundBand::Small) => (1200, None, 0.008, 0.008, 0.008),
            (Operation::Drill, RoundBand::Medium) => (1000, None, 0.008, 0.008, 0.008),
            (Operation::Drill, RoundBand::Large) => (800, None, 0.007, 0.007, 0.007),
            (Operation::Bore, RoundBand::Small) => (2500, Some(600), 0.012, 0.006, 0.004),
            (Operation::Bore, RoundBand::Medium) => (2000, Some(550), 0.010, 0.005, 0.004),
            (Operation::Bore, RoundBand::Large) => (1600, Some(500), 0.009, 0.005, 0.004),
            (Operation::TurnOp1 | Operation::TurnOp2, RoundBand::Small) => {
                (2500, Some(750), 0.013, 0.008, 0.004)
            }
            (Operation::TurnOp1 | Operation::TurnOp2, RoundBand::Medium) => {
                (2000, Some(700), 0.012, 0.007, 0.004)
            }
            (Operation::TurnOp1 | Operation::TurnOp2, RoundBand::Large) => {
                (1600, Some(650), 0.010, 0.006, 0.004)
            }
            (Operation::Chamfer, RoundBand::Small) => (2500, Some(500), 0.006, 0.004, 0.004),
            (Operation::Chamfer, RoundBand::Medium) => (2000, Some(450), 0.006, 0.004, 0.004),
            (Operation::Chamfer, RoundBand::Large) => (1600, Some(400), 0.005, 0.004, 0.004),
        };
        let rough = if heavy { round_feed(rough * 0.85) } else { rough };

        let rpm = match css {
            Some(css) => rpm_for(css as f64, diameter, max_rpm),
            None => max_rpm,
        };
        CuttingParams {
            spindle: SpindleParams { max_rpm, rpm, css },
            feeds: FeedRates {
                rough,
                finish,
                chamfer,
            },
        }
    }

    fn calculated(&self, operation: Operation, diameter: f64, depth: f64) -> CuttingParams {
        let sfm = operation.surface_speed();
        let ceiling = self.lathe.max_rpm;
        let rpm = rpm_for(sfm, diameter, ceiling);

        let (rough, finish, chamfer) = match operation {
            Operation::Drill => (0.008, 0.008, 0.008),
            Operation::Bore => (0.010, 0.005, 0.004),
            Operation::TurnOp1 | Operation::TurnOp2 => (0.012, 0.007, 0.004),
            Operation::Chamfer => (0.006, 0.004, 0.004),
        };
        let depth_factor = if depth > 2.0 {
            0.8
        } else if depth > 1.25 {
            0.9
        } else {
            1.0
        };

        let css = match operation {
            Operation::Drill => None,
            _ => Some(sfm.round() as u32),
        };
        CuttingParams {
            spindle: SpindleParams {
                max_rpm: ceiling,
                rpm,
                css,
            },
            feeds: FeedRates {
                rough: round_feed(rough * depth_factor),
                finish: round_feed(finish * depth_factor),
                chamfer,
            },
        }
    }
}

/// `min(ceiling, max(400, sfm * 12 / (pi * d)))`
pub fn rpm_for(sfm: f64, diameter: f64, ceiling: u32) -> u32 {
    if diameter <= 0.0 {
        return ceiling;
    }
    let rpm = (sfm * 12.0 / (PI * diameter)).round() as u32;
    rpm.max(MIN_RPM).min(ceiling)
}
