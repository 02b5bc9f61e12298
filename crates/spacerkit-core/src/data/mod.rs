//! Static shop data
//!
//! Lookup tables are built once per process and never mutated afterwards.

pub mod depths;
pub mod lathes;
pub mod pcodes;
pub mod standards;

pub use depths::{fallback_depths, DepthSource, DepthTable, Depths, FALLBACK_BREAKTHROUGH};
pub use lathes::{LatheClass, LatheConfig, LatheId, LatheMatch, LatheSpec, ToolAssignments};
pub use pcodes::{OpSide, PCode, PCodePair, PCodeTable};
pub use standards::{LatheStandard, PieceTypeRule, StandardsMatrix};
