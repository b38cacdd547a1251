//! ROI shapes and the per-timepoint sampling schedule derived from them.
//!
//! Scheduling rules:
//! - Shapes of one ROI are split into a line schedule and a polyline
//!   schedule, each keyed by timepoint. Lines win when both are present.
//! - The lowest timepoint carrying a shape holds the canonical first shape.
//! - With "use all timepoints" (implied when only one shape exists) every
//!   timepoint gets a row, reusing the most recent shape. Otherwise only
//!   timepoints with their own shape are sampled.

mod points;
mod schedule;
mod shape;

pub use points::parse_points;
pub use schedule::{PlannedRow, RoiShapes, SamplingPlan, ShapeSchedule};
pub use shape::{
    LineShape, PolylineShape, RoiRecord, Shape, ShapeGeometry, ShapeKind, ShapeRecord,
};
