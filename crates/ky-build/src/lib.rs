//! Kymograph assembly from sampled strips.
//!
//! Row reconciliation:
//! - Line kymographs fix their width from the first sampled row; later rows
//!   are zero-padded or cropped on the right to match.
//! - Polyline rows are the left-to-right concatenation of their segment
//!   strips; all rows are then zero-padded on the right to the widest one.
//!
//! Planes are produced one per channel, in channel order, by a lazy
//! [`PlaneSequence`]. Each row of a plane is one timepoint, `line_width`
//! pixels tall.

mod assemble;
mod metadata;
mod reconcile;

pub use assemble::{KymographAssembler, Plane, PlaneSequence};
pub use metadata::{
    KymographCalibration, SourceCalibration, kymograph_description, kymograph_name,
};
pub use reconcile::{RowPolicy, StripReconciler, fit_to_length, hconcat, vstack};
