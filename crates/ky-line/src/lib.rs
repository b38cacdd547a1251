//! Oriented strip sampling along straight segments of an image plane.
//!
//! Sampling strategy:
//! - Derive an axis-aligned region covering the segment plus a margin of the
//!   requested strip width on every side.
//! - Fetch the part of that region inside the plane from a [`PixelSource`]
//!   and zero-pad the rest.
//! - Rotate the region so the segment runs horizontally with its first point
//!   on the left, then crop a `width x length` window around the center.
//!
//! Rotation is delegated to a [`Rotator`]. [`AffineRotator`] is the default
//! and performs quarter turns exactly.

mod rotate;
mod sampler;

pub use rotate::{AffineRotator, CropRect, Interpolation, Rotator};
pub use sampler::{
    Bounds, LineGeometry, LineSampler, PixelSource, PlaneIndex, Strip, TileRect,
};
