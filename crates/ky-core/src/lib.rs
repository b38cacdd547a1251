//! Foundational primitives for kymograph extraction.
//!
//! ## Images and Stride
//! Images use element stride (not byte stride). `stride` is the distance, in
//! elements, between adjacent row starts and may be greater than `width`.
//! Borrowed views can therefore describe tiles inside a larger plane.
//!
//! ## Pixel Types
//! [`Pixel`] covers the integer and float types planes are delivered in.
//! Each type names the working type used once data has been resampled; see
//! [`Pixel::Work`].
//!
//! ## Sampling Coordinates
//! Sampling uses pixel-center coordinates where integer coordinates refer to
//! pixel centers. Nearest-neighbor uses round-to-nearest integer indices;
//! bilinear and bicubic use floor-based 2x2 and 4x4 neighborhoods. Positions
//! past an edge repeat the edge pixel.

mod error;
mod geom;
mod image;
mod pixel;
mod sample;

pub use error::{Error, Result};
pub use geom::{Point2f, Polyline2f, Segment2f, Vec2f};
pub use image::{Image, ImageView};
pub use pixel::Pixel;
pub use sample::{sample_bicubic_f32, sample_bilinear_f32, sample_nearest};
