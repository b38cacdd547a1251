//! Kymographs from time-lapse images along line and polyline ROIs.
//!
//! A kymograph stacks, one timepoint per band, the pixels sampled along a
//! path drawn on a movie. Each band is `line_width` pixels tall; the band's
//! width is the path length.
//!
//! Building blocks are re-exported from the member crates:
//! - [`LineSampler`] cuts oriented strips out of a plane.
//! - [`RoiShapes`] turns ROI records into a [`SamplingPlan`].
//! - [`KymographAssembler`] reconciles strips into one plane per channel.
//!
//! [`process_images`] drives a whole batch against caller-provided
//! collaborators ([`SourceImage`], [`RoiSource`], [`ImageSink`]).
//! In-memory implementations live in [`memory`].
//!
//! ```
//! use kymograph::memory::{MemoryImage, MemoryPixels, MemoryRois, MemorySink};
//! use kymograph::{KymographParams, RoiRecord, ShapeGeometry, ShapeRecord, process_images};
//! use kymograph::Image;
//!
//! let frames = (0..3u16).map(|t| Image::new_fill(32, 32, t + 1)).collect();
//! let pixels = MemoryPixels::from_channels(vec![frames]).unwrap();
//! let image = MemoryImage::new(1, "movie", pixels);
//!
//! let mut rois = MemoryRois::new();
//! rois.insert(1, RoiRecord {
//!     id: 10,
//!     shapes: vec![ShapeRecord {
//!         z: None,
//!         t: Some(0),
//!         geometry: ShapeGeometry::Line { x1: 4.0, y1: 4.0, x2: 4.0, y2: 24.0 },
//!     }],
//! });
//!
//! let mut sink = MemorySink::new();
//! let report = process_images(&[image], &rois, &mut sink, &KymographParams::default()).unwrap();
//! assert_eq!(report.message, "New kymograph created: movie_kymograph.");
//! assert_eq!(report.created[0].planes[0].shape(), (12, 20));
//! ```

mod batch;
pub mod memory;
mod params;

pub use batch::{
    BatchReport, ChannelInfo, ImageSink, KymographHandle, NewImage, RoiSource, SourceImage,
    process_images,
};
pub use params::KymographParams;

pub use ky_build::{
    KymographAssembler, KymographCalibration, Plane, PlaneSequence, RowPolicy,
    SourceCalibration, StripReconciler, kymograph_description, kymograph_name,
};
pub use ky_core::{Error, Image, ImageView, Pixel, Point2f, Polyline2f, Result, Segment2f};
pub use ky_line::{
    AffineRotator, CropRect, Interpolation, LineSampler, PixelSource, PlaneIndex, Rotator,
    Strip, TileRect,
};
pub use ky_roi::{
    PlannedRow, RoiRecord, RoiShapes, SamplingPlan, ShapeGeometry, ShapeKind, ShapeRecord,
    ShapeSchedule, parse_points,
};
