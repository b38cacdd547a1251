use core::f64::consts::FRAC_PI_2;

use ky_core::{Error, Image, Pixel, Result, Segment2f};
use tracing::debug;

use crate::rotate::{AffineRotator, CropRect, Rotator};

/// Plane coordinates within a 5-D (X, Y, Z, C, T) pixel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlaneIndex {
    pub z: usize,
    pub c: usize,
    pub t: usize,
}

/// Axis-aligned rectangle fully inside the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Supplier of raw planar pixel data.
///
/// Requested rectangles always lie inside `size_x() x size_y()`; clipping is
/// done by the caller. Fetch failures are reported as [`Error::Remote`].
pub trait PixelSource {
    type Pixel: Pixel;

    fn size_x(&self) -> usize;
    fn size_y(&self) -> usize;
    fn tile(&self, plane: PlaneIndex, rect: TileRect) -> Result<Image<Self::Pixel>>;
}

impl<S: PixelSource + ?Sized> PixelSource for &S {
    type Pixel = S::Pixel;

    fn size_x(&self) -> usize {
        (**self).size_x()
    }

    fn size_y(&self) -> usize {
        (**self).size_y()
    }

    fn tile(&self, plane: PlaneIndex, rect: TileRect) -> Result<Image<Self::Pixel>> {
        (**self).tile(plane, rect)
    }
}

/// Sampled strip: `width` rows by segment-length columns, in the working
/// type of the source pixels.
pub type Strip<P> = Image<<P as Pixel>::Work>;

/// Pixel extents `[left, right) x [top, bottom)`, possibly outside the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Bounds {
    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left).max(0) as usize
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top).max(0) as usize
    }

    /// Part of `self` inside a `size_x` x `size_y` plane, if any.
    pub fn clip(&self, size_x: usize, size_y: usize) -> Option<TileRect> {
        let x0 = self.left.clamp(0, size_x as i64);
        let x1 = self.right.clamp(0, size_x as i64);
        let y0 = self.top.clamp(0, size_y as i64);
        let y1 = self.bottom.clamp(0, size_y as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(TileRect {
            x: x0 as usize,
            y: y0 as usize,
            width: (x1 - x0) as usize,
            height: (y1 - y0) as usize,
        })
    }
}

/// Everything needed to cut one strip, derived from the segment alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    /// Angle of the segment from the vertical, `atan(dx / dy)`, in radians.
    pub theta: f64,
    /// Counter-clockwise rotation bringing `p1` to the left of `p2`.
    pub rotation_deg: f64,
    pub bounds: Bounds,
    pub length: usize,
}

impl LineGeometry {
    pub fn new(seg: &Segment2f, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidLineWidth(width));
        }
        if seg.is_degenerate() {
            return Err(Error::DegenerateSegment {
                x1: seg.p1.x,
                y1: seg.p1.y,
                x2: seg.p2.x,
                y2: seg.p2.y,
            });
        }

        let d = seg.delta();
        let (dx, dy) = (d.x as f64, d.y as f64);

        // A horizontal segment is a right angle from the vertical; resolve it
        // exactly instead of dividing by zero.
        let (theta, sin, cos, rotation_deg) = if dy == 0.0 {
            let s = dx.signum();
            (s * FRAC_PI_2, s, 0.0, if dx > 0.0 { 0.0 } else { 180.0 })
        } else {
            let theta = (dx / dy).atan();
            let mut rotation = 90.0 - theta.to_degrees();
            if dy < 0.0 {
                rotation += 180.0;
            }
            (theta, theta.sin(), theta.cos(), rotation)
        };

        let w = width as f64;
        let (x1, y1) = (seg.p1.x as f64, seg.p1.y as f64);
        let (x2, y2) = (seg.p2.x as f64, seg.p2.y as f64);

        let extra_h = (sin * w).abs();
        let extra_w = (cos * w).abs();
        let bounds = Bounds {
            left: (x1.min(x2) - extra_w) as i64,
            top: (y1.min(y2) - extra_h / 2.0) as i64,
            right: (x1.max(x2) + extra_w) as i64,
            bottom: (y1.max(y2) + extra_h / 2.0) as i64,
        };

        Ok(Self {
            theta,
            rotation_deg,
            bounds,
            length: seg.pixel_length(),
        })
    }
}

/// Extracts oriented fixed-width strips along segments of a plane.
#[derive(Debug, Clone, Default)]
pub struct LineSampler<R = AffineRotator> {
    rotator: R,
}

impl<R: Rotator> LineSampler<R> {
    pub fn new(rotator: R) -> Self {
        Self { rotator }
    }

    pub fn rotator(&self) -> &R {
        &self.rotator
    }

    /// Samples a `width`-row strip running from `seg.p1` (left) to `seg.p2`.
    ///
    /// The segment may extend past the plane; missing pixels are zero.
    pub fn sample<S: PixelSource>(
        &self,
        source: &S,
        plane: PlaneIndex,
        seg: Segment2f,
        width: usize,
    ) -> Result<Strip<S::Pixel>> {
        let geom = LineGeometry::new(&seg, width)?;
        debug!(
            ?plane,
            p1 = %seg.p1,
            p2 = %seg.p2,
            rotation = geom.rotation_deg,
            length = geom.length,
            "sampling strip"
        );

        let region = fetch_padded(source, plane, geom.bounds)?.widen();
        let rotated = self
            .rotator
            .rotate(&region.as_view(), geom.rotation_deg, true);

        let (rot_w, rot_h) = (rotated.width() as isize, rotated.height() as isize);
        let rect = CropRect {
            x: (rot_w - geom.length as isize).div_euclid(2),
            y: (rot_h - width as isize).div_euclid(2),
            width: geom.length,
            height: width,
        };
        Ok(self.rotator.crop(&rotated.as_view(), rect))
    }
}

/// Reads `bounds` from the plane, zero-filling whatever lies outside it.
fn fetch_padded<S: PixelSource>(
    source: &S,
    plane: PlaneIndex,
    bounds: Bounds,
) -> Result<Image<S::Pixel>> {
    let (width, height) = (bounds.width(), bounds.height());
    let elem = size_of::<S::Pixel>().max(size_of::<<S::Pixel as Pixel>::Work>());
    let bytes = width.checked_mul(height).and_then(|n| n.checked_mul(elem));
    if bytes.is_none_or(|b| b > isize::MAX as usize) {
        return Err(Error::SizeMismatch {
            expected: usize::MAX,
            actual: width,
        });
    }
    let mut region = Image::zeros(width, height);
    if let Some(rect) = bounds.clip(source.size_x(), source.size_y()) {
        let tile = source.tile(plane, rect)?;
        if tile.shape() != (rect.height, rect.width) {
            return Err(Error::SizeMismatch {
                expected: rect.width * rect.height,
                actual: tile.data().len(),
            });
        }
        region.blit(
            &tile.as_view(),
            (rect.x as i64 - bounds.left) as isize,
            (rect.y as i64 - bounds.top) as isize,
        );
    }
    Ok(region)
}
