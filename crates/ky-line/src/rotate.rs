use core::fmt;
use core::str::FromStr;

use ky_core::{Image, ImageView, Pixel, sample_bicubic_f32, sample_bilinear_f32, sample_nearest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    Bilinear,
    #[default]
    Bicubic,
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" => Ok(Self::Bilinear),
            "bicubic" => Ok(Self::Bicubic),
            other => Err(format!("unknown interpolation {other:?}")),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
        })
    }
}

/// Axis-aligned crop window. The origin may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: isize,
    pub y: isize,
    pub width: usize,
    pub height: usize,
}

/// Rotation and crop primitive the line sampler is built on.
pub trait Rotator {
    /// Rotates `src` counter-clockwise (y axis pointing down) about its
    /// center. With `expand` the output grows to hold the whole rotated
    /// input. Output pixels that map outside the input are zero.
    fn rotate<P: Pixel>(&self, src: &ImageView<'_, P>, degrees: f64, expand: bool) -> Image<P>;

    /// Returns exactly `rect`-sized output, zero where `rect` leaves `src`.
    fn crop<P: Pixel>(&self, src: &ImageView<'_, P>, rect: CropRect) -> Image<P> {
        let mut out = Image::zeros(rect.width, rect.height);
        out.blit(src, -rect.x, -rect.y);
        out
    }
}

/// Inverse-mapping affine rotator.
///
/// Quarter turns are exact transpositions; every other angle resamples each
/// output pixel center with the configured [`Interpolation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AffineRotator {
    pub interpolation: Interpolation,
}

impl AffineRotator {
    pub fn new(interpolation: Interpolation) -> Self {
        Self { interpolation }
    }
}

impl Rotator for AffineRotator {
    fn rotate<P: Pixel>(&self, src: &ImageView<'_, P>, degrees: f64, expand: bool) -> Image<P> {
        let angle = degrees.rem_euclid(360.0);
        let square = src.width() == src.height();

        if angle == 0.0 {
            return src.to_image();
        }
        if angle == 180.0 {
            return quarter_turns(src, 2);
        }
        if (angle == 90.0 || angle == 270.0) && (expand || square) {
            return quarter_turns(src, if angle == 90.0 { 1 } else { 3 });
        }

        let w = src.width() as f64;
        let h = src.height() as f64;
        let (cx, cy) = (w / 2.0, h / 2.0);

        // Output -> input mapping: [a b c; d e f].
        let rad = -angle.to_radians();
        let mut m = [
            round15(rad.cos()),
            round15(rad.sin()),
            0.0,
            round15(-rad.sin()),
            round15(rad.cos()),
            0.0,
        ];
        let (c, f) = apply(&m, -cx, -cy);
        m[2] = c + cx;
        m[5] = f + cy;

        let (mut out_w, mut out_h) = (src.width(), src.height());
        if expand {
            let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
            let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
            let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
            for (x, y) in corners {
                let (tx, ty) = apply(&m, x, y);
                min_x = min_x.min(tx);
                max_x = max_x.max(tx);
                min_y = min_y.min(ty);
                max_y = max_y.max(ty);
            }
            let nw = (max_x.ceil() - min_x.floor()).max(0.0);
            let nh = (max_y.ceil() - min_y.floor()).max(0.0);
            let (c, f) = apply(&m, -(nw - w) / 2.0, -(nh - h) / 2.0);
            m[2] = c;
            m[5] = f;
            out_w = nw as usize;
            out_h = nh as usize;
        }

        let mut out = Image::zeros(out_w, out_h);
        for oy in 0..out_h {
            let row = out.row_mut(oy);
            for (ox, px) in row.iter_mut().enumerate() {
                let (xin, yin) = apply(&m, ox as f64 + 0.5, oy as f64 + 0.5);
                if xin < 0.0 || xin >= w || yin < 0.0 || yin >= h {
                    continue;
                }
                *px = self.resample(src, (xin - 0.5) as f32, (yin - 0.5) as f32);
            }
        }
        out
    }
}

impl AffineRotator {
    #[inline]
    fn resample<P: Pixel>(&self, src: &ImageView<'_, P>, x: f32, y: f32) -> P {
        match self.interpolation {
            Interpolation::Nearest => sample_nearest(src, x, y),
            Interpolation::Bilinear => P::from_f32(sample_bilinear_f32(src, x, y)),
            Interpolation::Bicubic => P::from_f32(sample_bicubic_f32(src, x, y)),
        }
    }
}

#[inline]
fn apply(m: &[f64; 6], x: f64, y: f64) -> (f64, f64) {
    (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5])
}

#[inline]
fn round15(v: f64) -> f64 {
    (v * 1e15).round() / 1e15
}

/// Exact counter-clockwise rotation by `turns` x 90 degrees.
fn quarter_turns<P: Pixel>(src: &ImageView<'_, P>, turns: u8) -> Image<P> {
    let (w, h) = (src.width(), src.height());
    let (out_w, out_h) = if turns % 2 == 1 { (h, w) } else { (w, h) };
    let mut out = Image::zeros(out_w, out_h);

    for oy in 0..out_h {
        let row = out.row_mut(oy);
        for (ox, px) in row.iter_mut().enumerate() {
            let (sx, sy) = match turns {
                1 => (w - 1 - oy, ox),
                2 => (w - 1 - ox, h - 1 - oy),
                _ => (oy, h - 1 - ox),
            };
            // SAFETY: `(sx, sy)` is a permutation of in-bounds output indices.
            *px = unsafe { *src.get_unchecked(sx, sy) };
        }
    }
    out
}
