use std::collections::HashMap;

use ky_build::{KymographCalibration, SourceCalibration};
use ky_core::{Error, Image, Pixel, Result};
use ky_line::{PixelSource, PlaneIndex, TileRect};
use ky_roi::RoiRecord;

use crate::batch::{ChannelInfo, ImageSink, KymographHandle, NewImage, RoiSource, SourceImage};

/// Owned 5-D pixel set with planes ordered Z, then C, then T.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPixels<P> {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    size_c: usize,
    size_t: usize,
    planes: Vec<Image<P>>,
}

impl<P: Pixel> MemoryPixels<P> {
    /// `planes[(z * size_c + c) * size_t + t]` holds plane `(z, c, t)`.
    pub fn new(size_z: usize, size_c: usize, size_t: usize, planes: Vec<Image<P>>) -> Result<Self> {
        let expected = size_z * size_c * size_t;
        if planes.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: planes.len(),
            });
        }
        let (size_x, size_y) = planes
            .first()
            .map_or((0, 0), |p| (p.width(), p.height()));
        if let Some(bad) = planes
            .iter()
            .find(|p| p.width() != size_x || p.height() != size_y)
        {
            return Err(Error::SizeMismatch {
                expected: size_x * size_y,
                actual: bad.width() * bad.height(),
            });
        }
        Ok(Self {
            size_x,
            size_y,
            size_z,
            size_c,
            size_t,
            planes,
        })
    }

    /// Single-Z pixel set from per-channel lists of timepoint planes.
    pub fn from_channels(channels: Vec<Vec<Image<P>>>) -> Result<Self> {
        let size_c = channels.len();
        let size_t = channels.first().map_or(0, Vec::len);
        if let Some(bad) = channels.iter().find(|frames| frames.len() != size_t) {
            return Err(Error::SizeMismatch {
                expected: size_t,
                actual: bad.len(),
            });
        }
        Self::new(1, size_c, size_t, channels.into_iter().flatten().collect())
    }

    pub fn size_z(&self) -> usize {
        self.size_z
    }

    pub fn size_c(&self) -> usize {
        self.size_c
    }

    pub fn size_t(&self) -> usize {
        self.size_t
    }

    pub fn plane(&self, index: PlaneIndex) -> Option<&Image<P>> {
        if index.z >= self.size_z || index.c >= self.size_c || index.t >= self.size_t {
            return None;
        }
        self.planes
            .get((index.z * self.size_c + index.c) * self.size_t + index.t)
    }
}

impl<P: Pixel> PixelSource for MemoryPixels<P> {
    type Pixel = P;

    fn size_x(&self) -> usize {
        self.size_x
    }

    fn size_y(&self) -> usize {
        self.size_y
    }

    fn tile(&self, plane: PlaneIndex, rect: TileRect) -> Result<Image<P>> {
        let src = self.plane(plane).ok_or_else(|| {
            Error::remote(format!(
                "no plane z={} c={} t={}",
                plane.z, plane.c, plane.t
            ))
        })?;
        Ok(src
            .as_view()
            .subview(rect.x, rect.y, rect.width, rect.height)?
            .to_image())
    }
}

/// In-memory source image.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryImage<P> {
    pub id: i64,
    pub name: String,
    pub channels: Vec<ChannelInfo>,
    pub calibration: SourceCalibration,
    pub pixels: MemoryPixels<P>,
}

impl<P: Pixel> MemoryImage<P> {
    /// Unlabelled channels, no calibration.
    pub fn new(id: i64, name: impl Into<String>, pixels: MemoryPixels<P>) -> Self {
        Self {
            id,
            name: name.into(),
            channels: vec![ChannelInfo::default(); pixels.size_c()],
            calibration: SourceCalibration::default(),
            pixels,
        }
    }
}

impl<P: Pixel> SourceImage for MemoryImage<P> {
    type Pixels = MemoryPixels<P>;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn size_c(&self) -> usize {
        self.pixels.size_c()
    }

    fn size_t(&self) -> usize {
        self.pixels.size_t()
    }

    fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    fn calibration(&self) -> SourceCalibration {
        self.calibration
    }

    fn pixels(&self) -> &MemoryPixels<P> {
        &self.pixels
    }
}

/// ROIs keyed by image id. Images can be marked as failing lookups.
#[derive(Debug, Clone, Default)]
pub struct MemoryRois {
    rois: HashMap<i64, Vec<RoiRecord>>,
    failing: HashMap<i64, String>,
}

impl MemoryRois {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image_id: i64, roi: RoiRecord) {
        self.rois.entry(image_id).or_default().push(roi);
    }

    pub fn fail_for(&mut self, image_id: i64, message: impl Into<String>) {
        self.failing.insert(image_id, message.into());
    }
}

impl RoiSource for MemoryRois {
    fn find_shapes_for_image(&self, image_id: i64) -> Result<Vec<RoiRecord>> {
        if let Some(message) = self.failing.get(&image_id) {
            return Err(Error::remote(message.clone()));
        }
        Ok(self.rois.get(&image_id).cloned().unwrap_or_default())
    }
}

/// Kymograph collected by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryKymograph<P> {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub source_image_id: i64,
    pub planes: Vec<Image<P>>,
    pub channels: Vec<ChannelInfo>,
    pub calibration: KymographCalibration,
}

impl<P> KymographHandle for MemoryKymograph<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_channel(&mut self, c: usize, info: &ChannelInfo) -> Result<()> {
        let slot = self.channels.get_mut(c).ok_or(Error::OutOfBounds)?;
        *slot = info.clone();
        Ok(())
    }

    fn set_pixel_sizes(&mut self, calibration: &KymographCalibration) -> Result<()> {
        self.calibration = *calibration;
        Ok(())
    }
}

/// Sink that keeps kymographs in memory, numbering them from 1.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    created: i64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> i64 {
        self.created
    }
}

impl<P: Pixel> ImageSink<P> for MemorySink {
    type Handle = MemoryKymograph<P>;

    fn create_image<I>(&mut self, planes: I, request: &NewImage) -> Result<MemoryKymograph<P>>
    where
        I: Iterator<Item = Result<Image<P>>>,
    {
        let planes = planes.collect::<Result<Vec<_>>>()?;
        if planes.len() != request.size_c {
            return Err(Error::SizeMismatch {
                expected: request.size_c,
                actual: planes.len(),
            });
        }
        self.created += 1;
        Ok(MemoryKymograph {
            id: self.created,
            name: request.name.clone(),
            description: request.description.clone(),
            source_image_id: request.source_image_id,
            channels: vec![ChannelInfo::default(); planes.len()],
            planes,
            calibration: KymographCalibration::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use ky_core::{Error, Image};
    use ky_line::{PixelSource, PlaneIndex, TileRect};

    use super::{MemoryPixels, MemoryRois};
    use crate::batch::RoiSource;

    fn ramp(v: u8) -> Image<u8> {
        Image::from_vec(3, 2, (0..6).map(|i| i + v).collect()).expect("valid")
    }

    #[test]
    fn planes_are_addressed_by_channel_and_time() {
        let px = MemoryPixels::from_channels(vec![vec![ramp(0), ramp(10)], vec![ramp(20), ramp(30)]])
            .expect("pixels");
        assert_eq!((px.size_z(), px.size_c(), px.size_t()), (1, 2, 2));

        let tile = px
            .tile(
                PlaneIndex { z: 0, c: 1, t: 0 },
                TileRect {
                    x: 1,
                    y: 1,
                    width: 2,
                    height: 1,
                },
            )
            .expect("tile");
        assert_eq!(tile.data(), &[24, 25]);
    }

    #[test]
    fn bad_requests_are_errors() {
        let px = MemoryPixels::from_channels(vec![vec![ramp(0)]]).expect("pixels");
        let whole = TileRect {
            x: 0,
            y: 0,
            width: 3,
            height: 2,
        };
        assert!(matches!(
            px.tile(PlaneIndex { z: 0, c: 0, t: 1 }, whole),
            Err(Error::Remote(_))
        ));
        let past = TileRect { x: 2, ..whole };
        assert_eq!(
            px.tile(PlaneIndex::default(), past).unwrap_err(),
            Error::OutOfBounds
        );
        assert!(MemoryPixels::from_channels(vec![vec![ramp(0)], vec![]]).is_err());
    }

    #[test]
    fn failing_roi_lookups_surface_as_remote_errors() {
        let mut rois = MemoryRois::new();
        rois.fail_for(7, "connection reset");
        assert_eq!(
            rois.find_shapes_for_image(7).unwrap_err(),
            Error::remote("connection reset")
        );
        assert!(rois.find_shapes_for_image(8).expect("empty").is_empty());
    }
}
