use ky_build::{
    KymographAssembler, KymographCalibration, SourceCalibration, kymograph_description,
    kymograph_name,
};
use ky_core::{Error, Image, Pixel, Result};
use ky_line::{AffineRotator, LineSampler, PixelSource};
use ky_roi::{RoiRecord, RoiShapes, SamplingPlan};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::params::KymographParams;

/// Display metadata of one channel, carried from source to kymograph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

/// A time-lapse image the batch can read from.
pub trait SourceImage {
    type Pixels: PixelSource;

    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn size_c(&self) -> usize;
    fn size_t(&self) -> usize;
    fn channels(&self) -> &[ChannelInfo];
    fn calibration(&self) -> SourceCalibration;
    fn pixels(&self) -> &Self::Pixels;
}

/// Supplier of the ROIs drawn on an image.
pub trait RoiSource {
    fn find_shapes_for_image(&self, image_id: i64) -> Result<Vec<RoiRecord>>;
}

/// A created kymograph image whose metadata can still be edited.
pub trait KymographHandle {
    fn name(&self) -> &str;
    fn set_channel(&mut self, c: usize, info: &ChannelInfo) -> Result<()>;
    fn set_pixel_sizes(&mut self, calibration: &KymographCalibration) -> Result<()>;
}

/// Attributes of a kymograph about to be persisted. Kymographs always have
/// a single Z and a single T.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub name: String,
    pub description: String,
    pub size_c: usize,
    pub source_image_id: i64,
}

/// Destination for assembled kymographs with planes of type `P`.
pub trait ImageSink<P: Pixel> {
    type Handle: KymographHandle;

    /// Consumes `planes` in channel order. The first failed plane aborts
    /// creation.
    fn create_image<I>(&mut self, planes: I, request: &NewImage) -> Result<Self::Handle>
    where
        I: Iterator<Item = Result<Image<P>>>;
}

/// Outcome of a batch: created images plus one line per failure.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<H> {
    pub created: Vec<H>,
    pub failures: Vec<String>,
    pub message: String,
}

impl<H> BatchReport<H> {
    fn new() -> Self {
        Self {
            created: Vec::new(),
            failures: Vec::new(),
            message: String::new(),
        }
    }

    fn fail(&mut self, image_id: i64, err: impl core::fmt::Display) {
        self.failures.push(format!("Image {image_id}: {err}"));
    }
}

impl<H: KymographHandle> BatchReport<H> {
    fn summarize(&mut self) {
        let mut message = match self.created.as_slice() {
            [] => "No kymograph created. See 'Error' or 'Info' for details.".to_string(),
            [one] => format!("New kymograph created: {}.", one.name()),
            many => format!("{} new kymographs created.", many.len()),
        };
        for failure in &self.failures {
            message.push('\n');
            message.push_str(failure);
        }
        self.message = message;
    }
}

type PlanePixel<I> = <<<I as SourceImage>::Pixels as PixelSource>::Pixel as Pixel>::Work;

/// Builds one kymograph per line or polyline ROI of every image.
///
/// Failures are collected per image and per ROI; the batch never stops
/// early. A pixel source failure ends work on the current image only.
/// Only invalid `params` fail the call itself.
pub fn process_images<I, R, K>(
    images: &[I],
    rois: &R,
    sink: &mut K,
    params: &KymographParams,
) -> Result<BatchReport<K::Handle>>
where
    I: SourceImage,
    R: RoiSource,
    K: ImageSink<PlanePixel<I>>,
{
    params.validate()?;
    let sampler = LineSampler::new(AffineRotator::new(params.interpolation));
    let mut report = BatchReport::new();

    let mut candidates = Vec::with_capacity(images.len());
    let mut lookup_failures = 0usize;
    for image in images {
        match rois.find_shapes_for_image(image.id()) {
            Ok(records) => {
                let shapes: Vec<(i64, RoiShapes)> = records
                    .iter()
                    .map(|roi| (roi.id, RoiShapes::from_records(&roi.shapes)))
                    .collect();
                if shapes.iter().any(|(_, s)| !s.is_empty()) {
                    candidates.push((image, shapes));
                } else {
                    info!(image_id = image.id(), "image has no line or polyline ROI");
                    report.fail(image.id(), "no ROI containing line or polyline");
                }
            }
            Err(err) => {
                warn!(image_id = image.id(), %err, "ROI lookup failed");
                report.fail(image.id(), err);
                lookup_failures += 1;
            }
        }
    }

    if candidates.is_empty() && lookup_failures == 0 {
        report.message = "No ROI containing line or polyline was found.".to_string();
        return Ok(report);
    }

    for (image, shapes) in candidates {
        process_image(image, &shapes, &sampler, sink, params, &mut report);
    }

    info!(
        created = report.created.len(),
        failures = report.failures.len(),
        "batch finished"
    );
    report.summarize();
    Ok(report)
}

#[instrument(skip_all, fields(image_id = image.id(), size_t = image.size_t()))]
fn process_image<I, K>(
    image: &I,
    rois: &[(i64, RoiShapes)],
    sampler: &LineSampler<AffineRotator>,
    sink: &mut K,
    params: &KymographParams,
    report: &mut BatchReport<K::Handle>,
) where
    I: SourceImage,
    K: ImageSink<PlanePixel<I>>,
{
    let size_t = image.size_t();
    if size_t <= 1 {
        warn!("not a movie, cannot create kymograph");
        report.fail(image.id(), Error::NotTimeSeries { size_t });
        return;
    }

    let mut created = Vec::new();
    for (roi_id, shapes) in rois {
        let Some(plan) = shapes.plan(size_t, params.use_all_timepoints) else {
            info!(roi_id, "ROI had no lines or polylines");
            continue;
        };
        match plan.and_then(|plan| build_kymograph(image, &plan, sampler, sink, params)) {
            Ok(handle) => created.push(handle),
            Err(err @ Error::Remote(_)) => {
                warn!(roi_id, %err, "pixel source failed, image abandoned");
                report.fail(image.id(), err);
                report.created.append(&mut created);
                return;
            }
            Err(err) => {
                warn!(roi_id, %err, "kymograph not created");
                report
                    .failures
                    .push(format!("Image {} ROI {roi_id}: {err}", image.id()));
            }
        }
    }

    let calibration = KymographCalibration::derive(
        &image.calibration(),
        size_t,
        params.line_width,
        params.time_increment,
        params.pixel_size,
    );
    for handle in &mut created {
        if let Err(err) = apply_metadata(handle, image.channels(), &calibration) {
            warn!(name = handle.name(), %err, "metadata not applied");
            report.fail(image.id(), err);
        }
    }
    report.created.append(&mut created);
}

fn build_kymograph<I, K>(
    image: &I,
    plan: &SamplingPlan,
    sampler: &LineSampler<AffineRotator>,
    sink: &mut K,
    params: &KymographParams,
) -> Result<K::Handle>
where
    I: SourceImage,
    K: ImageSink<PlanePixel<I>>,
{
    let assembler = KymographAssembler::new(
        image.pixels(),
        sampler,
        plan,
        image.size_c(),
        params.line_width,
    )?;
    let request = NewImage {
        name: kymograph_name(image.name()),
        description: kymograph_description(image.id(), plan, params.line_width),
        size_c: image.size_c(),
        source_image_id: image.id(),
    };
    let handle = sink.create_image(assembler.planes(), &request)?;
    info!(name = handle.name(), kind = %plan.kind, rows = plan.rows.len(), "kymograph created");
    Ok(handle)
}

fn apply_metadata<H: KymographHandle>(
    handle: &mut H,
    channels: &[ChannelInfo],
    calibration: &KymographCalibration,
) -> Result<()> {
    for (c, info) in channels.iter().enumerate() {
        handle.set_channel(c, info)?;
    }
    if calibration.is_known() {
        handle.set_pixel_sizes(calibration)?;
    }
    Ok(())
}
