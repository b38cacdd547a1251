use ky_roi::SamplingPlan;
use serde::{Deserialize, Serialize};

pub fn kymograph_name(source_name: &str) -> String {
    format!("{source_name}_kymograph")
}

pub fn kymograph_description(image_id: i64, plan: &SamplingPlan, line_width: usize) -> String {
    format!(
        "Kymograph generated from Image ID: {image_id}, {}: {}\n\
         with each timepoint being {line_width} vertical pixels",
        plan.kind, plan.first_shape
    )
}

/// Timing and calibration the source image can report about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCalibration {
    /// Delta-T (seconds) recorded on the last timepoint's plane.
    #[serde(default)]
    pub last_plane_delta_t: Option<f64>,
    /// Nominal interval between timepoints, in seconds.
    #[serde(default)]
    pub time_increment: Option<f64>,
    /// Physical X pixel size, in micrometers.
    #[serde(default)]
    pub physical_size_x: Option<f64>,
}

impl SourceCalibration {
    /// Seconds between timepoints, preferring per-plane timing.
    pub fn time_interval(&self, size_t: usize, fallback: Option<f64>) -> Option<f64> {
        if let Some(duration) = self.last_plane_delta_t {
            return Some(if size_t <= 1 {
                duration
            } else {
                duration / (size_t - 1) as f64
            });
        }
        self.time_increment.or(fallback)
    }
}

/// Physical pixel sizes of an assembled kymograph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KymographCalibration {
    /// Spatial size along the line (micrometers), carried from the source.
    pub pixel_size_x: Option<f64>,
    /// Time covered by one vertical pixel: interval / line width.
    pub pixel_size_y: Option<f64>,
}

impl KymographCalibration {
    pub fn derive(
        source: &SourceCalibration,
        size_t: usize,
        line_width: usize,
        fallback_time_increment: Option<f64>,
        fallback_pixel_size: Option<f64>,
    ) -> Self {
        let interval = source.time_interval(size_t, fallback_time_increment);
        Self {
            pixel_size_x: source.physical_size_x.or(fallback_pixel_size),
            pixel_size_y: interval.map(|dt| dt / line_width.max(1) as f64),
        }
    }

    pub fn is_known(&self) -> bool {
        self.pixel_size_x.is_some() || self.pixel_size_y.is_some()
    }
}
