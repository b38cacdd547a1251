use ky_core::{Error, Result};
use ky_line::Interpolation;
use serde::{Deserialize, Serialize};

/// User-facing knobs of a kymograph batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KymographParams {
    /// Strip thickness in pixels; each timepoint occupies this many rows.
    pub line_width: usize,
    /// Emit a row for every timepoint, reusing the most recent shape.
    pub use_all_timepoints: bool,
    /// Seconds between timepoints when the source carries no timing.
    pub time_increment: Option<f64>,
    /// Micrometers per pixel when the source carries no calibration.
    pub pixel_size: Option<f64>,
    pub interpolation: Interpolation,
}

impl Default for KymographParams {
    fn default() -> Self {
        Self {
            line_width: 4,
            use_all_timepoints: true,
            time_increment: None,
            pixel_size: None,
            interpolation: Interpolation::default(),
        }
    }
}

impl KymographParams {
    pub fn validate(&self) -> Result<()> {
        if self.line_width == 0 {
            return Err(Error::InvalidLineWidth(self.line_width));
        }
        Ok(())
    }
}
