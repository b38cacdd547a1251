pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("out of bounds")]
    OutOfBounds,

    #[error("line width must be at least 1 pixel, got {0}")]
    InvalidLineWidth(usize),

    #[error("degenerate segment ({x1}, {y1}) -> ({x2}, {y2}) has zero length")]
    DegenerateSegment { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("unrecognised shape points string: {0:?}")]
    ShapeParse(String),

    #[error("no line or polyline shapes within the first {size_t} timepoints")]
    NoShapes { size_t: usize },

    #[error("image is not a time series (sizeT = {size_t})")]
    NotTimeSeries { size_t: usize },

    #[error("no kymograph rows could be sampled for channel {channel}")]
    EmptyKymograph { channel: usize },

    #[error("remote failure: {0}")]
    Remote(String),
}

impl Error {
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    pub fn shape_parse(raw: impl Into<String>) -> Self {
        Self::ShapeParse(raw.into())
    }
}
