use ky_core::{Error, Image, Pixel, Result};
use ky_roi::ShapeKind;

/// How rows of differing length are brought to a common width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPolicy {
    /// Every row is padded or cropped on the right to the first row's width.
    MatchFirst,
    /// Every row is padded on the right to the widest row.
    PadToLongest,
}

impl RowPolicy {
    pub fn for_kind(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Line => Self::MatchFirst,
            ShapeKind::Polyline => Self::PadToLongest,
        }
    }
}

/// Right-pads with zero columns or crops to exactly `length` columns.
pub fn fit_to_length<P: Pixel>(strip: Image<P>, length: usize) -> Image<P> {
    if strip.width() == length {
        return strip;
    }
    let mut out = Image::zeros(length, strip.height());
    out.blit(&strip.as_view(), 0, 0);
    out
}

/// Joins strips left to right. All strips must share one height.
pub fn hconcat<P: Pixel>(strips: &[Image<P>]) -> Result<Image<P>> {
    let Some(first) = strips.first() else {
        return Ok(Image::zeros(0, 0));
    };
    if strips.len() == 1 {
        return Ok(first.clone());
    }

    let height = first.height();
    let mut width = 0usize;
    for s in strips {
        if s.height() != height {
            return Err(Error::SizeMismatch {
                expected: height,
                actual: s.height(),
            });
        }
        width += s.width();
    }

    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for s in strips {
            data.extend_from_slice(s.row(y));
        }
    }
    Image::from_vec(width, height, data)
}

/// Stacks rows top to bottom. All rows must share one width.
pub fn vstack<P: Pixel>(rows: &[Image<P>]) -> Result<Image<P>> {
    let width = rows.first().map_or(0, Image::width);
    let mut height = 0usize;
    for r in rows {
        if r.width() != width {
            return Err(Error::SizeMismatch {
                expected: width,
                actual: r.width(),
            });
        }
        height += r.height();
    }

    let mut data = Vec::with_capacity(width * height);
    for r in rows {
        data.extend_from_slice(r.data());
    }
    Image::from_vec(width, height, data)
}

/// Accumulates one channel's rows and reconciles their lengths.
#[derive(Debug, Clone)]
pub struct StripReconciler<P> {
    policy: RowPolicy,
    reference: Option<usize>,
    rows: Vec<Image<P>>,
}

impl<P: Pixel> StripReconciler<P> {
    pub fn new(policy: RowPolicy) -> Self {
        Self {
            policy,
            reference: None,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds the next row, given as its segment strips in path order.
    pub fn push_row(&mut self, segments: Vec<Image<P>>) -> Result<()> {
        let row = match <[Image<P>; 1]>::try_from(segments) {
            Ok([only]) => only,
            Err(segments) => hconcat(&segments)?,
        };

        let row = match self.policy {
            RowPolicy::MatchFirst => {
                let reference = *self.reference.get_or_insert(row.width());
                fit_to_length(row, reference)
            }
            RowPolicy::PadToLongest => row,
        };
        self.rows.push(row);
        Ok(())
    }

    /// Reconciled plane, or `None` when no row was pushed.
    pub fn finish(self) -> Result<Option<Image<P>>> {
        if self.rows.is_empty() {
            return Ok(None);
        }

        let rows = match self.policy {
            RowPolicy::MatchFirst => self.rows,
            RowPolicy::PadToLongest => {
                let longest = self.rows.iter().map(Image::width).max().unwrap_or(0);
                self.rows
                    .into_iter()
                    .map(|r| fit_to_length(r, longest))
                    .collect()
            }
        };
        vstack(&rows).map(Some)
    }
}
