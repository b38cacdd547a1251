use core::iter::FusedIterator;

use ky_core::{Error, Image, Pixel, Result};
use ky_line::{LineSampler, PixelSource, PlaneIndex, Rotator};
use ky_roi::SamplingPlan;
use tracing::{debug, warn};

use crate::reconcile::{RowPolicy, StripReconciler};

/// One kymograph plane, in the working type of the source pixels.
pub type Plane<S> = Image<<<S as PixelSource>::Pixel as Pixel>::Work>;

/// Builds kymograph planes, one per channel, from a sampling plan.
///
/// Rows appear in ascending timepoint order; each row is `line_width` pixels
/// tall.
pub struct KymographAssembler<'a, S, R> {
    source: &'a S,
    sampler: &'a LineSampler<R>,
    plan: &'a SamplingPlan,
    size_c: usize,
    line_width: usize,
}

impl<'a, S: PixelSource, R: Rotator> KymographAssembler<'a, S, R> {
    pub fn new(
        source: &'a S,
        sampler: &'a LineSampler<R>,
        plan: &'a SamplingPlan,
        size_c: usize,
        line_width: usize,
    ) -> Result<Self> {
        if line_width == 0 {
            return Err(Error::InvalidLineWidth(line_width));
        }
        Ok(Self {
            source,
            sampler,
            plan,
            size_c,
            line_width,
        })
    }

    pub fn size_c(&self) -> usize {
        self.size_c
    }

    pub fn plan(&self) -> &SamplingPlan {
        self.plan
    }

    pub fn build_channel(&self, c: usize) -> Result<Plane<S>> {
        let mut rows = StripReconciler::new(RowPolicy::for_kind(self.plan.kind));

        for row in &self.plan.rows {
            let plane = PlaneIndex {
                z: row.z,
                c,
                t: row.t,
            };
            let mut strips = Vec::with_capacity(row.segments.len());
            for seg in &row.segments {
                match self.sampler.sample(self.source, plane, *seg, self.line_width) {
                    Ok(strip) => strips.push(strip),
                    Err(err @ Error::DegenerateSegment { .. }) => {
                        warn!(t = row.t, c, %err, "segment skipped");
                    }
                    Err(err) => return Err(err),
                }
            }
            if strips.is_empty() {
                warn!(t = row.t, c, "no samplable segment, timepoint skipped");
                continue;
            }
            rows.push_row(strips)?;
        }

        debug!(c, rows = rows.len(), "channel sampled");
        rows.finish()?.ok_or(Error::EmptyKymograph { channel: c })
    }

    /// Lazy channel-ordered plane sequence. Planes are built on demand.
    pub fn planes(self) -> PlaneSequence<'a, S, R> {
        PlaneSequence {
            assembler: self,
            next_c: 0,
        }
    }
}

/// Single-pass iterator over kymograph planes `C0..Cn-1`.
pub struct PlaneSequence<'a, S, R> {
    assembler: KymographAssembler<'a, S, R>,
    next_c: usize,
}

impl<S: PixelSource, R: Rotator> Iterator for PlaneSequence<'_, S, R> {
    type Item = Result<Plane<S>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_c >= self.assembler.size_c {
            return None;
        }
        let c = self.next_c;
        self.next_c += 1;
        Some(self.assembler.build_channel(c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.assembler.size_c - self.next_c;
        (left, Some(left))
    }
}

impl<S: PixelSource, R: Rotator> ExactSizeIterator for PlaneSequence<'_, S, R> {}

impl<S: PixelSource, R: Rotator> FusedIterator for PlaneSequence<'_, S, R> {}
