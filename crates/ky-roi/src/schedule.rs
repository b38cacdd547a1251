use std::collections::BTreeMap;

use ky_core::{Error, Point2f, Polyline2f, Result, Segment2f};
use tracing::warn;

use crate::points::parse_points;
use crate::shape::{LineShape, PolylineShape, Shape, ShapeGeometry, ShapeKind, ShapeRecord};

/// Sparse timepoint -> shape mapping. Iteration is in ascending timepoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSchedule<S> {
    entries: BTreeMap<usize, S>,
}

impl<S> Default for ShapeSchedule<S> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<S> ShapeSchedule<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same timepoint replace earlier ones.
    pub fn insert(&mut self, t: usize, shape: S) {
        self.entries.insert(t, shape);
    }

    pub fn get(&self, t: usize) -> Option<&S> {
        self.entries.get(&t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &S)> {
        self.entries.iter().map(|(&t, s)| (t, s))
    }

    /// The canonical first shape: lowest timepoint below `size_t`.
    pub fn first_within(&self, size_t: usize) -> Option<(usize, &S)> {
        self.entries.range(..size_t).next().map(|(&t, s)| (t, s))
    }

    /// A lone shape is reused for every timepoint regardless of `requested`.
    pub fn use_all_timepoints(&self, requested: bool) -> bool {
        requested || self.entries.len() == 1
    }

    /// Resolves the shape governing each emitted timepoint, ascending.
    ///
    /// With `use_all`, timepoints without an entry reuse the most recent
    /// shape (the first shape before any entry). Without it, they are
    /// skipped.
    pub fn resolve(&self, size_t: usize, use_all: bool) -> Vec<(usize, &S)> {
        let Some((_, first)) = self.first_within(size_t) else {
            return Vec::new();
        };

        let mut current = first;
        let mut out = Vec::with_capacity(if use_all { size_t } else { self.len() });
        for t in 0..size_t {
            if let Some(shape) = self.entries.get(&t) {
                current = shape;
            } else if !use_all {
                continue;
            }
            out.push((t, current));
        }
        out
    }
}

/// Line and polyline shapes of one ROI, each keyed by timepoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoiShapes {
    pub lines: ShapeSchedule<LineShape>,
    pub polylines: ShapeSchedule<PolylineShape>,
}

impl RoiShapes {
    /// Partitions raw records. Unparseable polylines are logged and dropped;
    /// other shape kinds are ignored.
    pub fn from_records(records: &[ShapeRecord]) -> Self {
        let mut out = Self::default();
        for rec in records {
            let z = rec.z.unwrap_or(0);
            let t = rec.t.unwrap_or(0);
            match &rec.geometry {
                ShapeGeometry::Line { x1, y1, x2, y2 } => {
                    out.lines.insert(
                        t,
                        LineShape::new(z, Point2f::new(*x1, *y1), Point2f::new(*x2, *y2)),
                    );
                }
                ShapeGeometry::Polyline { points } => match parse_points(points) {
                    Ok(points) if points.len() >= 2 => {
                        out.polylines.insert(
                            t,
                            PolylineShape {
                                z,
                                polyline: Polyline2f::new(points),
                            },
                        );
                    }
                    Ok(_) => warn!(t, "polyline with fewer than two points ignored"),
                    Err(err) => warn!(t, %err, "polyline ignored"),
                },
                ShapeGeometry::Other => {}
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.polylines.is_empty()
    }

    /// Plans sampling from lines when there are any, otherwise polylines.
    pub fn plan(&self, size_t: usize, use_all_requested: bool) -> Option<Result<SamplingPlan>> {
        if !self.lines.is_empty() {
            Some(SamplingPlan::from_schedule(&self.lines, size_t, use_all_requested))
        } else if !self.polylines.is_empty() {
            Some(SamplingPlan::from_schedule(
                &self.polylines,
                size_t,
                use_all_requested,
            ))
        } else {
            None
        }
    }
}

/// Segments to sample for one output row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRow {
    pub t: usize,
    pub z: usize,
    pub segments: Vec<Segment2f>,
}

/// Row-by-row sampling schedule, identical for every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingPlan {
    pub kind: ShapeKind,
    pub use_all_timepoints: bool,
    pub first_t: usize,
    /// Human-readable geometry of the canonical first shape.
    pub first_shape: String,
    pub rows: Vec<PlannedRow>,
}

impl SamplingPlan {
    pub fn from_schedule<S: Shape>(
        schedule: &ShapeSchedule<S>,
        size_t: usize,
        use_all_requested: bool,
    ) -> Result<Self> {
        let (first_t, first) = schedule
            .first_within(size_t)
            .ok_or(Error::NoShapes { size_t })?;
        let use_all = schedule.use_all_timepoints(use_all_requested);

        let rows = schedule
            .resolve(size_t, use_all)
            .into_iter()
            .map(|(t, shape)| PlannedRow {
                t,
                z: shape.z(),
                segments: shape.segments(),
            })
            .collect();

        Ok(Self {
            kind: S::KIND,
            use_all_timepoints: use_all,
            first_t,
            first_shape: first.to_string(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use ky_core::{Error, Point2f};

    use super::{RoiShapes, ShapeSchedule};
    use crate::shape::{LineShape, ShapeGeometry, ShapeKind, ShapeRecord};

    fn line_at(x: f32) -> LineShape {
        LineShape::new(0, Point2f::new(x, 0.0), Point2f::new(x, 10.0))
    }

    fn line_record(t: Option<usize>, x: f32) -> ShapeRecord {
        ShapeRecord {
            z: None,
            t,
            geometry: ShapeGeometry::Line {
                x1: x,
                y1: 0.0,
                x2: x,
                y2: 10.0,
            },
        }
    }

    #[test]
    fn sparse_shapes_fill_forward_when_using_all_timepoints() {
        let mut sched = ShapeSchedule::new();
        sched.insert(0, line_at(1.0));
        sched.insert(3, line_at(2.0));

        let rows = sched.resolve(5, true);
        let xs: Vec<(usize, f32)> = rows
            .iter()
            .map(|(t, s)| (*t, s.segment.p1.x))
            .collect();
        assert_eq!(xs, vec![(0, 1.0), (1, 1.0), (2, 1.0), (3, 2.0), (4, 2.0)]);
    }

    #[test]
    fn sparse_shapes_only_emit_their_own_timepoints() {
        let mut sched = ShapeSchedule::new();
        sched.insert(0, line_at(1.0));
        sched.insert(3, line_at(2.0));

        assert!(!sched.use_all_timepoints(false));
        let ts: Vec<usize> = sched.resolve(5, false).iter().map(|(t, _)| *t).collect();
        assert_eq!(ts, vec![0, 3]);
    }

    #[test]
    fn first_shape_is_reused_before_its_timepoint() {
        let mut sched = ShapeSchedule::new();
        sched.insert(2, line_at(4.0));

        assert!(sched.use_all_timepoints(false));
        let rows = sched.resolve(4, sched.use_all_timepoints(false));
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|(_, s)| s.segment.p1.x == 4.0));
    }

    #[test]
    fn shapes_past_the_last_timepoint_are_ignored() {
        let mut sched = ShapeSchedule::new();
        sched.insert(7, line_at(1.0));
        assert!(sched.first_within(5).is_none());
        assert!(sched.resolve(5, true).is_empty());
    }

    #[test]
    fn records_partition_into_lines_and_polylines() {
        let records = vec![
            line_record(Some(1), 3.0),
            line_record(Some(1), 5.0),
            line_record(None, 9.0),
            ShapeRecord {
                z: Some(2),
                t: Some(0),
                geometry: ShapeGeometry::Polyline {
                    points: "points[0,0, 10,0, 10,10]".into(),
                },
            },
            ShapeRecord {
                z: None,
                t: Some(1),
                geometry: ShapeGeometry::Polyline {
                    points: "garbage".into(),
                },
            },
            ShapeRecord {
                z: None,
                t: Some(2),
                geometry: ShapeGeometry::Other,
            },
        ];
        let shapes = RoiShapes::from_records(&records);

        assert_eq!(shapes.lines.len(), 2);
        assert_eq!(shapes.lines.get(1).map(|l| l.segment.p1.x), Some(5.0));
        assert_eq!(shapes.lines.get(0).map(|l| l.segment.p1.x), Some(9.0));
        assert_eq!(shapes.polylines.len(), 1);
        assert_eq!(shapes.polylines.get(0).map(|p| p.z), Some(2));
    }

    #[test]
    fn plan_prefers_lines_over_polylines() {
        let records = vec![
            line_record(Some(0), 3.0),
            ShapeRecord {
                z: None,
                t: Some(0),
                geometry: ShapeGeometry::Polyline {
                    points: "points[0,0, 10,0, 10,10]".into(),
                },
            },
        ];
        let plan = RoiShapes::from_records(&records)
            .plan(3, false)
            .expect("shapes present")
            .expect("plan");

        assert_eq!(plan.kind, ShapeKind::Line);
        assert!(plan.use_all_timepoints);
        assert_eq!(plan.rows.len(), 3);
        assert_eq!(plan.first_shape, "(3, 0) -> (3, 10), z=0");
    }

    #[test]
    fn polyline_plan_lists_segments_in_point_order() {
        let records = vec![ShapeRecord {
            z: Some(1),
            t: Some(0),
            geometry: ShapeGeometry::Polyline {
                points: "points[0,0, 10,0, 10,10]".into(),
            },
        }];
        let plan = RoiShapes::from_records(&records)
            .plan(2, false)
            .expect("shapes present")
            .expect("plan");

        assert_eq!(plan.kind, ShapeKind::Polyline);
        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.rows[0].z, 1);
        assert_eq!(plan.rows[0].segments.len(), 2);
        assert_eq!(plan.rows[0].segments[1].p2, Point2f::new(10.0, 10.0));
    }

    #[test]
    fn plan_without_shapes_in_range_fails() {
        let shapes = RoiShapes::from_records(&[line_record(Some(9), 1.0)]);
        let err = shapes.plan(4, true).expect("shapes present").unwrap_err();
        assert_eq!(err, Error::NoShapes { size_t: 4 });
        assert!(RoiShapes::default().plan(4, true).is_none());
    }
}
