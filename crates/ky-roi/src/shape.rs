use core::fmt;

use ky_core::{Point2f, Polyline2f, Segment2f};
use serde::{Deserialize, Serialize};

/// Raw shape record as delivered by a ROI service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// Missing plane indices mean 0.
    #[serde(default)]
    pub z: Option<usize>,
    #[serde(default)]
    pub t: Option<usize>,
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeGeometry {
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Points in the `points[x,y, x,y, ...]` text form.
    Polyline { points: String },
    /// Any other ROI shape (rectangles, labels, ...); ignored.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    pub id: i64,
    #[serde(default)]
    pub shapes: Vec<ShapeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Polyline,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Line => "line",
            Self::Polyline => "polyline",
        })
    }
}

/// A shape the kymograph can be sampled along.
pub trait Shape: fmt::Display {
    const KIND: ShapeKind;

    fn z(&self) -> usize;

    /// Segments to sample, left to right in the output row.
    fn segments(&self) -> Vec<Segment2f>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineShape {
    pub z: usize,
    pub segment: Segment2f,
}

impl LineShape {
    pub fn new(z: usize, p1: Point2f, p2: Point2f) -> Self {
        Self {
            z,
            segment: Segment2f::new(p1, p2),
        }
    }
}

impl Shape for LineShape {
    const KIND: ShapeKind = ShapeKind::Line;

    fn z(&self) -> usize {
        self.z
    }

    fn segments(&self) -> Vec<Segment2f> {
        vec![self.segment]
    }
}

impl fmt::Display for LineShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}, z={}",
            self.segment.p1, self.segment.p2, self.z
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineShape {
    pub z: usize,
    pub polyline: Polyline2f,
}

impl Shape for PolylineShape {
    const KIND: ShapeKind = ShapeKind::Polyline;

    fn z(&self) -> usize {
        self.z
    }

    fn segments(&self) -> Vec<Segment2f> {
        self.polyline.segments().collect()
    }
}

impl fmt::Display for PolylineShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, z={}", self.polyline, self.z)
    }
}

#[cfg(test)]
mod tests {
    use ky_core::{Point2f, Polyline2f};

    use super::{LineShape, PolylineShape, RoiRecord, Shape, ShapeGeometry};

    #[test]
    fn records_deserialize_from_tagged_json() {
        let json = r#"{
            "id": 7,
            "shapes": [
                {"kind": "line", "t": 2, "x1": 1, "y1": 2, "x2": 3, "y2": 4},
                {"kind": "polyline", "z": 1, "points": "points[0,0, 5,5]"},
                {"kind": "rectangle", "x": 0, "y": 0}
            ]
        }"#;
        let roi: RoiRecord = serde_json::from_str(json).expect("valid roi json");

        assert_eq!(roi.id, 7);
        assert_eq!(roi.shapes.len(), 3);
        assert_eq!(roi.shapes[0].t, Some(2));
        assert_eq!(roi.shapes[0].z, None);
        assert_eq!(
            roi.shapes[0].geometry,
            ShapeGeometry::Line {
                x1: 1.0,
                y1: 2.0,
                x2: 3.0,
                y2: 4.0
            }
        );
        assert_eq!(roi.shapes[2].geometry, ShapeGeometry::Other);
    }

    #[test]
    fn shapes_describe_their_geometry() {
        let line = LineShape::new(0, Point2f::new(10.0, 10.0), Point2f::new(10.0, 50.0));
        assert_eq!(line.to_string(), "(10, 10) -> (10, 50), z=0");
        assert_eq!(line.segments().len(), 1);

        let pl = PolylineShape {
            z: 2,
            polyline: Polyline2f::new(vec![Point2f::new(0.0, 0.0), Point2f::new(4.0, 0.0)]),
        };
        assert_eq!(pl.to_string(), "[(0, 0), (4, 0)], z=2");
    }
}
