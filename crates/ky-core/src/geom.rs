use core::fmt;
use core::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point2f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Sub<Point2f> for Point2f {
    type Output = Vec2f;

    fn sub(self, rhs: Point2f) -> Self::Output {
        Vec2f {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Directed straight segment from `p1` to `p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2f {
    pub p1: Point2f,
    pub p2: Point2f,
}

impl Segment2f {
    pub const fn new(p1: Point2f, p2: Point2f) -> Self {
        Self { p1, p2 }
    }

    pub fn delta(&self) -> Vec2f {
        self.p2 - self.p1
    }

    /// Whole-pixel length, truncated towards zero.
    pub fn pixel_length(&self) -> usize {
        let d = self.delta();
        let (dx, dy) = (d.x as f64, d.y as f64);
        (dx * dx + dy * dy).sqrt() as usize
    }

    pub fn is_degenerate(&self) -> bool {
        self.p1 == self.p2
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline2f {
    pub points: Vec<Point2f>,
}

impl Polyline2f {
    pub fn new(points: Vec<Point2f>) -> Self {
        Self { points }
    }

    /// Consecutive point pairs, in point order.
    pub fn segments(&self) -> impl Iterator<Item = Segment2f> + '_ {
        self.points.windows(2).map(|w| Segment2f::new(w[0], w[1]))
    }
}

impl fmt::Display for Polyline2f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::{Point2f, Polyline2f, Segment2f, Vec2f};

    #[test]
    fn point_difference_is_a_vector() {
        let p = Point2f::new(2.0, 3.0);
        assert_eq!(p - Point2f::new(1.0, 1.0), Vec2f { x: 1.0, y: 2.0 });

        let s = Segment2f::new(Point2f::new(4.0, 1.0), p);
        assert_eq!(s.delta(), Vec2f { x: -2.0, y: 2.0 });
    }

    #[test]
    fn segment_length_truncates() {
        let s = Segment2f::new(Point2f::new(0.0, 0.0), Point2f::new(3.0, 4.0));
        assert_eq!(s.pixel_length(), 5);

        let s = Segment2f::new(Point2f::new(0.0, 0.0), Point2f::new(1.0, 1.0));
        assert_eq!(s.pixel_length(), 1);
        assert!(!s.is_degenerate());
        assert!(Segment2f::new(s.p1, s.p1).is_degenerate());
    }

    #[test]
    fn polyline_segments_follow_point_order() {
        let pl = Polyline2f::new(vec![
            Point2f::new(0.0, 0.0),
            Point2f::new(10.0, 0.0),
            Point2f::new(10.0, 10.0),
        ]);
        let segs: Vec<_> = pl.segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].p1, Point2f::new(10.0, 0.0));
        assert_eq!(pl.to_string(), "[(0, 0), (10, 0), (10, 10)]");
    }
}
