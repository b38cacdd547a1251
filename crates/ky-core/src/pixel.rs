use core::fmt::Debug;

/// Scalar pixel type stored in an [`crate::Image`].
///
/// `Work` is the type strips are produced in once a plane has been rotated
/// and interpolated. 8-bit data keeps its own type, wider integer data is
/// widened to `i32`, and `f32` stays floating point.
pub trait Pixel: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    type Work: Pixel;

    fn to_f32(self) -> f32;

    /// Rounds to nearest and saturates into the representable range.
    fn from_f32(v: f32) -> Self;

    /// Converts into the working type, saturating values above its range.
    fn widen(self) -> Self::Work;
}

macro_rules! int_pixel {
    ($t:ty, $work:ty) => {
        impl Pixel for $t {
            type Work = $work;

            #[inline]
            fn to_f32(self) -> f32 {
                self as f32
            }

            #[inline]
            fn from_f32(v: f32) -> Self {
                // `as` saturates and maps NaN to zero.
                v.round() as $t
            }

            #[inline]
            fn widen(self) -> Self::Work {
                <$work>::try_from(self).unwrap_or(<$work>::MAX)
            }
        }
    };
}

int_pixel!(u8, u8);
int_pixel!(i8, i8);
int_pixel!(u16, i32);
int_pixel!(i16, i32);
int_pixel!(u32, i32);
int_pixel!(i32, i32);

impl Pixel for f32 {
    type Work = f32;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn widen(self) -> Self::Work {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Pixel;

    #[test]
    fn from_f32_rounds_and_saturates() {
        assert_eq!(u8::from_f32(12.4), 12);
        assert_eq!(u8::from_f32(12.6), 13);
        assert_eq!(u8::from_f32(-3.0), 0);
        assert_eq!(u8::from_f32(300.0), 255);
        assert_eq!(i32::from_f32(-7.5), -8);
        assert_eq!(u16::from_f32(f32::NAN), 0);
    }

    #[test]
    fn widening_follows_working_types() {
        assert_eq!(200u8.widen(), 200u8);
        assert_eq!(65535u16.widen(), 65535i32);
        assert_eq!(u32::MAX.widen(), i32::MAX);
        assert_eq!(3_000_000_000u32.widen(), i32::MAX);
        assert_eq!(2_000_000_000u32.widen(), 2_000_000_000i32);
        assert_eq!((-7i16).widen(), -7i32);
        assert_eq!(1.5f32.widen(), 1.5f32);
    }
}
