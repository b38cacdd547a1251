use crate::image::ImageView;
use crate::pixel::Pixel;

/// Samples are taken at pixel centers; positions past an edge repeat the
/// edge pixel. An empty image samples as zero.
pub fn sample_nearest<T: Pixel>(img: &ImageView<'_, T>, x: f32, y: f32) -> T {
    let xi = x.round() as isize;
    let yi = y.round() as isize;

    match (clamp_index(xi, img.width()), clamp_index(yi, img.height())) {
        // SAFETY: `clamp_index` returns indices in `[0, len)`.
        (Some(mx), Some(my)) => unsafe { *img.get_unchecked(mx, my) },
        _ => T::default(),
    }
}

pub fn sample_bilinear_f32<T: Pixel>(
    img: &ImageView<'_, T>,
    x: f32,
    y: f32,
) -> f32 {
    let x0 = x.floor() as isize;
    let y0 = y.floor() as isize;

    let dx = x - x0 as f32;
    let dy = y - y0 as f32;

    let p00 = sample_at_f32(img, x0, y0);
    let p10 = sample_at_f32(img, x0 + 1, y0);
    let p01 = sample_at_f32(img, x0, y0 + 1);
    let p11 = sample_at_f32(img, x0 + 1, y0 + 1);

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}

/// 4x4 cubic convolution with the sharpening `a = -1` kernel used by common
/// affine resamplers.
pub fn sample_bicubic_f32<T: Pixel>(
    img: &ImageView<'_, T>,
    x: f32,
    y: f32,
) -> f32 {
    let x0 = x.floor() as isize;
    let y0 = y.floor() as isize;
    let dx = x - x0 as f32;
    let dy = y - y0 as f32;

    let mut rows = [0.0f32; 4];
    for (k, row) in rows.iter_mut().enumerate() {
        let yy = y0 - 1 + k as isize;
        *row = cubic(
            sample_at_f32(img, x0 - 1, yy),
            sample_at_f32(img, x0, yy),
            sample_at_f32(img, x0 + 1, yy),
            sample_at_f32(img, x0 + 2, yy),
            dx,
        );
    }
    cubic(rows[0], rows[1], rows[2], rows[3], dy)
}

#[inline]
fn cubic(v1: f32, v2: f32, v3: f32, v4: f32, d: f32) -> f32 {
    let p1 = v2;
    let p2 = -v1 + v3;
    let p3 = 2.0 * (v1 - v2) + v3 - v4;
    let p4 = -v1 + v2 - v3 + v4;
    p1 + d * (p2 + d * (p3 + d * p4))
}

/// Edge-replicating index into `[0, len)`; `None` only for an empty axis.
#[inline]
fn clamp_index(i: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(i.clamp(0, len as isize - 1) as usize)
}

fn sample_at_f32<T: Pixel>(img: &ImageView<'_, T>, x: isize, y: isize) -> f32 {
    match (clamp_index(x, img.width()), clamp_index(y, img.height())) {
        // SAFETY: `clamp_index` returns indices in `[0, len)`.
        (Some(xi), Some(yi)) => unsafe { img.get_unchecked(xi, yi).to_f32() },
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use crate::image::Image;
    use crate::sample::{sample_bicubic_f32, sample_bilinear_f32, sample_nearest};

    #[test]
    fn nearest_on_3x3_repeats_edges() {
        let img = Image::from_vec(
            3,
            3,
            vec![
                0u8, 1, 2, // row 0
                10, 11, 12, // row 1
                20, 21, 22, // row 2
            ],
        )
        .expect("valid image");
        let view = img.as_view();

        assert_eq!(sample_nearest(&view, 1.2, 1.6), 21);
        assert_eq!(sample_nearest(&view, -2.0, 1.0), 10);
        assert_eq!(sample_nearest(&view, 9.0, 9.0), 22);
        assert_eq!(sample_nearest(&view, -0.6, 1.0), 10);

        let empty = Image::<u8>::from_vec(0, 0, Vec::new()).expect("empty image");
        assert_eq!(sample_nearest(&empty.as_view(), 0.0, 0.0), 0);
    }

    #[test]
    fn bilinear_on_2x2_center() {
        let img = Image::from_vec(2, 2, vec![0u8, 10, 20, 30]).expect("valid image");
        let view = img.as_view();

        let center = sample_bilinear_f32(&view, 0.5, 0.5);
        assert!((center - 15.0).abs() < 1e-6);

        let outside = sample_bilinear_f32(&view, -0.25, -0.25);
        assert!(outside.abs() < 1e-6);
        let corner = sample_bilinear_f32(&view, 1.5, 1.5);
        assert!((corner - 30.0).abs() < 1e-6);
    }

    #[test]
    fn bicubic_is_exact_at_pixel_centers() {
        let data: Vec<u16> = (0..25).map(|i| (i * 37 % 101) as u16).collect();
        let img = Image::from_vec(5, 5, data).expect("valid image");
        let view = img.as_view();

        for y in 0..5 {
            for x in 0..5 {
                let v = sample_bicubic_f32(&view, x as f32, y as f32);
                let expected = *img.get(x, y).expect("in bounds") as f32;
                assert!((v - expected).abs() < 1e-4, "({x}, {y}): {v} vs {expected}");
            }
        }
    }

    #[test]
    fn bicubic_reproduces_linear_ramp_between_centers() {
        let data: Vec<f32> = (0..6).flat_map(|_| (0..6).map(|x| 10.0 * x as f32)).collect();
        let img = Image::from_vec(6, 6, data).expect("valid image");

        let v = sample_bicubic_f32(&img.as_view(), 2.5, 2.0);
        assert!((v - 25.0).abs() < 1e-4);
    }
}
