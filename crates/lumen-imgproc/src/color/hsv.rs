use crate::parallel;
use lumen_image::{Image, ImageError};

// all channels in [0, 255], hue scaled from [0, 360)
fn hsv_pixel(r: f32, g: f32, b: f32) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;

    let sector = if chroma == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        (b - r) / chroma + 2.0
    } else {
        (r - g) / chroma + 4.0
    };

    let s = if max == 0.0 { 0.0 } else { chroma / max * 255.0 };

    [sector / 6.0 * 255.0, s, max]
}

fn rgb_pixel(h: f32, s: f32, v: f32) -> [f32; 3] {
    let sector = (h / 255.0 * 6.0) % 6.0;
    let chroma = v * s / 255.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = v - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    [r + m, g + m, b + m]
}

/// Convert an RGB image to an HSV image.
///
/// The input image is assumed to have 3 channels in the order R, G, B in the range [0, 255].
///
/// # Arguments
///
/// * `src` - The input RGB image assumed to have 3 channels.
/// * `dst` - The output HSV image.
///
/// # Returns
///
/// The HSV image with the following channels:
///
/// * H: The hue channel in the range [0, 255] (0-360 degrees).
/// * S: The saturation channel in the range [0, 255].
/// * V: The value channel in the range [0, 255].
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use lumen_image::{Image, ImageSize};
/// use lumen_imgproc::color::hsv_from_rgb;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///        width: 4,
///        height: 5,
///     },
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let mut hsv = Image::<f32, 3>::from_size_val(image.size(), 0.0).unwrap();
///
/// hsv_from_rgb(&image, &mut hsv).unwrap();
///
/// assert_eq!(hsv.num_channels(), 3);
/// assert_eq!(hsv.size().width, 4);
/// assert_eq!(hsv.size().height, 5);
/// ```
pub fn hsv_from_rgb(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel.copy_from_slice(&hsv_pixel(src_pixel[0], src_pixel[1], src_pixel[2]));
    });

    Ok(())
}

/// Convert an HSV image back to an RGB image.
///
/// This is the inverse of [`hsv_from_rgb`]: all three input channels are in the range [0, 255]
/// and the output RGB values are in the range [0, 255].
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_hsv(src: &Image<f32, 3>, dst: &mut Image<f32, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel.copy_from_slice(&rgb_pixel(src_pixel[0], src_pixel[1], src_pixel[2]));
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use lumen_image::{Image, ImageError, ImageSize};

    #[test]
    fn hsv_from_rgb_primaries() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<f32, 3>::new(
            ImageSize { width: 5, height: 1 },
            vec![
                255.0, 0.0, 0.0,
                0.0, 255.0, 0.0,
                0.0, 0.0, 255.0,
                255.0, 0.0, 255.0,
                51.0, 51.0, 51.0,
            ],
        )?;

        #[rustfmt::skip]
        let expected = [
            0.0, 255.0, 255.0,
            85.0, 255.0, 255.0,
            170.0, 255.0, 255.0,
            212.5, 255.0, 255.0,
            0.0, 0.0, 51.0,
        ];

        let mut hsv = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;
        super::hsv_from_rgb(&image, &mut hsv)?;

        for (a, b) in hsv.as_slice().iter().zip(expected.iter()) {
            approx::assert_abs_diff_eq!(a, b, epsilon = 1e-3);
        }

        Ok(())
    }

    #[test]
    fn rgb_from_hsv_inverts_hsv_from_rgb() -> Result<(), ImageError> {
        let data = (0..16 * 16 * 3)
            .map(|i| ((i * 37 + 11) % 256) as f32)
            .collect::<Vec<_>>();
        let image = Image::<f32, 3>::new([16, 16].into(), data)?;

        let mut hsv = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;
        let mut rgb = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;

        super::hsv_from_rgb(&image, &mut hsv)?;
        super::rgb_from_hsv(&hsv, &mut rgb)?;

        for (a, b) in rgb.as_slice().iter().zip(image.as_slice().iter()) {
            approx::assert_abs_diff_eq!(a, b, epsilon = 1e-2);
        }

        Ok(())
    }

    #[test]
    fn rgb_from_hsv_gray_has_no_hue() -> Result<(), ImageError> {
        let hsv = Image::<f32, 3>::new([1, 1].into(), vec![0.0, 0.0, 100.0])?;
        let mut rgb = Image::<f32, 3>::from_size_val(hsv.size(), 0.0)?;

        super::rgb_from_hsv(&hsv, &mut rgb)?;

        for &val in rgb.as_slice() {
            approx::assert_abs_diff_eq!(val, 100.0, epsilon = 1e-4);
        }

        Ok(())
    }
}
