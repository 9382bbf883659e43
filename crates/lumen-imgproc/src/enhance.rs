use lumen_image::{ops, Image, ImageError};
use rayon::prelude::*;

use crate::{
    color,
    core::{region_samples, tile_regions},
    histogram::{histogram_levels, NUM_LEVELS},
    parallel,
};

/// Default tile width of the adaptive histogram equalization.
pub const DEFAULT_TILE_WIDTH: usize = 136;

/// Default tile height of the adaptive histogram equalization.
pub const DEFAULT_TILE_HEIGHT: usize = 185;

/// Build the lookup table that equalizes a 256-level histogram.
///
/// Level `i` maps to `floor(255 * cdf(i) / total)`, computed with integer arithmetic.
/// An empty histogram yields the identity table.
///
/// # Example
///
/// ```
/// use lumen_imgproc::enhance::equalization_lut;
///
/// let mut hist = [0usize; 256];
/// hist[10] = 1;
/// hist[20] = 1;
///
/// let lut = equalization_lut(&hist, 2);
/// assert_eq!(lut[10], 127);
/// assert_eq!(lut[20], 255);
/// ```
pub fn equalization_lut(hist: &[usize; NUM_LEVELS], total: usize) -> [u8; NUM_LEVELS] {
    let mut lut = [0u8; NUM_LEVELS];

    if total == 0 {
        for (i, val) in lut.iter_mut().enumerate() {
            *val = i as u8;
        }
        return lut;
    }

    let mut cumulative = 0usize;
    for (val, &count) in lut.iter_mut().zip(hist.iter()) {
        cumulative += count;
        *val = ((255 * cumulative as u64) / total as u64) as u8;
    }

    lut
}

/// Equalize the histogram of a single channel 8-bit image.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output equalized image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::enhance::equalize_histogram;
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![50, 50, 60, 60]).unwrap();
/// let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// equalize_histogram(&image, &mut equalized).unwrap();
/// assert_eq!(equalized.as_slice(), &[127, 127, 255, 255]);
/// ```
pub fn equalize_histogram(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let (hist, total) = histogram_levels(src.as_slice().iter().copied());
    let lut = equalization_lut(&hist, total);

    parallel::par_iter_rows_val(src, dst, |&px, out| *out = lut[px as usize]);

    Ok(())
}

/// Equalize the histogram of a single channel 8-bit image tile by tile.
///
/// The image is split into tiles of `tile_width x tile_height` pixels starting at the top-left
/// corner, the tiles on the right and bottom edges may be smaller. Each tile is equalized with
/// its own histogram and no blending is applied between tiles.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output equalized image.
/// * `tile_width` - The width of the tiles in pixels.
/// * `tile_height` - The height of the tiles in pixels.
///
/// # Errors
///
/// Returns an error if the sizes differ or a tile dimension is zero.
pub fn equalize_histogram_adaptive(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    tile_width: usize,
    tile_height: usize,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let regions = tile_regions(src.size(), tile_width, tile_height, false)?;

    let luts = regions
        .par_iter()
        .map(|&region| {
            let (hist, total) = histogram_levels(region_samples(src, region));
            equalization_lut(&hist, total)
        })
        .collect::<Vec<_>>();

    let cols = src.cols();
    let src_data = src.as_slice();
    let dst_data = dst.as_slice_mut();

    for (region, lut) in regions.iter().zip(luts.iter()) {
        for row in region.y..region.y + region.height {
            let start = row * cols + region.x;
            let end = start + region.width;
            dst_data[start..end]
                .iter_mut()
                .zip(src_data[start..end].iter())
                .for_each(|(out, &px)| *out = lut[px as usize]);
        }
    }

    Ok(())
}

/// Apply a single channel operation to the value channel of an RGB8 image.
///
/// The image is converted to HSV, `op` maps the 8-bit value channel and the result is merged
/// back with the original hue and saturation before converting to RGB8.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output RGB8 image.
/// * `op` - The operation applied to the value channel.
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::enhance::{equalize_histogram, equalize_value_rgb8};
///
/// let image = Image::<u8, 3>::from_size_val([4, 4].into(), 90).unwrap();
/// let mut equalized = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// equalize_value_rgb8(&image, &mut equalized, equalize_histogram).unwrap();
///
/// // a flat gray image maps to white
/// assert!(equalized.as_slice().iter().all(|&px| px == 255));
/// ```
pub fn equalize_value_rgb8<F>(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    op: F,
) -> Result<(), ImageError>
where
    F: FnOnce(&Image<u8, 1>, &mut Image<u8, 1>) -> Result<(), ImageError>,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let mut rgb = Image::<f32, 3>::from_size_val(src.size(), 0.0)?;
    ops::cast_and_scale(src, &mut rgb, 1.0)?;

    let mut hsv = Image::<f32, 3>::from_size_val(src.size(), 0.0)?;
    color::hsv_from_rgb(&rgb, &mut hsv)?;

    // the value channel is the channel maximum so it is integral for 8-bit inputs
    let value = Image::<u8, 1>::new(
        src.size(),
        hsv.as_slice()
            .chunks_exact(3)
            .map(|pixel| pixel[2].round().clamp(0.0, 255.0) as u8)
            .collect(),
    )?;

    let mut value_out = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    op(&value, &mut value_out)?;

    hsv.as_slice_mut()
        .chunks_exact_mut(3)
        .zip(value_out.as_slice())
        .for_each(|(pixel, &v)| pixel[2] = v as f32);

    color::rgb_from_hsv(&hsv, &mut rgb)?;
    ops::scale_and_quantize(&rgb, dst, 1.0)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use lumen_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_equalization_lut_identity_when_empty() {
        let lut = super::equalization_lut(&[0; 256], 0);
        for (i, &val) in lut.iter().enumerate() {
            assert_eq!(val as usize, i);
        }
    }

    #[test]
    fn test_equalize_histogram() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<u8, 1>::new(
            ImageSize { width: 4, height: 2 },
            vec![
                0, 0, 0, 0,
                100, 100, 200, 255,
            ],
        )?;

        let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::equalize_histogram(&image, &mut equalized)?;

        // cdf: 0 -> 4/8, 100 -> 6/8, 200 -> 7/8, 255 -> 8/8
        assert_eq!(equalized.as_slice(), &[127, 127, 127, 127, 191, 191, 223, 255]);

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_is_monotonic() -> Result<(), ImageError> {
        let data = (0..64u32).map(|i| ((i * i) % 97) as u8).collect::<Vec<_>>();
        let image = Image::<u8, 1>::new([8, 8].into(), data)?;

        let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::equalize_histogram(&image, &mut equalized)?;

        let mut pairs = image
            .as_slice()
            .iter()
            .zip(equalized.as_slice())
            .map(|(&a, &b)| (a, b))
            .collect::<Vec<_>>();
        pairs.sort();
        for w in pairs.windows(2) {
            assert!(w[0].1 <= w[1].1);
        }

        // the brightest level always maps to white
        let max_idx = image
            .as_slice()
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .map(|(i, _)| i)
            .unwrap_or_default();
        assert_eq!(equalized.as_slice()[max_idx], 255);

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_adaptive_tiles_are_independent() -> Result<(), ImageError> {
        // left tile is dark, right tile is bright; each one must be stretched on its own
        #[rustfmt::skip]
        let image = Image::<u8, 1>::new(
            ImageSize { width: 4, height: 2 },
            vec![
                10, 20, 200, 210,
                10, 20, 200, 210,
            ],
        )?;

        let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::equalize_histogram_adaptive(&image, &mut equalized, 2, 2)?;

        assert_eq!(equalized.as_slice(), &[127, 255, 127, 255, 127, 255, 127, 255]);

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_adaptive_partial_tiles() -> Result<(), ImageError> {
        let data = (0..5 * 3).map(|i| (i * 13) as u8).collect::<Vec<_>>();
        let image = Image::<u8, 1>::new([5, 3].into(), data)?;

        let mut tiled = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::equalize_histogram_adaptive(&image, &mut tiled, 2, 2)?;

        // the bottom-right tile holds a single pixel which always maps to white
        assert_eq!(tiled.as_slice()[14], 255);

        // a single tile covering the whole image is the global equalization
        let mut global = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::equalize_histogram(&image, &mut global)?;
        super::equalize_histogram_adaptive(&image, &mut tiled, 136, 185)?;
        assert_eq!(tiled.as_slice(), global.as_slice());

        Ok(())
    }

    #[test]
    fn test_equalize_histogram_adaptive_zero_tile() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        let res = super::equalize_histogram_adaptive(&image, &mut equalized, 0, 4);
        assert!(matches!(res, Err(ImageError::InvalidBlockSize(0, 4, 4, 4))));

        Ok(())
    }

    #[test]
    fn test_equalize_value_rgb8_identity_keeps_colors() -> Result<(), ImageError> {
        let data = (0..8 * 8 * 3)
            .map(|i| ((i * 53 + 7) % 256) as u8)
            .collect::<Vec<_>>();
        let image = Image::<u8, 3>::new([8, 8].into(), data)?;

        let mut out = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::equalize_value_rgb8(&image, &mut out, |src, dst| {
            dst.as_slice_mut().copy_from_slice(src.as_slice());
            Ok(())
        })?;

        assert_eq!(out.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn test_equalize_value_rgb8_preserves_hue() -> Result<(), ImageError> {
        // two shades of pure red: only the value changes
        let image = Image::<u8, 3>::new([2, 1].into(), vec![60, 0, 0, 120, 0, 0])?;

        let mut out = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::equalize_value_rgb8(&image, &mut out, super::equalize_histogram)?;

        assert_eq!(out.as_slice(), &[127, 0, 0, 255, 0, 0]);

        Ok(())
    }
}
