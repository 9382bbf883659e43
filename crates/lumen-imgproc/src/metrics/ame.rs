use lumen_image::{Image, ImageError};

use crate::core::{region_samples, tile_regions};

/// Parameters of the [`ame`] metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmeParams {
    /// Side of the square blocks in pixels.
    pub block_size: usize,
    /// Regularization added to the block contrast.
    pub epsilon: f64,
    /// Normalize the block range by the full 8-bit range instead of the Michelson denominator.
    pub modified: bool,
}

impl Default for AmeParams {
    fn default() -> Self {
        Self {
            block_size: 15,
            epsilon: 1e-6,
            modified: false,
        }
    }
}

/// Compute the AME (Michelson contrast entropy) measure of a grayscale image.
///
/// The image is split into `block_size x block_size` blocks, edge blocks included even if they
/// are smaller. For every block with minimum `lo` and maximum `hi` the contrast is
///
/// * `A = eps + (hi - lo) / (hi + lo + eps)`, or
/// * `A = eps + (hi - lo) / 255` when `modified` is set,
///
/// and the block contributes `A * ln(A)`. The result is the absolute value of the mean over all
/// blocks. With `epsilon == 0` a flat block has `A = 0` and no defined contribution; such
/// blocks are left out of the mean, and the result is NaN only when no block is defined.
///
/// # Errors
///
/// Returns an error if the image is empty or the block size is zero.
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::metrics::{ame, AmeParams};
///
/// let image = Image::<u8, 1>::from_size_val([30, 30].into(), 100).unwrap();
/// let score = ame(&image, &AmeParams::default()).unwrap();
///
/// // flat blocks have no contrast
/// assert!(score < 1e-4);
/// ```
pub fn ame(src: &Image<u8, 1>, params: &AmeParams) -> Result<f64, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let regions = tile_regions(src.size(), params.block_size, params.block_size, false)?;

    let eps = params.epsilon;
    let (sum, count) = regions
        .iter()
        .map(|&region| {
            let (lo, hi) = region_samples(src, region)
                .fold((u8::MAX, u8::MIN), |(lo, hi), px| (lo.min(px), hi.max(px)));
            let (lo, hi) = (lo as f64, hi as f64);

            let contrast = if params.modified {
                eps + (hi - lo) / 255.0
            } else {
                eps + (hi - lo) / (hi + lo + eps)
            };

            contrast * contrast.ln()
        })
        .filter(|val| !val.is_nan())
        .fold((0f64, 0usize), |(sum, count), val| (sum + val, count + 1));

    if count == 0 {
        return Ok(f64::NAN);
    }

    Ok((sum / count as f64).abs())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use lumen_image::{Image, ImageError, ImageSize};

    use super::AmeParams;

    #[test]
    fn test_ame_single_block() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([2, 1].into(), vec![50, 150])?;

        let params = AmeParams {
            block_size: 15,
            epsilon: 0.0,
            modified: false,
        };
        let a: f64 = 100.0 / 200.0;
        assert_abs_diff_eq!(super::ame(&image, &params)?, (a * a.ln()).abs(), epsilon = 1e-12);

        let params = AmeParams {
            modified: true,
            ..params
        };
        let a: f64 = 100.0 / 255.0;
        assert_abs_diff_eq!(super::ame(&image, &params)?, (a * a.ln()).abs(), epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn test_ame_averages_partial_blocks() -> Result<(), ImageError> {
        // a 2x2 block with full contrast and a 1x2 flat edge block
        #[rustfmt::skip]
        let image = Image::<u8, 1>::new(
            ImageSize { width: 3, height: 2 },
            vec![
                0, 255, 9,
                0, 255, 9,
            ],
        )?;

        let params = AmeParams {
            block_size: 2,
            epsilon: 1e-6,
            modified: true,
        };

        let eps = 1e-6f64;
        let full = (eps + 1.0) * (eps + 1.0).ln();
        let flat = eps * eps.ln();
        let expected = ((full + flat) / 2.0).abs();

        assert_abs_diff_eq!(super::ame(&image, &params)?, expected, epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn test_ame_skips_undefined_blocks() -> Result<(), ImageError> {
        // without regularization the flat 7 block gives 0 * ln(0)
        #[rustfmt::skip]
        let image = Image::<u8, 1>::new(
            ImageSize { width: 4, height: 2 },
            vec![
                7, 7, 0, 255,
                7, 7, 0, 255,
            ],
        )?;

        let params = AmeParams {
            block_size: 2,
            epsilon: 0.0,
            modified: false,
        };
        assert_eq!(super::ame(&image, &params)?, 0.0);

        let flat = Image::<u8, 1>::from_size_val([4, 2].into(), 7)?;
        assert!(super::ame(&flat, &params)?.is_nan());

        Ok(())
    }

    #[test]
    fn test_ame_black_image_is_finite() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([20, 20].into(), 0)?;
        let score = super::ame(&image, &AmeParams::default())?;
        assert!(score.is_finite());
        Ok(())
    }

    #[test]
    fn test_ame_invalid_params() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let params = AmeParams {
            block_size: 0,
            ..Default::default()
        };
        assert!(super::ame(&image, &params).is_err());

        let empty = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        assert_eq!(
            super::ame(&empty, &AmeParams::default()),
            Err(ImageError::EmptyImage)
        );

        Ok(())
    }
}
