use lumen_image::{Image, ImageError};

use super::{ame, entropy_from_histogram, mean_deviation, AmeParams};
use crate::core::{region_samples, samples_std_mean, std_mean, tile_regions};
use crate::histogram::histogram_levels;

/// Default side of the square blocks used by [`bie`].
pub const DEFAULT_BLOCK_SIZE: usize = 15;

/// The intermediate quantities of the [`bie`] metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BieComponents {
    /// Modified AME of the whole image.
    pub image_entropy: f64,
    /// Mean Shannon entropy of the full blocks.
    pub mean_block_entropy: f64,
    /// Population standard deviation of the whole image.
    pub std: f64,
    /// Mean population standard deviation of the full blocks.
    pub mean_block_std: f64,
    /// Mean deviation of the whole image.
    pub mean_deviation: f64,
    /// The final metric value.
    pub value: f64,
}

/// Compute the BIE metric together with its intermediate quantities.
///
/// Only the full `block_size x block_size` blocks take part in the block statistics, any
/// remainder on the right and bottom edges is ignored.
///
/// # Errors
///
/// Returns an error if the image is empty, the block size is zero or the image is smaller than
/// a single block.
pub fn bie_components(src: &Image<u8, 1>, block_size: usize) -> Result<BieComponents, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let blocks = tile_regions(src.size(), block_size, block_size, true)?;
    if blocks.is_empty() {
        return Err(ImageError::InvalidBlockSize(
            block_size,
            block_size,
            src.width(),
            src.height(),
        ));
    }

    let (entropy_sum, std_sum) =
        blocks
            .iter()
            .fold((0f64, 0f64), |(entropy_sum, std_sum), &block| {
                let (hist, total) = histogram_levels(region_samples(src, block));
                let block_std = samples_std_mean(region_samples(src, block))
                    .map_or(0.0, |(std, _)| std);
                (
                    entropy_sum + entropy_from_histogram(&hist, total),
                    std_sum + block_std,
                )
            });

    let num_blocks = blocks.len() as f64;
    let mean_block_entropy = entropy_sum / num_blocks;
    let mean_block_std = std_sum / num_blocks;

    let image_entropy = ame(
        src,
        &AmeParams {
            block_size,
            modified: true,
            ..Default::default()
        },
    )?;

    let ([std], _) = std_mean(src)?;
    let mean_deviation = mean_deviation(src)?;

    log::debug!(
        "image entropy: {image_entropy}, mean block entropy: {mean_block_entropy}, \
         std: {std}, mean block std: {mean_block_std}"
    );

    let p = mean_deviation * std / (mean_block_std + 1.0);
    let value = p * image_entropy / (1.0 + mean_block_entropy);

    Ok(BieComponents {
        image_entropy,
        mean_block_entropy,
        std,
        mean_block_std,
        mean_deviation,
        value,
    })
}

/// Compute the BIE (block-based information and entropy) quality index of a grayscale image.
///
/// The index combines the brightness, the global and block-wise contrast, the block entropy and
/// the modified AME of the image:
///
/// ```text
/// p      = mean_deviation * std / (mean_block_std + 1)
/// metric = p * ame_modified / (1 + mean_block_entropy)
/// ```
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::metrics::{bie, DEFAULT_BLOCK_SIZE};
///
/// let image = Image::<u8, 1>::from_size_val([45, 30].into(), 128).unwrap();
///
/// // a flat image has no contrast at all
/// assert_eq!(bie(&image, DEFAULT_BLOCK_SIZE).unwrap(), 0.0);
/// ```
pub fn bie(src: &Image<u8, 1>, block_size: usize) -> Result<f64, ImageError> {
    Ok(bie_components(src, block_size)?.value)
}
