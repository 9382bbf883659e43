use lumen_image::{Image, ImageError};

use crate::histogram::{compute_histogram, NUM_LEVELS};

/// Small value added to the probabilities to avoid the logarithm of zero.
const LOG_EPSILON: f64 = 1e-10;

/// Compute the Shannon entropy of a 256-level histogram.
///
/// The counts are normalized to probabilities and the entropy is
/// `-sum(p * log2(p + 1e-10))`, expressed in bits.
///
/// Returns zero for an empty histogram.
pub fn entropy_from_histogram(hist: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    -hist
        .iter()
        .map(|&count| {
            let p = count as f64 / total;
            p * (p + LOG_EPSILON).log2()
        })
        .sum::<f64>()
}

/// Compute the Shannon entropy of a grayscale image.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
///
/// # Returns
///
/// The entropy of the intensity histogram in bits, in the range [0, 8].
///
/// # Errors
///
/// Returns an error if the image is empty.
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::metrics::shannon_entropy;
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![0, 0, 255, 255]).unwrap();
/// let entropy = shannon_entropy(&image).unwrap();
///
/// assert!((entropy - 1.0).abs() < 1e-6);
/// ```
pub fn shannon_entropy(src: &Image<u8, 1>) -> Result<f64, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let mut hist = vec![0usize; NUM_LEVELS];
    compute_histogram(src, &mut hist, NUM_LEVELS)?;

    Ok(entropy_from_histogram(&hist, src.numel()))
}
