use lumen_image::{Image, ImageError};

/// Mid-gray level of an 8-bit image.
const MID_GRAY: f64 = 128.0;

/// Compute how close the mean intensity of an image is to mid-gray.
///
/// The score is `1 - |mean - 128| / 128` where the mean runs over every sample of every
/// channel. A perfectly balanced exposure scores 1 and a black image scores 0.
///
/// # Errors
///
/// Returns an error if the image is empty.
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::metrics::mean_deviation;
///
/// let image = Image::<u8, 3>::from_size_val([2, 2].into(), 128).unwrap();
/// assert_eq!(mean_deviation(&image).unwrap(), 1.0);
/// ```
pub fn mean_deviation<const C: usize>(src: &Image<u8, C>) -> Result<f64, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let sum = src.as_slice().iter().map(|&px| px as u64).sum::<u64>();
    let mean = sum as f64 / src.numel() as f64;

    Ok(1.0 - (mean - MID_GRAY).abs() / MID_GRAY)
}
