use lumen_image::{Image, ImageError, ImageSize};

/// A rectangular region of an image in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// The x-coordinate of the top-left corner.
    pub x: usize,
    /// The y-coordinate of the top-left corner.
    pub y: usize,
    /// The width of the region.
    pub width: usize,
    /// The height of the region.
    pub height: usize,
}

/// Split an image of the given size into a row-major grid of regions.
///
/// Regions start at the top-left corner. When `full_only` is false the regions on the right and
/// bottom edges are clipped to the image, otherwise only complete regions are returned.
///
/// # Errors
///
/// Returns an error if the region width or height is zero.
///
/// # Example
///
/// ```
/// use lumen_image::ImageSize;
/// use lumen_imgproc::core::tile_regions;
///
/// let size = ImageSize { width: 5, height: 4 };
///
/// let regions = tile_regions(size, 2, 2, false).unwrap();
/// assert_eq!(regions.len(), 6);
/// assert_eq!(regions[2].width, 1);
///
/// let regions = tile_regions(size, 2, 2, true).unwrap();
/// assert_eq!(regions.len(), 4);
/// ```
pub fn tile_regions(
    size: ImageSize,
    region_width: usize,
    region_height: usize,
    full_only: bool,
) -> Result<Vec<Region>, ImageError> {
    if region_width == 0 || region_height == 0 {
        return Err(ImageError::InvalidBlockSize(
            region_width,
            region_height,
            size.width,
            size.height,
        ));
    }

    let mut regions = Vec::new();
    for y in (0..size.height).step_by(region_height) {
        for x in (0..size.width).step_by(region_width) {
            let width = region_width.min(size.width - x);
            let height = region_height.min(size.height - y);
            if full_only && (width != region_width || height != region_height) {
                continue;
            }
            regions.push(Region {
                x,
                y,
                width,
                height,
            });
        }
    }

    Ok(regions)
}

/// Iterate over the samples of a single channel image that fall inside a region.
///
/// Precondition: the region lies inside the image.
pub fn region_samples<'a, T: Copy>(
    src: &'a Image<T, 1>,
    region: Region,
) -> impl Iterator<Item = T> + 'a {
    let cols = src.cols();
    (region.y..region.y + region.height).flat_map(move |row| {
        let start = row * cols + region.x;
        src.as_slice()[start..start + region.width].iter().copied()
    })
}

/// Compute the population standard deviation and the mean of each channel of an image.
///
/// # Returns
///
/// A tuple `(std, mean)` with one entry per channel.
///
/// # Errors
///
/// Returns an error if the image is empty.
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::core::std_mean;
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![0, 0, 10, 10]).unwrap();
/// let (std, mean) = std_mean(&image).unwrap();
///
/// assert_eq!(mean, [5.0]);
/// assert_eq!(std, [5.0]);
/// ```
pub fn std_mean<const C: usize>(image: &Image<u8, C>) -> Result<([f64; C], [f64; C]), ImageError> {
    if image.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    let mut sum = [0f64; C];
    let mut sq_sum = [0f64; C];
    for pixel in image.as_slice().chunks_exact(C) {
        for c in 0..C {
            let val = pixel[c] as f64;
            sum[c] += val;
            sq_sum[c] += val * val;
        }
    }

    let n = (image.width() * image.height()) as f64;

    let mut mean = [0f64; C];
    let mut std = [0f64; C];
    for c in 0..C {
        mean[c] = sum[c] / n;
        // clamp tiny negative values caused by cancellation
        std[c] = (sq_sum[c] / n - mean[c] * mean[c]).max(0.0).sqrt();
    }

    Ok((std, mean))
}

/// Compute the population standard deviation and mean of a stream of 8-bit samples.
///
/// Returns `None` when the stream is empty.
pub fn samples_std_mean(samples: impl IntoIterator<Item = u8>) -> Option<(f64, f64)> {
    let (n, sum, sq_sum) = samples
        .into_iter()
        .fold((0usize, 0f64, 0f64), |(n, sum, sq_sum), px| {
            let val = px as f64;
            (n + 1, sum + val, sq_sum + val * val)
        });

    if n == 0 {
        return None;
    }

    let n = n as f64;
    let mean = sum / n;
    let std = (sq_sum / n - mean * mean).max(0.0).sqrt();

    Some((std, mean))
}
