use lumen_image::{Image, ImageError};
use rayon::prelude::*;

use crate::core::Region;

fn check_window(outer: &Region, inner: &Region) -> Result<(), ImageError> {
    if inner.x + inner.width > outer.width || inner.y + inner.height > outer.height {
        return Err(ImageError::RegionOutOfBounds(
            inner.x,
            inner.y,
            inner.width,
            inner.height,
        ));
    }
    Ok(())
}

fn full_region<T, const C: usize>(image: &Image<T, C>) -> Region {
    Region {
        x: 0,
        y: 0,
        width: image.width(),
        height: image.height(),
    }
}

/// Copy the window of `src` starting at `(x, y)` into `dst`.
///
/// The size of the window is the size of `dst`.
///
/// # Errors
///
/// Returns an error if the window does not fit inside `src`.
///
/// # Example
///
/// ```
/// use lumen_image::Image;
/// use lumen_imgproc::crop::crop_image;
///
/// let image = Image::<u8, 1>::new([4, 3].into(), (0..12).collect()).unwrap();
/// let mut window = Image::<u8, 1>::from_size_val([2, 2].into(), 0).unwrap();
///
/// crop_image(&image, &mut window, 2, 1).unwrap();
/// assert_eq!(window.as_slice(), &[6, 7, 10, 11]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let window = Region {
        x,
        y,
        width: dst.width(),
        height: dst.height(),
    };
    check_window(&full_region(src), &window)?;

    let row_len = window.width * C;
    if row_len == 0 {
        return Ok(());
    }

    let src_stride = src.width() * C;
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(row, dst_row)| {
            let start = (window.y + row) * src_stride + window.x * C;
            dst_row.copy_from_slice(&src_data[start..start + row_len]);
        });

    Ok(())
}

/// Copy the whole of `src` into `dst` with its top-left corner at `(x, y)`.
///
/// This is the inverse of [`crop_image`]: the pixels of `dst` outside of the window are left
/// untouched.
///
/// # Errors
///
/// Returns an error if `src` placed at `(x, y)` does not fit inside `dst`.
pub fn paste_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let window = Region {
        x,
        y,
        width: src.width(),
        height: src.height(),
    };
    check_window(&full_region(dst), &window)?;

    let row_len = window.width * C;
    if row_len == 0 {
        return Ok(());
    }

    let dst_stride = dst.width() * C;

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_stride)
        .skip(window.y)
        .zip(src.as_slice().par_chunks_exact(row_len))
        .for_each(|(dst_row, src_row)| {
            dst_row[window.x * C..window.x * C + row_len].copy_from_slice(src_row);
        });

    Ok(())
}
