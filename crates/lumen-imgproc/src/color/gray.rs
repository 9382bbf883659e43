use crate::parallel;
use lumen_image::{Image, ImageError};

/// Fixed point weights for the 8-bit conversion, scaled by 2^14.
const RW_Q14: u32 = 4899;
const GW_Q14: u32 = 9617;
const BW_Q14: u32 = 1868;
const Q14_SHIFT: u32 = 14;
const Q14_HALF: u32 = 1 << (Q14_SHIFT - 1);

/// Convert an RGB8 image to grayscale with rounding to the nearest integer.
///
/// Computes `Y = 0.299 * R + 0.587 * G + 0.114 * B` in 14-bit fixed point.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] as u32;
        let g = src_pixel[1] as u32;
        let b = src_pixel[2] as u32;
        dst_pixel[0] = ((r * RW_Q14 + g * GW_Q14 + b * BW_Q14 + Q14_HALF) >> Q14_SHIFT) as u8;
    });

    Ok(())
}
