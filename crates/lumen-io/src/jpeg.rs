use crate::error::IoError;
use jpeg_encoder::{ColorType, Encoder};
use lumen_image::Image;
use std::path::Path;

/// Writes the given JPEG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG image.
/// - `image` - The image containing the JPEG image data
/// - `quality` - The quality of the JPEG encoding, range from 0 (lowest) to 100 (highest)
pub fn write_image_jpeg_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
    quality: u8,
) -> Result<(), IoError> {
    write_image_jpeg_imp(file_path, image, quality)
}

fn write_image_jpeg_imp(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
    quality: u8,
) -> Result<(), IoError> {
    let image_size = image.size();

    // the baseline jpeg header stores the dimensions in 16 bits
    let width = u16::try_from(image_size.width)
        .map_err(|_| IoError::ImageTooLarge(image_size.width, image_size.height))?;
    let height = u16::try_from(image_size.height)
        .map_err(|_| IoError::ImageTooLarge(image_size.width, image_size.height))?;

    let encoder = Encoder::new_file(file_path, quality)?;
    encoder.encode(image.as_slice(), width, height, ColorType::Rgb)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::IoError;
    use crate::functional::read_image_any_rgb8;
    use lumen_image::Image;

    #[test]
    fn write_read_jpeg() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("flat.jpg");

        let image = Image::<u8, 3>::from_size_val([16, 8].into(), 128)?;
        super::write_image_jpeg_rgb8(&file_path, &image, 95)?;

        let image_back = read_image_any_rgb8(&file_path)?;
        assert_eq!(image_back.size(), image.size());

        // a flat image survives lossy compression almost untouched
        for &px in image_back.as_slice() {
            assert!((px as i32 - 128).abs() <= 2);
        }

        Ok(())
    }
}
