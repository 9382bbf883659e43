use std::path::Path;

use lumen_image::{Image, ImageSize};

use crate::{error::IoError, jpeg, png};

/// File extensions accepted as image inputs.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Default quality used when an image is written as JPEG.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Check whether the path carries one of the [`SUPPORTED_EXTENSIONS`].
///
/// # Example
///
/// ```
/// use lumen_io::functional::is_supported_image;
///
/// assert!(is_supported_image("photo.JPG"));
/// assert!(!is_supported_image("notes.txt"));
/// ```
pub fn is_supported_image(file_path: impl AsRef<Path>) -> bool {
    file_path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Reads an image from the given file path and converts it to RGB8.
///
/// The method tries to read from any image format supported by the image crate.
/// Grayscale, alpha and 16-bit images are converted to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;

    // decode the data directly from memory
    let img = image::ImageReader::new(std::io::Cursor::new(&bytes))
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    log::debug!(
        "decoded {} as {:?} with {}",
        file_path.display(),
        img.color(),
        size
    );

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an RGB8 image choosing the encoder from the file extension.
///
/// `png` is written losslessly, `jpg` and `jpeg` with [`DEFAULT_JPEG_QUALITY`].
///
/// # Errors
///
/// Returns [`IoError::InvalidFileExtension`] for any other extension.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => png::write_image_png_rgb8(file_path, image),
        Some("jpg") | Some("jpeg") => {
            jpeg::write_image_jpeg_rgb8(file_path, image, DEFAULT_JPEG_QUALITY)
        }
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::IoError;
    use crate::functional::{is_supported_image, read_image_any_rgb8, write_image_rgb8};
    use lumen_image::{Image, ImageSize};

    #[test]
    fn read_write_any_png() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("checker.png");

        #[rustfmt::skip]
        let image = Image::<u8, 3>::new(
            ImageSize { width: 2, height: 2 },
            vec![
                0, 0, 0, 255, 255, 255,
                255, 255, 255, 0, 0, 0,
            ],
        )?;

        write_image_rgb8(&file_path, &image)?;

        let image_back = read_image_any_rgb8(&file_path)?;
        assert_eq!(image_back.size().width, 2);
        assert_eq!(image_back.size().height, 2);
        assert_eq!(image_back.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn read_any_gray_as_rgb() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.png");

        let gray = Image::<u8, 1>::new([3, 1].into(), vec![10, 20, 30])?;
        crate::png::write_image_png_mono8(&file_path, &gray)?;

        let rgb = read_image_any_rgb8(&file_path)?;
        assert_eq!(rgb.as_slice(), &[10, 10, 10, 20, 20, 20, 30, 30, 30]);

        Ok(())
    }

    #[test]
    fn write_invalid_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let image = Image::<u8, 3>::from_size_val([1, 1].into(), 0)?;

        let res = write_image_rgb8(tmp_dir.path().join("image.bmp"), &image);
        assert!(matches!(res, Err(IoError::InvalidFileExtension(_))));

        Ok(())
    }

    #[test]
    fn read_missing_file() {
        let res = read_image_any_rgb8("missing.jpeg");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported_image("a.png"));
        assert!(is_supported_image("b.Jpeg"));
        assert!(!is_supported_image("c"));
        assert!(!is_supported_image("d.gif"));
    }
}
