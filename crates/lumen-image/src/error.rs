/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image sizes do not match.
    #[error("Image size mismatch: {0}x{1} vs {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds for an image with {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a pixel value cannot be cast to the target type.
    #[error("Failed to cast pixel value to {0}")]
    CastError(String),

    /// Error when the number of histogram bins is not valid.
    #[error("Invalid number of histogram bins: {0}")]
    InvalidHistogramBins(usize),

    /// Error when a block or tile size cannot be used with the image.
    #[error("Invalid block size {0}x{1} for an image of size {2}x{3}")]
    InvalidBlockSize(usize, usize, usize, usize),

    /// Error when a region falls outside of the image.
    #[error("Region at ({0}, {1}) of size {2}x{3} is out of the image bounds")]
    RegionOutOfBounds(usize, usize, usize, usize),

    /// Error when an operation needs at least one pixel.
    #[error("Image is empty")]
    EmptyImage,

    /// Error raised by an external backend.
    #[error("Backend error: {0}")]
    BackendError(String),
}
