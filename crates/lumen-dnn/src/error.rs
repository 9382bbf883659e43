/// An error type for the dnn module.
#[derive(thiserror::Error, Debug)]
pub enum DnnError {
    /// The weights file could not be found.
    #[error("Weights file does not exist: {0}")]
    WeightsNotFound(std::path::PathBuf),

    /// Error to prepare or read back an image.
    #[error("Failed to process the image. {0}")]
    ImageError(#[from] lumen_image::ImageError),

    /// Error coming from the tensor backend.
    #[error("Tensor operation failed. {0}")]
    TensorError(#[from] candle_core::Error),

    /// The network produced a tensor of an unexpected shape.
    #[error("Unexpected output shape: {0:?}")]
    InvalidOutputShape(Vec<usize>),
}
