/// An error type for the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum LumenError {
    /// An algorithm name that is not in the registry.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The Zero-DCE algorithm was selected without a weights file.
    #[error("No weights configured for {0}")]
    MissingWeights(String),

    /// A staged input would be overwritten by an output of the pipeline.
    #[error("Staged file name is reserved for an output: {0}")]
    ReservedFileName(std::path::PathBuf),

    /// Error to manipulate a file or directory.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to read or write an image.
    #[error(transparent)]
    IoError(#[from] lumen_io::IoError),

    /// Error coming from an image operation.
    #[error(transparent)]
    ImageError(#[from] lumen_image::ImageError),

    /// Error coming from a model.
    #[error(transparent)]
    DnnError(#[from] lumen_dnn::DnnError),

    /// Error to read or write JSON.
    #[error("Failed to (de)serialize JSON. {0}")]
    JsonError(#[from] serde_json::Error),
}
