#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the models.
pub mod error;

/// Zero-DCE low-light enhancement network.
pub mod zero_dce;

pub use crate::error::DnnError;
