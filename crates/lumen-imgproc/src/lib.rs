#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image basic statistics module.
pub mod core;

/// image cropping module.
pub mod crop;

/// image enhancement module.
pub mod enhance;

/// compute image histogram module.
pub mod histogram;

/// interpolation modes used by the resize operations.
pub mod interpolation;

/// no-reference image quality metrics module.
pub mod metrics;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;
