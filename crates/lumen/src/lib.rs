#![deny(missing_docs)]
//! Image enhancement pipelines with no-reference quality reports.
//!
//! The crate ties the lumen building blocks together: a [`algorithm::Registry`] of named
//! algorithms, a [`pipeline::Pipeline`] that runs a selection of them on an image and a
//! [`grid::GridLayout`] that arranges the produced images and metric tables.

#[doc(inline)]
pub use lumen_image as image;

#[doc(inline)]
pub use lumen_imgproc as imgproc;

#[doc(inline)]
pub use lumen_io as io;

#[doc(inline)]
pub use lumen_dnn as dnn;

/// Algorithm trait, built-in algorithms and the registry.
pub mod algorithm;

/// Pipeline configuration.
pub mod config;

/// Error types for the pipeline.
pub mod error;

/// Grid layout, result tables and contact sheets.
pub mod grid;

/// The pipeline runner.
pub mod pipeline;

pub use crate::error::LumenError;
