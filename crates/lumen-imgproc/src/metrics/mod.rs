//! No-reference image quality metrics.
//!
//! These metrics score a single image without a ground-truth reference, useful for:
//!
//! - Comparing the output of enhancement algorithms
//! - Ranking images by contrast and information content
//!
//! # Available Metrics
//!
//! - **Shannon entropy**: information content of the intensity histogram, in bits
//! - **Mean deviation**: closeness of the mean intensity to mid-gray, in [0, 1]
//! - **AME**: block-wise Michelson contrast entropy
//! - **BIE**: block-based index combining entropy, contrast and brightness

mod ame;
mod bie;
mod entropy;
mod mean_deviation;

pub use ame::{ame, AmeParams};
pub use bie::{bie, bie_components, BieComponents, DEFAULT_BLOCK_SIZE};
pub use entropy::{entropy_from_histogram, shannon_entropy};
pub use mean_deviation::mean_deviation;
