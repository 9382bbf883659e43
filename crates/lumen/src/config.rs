use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lumen_imgproc::{enhance, metrics};

use crate::error::LumenError;

/// Configuration of a [`crate::pipeline::Pipeline`].
///
/// Every field has a default, so a configuration file only needs to name what it changes.
///
/// # Example
///
/// ```
/// use lumen::config::PipelineConfig;
///
/// let config: PipelineConfig = serde_json::from_str(
///     r#"{ "algorithms": ["histogram_equalization", "ame"], "params": { "ame": { "modified": true } } }"#,
/// )
/// .unwrap();
///
/// assert!(config.pipeline);
/// assert_eq!(config.work_dir, std::path::PathBuf::from("tmp"));
/// assert!(config.params.ame.modified);
/// assert_eq!(config.params.ame.block_size, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the staged input and every produced file.
    pub work_dir: PathBuf,
    /// Feed every image output into the next algorithm.
    pub pipeline: bool,
    /// Names of the selected algorithms.
    pub algorithms: Vec<String>,
    /// Per-algorithm parameters.
    pub params: AlgorithmParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("tmp"),
            pipeline: true,
            algorithms: Vec::new(),
            params: AlgorithmParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LumenError> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }
}

/// Parameters of the built-in algorithms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmParams {
    /// Tile size of the adaptive histogram equalization.
    pub adaptive_histogram_equalization: TileParams,
    /// Parameters of the AME metric.
    pub ame: AmeConfig,
    /// Parameters of the BIE metric.
    pub bie: BieConfig,
    /// Parameters of the Zero-DCE enhancement.
    pub zero_dce: ZeroDceConfig,
}

/// Tile size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileParams {
    /// Width of a tile.
    pub tile_width: usize,
    /// Height of a tile.
    pub tile_height: usize,
}

impl Default for TileParams {
    fn default() -> Self {
        Self {
            tile_width: enhance::DEFAULT_TILE_WIDTH,
            tile_height: enhance::DEFAULT_TILE_HEIGHT,
        }
    }
}

/// Serializable form of [`metrics::AmeParams`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmeConfig {
    /// Side of the square blocks.
    pub block_size: usize,
    /// Contrast regularization.
    pub epsilon: f64,
    /// Use the modified contrast.
    pub modified: bool,
}

impl Default for AmeConfig {
    fn default() -> Self {
        let params = metrics::AmeParams::default();
        Self {
            block_size: params.block_size,
            epsilon: params.epsilon,
            modified: params.modified,
        }
    }
}

impl From<AmeConfig> for metrics::AmeParams {
    fn from(config: AmeConfig) -> Self {
        Self {
            block_size: config.block_size,
            epsilon: config.epsilon,
            modified: config.modified,
        }
    }
}

/// Parameters of the BIE metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BieConfig {
    /// Side of the square blocks.
    pub block_size: usize,
}

impl Default for BieConfig {
    fn default() -> Self {
        Self {
            block_size: metrics::DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Parameters of the Zero-DCE enhancement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroDceConfig {
    /// Path to the safetensors weights.
    pub weights: Option<PathBuf>,
}
