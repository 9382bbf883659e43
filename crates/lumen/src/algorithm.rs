use std::fmt;
use std::path::PathBuf;

use lumen_dnn::zero_dce::LowLightEnhancer;
use lumen_image::Image;
use lumen_imgproc::{color, enhance, metrics};

use crate::config::AlgorithmParams;
use crate::error::LumenError;

/// The group an algorithm belongs to.
///
/// The declaration order is the processing order: every preprocessing step runs before any
/// quality measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Algorithms producing a new image.
    Preprocessing,
    /// Algorithms scoring an image.
    QualityMeasure,
}

impl Category {
    /// All categories in processing order.
    pub const ALL: [Category; 2] = [Category::Preprocessing, Category::QualityMeasure];

    /// The name of the category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Preprocessing => "preprocessing",
            Category::QualityMeasure => "quality_measures",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The result of running an algorithm.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A new RGB8 image.
    Image(Image<u8, 3>),
    /// A single score.
    Scalar(f64),
}

/// A named image operation that can take part in a pipeline.
pub trait Algorithm: Send + Sync {
    /// Unique name of the algorithm, also used for its output files.
    fn name(&self) -> &'static str;

    /// The category deciding when the algorithm runs.
    fn category(&self) -> Category;

    /// One line description.
    fn description(&self) -> &'static str;

    /// Run the algorithm on an RGB8 image.
    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError>;
}

fn gray_from_rgb8(image: &Image<u8, 3>) -> Result<Image<u8, 1>, LumenError> {
    let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0)?;
    color::gray_from_rgb_u8(image, &mut gray)?;
    Ok(gray)
}

/// Global histogram equalization of the HSV value channel.
pub struct HistogramEqualization;

impl Algorithm for HistogramEqualization {
    fn name(&self) -> &'static str {
        "histogram_equalization"
    }

    fn category(&self) -> Category {
        Category::Preprocessing
    }

    fn description(&self) -> &'static str {
        "equalize the histogram of the value channel"
    }

    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError> {
        let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        enhance::equalize_value_rgb8(image, &mut dst, enhance::equalize_histogram)?;
        Ok(Output::Image(dst))
    }
}

/// Tile-wise histogram equalization of the HSV value channel.
pub struct AdaptiveHistogramEqualization {
    tile_width: usize,
    tile_height: usize,
}

impl AdaptiveHistogramEqualization {
    /// Create the algorithm with the given tile size.
    pub fn new(tile_width: usize, tile_height: usize) -> Self {
        Self {
            tile_width,
            tile_height,
        }
    }
}

impl Algorithm for AdaptiveHistogramEqualization {
    fn name(&self) -> &'static str {
        "adaptive_histogram_equalization"
    }

    fn category(&self) -> Category {
        Category::Preprocessing
    }

    fn description(&self) -> &'static str {
        "equalize the value channel independently per tile"
    }

    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError> {
        let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        enhance::equalize_value_rgb8(image, &mut dst, |src, dst| {
            enhance::equalize_histogram_adaptive(src, dst, self.tile_width, self.tile_height)
        })?;
        Ok(Output::Image(dst))
    }
}

/// Zero-DCE low-light enhancement.
///
/// The weights are loaded when the algorithm runs.
pub struct ZeroDce {
    weights: Option<PathBuf>,
}

impl ZeroDce {
    /// Create the algorithm with an optional path to the safetensors weights.
    pub fn new(weights: Option<PathBuf>) -> Self {
        Self { weights }
    }
}

impl Algorithm for ZeroDce {
    fn name(&self) -> &'static str {
        "zero_dce"
    }

    fn category(&self) -> Category {
        Category::Preprocessing
    }

    fn description(&self) -> &'static str {
        "zero-reference deep curve estimation for low-light images"
    }

    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| LumenError::MissingWeights(self.name().to_string()))?;

        let enhancer = LowLightEnhancer::new(weights)?;
        Ok(Output::Image(enhancer.enhance(image)?))
    }
}

/// Michelson contrast entropy of the grayscale image.
pub struct Ame {
    params: metrics::AmeParams,
}

impl Ame {
    /// Create the algorithm with the given parameters.
    pub fn new(params: metrics::AmeParams) -> Self {
        Self { params }
    }
}

impl Algorithm for Ame {
    fn name(&self) -> &'static str {
        "ame"
    }

    fn category(&self) -> Category {
        Category::QualityMeasure
    }

    fn description(&self) -> &'static str {
        "block-wise Michelson contrast entropy"
    }

    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError> {
        let gray = gray_from_rgb8(image)?;
        Ok(Output::Scalar(metrics::ame(&gray, &self.params)?))
    }
}

/// Block-based information and entropy index of the grayscale image.
pub struct Bie {
    block_size: usize,
}

impl Bie {
    /// Create the algorithm with the given block size.
    pub fn new(block_size: usize) -> Self {
        Self { block_size }
    }
}

impl Algorithm for Bie {
    fn name(&self) -> &'static str {
        "bie"
    }

    fn category(&self) -> Category {
        Category::QualityMeasure
    }

    fn description(&self) -> &'static str {
        "block-based entropy and contrast index"
    }

    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError> {
        let gray = gray_from_rgb8(image)?;
        Ok(Output::Scalar(metrics::bie(&gray, self.block_size)?))
    }
}

/// Closeness of the mean intensity to mid-gray over all channels.
pub struct MeanDeviation;

impl Algorithm for MeanDeviation {
    fn name(&self) -> &'static str {
        "mean_deviation"
    }

    fn category(&self) -> Category {
        Category::QualityMeasure
    }

    fn description(&self) -> &'static str {
        "closeness of the mean intensity to mid-gray"
    }

    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError> {
        Ok(Output::Scalar(metrics::mean_deviation(image)?))
    }
}

/// Shannon entropy of the grayscale histogram.
pub struct ShannonEntropy;

impl Algorithm for ShannonEntropy {
    fn name(&self) -> &'static str {
        "shannon_entropy"
    }

    fn category(&self) -> Category {
        Category::QualityMeasure
    }

    fn description(&self) -> &'static str {
        "entropy of the grayscale histogram in bits"
    }

    fn run(&self, image: &Image<u8, 3>) -> Result<Output, LumenError> {
        let gray = gray_from_rgb8(image)?;
        Ok(Output::Scalar(metrics::shannon_entropy(&gray)?))
    }
}

/// An ordered collection of algorithms addressed by name.
#[derive(Default)]
pub struct Registry {
    algorithms: Vec<Box<dyn Algorithm>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in algorithm.
    ///
    /// # Example
    ///
    /// ```
    /// use lumen::algorithm::{Category, Registry};
    /// use lumen::config::AlgorithmParams;
    ///
    /// let registry = Registry::with_builtins(&AlgorithmParams::default());
    ///
    /// assert_eq!(registry.len(), 7);
    /// assert_eq!(registry.by_category(Category::Preprocessing).count(), 3);
    /// assert!(registry.get("bie").is_some());
    /// ```
    pub fn with_builtins(params: &AlgorithmParams) -> Self {
        let ahe = params.adaptive_histogram_equalization;

        let mut registry = Self::new();
        registry.register(Box::new(AdaptiveHistogramEqualization::new(
            ahe.tile_width,
            ahe.tile_height,
        )));
        registry.register(Box::new(HistogramEqualization));
        registry.register(Box::new(ZeroDce::new(params.zero_dce.weights.clone())));
        registry.register(Box::new(Ame::new(params.ame.into())));
        registry.register(Box::new(Bie::new(params.bie.block_size)));
        registry.register(Box::new(MeanDeviation));
        registry.register(Box::new(ShannonEntropy));
        registry
    }

    /// Add an algorithm, replacing any algorithm with the same name in place.
    pub fn register(&mut self, algorithm: Box<dyn Algorithm>) {
        match self
            .algorithms
            .iter_mut()
            .find(|a| a.name() == algorithm.name())
        {
            Some(existing) => *existing = algorithm,
            None => self.algorithms.push(algorithm),
        }
    }

    /// Look up an algorithm by name.
    pub fn get(&self, name: &str) -> Option<&dyn Algorithm> {
        self.algorithms
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    /// Iterate over the algorithms in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Algorithm> {
        self.algorithms.iter().map(|a| a.as_ref())
    }

    /// Iterate over the algorithms of one category in registration order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &dyn Algorithm> {
        self.iter().filter(move |a| a.category() == category)
    }

    /// Number of registered algorithms.
    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    /// Whether the registry holds no algorithm.
    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Resolve a selection of names into the order they must run in.
    ///
    /// The algorithms are sorted by category and keep the registration order within a
    /// category. Duplicated names run once.
    ///
    /// # Errors
    ///
    /// Returns [`LumenError::UnknownAlgorithm`] for the first name that is not registered.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&dyn Algorithm>, LumenError> {
        let mut indices = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.algorithms
                    .iter()
                    .position(|a| a.name() == name)
                    .ok_or_else(|| LumenError::UnknownAlgorithm(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        indices.sort_by_key(|&i| (self.algorithms[i].category(), i));
        indices.dedup();

        Ok(indices
            .into_iter()
            .map(|i| self.algorithms[i].as_ref())
            .collect())
    }
}

impl IntoIterator for Registry {
    type Item = Box<dyn Algorithm>;
    type IntoIter = std::vec::IntoIter<Box<dyn Algorithm>>;

    fn into_iter(self) -> Self::IntoIter {
        self.algorithms.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use lumen_image::Image;

    use super::{Algorithm, Category, Output, Registry};
    use crate::config::AlgorithmParams;
    use crate::LumenError;

    fn names<'a>(algorithms: impl IntoIterator<Item = &'a dyn Algorithm>) -> Vec<&'static str> {
        algorithms.into_iter().map(|a| a.name()).collect()
    }

    #[test]
    fn builtins() {
        let registry = Registry::with_builtins(&AlgorithmParams::default());

        assert_eq!(
            names(registry.by_category(Category::Preprocessing)),
            vec![
                "adaptive_histogram_equalization",
                "histogram_equalization",
                "zero_dce"
            ]
        );
        assert_eq!(
            names(registry.by_category(Category::QualityMeasure)),
            vec!["ame", "bie", "mean_deviation", "shannon_entropy"]
        );
        assert!(registry.get("unknown").is_none());
        assert!(registry.iter().all(|a| !a.description().is_empty()));
    }

    #[test]
    fn resolve_sorts_by_category() -> Result<(), LumenError> {
        let registry = Registry::with_builtins(&AlgorithmParams::default());

        let resolved = registry.resolve(&[
            "shannon_entropy",
            "histogram_equalization",
            "ame",
            "adaptive_histogram_equalization",
            "ame",
        ])?;

        assert_eq!(
            names(resolved),
            vec![
                "adaptive_histogram_equalization",
                "histogram_equalization",
                "ame",
                "shannon_entropy"
            ]
        );

        Ok(())
    }

    #[test]
    fn resolve_unknown() {
        let registry = Registry::with_builtins(&AlgorithmParams::default());
        let result = registry.resolve(&["ame", "sharpen"]);
        assert!(matches!(result, Err(LumenError::UnknownAlgorithm(name)) if name == "sharpen"));
    }

    #[test]
    fn resolve_empty() -> Result<(), LumenError> {
        let registry = Registry::with_builtins(&AlgorithmParams::default());
        assert!(registry.resolve::<&str>(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn register_replaces_by_name() -> Result<(), LumenError> {
        struct Constant;

        impl Algorithm for Constant {
            fn name(&self) -> &'static str {
                "ame"
            }
            fn category(&self) -> Category {
                Category::QualityMeasure
            }
            fn description(&self) -> &'static str {
                "always one"
            }
            fn run(&self, _image: &Image<u8, 3>) -> Result<Output, LumenError> {
                Ok(Output::Scalar(1.0))
            }
        }

        let mut registry = Registry::with_builtins(&AlgorithmParams::default());
        registry.register(Box::new(Constant));
        assert_eq!(registry.len(), 7);

        let image = Image::<u8, 3>::from_size_val([4, 4].into(), 0)?;
        let ame = registry.get("ame").ok_or(LumenError::UnknownAlgorithm("ame".into()))?;
        assert_eq!(ame.run(&image)?, Output::Scalar(1.0));

        Ok(())
    }

    #[test]
    fn run_builtins() -> Result<(), LumenError> {
        let registry = Registry::with_builtins(&AlgorithmParams::default());

        let data = (0..32 * 32 * 3).map(|i| (i % 251) as u8).collect();
        let image = Image::<u8, 3>::new([32, 32].into(), data)?;

        for name in ["histogram_equalization", "adaptive_histogram_equalization"] {
            let algorithm = registry
                .get(name)
                .ok_or_else(|| LumenError::UnknownAlgorithm(name.into()))?;
            match algorithm.run(&image)? {
                Output::Image(out) => assert_eq!(out.size(), image.size()),
                Output::Scalar(_) => panic!("{name} should produce an image"),
            }
        }

        for name in ["ame", "bie", "mean_deviation", "shannon_entropy"] {
            let algorithm = registry
                .get(name)
                .ok_or_else(|| LumenError::UnknownAlgorithm(name.into()))?;
            match algorithm.run(&image)? {
                Output::Scalar(value) => assert!(value.is_finite()),
                Output::Image(_) => panic!("{name} should produce a scalar"),
            }
        }

        Ok(())
    }

    #[test]
    fn zero_dce_without_weights() -> Result<(), LumenError> {
        let registry = Registry::with_builtins(&AlgorithmParams::default());
        let image = Image::<u8, 3>::from_size_val([4, 4].into(), 10)?;

        let zero_dce = registry
            .get("zero_dce")
            .ok_or_else(|| LumenError::UnknownAlgorithm("zero_dce".into()))?;
        assert!(matches!(
            zero_dce.run(&image),
            Err(LumenError::MissingWeights(_))
        ));

        Ok(())
    }
}
