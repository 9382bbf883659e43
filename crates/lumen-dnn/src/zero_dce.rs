use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};

use lumen_image::{ops, Image, ImageError};

use crate::error::DnnError;

/// Number of feature maps of the hidden convolutions.
const NUM_FEATURES: usize = 32;

/// Number of curve estimation iterations.
const NUM_CURVES: usize = 8;

/// Zero-reference deep curve estimation network.
///
/// The network predicts eight per-pixel quadratic curves and applies them iteratively to the
/// input image, each one as `x = x + r * (x^2 - x)`.
///
/// The weights are expected under the names `e_conv{1..7}.{weight,bias}`.
pub struct ZeroDce {
    e_conv1: Conv2d,
    e_conv2: Conv2d,
    e_conv3: Conv2d,
    e_conv4: Conv2d,
    e_conv5: Conv2d,
    e_conv6: Conv2d,
    e_conv7: Conv2d,
}

impl ZeroDce {
    /// Build the network from a variable builder.
    pub fn new(vb: VarBuilder) -> Result<Self, DnnError> {
        let cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };

        let nf = NUM_FEATURES;
        Ok(Self {
            e_conv1: conv2d(3, nf, 3, cfg, vb.pp("e_conv1"))?,
            e_conv2: conv2d(nf, nf, 3, cfg, vb.pp("e_conv2"))?,
            e_conv3: conv2d(nf, nf, 3, cfg, vb.pp("e_conv3"))?,
            e_conv4: conv2d(nf, nf, 3, cfg, vb.pp("e_conv4"))?,
            e_conv5: conv2d(nf * 2, nf, 3, cfg, vb.pp("e_conv5"))?,
            e_conv6: conv2d(nf * 2, nf, 3, cfg, vb.pp("e_conv6"))?,
            e_conv7: conv2d(nf * 2, NUM_CURVES * 3, 3, cfg, vb.pp("e_conv7"))?,
        })
    }

    /// Load the network weights from a safetensors file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or does not hold the expected tensors.
    pub fn from_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<Self, DnnError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DnnError::WeightsNotFound(path.to_path_buf()));
        }

        log::debug!("loading Zero-DCE weights from {}", path.display());

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)? };
        Self::new(vb)
    }

    /// Run the network on a batch of images of shape (N, 3, H, W) with values in [0, 1].
    ///
    /// # Returns
    ///
    /// A tuple `(enhanced_1, enhanced, curves)` with the image after the first four curves, the
    /// image after all eight curves and the (N, 24, H, W) curve parameter maps.
    pub fn forward(&self, x: &Tensor) -> Result<(Tensor, Tensor, Tensor), DnnError> {
        let x1 = self.e_conv1.forward(x)?.relu()?;
        let x2 = self.e_conv2.forward(&x1)?.relu()?;
        let x3 = self.e_conv3.forward(&x2)?.relu()?;
        let x4 = self.e_conv4.forward(&x3)?.relu()?;

        let x5 = self
            .e_conv5
            .forward(&Tensor::cat(&[&x3, &x4], 1)?)?
            .relu()?;
        let x6 = self
            .e_conv6
            .forward(&Tensor::cat(&[&x2, &x5], 1)?)?
            .relu()?;

        let curves = self
            .e_conv7
            .forward(&Tensor::cat(&[&x1, &x6], 1)?)?
            .tanh()?;

        let r = curves.chunk(NUM_CURVES, 1)?;
        let (first, second) = r.split_at(NUM_CURVES / 2);

        let enhanced_1 = first
            .iter()
            .try_fold(x.clone(), |x, r| apply_curve(&x, r))?;
        let enhanced = second
            .iter()
            .try_fold(enhanced_1.clone(), |x, r| apply_curve(&x, r))?;

        Ok((enhanced_1, enhanced, curves))
    }
}

// x + r * (x^2 - x)
fn apply_curve(x: &Tensor, r: &Tensor) -> candle_core::Result<Tensor> {
    let delta = (x.sqr()? - x)?;
    x + r.mul(&delta)?
}

/// Enhance low-light RGB8 images with a [`ZeroDce`] network.
pub struct LowLightEnhancer {
    model: ZeroDce,
    device: Device,
}

impl LowLightEnhancer {
    /// Create an enhancer from a safetensors weights file.
    ///
    /// The model runs on the first CUDA device when available and on the CPU otherwise.
    pub fn new(weights: impl AsRef<Path>) -> Result<Self, DnnError> {
        // set the device to cuda if available, otherwise use cpu
        let device = match Device::cuda_if_available(0) {
            Ok(device) => device,
            Err(e) => {
                log::warn!("Failed to use CUDA, using CPU instead: {}", e);
                Device::Cpu
            }
        };

        let model = ZeroDce::from_safetensors(weights, &device)?;
        Ok(Self::from_model(model, device))
    }

    /// Create an enhancer from an already built network.
    pub fn from_model(model: ZeroDce, device: Device) -> Self {
        Self { model, device }
    }

    /// Enhance an RGB8 image.
    ///
    /// The image is scaled to [0, 1], passed through the network and the fully enhanced output
    /// is clamped to [0, 1] and quantized back to 8 bits.
    pub fn enhance(&self, image: &Image<u8, 3>) -> Result<Image<u8, 3>, DnnError> {
        if image.is_empty() {
            return Err(ImageError::EmptyImage.into());
        }

        let input = self.preprocess(image)?;
        let (_, enhanced, _) = self.model.forward(&input)?;
        self.postprocess(&enhanced)
    }

    fn preprocess(&self, image: &Image<u8, 3>) -> Result<Tensor, DnnError> {
        // cast the image to f32 and scale it to the range [0, 1]
        let mut image_f32 = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;
        ops::cast_and_scale(image, &mut image_f32, 1.0 / 255.0)?;

        let img_t = Tensor::from_slice(
            image_f32.as_slice(),
            &[image.height(), image.width(), 3],
            &self.device,
        )?;

        // permute the image to the shape (1, c, h, w)
        let img_t = img_t.permute((2, 0, 1))?.unsqueeze(0)?;

        Ok(img_t)
    }

    fn postprocess(&self, enhanced: &Tensor) -> Result<Image<u8, 3>, DnnError> {
        let (batch, channels, rows, cols) = enhanced.dims4()?;
        if batch != 1 || channels != 3 {
            return Err(DnnError::InvalidOutputShape(enhanced.dims().to_vec()));
        }

        let data = enhanced
            .squeeze(0)?
            .permute((1, 2, 0))?
            .clamp(0f32, 1f32)?
            .contiguous()?
            .flatten_all()?
            .to_vec1::<f32>()?;

        let image_f32 = Image::<f32, 3>::new([cols, rows].into(), data)?;

        let mut output = Image::<u8, 3>::from_size_val(image_f32.size(), 0)?;
        ops::scale_and_quantize(&image_f32, &mut output, 255.0)?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use candle_core::{DType, Device, Tensor};
    use candle_nn::VarBuilder;
    use lumen_image::Image;

    use super::{LowLightEnhancer, ZeroDce};
    use crate::DnnError;

    #[test]
    fn forward_shapes() -> Result<(), DnnError> {
        let device = Device::Cpu;
        let model = ZeroDce::new(VarBuilder::zeros(DType::F32, &device))?;

        let x = Tensor::rand(0f32, 1f32, (1, 3, 6, 5), &device)?;
        let (enhanced_1, enhanced, curves) = model.forward(&x)?;

        assert_eq!(enhanced_1.dims(), &[1, 3, 6, 5]);
        assert_eq!(enhanced.dims(), &[1, 3, 6, 5]);
        assert_eq!(curves.dims(), &[1, 24, 6, 5]);

        Ok(())
    }

    #[test]
    fn zero_weights_are_identity() -> Result<(), DnnError> {
        let device = Device::Cpu;
        let model = ZeroDce::new(VarBuilder::zeros(DType::F32, &device))?;
        let enhancer = LowLightEnhancer::from_model(model, device);

        let data = (0..7 * 4 * 3).map(|i| (i * 11 % 256) as u8).collect();
        let image = Image::<u8, 3>::new([7, 4].into(), data)?;

        let enhanced = enhancer.enhance(&image)?;
        assert_eq!(enhanced.size(), image.size());
        assert_eq!(enhanced.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn enhance_empty_image() -> Result<(), DnnError> {
        let device = Device::Cpu;
        let model = ZeroDce::new(VarBuilder::zeros(DType::F32, &device))?;
        let enhancer = LowLightEnhancer::from_model(model, device);

        let image = Image::<u8, 3>::new([0, 0].into(), vec![])?;
        assert!(enhancer.enhance(&image).is_err());

        Ok(())
    }

    #[test]
    fn missing_weights() {
        let result = ZeroDce::from_safetensors("does/not/exist.safetensors", &Device::Cpu);
        assert!(matches!(result, Err(DnnError::WeightsNotFound(_))));
    }
}
