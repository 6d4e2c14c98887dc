use std::borrow::Cow;

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

use crate::classifier::BoxError;
use crate::error::ClassifyError;

/// Square input edge expected by every served network.
pub const INPUT_SIZE: u32 = 224;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessConfig {
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub height: u32,
    pub width: u32,
}

impl PreprocessConfig {
    pub fn imagenet() -> Self {
        Self {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            height: INPUT_SIZE,
            width: INPUT_SIZE,
        }
    }

    pub fn vit() -> Self {
        Self {
            mean: [0.5, 0.5, 0.5],
            std: [0.5, 0.5, 0.5],
            height: INPUT_SIZE,
            width: INPUT_SIZE,
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self::imagenet()
    }
}

/// Decodes an uploaded image and converts it to three-channel RGB.
///
/// The encoding is guessed from the content, never from a file name.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ClassifyError> {
    let image = image::load_from_memory(bytes).map_err(ClassifyError::Decode)?;
    Ok(ensure_rgb(image))
}

pub fn ensure_rgb(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Resizes to exactly `width`x`height`, ignoring aspect ratio.
pub fn resize_exact(image: &RgbImage, width: u32, height: u32) -> Result<RgbImage, BoxError> {
    let mut dst_image = Image::new(width, height, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom));
    resizer.resize(image, &mut dst_image, Some(&resize_options))?;

    RgbImage::from_raw(width, height, dst_image.buffer().to_vec())
        .ok_or_else(|| "resized buffer does not match the requested dimensions".into())
}

#[derive(Debug, Clone)]
pub struct Processor {
    pub config: PreprocessConfig,
}

impl Processor {
    /// Create a new instance of the Processor struct
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Resizes (when needed) and normalises an image into a `1x3xHxW` tensor.
    pub fn preprocess(&self, image: &RgbImage) -> Result<Array4<f32>, BoxError> {
        let (width, height) = (self.config.width, self.config.height);
        let image = if image.dimensions() == (width, height) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(resize_exact(image, width, height)?)
        };
        Ok(self.to_tensor(&image))
    }

    fn to_tensor(&self, image: &RgbImage) -> Array4<f32> {
        let (width, height) = image.dimensions();
        let PreprocessConfig { mean, std, .. } = self.config;
        Array4::from_shape_fn((1, 3, height as usize, width as usize), |(_, c, y, x)| {
            let value = image.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - mean[c]) / std[c]
        })
    }
}
