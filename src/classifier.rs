use std::sync::Arc;

use image::RgbImage;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A black-box image classifier.
///
/// Implementations receive a bitmap already resized to the adapter's input
/// dimensions and return one score per output class of the underlying network.
/// The length of the returned vector is a property of the network, not of any
/// category set.
pub trait Classifier: Send + Sync {
    fn classify(&self, image: &RgbImage) -> Result<Vec<f32>, BoxError>;
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn classify(&self, image: &RgbImage) -> Result<Vec<f32>, BoxError> {
        (**self).classify(image)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, image: &RgbImage) -> Result<Vec<f32>, BoxError> {
        (**self).classify(image)
    }
}
