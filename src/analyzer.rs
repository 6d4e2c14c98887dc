use image::RgbImage;
use serde::Serialize;

use crate::adapter::InferenceAdapter;
use crate::classifier::Classifier;
use crate::error::ClassifyError;
use crate::formatter::{ClassificationResult, format};
use crate::metadata::MetadataRules;
use crate::preprocess::decode_image;

/// What is actually producing results behind an analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Onnx,
    Mock,
}

/// Image in, classification out.
///
/// Implemented by the real pipeline and by the mock generators so the service
/// can hold either one per variant.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, image: &RgbImage) -> Result<ClassificationResult, ClassifyError>;

    fn backend(&self) -> Backend;

    /// Decodes the upload first; nothing is classified if decoding fails.
    fn analyze_bytes(&self, bytes: &[u8]) -> Result<ClassificationResult, ClassifyError> {
        let image = decode_image(bytes)?;
        self.analyze(&image)
    }
}

/// Inference adapter followed by the result formatter.
pub struct Pipeline<C> {
    adapter: InferenceAdapter<C>,
    rules: MetadataRules,
    backend: Backend,
}

impl<C: Classifier> Pipeline<C> {
    pub fn new(adapter: InferenceAdapter<C>, rules: MetadataRules) -> Self {
        Self {
            adapter,
            rules,
            backend: Backend::Onnx,
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }
}

impl<C: Classifier> Analyzer for Pipeline<C> {
    fn analyze(&self, image: &RgbImage) -> Result<ClassificationResult, ClassifyError> {
        let distribution = self.adapter.predict(image)?;
        Ok(format(&distribution, self.adapter.categories(), &self.rules))
    }

    fn backend(&self) -> Backend {
        self.backend
    }
}
