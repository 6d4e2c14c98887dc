use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::{Array1, CowArray};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};

use crate::classifier::{BoxError, Classifier};
use crate::postprocess::softmax;
use crate::preprocess::{PreprocessConfig, Processor};

pub struct OnnxModel {
    provider: [ort::execution_providers::ExecutionProviderDispatch; 1],
}

impl OnnxModel {
    pub fn new(cuda: bool) -> Self {
        let provider = if cuda {
            [CUDAExecutionProvider::default().build().error_on_failure()]
        } else {
            [CPUExecutionProvider::default().build()]
        };
        Self { provider }
    }

    pub fn load_model(&self, model_path: &Path) -> Result<Session> {
        let session = SessionBuilder::new()?
            .with_execution_providers(self.provider.clone())?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load ONNX model {}", model_path.display()))?;
        Ok(session)
    }
}

/// An image classification network exported to ONNX.
///
/// The first output is read as logits and turned into probabilities with
/// softmax. Runs are serialised through a mutex, one session per variant.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    processor: Processor,
}

impl OnnxClassifier {
    pub fn new(session: Session, processor: Processor) -> Self {
        Self {
            session: Mutex::new(session),
            processor,
        }
    }

    pub fn load(model: &OnnxModel, model_path: &Path, config: PreprocessConfig) -> Result<Self> {
        let session = model.load_model(model_path)?;
        Ok(Self::new(session, Processor::new(config)))
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, image: &RgbImage) -> Result<Vec<f32>, BoxError> {
        let xs = self.processor.preprocess(image)?;
        let xs = CowArray::from(xs.into_dyn());
        let input_data = ort::inputs![xs.view()]?;

        let session = self.session.lock().map_err(|_| "onnx session lock poisoned")?;
        let ys = session.run(input_data)?;
        let (_name, logits) = ys.iter().next().ok_or("model produced no outputs")?;
        let logits = logits.try_extract_tensor::<f32>()?;
        let logits = Array1::from_iter(logits.iter().copied());

        Ok(softmax(&logits).to_vec())
    }
}
