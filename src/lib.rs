pub mod adapter;
pub mod analyzer;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod helpers;
pub mod mapping;
pub mod metadata;
pub mod mock;
pub mod model;
pub mod postprocess;
pub mod preprocess;
pub mod response;
pub mod service;
pub mod state;

pub use crate::adapter::InferenceAdapter;
pub use crate::analyzer::{Analyzer, Backend, Pipeline};
pub use crate::classifier::{BoxError, Classifier};
pub use crate::cli::Args;
pub use crate::error::ClassifyError;
pub use crate::formatter::{ClassificationResult, Prediction, format};
pub use crate::mapping::{CategorySet, Variant, load_category_set};
pub use crate::metadata::{MetadataRules, Recyclability};
pub use crate::mock::{MockAnalyzer, MockClassifier};
pub use crate::model::{OnnxClassifier, OnnxModel};
pub use crate::preprocess::{PreprocessConfig, Processor, decode_image};
pub use crate::service::{router, run_server};
pub use crate::state::AppState;
