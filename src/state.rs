use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::adapter::InferenceAdapter;
use crate::analyzer::{Analyzer, Backend, Pipeline};
use crate::config::ModelsConfig;
use crate::mapping::{CategorySet, Variant, load_category_set};
use crate::metadata::MetadataRules;
use crate::mock::{MockAnalyzer, MockClassifier};
use crate::model::{OnnxClassifier, OnnxModel};

/// Analyzers shared by every request. Built once at startup, read-only after.
pub struct AppState {
    pub trashnet: Arc<dyn Analyzer>,
    pub taco: Arc<dyn Analyzer>,
    pub wastenet: Arc<dyn Analyzer>,
    pub mock_taco: Arc<MockAnalyzer>,
    pub mock_wastenet: Arc<MockAnalyzer>,
}

impl AppState {
    pub fn new(
        trashnet: Arc<dyn Analyzer>,
        taco: Arc<dyn Analyzer>,
        wastenet: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            trashnet,
            taco,
            wastenet,
            mock_taco: Arc::new(MockAnalyzer::taco()),
            mock_wastenet: Arc::new(MockAnalyzer::wastenet()),
        }
    }

    /// Loads every variant. Label files must be readable; a model that fails
    /// to load is replaced by its mock.
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        Ok(Self::new(
            load_analyzer(Variant::TrashNet, config)?,
            load_analyzer(Variant::Taco, config)?,
            load_analyzer(Variant::WasteNet, config)?,
        ))
    }

    pub fn analyzer(&self, variant: Variant) -> Arc<dyn Analyzer> {
        match variant {
            Variant::TrashNet => self.trashnet.clone(),
            Variant::Taco => self.taco.clone(),
            Variant::WasteNet => self.wastenet.clone(),
        }
    }

    pub fn backend(&self, variant: Variant) -> Backend {
        match variant {
            Variant::TrashNet => self.trashnet.backend(),
            Variant::Taco => self.taco.backend(),
            Variant::WasteNet => self.wastenet.backend(),
        }
    }
}

pub fn load_analyzer(variant: Variant, config: &ModelsConfig) -> Result<Arc<dyn Analyzer>> {
    let model_config = config.get(variant);
    let categories = match &model_config.labels {
        Some(path) => load_category_set(path)?,
        None => CategorySet::for_variant(variant),
    };

    let loaded = match &model_config.model {
        Some(path) => {
            info!(%variant, model = %path.display(), "loading model");
            let onnx = OnnxModel::new(config.cuda);
            OnnxClassifier::load(&onnx, path, variant.preprocess_config())
                .inspect_err(|e| {
                    warn!(%variant, error = %format!("{e:#}"), "model failed to load, using mock")
                })
                .ok()
        }
        None => {
            warn!(%variant, "no model configured, using mock");
            None
        }
    };

    let analyzer: Arc<dyn Analyzer> = match loaded {
        Some(classifier) => {
            info!(%variant, categories = categories.len(), "model loaded");
            Arc::new(Pipeline::new(
                InferenceAdapter::new(classifier, categories),
                MetadataRules::for_variant(variant),
            ))
        }
        None => mock_analyzer(variant, categories),
    };
    Ok(analyzer)
}

/// TrashNet keeps the real pipeline over a random classifier and defers
/// recyclability to local guidelines; the other variants fabricate whole
/// results.
pub fn mock_analyzer(variant: Variant, categories: CategorySet) -> Arc<dyn Analyzer> {
    match variant {
        Variant::TrashNet => Arc::new(
            Pipeline::new(
                InferenceAdapter::new(MockClassifier::new(categories.len()), categories),
                MetadataRules::unknown(),
            )
            .with_backend(Backend::Mock),
        ),
        Variant::Taco | Variant::WasteNet => Arc::new(MockAnalyzer::new(categories)),
    }
}
